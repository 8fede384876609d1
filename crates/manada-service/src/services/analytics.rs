//! Analytics service
//!
//! A process-local event log standing in for a real analytics backend.
//! Nothing is persisted; the oldest events are dropped past a fixed cap.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use manada_core::{AnalyticsEvent, DocId};
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::dto::{AnalyticsEventResponse, AnalyticsSummaryResponse, TrackEventRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Maximum number of events kept in memory
pub const MAX_EVENTS: usize = 10_000;

const DEFAULT_LIST_LIMIT: usize = 100;

/// Shared in-memory event log
#[derive(Debug, Clone, Default)]
pub struct AnalyticsStore {
    events: Arc<RwLock<VecDeque<AnalyticsEvent>>>,
}

impl AnalyticsStore {
    pub fn push(&self, event: AnalyticsEvent) {
        let mut events = self.events.write();
        if events.len() == MAX_EVENTS {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// Newest first, optionally restricted to one event type
    pub fn recent(&self, event_type: Option<&str>, limit: usize) -> Vec<AnalyticsEvent> {
        self.events
            .read()
            .iter()
            .rev()
            .filter(|e| event_type.map_or(true, |t| e.event_type == t))
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    pub fn counts_by_type(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for event in self.events.read().iter() {
            *counts.entry(event.event_type.clone()).or_insert(0) += 1;
        }
        counts
    }
}

/// Analytics service
pub struct AnalyticsService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AnalyticsService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Record an event; properties must be a JSON object when given
    #[instrument(skip(self, request), fields(event_type = %request.event_type))]
    pub fn record(
        &self,
        user_id: Option<DocId>,
        request: TrackEventRequest,
    ) -> ServiceResult<AnalyticsEventResponse> {
        let properties = match request.properties {
            None | Some(Value::Null) => Value::Object(serde_json::Map::new()),
            Some(props @ Value::Object(_)) => props,
            Some(_) => return Err(ServiceError::validation("properties must be a JSON object")),
        };

        let event = AnalyticsEvent::new(request.event_type, user_id, properties);
        let response = AnalyticsEventResponse::from(&event);
        self.ctx.analytics().push(event);
        debug!(total = self.ctx.analytics().len(), "Analytics event recorded");
        Ok(response)
    }

    pub fn list(&self, event_type: Option<&str>, limit: Option<usize>) -> Vec<AnalyticsEventResponse> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_EVENTS);
        self.ctx
            .analytics()
            .recent(event_type, limit)
            .iter()
            .map(AnalyticsEventResponse::from)
            .collect()
    }

    pub fn summary(&self) -> AnalyticsSummaryResponse {
        let store = self.ctx.analytics();
        AnalyticsSummaryResponse {
            total: store.len(),
            by_type: store.counts_by_type(),
        }
    }
}
