//! Analytics event - a client-reported usage event

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::value_objects::DocId;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsEvent {
    pub id: DocId,
    pub event_type: String,
    pub user_id: Option<DocId>,
    pub properties: Value,
    pub created_at: DateTime<Utc>,
}

impl AnalyticsEvent {
    pub fn new(event_type: String, user_id: Option<DocId>, properties: Value) -> Self {
        Self {
            id: DocId::generate(),
            event_type,
            user_id,
            properties,
            created_at: Utc::now(),
        }
    }
}
