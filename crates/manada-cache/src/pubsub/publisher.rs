//! Redis Pub/Sub publisher.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use manada_core::{ChangeEvent, ChangePublisher, DomainError, RepoResult};

use crate::pool::{RedisPool, RedisResult};
use crate::pubsub::PubSubChannel;

/// Event type carried by change notifications
pub const DOCUMENT_CHANGED: &str = "DOCUMENT_CHANGED";

/// Event wrapper for Pub/Sub messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PubSubEvent {
    pub event_type: String,
    pub data: serde_json::Value,
}

impl PubSubEvent {
    #[must_use]
    pub fn new(event_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event_type: event_type.into(),
            data,
        }
    }

    /// Wrap a document change
    pub fn document_changed(event: &ChangeEvent) -> Result<Self, serde_json::Error> {
        Ok(Self::new(DOCUMENT_CHANGED, serde_json::to_value(event)?))
    }

    /// The change carried by this event, if it is one
    #[must_use]
    pub fn change_event(&self) -> Option<ChangeEvent> {
        if self.event_type != DOCUMENT_CHANGED {
            return None;
        }
        serde_json::from_value(self.data.clone()).ok()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Redis Pub/Sub publisher
#[derive(Clone)]
pub struct Publisher {
    pool: RedisPool,
}

impl Publisher {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Publish an event to a channel; returns the number of receivers
    pub async fn publish(&self, channel: &PubSubChannel, event: &PubSubEvent) -> RedisResult<u32> {
        let payload = event.to_json()?;
        self.pool.publish_text(&channel.name(), &payload).await
    }
}

/// [`ChangePublisher`] that fans events out through Redis
#[derive(Clone)]
pub struct RedisChangePublisher {
    publisher: Publisher,
}

impl RedisChangePublisher {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self {
            publisher: Publisher::new(pool),
        }
    }
}

#[async_trait]
impl ChangePublisher for RedisChangePublisher {
    async fn publish(&self, event: &ChangeEvent) -> RepoResult<()> {
        let message = PubSubEvent::document_changed(event)
            .map_err(|e| DomainError::CacheError(e.to_string()))?;
        self.publisher
            .publish(&PubSubChannel::collection(event.collection.as_str()), &message)
            .await
            .map_err(|e| DomainError::CacheError(e.to_string()))?;
        Ok(())
    }
}
