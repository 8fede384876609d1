//! Change bus backed by a tokio broadcast channel

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::trace;

use manada_core::{ChangeEvent, ChangePublisher, RepoResult};

/// Default capacity of the broadcast buffer
const DEFAULT_CAPACITY: usize = 1024;

/// Process-local publisher; every subscriber sees every event.
#[derive(Debug, Clone)]
pub struct MemoryChangeBus {
    sender: broadcast::Sender<ChangeEvent>,
}

impl MemoryChangeBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to all subsequent change events
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    /// Sender half, for bridging events from another source into the bus
    pub fn sender(&self) -> broadcast::Sender<ChangeEvent> {
        self.sender.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for MemoryChangeBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChangePublisher for MemoryChangeBus {
    async fn publish(&self, event: &ChangeEvent) -> RepoResult<()> {
        // No receivers is not an error: nobody is watching the collection.
        let receivers = self.sender.send(event.clone()).unwrap_or(0);
        trace!(collection = %event.collection, receivers, "Change event published");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use manada_core::DocId;

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let bus = MemoryChangeBus::new();
        let mut rx = bus.subscribe();

        let event = ChangeEvent::modified("posts", DocId::parse("p1").unwrap());
        bus.publish(&event).await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let bus = MemoryChangeBus::new();
        assert_eq!(bus.subscriber_count(), 0);
        let event = ChangeEvent::added("posts", DocId::parse("p1").unwrap());
        assert!(bus.publish(&event).await.is_ok());
    }
}
