//! Change sources: the in-process bus and Redis pub/sub

use manada_cache::Subscriber;
use manada_core::ChangeEvent;
use manada_db::MemoryChangeBus;
use tokio::sync::broadcast;

use super::ChangeSource;

impl ChangeSource for MemoryChangeBus {
    fn changes(&self) -> broadcast::Receiver<ChangeEvent> {
        self.subscribe()
    }
}

impl ChangeSource for Subscriber {
    fn changes(&self) -> broadcast::Receiver<ChangeEvent> {
        self.receiver()
    }
}
