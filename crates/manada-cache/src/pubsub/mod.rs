//! Redis Pub/Sub module.
//!
//! Change events leave an instance through [`RedisChangePublisher`] and come
//! back in through [`Subscriber`], which re-broadcasts them locally.

mod channels;
mod publisher;
mod subscriber;

pub use channels::{PubSubChannel, ALL_COLLECTIONS_PATTERN, COLLECTION_CHANNEL_PREFIX};
pub use publisher::{PubSubEvent, Publisher, RedisChangePublisher, DOCUMENT_CHANGED};
pub use subscriber::{Subscriber, SubscriberConfig, SubscriberError, SubscriberResult};
