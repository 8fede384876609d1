//! # manada-cache
//!
//! Redis layer used when several API instances serve the same feeds.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Change fan-out**: document change events published on
//!   `collection:{name}` channels and re-broadcast to local subscribers
//!
//! ## Example
//!
//! ```ignore
//! use manada_cache::{RedisChangePublisher, RedisPool, RedisPoolConfig, Subscriber, SubscriberConfig};
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let publisher = RedisChangePublisher::new(pool);
//!
//! let subscriber = Subscriber::new(SubscriberConfig::default()).await?;
//! let mut changes = subscriber.receiver();
//! ```

pub mod pool;
pub mod pubsub;

// Re-export pool types
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};

// Re-export pubsub types
pub use pubsub::{
    PubSubChannel, PubSubEvent, Publisher, RedisChangePublisher, Subscriber, SubscriberConfig,
    SubscriberError, SubscriberResult, COLLECTION_CHANNEL_PREFIX, DOCUMENT_CHANGED,
};
