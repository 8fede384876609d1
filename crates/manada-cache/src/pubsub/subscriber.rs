//! Redis Pub/Sub subscriber.
//!
//! Listens on every collection channel and re-broadcasts decoded change
//! events to in-process receivers.

use futures_util::StreamExt;
use redis::Client;
use tokio::sync::{broadcast, mpsc};

use manada_core::ChangeEvent;

use crate::pubsub::{PubSubEvent, ALL_COLLECTIONS_PATTERN};

#[derive(Debug, thiserror::Error)]
pub enum SubscriberError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Channel closed")]
    ChannelClosed,
}

pub type SubscriberResult<T> = Result<T, SubscriberError>;

/// Subscriber configuration
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// Redis connection URL
    pub redis_url: String,
    /// Channel buffer size for broadcast
    pub broadcast_buffer: usize,
    /// Reconnection delay in milliseconds
    pub reconnect_delay_ms: u64,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            broadcast_buffer: 1024,
            reconnect_delay_ms: 1000,
        }
    }
}

impl From<&manada_common::RedisConfig> for SubscriberConfig {
    fn from(config: &manada_common::RedisConfig) -> Self {
        Self {
            redis_url: config.url.clone(),
            ..Self::default()
        }
    }
}

/// Redis Pub/Sub subscriber
pub struct Subscriber {
    broadcast_tx: broadcast::Sender<ChangeEvent>,
    shutdown_tx: mpsc::Sender<()>,
}

impl Subscriber {
    /// Create a new subscriber and start the background listener
    pub async fn new(config: SubscriberConfig) -> SubscriberResult<Self> {
        // Fail fast on a malformed URL; connection errors are retried later.
        Client::open(config.redis_url.as_str())?;

        let (broadcast_tx, _) = broadcast::channel(config.broadcast_buffer.max(1));
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        tokio::spawn(Self::listener_loop(config, broadcast_tx.clone(), shutdown_rx));

        Ok(Self {
            broadcast_tx,
            shutdown_tx,
        })
    }

    async fn listener_loop(
        config: SubscriberConfig,
        broadcast_tx: broadcast::Sender<ChangeEvent>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        loop {
            match Self::run_listener(&config, &broadcast_tx, &mut shutdown_rx).await {
                Ok(()) => {
                    tracing::info!("Subscriber shutting down");
                    break;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Subscriber error, reconnecting...");
                    tokio::time::sleep(tokio::time::Duration::from_millis(
                        config.reconnect_delay_ms,
                    ))
                    .await;
                }
            }
        }
    }

    /// Run the listener until error or shutdown
    async fn run_listener(
        config: &SubscriberConfig,
        broadcast_tx: &broadcast::Sender<ChangeEvent>,
        shutdown_rx: &mut mpsc::Receiver<()>,
    ) -> SubscriberResult<()> {
        let client = Client::open(config.redis_url.as_str())?;
        let mut pubsub = client.get_async_pubsub().await?;
        pubsub.psubscribe(ALL_COLLECTIONS_PATTERN).await?;

        tracing::info!(pattern = ALL_COLLECTIONS_PATTERN, "Subscriber connected to Redis");

        let mut stream = pubsub.on_message();

        loop {
            tokio::select! {
                msg = stream.next() => {
                    let Some(msg) = msg else {
                        tracing::warn!("Pub/Sub stream ended");
                        return Err(SubscriberError::ChannelClosed);
                    };
                    let payload: String = msg.get_payload().unwrap_or_default();
                    match decode_change(&payload) {
                        Some(change) => {
                            // No local receivers is fine
                            let _ = broadcast_tx.send(change);
                        }
                        None => {
                            tracing::trace!(
                                channel = %msg.get_channel_name(),
                                "Ignoring non-change Pub/Sub message"
                            );
                        }
                    }
                }
                _ = shutdown_rx.recv() => return Ok(()),
            }
        }
    }

    /// Get a receiver for change events from every instance
    #[must_use]
    pub fn receiver(&self) -> broadcast::Receiver<ChangeEvent> {
        self.broadcast_tx.subscribe()
    }

    pub async fn shutdown(&self) -> SubscriberResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| SubscriberError::ChannelClosed)
    }
}

fn decode_change(payload: &str) -> Option<ChangeEvent> {
    serde_json::from_str::<PubSubEvent>(payload)
        .ok()?
        .change_event()
}
