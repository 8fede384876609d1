//! Pooled Redis connections for change fan-out.

use deadpool_redis::{Config, Connection, Pool, Runtime};
use redis::AsyncCommands;
use tracing::{debug, info};

use manada_common::RedisConfig;

/// Pool sizing for the change publisher
#[derive(Debug, Clone)]
pub struct RedisPoolConfig {
    pub url: String,
    pub max_connections: usize,
}

impl Default for RedisPoolConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            max_connections: 8,
        }
    }
}

impl From<&RedisConfig> for RedisPoolConfig {
    fn from(config: &RedisConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections.max(1) as usize,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RedisPoolError {
    #[error("Invalid Redis pool settings: {0}")]
    Build(String),

    #[error("No Redis connection available: {0}")]
    Checkout(#[from] deadpool_redis::PoolError),

    #[error("Redis command failed: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Payload encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type RedisResult<T> = Result<T, RedisPoolError>;

/// Host part of a Redis URL, without credentials
fn redacted_url(url: &str) -> &str {
    url.rsplit('@').next().unwrap_or(url)
}

/// Shared Redis pool; cloning shares the underlying connections
#[derive(Clone)]
pub struct RedisPool {
    pool: Pool,
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.pool.status();
        f.debug_struct("RedisPool")
            .field("size", &status.size)
            .field("available", &status.available)
            .finish()
    }
}

impl RedisPool {
    pub fn new(config: RedisPoolConfig) -> RedisResult<Self> {
        let pool = Config::from_url(&config.url)
            .builder()
            .map_err(|e| RedisPoolError::Build(e.to_string()))?
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| RedisPoolError::Build(e.to_string()))?;

        info!(
            url = %redacted_url(&config.url),
            max_connections = config.max_connections,
            "Redis change pool ready"
        );
        Ok(Self { pool })
    }

    pub fn from_config(config: &RedisConfig) -> RedisResult<Self> {
        Self::new(RedisPoolConfig::from(config))
    }

    pub async fn get(&self) -> RedisResult<Connection> {
        Ok(self.pool.get().await?)
    }

    /// PUBLISH a text payload; returns how many subscribers received it
    pub async fn publish_text(&self, channel: &str, payload: &str) -> RedisResult<u32> {
        let mut conn = self.get().await?;
        let receivers: u32 = conn.publish(channel, payload).await?;
        debug!(channel, receivers, "Change published");
        Ok(receivers)
    }

    /// Readiness probe
    pub async fn health_check(&self) -> RedisResult<()> {
        let mut conn = self.get().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RedisPoolConfig::default();
        assert_eq!(config.url, "redis://127.0.0.1:6379");
        assert_eq!(config.max_connections, 8);
    }

    #[test]
    fn test_config_from_redis_config() {
        let pool_config = RedisPoolConfig::from(&RedisConfig {
            url: "redis://cache:6380".to_string(),
            max_connections: 0,
        });
        assert_eq!(pool_config.url, "redis://cache:6380");
        assert_eq!(pool_config.max_connections, 1);
    }

    #[test]
    fn test_redacted_url_hides_credentials() {
        assert_eq!(redacted_url("redis://user:pw@cache:6379/0"), "cache:6379/0");
        assert_eq!(redacted_url("redis://cache:6379"), "redis://cache:6379");
    }

    #[tokio::test]
    async fn test_pool_builds_without_connecting() {
        let pool = RedisPool::new(RedisPoolConfig::default()).unwrap();
        assert!(format!("{pool:?}").contains("available"));
    }
}
