//! Configuration structs

mod app_config;

pub use app_config::{
    AdminConfig, AppConfig, AppSettings, ConfigError, CorsConfig, DatabaseConfig, Environment,
    FeedConfig, JwtConfig, MomentConfig, RateLimitConfig, ReactionConfig, RedisConfig,
    ServerConfig, StorageBackend, StorageConfig,
};
