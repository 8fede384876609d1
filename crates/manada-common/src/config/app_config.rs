//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use manada_core::ConsistencyMode;
use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub storage: StorageConfig,
    pub database: Option<DatabaseConfig>,
    pub redis: Option<RedisConfig>,
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub reactions: ReactionConfig,
    pub moments: MomentConfig,
    pub feed: FeedConfig,
    pub admin: AdminConfig,
}

/// General application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Where documents are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    Postgres,
    /// Process-local store; data is lost on restart
    Memory,
}

impl StorageBackend {
    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Some(Self::Postgres),
            "memory" | "in-memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// Document store identity
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub project_id: String,
    /// Storage provider API key, forwarded by clients that talk to the store directly
    pub api_key: Option<String>,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Redis configuration (optional; enables cross-instance change events)
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: Option<String>,
    pub access_token_expiry: i64,
}

/// Rate limiting configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst: u32,
}

/// CORS configuration
#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

/// Reaction toggle settings
#[derive(Debug, Clone, Copy, Default)]
pub struct ReactionConfig {
    pub consistency: ConsistencyMode,
}

/// Moment expiry settings
#[derive(Debug, Clone, Copy, Default)]
pub struct MomentConfig {
    /// Seconds between sweeps of expired moments; 0 disables the sweeper
    pub sweep_interval_secs: u64,
}

/// Feed settings
#[derive(Debug, Clone, Copy)]
pub struct FeedConfig {
    pub page_size: usize,
    /// Index at which a sponsored entry is spliced into the organic list
    pub sponsored_position: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: default_feed_page_size(),
            sponsored_position: default_sponsored_position(),
        }
    }
}

/// Users allowed to review ads
#[derive(Debug, Clone, Default)]
pub struct AdminConfig {
    pub user_ids: Vec<String>,
}

impl AdminConfig {
    #[must_use]
    pub fn is_admin(&self, user_id: &str) -> bool {
        self.user_ids.iter().any(|id| id == user_id)
    }
}

// Default value functions
fn default_app_name() -> String {
    "manada".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_project_id() -> String {
    "manada-local".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_access_token_expiry() -> i64 {
    3600 // 1 hour
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    50
}

fn default_feed_page_size() -> usize {
    10
}

fn default_sponsored_position() -> usize {
    3
}

/// Read and parse an optional variable; unparsable values are an error
fn parse_var<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        Err(_) => Ok(None),
    }
}

fn list_var(name: &str) -> Vec<String> {
    env::var(name)
        .ok()
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let backend = match env::var("STORAGE_BACKEND") {
            Ok(raw) => StorageBackend::parse(&raw)
                .ok_or(ConfigError::InvalidValue("STORAGE_BACKEND", raw))?,
            Err(_) => StorageBackend::default(),
        };

        let database = match env::var("DATABASE_URL") {
            Ok(url) => Some(DatabaseConfig {
                url,
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS")?
                    .unwrap_or_else(default_max_connections),
                min_connections: parse_var("DATABASE_MIN_CONNECTIONS")?
                    .unwrap_or_else(default_min_connections),
            }),
            Err(_) if backend == StorageBackend::Postgres => {
                return Err(ConfigError::MissingVar("DATABASE_URL"))
            }
            Err(_) => None,
        };

        let redis = env::var("REDIS_URL").ok().map(|url| -> Result<_, ConfigError> {
            Ok(RedisConfig {
                url,
                max_connections: parse_var("REDIS_MAX_CONNECTIONS")?
                    .unwrap_or_else(default_redis_max_connections),
            })
        });

        let consistency = match env::var("REACTION_CONSISTENCY") {
            Ok(raw) => ConsistencyMode::parse(&raw)
                .ok_or(ConfigError::InvalidValue("REACTION_CONSISTENCY", raw))?,
            Err(_) => ConsistencyMode::default(),
        };

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| Environment::parse(&s))
                    .unwrap_or_default(),
            },
            api: ServerConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| default_host()),
                port: parse_var("API_PORT")?.unwrap_or_else(default_port),
            },
            storage: StorageConfig {
                backend,
                project_id: env::var("STORAGE_PROJECT_ID").unwrap_or_else(|_| default_project_id()),
                api_key: env::var("STORAGE_API_KEY").ok(),
            },
            database,
            redis: redis.transpose()?,
            jwt: JwtConfig {
                secret: env::var("JWT_SECRET").map_err(|_| ConfigError::MissingVar("JWT_SECRET"))?,
                issuer: env::var("JWT_ISSUER").ok(),
                access_token_expiry: parse_var("JWT_ACCESS_TOKEN_EXPIRY")?
                    .unwrap_or_else(default_access_token_expiry),
            },
            rate_limit: RateLimitConfig {
                requests_per_second: parse_var("RATE_LIMIT_REQUESTS_PER_SECOND")?
                    .unwrap_or_else(default_requests_per_second),
                burst: parse_var("RATE_LIMIT_BURST")?.unwrap_or_else(default_burst),
            },
            cors: CorsConfig {
                allowed_origins: list_var("CORS_ALLOWED_ORIGINS"),
            },
            reactions: ReactionConfig { consistency },
            moments: MomentConfig {
                sweep_interval_secs: parse_var("MOMENT_SWEEP_INTERVAL_SECS")?.unwrap_or(0),
            },
            feed: FeedConfig {
                page_size: parse_var("FEED_PAGE_SIZE")?.unwrap_or_else(default_feed_page_size),
                sponsored_position: parse_var("FEED_SPONSORED_POSITION")?
                    .unwrap_or_else(default_sponsored_position),
            },
            admin: AdminConfig {
                user_ids: list_var("ADMIN_USER_IDS"),
            },
        })
    }

    /// Self-contained configuration backed by the in-memory store.
    ///
    /// Used by tests and local demos; needs no external services.
    #[must_use]
    pub fn local(jwt_secret: &str) -> Self {
        Self {
            app: AppSettings {
                name: default_app_name(),
                env: Environment::Development,
            },
            api: ServerConfig {
                host: default_host(),
                port: 0,
            },
            storage: StorageConfig {
                backend: StorageBackend::Memory,
                project_id: default_project_id(),
                api_key: None,
            },
            database: None,
            redis: None,
            jwt: JwtConfig {
                secret: jwt_secret.to_string(),
                issuer: None,
                access_token_expiry: default_access_token_expiry(),
            },
            rate_limit: RateLimitConfig {
                requests_per_second: 1000,
                burst: 1000,
            },
            cors: CorsConfig::default(),
            reactions: ReactionConfig::default(),
            moments: MomentConfig::default(),
            feed: FeedConfig::default(),
            admin: AdminConfig::default(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
