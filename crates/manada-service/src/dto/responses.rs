//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use manada_core::{AdStatus, FeedCursor};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Common Response Types
// ============================================================================

/// Generic API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

// ============================================================================
// Reaction Responses
// ============================================================================

/// Counter and the caller's marker on one parent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionResponse {
    pub target: String,
    pub parent_id: String,
    /// Authoritative counter value
    pub count: i64,
    /// The caller's reaction kind, if any
    pub me: Option<String>,
    /// What the last mutation did (`add`, `remove`, `change_kind`, `noop`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<String>,
}

// ============================================================================
// Content Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: String,
    pub post_id: String,
    pub author_id: Option<String>,
    pub content: String,
    pub likes_count: i64,
    pub created_at: DateTime<Utc>,
}

/// One feed entry: the document's fields plus its id and a sponsored flag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedItemResponse {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    pub sponsored: bool,
}

/// One page of the post feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedPageResponse {
    pub items: Vec<FeedItemResponse>,
    /// Cursor of the last organic entry
    pub next_cursor: Option<FeedCursor>,
    /// The page came back shorter than requested
    pub end_of_data: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentResponse {
    pub id: String,
    pub author_id: String,
    pub media_url: Option<String>,
    pub caption: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// e.g. `"5h 12m"`, `"<1m"` or `"expired"`
    pub time_remaining: String,
    /// Elapsed fraction of the 24h lifetime
    pub progress: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub from_user_id: String,
    pub post_id: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Ad Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdResponse {
    pub id: String,
    pub advertiser_id: String,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub target_url: Option<String>,
    pub budget_cents: i64,
    pub status: AdStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Analytics Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsEventResponse {
    pub id: String,
    pub event_type: String,
    pub user_id: Option<String>,
    pub properties: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSummaryResponse {
    pub total: usize,
    pub by_type: BTreeMap<String, usize>,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each backing service
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: String,
    pub redis: String,
}

impl ReadinessResponse {
    /// `None` means the backend is not configured and does not count against readiness
    pub fn ready(database: Option<bool>, redis: Option<bool>) -> Self {
        fn label(check: Option<bool>) -> String {
            match check {
                Some(true) => "healthy",
                Some(false) => "unhealthy",
                None => "disabled",
            }
            .to_string()
        }

        let all_healthy = database.unwrap_or(true) && redis.unwrap_or(true);
        Self {
            status: if all_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: label(database),
                redis: label(redis),
            },
        }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
