//! Ad database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for ads table
#[derive(Debug, Clone, FromRow)]
pub struct AdModel {
    pub id: String,
    pub advertiser_id: String,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub target_url: Option<String>,
    pub budget_cents: i64,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
