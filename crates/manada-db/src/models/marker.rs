//! Marker database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for markers table
#[derive(Debug, Clone, FromRow)]
pub struct MarkerModel {
    pub collection: String,
    pub parent_id: String,
    pub user_id: String,
    pub kind: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
