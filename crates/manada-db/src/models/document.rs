//! Document database model

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;

/// Database model for documents table
#[derive(Debug, Clone, FromRow)]
pub struct DocumentModel {
    pub collection: String,
    pub id: String,
    pub owner_id: Option<String>,
    pub data: Json<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
