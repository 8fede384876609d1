//! Notification database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct NotificationModel {
    pub id: String,
    pub recipient_id: String,
    pub notification_type: String,
    pub from_user_id: String,
    pub subject_id: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
