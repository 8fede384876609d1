//! PostgreSQL implementation of NotificationRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use manada_core::{DocId, NotificationEvent, NotificationRepository, RepoResult};

use crate::models::NotificationModel;

use super::error::map_db_error;

/// PostgreSQL implementation of NotificationRepository
#[derive(Clone)]
pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &DocId) -> RepoResult<Option<NotificationEvent>> {
        let result = sqlx::query_as::<_, NotificationModel>(
            r#"
            SELECT id, recipient_id, notification_type, from_user_id, subject_id, read, created_at
            FROM notifications
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(NotificationEvent::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn list_for(
        &self,
        recipient_id: &DocId,
        unread_only: bool,
        limit: i64,
    ) -> RepoResult<Vec<NotificationEvent>> {
        let rows = sqlx::query_as::<_, NotificationModel>(
            r#"
            SELECT id, recipient_id, notification_type, from_user_id, subject_id, read, created_at
            FROM notifications
            WHERE recipient_id = $1 AND (NOT $2 OR read = FALSE)
            ORDER BY created_at DESC, id DESC
            LIMIT $3
            "#,
        )
        .bind(recipient_id.as_str())
        .bind(unread_only)
        .bind(limit.max(1))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(NotificationEvent::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn mark_read(&self, id: &DocId) -> RepoResult<bool> {
        let result = sqlx::query("UPDATE notifications SET read = TRUE WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
