//! PostgreSQL implementation of MomentRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{info, instrument};

use manada_core::{DocId, Moment, MomentRepository, RepoResult};

use crate::models::MomentModel;

use super::error::map_db_error;

/// PostgreSQL implementation of MomentRepository
#[derive(Clone)]
pub struct PgMomentRepository {
    pool: PgPool,
}

impl PgMomentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MomentRepository for PgMomentRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &DocId) -> RepoResult<Option<Moment>> {
        let result = sqlx::query_as::<_, MomentModel>(
            r#"
            SELECT id, author_id, media_url, caption, created_at, expires_at
            FROM moments
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Moment::try_from).transpose()
    }

    #[instrument(skip(self, moment), fields(moment_id = %moment.id))]
    async fn create(&self, moment: &Moment) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO moments (id, author_id, media_url, caption, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(moment.id.as_str())
        .bind(moment.author_id.as_str())
        .bind(&moment.media_url)
        .bind(&moment.caption)
        .bind(moment.created_at)
        .bind(moment.expires_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_active(
        &self,
        now: DateTime<Utc>,
        author_id: Option<&DocId>,
        limit: i64,
    ) -> RepoResult<Vec<Moment>> {
        let rows = sqlx::query_as::<_, MomentModel>(
            r#"
            SELECT id, author_id, media_url, caption, created_at, expires_at
            FROM moments
            WHERE expires_at > $1 AND ($2::text IS NULL OR author_id = $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3
            "#,
        )
        .bind(now)
        .bind(author_id.map(|a| a.as_str().to_string()))
        .bind(limit.max(1))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(Moment::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn delete_expired(&self, now: DateTime<Utc>) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM moments WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        let removed = result.rows_affected();
        if removed > 0 {
            info!(removed, "Expired moments deleted");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgMomentRepository>();
    }
}
