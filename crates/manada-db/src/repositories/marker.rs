//! PostgreSQL implementation of MarkerRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};

use manada_core::{
    DocId, Document, DomainError, MarkerRepository, ReactionKind, ReactionTarget, RepoResult,
    ToggleDecision, ToggleIntent, ToggleOutcome, UserMarker, WriteBatch,
};

use crate::models::{DocumentModel, MarkerModel};

use super::batch::apply_op;
use super::error::map_db_error;

/// PostgreSQL implementation of MarkerRepository
#[derive(Clone)]
pub struct PgMarkerRepository {
    pool: PgPool,
}

impl PgMarkerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MarkerRepository for PgMarkerRepository {
    #[instrument(skip(self), fields(target = target.name))]
    async fn find(
        &self,
        target: &ReactionTarget,
        parent_id: &DocId,
        user_id: &DocId,
    ) -> RepoResult<Option<UserMarker>> {
        let result = sqlx::query_as::<_, MarkerModel>(
            r#"
            SELECT collection, parent_id, user_id, kind, created_at, updated_at
            FROM markers
            WHERE collection = $1 AND parent_id = $2 AND user_id = $3
            "#,
        )
        .bind(target.marker_collection)
        .bind(parent_id.as_str())
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(UserMarker::try_from).transpose()
    }

    #[instrument(skip(self), fields(target = target.name))]
    async fn count_for(&self, target: &ReactionTarget, parent_id: &DocId) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM markers WHERE collection = $1 AND parent_id = $2",
        )
        .bind(target.marker_collection)
        .bind(parent_id.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, intent), fields(target = target.name))]
    async fn toggle_atomic(
        &self,
        target: &ReactionTarget,
        parent_id: &DocId,
        actor_id: &DocId,
        intent: &ToggleIntent,
        now: DateTime<Utc>,
    ) -> RepoResult<ToggleOutcome> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Row lock on the parent serializes toggles on it until commit; the
        // marker read below therefore sees every previously committed toggle.
        let parent = sqlx::query_as::<_, DocumentModel>(
            r#"
            SELECT collection, id, owner_id, data, created_at, updated_at
            FROM documents
            WHERE collection = $1 AND id = $2
            FOR UPDATE
            "#,
        )
        .bind(target.parent_collection)
        .bind(parent_id.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?
        .map(Document::try_from)
        .transpose()?
        .ok_or_else(|| DomainError::document_not_found(target.parent_collection, parent_id.clone()))?;

        let existing = sqlx::query_scalar::<_, String>(
            r#"
            SELECT kind FROM markers
            WHERE collection = $1 AND parent_id = $2 AND user_id = $3
            "#,
        )
        .bind(target.marker_collection)
        .bind(parent_id.as_str())
        .bind(actor_id.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?
        .map(|raw| ReactionKind::parse(&raw))
        .transpose()?;

        let decision = ToggleDecision::decide(existing.as_ref(), intent, target.allows_kind_change);
        let batch = WriteBatch::for_decision(target, &parent, actor_id, &decision, now);
        for op in batch.ops() {
            apply_op(&mut *tx, op).await?;
        }
        tx.commit().await.map_err(map_db_error)?;

        let count = (parent.counter(target.counter_field) + decision.counter_delta()).max(0);
        debug!(decision = decision.as_str(), count, "Toggle committed");

        let notification = batch.notifications().next().cloned();
        Ok(ToggleOutcome {
            kind: decision.resulting_kind(existing.as_ref()),
            notification,
            decision,
            count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgMarkerRepository>();
    }
}
