//! PostgreSQL implementation of DocumentRepository

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, instrument};

use manada_core::{
    DocId, Document, DocumentRepository, DomainError, FeedQuery, RepoResult, SortDirection,
    WriteBatch,
};

use crate::models::DocumentModel;

use super::batch::apply_op;
use super::error::{document_exists, map_db_error, map_unique_violation};

const SELECT_DOCUMENT: &str =
    "SELECT collection, id, owner_id, data, created_at, updated_at FROM documents";

/// PostgreSQL implementation of DocumentRepository
#[derive(Clone)]
pub struct PgDocumentRepository {
    pool: PgPool,
}

impl PgDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// SQL expression yielding a field as jsonb; missing fields read as JSON null
fn push_field(qb: &mut QueryBuilder<'_, Postgres>, field: &str) {
    match field {
        "id" => {
            qb.push("to_jsonb(id)");
        }
        "ownerId" => {
            qb.push("COALESCE(to_jsonb(owner_id), 'null'::jsonb)");
        }
        _ => {
            qb.push("COALESCE(data -> ");
            qb.push_bind(field.to_string());
            qb.push(", 'null'::jsonb)");
        }
    }
}

/// Build the feed SELECT for a query
fn build_feed_query(query: &FeedQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(SELECT_DOCUMENT);
    qb.push(" WHERE collection = ");
    qb.push_bind(query.collection.clone());

    for filter in &query.filters {
        qb.push(" AND ");
        match filter.field.as_str() {
            // Missing fields never match a filter
            "id" | "ownerId" => push_field(&mut qb, &filter.field),
            field => {
                qb.push("data -> ");
                qb.push_bind(field.to_string());
            }
        }
        qb.push(" ");
        qb.push(filter.op.as_sql());
        qb.push(" ");
        qb.push_bind(Json(filter.value.clone()));
    }

    let (cmp, dir) = match query.direction {
        SortDirection::Asc => (">", SortDirection::Asc.as_sql()),
        SortDirection::Desc => ("<", SortDirection::Desc.as_sql()),
    };

    if let Some(cursor) = &query.start_after {
        qb.push(" AND (");
        push_field(&mut qb, &query.order_by);
        qb.push(", id COLLATE \"C\") ");
        qb.push(cmp);
        qb.push(" (");
        qb.push_bind(Json(cursor.value.clone()));
        qb.push(", ");
        qb.push_bind(cursor.id.as_str().to_string());
        qb.push(" COLLATE \"C\")");
    }

    qb.push(" ORDER BY ");
    push_field(&mut qb, &query.order_by);
    qb.push(" ");
    qb.push(dir);
    qb.push(", id COLLATE \"C\" ");
    qb.push(dir);
    qb.push(" LIMIT ");
    qb.push_bind(query.limit.clamp(1, FeedQuery::MAX_LIMIT) as i64);
    qb
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, collection: &str, id: &DocId) -> RepoResult<Option<Document>> {
        let result = sqlx::query_as::<_, DocumentModel>(&format!(
            "{SELECT_DOCUMENT} WHERE collection = $1 AND id = $2"
        ))
        .bind(collection)
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Document::try_from).transpose()
    }

    #[instrument(skip(self, doc), fields(collection = %doc.collection, id = %doc.id))]
    async fn create(&self, doc: &Document) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, owner_id, data, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&doc.collection)
        .bind(doc.id.as_str())
        .bind(doc.owner_id.as_ref().map(|o| o.as_str().to_string()))
        .bind(Json(Value::Object(doc.data.clone())))
        .bind(doc.created_at)
        .bind(doc.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || document_exists(&doc.collection, &doc.id)))?;

        Ok(())
    }

    #[instrument(skip(self, patch))]
    async fn merge_data(&self, collection: &str, id: &DocId, patch: &Map<String, Value>) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET data = data || $3, updated_at = NOW()
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id.as_str())
        .bind(Json(Value::Object(patch.clone())))
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::document_not_found(collection, id.clone()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, collection: &str, id: &DocId) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(collection = %query.collection))]
    async fn query(&self, query: &FeedQuery) -> RepoResult<Vec<Document>> {
        let mut qb = build_feed_query(query);
        debug!(sql = qb.sql(), "Running feed query");

        let rows = qb
            .build_query_as::<DocumentModel>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        rows.into_iter().map(Document::try_from).collect()
    }

    #[instrument(skip(self, batch), fields(ops = batch.len()))]
    async fn commit(&self, batch: &WriteBatch) -> RepoResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        for op in batch.ops() {
            apply_op(&mut *tx, op).await?;
        }
        tx.commit().await.map_err(map_db_error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use manada_core::{FeedCursor, FieldFilter};
    use serde_json::json;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgDocumentRepository>();
    }

    #[test]
    fn test_feed_sql_shape() {
        let query = FeedQuery::new("posts")
            .filter(FieldFilter::eq("circle", "dogs"))
            .limit(10)
            .start_after(Some(FeedCursor {
                value: json!(1000),
                id: DocId::parse("p9").unwrap(),
            }));

        let qb = build_feed_query(&query);
        let sql = qb.sql();
        assert!(sql.starts_with(SELECT_DOCUMENT));
        assert!(sql.contains("WHERE collection = $1"));
        assert!(sql.contains("data -> $2 = $3"));
        assert!(sql.contains("id COLLATE \"C\") < ($5, $6 COLLATE \"C\")"));
        assert!(sql.contains("ORDER BY COALESCE(data -> $7, 'null'::jsonb) DESC"));
        assert!(sql.ends_with("LIMIT $8"));
    }
}
