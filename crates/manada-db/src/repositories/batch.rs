//! Write-op execution inside an open transaction

use manada_core::{DomainError, RepoResult, WriteOp};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgConnection;

use super::error::{document_exists, map_db_error, map_unique_violation};

/// Execute one write op on the transaction's connection.
///
/// Any error aborts the caller's transaction, so a batch lands entirely or
/// not at all.
pub(crate) async fn apply_op(conn: &mut PgConnection, op: &WriteOp) -> RepoResult<()> {
    match op {
        WriteOp::UpsertMarker(marker) => {
            sqlx::query(
                r#"
                INSERT INTO markers (collection, parent_id, user_id, kind, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (collection, parent_id, user_id)
                DO UPDATE SET kind = EXCLUDED.kind, updated_at = EXCLUDED.updated_at
                "#,
            )
            .bind(&marker.collection)
            .bind(marker.parent_id.as_str())
            .bind(marker.user_id.as_str())
            .bind(marker.kind.as_str())
            .bind(marker.created_at)
            .bind(marker.updated_at)
            .execute(&mut *conn)
            .await
            .map_err(map_db_error)?;
        }
        WriteOp::UpdateMarkerKind {
            collection,
            parent_id,
            user_id,
            kind,
        } => {
            sqlx::query(
                r#"
                UPDATE markers SET kind = $4, updated_at = NOW()
                WHERE collection = $1 AND parent_id = $2 AND user_id = $3
                "#,
            )
            .bind(collection)
            .bind(parent_id.as_str())
            .bind(user_id.as_str())
            .bind(kind.as_str())
            .execute(&mut *conn)
            .await
            .map_err(map_db_error)?;
        }
        WriteOp::DeleteMarker {
            collection,
            parent_id,
            user_id,
        } => {
            sqlx::query(
                r#"
                DELETE FROM markers WHERE collection = $1 AND parent_id = $2 AND user_id = $3
                "#,
            )
            .bind(collection)
            .bind(parent_id.as_str())
            .bind(user_id.as_str())
            .execute(&mut *conn)
            .await
            .map_err(map_db_error)?;
        }
        WriteOp::IncrementCounter {
            collection,
            doc_id,
            field,
            delta,
        } => {
            let result = sqlx::query(
                r#"
                UPDATE documents
                SET data = jsonb_set(
                        data,
                        ARRAY[$3::text],
                        to_jsonb(GREATEST(COALESCE((data ->> $3)::bigint, 0) + $4, 0))
                    ),
                    updated_at = NOW()
                WHERE collection = $1 AND id = $2
                "#,
            )
            .bind(collection)
            .bind(doc_id.as_str())
            .bind(field)
            .bind(*delta)
            .execute(&mut *conn)
            .await
            .map_err(map_db_error)?;

            if result.rows_affected() == 0 {
                return Err(DomainError::document_not_found(collection, doc_id.clone()));
            }
        }
        WriteOp::CreateNotification(n) => {
            sqlx::query(
                r#"
                INSERT INTO notifications
                    (id, recipient_id, notification_type, from_user_id, subject_id, read, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(n.id.as_str())
            .bind(n.recipient_id.as_str())
            .bind(&n.notification_type)
            .bind(n.from_user_id.as_str())
            .bind(n.subject_id.as_str())
            .bind(n.read)
            .bind(n.created_at)
            .execute(&mut *conn)
            .await
            .map_err(map_db_error)?;
        }
        WriteOp::CreateDocument(doc) => {
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
            .execute(&mut *conn)
            .await
            .map_err(|e| map_unique_violation(e, || document_exists(&doc.collection, &doc.id)))?;
        }
        WriteOp::DeleteDocument { collection, id } => {
            let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
                .bind(collection)
                .bind(id.as_str())
                .execute(&mut *conn)
                .await
                .map_err(map_db_error)?;

            // Nothing deleted aborts the batch, so a paired counter delta never repeats
            if result.rows_affected() == 0 {
                return Err(DomainError::document_not_found(collection, id.clone()));
            }
        }
    }
    Ok(())
}
