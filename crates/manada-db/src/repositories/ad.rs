//! PostgreSQL implementation of AdRepository

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use manada_core::{Ad, AdQuery, AdRepository, AdStatus, DocId, DomainError, RepoResult};

use crate::models::AdModel;

use super::error::{map_db_error, map_unique_violation};

const SELECT_AD: &str = r#"
    SELECT id, advertiser_id, title, description, image_url, target_url,
           budget_cents, status, rejection_reason, created_at, updated_at
    FROM ads"#;

/// PostgreSQL implementation of AdRepository
#[derive(Clone)]
pub struct PgAdRepository {
    pool: PgPool,
}

impl PgAdRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn build_list_query(query: &AdQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(SELECT_AD);
    qb.push(" WHERE TRUE");
    if let Some(status) = query.status {
        qb.push(" AND status = ");
        qb.push_bind(status.as_str());
    }
    if let Some(advertiser) = &query.advertiser_id {
        qb.push(" AND advertiser_id = ");
        qb.push_bind(advertiser.as_str().to_string());
    }
    qb.push(" ORDER BY created_at DESC, id DESC LIMIT ");
    qb.push_bind(query.limit.max(1));
    qb
}

#[async_trait]
impl AdRepository for PgAdRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &DocId) -> RepoResult<Option<Ad>> {
        let result = sqlx::query_as::<_, AdModel>(&format!("{SELECT_AD} WHERE id = $1"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        result.map(Ad::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn list(&self, query: &AdQuery) -> RepoResult<Vec<Ad>> {
        let rows = build_list_query(query)
            .build_query_as::<AdModel>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        rows.into_iter().map(Ad::try_from).collect()
    }

    #[instrument(skip(self, ad), fields(ad_id = %ad.id))]
    async fn create(&self, ad: &Ad) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO ads (id, advertiser_id, title, description, image_url, target_url,
                             budget_cents, status, rejection_reason, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(ad.id.as_str())
        .bind(ad.advertiser_id.as_str())
        .bind(&ad.title)
        .bind(&ad.description)
        .bind(&ad.image_url)
        .bind(&ad.target_url)
        .bind(ad.budget_cents)
        .bind(ad.status.as_str())
        .bind(&ad.rejection_reason)
        .bind(ad.created_at)
        .bind(ad.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || DomainError::DocumentAlreadyExists {
                collection: "ads".to_string(),
                id: ad.id.clone(),
            })
        })?;

        Ok(())
    }

    #[instrument(skip(self, ad), fields(ad_id = %ad.id))]
    async fn update(&self, ad: &Ad) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE ads
            SET title = $2, description = $3, image_url = $4, target_url = $5,
                budget_cents = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(ad.id.as_str())
        .bind(&ad.title)
        .bind(&ad.description)
        .bind(&ad.image_url)
        .bind(&ad.target_url)
        .bind(ad.budget_cents)
        .bind(ad.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::AdNotFound(ad.id.clone()));
        }
        Ok(())
    }

    #[instrument(skip(self, ad), fields(ad_id = %ad.id, expected = %expected))]
    async fn update_if_status(&self, ad: &Ad, expected: AdStatus) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE ads
            SET status = $3, rejection_reason = $4, updated_at = $5
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(ad.id.as_str())
        .bind(expected.as_str())
        .bind(ad.status.as_str())
        .bind(&ad.rejection_reason)
        .bind(ad.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &DocId) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM ads WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgAdRepository>();
    }

    #[test]
    fn test_list_sql_filters() {
        let query = AdQuery {
            status: Some(AdStatus::Active),
            advertiser_id: None,
            limit: 5,
        };
        let qb = build_list_query(&query);
        let sql = qb.sql();
        assert!(sql.contains("AND status = $1"));
        assert!(!sql.contains("advertiser_id ="));
        assert!(sql.ends_with("LIMIT $2"));
    }
}
