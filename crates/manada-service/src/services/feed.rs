//! Feed service
//!
//! Cursor-paginated document feeds with sponsored entries spliced in at a
//! fixed position.

use chrono::Utc;
use manada_core::{
    collections, splice_sponsored, ChangeEvent, DocId, Document, DomainError, FeedCursor,
    FeedEntry, FeedQuery, FieldFilter,
};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::dto::{CreatePostRequest, FeedItemResponse, FeedPageResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Feed service
pub struct FeedService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> FeedService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a post with zeroed counters
    #[instrument(skip(self, request))]
    pub async fn create_post(
        &self,
        author_id: &DocId,
        request: CreatePostRequest,
    ) -> ServiceResult<FeedItemResponse> {
        let mut data = Map::new();
        data.insert("authorId".to_string(), Value::from(author_id.as_str()));
        data.insert("content".to_string(), Value::from(request.content.trim()));
        if let Some(url) = request.image_url {
            data.insert("imageUrl".to_string(), Value::from(url));
        }
        if let Some(circle) = request.circle_id {
            data.insert("circleId".to_string(), Value::from(circle));
        }
        for counter in ["likesCount", "reactionsCount", "commentsCount"] {
            data.insert(counter.to_string(), Value::from(0));
        }

        let post = Document::with_id(
            DocId::generate(),
            collections::POSTS,
            Some(author_id.clone()),
            data,
            Utc::now(),
        );
        self.ctx.document_repo().create(&post).await?;
        info!(post_id = %post.id, "Post created");

        self.ctx
            .publish_changes(&[ChangeEvent::added(collections::POSTS, post.id.clone())])
            .await;
        Ok(FeedItemResponse::organic(&post))
    }

    /// Run a feed query
    #[instrument(skip(self), fields(collection = %query.collection))]
    pub async fn page(&self, query: &FeedQuery) -> ServiceResult<Vec<Document>> {
        Ok(self.ctx.document_repo().query(query).await?)
    }

    /// Active sponsored posts, newest first
    #[instrument(skip(self))]
    pub async fn sponsored(&self, limit: usize) -> ServiceResult<Vec<Document>> {
        let query = FeedQuery::new(collections::SPONSORED_POSTS)
            .filter(FieldFilter::eq("active", true))
            .limit(limit);
        self.page(&query).await
    }

    /// One page with sponsored entries spliced at the configured position
    pub async fn page_with_sponsored(&self, query: &FeedQuery) -> ServiceResult<Vec<FeedEntry>> {
        let organic = self.page(query).await?;
        let sponsored = self.sponsored(1).await?;
        Ok(splice_sponsored(
            &organic,
            &sponsored,
            self.ctx.feed_config().sponsored_position,
        ))
    }

    /// Newest posts after `after_id`; sponsored entries only on the first page
    #[instrument(skip(self))]
    pub async fn posts(
        &self,
        limit: Option<usize>,
        after_id: Option<&DocId>,
    ) -> ServiceResult<FeedPageResponse> {
        let limit = limit.unwrap_or(self.ctx.feed_config().page_size);
        let mut query = FeedQuery::new(collections::POSTS).limit(limit);

        if let Some(after_id) = after_id {
            let anchor = self
                .ctx
                .document_repo()
                .find_by_id(collections::POSTS, after_id)
                .await?
                .ok_or_else(|| DomainError::document_not_found(collections::POSTS, after_id.clone()))?;
            let cursor = FeedCursor::from_document(&anchor, &query.order_by);
            query = query.start_after(Some(cursor));
        }

        let organic = self.page(&query).await?;
        let end_of_data = organic.len() < query.limit;
        let next_cursor = organic
            .last()
            .map(|doc| FeedCursor::from_document(doc, &query.order_by));

        let entries = if query.start_after.is_none() {
            let sponsored = self.sponsored(1).await?;
            splice_sponsored(&organic, &sponsored, self.ctx.feed_config().sponsored_position)
        } else {
            organic.into_iter().map(FeedEntry::Organic).collect()
        };
        debug!(entries = entries.len(), end_of_data, "Feed page loaded");

        Ok(FeedPageResponse {
            items: entries.iter().map(FeedItemResponse::from).collect(),
            next_cursor,
            end_of_data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use manada_common::AppConfig;
    use manada_db::{MemoryChangeBus, MemoryStore};
    use serde_json::json;

    fn context() -> ServiceContext {
        ServiceContext::in_memory(
            &AppConfig::local("test-secret"),
            MemoryStore::new(),
            MemoryChangeBus::new(),
        )
    }

    async fn seed_posts(ctx: &ServiceContext, n: i64) {
        let base = Utc::now();
        for i in 0..n {
            let doc = Document::with_id(
                DocId::parse(&format!("p{i}")).unwrap(),
                collections::POSTS,
                None,
                json!({ "content": format!("post {i}") }).as_object().cloned().unwrap(),
                base + Duration::seconds(i),
            );
            ctx.document_repo().create(&doc).await.unwrap();
        }
    }

    async fn seed_sponsored(ctx: &ServiceContext, active: bool) {
        let doc = Document::new(
            collections::SPONSORED_POSTS,
            None,
            json!({ "active": active, "content": "Buy kibble" })
                .as_object()
                .cloned()
                .unwrap(),
        );
        ctx.document_repo().create(&doc).await.unwrap();
    }

    #[tokio::test]
    async fn test_pages_until_end_of_data() {
        let ctx = context();
        seed_posts(&ctx, 5).await;
        let service = FeedService::new(&ctx);

        let first = service.posts(Some(3), None).await.unwrap();
        assert_eq!(first.items.len(), 3);
        assert!(!first.end_of_data);
        assert_eq!(first.items[0].fields["id"], "p4");

        let after = DocId::parse("p2").unwrap();
        let second = service.posts(Some(3), Some(&after)).await.unwrap();
        let ids: Vec<_> = second.items.iter().map(|i| i.fields["id"].clone()).collect();
        assert_eq!(ids, vec![json!("p1"), json!("p0")]);
        assert!(second.end_of_data);
    }

    #[tokio::test]
    async fn test_sponsored_spliced_on_first_page_only() {
        let ctx = context();
        seed_posts(&ctx, 6).await;
        seed_sponsored(&ctx, false).await;
        seed_sponsored(&ctx, true).await;
        let service = FeedService::new(&ctx);

        let first = service.posts(Some(4), None).await.unwrap();
        assert_eq!(first.items.len(), 5);
        assert!(first.items[3].sponsored);
        assert_eq!(first.items[3].fields["active"], true);
        assert_eq!(first.next_cursor.unwrap().id.as_str(), "p2");

        let after = DocId::parse("p2").unwrap();
        let second = service.posts(Some(4), Some(&after)).await.unwrap();
        assert!(second.items.iter().all(|i| !i.sponsored));
    }

    #[tokio::test]
    async fn test_short_list_has_no_sponsored_entry() {
        let ctx = context();
        seed_posts(&ctx, 2).await;
        seed_sponsored(&ctx, true).await;

        let query = FeedQuery::new(collections::POSTS).limit(10);
        let entries = FeedService::new(&ctx).page_with_sponsored(&query).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| !e.is_sponsored()));
    }

    #[tokio::test]
    async fn test_create_post_zeroes_counters() {
        let ctx = context();
        let author = DocId::parse("A").unwrap();
        let post = FeedService::new(&ctx)
            .create_post(
                &author,
                CreatePostRequest {
                    content: "first walk".to_string(),
                    image_url: None,
                    circle_id: Some("dogs".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(post.fields["likesCount"], 0);
        assert_eq!(post.fields["ownerId"], "A");
        assert_eq!(post.fields["circleId"], "dogs");
    }

    #[tokio::test]
    async fn test_unknown_cursor_is_not_found() {
        let ctx = context();
        let missing = DocId::parse("nope").unwrap();
        let err = FeedService::new(&ctx).posts(None, Some(&missing)).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }
}
