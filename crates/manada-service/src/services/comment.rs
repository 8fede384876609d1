//! Comment service
//!
//! Comments live in their own collection; creating or deleting one moves the
//! parent post's `commentsCount` in the same batch.

use chrono::Utc;
use manada_core::{
    collections, ChangeEvent, DocId, Document, DomainError, FeedQuery, FieldFilter,
    NotificationEvent, SortDirection, WriteBatch, WriteOp,
};
use serde_json::{Map, Value};
use tracing::{info, instrument};

use crate::dto::CommentResponse;

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Maximum comment length in characters
pub const MAX_COMMENT_CHARS: usize = 2000;

const COMMENTS_COUNT: &str = "commentsCount";
const NEW_COMMENT: &str = "new_comment";

/// Comment service
pub struct CommentService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CommentService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a comment on a post
    #[instrument(skip(self, content))]
    pub async fn create(
        &self,
        post_id: &DocId,
        author_id: &DocId,
        content: &str,
    ) -> ServiceResult<CommentResponse> {
        let content = content.trim();
        if content.is_empty() {
            return Err(DomainError::ValidationError("comment must not be empty".to_string()).into());
        }
        if content.chars().count() > MAX_COMMENT_CHARS {
            return Err(DomainError::ContentTooLong {
                max: MAX_COMMENT_CHARS,
            }
            .into());
        }

        let post = self
            .ctx
            .document_repo()
            .find_by_id(collections::POSTS, post_id)
            .await?
            .ok_or_else(|| DomainError::document_not_found(collections::POSTS, post_id.clone()))?;

        let now = Utc::now();
        let mut data = Map::new();
        data.insert("postId".to_string(), Value::from(post_id.as_str()));
        data.insert("authorId".to_string(), Value::from(author_id.as_str()));
        data.insert("content".to_string(), Value::from(content));
        data.insert("likesCount".to_string(), Value::from(0));
        let comment = Document::with_id(
            DocId::generate(),
            collections::COMMENTS,
            Some(author_id.clone()),
            data,
            now,
        );

        let mut batch = WriteBatch::new();
        batch
            .push(WriteOp::CreateDocument(comment.clone()))
            .push(WriteOp::IncrementCounter {
                collection: collections::POSTS.to_string(),
                doc_id: post_id.clone(),
                field: COMMENTS_COUNT.to_string(),
                delta: 1,
            });
        let notification = NotificationEvent::for_action(
            post.owner_id.as_ref(),
            author_id,
            Some(NEW_COMMENT),
            post_id,
            now,
        );
        if let Some(n) = &notification {
            batch.push(WriteOp::CreateNotification(n.clone()));
        }
        self.ctx.document_repo().commit(&batch).await?;

        info!(comment_id = %comment.id, post_id = %post_id, "Comment created");

        let mut events = vec![
            ChangeEvent::added(collections::COMMENTS, comment.id.clone()),
            ChangeEvent::modified(collections::POSTS, post_id.clone()),
        ];
        if let Some(n) = notification {
            events.push(ChangeEvent::added(
                collections::user_subcollection(&n.recipient_id, collections::NOTIFICATIONS),
                n.id,
            ));
        }
        self.ctx.publish_changes(&events).await;

        Ok(CommentResponse::from(&comment))
    }

    /// Delete a comment; only its author may
    #[instrument(skip(self))]
    pub async fn delete(&self, comment_id: &DocId, actor_id: &DocId) -> ServiceResult<()> {
        let comment = self
            .ctx
            .document_repo()
            .find_by_id(collections::COMMENTS, comment_id)
            .await?
            .ok_or_else(|| DomainError::document_not_found(collections::COMMENTS, comment_id.clone()))?;

        if !comment.is_owned_by(actor_id) {
            return Err(DomainError::NotCommentAuthor.into());
        }

        let mut batch = WriteBatch::new();
        batch.push(WriteOp::DeleteDocument {
            collection: collections::COMMENTS.to_string(),
            id: comment_id.clone(),
        });

        let mut events = vec![ChangeEvent::removed(collections::COMMENTS, comment_id.clone())];

        // The post may already be gone; then there is no counter to move
        let post_id = comment
            .field("postId")
            .and_then(Value::as_str)
            .and_then(|raw| DocId::parse(raw).ok());
        if let Some(post_id) = post_id {
            let post_exists = self
                .ctx
                .document_repo()
                .find_by_id(collections::POSTS, &post_id)
                .await?
                .is_some();
            if post_exists {
                batch.push(WriteOp::IncrementCounter {
                    collection: collections::POSTS.to_string(),
                    doc_id: post_id.clone(),
                    field: COMMENTS_COUNT.to_string(),
                    delta: -1,
                });
                events.push(ChangeEvent::modified(collections::POSTS, post_id));
            }
        }

        self.ctx.document_repo().commit(&batch).await?;
        info!(comment_id = %comment_id, "Comment deleted");
        self.ctx.publish_changes(&events).await;

        Ok(())
    }

    /// Comments of a post, oldest first
    #[instrument(skip(self))]
    pub async fn list(&self, post_id: &DocId, limit: usize) -> ServiceResult<Vec<CommentResponse>> {
        let query = FeedQuery::new(collections::COMMENTS)
            .filter(FieldFilter::eq("postId", post_id.as_str()))
            .order_by(Document::CREATED_AT_FIELD, SortDirection::Asc)
            .limit(limit);

        let docs = self.ctx.document_repo().query(&query).await?;
        Ok(docs.iter().map(CommentResponse::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use manada_common::AppConfig;
    use manada_db::{MemoryChangeBus, MemoryStore};
    use serde_json::json;

    fn id(s: &str) -> DocId {
        DocId::parse(s).unwrap()
    }

    async fn setup() -> (ServiceContext, MemoryStore) {
        let store = MemoryStore::new();
        let ctx = ServiceContext::in_memory(
            &AppConfig::local("test-secret"),
            store.clone(),
            MemoryChangeBus::new(),
        );
        let post = Document::with_id(
            id("P"),
            collections::POSTS,
            Some(id("owner")),
            json!({ "commentsCount": 0 }).as_object().cloned().unwrap(),
            Utc::now(),
        );
        ctx.document_repo().create(&post).await.unwrap();
        (ctx, store)
    }

    async fn comments_count(ctx: &ServiceContext) -> i64 {
        ctx.document_repo()
            .find_by_id(collections::POSTS, &id("P"))
            .await
            .unwrap()
            .unwrap()
            .counter(COMMENTS_COUNT)
    }

    #[tokio::test]
    async fn test_create_and_delete_comment() {
        let (ctx, store) = setup().await;
        let service = CommentService::new(&ctx);

        let comment = service.create(&id("P"), &id("A"), "  what a pup  ").await.unwrap();
        assert_eq!(comment.content, "what a pup");
        assert_eq!(comments_count(&ctx).await, 1);

        let notes = store.all_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].notification_type, "new_comment");

        let comment_id = id(&comment.id);
        let err = service.delete(&comment_id, &id("B")).await.unwrap_err();
        assert_eq!(err.status_code(), 403);

        service.delete(&comment_id, &id("A")).await.unwrap();
        assert_eq!(comments_count(&ctx).await, 0);
        assert!(service.list(&id("P"), 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_deletes_count_once() {
        let (ctx, _store) = setup().await;
        let service = CommentService::new(&ctx);
        let doomed = service.create(&id("P"), &id("A"), "first").await.unwrap();
        service.create(&id("P"), &id("B"), "second").await.unwrap();

        let doomed_id = id(&doomed.id);
        let actor_a = id("A");
        let (a, b) = tokio::join!(
            service.delete(&doomed_id, &actor_a),
            service.delete(&doomed_id, &actor_a),
        );
        assert_eq!(usize::from(a.is_ok()) + usize::from(b.is_ok()), 1);
        let failed = a.err().or(b.err()).unwrap();
        assert_eq!(failed.status_code(), 404);

        let remaining = service.list(&id("P"), 10).await.unwrap().len() as i64;
        assert_eq!(remaining, 1);
        assert_eq!(comments_count(&ctx).await, remaining);
    }

    #[tokio::test]
    async fn test_owner_comment_is_silent() {
        let (ctx, store) = setup().await;
        CommentService::new(&ctx)
            .create(&id("P"), &id("owner"), "mine")
            .await
            .unwrap();
        assert!(store.all_notifications().is_empty());
    }

    #[tokio::test]
    async fn test_list_oldest_first() {
        let (ctx, _store) = setup().await;
        let service = CommentService::new(&ctx);
        let first = service.create(&id("P"), &id("A"), "first").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = service.create(&id("P"), &id("B"), "second").await.unwrap();

        let listed = service.list(&id("P"), 10).await.unwrap();
        let ids: Vec<_> = listed.iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn test_comment_validation() {
        let (ctx, _store) = setup().await;
        let service = CommentService::new(&ctx);

        let err = service.create(&id("P"), &id("A"), "   ").await.unwrap_err();
        assert_eq!(err.status_code(), 400);

        let long = "x".repeat(MAX_COMMENT_CHARS + 1);
        let err = service.create(&id("P"), &id("A"), &long).await.unwrap_err();
        assert_eq!(err.status_code(), 400);

        let err = service.create(&id("missing"), &id("A"), "hi").await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }
}
