//! Notification service
//!
//! Read side of the notifications written by reactions and comments.

use manada_core::{collections, ChangeEvent, DocId, DomainError};
use tracing::{debug, instrument};

use crate::dto::NotificationResponse;

use super::context::ServiceContext;
use super::error::ServiceResult;

const DEFAULT_LIST_LIMIT: i64 = 50;
const MAX_LIST_LIMIT: i64 = 100;

/// Notification service
pub struct NotificationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> NotificationService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// A recipient's notifications, newest first
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        recipient_id: &DocId,
        unread_only: bool,
        limit: Option<i64>,
    ) -> ServiceResult<Vec<NotificationResponse>> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
        let items = self
            .ctx
            .notification_repo()
            .list_for(recipient_id, unread_only, limit)
            .await?;
        Ok(items.iter().map(NotificationResponse::from).collect())
    }

    /// Mark one of the caller's notifications read
    #[instrument(skip(self))]
    pub async fn mark_read(&self, notification_id: &DocId, actor_id: &DocId) -> ServiceResult<()> {
        let notification = self
            .ctx
            .notification_repo()
            .find_by_id(notification_id)
            .await?
            .ok_or_else(|| DomainError::NotificationNotFound(notification_id.clone()))?;

        if &notification.recipient_id != actor_id {
            return Err(DomainError::NotNotificationRecipient.into());
        }
        if notification.read {
            return Ok(());
        }

        if !self.ctx.notification_repo().mark_read(notification_id).await? {
            return Err(DomainError::NotificationNotFound(notification_id.clone()).into());
        }
        debug!(notification_id = %notification_id, "Notification marked read");

        self.ctx
            .publish_changes(&[ChangeEvent::modified(
                collections::user_subcollection(actor_id, collections::NOTIFICATIONS),
                notification_id.clone(),
            )])
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ReactionService;
    use chrono::Utc;
    use manada_common::AppConfig;
    use manada_core::Document;
    use manada_db::{MemoryChangeBus, MemoryStore};
    use serde_json::Map;

    fn id(s: &str) -> DocId {
        DocId::parse(s).unwrap()
    }

    async fn context_with_like() -> ServiceContext {
        let ctx = ServiceContext::in_memory(
            &AppConfig::local("test-secret"),
            MemoryStore::new(),
            MemoryChangeBus::new(),
        );
        let post = Document::with_id(id("P"), collections::POSTS, Some(id("owner")), Map::new(), Utc::now());
        ctx.document_repo().create(&post).await.unwrap();
        ReactionService::new(&ctx)
            .toggle("post_likes", &id("P"), &id("A"), None)
            .await
            .unwrap();
        ctx
    }

    #[tokio::test]
    async fn test_list_and_mark_read() {
        let ctx = context_with_like().await;
        let service = NotificationService::new(&ctx);

        let unread = service.list(&id("owner"), true, None).await.unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].notification_type, "new_like");
        assert_eq!(unread[0].post_id, "P");

        let note_id = id(&unread[0].id);
        let err = service.mark_read(&note_id, &id("A")).await.unwrap_err();
        assert_eq!(err.status_code(), 403);

        service.mark_read(&note_id, &id("owner")).await.unwrap();
        service.mark_read(&note_id, &id("owner")).await.unwrap();
        assert!(service.list(&id("owner"), true, None).await.unwrap().is_empty());
        assert_eq!(service.list(&id("owner"), false, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_mark_unknown_notification() {
        let ctx = context_with_like().await;
        let err = NotificationService::new(&ctx)
            .mark_read(&id("missing"), &id("owner"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }
}
