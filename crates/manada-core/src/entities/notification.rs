//! Notification entity - written once as a side effect of a reaction or comment

use chrono::{DateTime, Utc};

use crate::value_objects::DocId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub id: DocId,
    pub recipient_id: DocId,
    pub notification_type: String,
    pub from_user_id: DocId,
    /// Post, comment, item, or user the notification is about
    pub subject_id: DocId,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl NotificationEvent {
    pub fn new(
        recipient_id: DocId,
        notification_type: impl Into<String>,
        from_user_id: DocId,
        subject_id: DocId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: DocId::generate(),
            recipient_id,
            notification_type: notification_type.into(),
            from_user_id,
            subject_id,
            read: false,
            created_at: now,
        }
    }

    /// Build the notification for an action on someone's document.
    ///
    /// Returns `None` when the actor owns the document or it has no owner.
    pub fn for_action(
        owner_id: Option<&DocId>,
        actor_id: &DocId,
        notification_type: Option<&str>,
        subject_id: &DocId,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        let owner = owner_id?;
        let kind = notification_type?;
        if owner == actor_id {
            return None;
        }
        Some(Self::new(
            owner.clone(),
            kind,
            actor_id.clone(),
            subject_id.clone(),
            now,
        ))
    }
}
