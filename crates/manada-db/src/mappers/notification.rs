//! Notification entity <-> model mapper

use manada_core::{DomainError, NotificationEvent};

use super::parse_id;
use crate::models::NotificationModel;

impl TryFrom<NotificationModel> for NotificationEvent {
    type Error = DomainError;

    fn try_from(model: NotificationModel) -> Result<Self, Self::Error> {
        Ok(NotificationEvent {
            id: parse_id(&model.id)?,
            recipient_id: parse_id(&model.recipient_id)?,
            notification_type: model.notification_type,
            from_user_id: parse_id(&model.from_user_id)?,
            subject_id: parse_id(&model.subject_id)?,
            read: model.read,
            created_at: model.created_at,
        })
    }
}
