//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::DocId;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Document not found: {collection}/{id}")]
    DocumentNotFound { collection: String, id: DocId },

    #[error("Ad not found: {0}")]
    AdNotFound(DocId),

    #[error("Moment not found: {0}")]
    MomentNotFound(DocId),

    #[error("Notification not found: {0}")]
    NotificationNotFound(DocId),

    #[error("Unknown reaction target: {0}")]
    UnknownReactionTarget(String),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Cannot {action} an ad with status '{status}'")]
    InvalidStatusTransition { action: String, status: String },

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Not the ad owner")]
    NotAdOwner,

    #[error("Administrator privileges required")]
    AdminRequired,

    #[error("Not the comment author")]
    NotCommentAuthor,

    #[error("Not the notification recipient")]
    NotNotificationRecipient,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Document already exists: {collection}/{id}")]
    DocumentAlreadyExists { collection: String, id: DocId },

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    pub fn document_not_found(collection: impl Into<String>, id: DocId) -> Self {
        Self::DocumentNotFound {
            collection: collection.into(),
            id,
        }
    }

    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::DocumentNotFound { .. } => "UNKNOWN_DOCUMENT",
            Self::AdNotFound(_) => "UNKNOWN_AD",
            Self::MomentNotFound(_) => "UNKNOWN_MOMENT",
            Self::NotificationNotFound(_) => "UNKNOWN_NOTIFICATION",
            Self::UnknownReactionTarget(_) => "UNKNOWN_REACTION_TARGET",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",

            // Authorization
            Self::NotAdOwner => "NOT_AD_OWNER",
            Self::AdminRequired => "ADMIN_REQUIRED",
            Self::NotCommentAuthor => "NOT_COMMENT_AUTHOR",
            Self::NotNotificationRecipient => "NOT_NOTIFICATION_RECIPIENT",

            // Conflict
            Self::DocumentAlreadyExists { .. } => "DOCUMENT_ALREADY_EXISTS",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::DocumentNotFound { .. }
                | Self::AdNotFound(_)
                | Self::MomentNotFound(_)
                | Self::NotificationNotFound(_)
                | Self::UnknownReactionTarget(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::InvalidStatusTransition { .. }
                | Self::ContentTooLong { .. }
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::NotAdOwner
                | Self::AdminRequired
                | Self::NotCommentAuthor
                | Self::NotNotificationRecipient
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::DocumentAlreadyExists { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> DocId {
        DocId::parse(s).unwrap()
    }

    #[test]
    fn test_error_codes() {
        let err = DomainError::AdNotFound(id("ad1"));
        assert_eq!(err.code(), "UNKNOWN_AD");

        let err = DomainError::InvalidStatusTransition {
            action: "approve".to_string(),
            status: "active".to_string(),
        };
        assert_eq!(err.code(), "INVALID_STATUS_TRANSITION");
    }

    #[test]
    fn test_classification() {
        assert!(DomainError::document_not_found("posts", id("p1")).is_not_found());
        assert!(DomainError::UnknownReactionTarget("x".into()).is_not_found());
        assert!(DomainError::InvalidStatusTransition {
            action: "pause".into(),
            status: "pending".into()
        }
        .is_validation());
        assert!(DomainError::AdminRequired.is_authorization());
        assert!(!DomainError::AdminRequired.is_not_found());
    }

    #[test]
    fn test_error_display() {
        let err = DomainError::document_not_found("posts", id("p1"));
        assert_eq!(err.to_string(), "Document not found: posts/p1");

        let err = DomainError::InvalidStatusTransition {
            action: "approve".into(),
            status: "active".into(),
        };
        assert_eq!(err.to_string(), "Cannot approve an ad with status 'active'");
    }
}
