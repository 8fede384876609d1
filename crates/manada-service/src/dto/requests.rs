//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

// ============================================================================
// Ad Requests
// ============================================================================

/// Create ad request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAdRequest {
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    #[serde(default)]
    pub description: String,

    #[validate(url(message = "Image URL must be a valid URL"))]
    pub image_url: Option<String>,

    #[validate(url(message = "Target URL must be a valid URL"))]
    pub target_url: Option<String>,

    #[validate(range(min = 0, message = "Budget must not be negative"))]
    #[serde(default)]
    pub budget_cents: i64,
}

/// Update ad request; omitted fields stay unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateAdRequest {
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[validate(url(message = "Image URL must be a valid URL"))]
    pub image_url: Option<String>,

    #[validate(url(message = "Target URL must be a valid URL"))]
    pub target_url: Option<String>,

    #[validate(range(min = 0, message = "Budget must not be negative"))]
    pub budget_cents: Option<i64>,
}

/// Lifecycle action on an ad (`PATCH /api/ads/{id}`)
///
/// The action is kept as a string so an unknown value is reported as a
/// validation error instead of a deserialization failure.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AdActionRequest {
    #[validate(length(min = 1, message = "Action is required"))]
    pub action: String,

    /// Rejection reason, only stored for `reject`
    #[validate(length(max = 500, message = "Reason must be at most 500 characters"))]
    pub reason: Option<String>,
}

// ============================================================================
// Reaction Requests
// ============================================================================

/// Body of the reaction endpoints; `kind` defaults to a plain like
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ReactionRequest {
    #[validate(length(min = 1, max = 32, message = "Kind must be 1-32 characters"))]
    pub kind: Option<String>,
}

// ============================================================================
// Content Requests
// ============================================================================

/// Create comment request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 2000, message = "Comment must be 1-2000 characters"))]
    pub content: String,
}

/// Create post request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 5000, message = "Content must be 1-5000 characters"))]
    pub content: String,

    #[validate(url(message = "Image URL must be a valid URL"))]
    pub image_url: Option<String>,

    pub circle_id: Option<String>,
}

/// Create moment request; needs media or a caption
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateMomentRequest {
    #[validate(url(message = "Media URL must be a valid URL"))]
    pub media_url: Option<String>,

    #[validate(length(max = 280, message = "Caption must be at most 280 characters"))]
    pub caption: Option<String>,
}

// ============================================================================
// Analytics Requests
// ============================================================================

/// Track analytics event request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TrackEventRequest {
    #[validate(length(min = 1, max = 64, message = "Event type must be 1-64 characters"))]
    pub event_type: String,

    #[serde(default)]
    pub properties: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_ad_validation() {
        let ok: CreateAdRequest = serde_json::from_value(json!({
            "title": "Dog treats",
            "target_url": "https://example.com/treats",
            "budget_cents": 5000
        }))
        .unwrap();
        assert!(ok.validate().is_ok());
        assert_eq!(ok.description, "");

        let bad: CreateAdRequest = serde_json::from_value(json!({
            "title": "",
            "budget_cents": -1
        }))
        .unwrap();
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
        assert!(errors.field_errors().contains_key("budget_cents"));
    }

    #[test]
    fn test_ad_action_keeps_unknown_action() {
        let req: AdActionRequest = serde_json::from_value(json!({ "action": "explode" })).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.action, "explode");
        assert!(req.reason.is_none());
    }

    #[test]
    fn test_reaction_request_defaults() {
        let req: ReactionRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.kind.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_comment_length() {
        let req = CreateCommentRequest {
            content: "x".repeat(2001),
        };
        assert!(req.validate().is_err());
    }
}
