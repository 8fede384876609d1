//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use chrono::{DateTime, TimeZone, Utc};
use manada_core::{Ad, AnalyticsEvent, Document, FeedEntry, Moment, NotificationEvent};
use serde_json::{Map, Value};

use super::responses::{
    AdResponse, AnalyticsEventResponse, CommentResponse, FeedItemResponse, MomentResponse,
    NotificationResponse,
};

// ============================================================================
// Ad Mappers
// ============================================================================

impl From<&Ad> for AdResponse {
    fn from(ad: &Ad) -> Self {
        Self {
            id: ad.id.to_string(),
            advertiser_id: ad.advertiser_id.to_string(),
            title: ad.title.clone(),
            description: ad.description.clone(),
            image_url: ad.image_url.clone(),
            target_url: ad.target_url.clone(),
            budget_cents: ad.budget_cents,
            status: ad.status,
            rejection_reason: ad.rejection_reason.clone(),
            created_at: ad.created_at,
            updated_at: ad.updated_at,
        }
    }
}

impl From<Ad> for AdResponse {
    fn from(ad: Ad) -> Self {
        Self::from(&ad)
    }
}

// ============================================================================
// Content Mappers
// ============================================================================

fn str_field(doc: &Document, name: &str) -> Option<String> {
    doc.field(name).and_then(Value::as_str).map(str::to_string)
}

impl From<&Document> for CommentResponse {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id.to_string(),
            post_id: str_field(doc, "postId").unwrap_or_default(),
            author_id: doc.owner_id.as_ref().map(ToString::to_string),
            content: str_field(doc, "content").unwrap_or_default(),
            likes_count: doc.counter("likesCount"),
            created_at: created_at_of(doc),
        }
    }
}

/// `data.createdAt` (epoch millis) when present, else the row timestamp
fn created_at_of(doc: &Document) -> DateTime<Utc> {
    doc.field(Document::CREATED_AT_FIELD)
        .and_then(Value::as_i64)
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .unwrap_or(doc.created_at)
}

impl FeedItemResponse {
    pub fn organic(doc: &Document) -> Self {
        Self::from_document(doc, false)
    }

    fn from_document(doc: &Document, sponsored: bool) -> Self {
        let fields = match doc.to_json() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self { fields, sponsored }
    }
}

impl From<&FeedEntry> for FeedItemResponse {
    fn from(entry: &FeedEntry) -> Self {
        Self::from_document(entry.document(), entry.is_sponsored())
    }
}

impl MomentResponse {
    /// Map a moment with its remaining time computed at `now`
    pub fn at(moment: &Moment, now: DateTime<Utc>) -> Self {
        Self {
            id: moment.id.to_string(),
            author_id: moment.author_id.to_string(),
            media_url: moment.media_url.clone(),
            caption: moment.caption.clone(),
            created_at: moment.created_at,
            expires_at: moment.expires_at,
            time_remaining: moment.time_remaining(now),
            progress: moment.progress(now),
        }
    }
}

impl From<&NotificationEvent> for NotificationResponse {
    fn from(n: &NotificationEvent) -> Self {
        Self {
            id: n.id.to_string(),
            notification_type: n.notification_type.clone(),
            from_user_id: n.from_user_id.to_string(),
            post_id: n.subject_id.to_string(),
            read: n.read,
            created_at: n.created_at,
        }
    }
}

// ============================================================================
// Analytics Mappers
// ============================================================================

impl From<&AnalyticsEvent> for AnalyticsEventResponse {
    fn from(event: &AnalyticsEvent) -> Self {
        Self {
            id: event.id.to_string(),
            event_type: event.event_type.clone(),
            user_id: event.user_id.as_ref().map(ToString::to_string),
            properties: event.properties.clone(),
            created_at: event.created_at,
        }
    }
}
