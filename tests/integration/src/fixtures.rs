//! Test fixtures and data generators

use chrono::Utc;
use manada_core::{collections, DocId, Document};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// A fresh user id
pub fn unique_user(prefix: &str) -> DocId {
    DocId::parse(&format!("{prefix}{}", unique_suffix())).unwrap_or_else(|_| DocId::generate())
}

/// Post owned by `owner` with a preset like counter
pub fn post(id: &DocId, owner: &DocId, likes: i64) -> Document {
    let data = json!({
        "authorId": owner.as_str(),
        "content": "Morning walk",
        "likesCount": likes,
        "commentsCount": 0,
    });
    Document::with_id(
        id.clone(),
        collections::POSTS,
        Some(owner.clone()),
        data.as_object().cloned().unwrap_or_default(),
        Utc::now(),
    )
}

#[derive(Debug, Serialize)]
pub struct CreateAdRequest {
    pub title: String,
    pub budget_cents: i64,
}

impl CreateAdRequest {
    pub fn unique() -> Self {
        Self {
            title: format!("Chew toys {}", unique_suffix()),
            budget_cents: 2500,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdActionRequest {
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AdActionRequest {
    pub fn new(action: &str) -> Self {
        Self {
            action: action.to_string(),
            reason: None,
        }
    }
}

/// `{"data": ...}` success envelope
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct AdBody {
    pub id: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct NotificationBody {
    pub id: String,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub from_user_id: String,
}
