//! Document entity - a schemaless record in a named collection

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::value_objects::DocId;

/// A stored document.
///
/// Feature code owns the shape of `data`; the core only relies on a few
/// conventions: counters are non-negative integers and `createdAt` holds the
/// creation time in epoch milliseconds so feeds can order by it.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocId,
    pub collection: String,
    pub owner_id: Option<DocId>,
    pub data: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub const CREATED_AT_FIELD: &'static str = "createdAt";

    /// Create a new document with a generated id
    pub fn new(collection: impl Into<String>, owner_id: Option<DocId>, data: Map<String, Value>) -> Self {
        Self::with_id(DocId::generate(), collection, owner_id, data, Utc::now())
    }

    /// Create a document with a caller-chosen id and timestamp
    pub fn with_id(
        id: DocId,
        collection: impl Into<String>,
        owner_id: Option<DocId>,
        mut data: Map<String, Value>,
        now: DateTime<Utc>,
    ) -> Self {
        data.entry(Self::CREATED_AT_FIELD)
            .or_insert_with(|| Value::from(now.timestamp_millis()));
        Self {
            id,
            collection: collection.into(),
            owner_id,
            data,
            created_at: now,
            updated_at: now,
        }
    }

    /// Read a counter field; missing or malformed counters read as zero
    pub fn counter(&self, field: &str) -> i64 {
        self.data
            .get(field)
            .and_then(Value::as_i64)
            .unwrap_or(0)
            .max(0)
    }

    /// Apply a delta to a counter, clamping at zero. Returns the new value.
    pub fn apply_delta(&mut self, field: &str, delta: i64) -> i64 {
        let next = (self.counter(field) + delta).max(0);
        self.data.insert(field.to_string(), Value::from(next));
        self.updated_at = Utc::now();
        next
    }

    #[inline]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// Check if the given user owns this document
    #[inline]
    pub fn is_owned_by(&self, user_id: &DocId) -> bool {
        self.owner_id.as_ref() == Some(user_id)
    }

    /// Full JSON view: data plus `id` and `ownerId`
    pub fn to_json(&self) -> Value {
        let mut out = self.data.clone();
        out.insert("id".to_string(), Value::from(self.id.as_str()));
        if let Some(owner) = &self.owner_id {
            out.insert("ownerId".to_string(), Value::from(owner.as_str()));
        }
        Value::Object(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn post(likes: i64) -> Document {
        let data = json!({ "text": "hi", "likesCount": likes });
        Document::new(
            "posts",
            Some(DocId::parse("owner").unwrap()),
            data.as_object().cloned().unwrap(),
        )
    }

    #[test]
    fn test_created_at_is_stamped() {
        let doc = post(0);
        assert_eq!(
            doc.field(Document::CREATED_AT_FIELD).and_then(Value::as_i64),
            Some(doc.created_at.timestamp_millis())
        );
    }

    #[test]
    fn test_counter_defaults_and_clamps() {
        let mut doc = post(1);
        assert_eq!(doc.counter("likesCount"), 1);
        assert_eq!(doc.counter("commentsCount"), 0);

        assert_eq!(doc.apply_delta("likesCount", -1), 0);
        assert_eq!(doc.apply_delta("likesCount", -1), 0);
        assert_eq!(doc.apply_delta("likesCount", 1), 1);
    }

    #[test]
    fn test_ownership_and_json() {
        let doc = post(3);
        assert!(doc.is_owned_by(&DocId::parse("owner").unwrap()));
        assert!(!doc.is_owned_by(&DocId::parse("other").unwrap()));

        let json = doc.to_json();
        assert_eq!(json["ownerId"], "owner");
        assert_eq!(json["likesCount"], 3);
        assert_eq!(json["id"], doc.id.as_str());
    }
}
