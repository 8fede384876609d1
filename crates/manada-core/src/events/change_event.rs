//! Change events - emitted whenever a document in a collection is written
//!
//! Live feed subscriptions listen for these to know when to re-read their window.

use serde::{Deserialize, Serialize};

use crate::value_objects::DocId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub collection: String,
    pub doc_id: DocId,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(collection: impl Into<String>, doc_id: DocId, kind: ChangeKind) -> Self {
        Self {
            collection: collection.into(),
            doc_id,
            kind,
        }
    }

    pub fn added(collection: impl Into<String>, doc_id: DocId) -> Self {
        Self::new(collection, doc_id, ChangeKind::Added)
    }

    pub fn modified(collection: impl Into<String>, doc_id: DocId) -> Self {
        Self::new(collection, doc_id, ChangeKind::Modified)
    }

    pub fn removed(collection: impl Into<String>, doc_id: DocId) -> Self {
        Self::new(collection, doc_id, ChangeKind::Removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization() {
        let event = ChangeEvent::modified("posts", DocId::parse("p1").unwrap());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["collection"], "posts");
        assert_eq!(json["doc_id"], "p1");
        assert_eq!(json["kind"], "MODIFIED");

        let back: ChangeEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
