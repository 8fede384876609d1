//! User marker - records that a user applied a reaction to a parent document

use chrono::{DateTime, Utc};

use crate::value_objects::{DocId, ReactionKind, ReactionTarget};

/// At most one marker exists per `(collection, parent_id, user_id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMarker {
    pub collection: String,
    pub parent_id: DocId,
    pub user_id: DocId,
    pub kind: ReactionKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserMarker {
    pub fn new(
        target: &ReactionTarget,
        parent_id: DocId,
        user_id: DocId,
        kind: ReactionKind,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            collection: target.marker_collection.to_string(),
            parent_id,
            user_id,
            kind,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn is_kind(&self, kind: &ReactionKind) -> bool {
        &self.kind == kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_creation() {
        let now = Utc::now();
        let marker = UserMarker::new(
            &ReactionTarget::POST_LIKES,
            DocId::parse("p1").unwrap(),
            DocId::parse("u1").unwrap(),
            ReactionKind::like(),
            now,
        );
        assert_eq!(marker.collection, "likes");
        assert!(marker.is_kind(&ReactionKind::like()));
        assert_eq!(marker.created_at, marker.updated_at);
    }
}
