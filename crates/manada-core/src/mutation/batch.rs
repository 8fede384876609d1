//! Write batch - an all-or-nothing list of document writes

use chrono::{DateTime, Utc};

use super::ToggleDecision;
use crate::entities::{Document, NotificationEvent, UserMarker};
use crate::value_objects::{DocId, ReactionKind, ReactionTarget};

#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Create or overwrite the marker for `(collection, parent, user)`
    UpsertMarker(UserMarker),
    UpdateMarkerKind {
        collection: String,
        parent_id: DocId,
        user_id: DocId,
        kind: ReactionKind,
    },
    DeleteMarker {
        collection: String,
        parent_id: DocId,
        user_id: DocId,
    },
    /// Unconditional delta; the stored value is clamped at zero
    IncrementCounter {
        collection: String,
        doc_id: DocId,
        field: String,
        delta: i64,
    },
    CreateNotification(NotificationEvent),
    CreateDocument(Document),
    DeleteDocument {
        collection: String,
        id: DocId,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: WriteOp) -> &mut Self {
        self.ops.push(op);
        self
    }

    #[inline]
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn notifications(&self) -> impl Iterator<Item = &NotificationEvent> {
        self.ops.iter().filter_map(|op| match op {
            WriteOp::CreateNotification(n) => Some(n),
            _ => None,
        })
    }

    /// Build the batch persisting a toggle decision.
    ///
    /// Add writes the marker, a +1 delta and (for non-owners) a notification.
    /// ChangeKind only rewrites the marker. Remove deletes the marker with a -1
    /// delta. Noop writes nothing.
    pub fn for_decision(
        target: &ReactionTarget,
        parent: &Document,
        actor_id: &DocId,
        decision: &ToggleDecision,
        now: DateTime<Utc>,
    ) -> Self {
        let mut batch = Self::new();
        let counter = |delta| WriteOp::IncrementCounter {
            collection: target.parent_collection.to_string(),
            doc_id: parent.id.clone(),
            field: target.counter_field.to_string(),
            delta,
        };

        match decision {
            ToggleDecision::Add { kind } => {
                batch
                    .push(WriteOp::UpsertMarker(UserMarker::new(
                        target,
                        parent.id.clone(),
                        actor_id.clone(),
                        kind.clone(),
                        now,
                    )))
                    .push(counter(1));
                if let Some(notification) = NotificationEvent::for_action(
                    parent.owner_id.as_ref(),
                    actor_id,
                    target.notification_type,
                    &parent.id,
                    now,
                ) {
                    batch.push(WriteOp::CreateNotification(notification));
                }
            }
            ToggleDecision::ChangeKind { to, .. } => {
                batch.push(WriteOp::UpdateMarkerKind {
                    collection: target.marker_collection.to_string(),
                    parent_id: parent.id.clone(),
                    user_id: actor_id.clone(),
                    kind: to.clone(),
                });
            }
            ToggleDecision::Remove { .. } => {
                batch
                    .push(WriteOp::DeleteMarker {
                        collection: target.marker_collection.to_string(),
                        parent_id: parent.id.clone(),
                        user_id: actor_id.clone(),
                    })
                    .push(counter(-1));
            }
            ToggleDecision::Noop => {}
        }
        batch
    }
}
