//! In-memory implementation of the repository traits

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use manada_core::{
    Ad, AdQuery, AdRepository, AdStatus, DocId, Document, DocumentRepository, DomainError,
    FeedQuery, MarkerRepository, Moment, MomentRepository, NotificationEvent,
    NotificationRepository, ReactionTarget, RepoResult, ToggleDecision, ToggleIntent,
    ToggleOutcome, UserMarker, WriteBatch, WriteOp,
};

type DocKey = (String, DocId);
type MarkerKey = (String, DocId, DocId);

#[derive(Debug, Default)]
struct MemoryState {
    documents: HashMap<DocKey, Document>,
    markers: HashMap<MarkerKey, UserMarker>,
    notifications: HashMap<DocId, NotificationEvent>,
    ads: HashMap<DocId, Ad>,
    moments: HashMap<DocId, Moment>,
}

/// Value a key held before one op of a batch touched it
#[derive(Debug)]
enum Undo {
    Document(DocKey, Option<Document>),
    Marker(MarkerKey, Option<UserMarker>),
    Notification(DocId, Option<NotificationEvent>),
}

impl MemoryState {
    /// Apply one op. A failing op leaves the state untouched.
    fn apply(&mut self, op: &WriteOp) -> RepoResult<Undo> {
        let undo = match op {
            WriteOp::UpsertMarker(marker) => {
                let key = (
                    marker.collection.clone(),
                    marker.parent_id.clone(),
                    marker.user_id.clone(),
                );
                let prior = self.markers.get(&key).cloned();
                match self.markers.get_mut(&key) {
                    Some(existing) => {
                        existing.kind = marker.kind.clone();
                        existing.updated_at = marker.updated_at;
                    }
                    None => {
                        self.markers.insert(key.clone(), marker.clone());
                    }
                }
                Undo::Marker(key, prior)
            }
            WriteOp::UpdateMarkerKind {
                collection,
                parent_id,
                user_id,
                kind,
            } => {
                let key = (collection.clone(), parent_id.clone(), user_id.clone());
                let prior = self.markers.get(&key).cloned();
                if let Some(marker) = self.markers.get_mut(&key) {
                    marker.kind = kind.clone();
                    marker.updated_at = Utc::now();
                }
                Undo::Marker(key, prior)
            }
            WriteOp::DeleteMarker {
                collection,
                parent_id,
                user_id,
            } => {
                let key = (collection.clone(), parent_id.clone(), user_id.clone());
                let prior = self.markers.remove(&key);
                Undo::Marker(key, prior)
            }
            WriteOp::IncrementCounter {
                collection,
                doc_id,
                field,
                delta,
            } => {
                let key = (collection.clone(), doc_id.clone());
                let doc = self
                    .documents
                    .get_mut(&key)
                    .ok_or_else(|| DomainError::document_not_found(collection.as_str(), doc_id.clone()))?;
                let prior = doc.clone();
                doc.apply_delta(field, *delta);
                Undo::Document(key, Some(prior))
            }
            WriteOp::CreateNotification(n) => {
                if self.notifications.contains_key(&n.id) {
                    return Err(DomainError::DocumentAlreadyExists {
                        collection: "notifications".to_string(),
                        id: n.id.clone(),
                    });
                }
                self.notifications.insert(n.id.clone(), n.clone());
                Undo::Notification(n.id.clone(), None)
            }
            WriteOp::CreateDocument(doc) => {
                self.insert_document(doc)?;
                Undo::Document((doc.collection.clone(), doc.id.clone()), None)
            }
            // A delete that finds nothing fails, so its counter delta never lands twice
            WriteOp::DeleteDocument { collection, id } => {
                let key = (collection.clone(), id.clone());
                let prior = self
                    .documents
                    .remove(&key)
                    .ok_or_else(|| DomainError::document_not_found(collection.as_str(), id.clone()))?;
                Undo::Document(key, Some(prior))
            }
        };
        Ok(undo)
    }

    fn restore(&mut self, undo: Undo) {
        match undo {
            Undo::Document(key, Some(doc)) => {
                self.documents.insert(key, doc);
            }
            Undo::Document(key, None) => {
                self.documents.remove(&key);
            }
            Undo::Marker(key, Some(marker)) => {
                self.markers.insert(key, marker);
            }
            Undo::Marker(key, None) => {
                self.markers.remove(&key);
            }
            Undo::Notification(id, Some(n)) => {
                self.notifications.insert(id, n);
            }
            Undo::Notification(id, None) => {
                self.notifications.remove(&id);
            }
        }
    }

    fn insert_document(&mut self, doc: &Document) -> RepoResult<()> {
        let key = (doc.collection.clone(), doc.id.clone());
        if self.documents.contains_key(&key) {
            return Err(DomainError::DocumentAlreadyExists {
                collection: doc.collection.clone(),
                id: doc.id.clone(),
            });
        }
        self.documents.insert(key, doc.clone());
        Ok(())
    }

    /// Apply ops in order; on the first failure, undo the ones already applied
    fn apply_all(&mut self, ops: &[WriteOp]) -> RepoResult<()> {
        let mut applied = Vec::with_capacity(ops.len());
        for op in ops {
            match self.apply(op) {
                Ok(undo) => applied.push(undo),
                Err(e) => {
                    for undo in applied.into_iter().rev() {
                        self.restore(undo);
                    }
                    return Err(e);
                }
            }
        }
        Ok(())
    }
}

/// Process-local store implementing every repository trait.
///
/// Clones share the same state. All writes go through one mutex, so a
/// committed batch is never observed half-applied and `toggle_atomic` is
/// serialized per store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of markers on a parent across all users
    pub fn marker_count(&self, marker_collection: &str, parent_id: &DocId) -> usize {
        self.state
            .lock()
            .markers
            .keys()
            .filter(|(c, p, _)| c == marker_collection && p == parent_id)
            .count()
    }

    /// Every notification, newest first
    pub fn all_notifications(&self) -> Vec<NotificationEvent> {
        let mut out: Vec<_> = self.state.lock().notifications.values().cloned().collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        out
    }
}

#[async_trait]
impl DocumentRepository for MemoryStore {
    async fn find_by_id(&self, collection: &str, id: &DocId) -> RepoResult<Option<Document>> {
        Ok(self
            .state
            .lock()
            .documents
            .get(&(collection.to_string(), id.clone()))
            .cloned())
    }

    async fn create(&self, doc: &Document) -> RepoResult<()> {
        self.state.lock().insert_document(doc)
    }

    async fn merge_data(&self, collection: &str, id: &DocId, fields: &Map<String, Value>) -> RepoResult<()> {
        let mut state = self.state.lock();
        let doc = state
            .documents
            .get_mut(&(collection.to_string(), id.clone()))
            .ok_or_else(|| DomainError::document_not_found(collection, id.clone()))?;
        for (key, value) in fields {
            doc.data.insert(key.clone(), value.clone());
        }
        doc.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &DocId) -> RepoResult<bool> {
        Ok(self
            .state
            .lock()
            .documents
            .remove(&(collection.to_string(), id.clone()))
            .is_some())
    }

    async fn query(&self, query: &FeedQuery) -> RepoResult<Vec<Document>> {
        let candidates: Vec<Document> = {
            let state = self.state.lock();
            state
                .documents
                .values()
                .filter(|d| d.collection == query.collection)
                .cloned()
                .collect()
        };
        Ok(query.apply(candidates))
    }

    #[instrument(skip(self, batch), fields(ops = batch.len()))]
    async fn commit(&self, batch: &WriteBatch) -> RepoResult<()> {
        self.state.lock().apply_all(batch.ops())
    }
}

#[async_trait]
impl MarkerRepository for MemoryStore {
    async fn find(
        &self,
        target: &ReactionTarget,
        parent_id: &DocId,
        user_id: &DocId,
    ) -> RepoResult<Option<UserMarker>> {
        let key = (
            target.marker_collection.to_string(),
            parent_id.clone(),
            user_id.clone(),
        );
        Ok(self.state.lock().markers.get(&key).cloned())
    }

    async fn count_for(&self, target: &ReactionTarget, parent_id: &DocId) -> RepoResult<i64> {
        Ok(self.marker_count(target.marker_collection, parent_id) as i64)
    }

    #[instrument(skip(self, intent), fields(target = target.name))]
    async fn toggle_atomic(
        &self,
        target: &ReactionTarget,
        parent_id: &DocId,
        actor_id: &DocId,
        intent: &ToggleIntent,
        now: DateTime<Utc>,
    ) -> RepoResult<ToggleOutcome> {
        let mut state = self.state.lock();

        let parent = state
            .documents
            .get(&(target.parent_collection.to_string(), parent_id.clone()))
            .cloned()
            .ok_or_else(|| DomainError::document_not_found(target.parent_collection, parent_id.clone()))?;
        let existing = state
            .markers
            .get(&(
                target.marker_collection.to_string(),
                parent_id.clone(),
                actor_id.clone(),
            ))
            .map(|m| m.kind.clone());

        let decision = ToggleDecision::decide(existing.as_ref(), intent, target.allows_kind_change);
        let batch = WriteBatch::for_decision(target, &parent, actor_id, &decision, now);
        state.apply_all(batch.ops())?;

        let count = state
            .documents
            .get(&(target.parent_collection.to_string(), parent_id.clone()))
            .map(|d| d.counter(target.counter_field))
            .unwrap_or(0);
        debug!(decision = decision.as_str(), count, "Toggle committed");

        let notification = batch.notifications().next().cloned();
        Ok(ToggleOutcome {
            kind: decision.resulting_kind(existing.as_ref()),
            notification,
            decision,
            count,
        })
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn find_by_id(&self, id: &DocId) -> RepoResult<Option<NotificationEvent>> {
        Ok(self.state.lock().notifications.get(id).cloned())
    }

    async fn list_for(
        &self,
        recipient_id: &DocId,
        unread_only: bool,
        limit: i64,
    ) -> RepoResult<Vec<NotificationEvent>> {
        let mut out: Vec<_> = self
            .state
            .lock()
            .notifications
            .values()
            .filter(|n| &n.recipient_id == recipient_id && (!unread_only || !n.read))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        out.truncate(limit.max(1) as usize);
        Ok(out)
    }

    async fn mark_read(&self, id: &DocId) -> RepoResult<bool> {
        match self.state.lock().notifications.get_mut(id) {
            Some(n) => {
                n.read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl AdRepository for MemoryStore {
    async fn find_by_id(&self, id: &DocId) -> RepoResult<Option<Ad>> {
        Ok(self.state.lock().ads.get(id).cloned())
    }

    async fn list(&self, query: &AdQuery) -> RepoResult<Vec<Ad>> {
        let mut out: Vec<_> = self
            .state
            .lock()
            .ads
            .values()
            .filter(|ad| query.status.map_or(true, |s| ad.status == s))
            .filter(|ad| {
                query
                    .advertiser_id
                    .as_ref()
                    .map_or(true, |a| &ad.advertiser_id == a)
            })
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        out.truncate(query.limit.max(1) as usize);
        Ok(out)
    }

    async fn create(&self, ad: &Ad) -> RepoResult<()> {
        let mut state = self.state.lock();
        if state.ads.contains_key(&ad.id) {
            return Err(DomainError::DocumentAlreadyExists {
                collection: "ads".to_string(),
                id: ad.id.clone(),
            });
        }
        state.ads.insert(ad.id.clone(), ad.clone());
        Ok(())
    }

    async fn update(&self, ad: &Ad) -> RepoResult<()> {
        let mut state = self.state.lock();
        match state.ads.get_mut(&ad.id) {
            Some(stored) => {
                stored.title.clone_from(&ad.title);
                stored.description.clone_from(&ad.description);
                stored.image_url.clone_from(&ad.image_url);
                stored.target_url.clone_from(&ad.target_url);
                stored.budget_cents = ad.budget_cents;
                stored.updated_at = ad.updated_at;
                Ok(())
            }
            None => Err(DomainError::AdNotFound(ad.id.clone())),
        }
    }

    async fn update_if_status(&self, ad: &Ad, expected: AdStatus) -> RepoResult<bool> {
        let mut state = self.state.lock();
        match state.ads.get_mut(&ad.id) {
            Some(stored) if stored.status == expected => {
                stored.status = ad.status;
                stored.rejection_reason = ad.rejection_reason.clone();
                stored.updated_at = ad.updated_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, id: &DocId) -> RepoResult<bool> {
        Ok(self.state.lock().ads.remove(id).is_some())
    }
}

#[async_trait]
impl MomentRepository for MemoryStore {
    async fn find_by_id(&self, id: &DocId) -> RepoResult<Option<Moment>> {
        Ok(self.state.lock().moments.get(id).cloned())
    }

    async fn create(&self, moment: &Moment) -> RepoResult<()> {
        self.state
            .lock()
            .moments
            .insert(moment.id.clone(), moment.clone());
        Ok(())
    }

    async fn list_active(
        &self,
        now: DateTime<Utc>,
        author_id: Option<&DocId>,
        limit: i64,
    ) -> RepoResult<Vec<Moment>> {
        let mut out: Vec<_> = self
            .state
            .lock()
            .moments
            .values()
            .filter(|m| !m.is_expired_at(now))
            .filter(|m| author_id.map_or(true, |a| &m.author_id == a))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        out.truncate(limit.max(1) as usize);
        Ok(out)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> RepoResult<u64> {
        let mut state = self.state.lock();
        let before = state.moments.len();
        state.moments.retain(|_, m| !m.is_expired_at(now));
        Ok((before - state.moments.len()) as u64)
    }
}
