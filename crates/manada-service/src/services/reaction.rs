//! Reaction service
//!
//! Likes, emoji reactions, favorites and badge awards: one marker per user on
//! a parent document plus a counter field on the parent.

use chrono::Utc;
use manada_core::{
    collections, ChangeEvent, ConsistencyMode, DocId, Document, DomainError, ReactionKind,
    ReactionTarget, ToggleDecision, ToggleIntent, ToggleOutcome, WriteBatch,
};
use tracing::{debug, info, instrument};

use crate::dto::ReactionResponse;

use super::context::ServiceContext;
use super::error::ServiceResult;

/// A decided but not yet committed toggle (client-batch mode)
///
/// The decision reflects the marker as read when the plan was made; nothing
/// re-checks it at commit time.
#[derive(Debug, Clone)]
pub struct ReactionPlan {
    pub target: ReactionTarget,
    pub parent: Document,
    pub actor_id: DocId,
    pub existing: Option<ReactionKind>,
    pub decision: ToggleDecision,
    pub batch: WriteBatch,
}

impl ReactionPlan {
    /// Counter value the planner expects after commit
    pub fn expected_count(&self) -> i64 {
        (self.parent.counter(self.target.counter_field) + self.decision.counter_delta()).max(0)
    }
}

/// Reaction service
pub struct ReactionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReactionService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Look up a reaction target by its route name
    pub fn target(name: &str) -> ServiceResult<ReactionTarget> {
        ReactionTarget::by_name(name)
            .ok_or_else(|| DomainError::UnknownReactionTarget(name.to_string()).into())
    }

    /// Resolve the requested kind against the target (`like` by default)
    pub fn kind(target: &ReactionTarget, requested: Option<&str>) -> ServiceResult<ReactionKind> {
        let parsed = requested.map(ReactionKind::parse).transpose()?;
        Ok(target.resolve_kind(parsed)?)
    }

    /// Current counter and, for a signed-in viewer, their marker
    #[instrument(skip(self))]
    pub async fn snapshot(
        &self,
        target_name: &str,
        parent_id: &DocId,
        viewer: Option<&DocId>,
    ) -> ServiceResult<ReactionResponse> {
        let target = Self::target(target_name)?;
        let parent = self.load_parent(&target, parent_id).await?;

        let me = match viewer {
            Some(user_id) => self
                .ctx
                .marker_repo()
                .find(&target, parent_id, user_id)
                .await?
                .map(|m| m.kind),
            None => None,
        };

        Ok(ReactionResponse {
            target: target.name.to_string(),
            parent_id: parent_id.to_string(),
            count: parent.counter(target.counter_field),
            me: me.map(String::from),
            decision: None,
        })
    }

    /// Add if absent, remove if present, or switch kind on palette targets
    #[instrument(skip(self))]
    pub async fn toggle(
        &self,
        target_name: &str,
        parent_id: &DocId,
        actor_id: &DocId,
        kind: Option<&str>,
    ) -> ServiceResult<ReactionResponse> {
        let target = Self::target(target_name)?;
        let kind = Self::kind(&target, kind)?;
        self.mutate(target, parent_id, actor_id, ToggleIntent::Toggle(kind))
            .await
    }

    /// Ensure a marker of the given kind exists
    #[instrument(skip(self))]
    pub async fn set(
        &self,
        target_name: &str,
        parent_id: &DocId,
        actor_id: &DocId,
        kind: Option<&str>,
    ) -> ServiceResult<ReactionResponse> {
        let target = Self::target(target_name)?;
        let kind = Self::kind(&target, kind)?;
        self.mutate(target, parent_id, actor_id, ToggleIntent::Set(kind))
            .await
    }

    /// Ensure no marker exists; a no-op when there is none
    #[instrument(skip(self))]
    pub async fn clear(
        &self,
        target_name: &str,
        parent_id: &DocId,
        actor_id: &DocId,
    ) -> ServiceResult<ReactionResponse> {
        let target = Self::target(target_name)?;
        self.mutate(target, parent_id, actor_id, ToggleIntent::Clear)
            .await
    }

    async fn mutate(
        &self,
        target: ReactionTarget,
        parent_id: &DocId,
        actor_id: &DocId,
        intent: ToggleIntent,
    ) -> ServiceResult<ReactionResponse> {
        let outcome = match self.ctx.consistency() {
            ConsistencyMode::Transactional => {
                let outcome = self
                    .ctx
                    .marker_repo()
                    .toggle_atomic(&target, parent_id, actor_id, &intent, Utc::now())
                    .await?;
                self.publish(&target, parent_id, &outcome).await;
                outcome
            }
            ConsistencyMode::ClientBatch => {
                let plan = self.plan(&target, parent_id, actor_id, &intent).await?;
                self.commit_plan(plan).await?
            }
        };

        info!(
            target = target.name,
            parent_id = %parent_id,
            user_id = %actor_id,
            decision = outcome.decision.as_str(),
            count = outcome.count,
            "Reaction mutation applied"
        );

        Ok(ReactionResponse {
            target: target.name.to_string(),
            parent_id: parent_id.to_string(),
            count: outcome.count,
            me: outcome.kind.map(String::from),
            decision: Some(outcome.decision.as_str().to_string()),
        })
    }

    /// Read the parent and the actor's marker, decide, and build the batch
    pub async fn plan(
        &self,
        target: &ReactionTarget,
        parent_id: &DocId,
        actor_id: &DocId,
        intent: &ToggleIntent,
    ) -> ServiceResult<ReactionPlan> {
        let parent = self.load_parent(target, parent_id).await?;
        let existing = self
            .ctx
            .marker_repo()
            .find(target, parent_id, actor_id)
            .await?
            .map(|m| m.kind);

        let decision = ToggleDecision::decide(existing.as_ref(), intent, target.allows_kind_change);
        let batch = WriteBatch::for_decision(target, &parent, actor_id, &decision, Utc::now());
        debug!(decision = decision.as_str(), ops = batch.len(), "Reaction planned");

        Ok(ReactionPlan {
            target: *target,
            parent,
            actor_id: actor_id.clone(),
            existing,
            decision,
            batch,
        })
    }

    /// Commit a plan's batch as one unit and report the stored counter
    pub async fn commit_plan(&self, plan: ReactionPlan) -> ServiceResult<ToggleOutcome> {
        self.ctx.document_repo().commit(&plan.batch).await?;

        let count = self
            .ctx
            .document_repo()
            .find_by_id(plan.target.parent_collection, &plan.parent.id)
            .await?
            .map(|p| p.counter(plan.target.counter_field))
            .unwrap_or_else(|| plan.expected_count());

        let outcome = ToggleOutcome {
            kind: plan.decision.resulting_kind(plan.existing.as_ref()),
            notification: plan.batch.notifications().next().cloned(),
            decision: plan.decision,
            count,
        };
        self.publish(&plan.target, &plan.parent.id, &outcome).await;
        Ok(outcome)
    }

    async fn load_parent(&self, target: &ReactionTarget, parent_id: &DocId) -> ServiceResult<Document> {
        self.ctx
            .document_repo()
            .find_by_id(target.parent_collection, parent_id)
            .await?
            .ok_or_else(|| DomainError::document_not_found(target.parent_collection, parent_id.clone()).into())
    }

    async fn publish(&self, target: &ReactionTarget, parent_id: &DocId, outcome: &ToggleOutcome) {
        let marker_event = match outcome.decision {
            ToggleDecision::Noop => return,
            ToggleDecision::Add { .. } => ChangeEvent::added(target.marker_collection, parent_id.clone()),
            ToggleDecision::ChangeKind { .. } => {
                ChangeEvent::modified(target.marker_collection, parent_id.clone())
            }
            ToggleDecision::Remove { .. } => {
                ChangeEvent::removed(target.marker_collection, parent_id.clone())
            }
        };

        let mut events = vec![
            ChangeEvent::modified(target.parent_collection, parent_id.clone()),
            marker_event,
        ];
        if let Some(n) = &outcome.notification {
            events.push(ChangeEvent::added(
                collections::user_subcollection(&n.recipient_id, collections::NOTIFICATIONS),
                n.id.clone(),
            ));
        }
        self.ctx.publish_changes(&events).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use manada_common::AppConfig;
    use manada_core::ChangeKind;
    use manada_db::{MemoryChangeBus, MemoryStore};
    use serde_json::json;

    fn id(s: &str) -> DocId {
        DocId::parse(s).unwrap()
    }

    async fn setup(mode: ConsistencyMode) -> (ServiceContext, MemoryStore, MemoryChangeBus) {
        let mut config = AppConfig::local("test-secret");
        config.reactions.consistency = mode;
        let store = MemoryStore::new();
        let bus = MemoryChangeBus::new();
        let ctx = ServiceContext::in_memory(&config, store.clone(), bus.clone());

        let post = Document::with_id(
            id("P"),
            collections::POSTS,
            Some(id("owner")),
            json!({ "likesCount": 3, "content": "hello" })
                .as_object()
                .cloned()
                .unwrap(),
            Utc::now(),
        );
        ctx.document_repo().create(&post).await.unwrap();
        (ctx, store, bus)
    }

    #[tokio::test]
    async fn test_like_then_unlike() {
        let (ctx, store, _bus) = setup(ConsistencyMode::Transactional).await;
        let service = ReactionService::new(&ctx);
        let a = id("A");

        let liked = service.toggle("post_likes", &id("P"), &a, None).await.unwrap();
        assert_eq!(liked.count, 4);
        assert_eq!(liked.me.as_deref(), Some("like"));
        assert_eq!(liked.decision.as_deref(), Some("add"));
        assert_eq!(store.marker_count("likes", &id("P")), 1);

        let notes = store.all_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].notification_type, "new_like");
        assert_eq!(notes[0].recipient_id, id("owner"));
        assert_eq!(notes[0].from_user_id, a);

        let unliked = service.toggle("post_likes", &id("P"), &a, None).await.unwrap();
        assert_eq!(unliked.count, 3);
        assert!(unliked.me.is_none());
        assert_eq!(store.marker_count("likes", &id("P")), 0);
        assert_eq!(store.all_notifications().len(), 1);
    }

    #[tokio::test]
    async fn test_owner_like_is_silent() {
        let (ctx, store, _bus) = setup(ConsistencyMode::ClientBatch).await;
        let service = ReactionService::new(&ctx);

        let resp = service
            .toggle("post_likes", &id("P"), &id("owner"), None)
            .await
            .unwrap();
        assert_eq!(resp.count, 4);
        assert!(store.all_notifications().is_empty());
        let unread = ctx
            .notification_repo()
            .list_for(&id("owner"), true, 10)
            .await
            .unwrap();
        assert!(unread.is_empty());
    }

    #[tokio::test]
    async fn test_clear_without_reaction_never_goes_negative() {
        let (ctx, _store, _bus) = setup(ConsistencyMode::Transactional).await;
        let service = ReactionService::new(&ctx);

        let resp = service.clear("post_likes", &id("P"), &id("A")).await.unwrap();
        assert_eq!(resp.count, 3);
        assert_eq!(resp.decision.as_deref(), Some("noop"));
    }

    #[tokio::test]
    async fn test_palette_switch_keeps_count() {
        let (ctx, store, _bus) = setup(ConsistencyMode::Transactional).await;
        let service = ReactionService::new(&ctx);
        let a = id("A");

        service
            .set("post_reactions", &id("P"), &a, Some("❤️"))
            .await
            .unwrap();
        let switched = service
            .toggle("post_reactions", &id("P"), &a, Some("🐾"))
            .await
            .unwrap();
        assert_eq!(switched.count, 1);
        assert_eq!(switched.me.as_deref(), Some("🐾"));
        assert_eq!(switched.decision.as_deref(), Some("change_kind"));
        assert_eq!(store.marker_count("reactions", &id("P")), 1);

        let err = service
            .toggle("post_reactions", &id("P"), &a, None)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_unknown_target_and_parent() {
        let (ctx, _store, _bus) = setup(ConsistencyMode::Transactional).await;
        let service = ReactionService::new(&ctx);

        let err = service.toggle("bogus", &id("P"), &id("A"), None).await.unwrap_err();
        assert_eq!(err.status_code(), 404);

        let err = service
            .toggle("post_likes", &id("missing"), &id("A"), None)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_snapshot_reports_viewer_marker() {
        let (ctx, _store, _bus) = setup(ConsistencyMode::Transactional).await;
        let service = ReactionService::new(&ctx);
        service.toggle("post_likes", &id("P"), &id("A"), None).await.unwrap();

        let anon = service.snapshot("post_likes", &id("P"), None).await.unwrap();
        assert_eq!(anon.count, 4);
        assert!(anon.me.is_none());

        let mine = service
            .snapshot("post_likes", &id("P"), Some(&id("A")))
            .await
            .unwrap();
        assert_eq!(mine.me.as_deref(), Some("like"));
    }

    #[tokio::test]
    async fn test_mutation_publishes_changes() {
        let (ctx, _store, bus) = setup(ConsistencyMode::Transactional).await;
        let mut rx = bus.subscribe();
        let service = ReactionService::new(&ctx);
        service.toggle("post_likes", &id("P"), &id("A"), None).await.unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.collection, "posts");
        assert_eq!(first.kind, ChangeKind::Modified);
        let second = rx.recv().await.unwrap();
        assert_eq!(second.collection, "likes");
        assert_eq!(second.kind, ChangeKind::Added);
        let third = rx.recv().await.unwrap();
        assert_eq!(third.collection, "users/owner/notifications");
    }

    /// Two tabs decide from the same stale view before either commits
    #[tokio::test]
    async fn test_two_tab_race_in_client_batch_mode_double_counts() {
        let (ctx, store, _bus) = setup(ConsistencyMode::ClientBatch).await;
        let service = ReactionService::new(&ctx);
        let target = ReactionTarget::POST_LIKES;
        let intent = ToggleIntent::Toggle(ReactionKind::like());
        let a = id("A");

        let tab1 = service.plan(&target, &id("P"), &a, &intent).await.unwrap();
        let tab2 = service.plan(&target, &id("P"), &a, &intent).await.unwrap();
        service.commit_plan(tab1).await.unwrap();
        let outcome = service.commit_plan(tab2).await.unwrap();

        assert_eq!(store.marker_count("likes", &id("P")), 1);
        assert_eq!(outcome.count, 5);
    }

    #[tokio::test]
    async fn test_two_tab_race_in_transactional_mode_counts_once() {
        let (ctx, store, _bus) = setup(ConsistencyMode::Transactional).await;
        let a = id("A");

        let tasks: Vec<_> = (0..2)
            .map(|_| {
                let ctx = ctx.clone();
                let a = a.clone();
                tokio::spawn(async move {
                    ReactionService::new(&ctx)
                        .set("post_likes", &id("P"), &a, None)
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(store.marker_count("likes", &id("P")), 1);
        let snap = ReactionService::new(&ctx)
            .snapshot("post_likes", &id("P"), None)
            .await
            .unwrap();
        assert_eq!(snap.count, 4);
    }
}
