//! Optimistic toggle controller
//!
//! Shows the outcome of a like/reaction/favorite immediately, then reconciles
//! with the backend. A failed write restores the exact state seen before the
//! mutation started.

use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use manada_core::{DocId, ReactionKind, ReactionTarget, ToggleDecision, ToggleIntent};
use tracing::{debug, instrument, warn};

use super::Identity;
use crate::backend::{ReactionBackend, ReactionState};
use crate::error::ToggleError;

type Key = (DocId, DocId);

/// Marks `(parent, user)` busy until dropped
struct InFlightGuard<'a> {
    set: &'a DashSet<Key>,
    key: Key,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(set: &'a DashSet<Key>, key: Key) -> Option<Self> {
        set.insert(key.clone()).then_some(Self { set, key })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set.remove(&self.key);
    }
}

/// Per-target optimistic toggle state for one client (one tab)
///
/// At most one mutation per `(parent, user)` runs at a time within an
/// instance. Separate instances are not coordinated with each other.
pub struct OptimisticToggle {
    target: ReactionTarget,
    backend: Arc<dyn ReactionBackend>,
    states: DashMap<Key, ReactionState>,
    in_flight: DashSet<Key>,
}

impl OptimisticToggle {
    pub fn new(target: ReactionTarget, backend: Arc<dyn ReactionBackend>) -> Self {
        Self {
            target,
            backend,
            states: DashMap::new(),
            in_flight: DashSet::new(),
        }
    }

    #[inline]
    pub fn target(&self) -> &ReactionTarget {
        &self.target
    }

    /// Local state, if loaded
    pub fn state(&self, parent_id: &DocId, user_id: &DocId) -> Option<ReactionState> {
        self.states
            .get(&(parent_id.clone(), user_id.clone()))
            .map(|s| s.clone())
    }

    /// A mutation for this parent and user is in progress
    pub fn is_pending(&self, parent_id: &DocId, user_id: &DocId) -> bool {
        self.in_flight.contains(&(parent_id.clone(), user_id.clone()))
    }

    /// Whether a remove would do anything, judged from local state only
    pub fn can_remove(&self, parent_id: &DocId, user_id: &DocId) -> bool {
        self.state(parent_id, user_id)
            .is_some_and(|s| s.has_reacted())
    }

    /// Load the authoritative state from the backend, replacing local state
    #[instrument(skip(self, identity), fields(target = self.target.name))]
    pub async fn hydrate(
        &self,
        parent_id: &DocId,
        identity: &Identity,
    ) -> Result<ReactionState, ToggleError> {
        let state = self
            .backend
            .snapshot(&self.target, parent_id, Some(identity))
            .await
            .map_err(ToggleError::Backend)?;
        self.states
            .insert((parent_id.clone(), identity.user_id.clone()), state.clone());
        Ok(state)
    }

    /// Add when not reacted, remove when reacted (switch kind on palettes)
    pub async fn toggle(
        &self,
        parent_id: &DocId,
        identity: Option<&Identity>,
        kind: Option<ReactionKind>,
    ) -> Result<ReactionState, ToggleError> {
        let kind = kind.unwrap_or_else(ReactionKind::like);
        self.mutate(parent_id, identity, ToggleIntent::Toggle(kind))
            .await
    }

    /// Ensure a reaction of `kind` exists
    pub async fn set(
        &self,
        parent_id: &DocId,
        identity: Option<&Identity>,
        kind: ReactionKind,
    ) -> Result<ReactionState, ToggleError> {
        self.mutate(parent_id, identity, ToggleIntent::Set(kind))
            .await
    }

    /// Remove the user's reaction; refused without a backend call when the
    /// local state shows none
    pub async fn remove(
        &self,
        parent_id: &DocId,
        identity: Option<&Identity>,
    ) -> Result<ReactionState, ToggleError> {
        let identity = identity.ok_or(ToggleError::Unauthenticated)?;
        if let Some(state) = self.state(parent_id, &identity.user_id) {
            if !state.has_reacted() {
                return Err(ToggleError::NotReacted);
            }
        }
        self.mutate(parent_id, Some(identity), ToggleIntent::Clear)
            .await
    }

    #[instrument(skip(self, identity), fields(target = self.target.name))]
    async fn mutate(
        &self,
        parent_id: &DocId,
        identity: Option<&Identity>,
        intent: ToggleIntent,
    ) -> Result<ReactionState, ToggleError> {
        let identity = identity.ok_or(ToggleError::Unauthenticated)?;
        let key = (parent_id.clone(), identity.user_id.clone());
        let _guard =
            InFlightGuard::acquire(&self.in_flight, key.clone()).ok_or(ToggleError::InFlight)?;

        let before = match self.state(parent_id, &identity.user_id) {
            Some(state) => state,
            None => self.hydrate(parent_id, identity).await?,
        };

        let decision = ToggleDecision::decide(
            before.mine.as_ref(),
            &intent,
            self.target.allows_kind_change,
        );
        if decision.is_noop() {
            return match intent {
                ToggleIntent::Clear => Err(ToggleError::NotReacted),
                _ => Ok(before),
            };
        }

        // Send what the user sees as the intended end state
        let wire_intent = match &decision {
            ToggleDecision::Add { kind } | ToggleDecision::ChangeKind { to: kind, .. } => {
                ToggleIntent::Set(kind.clone())
            }
            ToggleDecision::Remove { .. } | ToggleDecision::Noop => ToggleIntent::Clear,
        };

        let optimistic = before.apply(&decision);
        self.states.insert(key.clone(), optimistic);
        debug!(decision = decision.as_str(), "Applied optimistic state");

        match self
            .backend
            .apply(&self.target, parent_id, identity, &wire_intent)
            .await
        {
            Ok(confirmed) => {
                self.states.insert(key, confirmed.clone());
                Ok(confirmed)
            }
            Err(e) => {
                self.states.insert(key, before);
                warn!(
                    parent_id = %parent_id,
                    user_id = %identity.user_id,
                    error = %e,
                    "Reaction update failed; restored previous state"
                );
                Err(ToggleError::Backend(e))
            }
        }
    }
}

impl std::fmt::Debug for OptimisticToggle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptimisticToggle")
            .field("target", &self.target.name)
            .field("tracked", &self.states.len())
            .field("in_flight", &self.in_flight.len())
            .finish()
    }
}
