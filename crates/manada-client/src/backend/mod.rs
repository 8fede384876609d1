//! Backend ports of the client and their implementations

mod changes;
mod http;
mod service;

use async_trait::async_trait;
use manada_core::{
    ChangeEvent, DocId, Document, FeedQuery, ReactionKind, ReactionTarget, ToggleDecision,
    ToggleIntent,
};
use manada_service::ReactionResponse;
use tokio::sync::broadcast;

use crate::error::{ClientError, ClientResult};
use crate::toggle::Identity;

pub use http::HttpReactionBackend;
pub use service::{ServiceBackend, ServiceFeedSource};

/// A parent's counter and the current user's marker, as the client sees them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReactionState {
    pub count: i64,
    pub mine: Option<ReactionKind>,
}

impl ReactionState {
    pub fn new(count: i64, mine: Option<ReactionKind>) -> Self {
        Self {
            count: count.max(0),
            mine,
        }
    }

    /// State after a decision, before the server confirms it
    pub fn apply(&self, decision: &ToggleDecision) -> Self {
        Self::new(
            self.count + decision.counter_delta(),
            decision.resulting_kind(self.mine.as_ref()),
        )
    }

    #[inline]
    pub fn has_reacted(&self) -> bool {
        self.mine.is_some()
    }
}

impl TryFrom<&ReactionResponse> for ReactionState {
    type Error = ClientError;

    /// An unparseable `me` is a server fault, never "not reacted"
    fn try_from(resp: &ReactionResponse) -> Result<Self, Self::Error> {
        let mine = resp
            .me
            .as_deref()
            .map(ReactionKind::parse)
            .transpose()
            .map_err(|e| ClientError::InvalidResponse(format!("reaction kind: {e}")))?;
        Ok(Self::new(resp.count, mine))
    }
}

/// Where reaction writes go
#[async_trait]
pub trait ReactionBackend: Send + Sync {
    /// Authoritative counter and the viewer's marker
    async fn snapshot(
        &self,
        target: &ReactionTarget,
        parent_id: &DocId,
        viewer: Option<&Identity>,
    ) -> ClientResult<ReactionState>;

    /// Persist a `Set` or `Clear` intent and return the resulting state
    async fn apply(
        &self,
        target: &ReactionTarget,
        parent_id: &DocId,
        identity: &Identity,
        intent: &ToggleIntent,
    ) -> ClientResult<ReactionState>;
}

/// Where feed pages come from
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, query: &FeedQuery) -> ClientResult<Vec<Document>>;
}

/// A stream of document change notifications
pub trait ChangeSource: Send + Sync {
    fn changes(&self) -> broadcast::Receiver<ChangeEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_decision() {
        let before = ReactionState::new(3, None);
        let liked = before.apply(&ToggleDecision::Add {
            kind: ReactionKind::like(),
        });
        assert_eq!(liked, ReactionState::new(4, Some(ReactionKind::like())));

        let unliked = liked.apply(&ToggleDecision::Remove {
            kind: ReactionKind::like(),
        });
        assert_eq!(unliked, before);
    }

    #[test]
    fn test_count_clamped_at_zero() {
        let state = ReactionState::new(0, Some(ReactionKind::like())).apply(&ToggleDecision::Remove {
            kind: ReactionKind::like(),
        });
        assert_eq!(state.count, 0);
        assert!(!state.has_reacted());
    }

    fn response(me: Option<&str>) -> ReactionResponse {
        ReactionResponse {
            target: "post_likes".to_string(),
            parent_id: "P".to_string(),
            count: 4,
            me: me.map(str::to_string),
            decision: None,
        }
    }

    #[test]
    fn test_state_from_response() {
        let state = ReactionState::try_from(&response(Some("like"))).unwrap();
        assert_eq!(state, ReactionState::new(4, Some(ReactionKind::like())));

        let state = ReactionState::try_from(&response(None)).unwrap();
        assert!(!state.has_reacted());
    }

    #[test]
    fn test_bad_kind_from_server_is_an_error() {
        let err = ReactionState::try_from(&response(Some("  "))).unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse(_)));
        assert_eq!(err.status(), None);
    }
}
