//! In-process backends over a [`ServiceContext`]

use async_trait::async_trait;
use manada_core::{DocId, Document, FeedQuery, ReactionTarget, ToggleIntent};
use manada_service::{FeedService, ReactionService, ServiceContext};

use super::{FeedSource, ReactionBackend, ReactionState};
use crate::error::ClientResult;
use crate::toggle::Identity;

/// Reaction writes through [`ReactionService`]
#[derive(Debug, Clone)]
pub struct ServiceBackend {
    ctx: ServiceContext,
}

impl ServiceBackend {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl ReactionBackend for ServiceBackend {
    async fn snapshot(
        &self,
        target: &ReactionTarget,
        parent_id: &DocId,
        viewer: Option<&Identity>,
    ) -> ClientResult<ReactionState> {
        let resp = ReactionService::new(&self.ctx)
            .snapshot(target.name, parent_id, viewer.map(|v| &v.user_id))
            .await?;
        ReactionState::try_from(&resp)
    }

    async fn apply(
        &self,
        target: &ReactionTarget,
        parent_id: &DocId,
        identity: &Identity,
        intent: &ToggleIntent,
    ) -> ClientResult<ReactionState> {
        let service = ReactionService::new(&self.ctx);
        let resp = match intent {
            ToggleIntent::Set(kind) => {
                service
                    .set(target.name, parent_id, &identity.user_id, Some(kind.as_str()))
                    .await?
            }
            ToggleIntent::Toggle(kind) => {
                service
                    .toggle(target.name, parent_id, &identity.user_id, Some(kind.as_str()))
                    .await?
            }
            ToggleIntent::Clear => service.clear(target.name, parent_id, &identity.user_id).await?,
        };
        ReactionState::try_from(&resp)
    }
}

/// Feed pages through [`FeedService`]
#[derive(Debug, Clone)]
pub struct ServiceFeedSource {
    ctx: ServiceContext,
}

impl ServiceFeedSource {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl FeedSource for ServiceFeedSource {
    async fn fetch(&self, query: &FeedQuery) -> ClientResult<Vec<Document>> {
        Ok(FeedService::new(&self.ctx).page(query).await?)
    }
}
