//! Moment service
//!
//! Ephemeral 24h content. Reads hide expired moments; an optional background
//! sweeper deletes them from storage.

use std::time::Duration;

use chrono::{DateTime, Utc};
use manada_core::{collections, ChangeEvent, DocId, DomainError, Moment};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, instrument, warn};

use crate::dto::{CreateMomentRequest, MomentResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

const DEFAULT_LIST_LIMIT: i64 = 50;
const MAX_LIST_LIMIT: i64 = 100;

/// Moment service
pub struct MomentService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MomentService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        author_id: &DocId,
        request: CreateMomentRequest,
    ) -> ServiceResult<MomentResponse> {
        let caption = request
            .caption
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        if request.media_url.is_none() && caption.is_none() {
            return Err(ServiceError::validation("A moment needs media or a caption"));
        }

        let now = Utc::now();
        let moment = Moment::new(author_id.clone(), request.media_url, caption, now);
        self.ctx.moment_repo().create(&moment).await?;
        info!(moment_id = %moment.id, expires_at = %moment.expires_at, "Moment created");

        self.ctx
            .publish_changes(&[ChangeEvent::added(collections::MOMENTS, moment.id.clone())])
            .await;
        Ok(MomentResponse::at(&moment, now))
    }

    /// Unexpired moments, newest first
    #[instrument(skip(self))]
    pub async fn list_active(
        &self,
        author_id: Option<&DocId>,
        limit: Option<i64>,
    ) -> ServiceResult<Vec<MomentResponse>> {
        let now = Utc::now();
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
        let moments = self
            .ctx
            .moment_repo()
            .list_active(now, author_id, limit)
            .await?;
        Ok(moments.iter().map(|m| MomentResponse::at(m, now)).collect())
    }

    /// A single moment; expired ones read as missing
    #[instrument(skip(self))]
    pub async fn get(&self, moment_id: &DocId) -> ServiceResult<MomentResponse> {
        let now = Utc::now();
        self.ctx
            .moment_repo()
            .find_by_id(moment_id)
            .await?
            .filter(|m| !m.is_expired_at(now))
            .map(|m| MomentResponse::at(&m, now))
            .ok_or_else(|| DomainError::MomentNotFound(moment_id.clone()).into())
    }

    /// Delete moments that expired at or before `now`
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> ServiceResult<u64> {
        Ok(self.ctx.moment_repo().delete_expired(now).await?)
    }
}

/// Spawn the periodic expired-moment sweeper
pub fn spawn_moment_sweeper(ctx: ServiceContext, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(interval_secs = every.as_secs(), "Moment sweeper started");

        loop {
            ticker.tick().await;
            match MomentService::new(&ctx).sweep_expired(Utc::now()).await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "Swept expired moments"),
                Err(e) => warn!(error = %e, "Moment sweep failed"),
            }
        }
    })
}
