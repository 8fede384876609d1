//! Ad service
//!
//! Advertiser campaigns and their review/payment lifecycle. Every lifecycle
//! action is legal from exactly one status; anything else is rejected with
//! the ad left untouched.

use manada_core::{
    collections, Ad, AdAction, AdQuery, AdStatus, AdUpdate, ChangeEvent, DocId, DomainError,
};
use tracing::{info, instrument, warn};

use crate::dto::{AdResponse, CreateAdRequest, UpdateAdRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

const DEFAULT_LIST_LIMIT: i64 = 50;
const MAX_LIST_LIMIT: i64 = 100;

/// Ad service
pub struct AdService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AdService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// List ads, newest first
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        status: Option<&str>,
        advertiser_id: Option<DocId>,
        limit: Option<i64>,
    ) -> ServiceResult<Vec<AdResponse>> {
        let status = status
            .map(|raw| {
                AdStatus::parse(raw)
                    .ok_or_else(|| ServiceError::validation(format!("Unknown ad status '{raw}'")))
            })
            .transpose()?;

        let query = AdQuery {
            status,
            advertiser_id,
            limit: limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT),
        };
        let ads = self.ctx.ad_repo().list(&query).await?;
        Ok(ads.iter().map(AdResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, ad_id: &DocId) -> ServiceResult<AdResponse> {
        self.load(ad_id).await.map(AdResponse::from)
    }

    /// Create an ad awaiting review
    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        advertiser_id: &DocId,
        request: CreateAdRequest,
    ) -> ServiceResult<AdResponse> {
        let mut ad = Ad::new(
            advertiser_id.clone(),
            request.title,
            request.description,
            request.budget_cents,
        );
        ad.image_url = request.image_url;
        ad.target_url = request.target_url;

        self.ctx.ad_repo().create(&ad).await?;
        info!(ad_id = %ad.id, advertiser_id = %advertiser_id, "Ad created");

        self.ctx
            .publish_changes(&[ChangeEvent::added(collections::ADS, ad.id.clone())])
            .await;
        Ok(AdResponse::from(ad))
    }

    /// Edit an ad's content; owner or admin
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        ad_id: &DocId,
        actor_id: &DocId,
        request: UpdateAdRequest,
    ) -> ServiceResult<AdResponse> {
        let mut ad = self.load(ad_id).await?;
        self.require_owner_or_admin(&ad, actor_id)?;

        ad.edit(AdUpdate {
            title: request.title,
            description: request.description,
            image_url: request.image_url,
            target_url: request.target_url,
            budget_cents: request.budget_cents,
        });
        self.ctx.ad_repo().update(&ad).await?;
        info!(ad_id = %ad_id, "Ad updated");

        // Status may have moved since the load above
        let ad = self.load(ad_id).await?;

        self.ctx
            .publish_changes(&[ChangeEvent::modified(collections::ADS, ad_id.clone())])
            .await;
        Ok(AdResponse::from(ad))
    }

    /// Delete an ad; owner or admin
    #[instrument(skip(self))]
    pub async fn delete(&self, ad_id: &DocId, actor_id: &DocId) -> ServiceResult<()> {
        let ad = self.load(ad_id).await?;
        self.require_owner_or_admin(&ad, actor_id)?;

        if !self.ctx.ad_repo().delete(ad_id).await? {
            return Err(DomainError::AdNotFound(ad_id.clone()).into());
        }
        info!(ad_id = %ad_id, "Ad deleted");

        self.ctx
            .publish_changes(&[ChangeEvent::removed(collections::ADS, ad_id.clone())])
            .await;
        Ok(())
    }

    /// Apply a lifecycle action (`approve`, `reject`, `process_payment`, `pause`, `resume`)
    ///
    /// Review actions need an admin; the others need the owner or an admin.
    #[instrument(skip(self, reason))]
    pub async fn apply_action(
        &self,
        ad_id: &DocId,
        actor_id: &DocId,
        action: &str,
        reason: Option<String>,
    ) -> ServiceResult<AdResponse> {
        let action = AdAction::parse(action)
            .ok_or_else(|| ServiceError::validation(format!("Unknown action '{action}'")))?;

        let mut ad = self.load(ad_id).await?;
        if action.requires_admin() {
            if !self.ctx.is_admin(actor_id) {
                return Err(DomainError::AdminRequired.into());
            }
        } else {
            self.require_owner_or_admin(&ad, actor_id)?;
        }

        let prior = ad.status;
        ad.apply(action, reason)?;

        // Another writer may have moved the status since we read it
        if !self.ctx.ad_repo().update_if_status(&ad, prior).await? {
            let current = self.load(ad_id).await?;
            warn!(
                ad_id = %ad_id,
                action = action.as_str(),
                status = current.status.as_str(),
                "Ad status changed concurrently"
            );
            return Err(DomainError::InvalidStatusTransition {
                action: action.as_str().to_string(),
                status: current.status.as_str().to_string(),
            }
            .into());
        }

        info!(
            ad_id = %ad_id,
            action = action.as_str(),
            from = prior.as_str(),
            to = ad.status.as_str(),
            "Ad status changed"
        );
        self.ctx
            .publish_changes(&[ChangeEvent::modified(collections::ADS, ad_id.clone())])
            .await;
        Ok(AdResponse::from(ad))
    }

    async fn load(&self, ad_id: &DocId) -> ServiceResult<Ad> {
        self.ctx
            .ad_repo()
            .find_by_id(ad_id)
            .await?
            .ok_or_else(|| DomainError::AdNotFound(ad_id.clone()).into())
    }

    fn require_owner_or_admin(&self, ad: &Ad, actor_id: &DocId) -> ServiceResult<()> {
        if ad.is_owned_by(actor_id) || self.ctx.is_admin(actor_id) {
            Ok(())
        } else {
            Err(DomainError::NotAdOwner.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use manada_common::AppConfig;
    use manada_db::{MemoryChangeBus, MemoryStore};

    fn id(s: &str) -> DocId {
        DocId::parse(s).unwrap()
    }

    fn context() -> ServiceContext {
        let mut config = AppConfig::local("test-secret");
        config.admin.user_ids = vec!["admin".to_string()];
        ServiceContext::in_memory(&config, MemoryStore::new(), MemoryChangeBus::new())
    }

    fn request(title: &str) -> CreateAdRequest {
        CreateAdRequest {
            title: title.to_string(),
            description: "Premium kibble".to_string(),
            image_url: None,
            target_url: Some("https://example.com".to_string()),
            budget_cents: 10_000,
        }
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let ctx = context();
        let service = AdService::new(&ctx);
        let owner = id("adv");
        let admin = id("admin");

        let ad = service.create(&owner, request("Kibble")).await.unwrap();
        assert_eq!(ad.status, AdStatus::Pending);
        let ad_id = id(&ad.id);

        let steps = [
            ("approve", &admin, AdStatus::Approved),
            ("process_payment", &owner, AdStatus::Active),
            ("pause", &owner, AdStatus::Paused),
            ("resume", &owner, AdStatus::Active),
        ];
        for (action, actor, expected) in steps {
            let resp = service.apply_action(&ad_id, actor, action, None).await.unwrap();
            assert_eq!(resp.status, expected, "after {action}");
        }
    }

    #[tokio::test]
    async fn test_approve_non_pending_is_rejected_and_unchanged() {
        let ctx = context();
        let service = AdService::new(&ctx);
        let admin = id("admin");
        let ad = service.create(&id("adv"), request("Toys")).await.unwrap();
        let ad_id = id(&ad.id);
        service.apply_action(&ad_id, &admin, "approve", None).await.unwrap();

        let before = service.get(&ad_id).await.unwrap();
        let err = service
            .apply_action(&ad_id, &admin, "approve", None)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_STATUS_TRANSITION");

        let after = service.get(&ad_id).await.unwrap();
        assert_eq!(after.status, AdStatus::Approved);
        assert_eq!(after.updated_at, before.updated_at);
    }

    #[tokio::test]
    async fn test_reject_stores_reason() {
        let ctx = context();
        let service = AdService::new(&ctx);
        let ad = service.create(&id("adv"), request("Leashes")).await.unwrap();

        let resp = service
            .apply_action(&id(&ad.id), &id("admin"), "reject", Some("blurry image".to_string()))
            .await
            .unwrap();
        assert_eq!(resp.status, AdStatus::Rejected);
        assert_eq!(resp.rejection_reason.as_deref(), Some("blurry image"));
    }

    #[tokio::test]
    async fn test_action_permissions() {
        let ctx = context();
        let service = AdService::new(&ctx);
        let ad = service.create(&id("adv"), request("Beds")).await.unwrap();
        let ad_id = id(&ad.id);

        let err = service.apply_action(&ad_id, &id("adv"), "approve", None).await.unwrap_err();
        assert_eq!(err.status_code(), 403);

        let err = service.apply_action(&ad_id, &id("other"), "pause", None).await.unwrap_err();
        assert_eq!(err.status_code(), 403);

        let err = service.apply_action(&ad_id, &id("adv"), "explode", None).await.unwrap_err();
        assert_eq!(err.status_code(), 400);

        let err = service
            .apply_action(&id("missing"), &id("admin"), "approve", None)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_update_delete_and_list() {
        let ctx = context();
        let service = AdService::new(&ctx);
        let ad = service.create(&id("adv"), request("Collars")).await.unwrap();
        let ad_id = id(&ad.id);
        service.create(&id("other"), request("Bowls")).await.unwrap();

        let err = service
            .update(&ad_id, &id("other"), UpdateAdRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);

        let updated = service
            .update(
                &ad_id,
                &id("adv"),
                UpdateAdRequest {
                    title: Some("Fancy collars".to_string()),
                    ..UpdateAdRequest::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Fancy collars");
        assert_eq!(updated.description, "Premium kibble");

        let mine = service.list(None, Some(id("adv")), None).await.unwrap();
        assert_eq!(mine.len(), 1);
        let pending = service.list(Some("pending"), None, Some(10)).await.unwrap();
        assert_eq!(pending.len(), 2);
        assert!(service.list(Some("bogus"), None, None).await.is_err());

        service.delete(&ad_id, &id("admin")).await.unwrap();
        assert_eq!(service.get(&ad_id).await.unwrap_err().status_code(), 404);
    }

    #[tokio::test]
    async fn test_stale_edit_keeps_approved_status() {
        let ctx = context();
        let service = AdService::new(&ctx);
        let ad = service.create(&id("adv"), request("Leashes")).await.unwrap();
        let ad_id = id(&ad.id);

        let mut stale = ctx.ad_repo().find_by_id(&ad_id).await.unwrap().unwrap();
        service.apply_action(&ad_id, &id("admin"), "approve", None).await.unwrap();

        stale.edit(AdUpdate {
            title: Some("Retractable leashes".to_string()),
            ..AdUpdate::default()
        });
        ctx.ad_repo().update(&stale).await.unwrap();

        let stored = service.get(&ad_id).await.unwrap();
        assert_eq!(stored.status, AdStatus::Approved);
        assert_eq!(stored.title, "Retractable leashes");

        let updated = service
            .update(
                &ad_id,
                &id("adv"),
                UpdateAdRequest {
                    budget_cents: Some(20_000),
                    ..UpdateAdRequest::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, AdStatus::Approved);
        assert_eq!(updated.budget_cents, 20_000);
    }
}
