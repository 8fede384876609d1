//! Ad entity <-> model mapper

use manada_core::{Ad, AdStatus, DomainError};

use super::parse_id;
use crate::models::AdModel;

impl TryFrom<AdModel> for Ad {
    type Error = DomainError;

    fn try_from(model: AdModel) -> Result<Self, Self::Error> {
        let status = AdStatus::parse(&model.status).ok_or_else(|| {
            DomainError::DatabaseError(format!("ad {} has unknown status '{}'", model.id, model.status))
        })?;

        Ok(Ad {
            id: parse_id(&model.id)?,
            advertiser_id: parse_id(&model.advertiser_id)?,
            title: model.title,
            description: model.description,
            image_url: model.image_url,
            target_url: model.target_url,
            budget_cents: model.budget_cents,
            status,
            rejection_reason: model.rejection_reason,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
