//! Moment entity <-> model mapper

use manada_core::{DomainError, Moment};

use super::parse_id;
use crate::models::MomentModel;

impl TryFrom<MomentModel> for Moment {
    type Error = DomainError;

    fn try_from(model: MomentModel) -> Result<Self, Self::Error> {
        Ok(Moment {
            id: parse_id(&model.id)?,
            author_id: parse_id(&model.author_id)?,
            media_url: model.media_url,
            caption: model.caption,
            created_at: model.created_at,
            expires_at: model.expires_at,
        })
    }
}
