//! Marker entity <-> model mapper

use manada_core::{DomainError, ReactionKind, UserMarker};

use super::parse_id;
use crate::models::MarkerModel;

impl TryFrom<MarkerModel> for UserMarker {
    type Error = DomainError;

    fn try_from(model: MarkerModel) -> Result<Self, Self::Error> {
        Ok(UserMarker {
            parent_id: parse_id(&model.parent_id)?,
            user_id: parse_id(&model.user_id)?,
            kind: ReactionKind::parse(&model.kind)
                .map_err(|e| DomainError::DatabaseError(e.to_string()))?,
            collection: model.collection,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
