//! Document entity <-> model mapper

use manada_core::{Document, DomainError};
use serde_json::Value;

use super::parse_id;
use crate::models::DocumentModel;

impl TryFrom<DocumentModel> for Document {
    type Error = DomainError;

    fn try_from(model: DocumentModel) -> Result<Self, Self::Error> {
        let data = match model.data.0 {
            Value::Object(map) => map,
            other => {
                return Err(DomainError::DatabaseError(format!(
                    "document {}/{} holds non-object data: {other}",
                    model.collection, model.id
                )))
            }
        };

        Ok(Document {
            id: parse_id(&model.id)?,
            owner_id: model.owner_id.as_deref().map(parse_id).transpose()?,
            collection: model.collection,
            data,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
