//! Pagination extractor
//!
//! Extracts `limit` / `after_id` query parameters for newest-first lists.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use manada_core::DocId;
use serde::Deserialize;

use crate::response::ApiError;

/// Maximum page size
const MAX_LIMIT: usize = 100;

/// Raw pagination query parameters
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    /// Continue after this document
    #[serde(default)]
    pub after_id: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Validated pagination parameters
#[derive(Debug, Clone, Default)]
pub struct Pagination {
    pub after_id: Option<DocId>,
    /// Requested page size, clamped to 1-100; None means the server default
    pub limit: Option<usize>,
}

impl Pagination {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            after_id: None,
            limit: Some(limit.clamp(1, MAX_LIMIT)),
        }
    }
}

impl TryFrom<PaginationParams> for Pagination {
    type Error = ApiError;

    fn try_from(params: PaginationParams) -> Result<Self, Self::Error> {
        let after_id = params
            .after_id
            .map(|s| {
                DocId::parse(&s).map_err(|_| ApiError::invalid_query("Invalid 'after_id' cursor format"))
            })
            .transpose()?;

        Ok(Pagination {
            after_id,
            limit: params.limit.map(|l| l.clamp(1, MAX_LIMIT)),
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<PaginationParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_query(e.to_string()))?;

        Pagination::try_from(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pagination() {
        let pagination = Pagination::default();
        assert!(pagination.limit.is_none());
        assert!(pagination.after_id.is_none());
    }

    #[test]
    fn test_limit_clamping() {
        assert_eq!(Pagination::with_limit(200).limit, Some(MAX_LIMIT));
        assert_eq!(Pagination::with_limit(0).limit, Some(1));
    }

    #[test]
    fn test_pagination_from_params() {
        let params = PaginationParams {
            after_id: Some("p42".to_string()),
            limit: Some(25),
        };
        let pagination = Pagination::try_from(params).unwrap();
        assert_eq!(pagination.after_id.unwrap().as_str(), "p42");
        assert_eq!(pagination.limit, Some(25));
    }

    #[test]
    fn test_bad_cursor_rejected() {
        let params = PaginationParams {
            after_id: Some("a/b".to_string()),
            limit: None,
        };
        let err = Pagination::try_from(params).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_QUERY_PARAMETER");
    }
}
