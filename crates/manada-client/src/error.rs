//! Client error types

use manada_service::ServiceError;
use thiserror::Error;

/// Failure talking to the backend
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response with the server's error body
    #[error("{code} ({status}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// HTTP-equivalent status of the failure, when known
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Service(e) => Some(e.status_code()),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::InvalidResponse(_) => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Why a toggle did not happen
#[derive(Debug, Error)]
pub enum ToggleError {
    #[error("Sign in to react")]
    Unauthenticated,

    /// Another mutation for the same parent and user has not finished
    #[error("A reaction update is already in progress")]
    InFlight,

    /// Remove requested while the local state shows no reaction
    #[error("Nothing to remove")]
    NotReacted,

    /// The write failed; local state was restored
    #[error("Reaction update failed: {0}")]
    Backend(#[source] ClientError),
}

/// Feed subscription failures
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Feed subscription closed")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let api = ClientError::Api {
            status: 404,
            code: "UNKNOWN_DOCUMENT".to_string(),
            message: "Document not found".to_string(),
        };
        assert_eq!(api.status(), Some(404));
        assert!(api.to_string().contains("UNKNOWN_DOCUMENT"));

        let service = ClientError::from(ServiceError::validation("bad kind"));
        assert_eq!(service.status(), Some(400));
    }
}
