use manada_core::DocId;

/// The signed-in user a toggle acts as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: DocId,
    /// Bearer token for HTTP backends
    pub token: Option<String>,
}

impl Identity {
    pub fn new(user_id: DocId) -> Self {
        Self {
            user_id,
            token: None,
        }
    }

    pub fn with_token(user_id: DocId, token: impl Into<String>) -> Self {
        Self {
            user_id,
            token: Some(token.into()),
        }
    }
}
