//! Path parameter helpers
//!
//! Document ids arrive as raw path segments and are parsed here.

use manada_core::DocId;
use serde::Deserialize;

use crate::response::ApiError;

/// Parse a path segment as a document id
pub fn parse_doc_id(raw: &str, name: &str) -> Result<DocId, ApiError> {
    DocId::parse(raw).map_err(|e| ApiError::invalid_path(format!("Invalid {name}: {e}")))
}

/// Path parameters for reaction routes
#[derive(Debug, Deserialize)]
pub struct ReactionPath {
    pub target: String,
    pub parent_id: String,
}

impl ReactionPath {
    pub fn parent_id(&self) -> Result<DocId, ApiError> {
        parse_doc_id(&self.parent_id, "parent_id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_doc_id() {
        assert_eq!(parse_doc_id("post1", "post_id").unwrap().as_str(), "post1");

        let err = parse_doc_id("", "post_id").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PATH_PARAMETER");
        assert!(err.to_string().contains("post_id"));
    }

    #[test]
    fn test_reaction_path() {
        let path = ReactionPath {
            target: "posts".to_string(),
            parent_id: "p1".to_string(),
        };
        assert_eq!(path.parent_id().unwrap().as_str(), "p1");
    }
}
