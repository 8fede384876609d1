//! Document identifier - opaque string key of a document within a collection

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque document id.
///
/// Ids are chosen by the store (or by callers for user ids coming from the
/// identity provider), so the only constraints are: non-empty, no path
/// separator, and bounded length.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocId(String);

impl DocId {
    /// Maximum accepted id length in bytes
    pub const MAX_LEN: usize = 128;

    /// Generate a fresh random id (UUID v4, hex without dashes)
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Parse and validate an id
    pub fn parse(s: &str) -> Result<Self, DocIdParseError> {
        if s.is_empty() {
            return Err(DocIdParseError::Empty);
        }
        if s.len() > Self::MAX_LEN {
            return Err(DocIdParseError::TooLong);
        }
        if s.contains('/') || s.chars().any(char::is_whitespace) {
            return Err(DocIdParseError::InvalidCharacter);
        }
        Ok(Self(s.to_string()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Error when parsing a DocId from string
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DocIdParseError {
    #[error("document id must not be empty")]
    Empty,
    #[error("document id is too long")]
    TooLong,
    #[error("document id contains an invalid character")]
    InvalidCharacter,
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for DocId {
    type Err = DocIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocId::parse(s)
    }
}

impl TryFrom<String> for DocId {
    type Error = DocIdParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DocId::parse(&value)
    }
}

impl From<DocId> for String {
    fn from(id: DocId) -> Self {
        id.0
    }
}

impl AsRef<str> for DocId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
