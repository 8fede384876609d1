//! Reaction kind - the payload of a user marker (emoji, badge id, or `like`)

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReactionKind(String);

impl ReactionKind {
    pub const LIKE: &'static str = "like";
    pub const MAX_CHARS: usize = 32;

    pub fn like() -> Self {
        Self(Self::LIKE.to_string())
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DomainError::ValidationError(
                "reaction kind must not be empty".to_string(),
            ));
        }
        if trimmed.chars().count() > Self::MAX_CHARS {
            return Err(DomainError::ValidationError(format!(
                "reaction kind must be at most {} characters",
                Self::MAX_CHARS
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn is_like(&self) -> bool {
        self.0 == Self::LIKE
    }
}

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ReactionKind {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ReactionKind::parse(&value)
    }
}

impl From<ReactionKind> for String {
    fn from(kind: ReactionKind) -> Self {
        kind.0
    }
}
