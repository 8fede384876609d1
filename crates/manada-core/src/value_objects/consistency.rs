//! How a toggle's existence check and write are combined

use serde::{Deserialize, Serialize};
use std::fmt;

/// Consistency mode for reaction toggles.
///
/// `ClientBatch` decides from the caller's read and then commits an atomic
/// batch; the read and the write are not covered by one transaction, so two
/// concurrent sessions of the same user can both decide "add".
/// `Transactional` runs the check and the write inside one storage
/// transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyMode {
    #[default]
    Transactional,
    ClientBatch,
}

impl ConsistencyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transactional => "transactional",
            Self::ClientBatch => "client_batch",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "transactional" | "transaction" => Some(Self::Transactional),
            "client_batch" | "batch" => Some(Self::ClientBatch),
            _ => None,
        }
    }
}

impl fmt::Display for ConsistencyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(
            ConsistencyMode::parse("Transactional"),
            Some(ConsistencyMode::Transactional)
        );
        assert_eq!(
            ConsistencyMode::parse("client_batch"),
            Some(ConsistencyMode::ClientBatch)
        );
        assert_eq!(ConsistencyMode::parse("eventual"), None);
        assert_eq!(ConsistencyMode::default(), ConsistencyMode::Transactional);
    }
}
