//! Pub/Sub channel naming.

/// Channel prefix for per-collection change events
pub const COLLECTION_CHANNEL_PREFIX: &str = "collection:";
/// Pattern matching every collection channel
pub const ALL_COLLECTIONS_PATTERN: &str = "collection:*";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PubSubChannel {
    /// Changes to documents of one collection
    Collection(String),
    /// Any other channel name
    Custom(String),
}

impl PubSubChannel {
    #[must_use]
    pub fn collection(name: impl Into<String>) -> Self {
        Self::Collection(name.into())
    }

    /// Redis channel name
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Collection(name) => format!("{COLLECTION_CHANNEL_PREFIX}{name}"),
            Self::Custom(name) => name.clone(),
        }
    }

    /// Parse a Redis channel name
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.strip_prefix(COLLECTION_CHANNEL_PREFIX) {
            Some(collection) if !collection.is_empty() => Self::Collection(collection.to_string()),
            _ => Self::Custom(name.to_string()),
        }
    }
}
