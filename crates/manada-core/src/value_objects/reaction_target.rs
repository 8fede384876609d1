//! Reaction targets - one counter-with-marker configuration per feature
//!
//! Likes, emoji reactions, favorites and badge awards all follow the same shape:
//! a counter field on a parent document plus at most one marker per
//! `(parent, user)`. A target names the collections and fields involved.

use serde::Serialize;

use super::{collections, ReactionKind};
use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ReactionTarget {
    /// Stable name used in URLs and logs
    pub name: &'static str,
    /// Collection holding the parent documents
    pub parent_collection: &'static str,
    /// Collection holding the per-user markers
    pub marker_collection: &'static str,
    /// Counter field on the parent document
    pub counter_field: &'static str,
    /// Notification type written on add, if any
    pub notification_type: Option<&'static str>,
    /// Palette targets let a user swap the marker kind without touching the counter
    pub allows_kind_change: bool,
}

impl ReactionTarget {
    pub const POST_LIKES: Self = Self {
        name: "post_likes",
        parent_collection: collections::POSTS,
        marker_collection: collections::LIKES,
        counter_field: "likesCount",
        notification_type: Some("new_like"),
        allows_kind_change: false,
    };

    pub const POST_REACTIONS: Self = Self {
        name: "post_reactions",
        parent_collection: collections::POSTS,
        marker_collection: collections::REACTIONS,
        counter_field: "reactionsCount",
        notification_type: Some("new_reaction"),
        allows_kind_change: true,
    };

    pub const COMMENT_LIKES: Self = Self {
        name: "comment_likes",
        parent_collection: collections::COMMENTS,
        marker_collection: collections::COMMENT_LIKES,
        counter_field: "likesCount",
        notification_type: Some("comment_like"),
        allows_kind_change: false,
    };

    pub const SHORT_LIKES: Self = Self {
        name: "short_likes",
        parent_collection: collections::SHORTS_VIDEOS,
        marker_collection: collections::SHORTS_LIKES,
        counter_field: "likesCount",
        notification_type: Some("short_like"),
        allows_kind_change: false,
    };

    pub const MARKETPLACE_FAVORITES: Self = Self {
        name: "marketplace_favorites",
        parent_collection: collections::MARKETPLACE_ITEMS,
        marker_collection: collections::FAVORITES,
        counter_field: "favoritesCount",
        notification_type: Some("new_favorite"),
        allows_kind_change: false,
    };

    pub const USER_BADGES: Self = Self {
        name: "user_badges",
        parent_collection: collections::USERS,
        marker_collection: collections::BADGES,
        counter_field: "badgesCount",
        notification_type: Some("badge_awarded"),
        allows_kind_change: true,
    };

    pub const ALL: [Self; 6] = [
        Self::POST_LIKES,
        Self::POST_REACTIONS,
        Self::COMMENT_LIKES,
        Self::SHORT_LIKES,
        Self::MARKETPLACE_FAVORITES,
        Self::USER_BADGES,
    ];

    /// Look up a built-in target by name
    pub fn by_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name == name)
    }

    /// Resolve the marker kind for a request.
    ///
    /// Plain toggles (likes, favorites) always use `like`; palette targets
    /// require the caller to pick a kind.
    pub fn resolve_kind(&self, requested: Option<ReactionKind>) -> Result<ReactionKind, DomainError> {
        match (self.allows_kind_change, requested) {
            (true, Some(kind)) => Ok(kind),
            (true, None) => Err(DomainError::ValidationError(format!(
                "{} requires a reaction kind",
                self.name
            ))),
            (false, None) => Ok(ReactionKind::like()),
            (false, Some(kind)) if kind.is_like() => Ok(kind),
            (false, Some(kind)) => Err(DomainError::ValidationError(format!(
                "{} does not accept kind '{kind}'",
                self.name
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name() {
        assert_eq!(
            ReactionTarget::by_name("post_likes"),
            Some(ReactionTarget::POST_LIKES)
        );
        assert_eq!(ReactionTarget::by_name("nope"), None);
    }

    #[test]
    fn test_names_unique() {
        let mut names: Vec<_> = ReactionTarget::ALL.iter().map(|t| t.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ReactionTarget::ALL.len());
    }

    #[test]
    fn test_resolve_kind() {
        let like = ReactionTarget::POST_LIKES;
        assert!(like.resolve_kind(None).unwrap().is_like());
        assert!(like
            .resolve_kind(Some(ReactionKind::parse("😍").unwrap()))
            .is_err());

        let palette = ReactionTarget::POST_REACTIONS;
        assert!(palette.resolve_kind(None).is_err());
        assert_eq!(
            palette
                .resolve_kind(Some(ReactionKind::parse("😍").unwrap()))
                .unwrap()
                .as_str(),
            "😍"
        );
    }
}
