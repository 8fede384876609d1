//! Collection names of the document store

use super::DocId;

pub const POSTS: &str = "posts";
pub const COMMENTS: &str = "comments";
pub const USERS: &str = "users";
pub const CIRCLES: &str = "circles";
pub const CIRCLE_MEMBERS: &str = "circleMembers";
pub const MARKETPLACE_ITEMS: &str = "marketplaceItems";
pub const MOMENTS: &str = "moments";
pub const SHORTS_VIDEOS: &str = "manadashorts_videos";
pub const SHORTS_LIKES: &str = "manadashorts_likes";
pub const SHORTS_FOLLOWS: &str = "manadashorts_follows";
pub const SHORTS_COMMENTS: &str = "manadashorts_comments";
pub const ADS: &str = "ads";
pub const SPONSORED_CONTENT: &str = "sponsoredContent";
pub const SPONSORED_POSTS: &str = "sponsoredPosts";
pub const CONVERSATIONS: &str = "conversations";
pub const MESSAGES: &str = "messages";
pub const LIKES: &str = "likes";
pub const REACTIONS: &str = "reactions";
pub const COMMENT_LIKES: &str = "comment_likes";
pub const FAVORITES: &str = "favorites";

// Per-user subcollections
pub const PETS: &str = "pets";
pub const BADGES: &str = "badges";
pub const NOTIFICATIONS: &str = "notifications";
pub const FEED: &str = "feed";

/// Full path of a per-user subcollection, e.g. `users/{id}/notifications`
pub fn user_subcollection(user_id: &DocId, name: &str) -> String {
    format!("{USERS}/{user_id}/{name}")
}

/// A collection path has an odd number of non-empty segments
pub fn is_valid_path(path: &str) -> bool {
    let segments: Vec<&str> = path.split('/').collect();
    segments.len() % 2 == 1 && segments.iter().all(|s| !s.is_empty())
}
