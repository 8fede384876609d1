//! # manada-client
//!
//! Client-side state for the Manada app:
//!
//! - [`OptimisticToggle`]: applies a like/reaction/favorite locally before the
//!   write lands and restores the previous state if it fails
//! - [`FeedReader`]: a live, paginated view of a collection that re-queries on
//!   change events and splices sponsored entries into the organic list
//!
//! Both talk to the backend through small traits, with in-process
//! ([`ServiceBackend`], [`ServiceFeedSource`]) and HTTP
//! ([`HttpReactionBackend`]) implementations.

pub mod backend;
pub mod error;
pub mod feed;
pub mod toggle;

pub use backend::{
    ChangeSource, FeedSource, HttpReactionBackend, ReactionBackend, ReactionState,
    ServiceBackend, ServiceFeedSource,
};
pub use error::{ClientError, ClientResult, FeedError, ToggleError};
pub use feed::{FeedReader, FeedState, FeedStatus, FeedSubscription};
pub use toggle::{Identity, OptimisticToggle};
