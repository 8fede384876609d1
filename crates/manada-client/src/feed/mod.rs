//! Live, paginated feed reader

mod reader;
mod state;

pub use reader::{FeedReader, FeedSubscription};
pub use state::{FeedState, FeedStatus};
