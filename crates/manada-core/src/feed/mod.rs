//! Feed queries over document collections

mod query;
mod sponsored;

pub use query::{compare_values, FeedCursor, FeedQuery, FieldFilter, FilterOp, SortDirection};
pub use sponsored::{last_organic, splice_sponsored, FeedEntry, DEFAULT_SPONSORED_POSITION};
