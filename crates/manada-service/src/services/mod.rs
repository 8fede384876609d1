//! Business logic services
//!
//! Each service borrows the [`ServiceContext`] for the duration of a call and
//! orchestrates repositories, change publication and side effects.

pub mod ad;
pub mod analytics;
pub mod comment;
pub mod context;
pub mod error;
pub mod feed;
pub mod moment;
pub mod notification;
pub mod reaction;

// Re-export all services for convenience
pub use ad::AdService;
pub use analytics::{AnalyticsService, AnalyticsStore};
pub use comment::CommentService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use feed::FeedService;
pub use moment::{spawn_moment_sweeper, MomentService};
pub use notification::NotificationService;
pub use reaction::{ReactionPlan, ReactionService};
