//! # manada-core
//!
//! Domain layer for the Manada social app: documents, per-user reaction markers,
//! the toggle decision and its write batch, feed queries, and repository traits.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod events;
pub mod feed;
pub mod mutation;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    moment_progress, moment_time_remaining, Ad, AdAction, AdStatus, AdUpdate, AnalyticsEvent,
    Document, Moment, NotificationEvent, UserMarker, MOMENT_TTL_HOURS,
};
pub use error::DomainError;
pub use events::{ChangeEvent, ChangeKind};
pub use feed::{
    last_organic, splice_sponsored, FeedCursor, FeedEntry, FeedQuery, FieldFilter, FilterOp,
    SortDirection,
};
pub use mutation::{ToggleDecision, ToggleIntent, ToggleOutcome, WriteBatch, WriteOp};
pub use traits::{
    AdQuery, AdRepository, ChangePublisher, DocumentRepository, MarkerRepository,
    MomentRepository, NotificationRepository, RepoResult,
};
pub use value_objects::{
    collections, ConsistencyMode, DocId, DocIdParseError, ReactionKind, ReactionTarget,
};
