//! Database models - SQLx-compatible structs for PostgreSQL tables

mod ad;
mod document;
mod marker;
mod moment;
mod notification;

pub use ad::AdModel;
pub use document::DocumentModel;
pub use marker::MarkerModel;
pub use moment::MomentModel;
pub use notification::NotificationModel;
