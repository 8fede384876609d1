//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in manada-core.

mod ad;
mod batch;
mod document;
mod error;
mod marker;
mod moment;
mod notification;

pub use ad::PgAdRepository;
pub use document::PgDocumentRepository;
pub use marker::PgMarkerRepository;
pub use moment::PgMomentRepository;
pub use notification::PgNotificationRepository;
