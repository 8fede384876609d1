//! Axum extractors for request handling
//!
//! Custom extractors for authentication, validation, and pagination.

mod auth;
mod pagination;
mod path;
mod query;
mod validated;

pub use auth::{AuthUser, OptionalAuthUser};
pub use pagination::{Pagination, PaginationParams};
pub use path::{parse_doc_id, ReactionPath};
pub use query::QueryParams;
pub use validated::{OptionalValidatedJson, ValidatedJson};
