//! Entity <-> model mappers
//!
//! Rows are written by this crate, so a malformed id or status in a row is
//! reported as a database error rather than a validation error.

mod ad;
mod document;
mod marker;
mod moment;
mod notification;

use manada_core::{DocId, DomainError};

pub(crate) fn parse_id(raw: &str) -> Result<DocId, DomainError> {
    DocId::parse(raw).map_err(|e| DomainError::DatabaseError(format!("corrupt id '{raw}': {e}")))
}
