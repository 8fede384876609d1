//! Value objects - immutable types that represent domain concepts

pub mod collections;
mod consistency;
mod doc_id;
mod reaction_kind;
mod reaction_target;

pub use consistency::ConsistencyMode;
pub use doc_id::{DocId, DocIdParseError};
pub use reaction_kind::ReactionKind;
pub use reaction_target::ReactionTarget;
