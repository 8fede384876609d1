//! Counter-with-marker mutation: the toggle decision and its atomic write batch

mod batch;
mod decision;

pub use batch::{WriteBatch, WriteOp};
pub use decision::{ToggleDecision, ToggleIntent, ToggleOutcome};
