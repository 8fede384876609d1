//! Integration test utilities for the ManadaBook API
//!
//! Spawns a real server on the in-memory backend and talks to it over HTTP.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
