//! Route handlers
//!
//! All HTTP request handlers organized by domain.

pub mod ads;
pub mod analytics;
pub mod comments;
pub mod health;
pub mod moments;
pub mod notifications;
pub mod posts;
pub mod reactions;
