//! Optimistic counter-with-marker toggles

mod controller;
mod identity;

pub use controller::OptimisticToggle;
pub use identity::Identity;
