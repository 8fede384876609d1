//! In-process storage
//!
//! [`MemoryStore`] implements every repository trait over a single locked
//! state, and [`MemoryChangeBus`] fans change events out over a tokio
//! broadcast channel. Both back `STORAGE_BACKEND=memory` and the test suites.

mod change_bus;
mod store;

pub use change_bus::MemoryChangeBus;
pub use store::MemoryStore;
