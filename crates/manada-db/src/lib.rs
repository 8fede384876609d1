//! # manada-db
//!
//! Storage layer implementing the repository traits of `manada-core`.
//!
//! ## Overview
//!
//! - PostgreSQL repositories (SQLx) over a generic JSONB `documents` table plus
//!   dedicated tables for markers, notifications, ads and moments
//! - Runtime migrations from the crate's `migrations/` directory
//! - [`memory::MemoryStore`], a process-local store with the same semantics,
//!   used by tests and by `STORAGE_BACKEND=memory`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use manada_db::pool::{create_pool, run_migrations, DatabaseConfig};
//! use manada_db::repositories::PgDocumentRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::from_env()).await?;
//!     run_migrations(&pool).await?;
//!     let documents = PgDocumentRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::{MemoryChangeBus, MemoryStore};
pub use pool::{create_pool, create_pool_from_env, run_migrations, DatabaseConfig, PgPool};
pub use repositories::{
    PgAdRepository, PgDocumentRepository, PgMarkerRepository, PgMomentRepository,
    PgNotificationRepository,
};
