//! Snapshot persistence for order-guard
//!
//! Durable key-value slots holding the persistent-error and pattern indices.
//! `SQLite` (r2d2 pool) for real deployments, in-memory for tests and
//! ephemeral admin sessions.

mod backend;
mod config;
mod error;
mod memory;
#[cfg(feature = "sqlite")]
mod migrations;
#[cfg(feature = "sqlite")]
mod sqlite;
#[cfg(all(test, feature = "sqlite"))]
mod tests;
mod traits;

pub use backend::SnapshotBackend;
pub use config::SqliteConfig;
pub use error::StorageError;
pub use memory::InMemorySnapshotStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteSnapshotStore;
pub use traits::SnapshotStore;
