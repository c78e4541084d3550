//! Unified snapshot backend with enum dispatch.

#[cfg(feature = "sqlite")]
use std::path::Path;

use order_guard_core::PersistedSnapshot;

use crate::error::StorageError;
use crate::memory::InMemorySnapshotStore;
use crate::traits::SnapshotStore;

macro_rules! dispatch {
    ($self:expr, $method:ident ( $($arg:expr),* $(,)? )) => {
        match $self {
            SnapshotBackend::Memory(s) => <InMemorySnapshotStore as SnapshotStore>::$method(s, $($arg),*),
            #[cfg(feature = "sqlite")]
            SnapshotBackend::Sqlite(s) => <crate::SqliteSnapshotStore as SnapshotStore>::$method(s, $($arg),*),
        }
    };
}

#[derive(Debug)]
pub enum SnapshotBackend {
    Memory(InMemorySnapshotStore),
    #[cfg(feature = "sqlite")]
    Sqlite(crate::SqliteSnapshotStore),
}

impl SnapshotBackend {
    #[must_use]
    pub fn new_memory() -> Self {
        Self::Memory(InMemorySnapshotStore::new())
    }

    #[cfg(feature = "sqlite")]
    pub fn new_sqlite(db_path: &Path) -> Result<Self, StorageError> {
        Ok(Self::Sqlite(crate::SqliteSnapshotStore::new(db_path)?))
    }

    /// `SQLite` backend configured from `ORDER_GUARD_DB_*` variables.
    #[cfg(feature = "sqlite")]
    pub fn from_env() -> Result<Self, StorageError> {
        Ok(Self::Sqlite(crate::SqliteSnapshotStore::open(&crate::SqliteConfig::from_env())?))
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match *self {
            Self::Memory(_) => "memory",
            #[cfg(feature = "sqlite")]
            Self::Sqlite(_) => "sqlite",
        }
    }
}

impl SnapshotStore for SnapshotBackend {
    fn load(&self, slot: &str) -> Result<Option<PersistedSnapshot>, StorageError> {
        dispatch!(self, load(slot))
    }

    fn save(&self, slot: &str, snapshot: &PersistedSnapshot) -> Result<(), StorageError> {
        dispatch!(self, save(slot, snapshot))
    }

    fn remove(&self, slot: &str) -> Result<bool, StorageError> {
        dispatch!(self, remove(slot))
    }

    fn set_aside(&self, slot: &str, target: &str) -> Result<bool, StorageError> {
        dispatch!(self, set_aside(slot, target))
    }
}
