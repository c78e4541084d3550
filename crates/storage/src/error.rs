//! Typed error enum for the storage layer.
//!
//! Callers can match on specific failure modes (pool exhaustion, locked
//! database, a corrupted slot) instead of downcasting opaque boxes.

use order_guard_core::CoreError;
use thiserror::Error;

/// Storage-layer error with variants covering every expected failure mode.
#[derive(Debug, Error)]
pub enum StorageError {
    /// SQL execution failure.
    #[cfg(feature = "sqlite")]
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Could not obtain a pooled connection.
    #[cfg(feature = "sqlite")]
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Stored payload could not be decoded into a snapshot.
    #[error("data corruption: {context}")]
    DataCorruption {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A backend mutex was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),

    /// Filesystem failure preparing the database location.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Whether this error is likely transient (worth retrying).
    pub fn is_transient(&self) -> bool {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Pool(_) => true,
            #[cfg(feature = "sqlite")]
            Self::Database(e) => matches!(
                e.sqlite_error_code(),
                Some(rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked)
            ),
            _ => false,
        }
    }

    /// Whether the stored payload itself is unreadable.
    pub const fn is_corruption(&self) -> bool {
        matches!(self, Self::DataCorruption { .. })
    }

    pub(crate) fn corrupted_slot(slot: &str, err: CoreError) -> Self {
        Self::DataCorruption { context: format!("snapshot slot {slot}"), source: Box::new(err) }
    }

    pub(crate) fn unencodable(slot: &str, err: CoreError) -> Self {
        Self::DataCorruption {
            context: format!("encoding snapshot for slot {slot}"),
            source: Box::new(err),
        }
    }
}
