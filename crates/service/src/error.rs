//! Typed error enum for the service layer.
//!
//! Unifies storage and domain failures so callers can tell a rejected input
//! apart from a persistence problem without downcasting.

use order_guard_core::CoreError;
use order_guard_storage::StorageError;
use thiserror::Error;

/// Service-layer error unifying storage and domain failures.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Snapshot backend failed (DB, pool, corrupted slot).
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// Domain value could not be parsed or built.
    #[error("core: {0}")]
    Core(#[from] CoreError),

    /// Caller provided invalid input (blank identifier, empty message).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The shared store's lock was poisoned by a panicking caller.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

impl ServiceError {
    /// Whether this error is likely transient (worth retrying).
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Storage(e) if e.is_transient())
    }

    /// Whether the caller passed something malformed.
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::Core(CoreError::InvalidErrorKind(_)))
    }
}
