//! Persistence seam used by the error store.

use order_guard_core::PersistedSnapshot;

use crate::error::StorageError;

/// Named slots holding one snapshot each.
///
/// The store reads its slot once on construction and overwrites it whenever
/// a persisted index changes, so implementations only need whole-value load
/// and save.
pub trait SnapshotStore: Send + Sync {
    /// Load the snapshot in `slot`, `None` if nothing was ever saved there.
    fn load(&self, slot: &str) -> Result<Option<PersistedSnapshot>, StorageError>;

    /// Replace the snapshot in `slot`.
    fn save(&self, slot: &str, snapshot: &PersistedSnapshot) -> Result<(), StorageError>;

    /// Drop the slot entirely. Returns whether it existed.
    fn remove(&self, slot: &str) -> Result<bool, StorageError>;

    /// Move the raw payload of `slot` to `target` without decoding it,
    /// replacing whatever `target` held. Returns whether `slot` existed.
    fn set_aside(&self, slot: &str, target: &str) -> Result<bool, StorageError>;
}
