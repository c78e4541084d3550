//! In-memory snapshot slots.
//!
//! Payloads are kept as encoded JSON so every load goes through the same
//! decode path as a durable backend.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use order_guard_core::PersistedSnapshot;

use crate::error::StorageError;
use crate::traits::SnapshotStore;

#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    slots: Mutex<HashMap<String, String>>,
}

fn lock_slots<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    mutex
        .lock()
        .map_err(|e: PoisonError<_>| StorageError::LockPoisoned(format!("snapshot slots: {e}")))
}

impl InMemorySnapshotStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoded payload currently held in `slot`.
    pub fn raw(&self, slot: &str) -> Result<Option<String>, StorageError> {
        Ok(lock_slots(&self.slots)?.get(slot).cloned())
    }

    /// Overwrite `slot` with an arbitrary payload, bypassing encoding.
    pub fn put_raw(&self, slot: &str, payload: impl Into<String>) -> Result<(), StorageError> {
        lock_slots(&self.slots)?.insert(slot.to_owned(), payload.into());
        Ok(())
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn load(&self, slot: &str) -> Result<Option<PersistedSnapshot>, StorageError> {
        let Some(payload) = self.raw(slot)? else {
            return Ok(None);
        };
        PersistedSnapshot::from_json(&payload)
            .map(Some)
            .map_err(|e| StorageError::corrupted_slot(slot, e))
    }

    fn save(&self, slot: &str, snapshot: &PersistedSnapshot) -> Result<(), StorageError> {
        let payload = snapshot.to_json().map_err(|e| StorageError::unencodable(slot, e))?;
        self.put_raw(slot, payload)
    }

    fn remove(&self, slot: &str) -> Result<bool, StorageError> {
        Ok(lock_slots(&self.slots)?.remove(slot).is_some())
    }

    fn set_aside(&self, slot: &str, target: &str) -> Result<bool, StorageError> {
        let mut slots = lock_slots(&self.slots)?;
        let Some(payload) = slots.remove(slot) else {
            return Ok(false);
        };
        slots.insert(target.to_owned(), payload);
        Ok(true)
    }
}
