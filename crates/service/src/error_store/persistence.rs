use order_guard_core::PersistedSnapshot;
use order_guard_core::constants::REJECTED_SLOT_SUFFIX;

use super::ErrorStore;
use crate::error::ServiceError;

impl ErrorStore {
    /// Load both indices from the configured slot.
    ///
    /// A missing slot starts empty. An undecodable slot, including one
    /// written by a newer snapshot version, is moved verbatim to
    /// `{slot}.rejected` and the store starts empty. If it cannot be moved
    /// the open fails, so no later write can destroy it. Backend failures
    /// propagate.
    pub(super) fn hydrate(&mut self) -> Result<(), ServiceError> {
        let snapshot = match self.snapshots.load(&self.config.slot) {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                tracing::info!(slot = %self.config.slot, "No persisted order errors, starting empty");
                return Ok(());
            },
            Err(e) if e.is_corruption() => {
                let rejected = format!("{}{REJECTED_SLOT_SUFFIX}", self.config.slot);
                self.snapshots.set_aside(&self.config.slot, &rejected)?;
                tracing::warn!(
                    slot = %self.config.slot,
                    rejected_slot = %rejected,
                    error = %e,
                    "Set aside unreadable error snapshot, starting empty"
                );
                return Ok(());
            },
            Err(e) => return Err(e.into()),
        };

        let (persistent, patterns) = snapshot.into_indices();
        self.persistent = persistent;
        self.patterns = patterns;

        tracing::info!(
            slot = %self.config.slot,
            persistent = self.persistent.len(),
            patterns = self.patterns.len(),
            "Restored persisted order errors"
        );
        Ok(())
    }

    /// Snapshot of exactly what survives a restart.
    #[must_use]
    pub fn snapshot(&self) -> PersistedSnapshot {
        PersistedSnapshot::from_indices(&self.persistent, &self.patterns)
    }

    /// Write both indices to the slot now, surfacing any storage error.
    pub fn persist(&self) -> Result<(), ServiceError> {
        self.snapshots.save(&self.config.slot, &self.snapshot())?;
        Ok(())
    }

    /// Mutations never fail on persistence: the in-memory state stays
    /// authoritative and the next write of a changed index catches the slot up.
    pub(super) fn persist_or_warn(&self) {
        if let Err(e) = self.persist() {
            tracing::warn!(slot = %self.config.slot, error = %e, "Failed to persist order errors");
        }
    }
}
