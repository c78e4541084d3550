mod persistence;
mod recovery;
#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::sync::Arc;

use order_guard_core::{
    Clock, ErrorKind, ErrorPattern, ErrorRecord, PatternKey, SystemClock, generate_error_id,
};
use order_guard_storage::SnapshotStore;
use serde::{Deserialize, Serialize};

use crate::config::ErrorStoreConfig;
use crate::error::ServiceError;

/// Bookkeeping of admin order-update failures.
///
/// Holds the primary error list, the persistent-error index (conflict and
/// auth failures awaiting a human) and the per-(kind, order) pattern index.
/// The two indices are hydrated from the snapshot slot on open and written
/// back by every mutation that changes them; the primary list and recovery
/// mode are process-local.
pub struct ErrorStore {
    records: Vec<ErrorRecord>,
    persistent: BTreeMap<String, ErrorRecord>,
    patterns: BTreeMap<PatternKey, ErrorPattern>,
    recovery_mode: bool,
    snapshots: Arc<dyn SnapshotStore>,
    clock: Arc<dyn Clock>,
    config: ErrorStoreConfig,
}

/// Point-in-time counts for an admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ErrorStats {
    /// Records in the primary list.
    pub total: usize,
    /// Records not yet resolved.
    pub unresolved: usize,
    /// Records resolved but not yet cleared.
    pub resolved: usize,
    /// Entries in the persistent-error index.
    pub persistent: usize,
    /// Distinct (kind, order) pattern keys.
    pub patterns: usize,
    /// Unresolved records per kind.
    pub by_kind: BTreeMap<ErrorKind, usize>,
}

fn require_non_blank(value: &str, field: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::InvalidInput(format!("{field} must not be blank")));
    }
    Ok(())
}

impl ErrorStore {
    /// Open a store on the wall clock, hydrating from `config.slot`.
    pub fn open(
        snapshots: Arc<dyn SnapshotStore>,
        config: ErrorStoreConfig,
    ) -> Result<Self, ServiceError> {
        Self::open_with_clock(snapshots, config, Arc::new(SystemClock))
    }

    pub fn open_with_clock(
        snapshots: Arc<dyn SnapshotStore>,
        config: ErrorStoreConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ServiceError> {
        require_non_blank(&config.slot, "snapshot slot")?;
        let mut store = Self {
            records: Vec::new(),
            persistent: BTreeMap::new(),
            patterns: BTreeMap::new(),
            recovery_mode: false,
            snapshots,
            clock,
            config,
        };
        store.hydrate()?;
        Ok(store)
    }

    /// Record a failure and return its id.
    ///
    /// Conflict and auth failures also enter the persistent-error index.
    /// Every failure bumps the pattern for its (kind, order) pair.
    pub fn add_error(
        &mut self,
        order_id: &str,
        message: &str,
        kind: ErrorKind,
        actor_id: &str,
        context: Option<&str>,
    ) -> Result<String, ServiceError> {
        require_non_blank(order_id, "order id")?;
        require_non_blank(message, "error message")?;
        require_non_blank(actor_id, "actor id")?;

        let now = self.clock.now();
        let id = self.unique_id(order_id, now);
        let record = ErrorRecord::new(
            id.clone(),
            order_id.to_owned(),
            message.to_owned(),
            now,
            kind,
            actor_id.to_owned(),
            context.map(str::to_owned),
        );

        if kind.is_persistent() {
            self.persistent.insert(id.clone(), record.clone());
        }
        self.records.push(record);
        self.patterns
            .entry(PatternKey::new(kind, order_id))
            .and_modify(|p| p.record(order_id, now))
            .or_insert_with(|| ErrorPattern::first(kind, order_id, now));

        tracing::debug!(id = %id, order_id, kind = %kind, actor_id, "Recorded order update error");
        self.persist_or_warn();
        Ok(id)
    }

    /// Same as [`Self::add_error`] with the kind given as text.
    pub fn add_error_str(
        &mut self,
        order_id: &str,
        message: &str,
        kind: &str,
        actor_id: &str,
        context: Option<&str>,
    ) -> Result<String, ServiceError> {
        let kind: ErrorKind = kind.parse()?;
        self.add_error(order_id, message, kind, actor_id, context)
    }

    /// Mark an error resolved and drop it from the persistent index.
    ///
    /// Unknown and already-resolved ids are a no-op. Returns whether anything changed.
    pub fn resolve_error(&mut self, id: &str) -> Result<bool, ServiceError> {
        require_non_blank(id, "error id")?;

        let mut marked = false;
        if let Some(record) = self.records.iter_mut().find(|r| r.id == id) {
            if !record.resolved {
                record.resolved = true;
                marked = true;
            }
        }
        let unindexed = self.persistent.remove(id).is_some();

        tracing::debug!(id, marked, unindexed, "Resolved order update error");
        if unindexed {
            self.persist_or_warn();
        }
        Ok(marked || unindexed)
    }

    /// Bump the retry counter of an error. Returns the new count, `None` if the id is unknown.
    ///
    /// Only the primary list carries retry counts, so the slot is not rewritten.
    pub fn increment_retry_count(&mut self, id: &str) -> Result<Option<u32>, ServiceError> {
        require_non_blank(id, "error id")?;

        let retry_count = self.records.iter_mut().find(|r| r.id == id).map(|record| {
            record.retry_count = record.retry_count.saturating_add(1);
            record.retry_count
        });

        if let Some(count) = retry_count {
            tracing::debug!(id, retry_count = count, "Incremented retry count");
        }
        Ok(retry_count)
    }

    /// Drop resolved records from the primary list. Both indices, and so the slot, are untouched.
    pub fn clear_resolved_errors(&mut self) -> usize {
        let before = self.records.len();
        self.records.retain(|r| !r.resolved);
        let removed = before - self.records.len();

        tracing::debug!(removed, "Cleared resolved order update errors");
        removed
    }

    /// Reset the primary list, both indices and recovery mode.
    pub fn clear_all_errors(&mut self) {
        self.records.clear();
        self.persistent.clear();
        self.patterns.clear();
        self.recovery_mode = false;

        tracing::info!(slot = %self.config.slot, "Cleared all order update errors");
        self.persist_or_warn();
    }

    /// All records for `order_id`, resolved or not, in insertion order.
    #[must_use]
    pub fn get_errors_for_order(&self, order_id: &str) -> Vec<ErrorRecord> {
        self.records.iter().filter(|r| r.order_id == order_id).cloned().collect()
    }

    /// Records not yet resolved, in insertion order.
    #[must_use]
    pub fn get_unresolved_errors(&self) -> Vec<ErrorRecord> {
        self.records.iter().filter(|r| !r.resolved).cloned().collect()
    }

    #[must_use]
    pub fn get_error(&self, id: &str) -> Option<ErrorRecord> {
        self.records.iter().find(|r| r.id == id).cloned()
    }

    /// The primary list in insertion order.
    #[must_use]
    pub fn errors(&self) -> &[ErrorRecord] {
        &self.records
    }

    /// Persistent-error index entries, ordered by id.
    #[must_use]
    pub fn persistent_errors(&self) -> Vec<ErrorRecord> {
        self.persistent.values().cloned().collect()
    }

    #[must_use]
    pub fn is_persistent(&self, id: &str) -> bool {
        self.persistent.contains_key(id)
    }

    /// Every pattern, ordered by kind then order id.
    #[must_use]
    pub fn patterns(&self) -> Vec<ErrorPattern> {
        self.patterns.values().cloned().collect()
    }

    #[must_use]
    pub fn pattern(&self, kind: ErrorKind, order_id: &str) -> Option<ErrorPattern> {
        self.patterns.get(&PatternKey::new(kind, order_id)).cloned()
    }

    pub fn enable_recovery_mode(&mut self) {
        if !self.recovery_mode {
            tracing::info!("Entering order update recovery mode");
        }
        self.recovery_mode = true;
    }

    pub fn disable_recovery_mode(&mut self) {
        if self.recovery_mode {
            tracing::info!("Leaving order update recovery mode");
        }
        self.recovery_mode = false;
    }

    #[must_use]
    pub const fn is_recovery_mode(&self) -> bool {
        self.recovery_mode
    }

    #[must_use]
    pub fn stats(&self) -> ErrorStats {
        let mut stats = ErrorStats {
            total: self.records.len(),
            persistent: self.persistent.len(),
            patterns: self.patterns.len(),
            ..ErrorStats::default()
        };
        for record in &self.records {
            if record.resolved {
                stats.resolved += 1;
            } else {
                stats.unresolved += 1;
                *stats.by_kind.entry(record.kind).or_insert(0) += 1;
            }
        }
        stats
    }

    #[must_use]
    pub fn config(&self) -> &ErrorStoreConfig {
        &self.config
    }

    fn unique_id(&self, order_id: &str, at: chrono::DateTime<chrono::Utc>) -> String {
        loop {
            let id = generate_error_id(order_id, at);
            let taken =
                self.persistent.contains_key(&id) || self.records.iter().any(|r| r.id == id);
            if !taken {
                return id;
            }
            tracing::debug!(id = %id, "Regenerating colliding error id");
        }
    }
}
