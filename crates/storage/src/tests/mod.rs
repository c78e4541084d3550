//! Test utilities and module declarations for storage tests.

use std::collections::BTreeMap;

use chrono::Utc;
use order_guard_core::{ErrorKind, ErrorPattern, ErrorRecord, PatternKey, PersistedSnapshot};
use tempfile::TempDir;

use crate::SqliteSnapshotStore;

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_test_store() -> (SqliteSnapshotStore, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let store = SqliteSnapshotStore::new(&db_path).unwrap();
    (store, temp_dir)
}

pub fn create_test_snapshot(order_id: &str) -> PersistedSnapshot {
    let now = Utc::now();
    let record = ErrorRecord::new(
        format!("{order_id}-{}-0123456789ab", now.timestamp_millis()),
        order_id.to_owned(),
        "row version mismatch".to_owned(),
        now,
        ErrorKind::Conflict,
        "admin-1".to_owned(),
        Some("status -> dispatched".to_owned()),
    );
    let mut pattern = ErrorPattern::first(ErrorKind::Conflict, order_id, now);
    pattern.record(order_id, now);

    let persistent = BTreeMap::from([(record.id.clone(), record)]);
    let patterns = BTreeMap::from([(PatternKey::new(ErrorKind::Conflict, order_id), pattern)]);
    PersistedSnapshot::from_indices(&persistent, &patterns)
}
