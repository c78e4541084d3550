use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use chrono::{Duration, TimeZone as _, Utc};
use order_guard_core::{Clock as _, ErrorKind, ManualClock, RetryDecision};
use order_guard_storage::{InMemorySnapshotStore, SnapshotStore, SqliteSnapshotStore};

use super::ErrorStore;
use crate::{ErrorStoreConfig, ServiceError};

struct Harness {
    store: ErrorStore,
    snapshots: Arc<InMemorySnapshotStore>,
    clock: Arc<ManualClock>,
}

impl Harness {
    #[expect(clippy::unwrap_used, reason = "test code")]
    fn new() -> Self {
        let snapshots = Arc::new(InMemorySnapshotStore::new());
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap()));
        let store = ErrorStore::open_with_clock(
            snapshots.clone(),
            ErrorStoreConfig::default(),
            clock.clone(),
        )
        .unwrap();
        Self { store, snapshots, clock }
    }

    /// A fresh process on the same durable slot and clock.
    #[expect(clippy::unwrap_used, reason = "test code")]
    fn restart(&self) -> ErrorStore {
        ErrorStore::open_with_clock(
            self.snapshots.clone(),
            ErrorStoreConfig::default(),
            self.clock.clone(),
        )
        .unwrap()
    }

    #[expect(clippy::unwrap_used, reason = "test code")]
    fn add(&mut self, order_id: &str, kind: ErrorKind) -> String {
        self.store.add_error(order_id, &format!("{kind} while updating"), kind, "admin-1", None).unwrap()
    }
}

#[test]
fn ids_are_unique_for_identical_same_instant_calls() {
    let mut h = Harness::new();

    let ids: HashSet<String> = (0..300).map(|_| h.add("ORD-1", ErrorKind::Timeout)).collect();

    assert_eq!(ids.len(), 300);
}

#[test]
fn persistent_index_holds_only_conflict_and_auth() {
    let mut h = Harness::new();

    for kind in ErrorKind::ALL_VARIANTS {
        let id = h.add("ORD-1", *kind);
        assert_eq!(h.store.is_persistent(&id), kind.is_persistent(), "kind {kind}");
    }
    assert_eq!(h.store.persistent_errors().len(), 2);
}

#[test]
fn new_errors_start_unresolved_with_no_retries() {
    let mut h = Harness::new();
    let id = h
        .store
        .add_error("ORD-1", "jwt expired", ErrorKind::Auth, "admin-9", Some("refund approval"))
        .unwrap();

    let rec = h.store.get_error(&id).unwrap();
    assert_eq!(rec.order_id, "ORD-1");
    assert_eq!(rec.message, "jwt expired");
    assert_eq!(rec.actor_id, "admin-9");
    assert_eq!(rec.context.as_deref(), Some("refund approval"));
    assert_eq!(rec.created_at, h.clock.now());
    assert_eq!(rec.retry_count, 0);
    assert!(!rec.resolved);
}

#[test]
fn resolve_is_idempotent() {
    let mut h = Harness::new();
    let id = h.add("ORD-1", ErrorKind::Conflict);

    assert!(h.store.resolve_error(&id).unwrap());
    let after_first = (h.store.errors().to_vec(), h.store.persistent_errors());

    assert!(!h.store.resolve_error(&id).unwrap());
    let after_second = (h.store.errors().to_vec(), h.store.persistent_errors());

    assert_eq!(after_first, after_second);
    assert!(h.store.get_error(&id).unwrap().resolved);
    assert!(!h.store.is_persistent(&id));
}

#[test]
fn resolving_unknown_id_is_a_no_op() {
    let mut h = Harness::new();
    h.add("ORD-1", ErrorKind::Auth);
    let before = h.store.stats();

    assert!(!h.store.resolve_error("ORD-404-0-000000000000").unwrap());

    assert_eq!(h.store.stats(), before);
}

#[test]
fn resolve_removes_restored_persistent_entry_without_list_record() {
    let mut h = Harness::new();
    let id = h.add("ORD-1", ErrorKind::Conflict);
    let mut restarted = h.restart();
    assert!(restarted.errors().is_empty());
    assert!(restarted.is_persistent(&id));

    // given: the record only exists in the restored persistent index
    // when: resolved after the restart
    assert!(restarted.resolve_error(&id).unwrap());

    // then: the index entry is gone and the slot reflects it
    assert!(restarted.persistent_errors().is_empty());
    assert!(h.restart().persistent_errors().is_empty());
}

#[test]
fn blank_identifiers_are_rejected() {
    let mut h = Harness::new();

    let cases = [
        h.store.add_error("", "boom", ErrorKind::Server, "admin-1", None),
        h.store.add_error("ORD-1", "  ", ErrorKind::Server, "admin-1", None),
        h.store.add_error("ORD-1", "boom", ErrorKind::Server, "", None),
    ];
    for result in cases {
        let err = result.unwrap_err();
        assert!(err.is_invalid_input(), "unexpected error: {err}");
    }
    assert!(matches!(h.store.resolve_error(" "), Err(ServiceError::InvalidInput(_))));
    assert!(matches!(h.store.increment_retry_count(""), Err(ServiceError::InvalidInput(_))));
    assert!(h.store.errors().is_empty());
    assert!(h.store.patterns().is_empty());
}

#[test]
fn unrecognized_kind_text_is_rejected() {
    let mut h = Harness::new();

    let err = h.store.add_error_str("ORD-1", "boom", "database", "admin-1", None).unwrap_err();
    assert!(err.is_invalid_input());

    let id = h.store.add_error_str("ORD-1", "boom", "Timeout", "admin-1", None).unwrap();
    assert_eq!(h.store.get_error(&id).unwrap().kind, ErrorKind::Timeout);
}

#[test]
fn retry_count_increments_by_one_and_ignores_unknown_ids() {
    let mut h = Harness::new();
    let id = h.add("ORD-1", ErrorKind::Network);

    assert_eq!(h.store.increment_retry_count(&id).unwrap(), Some(1));
    assert_eq!(h.store.increment_retry_count(&id).unwrap(), Some(2));
    assert_eq!(h.store.increment_retry_count("missing").unwrap(), None);
    assert_eq!(h.store.get_error(&id).unwrap().retry_count, 2);
}

#[test]
fn patterns_accumulate_per_kind_and_order() {
    let mut h = Harness::new();
    for _ in 0..3 {
        h.add("O1", ErrorKind::Timeout);
        h.clock.advance(Duration::minutes(1));
    }
    h.add("O2", ErrorKind::Timeout);

    let o1 = h.store.pattern(ErrorKind::Timeout, "O1").unwrap();
    assert_eq!(o1.kind, ErrorKind::Timeout);
    assert_eq!(o1.count, 3);
    assert_eq!(o1.affected_orders, BTreeSet::from(["O1".to_owned()]));

    let o2 = h.store.pattern(ErrorKind::Timeout, "O2").unwrap();
    assert_eq!(o2.count, 1);
    assert_eq!(h.store.patterns().len(), 2);

    let detected = h.store.detect_patterns();
    assert_eq!(detected, vec![o1]);
}

#[test]
fn patterns_are_not_decremented_by_resolution_or_clearing() {
    let mut h = Harness::new();
    let ids: Vec<String> = (0..3).map(|_| h.add("O1", ErrorKind::Server)).collect();
    for id in &ids {
        h.store.resolve_error(id).unwrap();
    }
    h.store.clear_resolved_errors();

    assert_eq!(h.store.pattern(ErrorKind::Server, "O1").unwrap().count, 3);
    assert_eq!(h.store.detect_patterns().len(), 1);
}

#[test]
fn stale_patterns_drop_out_of_detection() {
    let mut h = Harness::new();
    for _ in 0..5 {
        h.add("O1", ErrorKind::Network);
    }
    assert_eq!(h.store.detect_patterns().len(), 1);

    h.clock.advance(Duration::minutes(61));

    assert!(h.store.detect_patterns().is_empty());
    assert_eq!(h.store.pattern(ErrorKind::Network, "O1").unwrap().count, 5);
}

#[test]
fn retry_kind_gate() {
    let mut h = Harness::new();
    assert!(!h.store.should_auto_retry("ORD-7", ErrorKind::Conflict));
    assert!(h.store.should_auto_retry("ORD-7", ErrorKind::Network));

    h.add("ORD-7", ErrorKind::Network);
    h.add("ORD-7", ErrorKind::Network);

    assert!(h.store.should_auto_retry("ORD-7", ErrorKind::Network));
    assert!(h.store.should_auto_retry("ORD-7", ErrorKind::Timeout));
    for kind in [ErrorKind::Auth, ErrorKind::Server, ErrorKind::Unknown] {
        assert_eq!(
            h.store.retry_decision("ORD-7", kind),
            RetryDecision::RequiresIntervention { kind }
        );
    }
}

#[test]
fn retry_volume_gate_overrides_kind() {
    let mut h = Harness::new();
    h.add("O2", ErrorKind::Server);
    h.clock.advance(Duration::minutes(2));
    h.add("O2", ErrorKind::Auth);
    h.clock.advance(Duration::minutes(2));
    h.add("O2", ErrorKind::Network);

    assert!(!h.store.should_auto_retry("O2", ErrorKind::Network));
    assert_eq!(
        h.store.retry_decision("O2", ErrorKind::Network),
        RetryDecision::SuppressedByVolume { recent_failures: 3 }
    );

    // the first failure leaves the five-minute window
    h.clock.advance(Duration::minutes(1) + Duration::seconds(1));
    assert!(h.store.should_auto_retry("O2", ErrorKind::Network));
}

#[test]
fn policy_queries_do_not_mutate() {
    let mut h = Harness::new();
    for _ in 0..4 {
        h.add("O1", ErrorKind::Timeout);
    }
    let before = (h.store.errors().to_vec(), h.store.persistent_errors(), h.store.patterns());
    let slot_before = h.snapshots.raw(&h.store.config().slot).unwrap();

    let _ = h.store.detect_patterns();
    let _ = h.store.should_auto_retry("O1", ErrorKind::Timeout);
    let _ = h.store.retry_decision("O1", ErrorKind::Network);

    let after = (h.store.errors().to_vec(), h.store.persistent_errors(), h.store.patterns());
    assert_eq!(before, after);
    assert_eq!(h.snapshots.raw(&h.store.config().slot).unwrap(), slot_before);
}

#[test]
fn clear_resolved_keeps_unresolved_and_indices() {
    let mut h = Harness::new();
    let conflict = h.add("O1", ErrorKind::Conflict);
    let network = h.add("O1", ErrorKind::Network);
    let auth = h.add("O2", ErrorKind::Auth);
    h.store.resolve_error(&network).unwrap();
    let persistent_before = h.store.persistent_errors();
    let patterns_before = h.store.patterns();

    assert_eq!(h.store.clear_resolved_errors(), 1);

    let remaining: Vec<String> = h.store.errors().iter().map(|r| r.id.clone()).collect();
    assert_eq!(remaining, vec![conflict, auth]);
    assert_eq!(h.store.persistent_errors(), persistent_before);
    assert_eq!(h.store.patterns(), patterns_before);
}

#[test]
fn clear_all_empties_everything_and_exits_recovery_mode() {
    let mut h = Harness::new();
    h.add("O1", ErrorKind::Conflict);
    h.add("O1", ErrorKind::Timeout);
    h.store.enable_recovery_mode();

    h.store.clear_all_errors();

    assert!(h.store.errors().is_empty());
    assert!(h.store.persistent_errors().is_empty());
    assert!(h.store.patterns().is_empty());
    assert!(!h.store.is_recovery_mode());

    let restarted = h.restart();
    assert!(restarted.persistent_errors().is_empty());
    assert!(restarted.patterns().is_empty());
}

#[test]
fn recovery_mode_toggles_without_touching_data() {
    let mut h = Harness::new();
    h.add("O1", ErrorKind::Conflict);
    let before = h.store.stats();

    h.store.enable_recovery_mode();
    assert!(h.store.is_recovery_mode());
    h.store.enable_recovery_mode();
    assert!(h.store.is_recovery_mode());
    h.store.disable_recovery_mode();
    assert!(!h.store.is_recovery_mode());

    assert_eq!(h.store.stats(), before);
}

#[test]
fn errors_for_order_and_unresolved_keep_insertion_order() {
    let mut h = Harness::new();
    let a1 = h.add("A", ErrorKind::Network);
    let b1 = h.add("B", ErrorKind::Network);
    let a2 = h.add("A", ErrorKind::Server);
    let a3 = h.add("A", ErrorKind::Conflict);
    h.store.resolve_error(&a2).unwrap();

    let for_a: Vec<String> = h.store.get_errors_for_order("A").into_iter().map(|r| r.id).collect();
    assert_eq!(for_a, vec![a1.clone(), a2, a3.clone()]);

    let unresolved: Vec<String> =
        h.store.get_unresolved_errors().into_iter().map(|r| r.id).collect();
    assert_eq!(unresolved, vec![a1, b1, a3]);
}

#[test]
fn restart_restores_indices_but_not_list_or_recovery_mode() {
    let mut h = Harness::new();
    h.add("O1", ErrorKind::Conflict);
    h.add("O1", ErrorKind::Auth);
    for _ in 0..3 {
        h.add("O2", ErrorKind::Timeout);
    }
    h.store.enable_recovery_mode();

    let restarted = h.restart();

    assert_eq!(restarted.persistent_errors(), h.store.persistent_errors());
    assert_eq!(restarted.patterns(), h.store.patterns());
    assert_eq!(restarted.detect_patterns(), h.store.detect_patterns());
    assert!(restarted.errors().is_empty());
    assert!(!restarted.is_recovery_mode());
}

#[test]
fn persistent_copy_keeps_insertion_time_retry_count() {
    let mut h = Harness::new();
    let id = h.add("O1", ErrorKind::Conflict);

    h.store.increment_retry_count(&id).unwrap();

    assert_eq!(h.store.get_error(&id).unwrap().retry_count, 1);
    let persisted = h.store.persistent_errors();
    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted[0].retry_count, 0);
}

#[test]
fn unreadable_snapshot_is_set_aside_before_overwrite() {
    let h = Harness::new();
    let slot = h.store.config().slot.clone();
    let garbage = "{\"version\": 1, \"error_patterns\": 7}";
    h.snapshots.put_raw(&slot, garbage).unwrap();

    let mut restarted = h.restart();
    assert!(restarted.persistent_errors().is_empty());
    assert!(restarted.patterns().is_empty());

    restarted.add_error("O1", "lock timeout", ErrorKind::Conflict, "admin-1", None).unwrap();
    let snapshot = h.snapshots.load(&slot).unwrap().unwrap();
    assert_eq!(snapshot.persistent_errors.len(), 1);
    assert_eq!(h.snapshots.raw(&format!("{slot}.rejected")).unwrap().as_deref(), Some(garbage));
}

#[test]
fn newer_snapshot_survives_mutation_by_older_build() {
    let h = Harness::new();
    let slot = h.store.config().slot.clone();
    let newer = r#"{"version":2,"persistent_errors":[],"error_patterns":[],"escalations":["keep me"]}"#;

    // given: a slot written by a build with a newer snapshot layout
    h.snapshots.put_raw(&slot, newer).unwrap();

    // when: this build opens it and records a failure
    let mut restarted = h.restart();
    restarted.add_error("O1", "connection reset", ErrorKind::Network, "admin-1", None).unwrap();

    // then: the newer payload is still recoverable byte for byte
    assert_eq!(h.snapshots.raw(&format!("{slot}.rejected")).unwrap().as_deref(), Some(newer));
    let current = h.snapshots.load(&slot).unwrap().unwrap();
    assert_eq!(current.error_patterns.len(), 1);
}

#[test]
fn list_only_mutations_do_not_rewrite_slot() {
    let mut h = Harness::new();
    let slot = h.store.config().slot.clone();
    let network = h.add("O1", ErrorKind::Network);
    h.snapshots.remove(&slot).unwrap();

    assert_eq!(h.store.increment_retry_count("missing").unwrap(), None);
    assert_eq!(h.store.increment_retry_count(&network).unwrap(), Some(1));
    assert!(!h.store.resolve_error("missing").unwrap());
    assert!(h.store.resolve_error(&network).unwrap());
    assert_eq!(h.store.clear_resolved_errors(), 1);

    assert!(h.snapshots.raw(&slot).unwrap().is_none());
}

#[test]
fn resolving_persistent_error_rewrites_slot() {
    let mut h = Harness::new();
    let slot = h.store.config().slot.clone();
    let conflict = h.add("O1", ErrorKind::Conflict);
    h.snapshots.remove(&slot).unwrap();

    assert!(h.store.resolve_error(&conflict).unwrap());

    let snapshot = h.snapshots.load(&slot).unwrap().unwrap();
    assert!(snapshot.persistent_errors.is_empty());
    assert_eq!(snapshot.error_patterns.len(), 1);
}

#[test]
fn separate_slots_do_not_share_state() {
    let h = Harness::new();
    let mut tenant_a = ErrorStore::open_with_clock(
        h.snapshots.clone(),
        ErrorStoreConfig::with_slot("tenant-a/errors"),
        h.clock.clone(),
    )
    .unwrap();
    tenant_a.add_error("O1", "forbidden", ErrorKind::Auth, "admin-1", None).unwrap();

    let tenant_b = ErrorStore::open_with_clock(
        h.snapshots.clone(),
        ErrorStoreConfig::with_slot("tenant-b/errors"),
        h.clock.clone(),
    )
    .unwrap();
    assert!(tenant_b.persistent_errors().is_empty());
    assert!(h.restart().persistent_errors().is_empty());
}

#[test]
fn stats_count_by_resolution_and_kind() {
    let mut h = Harness::new();
    let first = h.add("O1", ErrorKind::Conflict);
    h.add("O1", ErrorKind::Conflict);
    h.add("O2", ErrorKind::Network);
    h.store.resolve_error(&first).unwrap();

    let stats = h.store.stats();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.resolved, 1);
    assert_eq!(stats.unresolved, 2);
    assert_eq!(stats.persistent, 1);
    assert_eq!(stats.patterns, 2);
    assert_eq!(stats.by_kind.get(&ErrorKind::Conflict), Some(&1));
    assert_eq!(stats.by_kind.get(&ErrorKind::Network), Some(&1));
}

#[test]
fn admin_update_scenario() {
    let mut h = Harness::new();

    let e1 = h.store.add_error("ORD-1", "timeout", ErrorKind::Timeout, "admin-1", None).unwrap();
    let e2 = h.store.add_error("ORD-1", "lock timeout", ErrorKind::Conflict, "admin-1", None).unwrap();
    assert!(h.store.is_persistent(&e2));

    h.store.resolve_error(&e2).unwrap();

    let unresolved: Vec<String> =
        h.store.get_unresolved_errors().into_iter().map(|r| r.id).collect();
    assert_eq!(unresolved, vec![e1]);
    assert!(!h.store.is_persistent(&e2));
}

#[test]
fn sqlite_backed_store_survives_restart() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let db_path = temp_dir.path().join("errors.db");

    let snapshots: Arc<dyn SnapshotStore> = Arc::new(SqliteSnapshotStore::new(&db_path).unwrap());
    let mut store = ErrorStore::open(snapshots, ErrorStoreConfig::default()).unwrap();
    let id = store.add_error("ORD-5", "forbidden", ErrorKind::Auth, "admin-2", None).unwrap();
    for _ in 0..3 {
        store.add_error("ORD-5", "gateway timeout", ErrorKind::Timeout, "admin-2", None).unwrap();
    }
    let expected_patterns = store.patterns();
    drop(store);

    let reopened: Arc<dyn SnapshotStore> = Arc::new(SqliteSnapshotStore::new(&db_path).unwrap());
    let restored = ErrorStore::open(reopened, ErrorStoreConfig::default()).unwrap();

    assert!(restored.is_persistent(&id));
    assert_eq!(restored.patterns(), expected_patterns);
    assert!(restored.errors().is_empty());
}
