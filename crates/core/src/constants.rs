//! Shared constants for order-guard.
//!
//! The policy windows are fixed; they are not read from the environment.

use chrono::Duration;

/// Default snapshot slot holding the persisted indices.
pub const DEFAULT_SNAPSHOT_SLOT: &str = "order-guard/admin-order-errors";

/// Patterns whose last occurrence is older than this are not surfaced.
pub const PATTERN_WINDOW: Duration = Duration::hours(1);

/// Minimum occurrences under one (kind, order) key before it counts as a pattern.
pub const PATTERN_MIN_OCCURRENCES: u64 = 3;

/// Look-back window for the retry-suppression volume check.
pub const RETRY_SUPPRESSION_WINDOW: Duration = Duration::minutes(5);

/// Recent failures for one order at which auto-retry is suppressed for every kind.
pub const RETRY_SUPPRESSION_THRESHOLD: usize = 3;

/// Length of the random hex suffix in generated error ids.
pub const ERROR_ID_SUFFIX_LEN: usize = 12;

/// Suffix of the slot an unreadable snapshot is moved to before it is overwritten.
pub const REJECTED_SLOT_SUFFIX: &str = ".rejected";
