//! Recovery policy: recurring-pattern detection and auto-retry eligibility.
//!
//! Pure functions over borrowed store state with an explicit `now`, so they
//! never mutate anything and can be tested without a clock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{RETRY_SUPPRESSION_THRESHOLD, RETRY_SUPPRESSION_WINDOW};
use crate::error_kind::ErrorKind;
use crate::pattern::ErrorPattern;
use crate::record::ErrorRecord;

/// Outcome of the auto-retry policy, with the reason when retry is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum RetryDecision {
    /// Transient failure with low recent volume: retry silently.
    Retry,
    /// Too many recent failures for the order; treated as systemic.
    SuppressedByVolume { recent_failures: usize },
    /// The kind is never retried blindly.
    RequiresIntervention { kind: ErrorKind },
}

impl RetryDecision {
    #[must_use]
    pub const fn is_retry(&self) -> bool {
        matches!(*self, Self::Retry)
    }
}

/// Patterns that occurred at least three times, the latest within the last hour.
pub fn detect_patterns<'a, I>(patterns: I, now: DateTime<Utc>) -> Vec<ErrorPattern>
where
    I: IntoIterator<Item = &'a ErrorPattern>,
{
    patterns.into_iter().filter(|p| p.is_recurring(now)).cloned().collect()
}

/// Failures recorded against `order_id` in the suppression window, resolved ones included.
pub fn count_recent_failures<'a, I>(records: I, order_id: &str, now: DateTime<Utc>) -> usize
where
    I: IntoIterator<Item = &'a ErrorRecord>,
{
    records
        .into_iter()
        .filter(|r| r.order_id == order_id && r.is_within(now, RETRY_SUPPRESSION_WINDOW))
        .count()
}

/// Decide from the recent failure volume and the failure kind.
///
/// Volume wins over kind: at the threshold nothing is retried.
#[must_use]
pub const fn decide(recent_failures: usize, kind: ErrorKind) -> RetryDecision {
    if recent_failures >= RETRY_SUPPRESSION_THRESHOLD {
        return RetryDecision::SuppressedByVolume { recent_failures };
    }
    if kind.is_transient() {
        RetryDecision::Retry
    } else {
        RetryDecision::RequiresIntervention { kind }
    }
}

pub fn retry_decision<'a, I>(
    records: I,
    order_id: &str,
    kind: ErrorKind,
    now: DateTime<Utc>,
) -> RetryDecision
where
    I: IntoIterator<Item = &'a ErrorRecord>,
{
    decide(count_recent_failures(records, order_id, now), kind)
}

pub fn should_auto_retry<'a, I>(
    records: I,
    order_id: &str,
    kind: ErrorKind,
    now: DateTime<Utc>,
) -> bool
where
    I: IntoIterator<Item = &'a ErrorRecord>,
{
    retry_decision(records, order_id, kind, now).is_retry()
}
