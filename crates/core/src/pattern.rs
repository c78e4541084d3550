use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{PATTERN_MIN_OCCURRENCES, PATTERN_WINDOW};
use crate::error_kind::ErrorKind;

/// Key of the pattern index: one aggregate per failure kind per order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PatternKey {
    pub kind: ErrorKind,
    pub order_id: String,
}

impl PatternKey {
    #[must_use]
    pub fn new(kind: ErrorKind, order_id: impl Into<String>) -> Self {
        Self { kind, order_id: order_id.into() }
    }
}

/// Historical frequency of one kind of failure.
///
/// Never decremented on resolution: it measures how often the failure
/// happened, not how many are still open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPattern {
    pub kind: ErrorKind,
    pub count: u64,
    pub last_occurrence: DateTime<Utc>,
    pub affected_orders: BTreeSet<String>,
}

impl ErrorPattern {
    /// Pattern for the first occurrence under a key.
    #[must_use]
    pub fn first(kind: ErrorKind, order_id: &str, at: DateTime<Utc>) -> Self {
        Self {
            kind,
            count: 1,
            last_occurrence: at,
            affected_orders: BTreeSet::from([order_id.to_owned()]),
        }
    }

    /// Fold another occurrence into the aggregate.
    pub fn record(&mut self, order_id: &str, at: DateTime<Utc>) {
        self.count = self.count.saturating_add(1);
        self.last_occurrence = self.last_occurrence.max(at);
        if !self.affected_orders.contains(order_id) {
            self.affected_orders.insert(order_id.to_owned());
        }
    }

    /// Recent enough and frequent enough to surface to an operator.
    #[must_use]
    pub fn is_recurring(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.last_occurrence) < PATTERN_WINDOW
            && self.count >= PATTERN_MIN_OCCURRENCES
    }
}
