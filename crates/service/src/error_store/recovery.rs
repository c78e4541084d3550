use order_guard_core::{ErrorKind, ErrorPattern, RetryDecision, policy};

use super::ErrorStore;

impl ErrorStore {
    /// Patterns seen at least three times with the latest within the last hour.
    #[must_use]
    pub fn detect_patterns(&self) -> Vec<ErrorPattern> {
        policy::detect_patterns(self.patterns.values(), self.clock.now())
    }

    /// Whether a failed operation on `order_id` may be retried without an operator.
    ///
    /// Pure read: a caller that does retry bumps the count with
    /// [`ErrorStore::increment_retry_count`] itself.
    #[must_use]
    pub fn should_auto_retry(&self, order_id: &str, kind: ErrorKind) -> bool {
        self.retry_decision(order_id, kind).is_retry()
    }

    #[must_use]
    pub fn retry_decision(&self, order_id: &str, kind: ErrorKind) -> RetryDecision {
        policy::retry_decision(&self.records, order_id, kind, self.clock.now())
    }
}
