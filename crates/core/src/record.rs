use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::ERROR_ID_SUFFIX_LEN;
use crate::error_kind::ErrorKind;

/// One failure observed by the admin order-update workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Unique identifier, see [`generate_error_id`]
    pub id: String,
    /// Order the failed operation targeted
    pub order_id: String,
    /// Human-readable diagnostic text
    pub message: String,
    /// When the failure was observed
    pub created_at: DateTime<Utc>,
    /// Retries attempted so far, bumped only by explicit caller action
    pub retry_count: u32,
    pub kind: ErrorKind,
    /// Operator who triggered the failing operation
    pub actor_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default)]
    pub resolved: bool,
}

impl ErrorRecord {
    #[must_use]
    pub const fn new(
        id: String,
        order_id: String,
        message: String,
        created_at: DateTime<Utc>,
        kind: ErrorKind,
        actor_id: String,
        context: Option<String>,
    ) -> Self {
        Self {
            id,
            order_id,
            message,
            created_at,
            retry_count: 0,
            kind,
            actor_id,
            context,
            resolved: false,
        }
    }

    /// Whether this record falls inside `window` before `now`.
    ///
    /// Timestamps ahead of `now` (clock skew after a restore) count as recent.
    #[must_use]
    pub fn is_within(&self, now: DateTime<Utc>, window: chrono::Duration) -> bool {
        now.signed_duration_since(self.created_at) < window
    }
}

/// Build an error id from the order, the creation instant and a random suffix.
///
/// Format: `{order_id}-{unix_millis}-{hex suffix}`. The suffix keeps ids
/// distinct for errors against the same order in the same millisecond.
#[must_use]
pub fn generate_error_id(order_id: &str, created_at: DateTime<Utc>) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{order_id}-{}-{}",
        created_at.timestamp_millis(),
        &suffix[..ERROR_ID_SUFFIX_LEN]
    )
}
