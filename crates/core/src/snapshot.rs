//! Durable form of the persistent-error and pattern indices.
//!
//! Maps are written as ordered entry lists, never as JSON objects, so
//! structured keys survive the round trip unchanged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::pattern::{ErrorPattern, PatternKey};
use crate::record::ErrorRecord;

/// Current snapshot layout version.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSnapshot {
    pub version: u32,
    #[serde(default)]
    pub persistent_errors: Vec<(String, ErrorRecord)>,
    #[serde(default)]
    pub error_patterns: Vec<(PatternKey, ErrorPattern)>,
}

impl Default for PersistedSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            persistent_errors: Vec::new(),
            error_patterns: Vec::new(),
        }
    }
}

impl PersistedSnapshot {
    #[must_use]
    pub fn from_indices(
        persistent: &BTreeMap<String, ErrorRecord>,
        patterns: &BTreeMap<PatternKey, ErrorPattern>,
    ) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            persistent_errors: persistent.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            error_patterns: patterns.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        }
    }

    /// Rebuild both indices. A repeated key keeps its last entry.
    #[must_use]
    pub fn into_indices(
        self,
    ) -> (BTreeMap<String, ErrorRecord>, BTreeMap<PatternKey, ErrorPattern>) {
        (
            self.persistent_errors.into_iter().collect(),
            self.error_patterns.into_iter().collect(),
        )
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.persistent_errors.is_empty() && self.error_patterns.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a snapshot, rejecting layouts newer than this build understands.
    pub fn from_json(payload: &str) -> Result<Self> {
        let snapshot: Self = serde_json::from_str(payload)?;
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(CoreError::InvalidInput(format!(
                "snapshot version {} is newer than supported version {SNAPSHOT_VERSION}",
                snapshot.version
            )));
        }
        Ok(snapshot)
    }
}
