use order_guard_core::constants::DEFAULT_SNAPSHOT_SLOT;

/// Settings for one [`crate::ErrorStore`] instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorStoreConfig {
    /// Snapshot slot holding this store's persisted indices.
    pub slot: String,
}

impl Default for ErrorStoreConfig {
    fn default() -> Self {
        Self { slot: DEFAULT_SNAPSHOT_SLOT.to_owned() }
    }
}

impl ErrorStoreConfig {
    #[must_use]
    pub fn with_slot(slot: impl Into<String>) -> Self {
        Self { slot: slot.into() }
    }

    /// Reads `ORDER_GUARD_SNAPSHOT_SLOT`; blank or unset keeps the default slot.
    #[must_use]
    pub fn from_env() -> Self {
        match std::env::var("ORDER_GUARD_SNAPSHOT_SLOT") {
            Ok(v) if !v.trim().is_empty() => Self::with_slot(v.trim()),
            Ok(_) => {
                tracing::warn!("ORDER_GUARD_SNAPSHOT_SLOT is blank, using default slot");
                Self::default()
            },
            Err(_) => Self::default(),
        }
    }
}
