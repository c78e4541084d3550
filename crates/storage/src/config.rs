//! Environment-driven settings for the `SQLite` snapshot backend.

use std::path::{Path, PathBuf};

use order_guard_core::env_parse_with_default;

const DEFAULT_POOL_SIZE: u32 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteConfig {
    pub db_path: PathBuf,
    pub pool_size: u32,
}

impl SqliteConfig {
    #[must_use]
    pub fn new(db_path: &Path) -> Self {
        Self { db_path: db_path.to_path_buf(), pool_size: DEFAULT_POOL_SIZE }
    }

    /// `ORDER_GUARD_DB_PATH` and `ORDER_GUARD_DB_POOL_SIZE`, falling back to
    /// `<data_local_dir>/order-guard/errors.db` and a pool of 4.
    #[must_use]
    pub fn from_env() -> Self {
        let db_path = std::env::var_os("ORDER_GUARD_DB_PATH")
            .filter(|v| !v.is_empty())
            .map_or_else(default_db_path, PathBuf::from);
        let pool_size = env_parse_with_default("ORDER_GUARD_DB_POOL_SIZE", DEFAULT_POOL_SIZE).max(1);
        Self { db_path, pool_size }
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("order-guard")
        .join("errors.db")
}
