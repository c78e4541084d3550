//! `SQLite` snapshot slots behind an r2d2 connection pool.

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use order_guard_core::PersistedSnapshot;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OptionalExtension as _};

use crate::config::SqliteConfig;
use crate::error::StorageError;
use crate::migrations;
use crate::traits::SnapshotStore;

type PooledConn = PooledConnection<SqliteConnectionManager>;

#[derive(Clone, Debug)]
pub struct SqliteSnapshotStore {
    pub(crate) pool: Pool<SqliteConnectionManager>,
}

fn init_connection(conn: &mut Connection) -> Result<(), rusqlite::Error> {
    conn.busy_timeout(Duration::from_secs(30))?;
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;",
    )?;
    Ok(())
}

impl SqliteSnapshotStore {
    /// Open (creating if needed) the database at `db_path` with the default pool size.
    pub fn new(db_path: &Path) -> Result<Self, StorageError> {
        Self::open(&SqliteConfig::new(db_path))
    }

    pub fn open(config: &SqliteConfig) -> Result<Self, StorageError> {
        if let Some(parent) = config.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let manager = SqliteConnectionManager::file(&config.db_path).with_init(init_connection);
        let pool = Pool::builder().max_size(config.pool_size.max(1)).build(manager)?;

        let conn = pool.get()?;
        migrations::run_migrations(&conn)?;
        drop(conn);

        tracing::info!(
            path = %config.db_path.display(),
            pool_size = config.pool_size,
            "Snapshot storage initialized with connection pool"
        );

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConn, StorageError> {
        Ok(self.pool.get()?)
    }
}

impl SnapshotStore for SqliteSnapshotStore {
    fn load(&self, slot: &str) -> Result<Option<PersistedSnapshot>, StorageError> {
        let conn = self.conn()?;
        let payload: Option<String> = conn
            .query_row("SELECT payload FROM snapshots WHERE slot = ?1", params![slot], |row| {
                row.get(0)
            })
            .optional()?;
        payload
            .map(|p| PersistedSnapshot::from_json(&p).map_err(|e| StorageError::corrupted_slot(slot, e)))
            .transpose()
    }

    fn save(&self, slot: &str, snapshot: &PersistedSnapshot) -> Result<(), StorageError> {
        let payload = snapshot.to_json().map_err(|e| StorageError::unencodable(slot, e))?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO snapshots (slot, payload, updated_at)
               VALUES (?1, ?2, ?3)
               ON CONFLICT(slot) DO UPDATE SET
                   payload = excluded.payload,
                   updated_at = excluded.updated_at",
            params![slot, payload, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn remove(&self, slot: &str) -> Result<bool, StorageError> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM snapshots WHERE slot = ?1", params![slot])?;
        Ok(deleted > 0)
    }

    fn set_aside(&self, slot: &str, target: &str) -> Result<bool, StorageError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let copied = tx.execute(
            "INSERT INTO snapshots (slot, payload, updated_at)
               SELECT ?2, payload, ?3 FROM snapshots WHERE slot = ?1
               ON CONFLICT(slot) DO UPDATE SET
                   payload = excluded.payload,
                   updated_at = excluded.updated_at",
            params![slot, target, Utc::now().to_rfc3339()],
        )?;
        if copied == 0 {
            return Ok(false);
        }
        tx.execute("DELETE FROM snapshots WHERE slot = ?1", params![slot])?;
        tx.commit()?;
        Ok(true)
    }
}
