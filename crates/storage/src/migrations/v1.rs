//! Migration v1: snapshot slots

pub(super) const SQL: &str = "
CREATE TABLE IF NOT EXISTS snapshots (
    slot TEXT PRIMARY KEY,
    payload TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
";
