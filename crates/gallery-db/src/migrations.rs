//! Embedded SQL migrations and runner.
//!
//! Migrations are stored as `&str` constants and executed in order.  A
//! `schema_migrations` table tracks which versions have been applied.

use gallery_core::{Error, Result};
use rusqlite::Connection;

/// V1: picture records.
///
/// `AUTOINCREMENT` keeps deleted ids from being handed out again, which lets
/// a compensating restore put a record back under its original id.
const V1_INITIAL: &str = r#"
CREATE TABLE blogger_pictures (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id    INTEGER NOT NULL,
    category    INTEGER NOT NULL DEFAULT 0,
    path        TEXT NOT NULL,
    bewrite     TEXT,
    title       TEXT NOT NULL,
    uploaded_at TEXT NOT NULL
);
"#;

/// V2: lookup indexes for owner listings and slot lookups.
const V2_OWNER_INDEXES: &str = r#"
CREATE INDEX idx_blogger_pictures_owner ON blogger_pictures(owner_id, id);
CREATE INDEX idx_blogger_pictures_owner_category ON blogger_pictures(owner_id, category, id);
CREATE INDEX idx_blogger_pictures_category ON blogger_pictures(category, id);
"#;

const MIGRATIONS: &[(i64, &str)] = &[(1, V1_INITIAL), (2, V2_OWNER_INDEXES)];

/// Run all pending migrations on `conn`.
///
/// Creates the `schema_migrations` tracking table if it does not exist,
/// then applies each outstanding migration inside a transaction.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
    )
    .map_err(|e| Error::persist(format!("Failed to create schema_migrations: {e}")))?;

    for &(version, sql) in MIGRATIONS {
        let already: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM schema_migrations WHERE version = ?1",
                [version],
                |row| row.get(0),
            )
            .map_err(|e| Error::persist(e.to_string()))?;

        if already {
            continue;
        }

        let tx = conn
            .unchecked_transaction()
            .map_err(|e| Error::persist(e.to_string()))?;

        tx.execute_batch(sql)
            .map_err(|e| Error::persist(format!("Migration V{version} failed: {e}")))?;

        tx.execute(
            "INSERT INTO schema_migrations (version) VALUES (?1)",
            [version],
        )
        .map_err(|e| Error::persist(e.to_string()))?;

        tx.commit().map_err(|e| Error::persist(e.to_string()))?;
        tracing::debug!("Applied migration V{version}");
    }

    Ok(())
}
