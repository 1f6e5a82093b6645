//! Connection pool management for SQLite via r2d2.

use std::time::Duration;

use gallery_core::{Error, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::migrations;

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// How long a connection waits on a locked database before failing.
///
/// Slot replacements from several threads write the same rows; without a
/// timeout the losers fail immediately with `SQLITE_BUSY`.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (or create) the picture database at `db_path` and migrate it.
///
/// Connections run in WAL mode so readers are not blocked by a writer.
pub fn init_pool(db_path: &str) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")
    });

    let pool = build(manager)?;
    tracing::debug!("Picture database ready at {db_path}");
    Ok(pool)
}

/// Initialize an in-memory database pool (useful for tests).
///
/// Each call creates a uniquely-named shared-cache in-memory database so
/// that parallel tests do not interfere with each other, while all
/// connections *within* a single pool still share state.
pub fn init_memory_pool() -> Result<DbPool> {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let uri = format!("file:gallerydb_{n}?mode=memory&cache=shared");

    let manager =
        SqliteConnectionManager::file(uri).with_init(|conn| conn.busy_timeout(BUSY_TIMEOUT));
    build(manager)
}

fn build(manager: SqliteConnectionManager) -> Result<DbPool> {
    let pool = Pool::builder()
        .max_size(4)
        .build(manager)
        .map_err(|e| Error::persist(format!("Failed to create connection pool: {e}")))?;

    let conn = get_conn(&pool)?;
    migrations::run_migrations(&conn)?;
    Ok(pool)
}

/// Convenience helper to get a connection from the pool.
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::persist(format!("Failed to get connection from pool: {e}")))
}
