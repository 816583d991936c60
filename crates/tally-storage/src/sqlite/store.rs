//! [`SqliteStore`] -- SQLite-backed storage implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{Result, StorageError};
use crate::sqlite::schema::{self, SCHEMA_VERSION, UPGRADES};

/// SQLite-backed implementation of the [`Storage`](crate::traits::Storage) trait.
///
/// Wraps a [`rusqlite::Connection`] in a `Mutex` for thread safety. All
/// public methods acquire the lock, execute SQL, and release it.
pub struct SqliteStore {
    pub(crate) conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path` and brings its schema up
    /// to date.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!(?path, "opening SQLite database");
        let conn = Connection::open(path).map_err(|e| {
            StorageError::Connection(format!("failed to open {}: {e}", path.display()))
        })?;
        Self::from_connection(conn)
    }

    /// Opens an in-memory SQLite database (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        debug!("opening in-memory SQLite database");
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("failed to open in-memory db: {e}")))?;
        Self::from_connection(conn)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )
        .map_err(|e| StorageError::Connection(format!("failed to set pragmas: {e}")))?;
        prepare_schema(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// The layout version recorded in the database.
    pub fn schema_version(&self) -> Result<i32> {
        let conn = self.lock_conn()?;
        Ok(user_version(&conn)?)
    }

    /// Acquires the connection lock. Helper used by all operation modules.
    pub(crate) fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Connection(format!("mutex poisoned: {e}")))
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

fn user_version(conn: &Connection) -> rusqlite::Result<i32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
}

fn has_table(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
        [name],
        |row| row.get(0),
    )
}

/// Creates missing tables and applies pending [`UPGRADES`] in one
/// transaction.
fn prepare_schema(conn: &mut Connection) -> Result<()> {
    // Version 1 databases predate `user_version` and report 0.
    let found = match user_version(conn)? {
        0 if has_table(conn, "tasks")? => 1,
        v => v,
    };
    if found >= SCHEMA_VERSION {
        debug!(version = found, "schema up to date");
        return Ok(());
    }

    let tx = conn.transaction()?;
    // Tables missing from an older layout are created here as well.
    for stmt in schema::SCHEMA_STATEMENTS {
        tx.execute_batch(stmt).map_err(|e| StorageError::Migration {
            name: "create".into(),
            reason: e.to_string(),
        })?;
    }
    if found > 0 {
        for upgrade in UPGRADES.iter().filter(|u| u.from >= found) {
            tx.execute_batch(upgrade.sql).map_err(|e| StorageError::Migration {
                name: upgrade.name.into(),
                reason: e.to_string(),
            })?;
            info!(name = upgrade.name, to = upgrade.from + 1, "upgraded schema");
        }
    } else {
        info!(version = SCHEMA_VERSION, "created schema");
    }
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_in_memory() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.schema_version().unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn reopen_file_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tally.db");
        drop(SqliteStore::open(&path).unwrap());
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.schema_version().unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn upgrades_cover_every_version() {
        let froms: Vec<i32> = UPGRADES.iter().map(|u| u.from).collect();
        let expected: Vec<i32> = (1..SCHEMA_VERSION).collect();
        assert_eq!(froms, expected);
    }

    #[test]
    fn version_one_tasks_gain_creation_day() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tally.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE tasks (
                     id INTEGER PRIMARY KEY AUTOINCREMENT,
                     user TEXT NOT NULL,
                     title TEXT NOT NULL,
                     type TEXT NOT NULL DEFAULT 'daily',
                     created_at TEXT NOT NULL,
                     is_archived INTEGER NOT NULL DEFAULT 0
                 );
                 CREATE TABLE completions (
                     id INTEGER PRIMARY KEY AUTOINCREMENT,
                     task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
                     completed_date TEXT NOT NULL,
                     is_completed INTEGER NOT NULL DEFAULT 0,
                     failure_note TEXT,
                     updated_at TEXT NOT NULL,
                     UNIQUE (task_id, completed_date)
                 );
                 INSERT INTO tasks (user, title, type, created_at)
                 VALUES ('alice', 'Walk', 'daily', '2024-01-02T23:30:00.000Z');",
            )
            .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.schema_version().unwrap(), SCHEMA_VERSION);
        let task = store.get_task_impl("alice", 1).unwrap();
        assert_eq!(task.created_on, "2024-01-02".parse().unwrap());
    }
}
