//! DDL statements and upgrades for the SQLite schema.
//!
//! Calendar days are stored as TEXT `YYYY-MM-DD`, timestamps as TEXT in
//! ISO 8601 UTC, booleans as INTEGER (0/1). Unique constraints carry the
//! "at most one per key" rules that the upserts rely on. The layout version
//! lives in `PRAGMA user_version`.

/// Layout version written by [`SCHEMA_STATEMENTS`].
pub const SCHEMA_VERSION: i32 = 2;

/// DDL for a fresh database at [`SCHEMA_VERSION`].
pub const SCHEMA_STATEMENTS: &[&str] = &[
    // -- Tasks table ---------------------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS tasks (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        user        TEXT NOT NULL,
        title       TEXT NOT NULL,
        type        TEXT NOT NULL DEFAULT 'daily' CHECK (type IN ('daily', 'once')),
        created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        created_on  TEXT NOT NULL,
        is_archived INTEGER NOT NULL DEFAULT 0
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_tasks_user ON tasks(user, is_archived)",
    // -- Completions table ---------------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS completions (
        id             INTEGER PRIMARY KEY AUTOINCREMENT,
        task_id        INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
        completed_date TEXT NOT NULL,
        is_completed   INTEGER NOT NULL DEFAULT 0,
        failure_note   TEXT,
        updated_at     TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        UNIQUE (task_id, completed_date)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_completions_date ON completions(completed_date)",
    // -- Log fields table ----------------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS log_fields (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        user          TEXT NOT NULL,
        name          TEXT NOT NULL,
        type          TEXT NOT NULL DEFAULT 'text' CHECK (type IN ('text', 'number', 'time')),
        display_order INTEGER NOT NULL DEFAULT 0,
        is_active     INTEGER NOT NULL DEFAULT 1
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_log_fields_user ON log_fields(user, is_active)",
    // -- Daily logs table ----------------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS daily_logs (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        user       TEXT NOT NULL,
        log_date   TEXT NOT NULL,
        mood       INTEGER CHECK (mood IS NULL OR mood BETWEEN 1 AND 5),
        notes      TEXT,
        updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        UNIQUE (user, log_date)
    )
    "#,
    // -- Log entries table ---------------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS log_entries (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        daily_log_id INTEGER NOT NULL REFERENCES daily_logs(id) ON DELETE CASCADE,
        field_id     INTEGER NOT NULL REFERENCES log_fields(id),
        value        TEXT NOT NULL,
        UNIQUE (daily_log_id, field_id)
    )
    "#,
];

/// One step that brings a database from version `from` to `from + 1`.
#[derive(Debug, Clone, Copy)]
pub struct Upgrade {
    pub from: i32,
    pub name: &'static str,
    pub sql: &'static str,
}

/// Upgrades for databases written by earlier layouts, in version order.
pub const UPGRADES: &[Upgrade] = &[Upgrade {
    from: 1,
    name: "tasks_created_on",
    // Version 1 stored only the UTC instant, so its date stands in for the day.
    sql: "ALTER TABLE tasks ADD COLUMN created_on TEXT;
          UPDATE tasks SET created_on = substr(created_at, 1, 10) WHERE created_on IS NULL;",
}];
