//! Daily logs and their field entries for [`SqliteStore`].

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::debug;

use tally_core::daily_log::{DailyLog, DailyLogWithEntries, LogEntry, Mood};
use tally_core::validation::normalize_notes;

use crate::error::{Result, StorageError};
use crate::sqlite::convert::{format_date, format_datetime, parse_date};
use crate::sqlite::store::SqliteStore;
use crate::traits::DailyLogUpdate;

const LOG_COLUMNS: &str = "id, user, log_date, mood, notes";
const ENTRY_COLUMNS: &str = "id, daily_log_id, field_id, value";

fn scan_log(row: &Row<'_>) -> rusqlite::Result<DailyLog> {
    let log_date: String = row.get(2)?;
    let mood: Option<i64> = row.get(3)?;
    let mood = mood
        .map(Mood::new)
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Integer, Box::new(e)))?;
    Ok(DailyLog {
        id: row.get(0)?,
        user: row.get(1)?,
        log_date: parse_date(2, &log_date)?,
        mood,
        notes: row.get(4)?,
    })
}

fn scan_entry(row: &Row<'_>) -> rusqlite::Result<LogEntry> {
    Ok(LogEntry {
        id: row.get(0)?,
        daily_log_id: row.get(1)?,
        field_id: row.get(2)?,
        value: row.get(3)?,
    })
}

// ---------------------------------------------------------------------------
// Connection-level helpers
// ---------------------------------------------------------------------------

fn get_entries_on_conn(conn: &Connection, daily_log_id: i64) -> Result<Vec<LogEntry>> {
    let sql = format!("SELECT {ENTRY_COLUMNS} FROM log_entries WHERE daily_log_id = ?1 ORDER BY id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![daily_log_id], scan_entry)?;
    let mut entries = Vec::new();
    for row in rows {
        entries.push(row?);
    }
    Ok(entries)
}

/// Fails with `NotFound` unless `table` has row `id` owned by `user`.
fn ensure_owned(conn: &Connection, table: &str, entity: &str, user: &str, id: i64) -> Result<()> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1 AND user = ?2)");
    let owned: bool = conn.query_row(&sql, params![id, user], |row| row.get(0))?;
    if owned {
        Ok(())
    } else {
        Err(StorageError::not_found(entity, id))
    }
}

// ---------------------------------------------------------------------------
// SqliteStore methods
// ---------------------------------------------------------------------------

impl SqliteStore {
    /// The user's log for `date`, with its entries.
    pub fn get_daily_log_impl(
        &self,
        user: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyLogWithEntries>> {
        let conn = self.lock_conn()?;
        let sql = format!("SELECT {LOG_COLUMNS} FROM daily_logs WHERE user = ?1 AND log_date = ?2");
        let log = conn
            .query_row(&sql, params![user, format_date(date)], scan_log)
            .optional()?;
        match log {
            Some(log) => {
                let entries = get_entries_on_conn(&conn, log.id)?;
                Ok(Some(DailyLogWithEntries { log, entries }))
            }
            None => Ok(None),
        }
    }

    /// Ensures the day's log row exists, then applies `update`.
    ///
    /// Notes are trimmed; blank notes are stored as NULL.
    pub fn upsert_daily_log_impl(
        &self,
        user: &str,
        date: NaiveDate,
        update: &DailyLogUpdate,
    ) -> Result<DailyLog> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;
        let now = format_datetime(&Utc::now());

        let id: i64 = tx.query_row(
            "INSERT INTO daily_logs (user, log_date, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT (user, log_date) DO UPDATE SET updated_at = excluded.updated_at
             RETURNING id",
            params![user, format_date(date), now],
            |row| row.get(0),
        )?;

        if let Some(mood) = update.mood {
            tx.execute(
                "UPDATE daily_logs SET mood = ?1 WHERE id = ?2",
                params![mood.map(Mood::value), id],
            )?;
        }
        if let Some(notes) = &update.notes {
            tx.execute(
                "UPDATE daily_logs SET notes = ?1 WHERE id = ?2",
                params![normalize_notes(notes.as_deref()), id],
            )?;
        }

        let sql = format!("SELECT {LOG_COLUMNS} FROM daily_logs WHERE id = ?1");
        let log = tx.query_row(&sql, params![id], scan_log)?;
        tx.commit()?;
        debug!(id, user, %date, "upserted daily log");
        Ok(log)
    }

    /// All entries of one of the user's logs.
    pub fn get_log_entries_impl(&self, user: &str, daily_log_id: i64) -> Result<Vec<LogEntry>> {
        let conn = self.lock_conn()?;
        ensure_owned(&conn, "daily_logs", "daily log", user, daily_log_id)?;
        get_entries_on_conn(&conn, daily_log_id)
    }

    /// Writes one field value, replacing any previous value for the pair.
    ///
    /// Both the log and the field must belong to `user`.
    pub fn upsert_log_entry_impl(
        &self,
        user: &str,
        daily_log_id: i64,
        field_id: i64,
        value: &str,
    ) -> Result<LogEntry> {
        if value.trim().is_empty() {
            return Err(StorageError::validation("log entry value must not be empty"));
        }
        let conn = self.lock_conn()?;
        ensure_owned(&conn, "daily_logs", "daily log", user, daily_log_id)?;
        ensure_owned(&conn, "log_fields", "log field", user, field_id)?;

        let sql = format!(
            "INSERT INTO log_entries (daily_log_id, field_id, value) VALUES (?1, ?2, ?3)
             ON CONFLICT (daily_log_id, field_id) DO UPDATE SET value = excluded.value
             RETURNING {ENTRY_COLUMNS}"
        );
        let entry = conn.query_row(&sql, params![daily_log_id, field_id, value.trim()], scan_entry)?;
        debug!(daily_log_id, field_id, "upserted log entry");
        Ok(entry)
    }

    /// Logs dated within `start..=end`, newest first, with their entries.
    pub fn get_log_history_impl(
        &self,
        user: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyLogWithEntries>> {
        let conn = self.lock_conn()?;
        let (start, end) = (format_date(start), format_date(end));
        let range = params![user, start, end];

        let sql = format!(
            "SELECT {LOG_COLUMNS} FROM daily_logs
             WHERE user = ?1 AND log_date BETWEEN ?2 AND ?3
             ORDER BY log_date DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(range, scan_log)?;
        let mut logs = Vec::new();
        for row in rows {
            logs.push(row?);
        }

        let mut stmt = conn.prepare(
            "SELECT e.id, e.daily_log_id, e.field_id, e.value FROM log_entries e
             JOIN daily_logs l ON l.id = e.daily_log_id
             WHERE l.user = ?1 AND l.log_date BETWEEN ?2 AND ?3
             ORDER BY e.id",
        )?;
        let rows = stmt.query_map(range, scan_entry)?;
        let mut by_log: HashMap<i64, Vec<LogEntry>> = HashMap::new();
        for row in rows {
            let entry = row?;
            by_log.entry(entry.daily_log_id).or_default().push(entry);
        }

        Ok(logs
            .into_iter()
            .map(|log| {
                let entries = by_log.remove(&log.id).unwrap_or_default();
                DailyLogWithEntries { log, entries }
            })
            .collect())
    }
}
