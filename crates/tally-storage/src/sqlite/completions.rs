//! Completion records for [`SqliteStore`].

use chrono::{NaiveDate, Utc};
use rusqlite::{Row, params};
use tracing::debug;

use tally_core::task::{Completion, CompletionStatus};
use tally_core::validation::validate_failure_note;

use crate::error::Result;
use crate::sqlite::convert::{format_date, format_datetime, parse_date, parse_datetime};
use crate::sqlite::store::SqliteStore;
use crate::sqlite::tasks::ensure_task_owned;
use crate::traits::COMPLETION_FETCH_LIMIT;

const COMPLETION_COLUMNS: &str =
    "c.id, c.task_id, c.completed_date, c.is_completed, c.failure_note, c.updated_at";

fn scan_completion(row: &Row<'_>) -> rusqlite::Result<Completion> {
    let completed_date: String = row.get(2)?;
    let updated_at: String = row.get(5)?;
    Ok(Completion {
        id: row.get(0)?,
        task_id: row.get(1)?,
        completed_date: parse_date(2, &completed_date)?,
        is_completed: row.get(3)?,
        failure_note: row.get(4)?,
        updated_at: parse_datetime(5, &updated_at)?,
    })
}

impl SqliteStore {
    /// Returns the most recent completions for the user's tasks, newest first.
    pub fn get_completions_impl(&self, user: &str) -> Result<Vec<Completion>> {
        let conn = self.lock_conn()?;
        let sql = format!(
            "SELECT {COMPLETION_COLUMNS} FROM completions c
             JOIN tasks t ON t.id = c.task_id
             WHERE t.user = ?1
             ORDER BY c.completed_date DESC, c.id DESC
             LIMIT ?2"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user, COMPLETION_FETCH_LIMIT as i64], scan_completion)?;
        let mut completions = Vec::new();
        for row in rows {
            completions.push(row?);
        }
        Ok(completions)
    }

    /// Returns completions dated within `start..=end`.
    pub fn get_completions_between_impl(
        &self,
        user: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Completion>> {
        let conn = self.lock_conn()?;
        let sql = format!(
            "SELECT {COMPLETION_COLUMNS} FROM completions c
             JOIN tasks t ON t.id = c.task_id
             WHERE t.user = ?1 AND c.completed_date BETWEEN ?2 AND ?3
             ORDER BY c.completed_date DESC, c.id DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![user, format_date(start), format_date(end)],
            scan_completion,
        )?;
        let mut completions = Vec::new();
        for row in rows {
            completions.push(row?);
        }
        Ok(completions)
    }

    /// Upserts the `(task, date)` record in one statement.
    ///
    /// Marking complete clears any failure note.
    pub fn set_completion_impl(
        &self,
        user: &str,
        task_id: i64,
        date: NaiveDate,
        status: &CompletionStatus,
    ) -> Result<Completion> {
        let note = status.failure_note().map(validate_failure_note).transpose()?;
        let conn = self.lock_conn()?;
        ensure_task_owned(&conn, user, task_id)?;

        let completion = conn.query_row(
            "INSERT INTO completions (task_id, completed_date, is_completed, failure_note, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (task_id, completed_date) DO UPDATE SET
                 is_completed = excluded.is_completed,
                 failure_note = excluded.failure_note,
                 updated_at = excluded.updated_at
             RETURNING id, task_id, completed_date, is_completed, failure_note, updated_at",
            params![
                task_id,
                format_date(date),
                status.is_completed(),
                note,
                format_datetime(&Utc::now()),
            ],
            scan_completion,
        )?;
        debug!(task_id, %date, completed = completion.is_completed, "recorded completion");
        Ok(completion)
    }
}
