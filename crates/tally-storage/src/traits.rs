//! The `Storage` trait -- the public API for tracker persistence.
//!
//! Consumers depend on this trait rather than on [`SqliteStore`](crate::SqliteStore)
//! so that alternative backends can be substituted. Every user-owned query
//! takes an explicit `user` scope.

use chrono::{DateTime, FixedOffset, NaiveDate};

use tally_core::daily_log::{DailyLog, DailyLogWithEntries, LogEntry, LogField, Mood};
use tally_core::enums::{FieldType, TaskType};
use tally_core::task::{Completion, CompletionStatus, Task};

use crate::error::Result;

/// Upper bound on completions returned by [`Storage::get_completions`].
pub const COMPLETION_FETCH_LIMIT: usize = 500;

/// Typed partial update for a daily log.
///
/// `None` leaves a column unchanged; `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyLogUpdate {
    pub mood: Option<Option<Mood>>,
    pub notes: Option<Option<String>>,
}

/// Persistence operations for tasks, completions, and the daily log.
pub trait Storage: Send + Sync {
    // -- Tasks ---------------------------------------------------------------

    /// Creates a task. The title is validated and trimmed.
    ///
    /// The offset of `created_at` decides the task's creation day.
    fn create_task(
        &self,
        user: &str,
        title: &str,
        task_type: TaskType,
        created_at: DateTime<FixedOffset>,
    ) -> Result<Task>;

    /// Fetches one of the user's tasks, archived or not.
    fn get_task(&self, user: &str, id: i64) -> Result<Task>;

    fn rename_task(&self, user: &str, id: i64, title: &str) -> Result<()>;

    /// Soft-deletes a task; its completions are kept.
    fn archive_task(&self, user: &str, id: i64) -> Result<()>;

    /// Active tasks, oldest first.
    fn get_tasks(&self, user: &str) -> Result<Vec<Task>>;

    /// All tasks including archived ones, oldest first.
    fn get_all_tasks(&self, user: &str) -> Result<Vec<Task>>;

    // -- Completions ---------------------------------------------------------

    /// The [`COMPLETION_FETCH_LIMIT`] most recent completions, newest first.
    fn get_completions(&self, user: &str) -> Result<Vec<Completion>>;

    /// Completions with `start <= completed_date <= end`.
    fn get_completions_between(
        &self,
        user: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Completion>>;

    /// Records a task's outcome for a day, replacing any existing record in
    /// a single atomic upsert.
    fn set_completion(
        &self,
        user: &str,
        task_id: i64,
        date: NaiveDate,
        status: &CompletionStatus,
    ) -> Result<Completion>;

    // -- Log fields ----------------------------------------------------------

    /// Active fields ordered by `display_order`.
    fn get_log_fields(&self, user: &str) -> Result<Vec<LogField>>;

    /// Appends a field after the current last active field.
    fn create_log_field(&self, user: &str, name: &str, field_type: FieldType) -> Result<LogField>;

    /// Soft-deletes a field; historical entries are kept.
    fn deactivate_log_field(&self, user: &str, id: i64) -> Result<()>;

    /// Exchanges the display order of two fields.
    fn swap_log_field_order(&self, user: &str, first: i64, second: i64) -> Result<()>;

    // -- Daily logs ----------------------------------------------------------

    fn get_daily_log(&self, user: &str, date: NaiveDate) -> Result<Option<DailyLogWithEntries>>;

    /// Creates the day's log if missing, then applies `update`.
    fn upsert_daily_log(
        &self,
        user: &str,
        date: NaiveDate,
        update: &DailyLogUpdate,
    ) -> Result<DailyLog>;

    fn get_log_entries(&self, user: &str, daily_log_id: i64) -> Result<Vec<LogEntry>>;

    /// Writes one field value for a log, replacing any previous value.
    /// The log and the field must both belong to `user`.
    fn upsert_log_entry(
        &self,
        user: &str,
        daily_log_id: i64,
        field_id: i64,
        value: &str,
    ) -> Result<LogEntry>;

    /// Logs with `start <= log_date <= end`, newest first, each with entries.
    fn get_log_history(
        &self,
        user: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyLogWithEntries>>;

    // -- Lifecycle -----------------------------------------------------------

    fn close(&self) -> Result<()>;
}
