//! Storage backend for the tally habit tracker.
//!
//! Provides the [`Storage`] trait and a SQLite implementation ([`SqliteStore`]).

pub mod error;
pub mod sqlite;
pub mod traits;

// Re-exports for convenience.
pub use error::StorageError;
pub use sqlite::SqliteStore;
pub use traits::{COMPLETION_FETCH_LIMIT, DailyLogUpdate, Storage};

// ---------------------------------------------------------------------------
// Storage trait implementation for SqliteStore
// ---------------------------------------------------------------------------

use chrono::{DateTime, FixedOffset, NaiveDate};

use tally_core::daily_log::{DailyLog, DailyLogWithEntries, LogEntry, LogField};
use tally_core::enums::{FieldType, TaskType};
use tally_core::task::{Completion, CompletionStatus, Task};

use crate::error::Result;

impl Storage for SqliteStore {
    fn create_task(
        &self,
        user: &str,
        title: &str,
        task_type: TaskType,
        created_at: DateTime<FixedOffset>,
    ) -> Result<Task> {
        self.create_task_impl(user, title, task_type, created_at)
    }

    fn get_task(&self, user: &str, id: i64) -> Result<Task> {
        self.get_task_impl(user, id)
    }

    fn rename_task(&self, user: &str, id: i64, title: &str) -> Result<()> {
        self.rename_task_impl(user, id, title)
    }

    fn archive_task(&self, user: &str, id: i64) -> Result<()> {
        self.archive_task_impl(user, id)
    }

    fn get_tasks(&self, user: &str) -> Result<Vec<Task>> {
        self.get_tasks_impl(user, false)
    }

    fn get_all_tasks(&self, user: &str) -> Result<Vec<Task>> {
        self.get_tasks_impl(user, true)
    }

    fn get_completions(&self, user: &str) -> Result<Vec<Completion>> {
        self.get_completions_impl(user)
    }

    fn get_completions_between(
        &self,
        user: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Completion>> {
        self.get_completions_between_impl(user, start, end)
    }

    fn set_completion(
        &self,
        user: &str,
        task_id: i64,
        date: NaiveDate,
        status: &CompletionStatus,
    ) -> Result<Completion> {
        self.set_completion_impl(user, task_id, date, status)
    }

    fn get_log_fields(&self, user: &str) -> Result<Vec<LogField>> {
        self.get_log_fields_impl(user)
    }

    fn create_log_field(&self, user: &str, name: &str, field_type: FieldType) -> Result<LogField> {
        self.create_log_field_impl(user, name, field_type)
    }

    fn deactivate_log_field(&self, user: &str, id: i64) -> Result<()> {
        self.deactivate_log_field_impl(user, id)
    }

    fn swap_log_field_order(&self, user: &str, first: i64, second: i64) -> Result<()> {
        self.swap_log_field_order_impl(user, first, second)
    }

    fn get_daily_log(&self, user: &str, date: NaiveDate) -> Result<Option<DailyLogWithEntries>> {
        self.get_daily_log_impl(user, date)
    }

    fn upsert_daily_log(
        &self,
        user: &str,
        date: NaiveDate,
        update: &DailyLogUpdate,
    ) -> Result<DailyLog> {
        self.upsert_daily_log_impl(user, date, update)
    }

    fn get_log_entries(&self, user: &str, daily_log_id: i64) -> Result<Vec<LogEntry>> {
        self.get_log_entries_impl(user, daily_log_id)
    }

    fn upsert_log_entry(
        &self,
        user: &str,
        daily_log_id: i64,
        field_id: i64,
        value: &str,
    ) -> Result<LogEntry> {
        self.upsert_log_entry_impl(user, daily_log_id, field_id, value)
    }

    fn get_log_history(
        &self,
        user: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyLogWithEntries>> {
        self.get_log_history_impl(user, start, end)
    }

    fn close(&self) -> Result<()> {
        // SQLite connections are closed when the Connection is dropped.
        Ok(())
    }
}
