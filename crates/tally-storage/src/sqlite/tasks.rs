//! Task CRUD operations for [`SqliteStore`].

use chrono::{DateTime, FixedOffset, Utc};
use rusqlite::{Connection, Row, params};
use tracing::{debug, info};

use tally_core::enums::TaskType;
use tally_core::task::Task;
use tally_core::validation::validate_title;

use crate::error::{Result, StorageError};
use crate::sqlite::convert::{format_date, format_datetime, parse_date, parse_datetime, parse_enum};
use crate::sqlite::store::SqliteStore;

pub(crate) const TASK_COLUMNS: &str = "id, user, title, type, created_at, created_on, is_archived";

/// Maps a row selected with [`TASK_COLUMNS`] to a [`Task`].
pub(crate) fn scan_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    let task_type: String = row.get(3)?;
    let created_at: String = row.get(4)?;
    let created_on: String = row.get(5)?;
    Ok(Task {
        id: row.get(0)?,
        user: row.get(1)?,
        title: row.get(2)?,
        task_type: parse_enum(3, &task_type)?,
        created_at: parse_datetime(4, &created_at)?,
        created_on: parse_date(5, &created_on)?,
        is_archived: row.get(6)?,
    })
}

// ---------------------------------------------------------------------------
// Connection-level helpers
// ---------------------------------------------------------------------------

/// Fails with `NotFound` unless `id` is one of `user`'s tasks.
pub(crate) fn ensure_task_owned(conn: &Connection, user: &str, id: i64) -> Result<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM tasks WHERE id = ?1 AND user = ?2)",
        params![id, user],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(StorageError::not_found("task", id))
    }
}

pub(crate) fn get_task_on_conn(conn: &Connection, user: &str, id: i64) -> Result<Task> {
    let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1 AND user = ?2");
    match conn.query_row(&sql, params![id, user], scan_task) {
        Ok(task) => Ok(task),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(StorageError::not_found("task", id)),
        Err(e) => Err(e.into()),
    }
}

// ---------------------------------------------------------------------------
// SqliteStore methods
// ---------------------------------------------------------------------------

impl SqliteStore {
    /// Inserts a new task and returns it with its assigned id.
    ///
    /// `created_at` is stored in UTC; its local date becomes `created_on`.
    pub fn create_task_impl(
        &self,
        user: &str,
        title: &str,
        task_type: TaskType,
        created_at: DateTime<FixedOffset>,
    ) -> Result<Task> {
        let title = validate_title(title)?;
        let created_on = format_date(created_at.date_naive());
        let created_at = format_datetime(&created_at.with_timezone(&Utc));
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT INTO tasks (user, title, type, created_at, created_on, is_archived)
             VALUES (?1, ?2, ?3, ?4, ?5, 0)",
            params![user, title, task_type.as_str(), created_at, created_on],
        )?;
        let id = conn.last_insert_rowid();
        info!(id, user, %task_type, "created task");
        get_task_on_conn(&conn, user, id)
    }

    /// Fetches a single task owned by `user`.
    pub fn get_task_impl(&self, user: &str, id: i64) -> Result<Task> {
        let conn = self.lock_conn()?;
        get_task_on_conn(&conn, user, id)
    }

    /// Changes a task's title.
    pub fn rename_task_impl(&self, user: &str, id: i64, title: &str) -> Result<()> {
        let title = validate_title(title)?;
        let conn = self.lock_conn()?;
        let affected = conn.execute(
            "UPDATE tasks SET title = ?1 WHERE id = ?2 AND user = ?3",
            params![title, id, user],
        )?;
        if affected == 0 {
            return Err(StorageError::not_found("task", id));
        }
        debug!(id, "renamed task");
        Ok(())
    }

    /// Marks a task archived. Archiving twice is not an error.
    pub fn archive_task_impl(&self, user: &str, id: i64) -> Result<()> {
        let conn = self.lock_conn()?;
        let affected = conn.execute(
            "UPDATE tasks SET is_archived = 1 WHERE id = ?1 AND user = ?2",
            params![id, user],
        )?;
        if affected == 0 {
            return Err(StorageError::not_found("task", id));
        }
        info!(id, user, "archived task");
        Ok(())
    }

    /// Lists the user's tasks, oldest first, optionally including archived.
    pub fn get_tasks_impl(&self, user: &str, include_archived: bool) -> Result<Vec<Task>> {
        let conn = self.lock_conn()?;
        let filter = if include_archived {
            ""
        } else {
            " AND is_archived = 0"
        };
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE user = ?1{filter} ORDER BY created_at, id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user], scan_task)?;
        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?);
        }
        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn test_store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    fn at(day: u32) -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0).unwrap().fixed_offset()
    }

    #[test]
    fn create_and_get_task() {
        let store = test_store();
        let task = store
            .create_task_impl("alice", "  Read 20 pages ", TaskType::Daily, at(1))
            .unwrap();
        assert_eq!(task.title, "Read 20 pages");
        assert_eq!(task.created_at, at(1));
        assert_eq!(task.created_on, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(!task.is_archived);

        let fetched = store.get_task_impl("alice", task.id).unwrap();
        assert_eq!(fetched, task);
    }

    #[test]
    fn creation_day_is_the_local_date() {
        let store = test_store();
        // 19:00 in UTC-8 on March 4th; already March 5th in UTC.
        let evening = FixedOffset::west_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 4, 19, 0, 0)
            .unwrap();
        let task = store
            .create_task_impl("alice", "Journal", TaskType::Daily, evening)
            .unwrap();

        assert_eq!(task.created_at, Utc.with_ymd_and_hms(2024, 3, 5, 3, 0, 0).unwrap());
        assert_eq!(task.created_on, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(store.get_task_impl("alice", task.id).unwrap(), task);
    }

    #[test]
    fn blank_title_rejected() {
        let store = test_store();
        let err = store
            .create_task_impl("alice", "   ", TaskType::Once, at(1))
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn tasks_are_scoped_by_user() {
        let store = test_store();
        let task = store
            .create_task_impl("alice", "Run", TaskType::Daily, at(1))
            .unwrap();
        store
            .create_task_impl("bob", "Swim", TaskType::Daily, at(1))
            .unwrap();

        assert_eq!(store.get_tasks_impl("alice", false).unwrap().len(), 1);
        assert!(store.get_task_impl("bob", task.id).unwrap_err().is_not_found());
        assert!(store.archive_task_impl("bob", task.id).unwrap_err().is_not_found());
    }

    #[test]
    fn archive_hides_from_active_list() {
        let store = test_store();
        let a = store.create_task_impl("alice", "A", TaskType::Daily, at(2)).unwrap();
        let b = store.create_task_impl("alice", "B", TaskType::Once, at(1)).unwrap();
        store.archive_task_impl("alice", a.id).unwrap();

        let active = store.get_tasks_impl("alice", false).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, b.id);

        let all = store.get_tasks_impl("alice", true).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, b.id, "ordered by creation time");
        assert!(all[1].is_archived);
    }

    #[test]
    fn rename_task() {
        let store = test_store();
        let task = store.create_task_impl("alice", "Old", TaskType::Daily, at(1)).unwrap();
        store.rename_task_impl("alice", task.id, " New ").unwrap();
        assert_eq!(store.get_task_impl("alice", task.id).unwrap().title, "New");
        assert!(store.rename_task_impl("alice", task.id, "").unwrap_err().is_validation());
        assert!(store.rename_task_impl("alice", 999, "X").unwrap_err().is_not_found());
    }
}
