//! Tasks and their per-day completion records.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::TaskType;

/// A habit (daily) or one-off (once) task owned by a user.
///
/// Tasks are never hard-deleted: archiving hides them from active views
/// while keeping their completions available to history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,

    pub user: String,

    pub title: String,

    #[serde(rename = "type")]
    pub task_type: TaskType,

    pub created_at: DateTime<Utc>,

    /// The creating user's calendar day at `created_at`.
    pub created_on: NaiveDate,

    #[serde(default)]
    pub is_archived: bool,
}

impl Task {
    /// Calendar day the task was created on, in the creator's time zone.
    pub fn created_date(&self) -> NaiveDate {
        self.created_on
    }

    /// Returns `true` for recurring daily habits.
    pub fn is_daily(&self) -> bool {
        self.task_type == TaskType::Daily
    }

    /// Returns `true` if the task existed by the end of `date`.
    ///
    /// A task created on `date` counts as existing on that date.
    pub fn existed_on(&self, date: NaiveDate) -> bool {
        self.created_date() <= date
    }
}

/// Builder for constructing a [`Task`] with a fluent API.
pub struct TaskBuilder {
    task: Task,
}

impl TaskBuilder {
    /// Creates a new daily task builder with the given title, created now.
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            task: Task {
                id: 0,
                user: String::new(),
                title: title.into(),
                task_type: TaskType::default(),
                created_at: now,
                created_on: now.date_naive(),
                is_archived: false,
            },
        }
    }

    pub fn id(mut self, id: i64) -> Self {
        self.task.id = id;
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.task.user = user.into();
        self
    }

    pub fn task_type(mut self, task_type: TaskType) -> Self {
        self.task.task_type = task_type;
        self
    }

    /// Sets the creation instant; the calendar day is taken in `created_at`'s zone.
    pub fn created_at<Tz: TimeZone>(mut self, created_at: DateTime<Tz>) -> Self {
        self.task.created_on = created_at.date_naive();
        self.task.created_at = created_at.with_timezone(&Utc);
        self
    }

    /// Sets the creation day, with the instant at midnight UTC of `date`.
    pub fn created_on(mut self, date: NaiveDate) -> Self {
        self.task.created_at = date.and_time(chrono::NaiveTime::MIN).and_utc();
        self.task.created_on = date;
        self
    }

    pub fn archived(mut self, archived: bool) -> Self {
        self.task.is_archived = archived;
        self
    }

    pub fn build(self) -> Task {
        self.task
    }
}

/// One task's outcome on one calendar day.
///
/// At most one record exists per `(task_id, completed_date)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub id: i64,

    pub task_id: i64,

    pub completed_date: NaiveDate,

    pub is_completed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_note: Option<String>,

    pub updated_at: DateTime<Utc>,
}

impl Completion {
    /// Shorthand used by tests and fixtures.
    pub fn new(task_id: i64, completed_date: NaiveDate, is_completed: bool) -> Self {
        Self {
            id: 0,
            task_id,
            completed_date,
            is_completed,
            failure_note: None,
            updated_at: Utc::now(),
        }
    }
}

/// Write-side form of a completion record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionStatus {
    /// Done for the day. Clears any previous failure note.
    Completed,
    /// Not done, without an explanation (an "undo").
    Incomplete,
    /// Explicitly recorded as failed, with a non-empty note.
    Failed { note: String },
}

impl CompletionStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    pub fn failure_note(&self) -> Option<&str> {
        match self {
            Self::Failed { note } => Some(note.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn existed_on_is_inclusive() {
        let task = TaskBuilder::new("Stretch")
            .created_on(date("2024-01-02"))
            .build();
        assert!(!task.existed_on(date("2024-01-01")));
        assert!(task.existed_on(date("2024-01-02")));
        assert!(task.existed_on(date("2024-01-03")));
    }

    #[test]
    fn created_date_ignores_time_of_day() {
        let task = TaskBuilder::new("Late")
            .created_at(Utc.with_ymd_and_hms(2024, 3, 9, 23, 59, 59).unwrap())
            .build();
        assert_eq!(task.created_date(), date("2024-03-09"));
    }

    #[test]
    fn created_date_follows_creator_zone() {
        // 19:00 on March 4th in UTC-8 is already March 5th in UTC.
        let pacific = FixedOffset::west_opt(8 * 3600).unwrap();
        let evening = pacific.with_ymd_and_hms(2024, 3, 4, 19, 0, 0).unwrap();
        let task = TaskBuilder::new("Journal").created_at(evening).build();

        assert_eq!(task.created_at, Utc.with_ymd_and_hms(2024, 3, 5, 3, 0, 0).unwrap());
        assert_eq!(task.created_date(), date("2024-03-04"));
        assert!(task.existed_on(date("2024-03-04")));
        assert!(!task.existed_on(date("2024-03-03")));
    }

    #[test]
    fn task_serializes_type_key() {
        let task = TaskBuilder::new("Read")
            .id(3)
            .task_type(TaskType::Once)
            .build();
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["type"], "once");
        assert_eq!(json["is_archived"], false);
    }

    #[test]
    fn completion_status_accessors() {
        let failed = CompletionStatus::Failed {
            note: "travel".into(),
        };
        assert!(!failed.is_completed());
        assert_eq!(failed.failure_note(), Some("travel"));
        assert!(CompletionStatus::Completed.is_completed());
        assert_eq!(CompletionStatus::Incomplete.failure_note(), None);
    }
}
