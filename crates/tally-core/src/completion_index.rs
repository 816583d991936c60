//! Lookup structures built from raw completion records.
//!
//! The store returns at most the 500 most recent completions; anything
//! older simply reads as "not completed" here.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::enums::TaskType;
use crate::task::{Completion, Task};

/// A `(task, day)` lookup over completion records.
#[derive(Debug, Clone, Default)]
pub struct CompletionIndex {
    records: HashMap<(i64, NaiveDate), Record>,
}

#[derive(Debug, Clone)]
struct Record {
    is_completed: bool,
    failure_note: Option<String>,
}

impl CompletionIndex {
    /// Indexes the given completions. A later duplicate key replaces an
    /// earlier one.
    pub fn build(completions: &[Completion]) -> Self {
        let records = completions
            .iter()
            .map(|c| {
                (
                    (c.task_id, c.completed_date),
                    Record {
                        is_completed: c.is_completed,
                        failure_note: c.failure_note.clone(),
                    },
                )
            })
            .collect();
        Self { records }
    }

    /// Returns `true` if the task has a record on `date` marked completed.
    pub fn is_completed(&self, task_id: i64, date: NaiveDate) -> bool {
        self.records
            .get(&(task_id, date))
            .is_some_and(|r| r.is_completed)
    }

    /// Returns `true` if any record (completed or not) exists for the pair.
    pub fn has_record(&self, task_id: i64, date: NaiveDate) -> bool {
        self.records.contains_key(&(task_id, date))
    }

    pub fn failure_note(&self, task_id: i64, date: NaiveDate) -> Option<&str> {
        self.records
            .get(&(task_id, date))
            .and_then(|r| r.failure_note.as_deref())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Per-task flags for the active-task view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFlags {
    /// Completed on the reference day.
    pub today: bool,
    /// Completed on any day in the fetched records.
    pub ever: bool,
}

/// Builds `task_id -> flags` from completion records.
pub fn task_flags(completions: &[Completion], today: NaiveDate) -> HashMap<i64, TaskFlags> {
    let mut flags: HashMap<i64, TaskFlags> = HashMap::new();
    for c in completions.iter().filter(|c| c.is_completed) {
        let entry = flags.entry(c.task_id).or_default();
        entry.ever = true;
        if c.completed_date == today {
            entry.today = true;
        }
    }
    flags
}

/// An active task with its completion state for today.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodayTask {
    pub id: i64,
    pub title: String,
    /// Daily tasks: done today. One-time tasks: ever done.
    pub completed: bool,
    #[serde(rename = "type")]
    pub task_type: TaskType,
}

/// Joins active tasks with their completion flags.
pub fn today_tasks(tasks: &[Task], completions: &[Completion], today: NaiveDate) -> Vec<TodayTask> {
    let flags = task_flags(completions, today);
    tasks
        .iter()
        .filter(|t| !t.is_archived)
        .map(|t| {
            let f = flags.get(&t.id).copied().unwrap_or_default();
            TodayTask {
                id: t.id,
                title: t.title.clone(),
                completed: match t.task_type {
                    TaskType::Daily => f.today,
                    TaskType::Once => f.ever,
                },
                task_type: t.task_type,
            }
        })
        .collect()
}
