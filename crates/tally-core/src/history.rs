//! Per-day completion percentages over a date window.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::completion_index::CompletionIndex;
use crate::dates::DateRange;
use crate::task::{Completion, Task};

/// Length of the dashboard calendar, in days (today minus 27 through today).
pub const DASHBOARD_WINDOW_DAYS: u32 = 28;

/// Completion share at or above which a day counts as successful.
pub const SUCCESS_THRESHOLD: u8 = 80;

/// Derived completion stats for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryDay {
    pub date: NaiveDate,
    /// Daily tasks that existed on this date.
    pub total: u32,
    /// Of those, how many were completed on this date.
    pub completed: u32,
    /// `round(100 * completed / total)`, or 0 when `total` is 0.
    pub percentage: u8,
}

impl HistoryDay {
    pub fn new(date: NaiveDate, total: u32, completed: u32) -> Self {
        Self {
            date,
            total,
            completed,
            percentage: percentage(completed, total),
        }
    }

    /// A day with no active daily tasks neither extends nor breaks a streak.
    pub fn is_neutral(&self) -> bool {
        self.total == 0
    }

    pub fn is_successful(&self) -> bool {
        self.total > 0 && self.percentage >= SUCCESS_THRESHOLD
    }

    /// Had tasks but missed the threshold.
    pub fn is_failed(&self) -> bool {
        self.total > 0 && self.percentage < SUCCESS_THRESHOLD
    }
}

/// Rounded integer percentage, halves rounding up.
pub fn percentage(completed: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (f64::from(completed) * 100.0 / f64::from(total)).round();
    pct.clamp(0.0, 100.0) as u8
}

/// Computes one [`HistoryDay`] per date in `start..=end`, ascending.
pub fn calculate_history(
    tasks: &[Task],
    completions: &[Completion],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<HistoryDay> {
    let index = CompletionIndex::build(completions);
    calculate_history_with_index(tasks, &index, DateRange::new(start, end))
}

/// Same as [`calculate_history`] over a prebuilt index.
///
/// Only daily tasks count. Archived tasks are not filtered out here; the
/// caller picks the task set.
pub fn calculate_history_with_index(
    tasks: &[Task],
    index: &CompletionIndex,
    range: DateRange,
) -> Vec<HistoryDay> {
    let daily: Vec<&Task> = tasks.iter().filter(|t| t.is_daily()).collect();

    range
        .iter()
        .map(|date| {
            let mut total = 0;
            let mut completed = 0;
            for task in daily.iter().filter(|t| t.existed_on(date)) {
                total += 1;
                if index.is_completed(task.id, date) {
                    completed += 1;
                }
            }
            HistoryDay::new(date, total, completed)
        })
        .collect()
}

/// The dashboard window ending on `today`.
pub fn dashboard_history(
    tasks: &[Task],
    completions: &[Completion],
    today: NaiveDate,
) -> Vec<HistoryDay> {
    let range = DateRange::trailing(today, DASHBOARD_WINDOW_DAYS);
    calculate_history(tasks, completions, range.start, range.end)
}
