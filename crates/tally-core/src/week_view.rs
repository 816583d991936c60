//! Detailed seven-day view of a past or current week.
//!
//! Joins tasks, the week's completions, and daily logs into one record per
//! day, most recent day first.

use chrono::NaiveDate;
use serde::Serialize;

use crate::completion_index::CompletionIndex;
use crate::daily_log::{DailyLogWithEntries, FieldValues, LogField, Mood};
use crate::dates::{self, DateRange};
use crate::enums::TaskType;
use crate::history::{SUCCESS_THRESHOLD, percentage};
use crate::task::{Completion, Task};

/// Furthest week the history view can look back (about three months).
pub const MAX_WEEK_OFFSET: u32 = 11;

/// How many weeks before the current one to show, within `0..=MAX_WEEK_OFFSET`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct WeekOffset(u32);

impl WeekOffset {
    /// The week containing today.
    pub const CURRENT: WeekOffset = WeekOffset(0);

    /// Returns `None` for offsets outside `0..=MAX_WEEK_OFFSET`.
    pub fn new(offset: i64) -> Option<Self> {
        u32::try_from(offset)
            .ok()
            .filter(|o| *o <= MAX_WEEK_OFFSET)
            .map(Self)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Moves by `delta` weeks (positive is further back). Out-of-range
    /// targets yield `None` and leave the caller's offset untouched.
    pub fn shifted(self, delta: i64) -> Option<Self> {
        Self::new(i64::from(self.0) + delta)
    }

    pub fn can_go_back(self) -> bool {
        self.0 < MAX_WEEK_OFFSET
    }

    pub fn can_go_forward(self) -> bool {
        self.0 > 0
    }
}

/// One daily habit's state on one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitStatus {
    pub title: String,
    pub completed: bool,
    pub failure_note: Option<String>,
}

/// The daily log for one day, with field values in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayLog {
    pub mood: Option<Mood>,
    pub notes: Option<String>,
    pub fields: FieldValues,
}

impl DayLog {
    /// Joins a log's entries against active fields by field id.
    pub fn from_log(log: &DailyLogWithEntries, fields: &[LogField]) -> Self {
        Self {
            mood: log.log.mood,
            notes: log.log.notes.clone(),
            fields: FieldValues::from_log(log, fields),
        }
    }
}

/// Everything shown for a single day of the week view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayDetail {
    pub date: NaiveDate,
    /// Future days are placeholders: no habits, no log.
    pub is_future: bool,
    pub daily_habits: Vec<HabitStatus>,
    pub once_tasks_completed: Vec<String>,
    pub total_daily: u32,
    pub completed_daily: u32,
    pub completion_percentage: u8,
    pub log: Option<DayLog>,
}

impl DayDetail {
    fn placeholder(date: NaiveDate) -> Self {
        Self {
            date,
            is_future: true,
            daily_habits: Vec::new(),
            once_tasks_completed: Vec::new(),
            total_daily: 0,
            completed_daily: 0,
            completion_percentage: 0,
            log: None,
        }
    }
}

/// Aggregates over the non-future days of a week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekSummary {
    /// Mean completion over days that had habits, rounded.
    pub avg_completion: u8,
    pub days_above_80: u32,
    pub days_with_tasks: u32,
    /// Mean mood to one decimal, if any day recorded one.
    pub avg_mood: Option<f64>,
    pub days_with_log: u32,
}

/// A fully joined week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekView {
    pub offset: WeekOffset,
    pub range: DateRange,
    pub label: String,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    /// Sunday first, Monday last.
    pub days: Vec<DayDetail>,
    pub summary: WeekSummary,
}

/// Raw collections the week view is built from.
#[derive(Debug, Clone, Copy)]
pub struct WeekSnapshot<'a> {
    /// All of the user's tasks, archived ones included.
    pub tasks: &'a [Task],
    /// Completions inside the week's range.
    pub completions: &'a [Completion],
    /// Daily logs inside the week's range, with entries.
    pub logs: &'a [DailyLogWithEntries],
    /// Active log fields.
    pub fields: &'a [LogField],
}

/// Builds the view for the week `offset` weeks before the one holding `today`.
pub fn build_week_view(snapshot: &WeekSnapshot<'_>, offset: WeekOffset, today: NaiveDate) -> WeekView {
    let range = dates::week_range(today, offset.get());
    let index = CompletionIndex::build(snapshot.completions);

    let days: Vec<DayDetail> = range
        .iter()
        .rev()
        .map(|date| {
            if date > today {
                DayDetail::placeholder(date)
            } else {
                build_day(snapshot, &index, date)
            }
        })
        .collect();
    let summary = summarize_week(&days);

    WeekView {
        offset,
        label: dates::week_label(&range),
        range,
        can_go_back: offset.can_go_back(),
        can_go_forward: offset.can_go_forward(),
        days,
        summary,
    }
}

fn build_day(snapshot: &WeekSnapshot<'_>, index: &CompletionIndex, date: NaiveDate) -> DayDetail {
    // Archived habits stay visible on days they have a record for.
    let daily_habits: Vec<HabitStatus> = snapshot
        .tasks
        .iter()
        .filter(|t| t.is_daily() && t.existed_on(date))
        .filter(|t| !t.is_archived || index.has_record(t.id, date))
        .map(|t| HabitStatus {
            title: t.title.clone(),
            completed: index.is_completed(t.id, date),
            failure_note: index.failure_note(t.id, date).map(str::to_string),
        })
        .collect();

    let once_tasks_completed = snapshot
        .tasks
        .iter()
        .filter(|t| t.task_type == TaskType::Once && index.is_completed(t.id, date))
        .map(|t| t.title.clone())
        .collect();

    let total_daily = daily_habits.len() as u32;
    let completed_daily = daily_habits.iter().filter(|h| h.completed).count() as u32;

    let log = snapshot
        .logs
        .iter()
        .find(|l| l.log.log_date == date)
        .map(|l| DayLog::from_log(l, snapshot.fields));

    DayDetail {
        date,
        is_future: false,
        daily_habits,
        once_tasks_completed,
        total_daily,
        completed_daily,
        completion_percentage: percentage(completed_daily, total_daily),
        log,
    }
}

/// Summarizes the non-future days of a week.
pub fn summarize_week(days: &[DayDetail]) -> WeekSummary {
    let past: Vec<&DayDetail> = days.iter().filter(|d| !d.is_future).collect();
    let with_tasks: Vec<&&DayDetail> = past.iter().filter(|d| d.total_daily > 0).collect();

    let avg_completion = if with_tasks.is_empty() {
        0
    } else {
        let sum: f64 = with_tasks
            .iter()
            .map(|d| f64::from(d.completion_percentage))
            .sum();
        (sum / with_tasks.len() as f64).round() as u8
    };

    let moods: Vec<f64> = past
        .iter()
        .filter_map(|d| d.log.as_ref().and_then(|l| l.mood))
        .map(|m| f64::from(m.value()))
        .collect();
    let avg_mood = (!moods.is_empty())
        .then(|| round1(moods.iter().sum::<f64>() / moods.len() as f64));

    WeekSummary {
        avg_completion,
        days_above_80: with_tasks
            .iter()
            .filter(|d| d.completion_percentage >= SUCCESS_THRESHOLD)
            .count() as u32,
        days_with_tasks: with_tasks.len() as u32,
        avg_mood,
        days_with_log: past.iter().filter(|d| d.log.is_some()).count() as u32,
    }
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daily_log::{DailyLog, LogEntry};
    use crate::enums::FieldType;
    use crate::task::TaskBuilder;
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn log(id: i64, day: &str, mood: Option<i64>, entries: Vec<LogEntry>) -> DailyLogWithEntries {
        DailyLogWithEntries {
            log: DailyLog {
                id,
                user: "alice".into(),
                log_date: date(day),
                mood: mood.map(|m| Mood::new(m).unwrap()),
                notes: None,
            },
            entries,
        }
    }

    fn field(id: i64, name: &str, active: bool) -> LogField {
        LogField {
            id,
            user: "alice".into(),
            name: name.into(),
            field_type: FieldType::Time,
            display_order: id,
            is_active: active,
        }
    }

    #[test]
    fn offset_bounds() {
        assert_eq!(WeekOffset::new(-1), None);
        assert_eq!(WeekOffset::new(12), None);
        assert_eq!(WeekOffset::new(11).map(WeekOffset::get), Some(11));
        assert_eq!(WeekOffset::CURRENT.shifted(-1), None);
        assert_eq!(WeekOffset::new(11).unwrap().shifted(1), None);
        assert_eq!(WeekOffset::CURRENT.shifted(1), WeekOffset::new(1));
        assert!(!WeekOffset::CURRENT.can_go_forward());
        assert!(!WeekOffset::new(11).unwrap().can_go_back());
    }

    #[test]
    fn days_run_sunday_to_monday_with_future_placeholders() {
        // Thursday
        let today = date("2026-10-15");
        let tasks = vec![TaskBuilder::new("Walk").id(1).created_on(date("2026-10-01")).build()];
        let completions = vec![Completion::new(1, date("2026-10-15"), true)];
        let snapshot = WeekSnapshot {
            tasks: &tasks,
            completions: &completions,
            logs: &[],
            fields: &[],
        };
        let view = build_week_view(&snapshot, WeekOffset::CURRENT, today);

        assert_eq!(view.days.len(), 7);
        assert_eq!(view.days[0].date, date("2026-10-18"));
        assert_eq!(view.days[6].date, date("2026-10-12"));
        assert!(view.days[0].is_future);
        assert!(view.days[0].daily_habits.is_empty());
        assert!(!view.days[3].is_future);
        assert_eq!(view.days[3].completion_percentage, 100);
        assert_eq!(view.label, "Oct 12 - Oct 18, 2026");
        assert!(view.can_go_back);
        assert!(!view.can_go_forward);
    }

    #[test]
    fn archived_habit_visible_only_with_record() {
        let today = date("2026-10-18");
        let tasks = vec![
            TaskBuilder::new("Old habit")
                .id(1)
                .created_on(date("2026-09-01"))
                .archived(true)
                .build(),
            TaskBuilder::new("New habit").id(2).created_on(date("2026-10-14")).build(),
        ];
        let mut failed = Completion::new(1, date("2026-10-13"), false);
        failed.failure_note = Some("rain".into());
        let completions = vec![failed];
        let snapshot = WeekSnapshot {
            tasks: &tasks,
            completions: &completions,
            logs: &[],
            fields: &[],
        };
        let view = build_week_view(&snapshot, WeekOffset::CURRENT, today);
        let by_date = |d: &str| view.days.iter().find(|x| x.date == date(d)).unwrap();

        let tue = by_date("2026-10-13");
        assert_eq!(
            tue.daily_habits,
            vec![HabitStatus {
                title: "Old habit".into(),
                completed: false,
                failure_note: Some("rain".into()),
            }]
        );
        assert_eq!(tue.completion_percentage, 0);

        let mon = by_date("2026-10-12");
        assert!(mon.daily_habits.is_empty());
        assert_eq!(mon.total_daily, 0);

        let thu = by_date("2026-10-15");
        assert_eq!(thu.total_daily, 1);
        assert_eq!(thu.daily_habits[0].title, "New habit");
    }

    #[test]
    fn once_tasks_listed_on_completion_day() {
        let today = date("2026-10-18");
        let tasks = vec![
            TaskBuilder::new("File taxes")
                .id(7)
                .task_type(TaskType::Once)
                .created_on(date("2026-10-01"))
                .build(),
        ];
        let completions = vec![Completion::new(7, date("2026-10-16"), true)];
        let snapshot = WeekSnapshot {
            tasks: &tasks,
            completions: &completions,
            logs: &[],
            fields: &[],
        };
        let view = build_week_view(&snapshot, WeekOffset::CURRENT, today);
        let fri = view.days.iter().find(|d| d.date == date("2026-10-16")).unwrap();
        assert_eq!(fri.once_tasks_completed, vec!["File taxes".to_string()]);
        assert_eq!(fri.total_daily, 0);
    }

    #[test]
    fn logs_join_active_fields_only() {
        let today = date("2026-10-18");
        let logs = vec![log(
            1,
            "2026-10-17",
            Some(4),
            vec![
                LogEntry { id: 1, daily_log_id: 1, field_id: 1, value: "06:45".into() },
                LogEntry { id: 2, daily_log_id: 1, field_id: 2, value: "stale".into() },
            ],
        )];
        let fields = vec![field(1, "Wake", true)];
        let snapshot = WeekSnapshot {
            tasks: &[],
            completions: &[],
            logs: &logs,
            fields: &fields,
        };
        let view = build_week_view(&snapshot, WeekOffset::CURRENT, today);
        let sat = view.days.iter().find(|d| d.date == date("2026-10-17")).unwrap();
        let day_log = sat.log.as_ref().unwrap();
        assert_eq!(day_log.mood, Mood::new(4).ok());
        assert_eq!(day_log.fields.len(), 1);
        assert_eq!(day_log.fields["Wake"], "06:45");
        assert!(view.days[0].log.is_none());
    }

    #[test]
    fn summary_ignores_future_days() {
        let today = date("2026-10-14");
        let tasks = vec![TaskBuilder::new("Walk").id(1).created_on(date("2026-10-12")).build()];
        let completions = vec![
            Completion::new(1, date("2026-10-12"), true),
            Completion::new(1, date("2026-10-16"), true),
        ];
        let logs = vec![log(1, "2026-10-12", Some(3), vec![]), log(2, "2026-10-13", Some(4), vec![])];
        let snapshot = WeekSnapshot {
            tasks: &tasks,
            completions: &completions,
            logs: &logs,
            fields: &[],
        };
        let view = build_week_view(&snapshot, WeekOffset::CURRENT, today);
        assert_eq!(
            view.summary,
            WeekSummary {
                avg_completion: 33,
                days_above_80: 1,
                days_with_tasks: 3,
                avg_mood: Some(3.5),
                days_with_log: 2,
            }
        );
    }

    #[test]
    fn older_week_has_no_future_days() {
        let view = build_week_view(
            &WeekSnapshot { tasks: &[], completions: &[], logs: &[], fields: &[] },
            WeekOffset::new(2).unwrap(),
            date("2026-10-15"),
        );
        assert_eq!(view.range.start, date("2026-09-28"));
        assert!(view.days.iter().all(|d| !d.is_future));
        assert_eq!(view.summary.avg_mood, None);
        assert_eq!(view.summary.avg_completion, 0);
    }
}
