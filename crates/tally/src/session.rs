//! Application state for one tally session.
//!
//! [`AppState`] owns the storage handle and the user scope, holds the
//! week-navigation offset and the cached task list used by the history view,
//! and orchestrates storage reads into the pure builders of `tally_core`.

use std::str::FromStr;

use anyhow::{Context, Result, bail, ensure};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info};

use tally_core::completion_index::{TodayTask, today_tasks};
use tally_core::daily_log::{DailyLog, DailyLogWithEntries, LogEntry, LogField, Mood};
use tally_core::enums::{FieldType, TaskType};
use tally_core::export::{ExportData, ExportInput, LogExportInput, build_export};
use tally_core::history::{DASHBOARD_WINDOW_DAYS, HistoryDay, dashboard_history};
use tally_core::streaks::{Streaks, calculate_streaks};
use tally_core::task::{Completion, CompletionStatus, Task};
use tally_core::validation::validate_field_value;
use tally_core::week_view::{WeekOffset, WeekSnapshot, WeekView, build_week_view};
use tally_storage::{DailyLogUpdate, Storage};

/// Which neighbor a log field swaps with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(format!("invalid direction '{other}' (expected up or down)")),
        }
    }
}

/// The 28-day calendar with its streaks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub history: Vec<HistoryDay>,
    pub streaks: Streaks,
}

pub struct AppState<S: Storage> {
    store: S,
    user: String,
    log_tracking: bool,
    week_offset: WeekOffset,
    /// All tasks including archived ones, fetched once per history session.
    history_tasks: Option<Vec<Task>>,
}

impl<S: Storage> AppState<S> {
    pub fn new(store: S, user: impl Into<String>, log_tracking: bool) -> Self {
        Self {
            store,
            user: user.into(),
            log_tracking,
            week_offset: WeekOffset::CURRENT,
            history_tasks: None,
        }
    }

    pub fn week_offset(&self) -> WeekOffset {
        self.week_offset
    }

    // -- History navigation --------------------------------------------------

    /// Drops the cached task list.
    pub fn invalidate(&mut self) {
        self.history_tasks = None;
    }

    /// Starts a history session at the current week with a fresh task list.
    pub fn enter_history(&mut self) {
        self.invalidate();
        self.week_offset = WeekOffset::CURRENT;
    }

    /// Moves the viewed week by `delta` (positive is further back).
    ///
    /// Returns `false` and leaves the offset unchanged when the move would
    /// leave the navigable range.
    pub fn navigate_week(&mut self, delta: i64) -> bool {
        match self.week_offset.shifted(delta) {
            Some(offset) => {
                self.week_offset = offset;
                true
            }
            None => false,
        }
    }

    fn cached_history_tasks(&mut self) -> Result<&[Task]> {
        if self.history_tasks.is_none() {
            let tasks = self.store.get_all_tasks(&self.user)?;
            debug!(count = tasks.len(), "cached tasks for history");
            self.history_tasks = Some(tasks);
        }
        Ok(self.history_tasks.as_deref().unwrap_or_default())
    }

    // -- Views ---------------------------------------------------------------

    pub fn tasks(&self, include_archived: bool) -> Result<Vec<Task>> {
        let tasks = if include_archived {
            self.store.get_all_tasks(&self.user)?
        } else {
            self.store.get_tasks(&self.user)?
        };
        Ok(tasks)
    }

    pub fn dashboard(&self, today: NaiveDate) -> Result<Dashboard> {
        let tasks = self.store.get_tasks(&self.user)?;
        let completions = self.store.get_completions(&self.user)?;
        let history = dashboard_history(&tasks, &completions, today);
        let streaks = calculate_streaks(&history);
        Ok(Dashboard { history, streaks })
    }

    pub fn today_tasks(&self, today: NaiveDate) -> Result<Vec<TodayTask>> {
        let tasks = self.store.get_tasks(&self.user)?;
        let completions = self.store.get_completions(&self.user)?;
        Ok(today_tasks(&tasks, &completions, today))
    }

    /// The week at the current offset.
    pub fn week_view(&mut self, today: NaiveDate) -> Result<WeekView> {
        let offset = self.week_offset;
        let range = tally_core::dates::week_range(today, offset.get());
        let completions = self
            .store
            .get_completions_between(&self.user, range.start, range.end)?;
        let (logs, fields) = if self.log_tracking {
            (
                self.store.get_log_history(&self.user, range.start, range.end)?,
                self.store.get_log_fields(&self.user)?,
            )
        } else {
            (Vec::new(), Vec::new())
        };

        let tasks = self.cached_history_tasks()?;
        let snapshot = WeekSnapshot {
            tasks,
            completions: &completions,
            logs: &logs,
            fields: &fields,
        };
        Ok(build_week_view(&snapshot, offset, today))
    }

    pub fn export(&self, today: NaiveDate, now: DateTime<Utc>) -> Result<ExportData> {
        let tasks = self.store.get_tasks(&self.user)?;
        let completions = self.store.get_completions(&self.user)?;

        let log_data = if self.log_tracking {
            let start = today - Duration::days(i64::from(DASHBOARD_WINDOW_DAYS) - 1);
            Some((
                self.store.get_log_fields(&self.user)?,
                self.store.get_daily_log(&self.user, today)?,
                self.store.get_log_history(&self.user, start, today)?,
            ))
        } else {
            None
        };

        let input = ExportInput {
            tasks: &tasks,
            completions: &completions,
            log: log_data.as_ref().map(|(fields, today_log, history)| LogExportInput {
                fields,
                today_log: today_log.as_ref(),
                history,
            }),
        };
        Ok(build_export(&input, today, now))
    }

    // -- Task mutations ------------------------------------------------------

    /// Creates a task; `now`'s offset decides which day it was created on.
    pub fn add_task(
        &mut self,
        title: &str,
        task_type: TaskType,
        now: DateTime<FixedOffset>,
    ) -> Result<Task> {
        let task = self.store.create_task(&self.user, title, task_type, now)?;
        self.invalidate();
        Ok(task)
    }

    pub fn rename_task(&mut self, id: i64, title: &str) -> Result<Task> {
        self.store.rename_task(&self.user, id, title)?;
        self.invalidate();
        Ok(self.store.get_task(&self.user, id)?)
    }

    pub fn archive_task(&mut self, id: i64) -> Result<Task> {
        self.store.archive_task(&self.user, id)?;
        self.invalidate();
        Ok(self.store.get_task(&self.user, id)?)
    }

    pub fn mark_complete(&self, task_id: i64, date: NaiveDate) -> Result<Completion> {
        self.set_status(task_id, date, CompletionStatus::Completed)
    }

    pub fn mark_failed(&self, task_id: i64, date: NaiveDate, note: &str) -> Result<Completion> {
        self.set_status(
            task_id,
            date,
            CompletionStatus::Failed {
                note: note.to_string(),
            },
        )
    }

    pub fn mark_incomplete(&self, task_id: i64, date: NaiveDate) -> Result<Completion> {
        self.set_status(task_id, date, CompletionStatus::Incomplete)
    }

    fn set_status(&self, task_id: i64, date: NaiveDate, status: CompletionStatus) -> Result<Completion> {
        let task = self.store.get_task(&self.user, task_id)?;
        ensure!(!task.is_archived, "task {task_id} is archived");
        let completion = self.store.set_completion(&self.user, task_id, date, &status)?;
        info!(task_id, %date, completed = completion.is_completed, "recorded completion");
        Ok(completion)
    }

    // -- Daily log -----------------------------------------------------------

    fn require_log_tracking(&self) -> Result<()> {
        if !self.log_tracking {
            bail!("daily log tracking is disabled (set log_tracking: true in .tally/config.yaml)");
        }
        Ok(())
    }

    pub fn daily_log(&self, date: NaiveDate) -> Result<Option<DailyLogWithEntries>> {
        self.require_log_tracking()?;
        Ok(self.store.get_daily_log(&self.user, date)?)
    }

    pub fn set_mood(&self, date: NaiveDate, mood: Option<Mood>) -> Result<DailyLog> {
        self.require_log_tracking()?;
        let update = DailyLogUpdate {
            mood: Some(mood),
            notes: None,
        };
        Ok(self.store.upsert_daily_log(&self.user, date, &update)?)
    }

    pub fn set_notes(&self, date: NaiveDate, notes: &str) -> Result<DailyLog> {
        self.require_log_tracking()?;
        let update = DailyLogUpdate {
            mood: None,
            notes: Some(Some(notes.to_string())),
        };
        Ok(self.store.upsert_daily_log(&self.user, date, &update)?)
    }

    /// Validates `value` for the field's type and stores it.
    ///
    /// An empty value writes nothing and returns `None`.
    pub fn set_field_value(
        &self,
        date: NaiveDate,
        field_id: i64,
        value: &str,
    ) -> Result<Option<LogEntry>> {
        self.require_log_tracking()?;
        let field = self
            .store
            .get_log_fields(&self.user)?
            .into_iter()
            .find(|f| f.id == field_id)
            .with_context(|| format!("log field {field_id} not found"))?;

        let Some(value) = validate_field_value(field.field_type, value)? else {
            return Ok(None);
        };
        let log = self
            .store
            .upsert_daily_log(&self.user, date, &DailyLogUpdate::default())?;
        let entry = self.store.upsert_log_entry(&self.user, log.id, field.id, &value)?;
        Ok(Some(entry))
    }

    // -- Log fields ----------------------------------------------------------

    pub fn log_fields(&self) -> Result<Vec<LogField>> {
        self.require_log_tracking()?;
        Ok(self.store.get_log_fields(&self.user)?)
    }

    pub fn add_field(&self, name: &str, field_type: FieldType) -> Result<LogField> {
        self.require_log_tracking()?;
        Ok(self.store.create_log_field(&self.user, name, field_type)?)
    }

    pub fn remove_field(&self, field_id: i64) -> Result<()> {
        self.require_log_tracking()?;
        Ok(self.store.deactivate_log_field(&self.user, field_id)?)
    }

    /// Swaps the field at `index` with its neighbor.
    ///
    /// Returns `false` without writing when there is no neighbor.
    pub fn move_field(&self, index: usize, direction: Direction) -> Result<bool> {
        let fields = self.log_fields()?;
        let neighbor = match direction {
            Direction::Up => index.checked_sub(1),
            Direction::Down => index.checked_add(1),
        };
        let (Some(current), Some(other)) = (fields.get(index), neighbor.and_then(|i| fields.get(i)))
        else {
            return Ok(false);
        };
        self.store.swap_log_field_order(&self.user, current.id, other.id)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use tally_core::export::MoodTrend;
    use tally_storage::SqliteStore;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn at(day: &str) -> DateTime<FixedOffset> {
        let d = date(day);
        Utc.from_utc_datetime(&d.and_hms_opt(8, 0, 0).unwrap()).fixed_offset()
    }

    fn state(log_tracking: bool) -> AppState<SqliteStore> {
        AppState::new(SqliteStore::open_in_memory().unwrap(), "alice", log_tracking)
    }

    #[test]
    fn navigation_stays_in_range() {
        let mut app = state(true);
        assert!(!app.navigate_week(-1));
        assert_eq!(app.week_offset().get(), 0);
        assert!(app.navigate_week(11));
        assert!(!app.navigate_week(1));
        assert_eq!(app.week_offset().get(), 11);
        assert!(app.navigate_week(-3));
        assert_eq!(app.week_offset().get(), 8);

        app.enter_history();
        assert_eq!(app.week_offset().get(), 0);
    }

    #[test]
    fn dashboard_counts_streaks() {
        let mut app = state(true);
        let task = app.add_task("Walk", TaskType::Daily, at("2024-03-01")).unwrap();
        for day in ["2024-03-02", "2024-03-03", "2024-03-04"] {
            app.mark_complete(task.id, date(day)).unwrap();
        }

        let dash = app.dashboard(date("2024-03-04")).unwrap();
        assert_eq!(dash.history.len(), 28);
        assert_eq!(dash.streaks, Streaks { current: 3, longest: 3 });

        app.mark_failed(task.id, date("2024-03-04"), "rain").unwrap();
        let dash = app.dashboard(date("2024-03-04")).unwrap();
        assert_eq!(dash.streaks.current, 0);
        assert_eq!(dash.streaks.longest, 2);
    }

    #[test]
    fn evening_task_counts_on_local_creation_day() {
        let mut app = state(true);
        // 19:00 in UTC-8, which is 03:00 the next day in UTC.
        let evening = FixedOffset::west_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 4, 19, 0, 0)
            .unwrap();
        let today = date("2024-03-04");
        let task = app.add_task("Journal", TaskType::Daily, evening).unwrap();
        assert_eq!(task.created_date(), today);
        app.mark_complete(task.id, today).unwrap();

        let dash = app.dashboard(today).unwrap();
        let last = dash.history.last().unwrap();
        assert_eq!(last.date, today);
        assert_eq!((last.completed, last.total), (1, 1));
        assert_eq!(dash.streaks, Streaks { current: 1, longest: 1 });
        assert!(app.today_tasks(today).unwrap()[0].completed);

        let yesterday = dash.history.iter().rev().nth(1).unwrap();
        assert_eq!(yesterday.total, 0);
    }

    #[test]
    fn direction_parses_case_insensitively() {
        assert_eq!("up".parse::<Direction>().unwrap(), Direction::Up);
        assert_eq!("DOWN".parse::<Direction>().unwrap(), Direction::Down);
        assert!("left".parse::<Direction>().is_err());
    }

    #[test]
    fn undo_clears_completion() {
        let mut app = state(true);
        let task = app.add_task("Read", TaskType::Once, at("2024-03-01")).unwrap();
        app.mark_complete(task.id, date("2024-03-02")).unwrap();
        assert!(app.today_tasks(date("2024-03-05")).unwrap()[0].completed);

        let c = app.mark_incomplete(task.id, date("2024-03-02")).unwrap();
        assert!(!c.is_completed);
        assert!(!app.today_tasks(date("2024-03-05")).unwrap()[0].completed);
    }

    #[test]
    fn archived_tasks_cannot_be_marked() {
        let mut app = state(true);
        let task = app.add_task("Gym", TaskType::Daily, at("2024-03-01")).unwrap();
        app.archive_task(task.id).unwrap();
        assert!(app.mark_complete(task.id, date("2024-03-02")).is_err());
        assert!(app.mark_complete(999, date("2024-03-02")).is_err());
    }

    #[test]
    fn week_view_uses_cache_until_invalidated() {
        let mut app = state(true);
        let today = date("2024-03-06"); // Wednesday
        let walk = app.add_task("Walk", TaskType::Daily, at("2024-03-01")).unwrap();
        app.mark_complete(walk.id, date("2024-03-05")).unwrap();

        app.enter_history();
        let view = app.week_view(today).unwrap();
        assert_eq!(view.range.start, date("2024-03-04"));
        assert_eq!(view.days.len(), 7);
        assert!(view.days[0].is_future);
        let tuesday = view.days.iter().find(|d| d.date == date("2024-03-05")).unwrap();
        assert_eq!(tuesday.completed_daily, 1);

        // A task added behind the state's back is invisible until invalidation.
        app.store
            .create_task("alice", "Stretch", TaskType::Daily, at("2024-03-01"))
            .unwrap();
        let view = app.week_view(today).unwrap();
        let tuesday = view.days.iter().find(|d| d.date == date("2024-03-05")).unwrap();
        assert_eq!(tuesday.total_daily, 1);

        app.enter_history();
        let view = app.week_view(today).unwrap();
        let tuesday = view.days.iter().find(|d| d.date == date("2024-03-05")).unwrap();
        assert_eq!(tuesday.total_daily, 2);
    }

    #[test]
    fn field_values_are_validated_and_empty_skipped() {
        let app = state(true);
        let steps = app.add_field("Steps", FieldType::Number).unwrap();
        let day = date("2024-03-02");

        assert!(app.set_field_value(day, steps.id, "many").is_err());
        assert_eq!(app.set_field_value(day, steps.id, "  ").unwrap(), None);
        assert!(app.daily_log(day).unwrap().is_none());

        let entry = app.set_field_value(day, steps.id, "8500").unwrap().unwrap();
        assert_eq!(entry.value, "8500");
        assert!(app.set_field_value(day, 4242, "1").is_err());
    }

    #[test]
    fn move_field_swaps_neighbors_and_ignores_edges() {
        let app = state(true);
        let a = app.add_field("A", FieldType::Text).unwrap();
        let b = app.add_field("B", FieldType::Text).unwrap();

        assert!(!app.move_field(0, Direction::Up).unwrap());
        assert!(!app.move_field(1, Direction::Down).unwrap());
        assert!(app.move_field(1, Direction::Up).unwrap());

        let names: Vec<i64> = app.log_fields().unwrap().iter().map(|f| f.id).collect();
        assert_eq!(names, vec![b.id, a.id]);
    }

    #[test]
    fn log_operations_refused_when_disabled() {
        let app = state(false);
        let day = date("2024-03-02");
        assert!(app.set_mood(day, Mood::new(3).ok()).is_err());
        assert!(app.set_notes(day, "x").is_err());
        assert!(app.add_field("Sleep", FieldType::Time).is_err());

        let export = app.export(day, at("2024-03-02").with_timezone(&Utc)).unwrap();
        assert!(export.daily_log.is_none());
        assert!(export.daily_log_history.is_none());
    }

    #[test]
    fn export_includes_log_history() {
        let mut app = state(true);
        let today = date("2024-03-10");
        app.add_task("Walk", TaskType::Daily, at("2024-03-01")).unwrap();
        let sleep = app.add_field("Sleep", FieldType::Time).unwrap();
        for (day, mood) in [("2024-03-07", 2), ("2024-03-08", 2), ("2024-03-09", 4), ("2024-03-10", 5)] {
            app.set_mood(date(day), Mood::new(mood).ok()).unwrap();
            app.set_field_value(date(day), sleep.id, "07:30").unwrap();
        }
        app.set_notes(today, "good day").unwrap();

        let export = app.export(today, at("2024-03-10").with_timezone(&Utc)).unwrap();
        let log = export.daily_log.unwrap();
        assert_eq!(log.notes.as_deref(), Some("good day"));
        assert_eq!(log.mood_label.as_deref(), Some("Great"));

        let history = export.daily_log_history.unwrap();
        assert_eq!(history.entries.len(), 4);
        assert_eq!(history.entries[0].date, today);
        let patterns = history.patterns.unwrap();
        assert_eq!(patterns.mood_trend, MoodTrend::Improving);
        assert_eq!(patterns.days_logged, 4);
    }
}
