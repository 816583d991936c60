//! The structured activity snapshot handed to an external assistant.
//!
//! Key names and nesting form a stable schema consumed by downstream text
//! processing. Top-level keys: `export_metadata`, `today`, `streaks`,
//! `monthly_overview`, `daily_log`, `daily_log_history`, `context_for_ai`.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Serialize;

use crate::completion_index::{TodayTask, today_tasks};
use crate::daily_log::{DailyLogWithEntries, FieldValues, LogField, Mood};
use crate::dates;
use crate::enums::{FieldType, TaskType};
use crate::history::{self, HistoryDay, SUCCESS_THRESHOLD, percentage};
use crate::streaks::calculate_streaks;
use crate::task::{Completion, Task};
use crate::validation::parse_time_of_day;
use crate::week_view::round1;

/// Label used for every 28-day section of the export.
pub const EXPORT_PERIOD: &str = "Last 28 days";

const WEEK_NAMES: [&str; 4] = ["Week 1 (Most Recent)", "Week 2", "Week 3", "Week 4 (Oldest)"];

/// Minimum shift in average mood between halves that counts as a trend.
const MOOD_TREND_MARGIN: f64 = 0.3;

/// Mood-bearing days needed before a trend is reported.
const MOOD_TREND_MIN_DAYS: usize = 4;

// ---------------------------------------------------------------------------
// Output schema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportData {
    pub export_metadata: ExportMetadata,
    pub today: TodaySection,
    pub streaks: StreakSection,
    pub monthly_overview: MonthlyOverview,
    pub daily_log: Option<DailyLogExport>,
    pub daily_log_history: Option<LogHistoryExport>,
    pub context_for_ai: AiContext,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportMetadata {
    pub export_date: NaiveDate,
    /// RFC 3339 UTC timestamp with milliseconds.
    pub export_time: String,
    pub purpose: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodaySection {
    pub date: NaiveDate,
    pub formatted_date: String,
    pub daily_tasks: Vec<TodayTask>,
    pub one_time_tasks: Vec<TodayTask>,
    pub summary: TodaySummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodaySummary {
    pub total_tasks: u32,
    pub completed_tasks: u32,
    pub completion_rate: u8,
    pub daily_tasks_total: u32,
    pub daily_tasks_completed: u32,
    pub once_tasks_total: u32,
    pub once_tasks_completed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreakSection {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub streak_explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyOverview {
    pub period: String,
    pub week_summaries: Vec<ExportWeekSummary>,
    pub overall_stats: OverallStats,
}

/// One 7-day block of the 28-day window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportWeekSummary {
    /// e.g. `Week 1 (Most Recent) (Jan 22 - Jan 28)`.
    pub week: String,
    pub avg_completion: u8,
    pub days_above_80_percent: u32,
    /// Days in the block that had at least one active task.
    pub total_days: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverallStats {
    pub avg_completion_rate: u8,
    pub best_day: DayRate,
    pub worst_day: DayRate,
    pub total_days_above_80: u32,
}

/// A single day's completion rate; `date` is `N/A` when no day qualified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayRate {
    pub date: String,
    pub completion_rate: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyLogExport {
    pub mood: Option<Mood>,
    pub mood_label: Option<String>,
    pub notes: Option<String>,
    pub fields: Option<FieldValues>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogHistoryExport {
    pub period: String,
    pub fields_tracked: Vec<String>,
    pub entries: Vec<LogHistoryEntry>,
    pub patterns: Option<LogPatterns>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogHistoryEntry {
    pub date: NaiveDate,
    pub mood: Option<Mood>,
    pub mood_label: Option<String>,
    pub notes: Option<String>,
    pub fields: Option<FieldValues>,
}

/// Direction of mood between the first and second half of the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodTrend {
    Improving,
    Declining,
    Stable,
}

/// Average value of a tracked field: a number, or an `HH:MM` time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldAverage {
    Number(f64),
    Time(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogPatterns {
    pub avg_mood: Option<f64>,
    pub mood_trend: MoodTrend,
    pub days_logged: usize,
    pub field_averages: Option<FieldValues<FieldAverage>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiContext {
    pub task_types_explanation: String,
    pub streak_criteria: String,
    pub mood_scale: String,
    pub daily_log_fields: String,
    pub data_freshness: String,
}

impl Default for AiContext {
    fn default() -> Self {
        Self {
            task_types_explanation: "daily = recurring habits tracked daily, once = one-time tasks tracked until completed".into(),
            streak_criteria: "Streak continues when daily task completion ≥80%".into(),
            mood_scale: "1 = Very Bad, 2 = Bad, 3 = Okay, 4 = Good, 5 = Great".into(),
            daily_log_fields: "User-configured tracking fields with types (time/number/text). Field values provide daily context for pattern analysis.".into(),
            data_freshness: "All data reflects current state at export time".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Snapshot the export is computed from.
#[derive(Debug, Clone, Copy)]
pub struct ExportInput<'a> {
    /// Active (non-archived) tasks.
    pub tasks: &'a [Task],
    /// The most recent completions.
    pub completions: &'a [Completion],
    /// Present only when daily-log tracking is enabled.
    pub log: Option<LogExportInput<'a>>,
}

#[derive(Debug, Clone, Copy)]
pub struct LogExportInput<'a> {
    /// Active log fields in display order.
    pub fields: &'a [LogField],
    pub today_log: Option<&'a DailyLogWithEntries>,
    /// Logs from the last 28 days, any order.
    pub history: &'a [DailyLogWithEntries],
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Assembles the full export for `today`, stamped with `now`.
pub fn build_export(input: &ExportInput<'_>, today: NaiveDate, now: DateTime<Utc>) -> ExportData {
    let history = history::dashboard_history(input.tasks, input.completions, today);
    let streaks = calculate_streaks(&history);
    let (daily_log, daily_log_history) = match &input.log {
        Some(log) => (
            build_daily_log_export(log.today_log, log.fields),
            build_log_history_export(log.history, log.fields),
        ),
        None => (None, None),
    };

    ExportData {
        export_metadata: ExportMetadata {
            export_date: today,
            export_time: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            purpose: "AI Assistant Context".into(),
        },
        today: build_today_section(input.tasks, input.completions, today),
        streaks: StreakSection {
            current_streak: streaks.current,
            longest_streak: streaks.longest,
            streak_explanation: "Days with ≥80% task completion".into(),
        },
        monthly_overview: MonthlyOverview {
            period: EXPORT_PERIOD.into(),
            week_summaries: build_week_summaries(&history),
            overall_stats: overall_stats(&history),
        },
        daily_log,
        daily_log_history,
        context_for_ai: AiContext::default(),
    }
}

fn build_today_section(tasks: &[Task], completions: &[Completion], today: NaiveDate) -> TodaySection {
    let (daily_tasks, one_time_tasks): (Vec<TodayTask>, Vec<TodayTask>) =
        today_tasks(tasks, completions, today)
            .into_iter()
            .partition(|t| t.task_type == TaskType::Daily);

    let done = |list: &[TodayTask]| list.iter().filter(|t| t.completed).count() as u32;
    let daily_done = done(&daily_tasks);
    let once_done = done(&one_time_tasks);
    let total = (daily_tasks.len() + one_time_tasks.len()) as u32;
    let completed = daily_done + once_done;

    TodaySection {
        date: today,
        formatted_date: dates::long_label(today),
        summary: TodaySummary {
            total_tasks: total,
            completed_tasks: completed,
            completion_rate: percentage(completed, total),
            daily_tasks_total: daily_tasks.len() as u32,
            daily_tasks_completed: daily_done,
            once_tasks_total: one_time_tasks.len() as u32,
            once_tasks_completed: once_done,
        },
        daily_tasks,
        one_time_tasks,
    }
}

/// Splits the last 28 days into four 7-day blocks, most recent first.
///
/// Returns an empty list when fewer than 28 days are available.
pub fn build_week_summaries(history: &[HistoryDay]) -> Vec<ExportWeekSummary> {
    let window_len = history::DASHBOARD_WINDOW_DAYS as usize;
    if history.len() < window_len {
        return Vec::new();
    }
    let window = &history[history.len() - window_len..];

    WEEK_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let start = (3 - i) * 7;
            let block = &window[start..start + 7];
            let with_tasks: Vec<&HistoryDay> = block.iter().filter(|d| d.total > 0).collect();
            ExportWeekSummary {
                week: format!(
                    "{name} ({} - {})",
                    dates::short_label(block[0].date),
                    dates::short_label(block[6].date)
                ),
                avg_completion: mean_percentage(&with_tasks),
                days_above_80_percent: count_above_threshold(&with_tasks),
                total_days: with_tasks.len() as u32,
            }
        })
        .collect()
}

/// Overall completion stats across days that had tasks.
pub fn overall_stats(history: &[HistoryDay]) -> OverallStats {
    let with_tasks: Vec<&HistoryDay> = history.iter().filter(|d| d.total > 0).collect();

    // Running accumulators: ties keep the first day encountered.
    let mut best = DayRate {
        date: "N/A".into(),
        completion_rate: 0,
    };
    let mut worst = DayRate {
        date: "N/A".into(),
        completion_rate: 100,
    };
    for day in &with_tasks {
        if day.percentage > best.completion_rate {
            best = DayRate {
                date: dates::date_key(day.date),
                completion_rate: day.percentage,
            };
        }
        if day.percentage < worst.completion_rate {
            worst = DayRate {
                date: dates::date_key(day.date),
                completion_rate: day.percentage,
            };
        }
    }

    OverallStats {
        avg_completion_rate: mean_percentage(&with_tasks),
        best_day: best,
        worst_day: worst,
        total_days_above_80: count_above_threshold(&with_tasks),
    }
}

fn mean_percentage(days: &[&HistoryDay]) -> u8 {
    if days.is_empty() {
        return 0;
    }
    let sum: u32 = days.iter().map(|d| u32::from(d.percentage)).sum();
    (f64::from(sum) / days.len() as f64).round() as u8
}

fn count_above_threshold(days: &[&HistoryDay]) -> u32 {
    days.iter()
        .filter(|d| d.percentage >= SUCCESS_THRESHOLD)
        .count() as u32
}

fn named_fields(log: &DailyLogWithEntries, fields: &[LogField]) -> Option<FieldValues> {
    let values = FieldValues::from_log(log, fields);
    (!values.is_empty()).then_some(values)
}

fn non_empty(notes: &Option<String>) -> Option<String> {
    notes.as_ref().filter(|n| !n.is_empty()).cloned()
}

/// Today's log, or `None` when nothing was logged today.
pub fn build_daily_log_export(
    today_log: Option<&DailyLogWithEntries>,
    fields: &[LogField],
) -> Option<DailyLogExport> {
    let log = today_log?;
    Some(DailyLogExport {
        mood: log.log.mood,
        mood_label: log.log.mood.map(|m| m.label().to_string()),
        notes: non_empty(&log.log.notes),
        fields: named_fields(log, fields),
    })
}

/// The 28-day log history with patterns, or `None` when empty.
pub fn build_log_history_export(
    logs: &[DailyLogWithEntries],
    fields: &[LogField],
) -> Option<LogHistoryExport> {
    if logs.is_empty() {
        return None;
    }
    let mut sorted: Vec<&DailyLogWithEntries> = logs.iter().collect();
    sorted.sort_by(|a, b| b.log.log_date.cmp(&a.log.log_date));

    let entries = sorted
        .iter()
        .map(|log| LogHistoryEntry {
            date: log.log.log_date,
            mood: log.log.mood,
            mood_label: log.log.mood.map(|m| m.label().to_string()),
            notes: log.log.notes.clone(),
            fields: named_fields(log, fields),
        })
        .collect();

    Some(LogHistoryExport {
        period: EXPORT_PERIOD.into(),
        fields_tracked: fields.iter().map(|f| f.name.clone()).collect(),
        entries,
        patterns: calculate_log_patterns(logs, fields),
    })
}

/// Mood average and trend plus per-field averages over a set of logs.
pub fn calculate_log_patterns(logs: &[DailyLogWithEntries], fields: &[LogField]) -> Option<LogPatterns> {
    if logs.is_empty() {
        return None;
    }

    let mut moods: Vec<(NaiveDate, f64)> = logs
        .iter()
        .filter_map(|l| l.log.mood.map(|m| (l.log.log_date, f64::from(m.value()))))
        .collect();
    moods.sort_by_key(|(date, _)| *date);
    let values: Vec<f64> = moods.iter().map(|(_, m)| *m).collect();

    let avg_mood = (!values.is_empty()).then(|| round1(mean(&values)));

    let field_averages: FieldValues<FieldAverage> = fields
        .iter()
        .filter_map(|field| {
            let raw: Vec<&str> = logs
                .iter()
                .filter_map(|l| l.entry_for(field.id))
                .map(|e| e.value.as_str())
                .filter(|v| !v.is_empty())
                .collect();
            field_average(field.field_type, &raw).map(|avg| (field.name.clone(), avg))
        })
        .collect();

    Some(LogPatterns {
        avg_mood,
        mood_trend: mood_trend(&values),
        days_logged: logs.len(),
        field_averages: (!field_averages.is_empty()).then_some(field_averages),
    })
}

/// Compares the later half of chronologically sorted moods to the earlier
/// half. Fewer than four moods always read as stable.
pub fn mood_trend(moods: &[f64]) -> MoodTrend {
    if moods.len() < MOOD_TREND_MIN_DAYS {
        return MoodTrend::Stable;
    }
    let (first, second) = moods.split_at(moods.len() / 2);
    let (first, second) = (mean(first), mean(second));
    if second > first + MOOD_TREND_MARGIN {
        MoodTrend::Improving
    } else if second < first - MOOD_TREND_MARGIN {
        MoodTrend::Declining
    } else {
        MoodTrend::Stable
    }
}

fn field_average(field_type: FieldType, raw: &[&str]) -> Option<FieldAverage> {
    match field_type {
        FieldType::Text => None,
        FieldType::Number => {
            let nums: Vec<f64> = raw
                .iter()
                .filter_map(|v| v.trim().parse::<f64>().ok())
                .filter(|n| n.is_finite())
                .collect();
            (!nums.is_empty()).then(|| FieldAverage::Number(round1(mean(&nums))))
        }
        FieldType::Time => {
            let minutes: Vec<f64> = raw
                .iter()
                .filter_map(|v| parse_time_of_day(v))
                .map(f64::from)
                .collect();
            (!minutes.is_empty()).then(|| {
                let avg = mean(&minutes).round() as u32;
                FieldAverage::Time(format!("{:02}:{:02}", avg / 60, avg % 60))
            })
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
