//! Clap CLI definitions for the `tally` command.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tally_core::enums::{FieldType, TaskType};

use crate::session::Direction;

/// tally -- daily habits, streaks, and a mood journal.
#[derive(Parser, Debug)]
#[command(
    name = "tally",
    about = "Habit tracker with streaks, weekly history, and a daily log",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global flags available to all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Database file (default: from .tally/config.yaml).
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// User whose data to read and write (default: config, then $USER).
    #[arg(long, global = true, env = "TALLY_USER")]
    pub user: Option<String>,

    /// Output in JSON format.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose/debug output.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output (errors only).
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize tally in the current directory.
    Init(InitArgs),

    /// Manage tasks.
    Task(TaskArgs),

    /// Mark a task done.
    Done(MarkArgs),

    /// Mark a task failed, with a note.
    Fail(FailArgs),

    /// Clear a task back to not done.
    Undo(MarkArgs),

    /// Show today's tasks.
    Today,

    /// Show the 28-day calendar and streaks.
    Dashboard,

    /// Show current and longest streaks.
    Streaks,

    /// Show a week of history.
    History(HistoryArgs),

    /// Read and write the daily log.
    Log(LogArgs),

    /// Manage custom daily-log fields.
    Field(FieldArgs),

    /// Export a summary of recent activity as JSON.
    Export(ExportArgs),

    /// Show or change configuration.
    Config(ConfigArgs),

    /// Generate shell completions.
    Completion(CompletionArgs),
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Default user to store in the configuration.
    #[arg(long = "default-user")]
    pub default_user: Option<String>,

    /// Disable the daily log.
    #[arg(long)]
    pub no_log: bool,

    /// Rewrite the configuration of an existing project.
    #[arg(long)]
    pub force: bool,
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct TaskArgs {
    #[command(subcommand)]
    pub command: TaskCommands,
}

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Add a task.
    Add(TaskAddArgs),
    /// List tasks.
    List(TaskListArgs),
    /// Rename a task.
    Rename(TaskRenameArgs),
    /// Archive a task (its history is kept).
    Archive(TaskIdArgs),
}

#[derive(Args, Debug)]
pub struct TaskAddArgs {
    /// Task title.
    pub title: String,
    /// daily (repeats every day) or once.
    #[arg(short = 't', long = "type", default_value = "daily")]
    pub task_type: TaskType,
}

#[derive(Args, Debug)]
pub struct TaskListArgs {
    /// Include archived tasks.
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct TaskRenameArgs {
    pub id: i64,
    /// New title.
    pub title: String,
}

#[derive(Args, Debug)]
pub struct TaskIdArgs {
    pub id: i64,
}

// ---------------------------------------------------------------------------
// Marking
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct MarkArgs {
    /// Task ID.
    pub id: i64,
    /// Day to mark (YYYY-MM-DD, default today).
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct FailArgs {
    /// Task ID.
    pub id: i64,
    /// Why the task was not done.
    #[arg(short = 'n', long)]
    pub note: String,
    /// Day to mark (YYYY-MM-DD, default today).
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Weeks back from the current week (0-11).
    #[arg(short = 'w', long, default_value_t = 0)]
    pub week: i64,
}

// ---------------------------------------------------------------------------
// Daily log
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct LogArgs {
    #[command(subcommand)]
    pub command: LogCommands,
}

#[derive(Subcommand, Debug)]
pub enum LogCommands {
    /// Show the log for a day.
    Show(LogDateArgs),
    /// Set (or clear) the mood, 1-5.
    Mood(LogMoodArgs),
    /// Set the notes; an empty string clears them.
    Notes(LogNotesArgs),
    /// Set a custom field value.
    Set(LogSetArgs),
}

#[derive(Args, Debug)]
pub struct LogDateArgs {
    /// Day (YYYY-MM-DD, default today).
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct LogMoodArgs {
    /// 1 Very Bad, 2 Bad, 3 Okay, 4 Good, 5 Great.
    #[arg(required_unless_present = "clear", conflicts_with = "clear")]
    pub mood: Option<i64>,
    /// Remove the mood.
    #[arg(long)]
    pub clear: bool,
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct LogNotesArgs {
    pub notes: String,
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct LogSetArgs {
    /// Field ID or name.
    pub field: String,
    /// Value (number, HH:MM, or text depending on the field).
    pub value: String,
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Log fields
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct FieldArgs {
    #[command(subcommand)]
    pub command: FieldCommands,
}

#[derive(Subcommand, Debug)]
pub enum FieldCommands {
    /// Add a field at the end of the list.
    Add(FieldAddArgs),
    /// List active fields in display order.
    List,
    /// Remove a field (past values are kept).
    Remove(FieldIdArgs),
    /// Move a field one place up or down.
    Move(FieldMoveArgs),
}

#[derive(Args, Debug)]
pub struct FieldAddArgs {
    pub name: String,
    #[arg(short = 't', long = "type", default_value = "text")]
    pub field_type: FieldType,
}

#[derive(Args, Debug)]
pub struct FieldIdArgs {
    pub id: i64,
}

#[derive(Args, Debug)]
pub struct FieldMoveArgs {
    pub id: i64,
    /// `up` or `down`.
    pub direction: Direction,
}

// ---------------------------------------------------------------------------
// Export, config, completion
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Write to a file instead of stdout.
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration.
    Show,
    /// Get one value.
    Get(ConfigGetArgs),
    /// Set one value in .tally/config.yaml.
    Set(ConfigSetArgs),
}

#[derive(Args, Debug)]
pub struct ConfigGetArgs {
    pub key: String,
}

#[derive(Args, Debug)]
pub struct ConfigSetArgs {
    pub key: String,
    pub value: String,
}

#[derive(Args, Debug)]
pub struct CompletionArgs {
    #[command(subcommand)]
    pub command: CompletionCommands,
}

#[derive(Subcommand, Debug)]
pub enum CompletionCommands {
    /// Generate Bash completions.
    Bash,
    /// Generate Zsh completions.
    Zsh,
    /// Generate Fish completions.
    Fish,
    /// Generate PowerShell completions.
    Powershell,
}
