//! Core types and the streak/history engine for the tally habit tracker.
//!
//! Everything in this crate is pure: functions take already-fetched
//! snapshots (tasks, completions, logs) plus an explicit `today` and return
//! plain data. Persistence lives in `tally-storage`.

pub mod completion_index;
pub mod daily_log;
pub mod dates;
pub mod enums;
pub mod export;
pub mod history;
pub mod streaks;
pub mod task;
pub mod validation;
pub mod week_view;
