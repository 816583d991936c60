//! Current and longest streaks of successful days.
//!
//! A day is successful when it had at least one active daily task and hit
//! [`SUCCESS_THRESHOLD`](crate::history::SUCCESS_THRESHOLD). Neutral days
//! (no active tasks) are skipped by both counters.

use serde::{Deserialize, Serialize};

use crate::history::HistoryDay;

/// Streak counters derived from an ascending history series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streaks {
    pub current: u32,
    pub longest: u32,
}

/// Derives both streaks from `history` (oldest first).
pub fn calculate_streaks(history: &[HistoryDay]) -> Streaks {
    let current = current_streak(history);
    let longest = longest_streak(history);
    Streaks {
        current,
        longest: longest.max(current),
    }
}

/// Counts successful days backward from the most recent day, stopping at
/// the first failed day.
fn current_streak(history: &[HistoryDay]) -> u32 {
    let mut streak = 0;
    for day in history.iter().rev() {
        if day.is_neutral() {
            continue;
        }
        if !day.is_successful() {
            break;
        }
        streak += 1;
    }
    streak
}

fn longest_streak(history: &[HistoryDay]) -> u32 {
    let mut run = 0;
    let mut best = 0;
    for day in history {
        if day.is_successful() {
            run += 1;
            best = best.max(run);
        } else if day.is_failed() {
            run = 0;
        }
    }
    best
}
