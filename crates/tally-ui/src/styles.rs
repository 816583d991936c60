//! Ayu color theme and styling helpers for tally output.
//!
//! Color source: <https://github.com/ayu-theme/ayu-colors>

use owo_colors::OwoColorize;
use tally_core::daily_log::Mood;
use tally_core::history::HistoryDay;

use crate::terminal::supports_color;

/// An RGB triple.
pub type Rgb = (u8, u8, u8);

const PASS: Rgb = (0xc2, 0xd9, 0x4c); // #c2d94c
const FAIL: Rgb = (0xf0, 0x71, 0x78); // #f07178
const MUTED: Rgb = (0x6c, 0x76, 0x80); // #6c7680
const ACCENT: Rgb = (0x59, 0xc2, 0xff); // #59c2ff

// Completion buckets
const PCT_NONE: Rgb = MUTED;
const PCT_LOW: Rgb = (0xf0, 0x71, 0x78); // red
const PCT_BELOW_HALF: Rgb = (0xff, 0x8f, 0x40); // orange
const PCT_ABOVE_HALF: Rgb = (0xff, 0xb4, 0x54); // yellow
const PCT_HIGH: Rgb = (0xaa, 0xd9, 0x4c); // lime
const PCT_FULL: Rgb = (0x7f, 0xd9, 0x62); // green

pub const ICON_DONE: &str = "\u{2713}"; // ✓
pub const ICON_FAILED: &str = "\u{2716}"; // ✖
pub const ICON_OPEN: &str = "\u{25CB}"; // ○
pub const ICON_NEUTRAL: &str = "\u{00B7}"; // ·
pub const CELL_FILLED: &str = "\u{25A0}"; // ■


fn color_str(s: &str, rgb: Rgb) -> String {
    if supports_color() {
        s.truecolor(rgb.0, rgb.1, rgb.2).to_string()
    } else {
        s.to_string()
    }
}

/// The color bucket for a completion percentage.
pub fn percentage_color(percentage: u8) -> Rgb {
    match percentage {
        0 => PCT_NONE,
        1..=24 => PCT_LOW,
        25..=49 => PCT_BELOW_HALF,
        50..=74 => PCT_ABOVE_HALF,
        75..=99 => PCT_HIGH,
        _ => PCT_FULL,
    }
}

/// `"80%"`, colored by bucket.
pub fn render_percentage(percentage: u8) -> String {
    color_str(&format!("{percentage}%"), percentage_color(percentage))
}

/// One dashboard cell: a dot for a day without tasks, else a colored block.
pub fn render_day_cell(day: &HistoryDay) -> String {
    if day.is_neutral() {
        render_muted(ICON_NEUTRAL)
    } else {
        color_str(CELL_FILLED, percentage_color(day.percentage))
    }
}

pub fn render_pass(s: &str) -> String {
    color_str(s, PASS)
}

pub fn render_fail(s: &str) -> String {
    color_str(s, FAIL)
}

pub fn render_muted(s: &str) -> String {
    color_str(s, MUTED)
}

/// Bold accent, used for section headers.
pub fn render_header(s: &str) -> String {
    if supports_color() {
        s.truecolor(ACCENT.0, ACCENT.1, ACCENT.2).bold().to_string()
    } else {
        s.to_string()
    }
}

/// Checkmark, cross, or hollow circle for a habit's state on a day.
pub fn render_status_icon(completed: bool, failed: bool) -> String {
    match (completed, failed) {
        (true, _) => render_pass(ICON_DONE),
        (false, true) => render_fail(ICON_FAILED),
        (false, false) => render_muted(ICON_OPEN),
    }
}

/// `"🙂 Good (4)"`.
pub fn render_mood(mood: Mood) -> String {
    format!("{} {} ({})", mood.emoji(), mood.label(), mood.value())
}
