//! Terminal styling for tally.
//!
//! Ayu-themed colors for completion percentages, pass/fail markers, and
//! moods, gated on terminal color support.

pub mod styles;
pub mod terminal;
