//! Calendar-day ranges, ISO date keys, and week boundaries.
//!
//! All dates are [`NaiveDate`] calendar days; no timezone arithmetic happens
//! here. Callers decide what "today" is and pass it in.

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

/// Format of ISO date keys (`2024-01-31`).
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// An inclusive range of calendar days, `start..=end`.
///
/// An inverted range (`start > end`) is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The `days`-long window ending on (and including) `end`.
    ///
    /// `trailing(today, 28)` covers today minus 27 through today.
    pub fn trailing(end: NaiveDate, days: u32) -> Self {
        let back = u64::from(days.saturating_sub(1));
        let start = end.checked_sub_days(Days::new(back)).unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    /// Number of days in the range.
    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.end - self.start).num_days() as usize + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Iterates the days in ascending order; use `.rev()` for descending.
    pub fn iter(&self) -> DateRangeIter {
        DateRangeIter {
            front: self.start,
            back: self.end,
            done: self.is_empty(),
        }
    }
}

impl IntoIterator for DateRange {
    type Item = NaiveDate;
    type IntoIter = DateRangeIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for &DateRange {
    type Item = NaiveDate;
    type IntoIter = DateRangeIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Double-ended iterator over a [`DateRange`].
#[derive(Debug, Clone)]
pub struct DateRangeIter {
    front: NaiveDate,
    back: NaiveDate,
    done: bool,
}

impl Iterator for DateRangeIter {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        if self.done {
            return None;
        }
        let current = self.front;
        if current == self.back {
            self.done = true;
        } else {
            match current.succ_opt() {
                Some(next) => self.front = next,
                None => self.done = true,
            }
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = if self.done {
            0
        } else {
            (self.back - self.front).num_days() as usize + 1
        };
        (n, Some(n))
    }
}

impl DoubleEndedIterator for DateRangeIter {
    fn next_back(&mut self) -> Option<NaiveDate> {
        if self.done {
            return None;
        }
        let current = self.back;
        if current == self.front {
            self.done = true;
        } else {
            match current.pred_opt() {
                Some(prev) => self.back = prev,
                None => self.done = true,
            }
        }
        Some(current)
    }
}

impl ExactSizeIterator for DateRangeIter {}

/// ISO key for a date (`YYYY-MM-DD`).
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Parses an ISO date key.
pub fn parse_date_key(key: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(key.trim(), DATE_KEY_FORMAT)
}

/// The Monday-to-Sunday week `offset` weeks before the week containing
/// `today`. Sunday belongs to the week that ends on it.
pub fn week_range(today: NaiveDate, offset: u32) -> DateRange {
    let since_monday = u64::from(today.weekday().num_days_from_monday());
    let back = since_monday + u64::from(offset) * 7;
    let start = today.checked_sub_days(Days::new(back)).unwrap_or(NaiveDate::MIN);
    let end = start.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX);
    DateRange { start, end }
}

/// Short month-day label, e.g. `Jan 5`.
pub fn short_label(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// Long label, e.g. `Thursday, October 15, 2026`.
pub fn long_label(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// Week label for history navigation, e.g. `Oct 12 - Oct 18, 2026`.
pub fn week_label(range: &DateRange) -> String {
    format!(
        "{} - {}, {}",
        short_label(range.start),
        short_label(range.end),
        range.end.year()
    )
}
