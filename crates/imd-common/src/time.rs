//! Request date windows.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::catalog::ParameterSpec;
use crate::error::{ImdError, ImdResult};

/// Input format for request dates.
pub const REQUEST_DATE_FORMAT: &str = "%Y-%m-%d";

/// An inclusive range of calendar days, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Validate a requested window against a catalog entry.
    ///
    /// `end` defaults to `start`, a reversed window is swapped rather than
    /// rejected, and a start before the first published day fails with
    /// [`ImdError::DataUnavailable`].
    pub fn resolve(spec: &ParameterSpec, start: Option<&str>, end: Option<&str>) -> ImdResult<Self> {
        let start = match start.map(str::trim) {
            Some(s) if !s.is_empty() => s,
            _ => return Err(ImdError::MissingStartDate),
        };
        let end = match end.map(str::trim) {
            Some(e) if !e.is_empty() => e,
            _ => start,
        };

        let window = Self::new(parse_date(start)?, parse_date(end)?);

        if window.start < spec.earliest_date {
            return Err(ImdError::DataUnavailable {
                parameter: spec.id(),
                earliest: spec.earliest_date,
            });
        }

        Ok(window)
    }

    /// Build a window from two dates in either order.
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        if a > b {
            Self { start: b, end: a }
        } else {
            Self { start: a, end: b }
        }
    }

    /// Single-day window.
    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days in the window, both ends included.
    pub fn total_days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Every day of the window in ascending order. Each call starts afresh.
    pub fn dates(&self) -> DateIter {
        DateIter {
            next: self.start,
            remaining: self.total_days(),
        }
    }
}

impl IntoIterator for &DateWindow {
    type Item = NaiveDate;
    type IntoIter = DateIter;

    fn into_iter(self) -> DateIter {
        self.dates()
    }
}

/// Iterator over the days of a [`DateWindow`].
#[derive(Debug, Clone)]
pub struct DateIter {
    next: NaiveDate,
    remaining: usize,
}

impl Iterator for DateIter {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.next;
        self.remaining -= 1;
        if self.remaining > 0 {
            self.next = current + Duration::days(1);
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for DateIter {}

/// Parse a `YYYY-MM-DD` request date.
pub fn parse_date(s: &str) -> ImdResult<NaiveDate> {
    NaiveDate::parse_from_str(s, REQUEST_DATE_FORMAT)
        .map_err(|_| ImdError::InvalidDateFormat(s.to_string()))
}
