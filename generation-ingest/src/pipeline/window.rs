use std::fmt;

use time::{Date, Duration};

/// Half-open `[start, end)` date interval served by one remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    start: Date,
    end: Date,
}

impl FetchWindow {
    /// `None` unless `start < end`.
    pub fn new(start: Date, end: Date) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    pub fn start(&self) -> Date {
        self.start
    }

    pub fn end(&self) -> Date {
        self.end
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).whole_days()
    }
}

impl fmt::Display for FetchWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// The overall `[start, end)` range one pipeline run covers.
///
/// An empty or inverted span is valid and yields no windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionSpan {
    pub start: Date,
    pub end: Date,
}

impl IngestionSpan {
    pub fn new(start: Date, end: Date) -> Self {
        Self { start, end }
    }

    /// `[today - years, today)`. A Feb 29 that does not exist in the earlier
    /// year becomes Feb 28.
    pub fn trailing_years(today: Date, years: u32) -> Self {
        Self {
            start: years_before(today, years),
            end: today,
        }
    }

    /// Consecutive windows of `width` (at least one day) covering the span;
    /// the last one is clamped to `end`.
    pub fn windows(&self, width: Duration) -> Windows {
        Windows {
            current: self.start,
            end: self.end,
            width: Duration::days(width.whole_days().max(1)),
        }
    }
}

fn years_before(date: Date, years: u32) -> Date {
    let year = date
        .year()
        .saturating_sub(i32::try_from(years).unwrap_or(i32::MAX));
    date.replace_year(year)
        .or_else(|_| Date::from_calendar_date(year, date.month(), 28))
        .unwrap_or(Date::MIN)
}

#[derive(Debug, Clone)]
pub struct Windows {
    current: Date,
    end: Date,
    width: Duration,
}

impl Iterator for Windows {
    type Item = FetchWindow;

    fn next(&mut self) -> Option<FetchWindow> {
        if self.current >= self.end {
            return None;
        }

        let next = self
            .current
            .checked_add(self.width)
            .map_or(self.end, |d| d.min(self.end));
        let window = FetchWindow {
            start: self.current,
            end: next,
        };
        self.current = next;
        Some(window)
    }
}
