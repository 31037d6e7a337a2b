//! Time window and business-hours models.
//!
//! # Time Model
//! All timestamps are UTC (`DateTime<Utc>`). Business hours are interpreted
//! on the UTC calendar; callers operating in a local zone should convert
//! before building policies.
//!
//! # Precedence
//! A timestamp is working time iff its weekday is a working day AND its
//! time of day falls in `[start_hour, end_hour)`.

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeDelta, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// A time interval [start, end).
///
/// Half-open interval: includes start, excludes end.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeWindow {
    /// Interval start (inclusive).
    pub start: DateTime<Utc>,
    /// Interval end (exclusive).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Length of this window.
    #[inline]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whether a timestamp falls within [start, end).
    #[inline]
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        time >= self.start && time < self.end
    }
}

/// Working hours for business-hours-aware SLA arithmetic.
///
/// Hours are whole UTC hours; `end_hour` may be 24 (midnight).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BusinessHours {
    /// First working hour of the day (0..=23).
    pub start_hour: u32,
    /// Hour at which work stops (1..=24, exclusive).
    pub end_hour: u32,
    /// Days on which the window applies.
    pub working_days: Vec<Weekday>,
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self {
            start_hour: 9,
            end_hour: 17,
            working_days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
        }
    }
}

// Longest gap between two working days is under a week.
const MAX_DAY_SCAN: i64 = 8;

impl BusinessHours {
    /// Creates business hours for the given days.
    pub fn new(start_hour: u32, end_hour: u32, working_days: Vec<Weekday>) -> Self {
        Self {
            start_hour,
            end_hour,
            working_days,
        }
    }

    /// Whether the configuration describes a usable working window.
    pub fn is_valid(&self) -> bool {
        self.start_hour < self.end_hour && self.end_hour <= 24 && !self.working_days.is_empty()
    }

    fn is_working_day(&self, day: Weekday) -> bool {
        self.working_days.contains(&day)
    }

    /// Opening and closing instants for the calendar day containing `time`.
    fn day_bounds(&self, time: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let midnight = time.date_naive().and_time(NaiveTime::MIN).and_utc();
        (
            midnight + Duration::hours(self.start_hour as i64),
            midnight + Duration::hours(self.end_hour as i64),
        )
    }

    /// Whether a timestamp is within working time.
    pub fn is_working_time(&self, time: DateTime<Utc>) -> bool {
        if !self.is_valid() || !self.is_working_day(time.weekday()) {
            return false;
        }
        let (open, close) = self.day_bounds(time);
        time >= open && time < close
    }

    /// Finds the next working instant at or after `from`.
    ///
    /// Returns `None` if the configuration has no working time at all.
    pub fn next_working_time(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if !self.is_valid() {
            return None;
        }
        if self.is_working_time(from) {
            return Some(from);
        }

        for offset in 0..MAX_DAY_SCAN {
            let day = from.checked_add_signed(Duration::days(offset))?;
            if !self.is_working_day(day.weekday()) {
                continue;
            }
            let (open, close) = self.day_bounds(day);
            if offset == 0 {
                if from < open {
                    return Some(open);
                }
                if from < close {
                    return Some(from);
                }
                continue;
            }
            return Some(open);
        }

        None
    }

    /// Adds `minutes` of working time to `start`.
    ///
    /// Time outside the working window does not count. Returns `None` if
    /// the configuration has no working time or the result is out of range.
    pub fn add_working_minutes(&self, start: DateTime<Utc>, minutes: i64) -> Option<DateTime<Utc>> {
        let mut cursor = self.next_working_time(start)?;
        let mut remaining = TimeDelta::try_minutes(minutes.max(0))?;

        loop {
            let (_, close) = self.day_bounds(cursor);
            let available = close - cursor;
            if remaining <= available {
                return cursor.checked_add_signed(remaining);
            }
            remaining -= available;
            cursor = self.next_working_time(close)?;
        }
    }
}
