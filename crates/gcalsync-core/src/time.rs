//! Time types for calendar queries.
//!
//! This module provides [`TimeWindow`] for defining query ranges, the
//! local-day helpers used by the day cache, and the [`Clock`] abstraction
//! that lets callers pin "now" in tests.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A time window for querying calendar events.
///
/// Represents a half-open interval `[start, end)` in UTC. When `end` is
/// `None` the window is open-ended and covers everything from `start` on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window (exclusive), if bounded.
    pub end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// Creates a bounded window `[start, end)`.
    ///
    /// If `end` precedes `start` the bounds are swapped so the window is
    /// never inverted.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        if end < start {
            Self {
                start: end,
                end: Some(start),
            }
        } else {
            Self {
                start,
                end: Some(end),
            }
        }
    }

    /// Creates an open-ended window starting at `start`.
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }

    /// Creates a window from a start time and duration.
    pub fn from_duration(start: DateTime<Utc>, duration: Duration) -> Self {
        Self::new(start, start + duration)
    }

    /// Returns true if the window has no upper bound.
    pub fn is_open_ended(&self) -> bool {
        self.end.is_none()
    }

    /// Returns the duration of a bounded window.
    pub fn duration(&self) -> Option<Duration> {
        self.end.map(|end| end - self.start)
    }

    /// Checks if a datetime falls within this window.
    ///
    /// Uses half-open interval semantics: `[start, end)`.
    pub fn contains(&self, dt: DateTime<Utc>) -> bool {
        self.start <= dt && self.end.is_none_or(|end| dt < end)
    }
}

/// Returns the instant at which the local calendar day containing `now`
/// begins in timezone `tz`.
///
/// Midnight may not exist on DST transition days in a few zones; the first
/// valid instant of the day is used in that case.
pub fn local_day_start<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> DateTime<Utc> {
    let date = now.with_timezone(tz).date_naive();
    start_of_date(date, tz).unwrap_or(now)
}

/// Returns the window covering the local calendar day that starts at
/// `day_start`: `[day_start, start of the following local day)`.
pub fn day_window<Tz: TimeZone>(day_start: DateTime<Utc>, tz: &Tz) -> TimeWindow {
    let next = day_start
        .with_timezone(tz)
        .date_naive()
        .succ_opt()
        .and_then(|date| start_of_date(date, tz))
        .unwrap_or(day_start + Duration::days(1));
    TimeWindow::new(day_start, next)
}

fn start_of_date<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<DateTime<Utc>> {
    // Walk forward an hour at a time until we land on a local time that exists.
    (0..24).find_map(|hour| {
        let time = NaiveTime::from_hms_opt(hour, 0, 0)?;
        tz.from_local_datetime(&date.and_time(time))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    })
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    mod time_window {
        use super::*;

        #[test]
        fn creation() {
            let start = utc(2025, 2, 5, 9, 0, 0);
            let end = utc(2025, 2, 5, 17, 0, 0);
            let window = TimeWindow::new(start, end);
            assert_eq!(window.start, start);
            assert_eq!(window.end, Some(end));
            assert_eq!(window.duration(), Some(Duration::hours(8)));
            assert!(!window.is_open_ended());
        }

        #[test]
        fn inverted_bounds_are_swapped() {
            let window = TimeWindow::new(utc(2025, 2, 5, 17, 0, 0), utc(2025, 2, 5, 9, 0, 0));
            assert_eq!(window.start, utc(2025, 2, 5, 9, 0, 0));
            assert_eq!(window.end, Some(utc(2025, 2, 5, 17, 0, 0)));
        }

        #[test]
        fn contains_datetime() {
            let window = TimeWindow::new(utc(2025, 2, 5, 9, 0, 0), utc(2025, 2, 5, 17, 0, 0));

            assert!(window.contains(utc(2025, 2, 5, 10, 0, 0)));
            assert!(window.contains(utc(2025, 2, 5, 9, 0, 0))); // start inclusive
            assert!(!window.contains(utc(2025, 2, 5, 17, 0, 0))); // end exclusive
            assert!(!window.contains(utc(2025, 2, 5, 8, 59, 59)));
        }

        #[test]
        fn open_ended() {
            let window = TimeWindow::starting_at(utc(2025, 2, 5, 9, 0, 0));
            assert!(window.is_open_ended());
            assert!(window.duration().is_none());
            assert!(window.contains(utc(2030, 1, 1, 0, 0, 0)));
            assert!(!window.contains(utc(2025, 2, 5, 8, 0, 0)));
        }

        #[test]
        fn from_duration() {
            let start = utc(2025, 2, 5, 10, 0, 0);
            let window = TimeWindow::from_duration(start, Duration::hours(2));
            assert_eq!(window.end, Some(utc(2025, 2, 5, 12, 0, 0)));
        }

        #[test]
        fn serde_roundtrip() {
            let window = TimeWindow::starting_at(utc(2025, 2, 5, 9, 0, 0));
            let json = serde_json::to_string(&window).unwrap();
            let parsed: TimeWindow = serde_json::from_str(&json).unwrap();
            assert_eq!(window, parsed);
        }
    }

    mod local_day {
        use super::*;

        #[test]
        fn day_start_in_utc() {
            let start = local_day_start(utc(2025, 2, 5, 15, 42, 10), &Utc);
            assert_eq!(start, utc(2025, 2, 5, 0, 0, 0));
        }

        #[test]
        fn day_start_respects_offset() {
            // 01:30 UTC is still the previous evening in UTC-5.
            let tz = FixedOffset::west_opt(5 * 3600).unwrap();
            let start = local_day_start(utc(2025, 2, 5, 1, 30, 0), &tz);
            assert_eq!(start, utc(2025, 2, 4, 5, 0, 0));
        }

        #[test]
        fn day_start_is_idempotent() {
            let tz = FixedOffset::east_opt(2 * 3600).unwrap();
            let start = local_day_start(utc(2025, 7, 1, 12, 0, 0), &tz);
            assert_eq!(local_day_start(start, &tz), start);
        }

        #[test]
        fn day_window_spans_one_day() {
            let start = utc(2025, 2, 5, 0, 0, 0);
            let window = day_window(start, &Utc);
            assert_eq!(window.start, start);
            assert_eq!(window.end, Some(utc(2025, 2, 6, 0, 0, 0)));
        }

        #[test]
        fn fixed_clock_is_stable() {
            let clock = FixedClock(utc(2025, 2, 5, 8, 0, 0));
            assert_eq!(clock.now(), clock.now());
        }
    }
}
