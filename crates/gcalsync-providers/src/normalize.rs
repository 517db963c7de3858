//! RawEvent to Event conversion.
//!
//! Each raw start/end is resolved in three steps:
//! 1. A precise date-time wins over an all-day date.
//! 2. The chosen value is parsed as RFC 3339, then as a plain date, then as a
//!    handful of naive date-time layouts interpreted in the target timezone.
//! 3. A value that still cannot be parsed renders as midnight, so the event is
//!    kept rather than dropped.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use gcalsync_core::{Event, TimeOfDay};

use crate::raw_event::{RawEvent, RawEventTime};

/// Naive layouts tried after RFC 3339 and plain dates.
const NAIVE_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Converts a [`RawEvent`] to an [`Event`] in the local timezone.
pub fn normalize_event(raw: &RawEvent) -> Event {
    normalize_event_in(raw, &Local)
}

/// Converts raw events in order, in the local timezone.
pub fn normalize_events(raw: &[RawEvent]) -> Vec<Event> {
    raw.iter().map(normalize_event).collect()
}

/// Converts a [`RawEvent`] to an [`Event`], rendering times in `tz`.
pub fn normalize_event_in<Tz: TimeZone>(raw: &RawEvent, tz: &Tz) -> Event {
    Event::new(
        raw.title(),
        time_of_day(&raw.start, tz),
        time_of_day(&raw.end, tz),
    )
}

fn time_of_day<Tz: TimeZone>(raw: &RawEventTime, tz: &Tz) -> TimeOfDay {
    match raw.preferred().and_then(|value| parse_time(value, tz)) {
        Some(time) => TimeOfDay::new(time),
        None => {
            tracing::debug!(value = ?raw.preferred(), "unparseable event time, using midnight");
            TimeOfDay::MIDNIGHT
        }
    }
}

fn parse_time<Tz: TimeZone>(value: &str, tz: &Tz) -> Option<NaiveTime> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(tz).time());
    }

    // All-day events start at midnight of their date.
    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok() {
        return Some(NaiveTime::MIN);
    }

    NAIVE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(value, layout).ok())
        .map(|naive| naive.time())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn timed(start: &str, end: &str) -> RawEvent {
        RawEvent::new(
            "Standup",
            RawEventTime::date_time(start),
            RawEventTime::date_time(end),
        )
    }

    #[test]
    fn date_time_is_rendered_in_target_zone() {
        let raw = timed("2025-03-10T09:00:00Z", "2025-03-10T09:15:00Z");

        let event = normalize_event_in(&raw, &Utc);
        assert_eq!(event.summary, "Standup");
        assert_eq!(event.start.to_string(), "09:00 am");
        assert_eq!(event.end.to_string(), "09:15 am");

        let paris = FixedOffset::east_opt(3600).unwrap();
        let event = normalize_event_in(&raw, &paris);
        assert_eq!(event.start.to_string(), "10:00 am");
    }

    #[test]
    fn offset_is_respected() {
        let raw = timed("2025-03-10T14:30:00-05:00", "2025-03-10T15:00:00-05:00");
        let event = normalize_event_in(&raw, &Utc);
        assert_eq!(event.start.to_string(), "07:30 pm");
        assert_eq!(event.end.to_string(), "08:00 pm");
    }

    #[test]
    fn all_day_falls_back_to_date() {
        let raw = RawEvent::new(
            "Holiday",
            RawEventTime::date("2025-03-10"),
            RawEventTime::date("2025-03-11"),
        );
        let event = normalize_event_in(&raw, &Utc);
        assert_eq!(event.start, TimeOfDay::MIDNIGHT);
        assert_eq!(event.end, TimeOfDay::MIDNIGHT);
        assert_eq!(event.start.to_string(), "12:00 am");
    }

    #[test]
    fn naive_date_time_is_parsed() {
        let raw = timed("2025-03-10T16:45:00", "2025-03-10 17:30");
        let event = normalize_event_in(&raw, &Utc);
        assert_eq!(event.start.to_string(), "04:45 pm");
        assert_eq!(event.end.to_string(), "05:30 pm");
    }

    #[test]
    fn unparseable_times_are_kept() {
        let raw = RawEvent {
            summary: None,
            start: RawEventTime::date_time("tomorrow-ish"),
            end: RawEventTime::default(),
            ..RawEvent::default()
        };
        let event = normalize_event_in(&raw, &Utc);
        assert_eq!(event.summary, "");
        assert_eq!(event.start, TimeOfDay::MIDNIGHT);
        assert_eq!(event.end, TimeOfDay::MIDNIGHT);
    }

    #[test]
    fn normalize_events_preserves_order() {
        let raw = vec![
            timed("2025-03-10T11:00:00Z", "2025-03-10T12:00:00Z"),
            timed("2025-03-10T08:00:00Z", "2025-03-10T09:00:00Z"),
        ];
        let events: Vec<_> = raw.iter().map(|r| normalize_event_in(r, &Utc)).collect();
        assert_eq!(events[0].start.hour(), 11);
        assert_eq!(events[1].start.hour(), 8);
        assert_eq!(normalize_events(&raw).len(), 2);
    }
}
