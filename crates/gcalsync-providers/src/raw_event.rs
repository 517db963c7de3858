//! Raw event records as returned by a provider.
//!
//! Times are kept as the provider sent them; parsing and the date-time versus
//! all-day fallback happen during normalization so that malformed values
//! still produce an event.

use serde::{Deserialize, Serialize};

/// Start or end of a raw event.
///
/// Timed events carry `date_time` (RFC 3339); all-day events carry `date`
/// (`YYYY-MM-DD`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEventTime {
    /// Precise date-time, if the event is timed.
    #[serde(default)]
    pub date_time: Option<String>,
    /// Calendar date, if the event is all-day.
    #[serde(default)]
    pub date: Option<String>,
    /// IANA timezone the provider associated with the time.
    #[serde(default)]
    pub time_zone: Option<String>,
}

impl RawEventTime {
    /// Creates a timed value.
    pub fn date_time(value: impl Into<String>) -> Self {
        Self {
            date_time: Some(value.into()),
            ..Self::default()
        }
    }

    /// Creates an all-day value.
    pub fn date(value: impl Into<String>) -> Self {
        Self {
            date: Some(value.into()),
            ..Self::default()
        }
    }

    /// Returns the preferred textual value: the date-time when present and
    /// non-empty, otherwise the all-day date.
    pub fn preferred(&self) -> Option<&str> {
        self.date_time
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.date.as_deref().filter(|s| !s.is_empty()))
    }

    /// Returns true if only an all-day date is available.
    pub fn is_all_day(&self) -> bool {
        self.date_time.as_deref().is_none_or(str::is_empty) && self.date.is_some()
    }
}

/// A raw calendar event from a provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Provider event id.
    #[serde(default)]
    pub id: Option<String>,
    /// Event title.
    #[serde(default)]
    pub summary: Option<String>,
    /// When the event starts.
    #[serde(default)]
    pub start: RawEventTime,
    /// When the event ends.
    #[serde(default)]
    pub end: RawEventTime,
    /// Event status (e.g. "confirmed", "cancelled").
    #[serde(default)]
    pub status: Option<String>,
}

impl RawEvent {
    /// Creates a raw event with a title and start/end values.
    pub fn new(summary: impl Into<String>, start: RawEventTime, end: RawEventTime) -> Self {
        Self {
            id: None,
            summary: Some(summary.into()),
            start,
            end,
            status: None,
        }
    }

    /// Builder method to set the id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Returns the title, or an empty string if the provider sent none.
    pub fn title(&self) -> &str {
        self.summary.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferred_uses_date_time_first() {
        let time = RawEventTime {
            date_time: Some("2025-03-10T09:00:00Z".to_string()),
            date: Some("2025-03-10".to_string()),
            time_zone: None,
        };
        assert_eq!(time.preferred(), Some("2025-03-10T09:00:00Z"));
        assert!(!time.is_all_day());
    }

    #[test]
    fn preferred_falls_back_to_date() {
        let time = RawEventTime::date("2025-03-10");
        assert_eq!(time.preferred(), Some("2025-03-10"));
        assert!(time.is_all_day());

        let time = RawEventTime {
            date_time: Some(String::new()),
            date: Some("2025-03-10".to_string()),
            time_zone: None,
        };
        assert_eq!(time.preferred(), Some("2025-03-10"));
    }

    #[test]
    fn preferred_is_none_when_empty() {
        assert_eq!(RawEventTime::default().preferred(), None);
    }

    #[test]
    fn deserializes_provider_shape() {
        let json = r#"{
            "id": "evt1",
            "summary": "Planning",
            "start": {"dateTime": "2025-03-10T09:00:00+01:00", "timeZone": "Europe/Paris"},
            "end": {"dateTime": "2025-03-10T10:00:00+01:00"}
        }"#;
        let event: RawEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.title(), "Planning");
        assert_eq!(event.start.time_zone.as_deref(), Some("Europe/Paris"));
        assert!(event.end.date.is_none());
    }
}
