//! Event and calendar types.
//!
//! This module provides the provider-agnostic shapes the rest of the
//! workspace passes around:
//! - [`Event`]: a normalized event reduced to summary and local times of day
//! - [`TimeOfDay`]: a wall-clock time rendered as `hh:mm am`
//! - [`CalendarRef`]: a remote calendar (id + display name)
//! - [`CalendarSelection`]: an operator-selected calendar with a display weight
//! - [`CatalogEntry`]: a remote calendar merged with its selection state

use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// A local wall-clock time of day.
///
/// Displayed in 12-hour form with a lowercase meridiem, e.g. `09:30 am`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    /// Midnight, used as the render for times that could not be parsed.
    pub const MIDNIGHT: Self = Self(NaiveTime::MIN);

    /// Wraps a naive time.
    pub fn new(time: NaiveTime) -> Self {
        Self(time)
    }

    /// Creates a time of day from hour and minute, if valid.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Returns the wrapped naive time.
    pub fn time(&self) -> NaiveTime {
        self.0
    }

    /// Returns the hour (0-23).
    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u32 {
        self.0.minute()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%I:%M %P"))
    }
}

/// A normalized calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// The event title.
    pub summary: String,
    /// Local start time.
    pub start: TimeOfDay,
    /// Local end time.
    pub end: TimeOfDay,
}

impl Event {
    /// Creates a new event.
    pub fn new(summary: impl Into<String>, start: TimeOfDay, end: TimeOfDay) -> Self {
        Self {
            summary: summary.into(),
            start,
            end,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}  {}", self.start, self.end, self.summary)
    }
}

/// A calendar visible to the authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalendarRef {
    /// Provider calendar id (natural key).
    pub id: String,
    /// Human-readable name.
    pub name: String,
}

impl CalendarRef {
    /// Creates a new calendar reference.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// An operator-selected calendar with its display weight.
///
/// Stored as part of the `calendars` configuration entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarSelection {
    /// Provider calendar id.
    pub id: String,
    /// Calendar name at the time of selection.
    #[serde(default)]
    pub name: String,
    /// Sort key; lower weights are listed first.
    pub weight: i64,
}

impl CalendarSelection {
    /// Creates a new selection entry.
    pub fn new(id: impl Into<String>, name: impl Into<String>, weight: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            weight,
        }
    }
}

/// A remote calendar merged with the configured selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Provider calendar id.
    pub id: String,
    /// Human-readable name from the provider.
    pub name: String,
    /// Effective sort weight.
    pub weight: i64,
    /// Whether the operator selected this calendar.
    pub selected: bool,
}
