//! Core types: events, calendars, day windows, tracing

pub mod event;
pub mod time;
pub mod tracing;

pub use event::{CalendarRef, CalendarSelection, CatalogEntry, Event, TimeOfDay};
pub use time::{Clock, FixedClock, SystemClock, TimeWindow, day_window, local_day_start};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
