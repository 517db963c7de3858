//! Per-calendar cache of today's events.
//!
//! Each calendar has at most one [`DayCacheEntry`] in the [`StateStore`].
//! An entry is only valid for the local calendar day it was fetched on;
//! entries from an earlier day are stale whatever they contain.
//!
//! Entries carry a `fetched` flag so that a day with legitimately no events
//! is not refetched on every read. Entries written without the flag count
//! as fetched only when they hold events.

use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use gcalsync_core::{Clock, Event, day_window, local_day_start};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::fetcher::EventFetcher;
use crate::store::StateStore;
use crate::token_manager::AuthSession;

/// Cached events for one calendar and one local day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCacheEntry {
    /// Calendar the events belong to.
    pub calendar_id: String,
    /// Start of the local calendar day the entry covers.
    pub day_start: DateTime<Utc>,
    /// Events in provider order.
    #[serde(default)]
    pub events: Vec<Event>,
    /// Whether a fetch was attempted for `day_start`.
    #[serde(default)]
    pub fetched: bool,
}

impl DayCacheEntry {
    /// Creates an entry recording a fetch attempt for `day_start`.
    pub fn fetched(
        calendar_id: impl Into<String>,
        day_start: DateTime<Utc>,
        events: Vec<Event>,
    ) -> Self {
        Self {
            calendar_id: calendar_id.into(),
            day_start,
            events,
            fetched: true,
        }
    }

    /// Returns true if the entry can be served on the day starting at
    /// `today_start`.
    pub fn is_fresh_for(&self, today_start: DateTime<Utc>) -> bool {
        self.day_start == today_start && (self.fetched || !self.events.is_empty())
    }
}

/// Where a [`TodayEvents`] result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
    /// Served from a fresh entry without a remote call.
    Cache,
    /// Fetched from the provider and stored.
    Fetched,
    /// The provider had no events today; an empty entry was stored.
    Empty,
    /// The fetch failed; an empty entry was stored.
    FetchFailed,
    /// A refresh was needed but the session is not authenticated. Nothing
    /// was stored.
    Unavailable,
}

impl CacheSource {
    /// Returns true if the provider answered during this read.
    pub fn is_refreshed(self) -> bool {
        matches!(self, Self::Fetched | Self::Empty)
    }
}

/// Result of reading today's events for one calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodayEvents {
    /// Events in provider order, possibly empty.
    pub events: Vec<Event>,
    /// How the events were obtained.
    pub source: CacheSource,
}

impl TodayEvents {
    fn new(events: Vec<Event>, source: CacheSource) -> Self {
        Self { events, source }
    }
}

/// Day-scoped event cache over a [`StateStore`].
pub struct EventCache {
    state: Arc<dyn StateStore>,
    clock: Arc<dyn Clock>,
}

impl EventCache {
    /// Creates a cache over `state`.
    pub fn new(state: Arc<dyn StateStore>, clock: Arc<dyn Clock>) -> Self {
        Self { state, clock }
    }

    /// Returns the start of the current local calendar day.
    pub fn today_start(&self) -> DateTime<Utc> {
        local_day_start(self.clock.now(), &Local)
    }

    /// Returns the stored entry for `calendar_id`, fresh or not.
    pub fn entry(&self, calendar_id: &str) -> Option<DayCacheEntry> {
        self.state.get(calendar_id)
    }

    /// Returns today's events for `calendar_id`.
    ///
    /// See [`EventCache::read_today`].
    pub async fn today_events(
        &self,
        fetcher: &EventFetcher,
        session: &AuthSession,
        calendar_id: &str,
        force: bool,
    ) -> Vec<Event> {
        self.read_today(fetcher, session, calendar_id, force)
            .await
            .events
    }

    /// Reads today's events for `calendar_id`, refreshing when forced or
    /// when the stored entry is missing, empty and unfetched, or from
    /// another day.
    ///
    /// A failed refresh stores an empty, fetched entry for today so the
    /// calendar is not refetched again until tomorrow or a forced read.
    /// Never fails; store write errors are logged.
    pub async fn read_today(
        &self,
        fetcher: &EventFetcher,
        session: &AuthSession,
        calendar_id: &str,
        force: bool,
    ) -> TodayEvents {
        let today_start = self.today_start();
        let fresh = self
            .state
            .get(calendar_id)
            .filter(|entry| entry.is_fresh_for(today_start));

        if !force && let Some(entry) = &fresh {
            debug!(calendar_id = %calendar_id, count = entry.events.len(), "cache hit");
            return TodayEvents::new(entry.events.clone(), CacheSource::Cache);
        }

        if !session.is_authenticated() {
            debug!(calendar_id = %calendar_id, "not authenticated, skipping refresh");
            let events = fresh.map(|entry| entry.events).unwrap_or_default();
            return TodayEvents::new(events, CacheSource::Unavailable);
        }

        debug!(calendar_id = %calendar_id, force, "refreshing today's events");
        let window = day_window(today_start, &Local);
        let (events, source) = match fetcher
            .fetch_events(session, calendar_id, Some(window))
            .await
        {
            Ok(events) => (events, CacheSource::Fetched),
            Err(e) if e.is_no_events() => {
                debug!(calendar_id = %calendar_id, "no events today");
                (Vec::new(), CacheSource::Empty)
            }
            Err(e) => {
                warn!(calendar_id = %calendar_id, error = %e, "failed to fetch today's events");
                (Vec::new(), CacheSource::FetchFailed)
            }
        };

        let entry = DayCacheEntry::fetched(calendar_id, today_start, events.clone());
        if let Err(e) = self.state.set(entry) {
            warn!(calendar_id = %calendar_id, error = %e, "failed to store cache entry");
        }

        TodayEvents::new(events, source)
    }
}
