//! The sync facade wiring tokens, catalog, fetcher and cache together.

use std::sync::Arc;
use std::time::Duration;

use gcalsync_core::{
    CalendarRef, CalendarSelection, CatalogEntry, Clock, Event, SystemClock, TimeWindow,
};
use gcalsync_providers::{DEFAULT_MAX_RESULTS, EventOrder, ProviderFactory, Token};
use tracing::{info, warn};

use crate::cache::{CacheSource, EventCache, TodayEvents};
use crate::catalog::{CalendarCatalog, merge_with_selection};
use crate::error::SyncResult;
use crate::fetcher::{EventFetcher, FetchParams};
use crate::settings::Settings;
use crate::store::{ConfigStore, StateStore};
use crate::token_manager::{AuthSession, TokenManager};

/// Default bound on every remote call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Tuning for [`CalendarSync`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Bound on each remote call; an elapsed call counts as a network failure.
    pub request_timeout: Duration,
    /// Maximum events per query.
    pub max_results: u32,
    /// Event ordering.
    pub order_by: EventOrder,
    /// Whether recurring events are expanded into instances.
    pub single_events: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_results: DEFAULT_MAX_RESULTS,
            order_by: EventOrder::StartTime,
            single_events: true,
        }
    }
}

impl SyncOptions {
    /// Builder method to set the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Builder method to set the maximum events per query.
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    /// Builder method to set the event ordering.
    pub fn with_order_by(mut self, order_by: EventOrder) -> Self {
        self.order_by = order_by;
        self
    }

    /// Builder method to toggle recurring event expansion.
    pub fn with_single_events(mut self, single_events: bool) -> Self {
        self.single_events = single_events;
        self
    }

    fn fetch_params(&self) -> FetchParams {
        FetchParams {
            max_results: self.max_results,
            order_by: self.order_by,
            single_events: self.single_events,
        }
    }
}

/// Outcome of rebuilding one calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildOutcome {
    /// Calendar id.
    pub calendar_id: String,
    /// How the entry was refreshed.
    pub source: CacheSource,
    /// Number of events now cached.
    pub events: usize,
}

/// Per-calendar results of [`CalendarSync::rebuild_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebuildReport {
    /// One outcome per remote calendar, in provider order.
    pub outcomes: Vec<RebuildOutcome>,
}

impl RebuildReport {
    /// Returns the number of calendars the provider answered for, including
    /// calendars with no events today.
    pub fn refreshed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.source.is_refreshed())
            .count()
    }

    /// Returns the ids of calendars whose refresh failed.
    pub fn failed(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|outcome| !outcome.source.is_refreshed())
            .map(|outcome| outcome.calendar_id.as_str())
            .collect()
    }

    /// Returns true if no calendar was processed.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Google Calendar sync over a config store and a state store.
///
/// Every operation that talks to the provider takes the [`AuthSession`]
/// returned by [`CalendarSync::validate`]; without an authenticated session
/// those operations return empty results.
pub struct CalendarSync {
    settings: Settings,
    tokens: TokenManager,
    catalog: CalendarCatalog,
    fetcher: EventFetcher,
    cache: EventCache,
}

impl CalendarSync {
    /// Creates a sync facade using the system clock.
    pub fn new(
        config: Arc<dyn ConfigStore>,
        state: Arc<dyn StateStore>,
        factory: Arc<dyn ProviderFactory>,
        options: SyncOptions,
    ) -> Self {
        Self::with_clock(config, state, factory, options, Arc::new(SystemClock))
    }

    /// Creates a sync facade with an explicit clock.
    pub fn with_clock(
        config: Arc<dyn ConfigStore>,
        state: Arc<dyn StateStore>,
        factory: Arc<dyn ProviderFactory>,
        options: SyncOptions,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let settings = Settings::new(config);
        let timeout = options.request_timeout;
        Self {
            tokens: TokenManager::new(settings.clone(), factory, clock.clone(), timeout),
            catalog: CalendarCatalog::new(timeout),
            fetcher: EventFetcher::new(options.fetch_params(), clock.clone(), timeout),
            cache: EventCache::new(state, clock),
            settings,
        }
    }

    /// Returns the settings view.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the event cache.
    pub fn cache(&self) -> &EventCache {
        &self.cache
    }

    /// Returns true iff client id and secret are configured.
    pub fn has_credentials(&self) -> bool {
        self.tokens.has_credentials()
    }

    /// Validates credentials and token. See [`TokenManager::validate`].
    pub async fn validate(&self) -> AuthSession {
        self.tokens.validate().await
    }

    /// Returns the authorization URL, empty without credentials.
    pub fn auth_url(&self) -> String {
        self.tokens.auth_url()
    }

    /// Exchanges a verification code. See [`TokenManager::exchange_code`].
    pub async fn exchange_code(&self, code: &str) -> SyncResult<Option<Token>> {
        self.tokens.exchange_code(code).await
    }

    /// Lists remote calendars, empty on failure.
    pub async fn list_calendars(&self, session: &AuthSession) -> Vec<CalendarRef> {
        self.catalog.list_remote_calendars(session).await
    }

    /// Lists remote calendars merged with the configured selection.
    pub async fn catalog(&self, session: &AuthSession) -> Vec<CatalogEntry> {
        let remote = self.list_calendars(session).await;
        merge_with_selection(&remote, &self.settings.calendar_selection())
    }

    /// Returns the configured calendar selection.
    pub fn available_calendars(&self) -> Vec<CalendarSelection> {
        self.settings.calendar_selection()
    }

    /// Returns today's events for `calendar_id`, from cache when fresh.
    pub async fn today_events(
        &self,
        session: &AuthSession,
        calendar_id: &str,
        force: bool,
    ) -> Vec<Event> {
        self.cache
            .today_events(&self.fetcher, session, calendar_id, force)
            .await
    }

    /// Like [`CalendarSync::today_events`], also reporting where the events
    /// came from.
    pub async fn read_today(
        &self,
        session: &AuthSession,
        calendar_id: &str,
        force: bool,
    ) -> TodayEvents {
        self.cache
            .read_today(&self.fetcher, session, calendar_id, force)
            .await
    }

    /// Fetches events for `calendar_id` directly, bypassing the cache.
    pub async fn fetch_events(
        &self,
        session: &AuthSession,
        calendar_id: &str,
        window: Option<TimeWindow>,
    ) -> SyncResult<Vec<Event>> {
        self.fetcher.fetch_events(session, calendar_id, window).await
    }

    /// Force-refreshes today's events for every remote calendar.
    ///
    /// Calendars are processed in turn; a failure on one is recorded in the
    /// report and does not stop the others.
    pub async fn rebuild_all(&self, session: &AuthSession) -> RebuildReport {
        let calendars = self.list_calendars(session).await;
        let mut report = RebuildReport::default();

        for calendar in calendars {
            let read = self.read_today(session, &calendar.id, true).await;
            report.outcomes.push(RebuildOutcome {
                events: read.events.len(),
                source: read.source,
                calendar_id: calendar.id,
            });
        }

        let failed = report.failed();
        if !failed.is_empty() {
            warn!(failed = ?failed, "some calendars were not refreshed");
        }
        info!(
            calendars = report.outcomes.len(),
            refreshed = report.refreshed(),
            "rebuilt event cache"
        );
        report
    }

    /// Clears the verification code and token and saves the config.
    pub fn revoke_access(&self) -> SyncResult<()> {
        self.settings.revoke();
        self.settings.save()?;
        info!("account access revoked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{ACCESS_TOKEN_KEY, CALENDARS_KEY, CLIENT_ID_KEY, CLIENT_SECRET_KEY};
    use crate::store::{MemoryConfigStore, MemoryStateStore};
    use chrono::{DateTime, TimeZone, Utc};
    use gcalsync_core::FixedClock;
    use gcalsync_providers::mock::MockProvider;
    use gcalsync_providers::{ProviderError, RawEvent, RawEventTime};
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    fn sync_with(mock: &MockProvider, config: MemoryConfigStore) -> CalendarSync {
        CalendarSync::with_clock(
            Arc::new(config),
            Arc::new(MemoryStateStore::new()),
            Arc::new(mock.clone()),
            SyncOptions::default().with_request_timeout(Duration::from_secs(5)),
            Arc::new(FixedClock(now())),
        )
    }

    fn authorized_config() -> MemoryConfigStore {
        let token = Token::new("ya29").with_expires_in(now(), 3600);
        MemoryConfigStore::new()
            .with_value(CLIENT_ID_KEY, json!("id"))
            .with_value(CLIENT_SECRET_KEY, json!("secret"))
            .with_value(ACCESS_TOKEN_KEY, serde_json::to_value(token).unwrap())
    }

    fn meeting(summary: &str) -> RawEvent {
        RawEvent::new(
            summary,
            RawEventTime::date_time("2025-03-10T14:00:00Z"),
            RawEventTime::date_time("2025-03-10T15:00:00Z"),
        )
    }

    #[test]
    fn options_builders() {
        let options = SyncOptions::default()
            .with_max_results(25)
            .with_order_by(EventOrder::Updated)
            .with_single_events(false);
        assert_eq!(options.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(options.fetch_params(), FetchParams {
            max_results: 25,
            order_by: EventOrder::Updated,
            single_events: false,
        });
    }

    #[tokio::test]
    async fn catalog_merges_configured_selection() {
        let mock = MockProvider::new()
            .with_calendar("primary@x", "Me")
            .with_calendar("team@x", "Team");
        let sync = sync_with(
            &mock,
            authorized_config()
                .with_value(CALENDARS_KEY, json!([{"id": "team@x", "name": "Team", "weight": -1}])),
        );

        let session = sync.validate().await;
        let catalog = sync.catalog(&session).await;
        assert_eq!(catalog[0].id, "team@x");
        assert!(catalog[0].selected);
        assert_eq!(catalog[1].weight, 9);
        assert_eq!(sync.available_calendars().len(), 1);
    }

    #[tokio::test]
    async fn rebuild_continues_past_failures() {
        let mock = MockProvider::new()
            .with_calendar("a", "A")
            .with_calendar("b", "B")
            .with_calendar("c", "C")
            .with_calendar("quiet", "Quiet")
            .with_events("a", vec![meeting("Alpha")])
            .with_events_error("b", ProviderError::server("boom"))
            .with_events("c", vec![meeting("Gamma")]);
        let sync = sync_with(&mock, authorized_config());

        let session = sync.validate().await;
        let report = sync.rebuild_all(&session).await;

        assert_eq!(report.outcomes.len(), 4);
        assert_eq!(report.refreshed(), 3);
        assert_eq!(report.failed(), vec!["b"]);
        assert_eq!(report.outcomes[3].source, CacheSource::Empty);
        assert_eq!(sync.cache().entry("a").unwrap().events.len(), 1);
        assert!(sync.cache().entry("b").unwrap().events.is_empty());
        assert_eq!(sync.cache().entry("c").unwrap().events[0].summary, "Gamma");
    }

    #[tokio::test]
    async fn unauthenticated_rebuild_is_empty() {
        let mock = MockProvider::new().with_calendar("a", "A");
        let sync = sync_with(&mock, MemoryConfigStore::new());

        let session = sync.validate().await;
        assert!(sync.rebuild_all(&session).await.is_empty());
        assert!(sync.today_events(&session, "a", false).await.is_empty());
    }

    #[tokio::test]
    async fn revoke_clears_and_saves() {
        let mock = MockProvider::new();
        let config = Arc::new(authorized_config());
        let sync = CalendarSync::with_clock(
            config.clone(),
            Arc::new(MemoryStateStore::new()),
            Arc::new(mock),
            SyncOptions::default(),
            Arc::new(FixedClock(now())),
        );

        sync.revoke_access().unwrap();
        assert!(sync.settings().access_token().is_none());
        assert_eq!(config.save_count(), 1);
        assert!(!sync.validate().await.is_authenticated());
    }
}
