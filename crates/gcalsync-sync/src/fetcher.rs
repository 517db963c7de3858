//! Event queries against the provider.

use std::sync::Arc;
use std::time::Duration;

use gcalsync_core::{Clock, Event, TimeWindow};
use gcalsync_providers::{EventOrder, EventQuery, normalize_events};
use tracing::debug;

use crate::deadline::with_timeout;
use crate::error::{SyncError, SyncResult};
use crate::token_manager::AuthSession;

/// Query parameters applied to every event fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchParams {
    /// Maximum number of events per query.
    pub max_results: u32,
    /// Result ordering.
    pub order_by: EventOrder,
    /// Whether recurring events are expanded.
    pub single_events: bool,
}

impl Default for FetchParams {
    fn default() -> Self {
        Self {
            max_results: gcalsync_providers::DEFAULT_MAX_RESULTS,
            order_by: EventOrder::StartTime,
            single_events: true,
        }
    }
}

/// Fetches and normalizes events.
pub struct EventFetcher {
    params: FetchParams,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl EventFetcher {
    /// Creates a fetcher.
    pub fn new(params: FetchParams, clock: Arc<dyn Clock>, timeout: Duration) -> Self {
        Self {
            params,
            clock,
            timeout,
        }
    }

    /// Returns the query parameters.
    pub fn params(&self) -> FetchParams {
        self.params
    }

    /// Builds the provider query for `calendar_id`.
    ///
    /// Without a window the query starts now and is open-ended.
    pub fn query(&self, calendar_id: &str, window: Option<TimeWindow>) -> EventQuery {
        let window = window.unwrap_or_else(|| TimeWindow::starting_at(self.clock.now()));
        EventQuery::new(calendar_id, window)
            .with_max_results(self.params.max_results)
            .with_order_by(self.params.order_by)
            .with_single_events(self.params.single_events)
    }

    /// Fetches events in `window` for `calendar_id`, in provider order.
    ///
    /// # Errors
    ///
    /// - [`SyncError::NotAuthenticated`] without an authenticated session
    /// - [`SyncError::ProviderQueryFailed`] when the query fails or times out
    /// - [`SyncError::NoEvents`] when the provider returns nothing
    pub async fn fetch_events(
        &self,
        session: &AuthSession,
        calendar_id: &str,
        window: Option<TimeWindow>,
    ) -> SyncResult<Vec<Event>> {
        let (client, access_token) = session.authorized().ok_or(SyncError::NotAuthenticated)?;
        let query = self.query(calendar_id, window);

        let raw = with_timeout(self.timeout, client.list_events(access_token, query)).await?;
        if raw.is_empty() {
            return Err(SyncError::no_events(calendar_id));
        }

        debug!(calendar_id = %calendar_id, count = raw.len(), "normalizing events");
        Ok(normalize_events(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
    use gcalsync_core::FixedClock;
    use gcalsync_providers::mock::{MockCall, MockProvider};
    use gcalsync_providers::{
        CalendarProvider, Credentials, ProviderError, ProviderFactory, RawEvent, RawEventTime,
    };

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 9, 30, 0).unwrap()
    }

    fn fetcher() -> EventFetcher {
        EventFetcher::new(
            FetchParams::default(),
            Arc::new(FixedClock(now())),
            Duration::from_secs(5),
        )
    }

    fn session_with(mock: &MockProvider) -> AuthSession {
        let client: Arc<dyn CalendarProvider> =
            mock.build(&Credentials::new("id", "secret")).unwrap();
        AuthSession::for_tests(client, "ya29")
    }

    fn raw(summary: &str, start: &str, end: &str) -> RawEvent {
        RawEvent::new(
            summary,
            RawEventTime::date_time(start),
            RawEventTime::date_time(end),
        )
    }

    #[test]
    fn query_defaults_to_open_window_from_now() {
        let query = fetcher().query("team@x", None);
        assert_eq!(query.window.start, now());
        assert!(query.window.is_open_ended());
        assert_eq!(query.max_results, 10);
        assert_eq!(query.order_by, EventOrder::StartTime);
        assert!(query.single_events);
    }

    #[tokio::test]
    async fn fetches_and_normalizes_in_window() {
        let mock = MockProvider::new().with_events(
            "team@x",
            vec![
                raw("Standup", "2025-03-10T09:00:00Z", "2025-03-10T09:15:00Z"),
                RawEvent::new(
                    "Offsite",
                    RawEventTime::date("2025-03-10"),
                    RawEventTime::date("2025-03-11"),
                ),
            ],
        );
        let window = TimeWindow::from_duration(now(), ChronoDuration::hours(8));

        let events = fetcher()
            .fetch_events(&session_with(&mock), "team@x", Some(window))
            .await
            .unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].summary, "Standup");
        assert_eq!(events[1].summary, "Offsite");

        let calls = mock.calls();
        let Some(MockCall::ListEvents { access_token, query }) = calls.last() else {
            panic!("expected an event query, got {:?}", calls);
        };
        assert_eq!(access_token, "ya29");
        assert_eq!(query.window, window);
    }

    #[tokio::test]
    async fn zero_items_is_no_events() {
        let mock = MockProvider::new();
        let err = fetcher()
            .fetch_events(&session_with(&mock), "empty", None)
            .await
            .unwrap_err();
        assert!(err.is_no_events());
    }

    #[tokio::test]
    async fn provider_failure_is_query_failed() {
        let mock =
            MockProvider::new().with_events_error("team@x", ProviderError::rate_limited("slow down"));
        let err = fetcher()
            .fetch_events(&session_with(&mock), "team@x", None)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::ProviderQueryFailed(_)));
    }

    #[tokio::test]
    async fn unauthenticated_session_is_rejected() {
        let err = fetcher()
            .fetch_events(&AuthSession::unauthenticated(), "team@x", None)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::NotAuthenticated));
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_query_times_out() {
        let mock = MockProvider::new().hanging();
        let err = fetcher()
            .fetch_events(&session_with(&mock), "team@x", None)
            .await
            .unwrap_err();
        let SyncError::ProviderQueryFailed(source) = err else {
            panic!("expected a query failure");
        };
        assert!(source.message().contains("timed out"));
    }
}
