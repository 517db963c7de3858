//! CalendarProvider trait definition.
//!
//! This module defines the [`CalendarProvider`] trait, the seam between the
//! sync core and a remote calendar service. A provider is stateless with
//! respect to tokens: the caller owns token storage and hands the access
//! token to every query.
//!
//! Providers are responsible for:
//! - Building the authorization URL for the out-of-band OAuth flow
//! - Exchanging verification codes and refresh tokens for access tokens
//! - Listing calendars and events visible to the account

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use gcalsync_core::{CalendarRef, TimeWindow};

use crate::credentials::Credentials;
use crate::error::ProviderResult;
use crate::raw_event::RawEvent;
use crate::token::Token;

/// Default maximum number of events per query.
pub const DEFAULT_MAX_RESULTS: u32 = 10;

/// Sort order requested from the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EventOrder {
    /// Order by start time. Requires single events.
    #[default]
    StartTime,
    /// Order by last modification time.
    Updated,
}

impl EventOrder {
    /// Returns the wire value for this order.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StartTime => "startTime",
            Self::Updated => "updated",
        }
    }
}

/// An event-list query against a single calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    /// Calendar to query.
    pub calendar_id: String,
    /// Half-open `[start, end)` window; open-ended when `end` is `None`.
    pub window: TimeWindow,
    /// Maximum number of events to return.
    pub max_results: u32,
    /// Result ordering.
    pub order_by: EventOrder,
    /// Whether recurring events are expanded into instances.
    pub single_events: bool,
}

impl EventQuery {
    /// Creates a query over `window` with default limits.
    pub fn new(calendar_id: impl Into<String>, window: TimeWindow) -> Self {
        Self {
            calendar_id: calendar_id.into(),
            window,
            max_results: DEFAULT_MAX_RESULTS,
            order_by: EventOrder::default(),
            single_events: true,
        }
    }

    /// Creates an open-ended query starting at `from`.
    pub fn starting_at(calendar_id: impl Into<String>, from: DateTime<Utc>) -> Self {
        Self::new(calendar_id, TimeWindow::starting_at(from))
    }

    /// Builder method to set max results.
    pub fn with_max_results(mut self, max: u32) -> Self {
        self.max_results = max;
        self
    }

    /// Builder method to set the ordering.
    pub fn with_order_by(mut self, order: EventOrder) -> Self {
        self.order_by = order;
        self
    }

    /// Builder method to toggle recurring event expansion.
    pub fn with_single_events(mut self, single_events: bool) -> Self {
        self.single_events = single_events;
        self
    }
}

/// A boxed future for async trait methods.
///
/// Boxed futures keep the trait object-safe so the sync core can hold an
/// `Arc<dyn CalendarProvider>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The remote calendar service.
///
/// Token exchanges return `Ok(token)` when the provider answered, even if the
/// answer is a grant error; such tokens carry an error marker (see
/// [`Token::failed`]). `Err` is reserved for failures to obtain an answer at
/// all: transport errors, timeouts, unparseable responses.
pub trait CalendarProvider: Send + Sync {
    /// Returns the name/type of this provider (e.g., "google").
    fn name(&self) -> &str;

    /// Returns the URL the user visits to obtain a verification code.
    fn auth_url(&self) -> String;

    /// Exchanges a one-time verification code for a token.
    fn exchange_auth_code<'a>(&'a self, code: &'a str) -> BoxFuture<'a, ProviderResult<Token>>;

    /// Exchanges a refresh token for a new access token.
    fn exchange_refresh_token<'a>(
        &'a self,
        refresh_token: &'a str,
    ) -> BoxFuture<'a, ProviderResult<Token>>;

    /// Lists calendars visible to the account, in provider order.
    fn list_calendars<'a>(
        &'a self,
        access_token: &'a str,
    ) -> BoxFuture<'a, ProviderResult<Vec<CalendarRef>>>;

    /// Lists events matching `query`, in provider order.
    fn list_events<'a>(
        &'a self,
        access_token: &'a str,
        query: EventQuery,
    ) -> BoxFuture<'a, ProviderResult<Vec<RawEvent>>>;
}

/// Builds providers from client credentials.
///
/// The sync core only ever asks for a provider once credentials are complete.
pub trait ProviderFactory: Send + Sync {
    /// Builds a provider bound to `credentials`.
    fn build(&self, credentials: &Credentials) -> ProviderResult<Arc<dyn CalendarProvider>>;
}

impl<F> ProviderFactory for F
where
    F: Fn(&Credentials) -> ProviderResult<Arc<dyn CalendarProvider>> + Send + Sync,
{
    fn build(&self, credentials: &Credentials) -> ProviderResult<Arc<dyn CalendarProvider>> {
        self(credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap()
    }

    #[test]
    fn event_query_defaults() {
        let query = EventQuery::starting_at("primary", start());
        assert_eq!(query.calendar_id, "primary");
        assert!(query.window.is_open_ended());
        assert_eq!(query.max_results, 10);
        assert_eq!(query.order_by, EventOrder::StartTime);
        assert!(query.single_events);
    }

    #[test]
    fn event_query_builder() {
        let window = TimeWindow::from_duration(start(), Duration::days(1));
        let query = EventQuery::new("team@x", window)
            .with_max_results(50)
            .with_order_by(EventOrder::Updated)
            .with_single_events(false);

        assert_eq!(query.window.end, Some(start() + Duration::days(1)));
        assert_eq!(query.max_results, 50);
        assert_eq!(query.order_by.as_str(), "updated");
        assert!(!query.single_events);
    }

    #[test]
    fn closures_are_factories() {
        let factory = |_: &Credentials| -> ProviderResult<Arc<dyn CalendarProvider>> {
            Ok(Arc::new(crate::mock::MockProvider::new()))
        };
        let provider = factory
            .build(&Credentials::new("id", "secret"))
            .unwrap();
        assert_eq!(provider.name(), "mock");
    }
}
