//! In-memory provider for network-free tests.
//!
//! [`MockProvider`] serves canned calendars, events and token responses and
//! records every call so tests can assert on what the sync core asked for.
//! Clones share state, so a test can keep one handle while the code under
//! test owns another.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use gcalsync_core::CalendarRef;

use crate::credentials::Credentials;
use crate::error::{ProviderError, ProviderErrorCode, ProviderResult};
use crate::provider::{BoxFuture, CalendarProvider, EventQuery, ProviderFactory};
use crate::raw_event::RawEvent;
use crate::token::Token;

/// A call observed by a [`MockProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    /// The provider was built from credentials.
    Build { client_id: String },
    /// `exchange_auth_code` was called.
    ExchangeAuthCode { code: String },
    /// `exchange_refresh_token` was called.
    ExchangeRefreshToken { refresh_token: String },
    /// `list_calendars` was called.
    ListCalendars { access_token: String },
    /// `list_events` was called.
    ListEvents {
        access_token: String,
        query: EventQuery,
    },
}

type Canned<T> = Result<T, (ProviderErrorCode, String)>;

fn answer<T: Clone>(canned: &Canned<T>) -> ProviderResult<T> {
    canned
        .clone()
        .map_err(|(code, message)| ProviderError::new(code, message).with_provider("mock"))
}

#[derive(Debug)]
struct MockState {
    calendars: Canned<Vec<CalendarRef>>,
    events: HashMap<String, Canned<Vec<RawEvent>>>,
    code_exchange: Canned<Token>,
    refresh_exchange: Canned<Token>,
    hang: bool,
    calls: Vec<MockCall>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            calendars: Ok(Vec::new()),
            events: HashMap::new(),
            code_exchange: Ok(Token::new("mock-access").with_refresh_token("mock-refresh")),
            refresh_exchange: Ok(Token::new("mock-refreshed")),
            hang: false,
            calls: Vec::new(),
        }
    }
}

/// A scriptable [`CalendarProvider`].
///
/// Calendars without scripted events return an empty list.
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    /// Creates a mock with no calendars and default token responses.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a calendar to the calendar list.
    pub fn with_calendar(self, id: impl Into<String>, name: impl Into<String>) -> Self {
        {
            let mut state = self.state();
            let mut calendars = state.calendars.clone().unwrap_or_default();
            calendars.push(CalendarRef::new(id, name));
            state.calendars = Ok(calendars);
        }
        self
    }

    /// Makes `list_calendars` fail.
    pub fn with_calendars_error(self, error: ProviderError) -> Self {
        self.state().calendars = Err((error.code(), error.message().to_string()));
        self
    }

    /// Scripts the events returned for `calendar_id`.
    pub fn with_events(self, calendar_id: impl Into<String>, events: Vec<RawEvent>) -> Self {
        self.set_events(calendar_id, events);
        self
    }

    /// Makes `list_events` fail for `calendar_id`.
    pub fn with_events_error(self, calendar_id: impl Into<String>, error: ProviderError) -> Self {
        self.state().events.insert(
            calendar_id.into(),
            Err((error.code(), error.message().to_string())),
        );
        self
    }

    /// Replaces the events returned for `calendar_id`.
    pub fn set_events(&self, calendar_id: impl Into<String>, events: Vec<RawEvent>) {
        self.state().events.insert(calendar_id.into(), Ok(events));
    }

    /// Scripts the token returned by `exchange_auth_code`.
    pub fn with_code_token(self, token: Token) -> Self {
        self.state().code_exchange = Ok(token);
        self
    }

    /// Makes `exchange_auth_code` fail.
    pub fn with_code_error(self, error: ProviderError) -> Self {
        self.state().code_exchange = Err((error.code(), error.message().to_string()));
        self
    }

    /// Scripts the token returned by `exchange_refresh_token`.
    pub fn with_refresh_response(self, token: Token) -> Self {
        self.state().refresh_exchange = Ok(token);
        self
    }

    /// Makes `exchange_refresh_token` fail.
    pub fn with_refresh_error(self, error: ProviderError) -> Self {
        self.state().refresh_exchange = Err((error.code(), error.message().to_string()));
        self
    }

    /// Makes every async call wait forever, to exercise caller timeouts.
    pub fn hanging(self) -> Self {
        self.state().hang = true;
        self
    }

    /// Returns every call seen so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.state().calls.clone()
    }

    /// Returns the number of `list_events` calls for `calendar_id`.
    pub fn event_fetches(&self, calendar_id: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| {
                matches!(call, MockCall::ListEvents { query, .. } if query.calendar_id == calendar_id)
            })
            .count()
    }

    /// Returns the number of refresh-token exchanges.
    pub fn refresh_exchanges(&self) -> usize {
        self.count(|call| matches!(call, MockCall::ExchangeRefreshToken { .. }))
    }

    /// Returns the number of verification-code exchanges.
    pub fn code_exchanges(&self) -> usize {
        self.count(|call| matches!(call, MockCall::ExchangeAuthCode { .. }))
    }

    /// Returns the number of provider builds.
    pub fn builds(&self) -> usize {
        self.count(|call| matches!(call, MockCall::Build { .. }))
    }

    fn count(&self, predicate: impl Fn(&MockCall) -> bool) -> usize {
        self.state().calls.iter().filter(|call| predicate(call)).count()
    }

    /// Records `call` and returns whether the mock is hanging.
    fn record(&self, call: MockCall) -> bool {
        let mut state = self.state();
        state.calls.push(call);
        state.hang
    }
}

async fn respond<T>(hang: bool, result: ProviderResult<T>) -> ProviderResult<T> {
    if hang {
        std::future::pending::<()>().await;
    }
    result
}

impl CalendarProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn auth_url(&self) -> String {
        "https://auth.mock/authorize?client_id=mock".to_string()
    }

    fn exchange_auth_code<'a>(&'a self, code: &'a str) -> BoxFuture<'a, ProviderResult<Token>> {
        let hang = self.record(MockCall::ExchangeAuthCode {
            code: code.to_string(),
        });
        let result = answer(&self.state().code_exchange);
        Box::pin(respond(hang, result))
    }

    fn exchange_refresh_token<'a>(
        &'a self,
        refresh_token: &'a str,
    ) -> BoxFuture<'a, ProviderResult<Token>> {
        let hang = self.record(MockCall::ExchangeRefreshToken {
            refresh_token: refresh_token.to_string(),
        });
        let result = answer(&self.state().refresh_exchange);
        Box::pin(respond(hang, result))
    }

    fn list_calendars<'a>(
        &'a self,
        access_token: &'a str,
    ) -> BoxFuture<'a, ProviderResult<Vec<CalendarRef>>> {
        let hang = self.record(MockCall::ListCalendars {
            access_token: access_token.to_string(),
        });
        let result = answer(&self.state().calendars);
        Box::pin(respond(hang, result))
    }

    fn list_events<'a>(
        &'a self,
        access_token: &'a str,
        query: EventQuery,
    ) -> BoxFuture<'a, ProviderResult<Vec<RawEvent>>> {
        let calendar_id = query.calendar_id.clone();
        let max_results = query.max_results as usize;
        let hang = self.record(MockCall::ListEvents {
            access_token: access_token.to_string(),
            query,
        });
        let result = match self.state().events.get(&calendar_id) {
            Some(canned) => answer(canned).map(|mut events| {
                events.truncate(max_results);
                events
            }),
            None => Ok(Vec::new()),
        };
        Box::pin(respond(hang, result))
    }
}

impl ProviderFactory for MockProvider {
    fn build(&self, credentials: &Credentials) -> ProviderResult<Arc<dyn CalendarProvider>> {
        self.record(MockCall::Build {
            client_id: credentials.client_id.clone(),
        });
        Ok(Arc::new(self.clone()))
    }
}
