//! Google Calendar provider implementation.
//!
//! This module implements the [`CalendarProvider`] trait for Google Calendar.

use std::sync::Arc;

use gcalsync_core::CalendarRef;

use crate::credentials::Credentials;
use crate::error::{ProviderError, ProviderResult};
use crate::provider::{BoxFuture, CalendarProvider, EventQuery, ProviderFactory};
use crate::raw_event::RawEvent;
use crate::token::Token;

use super::client::GoogleCalendarClient;
use super::config::GoogleConfig;
use super::oauth::OAuthClient;

const PROVIDER_NAME: &str = "google";

/// Google Calendar provider.
///
/// Holds no token state; every call receives the access token it needs.
pub struct GoogleProvider {
    oauth_client: OAuthClient,
    api_client: GoogleCalendarClient,
}

impl GoogleProvider {
    /// Creates a new Google provider with the given configuration.
    pub fn new(config: GoogleConfig) -> ProviderResult<Self> {
        config.validate().map_err(ProviderError::configuration)?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent())
            .build()
            .map_err(|e| {
                ProviderError::configuration(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        let api_client = GoogleCalendarClient::new(http_client.clone(), config.api_base.clone());
        let oauth_client = OAuthClient::new(config, http_client);

        Ok(Self {
            oauth_client,
            api_client,
        })
    }
}

fn tag<T>(result: ProviderResult<T>) -> ProviderResult<T> {
    result.map_err(|e| e.with_provider(PROVIDER_NAME))
}

impl CalendarProvider for GoogleProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn auth_url(&self) -> String {
        self.oauth_client.auth_url()
    }

    fn exchange_auth_code<'a>(&'a self, code: &'a str) -> BoxFuture<'a, ProviderResult<Token>> {
        Box::pin(async move { tag(self.oauth_client.exchange_code(code).await) })
    }

    fn exchange_refresh_token<'a>(
        &'a self,
        refresh_token: &'a str,
    ) -> BoxFuture<'a, ProviderResult<Token>> {
        Box::pin(async move { tag(self.oauth_client.refresh_token(refresh_token).await) })
    }

    fn list_calendars<'a>(
        &'a self,
        access_token: &'a str,
    ) -> BoxFuture<'a, ProviderResult<Vec<CalendarRef>>> {
        Box::pin(async move { tag(self.api_client.list_calendars(access_token).await) })
    }

    fn list_events<'a>(
        &'a self,
        access_token: &'a str,
        query: EventQuery,
    ) -> BoxFuture<'a, ProviderResult<Vec<RawEvent>>> {
        Box::pin(async move { tag(self.api_client.list_events(access_token, &query).await) })
    }
}

/// Builds [`GoogleProvider`]s from client credentials.
///
/// Carries every setting except the credentials, which arrive per build.
#[derive(Debug, Clone)]
pub struct GoogleProviderFactory {
    template: GoogleConfig,
}

impl GoogleProviderFactory {
    /// Creates a factory with default Google settings.
    pub fn new() -> Self {
        Self {
            template: GoogleConfig::new(Credentials::default()),
        }
    }

    /// Creates a factory whose providers copy every setting from `template`.
    pub fn from_template(template: GoogleConfig) -> Self {
        Self { template }
    }
}

impl Default for GoogleProviderFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderFactory for GoogleProviderFactory {
    fn build(&self, credentials: &Credentials) -> ProviderResult<Arc<dyn CalendarProvider>> {
        let mut config = self.template.clone();
        config.credentials = credentials.clone();
        let provider = GoogleProvider::new(config).map_err(|e| e.with_provider(PROVIDER_NAME))?;
        Ok(Arc::new(provider))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use std::time::Duration;

    #[test]
    fn provider_requires_complete_credentials() {
        let err = GoogleProvider::new(GoogleConfig::new(Credentials::new("id", "")))
            .err()
            .unwrap();
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
    }

    #[test]
    fn factory_builds_provider() {
        let factory = GoogleProviderFactory::from_template(
            GoogleConfig::new(Credentials::default()).with_timeout(Duration::from_secs(5)),
        );
        let provider = factory
            .build(&Credentials::new("abc.apps.googleusercontent.com", "shh"))
            .unwrap();

        assert_eq!(provider.name(), "google");
        let url = provider.auth_url();
        assert!(url.contains("client_id=abc.apps.googleusercontent.com"));
        assert!(url.contains("access_type=offline"));
    }

    #[test]
    fn factory_rejects_incomplete_credentials() {
        let err = GoogleProviderFactory::new()
            .build(&Credentials::default())
            .err()
            .unwrap();
        assert_eq!(err.provider(), Some("google"));
    }
}
