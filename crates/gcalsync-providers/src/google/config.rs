//! Google Calendar provider configuration.

use std::time::Duration;

use crate::credentials::Credentials;

/// Configuration for the Google Calendar provider.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// OAuth credentials for API access.
    pub credentials: Credentials,

    /// Application name reported to the API in the user agent.
    pub application_name: String,

    /// OAuth scopes to request.
    ///
    /// Defaults to `["https://www.googleapis.com/auth/calendar.readonly"]`.
    pub scopes: Vec<String>,

    /// Redirect URI registered for the client.
    ///
    /// Defaults to the out-of-band URI: Google shows the verification code to
    /// the user, who pastes it back, so no local redirect server is needed.
    pub redirect_uri: String,

    /// Consent prompt behaviour. `consent` forces Google to return a refresh
    /// token on every authorization.
    pub prompt: String,

    /// Request timeout.
    pub timeout: Duration,

    /// Authorization endpoint.
    pub auth_endpoint: String,

    /// Token endpoint.
    pub token_endpoint: String,

    /// Calendar API base URL, without trailing slash.
    pub api_base: String,
}

impl GoogleConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Default OAuth scope for read-only calendar access.
    pub const DEFAULT_SCOPE: &'static str = "https://www.googleapis.com/auth/calendar.readonly";

    /// Out-of-band redirect URI.
    pub const OOB_REDIRECT_URI: &'static str = "urn:ietf:wg:oauth:2.0:oob";

    /// Default application name.
    pub const DEFAULT_APPLICATION_NAME: &'static str = "Google Calendar API events sync";

    /// Google's OAuth 2.0 authorization endpoint.
    pub const AUTH_ENDPOINT: &'static str = "https://accounts.google.com/o/oauth2/v2/auth";

    /// Google's OAuth 2.0 token endpoint.
    pub const TOKEN_ENDPOINT: &'static str = "https://oauth2.googleapis.com/token";

    /// Google Calendar API v3 base URL.
    pub const API_BASE: &'static str = "https://www.googleapis.com/calendar/v3";

    /// Creates a new Google configuration with the given credentials.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            application_name: Self::DEFAULT_APPLICATION_NAME.to_string(),
            scopes: vec![Self::DEFAULT_SCOPE.to_string()],
            redirect_uri: Self::OOB_REDIRECT_URI.to_string(),
            prompt: "select_account consent".to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            auth_endpoint: Self::AUTH_ENDPOINT.to_string(),
            token_endpoint: Self::TOKEN_ENDPOINT.to_string(),
            api_base: Self::API_BASE.to_string(),
        }
    }

    /// Sets the application name.
    pub fn with_application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = name.into();
        self
    }

    /// Sets the OAuth scopes.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Sets the redirect URI.
    pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = uri.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Points the provider at different endpoints, e.g. a local test server.
    pub fn with_endpoints(
        mut self,
        auth_endpoint: impl Into<String>,
        token_endpoint: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        self.auth_endpoint = auth_endpoint.into();
        self.token_endpoint = token_endpoint.into();
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Returns the user agent sent with every request.
    pub fn user_agent(&self) -> String {
        format!(
            "{} gcalsync/{}",
            self.application_name,
            env!("CARGO_PKG_VERSION")
        )
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !self.credentials.is_complete() {
            return Err("client_id and client_secret are required".to_string());
        }

        if self.scopes.is_empty() {
            return Err("at least one OAuth scope is required".to_string());
        }

        url::Url::parse(&self.auth_endpoint)
            .map_err(|e| format!("invalid authorization endpoint: {}", e))?;
        url::Url::parse(&self.token_endpoint)
            .map_err(|e| format!("invalid token endpoint: {}", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_credentials() -> Credentials {
        Credentials::new("test-client.apps.googleusercontent.com", "test-secret")
    }

    #[test]
    fn config_defaults() {
        let config = GoogleConfig::new(test_credentials());
        assert_eq!(config.scopes, vec![GoogleConfig::DEFAULT_SCOPE.to_string()]);
        assert_eq!(config.redirect_uri, "urn:ietf:wg:oauth:2.0:oob");
        assert_eq!(config.prompt, "select_account consent");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent().starts_with("Google Calendar API events sync gcalsync/"));
    }

    #[test]
    fn config_validation() {
        assert!(GoogleConfig::new(test_credentials()).validate().is_ok());

        let no_secret = GoogleConfig::new(Credentials::new("id", ""));
        assert!(no_secret.validate().unwrap_err().contains("client_secret"));

        let no_scopes = GoogleConfig::new(test_credentials()).with_scopes(vec![]);
        assert!(no_scopes.validate().is_err());

        let bad_endpoint =
            GoogleConfig::new(test_credentials()).with_endpoints("not a url", "http://t", "http://a");
        assert!(bad_endpoint.validate().unwrap_err().contains("authorization"));
    }

    #[test]
    fn config_builder_methods() {
        let config = GoogleConfig::new(test_credentials())
            .with_application_name("Team board")
            .with_redirect_uri("http://localhost:8080")
            .with_timeout(Duration::from_secs(5))
            .with_endpoints(
                "http://127.0.0.1:9000/auth",
                "http://127.0.0.1:9000/token",
                "http://127.0.0.1:9000/calendar/v3/",
            );

        assert_eq!(config.application_name, "Team board");
        assert_eq!(config.redirect_uri, "http://localhost:8080");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.api_base, "http://127.0.0.1:9000/calendar/v3");
    }
}
