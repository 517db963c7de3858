//! OAuth token lifecycle.
//!
//! [`TokenManager::validate`] decides, from the stored token and
//! verification code, whether this request is authenticated:
//!
//! ```text
//! no credentials ───────────────────────────────▶ unauthenticated
//! stored token (no error marker), not expired ──▶ authenticated, no network
//! otherwise:
//!   refresh token on file ──▶ refresh exchange ─┐
//!   else verification code ─▶ code exchange ────┼─▶ ok: persist, authenticated
//!   else ───────────────────▶ unauthenticated   └─▶ failure: marker, unauthenticated
//! ```
//!
//! Automatic exchanges never return errors; explicit code exchanges do.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use gcalsync_core::Clock;
use gcalsync_providers::{CalendarProvider, ProviderFactory, Token};
use tracing::{debug, info, warn};

use crate::deadline::with_timeout;
use crate::error::{SyncError, SyncResult};
use crate::settings::Settings;

/// Outcome of [`TokenManager::validate`].
///
/// Only lives for the request that produced it; the underlying token is what
/// gets persisted.
#[derive(Clone, Default)]
pub struct AuthSession {
    client: Option<Arc<dyn CalendarProvider>>,
    token: Option<Token>,
    authenticated: bool,
}

impl AuthSession {
    /// A session with no client and no token.
    pub fn unauthenticated() -> Self {
        Self::default()
    }

    fn with_client(client: Arc<dyn CalendarProvider>) -> Self {
        Self {
            client: Some(client),
            token: None,
            authenticated: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn for_tests(client: Arc<dyn CalendarProvider>, access_token: &str) -> Self {
        Self::with_client(client).authenticate(Token::new(access_token))
    }

    fn authenticate(mut self, token: Token) -> Self {
        self.token = Some(token);
        self.authenticated = true;
        self
    }

    fn fail(mut self, token: Token) -> Self {
        self.token = Some(token);
        self.authenticated = false;
        self
    }

    /// Returns true if calendar and event queries may be issued.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Returns the provider client, if credentials were configured.
    pub fn client(&self) -> Option<&Arc<dyn CalendarProvider>> {
        self.client.as_ref()
    }

    /// Returns the token obtained or loaded during validation.
    ///
    /// On failure this is a token carrying the error marker.
    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    /// Returns the access token when authenticated.
    pub fn access_token(&self) -> Option<&str> {
        self.token
            .as_ref()
            .filter(|_| self.authenticated)
            .map(|token| token.access_token.as_str())
    }

    /// Returns the client and access token when authenticated.
    pub(crate) fn authorized(&self) -> Option<(&dyn CalendarProvider, &str)> {
        match (&self.client, self.access_token()) {
            (Some(client), Some(access_token)) => Some((client.as_ref(), access_token)),
            _ => None,
        }
    }

    /// Returns the error marker of the last exchange, if it failed.
    pub fn error(&self) -> Option<&str> {
        self.token.as_ref().and_then(|token| token.error.as_deref())
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("client", &self.client.as_ref().map(|c| c.name().to_string()))
            .field("authenticated", &self.authenticated)
            .field("error", &self.error())
            .finish()
    }
}

/// Owns the OAuth token lifecycle.
pub struct TokenManager {
    settings: Settings,
    factory: Arc<dyn ProviderFactory>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl TokenManager {
    /// Creates a token manager reading credentials and tokens from `settings`.
    pub fn new(
        settings: Settings,
        factory: Arc<dyn ProviderFactory>,
        clock: Arc<dyn Clock>,
        timeout: Duration,
    ) -> Self {
        Self {
            settings,
            factory,
            clock,
            timeout,
        }
    }

    /// Returns true iff both client id and secret are configured.
    pub fn has_credentials(&self) -> bool {
        self.settings.credentials().is_complete()
    }

    /// Builds a provider client from the configured credentials.
    ///
    /// Returns `None` when credentials are incomplete or the client cannot
    /// be built; nothing downstream should reach the network then.
    pub fn prepare_client(&self) -> Option<Arc<dyn CalendarProvider>> {
        let credentials = self.settings.credentials();
        if !credentials.is_complete() {
            debug!("client credentials missing, auth disabled");
            return None;
        }

        match self.factory.build(&credentials) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!(error = %e, "failed to build calendar client");
                None
            }
        }
    }

    /// Validates the stored token, refreshing or exchanging as needed.
    pub async fn validate(&self) -> AuthSession {
        let Some(client) = self.prepare_client() else {
            return AuthSession::unauthenticated();
        };
        let session = AuthSession::with_client(client.clone());

        let stored = self.settings.access_token().filter(|token| {
            if token.has_error() {
                debug!(error = ?token.error, "not loading stored token with error marker");
            }
            !token.has_error()
        });

        if let Some(ref token) = stored
            && !token.is_expired_at(self.clock.now())
        {
            debug!("stored token still valid");
            return session.authenticate(token.clone());
        }

        let previous_refresh = stored
            .as_ref()
            .and_then(Token::refresh_token)
            .map(str::to_string);

        let exchanged = if let Some(ref refresh_token) = previous_refresh {
            debug!("refreshing access token");
            with_timeout(self.timeout, client.exchange_refresh_token(refresh_token)).await
        } else if let Some(code) = self.settings.verification_code() {
            debug!("exchanging verification code");
            with_timeout(self.timeout, client.exchange_auth_code(&code)).await
        } else {
            debug!("no token and no way to obtain one");
            return session;
        };

        let token = match exchanged {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "token exchange failed");
                Token::network_error()
            }
        };

        if token.has_error() {
            warn!(error = ?token.error, "token exchange rejected");
            return session.fail(token);
        }

        let token = token.inherit_refresh_token(previous_refresh.as_deref());
        if let Err(e) = self.persist(&token) {
            warn!(error = %e, "failed to persist refreshed token");
        }
        info!("authenticated");
        session.authenticate(token)
    }

    fn persist(&self, token: &Token) -> SyncResult<()> {
        self.settings.set_access_token(Some(token))?;
        self.settings.save()
    }

    /// Returns the authorization URL, or an empty string without credentials.
    pub fn auth_url(&self) -> String {
        self.prepare_client()
            .map(|client| client.auth_url())
            .unwrap_or_default()
    }

    /// Exchanges a user-supplied verification code for a token.
    ///
    /// Returns `Ok(None)` without credentials. Transport failures and grant
    /// rejections are returned as [`SyncError::TokenExchangeFailed`]. The
    /// token is not persisted here.
    pub async fn exchange_code(&self, code: &str) -> SyncResult<Option<Token>> {
        let Some(client) = self.prepare_client() else {
            return Ok(None);
        };

        let token = with_timeout(self.timeout, client.exchange_auth_code(code.trim()))
            .await
            .map_err(SyncError::exchange)?;

        if let Some(marker) = token.error {
            return Err(SyncError::exchange_rejected(marker));
        }
        Ok(Some(token))
    }
}
