//! OAuth token material.
//!
//! A [`Token`] is the opaque bearer material returned by the provider's token
//! endpoint plus an optional error marker. A token carrying an error marker
//! is never usable, whatever its other fields say.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Error marker recorded when a token exchange fails at the transport level.
pub const NETWORK_ERROR: &str = "Network error";

/// Tokens are treated as expired this long before their actual expiry.
const EXPIRY_LEEWAY_SECS: i64 = 30;

/// OAuth token as persisted under `auth.access_token`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Bearer token for API requests.
    #[serde(default)]
    pub access_token: String,

    /// Long-lived token used to mint new access tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// When the access token stops being valid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Space-separated scopes granted with this token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Error marker. Present when the exchange that produced this token failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Token {
    /// Creates a token holding only an access token with no known expiry.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            ..Self::default()
        }
    }

    /// Creates a token that only carries an error marker.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Creates the marker token recorded for transport failures.
    pub fn network_error() -> Self {
        Self::failed(NETWORK_ERROR)
    }

    /// Builder method to set the refresh token.
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Builder method to set an absolute expiry.
    pub fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Builder method to set the expiry relative to `now`.
    pub fn with_expires_in(self, now: DateTime<Utc>, seconds: i64) -> Self {
        self.with_expires_at(now + Duration::seconds(seconds))
    }

    /// Builder method to set the granted scopes.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Returns true if this token carries an error marker.
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Returns the refresh token, ignoring empty values.
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref().filter(|t| !t.is_empty())
    }

    /// Returns true if the access token cannot be used at `now`.
    ///
    /// A token without an access token or without a known expiry is always
    /// expired, so it goes through refresh before use.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        if self.access_token.is_empty() {
            return true;
        }
        match self.expires_at {
            Some(expires_at) => now + Duration::seconds(EXPIRY_LEEWAY_SECS) >= expires_at,
            None => true,
        }
    }

    /// Returns true if the token has no error marker and is not expired at `now`.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        !self.has_error() && !self.is_expired_at(now)
    }

    /// Keeps `previous` as the refresh token when this token lacks one.
    ///
    /// Refresh responses usually omit the refresh token; the old one stays
    /// valid and must not be lost.
    pub fn inherit_refresh_token(mut self, previous: Option<&str>) -> Self {
        if self.refresh_token().is_none()
            && let Some(previous) = previous
        {
            self.refresh_token = Some(previous.to_string());
        }
        self
    }
}
