//! Sync error types.

use std::io;

use gcalsync_providers::ProviderError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in the sync core.
///
/// Read paths (calendar listing, automatic token refresh, today's events)
/// absorb most of these into empty or unauthenticated results; explicit user
/// actions return them.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Client id or secret is not configured.
    #[error("client credentials are not configured")]
    CredentialMissing,

    /// Exchanging a verification code or refresh token failed.
    #[error("token exchange failed: {message}")]
    TokenExchangeFailed {
        message: String,
        #[source]
        source: Option<ProviderError>,
    },

    /// The provider returned no events for the requested window.
    #[error("no events for calendar {calendar_id}")]
    NoEvents { calendar_id: String },

    /// A calendar or event query failed.
    #[error("provider query failed: {0}")]
    ProviderQueryFailed(#[from] ProviderError),

    /// The operation needs an authenticated session.
    #[error("not authenticated")]
    NotAuthenticated,

    /// A config or state store failed.
    #[error("store error: {message}")]
    Store { message: String },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl SyncError {
    /// Creates a token exchange error caused by a provider error.
    pub fn exchange(source: ProviderError) -> Self {
        Self::TokenExchangeFailed {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Creates a token exchange error from a provider-reported marker.
    pub fn exchange_rejected(marker: impl Into<String>) -> Self {
        Self::TokenExchangeFailed {
            message: marker.into(),
            source: None,
        }
    }

    /// Creates a no-events error.
    pub fn no_events(calendar_id: impl Into<String>) -> Self {
        Self::NoEvents {
            calendar_id: calendar_id.into(),
        }
    }

    /// Creates a store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Returns true if the error means "nothing to show" rather than a failure.
    pub fn is_no_events(&self) -> bool {
        matches!(self, Self::NoEvents { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn exchange_keeps_source() {
        let err = SyncError::exchange(ProviderError::network("offline").with_provider("google"));
        assert!(err.to_string().contains("offline"));
        assert!(err.source().is_some());

        let err = SyncError::exchange_rejected("invalid_grant");
        assert_eq!(err.to_string(), "token exchange failed: invalid_grant");
        assert!(err.source().is_none());
    }

    #[test]
    fn no_events_is_distinguishable() {
        let err = SyncError::no_events("team@x");
        assert!(err.is_no_events());
        assert_eq!(err.to_string(), "no events for calendar team@x");
        assert!(!SyncError::NotAuthenticated.is_no_events());
    }
}
