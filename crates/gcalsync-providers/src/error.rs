//! Provider errors.
//!
//! Every failure coming out of a [`CalendarProvider`](crate::CalendarProvider)
//! is a [`ProviderError`]: a [`ProviderErrorCode`] classifying what went
//! wrong, a message, and optionally the provider name and the underlying
//! transport error. The sync core only distinguishes "worked" from "did not
//! work", so the code mostly matters for logs and for the CLI.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// What kind of failure a [`ProviderError`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ProviderErrorCode {
    /// Bad or expired client credentials, access token or grant.
    #[error("authentication_failed")]
    AuthenticationFailed,
    /// The account may not access the resource.
    #[error("authorization_failed")]
    AuthorizationFailed,
    /// Connection failure or timeout.
    #[error("network_error")]
    NetworkError,
    /// Quota exhausted (HTTP 429).
    #[error("rate_limited")]
    RateLimited,
    /// HTTP 5xx.
    #[error("server_error")]
    ServerError,
    /// Body or status the client could not make sense of.
    #[error("invalid_response")]
    InvalidResponse,
    /// HTTP 404, typically an unknown calendar id.
    #[error("not_found")]
    NotFound,
    /// HTTP 400.
    #[error("bad_request")]
    BadRequest,
    /// The client cannot be built from the given settings.
    #[error("configuration_error")]
    ConfigurationError,
    /// Anything else.
    #[error("internal_error")]
    InternalError,
}

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// A failed provider call.
#[derive(Debug)]
pub struct ProviderError {
    code: ProviderErrorCode,
    message: String,
    provider: Option<String>,
    retry_after: Option<Duration>,
    source: Option<BoxedSource>,
}

macro_rules! constructors {
    ($($(#[$doc:meta])* $name:ident => $code:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $name(message: impl Into<String>) -> Self {
                Self::new(ProviderErrorCode::$code, message)
            }
        )*
    };
}

impl ProviderError {
    /// Creates an error with `code` and `message`.
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider: None,
            retry_after: None,
            source: None,
        }
    }

    constructors! {
        /// Authentication failure.
        authentication => AuthenticationFailed;
        /// Authorization failure.
        authorization => AuthorizationFailed;
        /// Transport failure or timeout.
        network => NetworkError;
        /// Rate limit hit.
        rate_limited => RateLimited;
        /// Server-side failure.
        server => ServerError;
        /// Unparseable or unexpected response.
        invalid_response => InvalidResponse;
        /// Missing resource.
        not_found => NotFound;
        /// Rejected request.
        bad_request => BadRequest;
        /// Unusable client settings.
        configuration => ConfigurationError;
        /// Unexpected internal state.
        internal => InternalError;
    }

    /// Tags the error with the provider that raised it.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Records how long the provider asked callers to back off.
    pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = Some(retry_after);
        self
    }

    /// Attaches the underlying error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    /// Returns the message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the provider name, if tagged.
    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    /// Returns the requested back-off, if the provider sent one.
    pub fn retry_after(&self) -> Option<Duration> {
        self.retry_after
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.provider {
            Some(provider) => write!(f, "[{}] {}: {}", provider, self.code, self.message)?,
            None => write!(f, "{}: {}", self.code, self.message)?,
        }
        if let Some(retry_after) = self.retry_after {
            write!(f, " (retry after {}s)", retry_after.as_secs())?;
        }
        Ok(())
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn std::error::Error + 'static))
    }
}

/// Result alias for provider calls.
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn display_includes_provider_and_back_off() {
        let err = ProviderError::rate_limited("quota exceeded")
            .with_provider("google")
            .with_retry_after(Duration::from_secs(20));
        assert_eq!(
            err.to_string(),
            "[google] rate_limited: quota exceeded (retry after 20s)"
        );
        assert_eq!(err.provider(), Some("google"));
        assert_eq!(err.retry_after(), Some(Duration::from_secs(20)));
    }

    #[test]
    fn plain_display() {
        let err = ProviderError::authentication("invalid_grant");
        assert_eq!(err.to_string(), "authentication_failed: invalid_grant");
        assert_eq!(err.code(), ProviderErrorCode::AuthenticationFailed);
        assert!(err.source().is_none());
    }

    #[test]
    fn keeps_source() {
        let err = ProviderError::network("token request failed")
            .with_source(std::io::Error::other("connection reset"));
        assert_eq!(
            err.source().map(|s| s.to_string()).as_deref(),
            Some("connection reset")
        );
    }
}
