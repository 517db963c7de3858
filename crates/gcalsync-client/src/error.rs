//! Client error types.

use std::fmt;

use gcalsync_sync::SyncError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// Credentials could not be resolved.
    Credentials(String),
    /// The account is not authorized.
    AuthRequired(String),
    /// Sync core error.
    Sync(SyncError),
    /// Output serialization error.
    Output(serde_json::Error),
    /// IO error.
    Io(std::io::Error),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Credentials(msg) => write!(f, "credentials error: {}", msg),
            Self::AuthRequired(msg) => write!(f, "authorization required: {}", msg),
            Self::Sync(err) => write!(f, "{}", err),
            Self::Output(err) => write!(f, "failed to render output: {}", err),
            Self::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Sync(err) => Some(err),
            Self::Output(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<SyncError> for ClientError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::CredentialMissing => Self::Credentials(
                "client credentials are not configured; run `gcalsync credentials set`".into(),
            ),
            SyncError::NotAuthenticated => {
                Self::AuthRequired("run `gcalsync auth url` and `gcalsync auth code`".into())
            }
            other => Self::Sync(other),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Output(err)
    }
}
