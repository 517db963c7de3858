//! Typed view over the configuration store.

use std::sync::Arc;

use gcalsync_core::CalendarSelection;
use gcalsync_providers::{Credentials, Token};
use serde_json::Value;
use tracing::warn;

use crate::error::SyncResult;
use crate::store::ConfigStore;

/// Configuration key for the OAuth client id.
pub const CLIENT_ID_KEY: &str = "auth.client_id";
/// Configuration key for the OAuth client secret.
pub const CLIENT_SECRET_KEY: &str = "auth.client_secret";
/// Configuration key for the verification code.
pub const VERIFICATION_CODE_KEY: &str = "auth.verification_code";
/// Configuration key for the persisted token.
pub const ACCESS_TOKEN_KEY: &str = "auth.access_token";
/// Configuration key for the calendar selection.
pub const CALENDARS_KEY: &str = "calendars";

/// Reads and writes the sync settings in a [`ConfigStore`].
///
/// Missing or malformed values read as empty; an empty string is how a
/// cleared field is stored.
#[derive(Clone)]
pub struct Settings {
    store: Arc<dyn ConfigStore>,
}

impl Settings {
    /// Wraps `store`.
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }

    fn string(&self, key: &str) -> String {
        match self.store.get(key) {
            Some(Value::String(s)) => s,
            _ => String::new(),
        }
    }

    /// Returns the configured client credentials.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.string(CLIENT_ID_KEY), self.string(CLIENT_SECRET_KEY))
    }

    /// Stages new client credentials.
    pub fn set_credentials(&self, credentials: &Credentials) {
        self.store
            .set(CLIENT_ID_KEY, Value::from(credentials.client_id.trim()));
        self.store
            .set(CLIENT_SECRET_KEY, Value::from(credentials.client_secret.trim()));
    }

    /// Returns the verification code on file, if any.
    pub fn verification_code(&self) -> Option<String> {
        Some(self.string(VERIFICATION_CODE_KEY)).filter(|code| !code.trim().is_empty())
    }

    /// Stages a verification code. An empty code clears it.
    pub fn set_verification_code(&self, code: &str) {
        self.store
            .set(VERIFICATION_CODE_KEY, Value::from(code.trim()));
    }

    /// Returns the persisted token, including tokens carrying an error marker.
    pub fn access_token(&self) -> Option<Token> {
        match self.store.get(ACCESS_TOKEN_KEY)? {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            value => match serde_json::from_value(value) {
                Ok(token) => Some(token),
                Err(e) => {
                    warn!(error = %e, "ignoring malformed stored token");
                    None
                }
            },
        }
    }

    /// Stages a token, or clears it when `None`.
    pub fn set_access_token(&self, token: Option<&Token>) -> SyncResult<()> {
        let value = match token {
            Some(token) => serde_json::to_value(token)?,
            None => Value::from(""),
        };
        self.store.set(ACCESS_TOKEN_KEY, value);
        Ok(())
    }

    /// Returns the operator's calendar selection, empty when unset.
    pub fn calendar_selection(&self) -> Vec<CalendarSelection> {
        match self.store.get(CALENDARS_KEY) {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match serde_json::from_value(item) {
                    Ok(selection) => Some(selection),
                    Err(e) => {
                        warn!(error = %e, "skipping malformed calendar selection");
                        None
                    }
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Stages a calendar selection.
    pub fn set_calendar_selection(&self, selection: &[CalendarSelection]) -> SyncResult<()> {
        self.store
            .set(CALENDARS_KEY, serde_json::to_value(selection)?);
        Ok(())
    }

    /// Clears the verification code and token.
    pub fn revoke(&self) {
        self.store.set(VERIFICATION_CODE_KEY, Value::from(""));
        self.store.set(ACCESS_TOKEN_KEY, Value::from(""));
    }

    /// Persists staged values.
    pub fn save(&self) -> SyncResult<()> {
        self.store.save()
    }
}
