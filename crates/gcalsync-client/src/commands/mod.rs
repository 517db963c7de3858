//! Command implementations.

pub mod auth;
pub mod calendars;
pub mod config;
pub mod credentials;
pub mod events;

use std::sync::Arc;

use gcalsync_sync::{CalendarSync, JsonFileConfigStore, JsonFileStateStore};
use serde::Serialize;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Opens the sync core over the configured stores.
pub fn open_sync(config: &ClientConfig) -> ClientResult<CalendarSync> {
    let settings_path = config.settings_path();
    let state_path = config.state_path();
    debug!(settings = ?settings_path, state = ?state_path, "opening stores");

    let settings = JsonFileConfigStore::open(settings_path)?;
    let state = JsonFileStateStore::open(state_path)?;

    Ok(CalendarSync::new(
        Arc::new(settings),
        Arc::new(state),
        provider_factory()?,
        config.sync_options(),
    ))
}

#[cfg(feature = "google")]
fn provider_factory() -> ClientResult<Arc<dyn gcalsync_providers::ProviderFactory>> {
    Ok(Arc::new(gcalsync_providers::google::GoogleProviderFactory::default()))
}

#[cfg(not(feature = "google"))]
fn provider_factory() -> ClientResult<Arc<dyn gcalsync_providers::ProviderFactory>> {
    Err(ClientError::Config(
        "built without Google Calendar support".to_string(),
    ))
}

/// Prints `value` as pretty JSON.
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> ClientResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Fails with [`ClientError::AuthRequired`] when the session is unusable.
pub(crate) fn require_auth(session: &gcalsync_sync::AuthSession) -> ClientResult<()> {
    if session.is_authenticated() {
        return Ok(());
    }
    let hint = match session.error() {
        Some(error) => format!("last token exchange failed ({})", error),
        None => "run `gcalsync auth url` and `gcalsync auth code <CODE>`".to_string(),
    };
    Err(ClientError::AuthRequired(hint))
}
