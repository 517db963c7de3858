//! Authorization commands.

use gcalsync_sync::{CalendarSync, SettingsUpdate, SyncError};
use serde_json::json;
use tracing::info;

use crate::commands::print_json;
use crate::error::ClientResult;

/// Prints the authorization URL.
pub fn url(sync: &CalendarSync) -> ClientResult<()> {
    let url = sync.auth_url();
    if url.is_empty() {
        return Err(SyncError::CredentialMissing.into());
    }

    println!("Open this URL, authorize access, then run `gcalsync auth code <CODE>`:");
    println!();
    println!("{}", url);
    Ok(())
}

/// Exchanges a verification code and stores the resulting token.
pub async fn code(sync: &CalendarSync, code: &str) -> ClientResult<()> {
    if !sync.has_credentials() {
        return Err(SyncError::CredentialMissing.into());
    }

    SettingsUpdate::new(sync.settings().credentials())
        .with_verification_code(code)
        .apply(sync)
        .await?;

    info!("verification code exchanged");
    println!("Authorization successful.");
    Ok(())
}

/// Shows whether the stored token is usable.
pub async fn status(sync: &CalendarSync, as_json: bool) -> ClientResult<()> {
    let has_credentials = sync.has_credentials();
    let session = sync.validate().await;

    if as_json {
        return print_json(&json!({
            "credentials": has_credentials,
            "authenticated": session.is_authenticated(),
            "error": session.error(),
        }));
    }

    if !has_credentials {
        println!("Not configured: run `gcalsync credentials set`.");
    } else if session.is_authenticated() {
        println!("Authorized.");
    } else if let Some(error) = session.error() {
        println!("Not authorized: {}.", error);
    } else {
        println!("Not authorized: run `gcalsync auth url`.");
    }
    Ok(())
}

/// Clears the verification code and token.
pub fn revoke(sync: &CalendarSync) -> ClientResult<()> {
    sync.revoke_access()?;
    println!("Access revoked.");
    Ok(())
}
