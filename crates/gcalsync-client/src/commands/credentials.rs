//! Credential commands.

use std::path::{Path, PathBuf};

use gcalsync_providers::Credentials;
use gcalsync_sync::{CalendarSync, SettingsUpdate};
use tracing::info;

use crate::error::{ClientError, ClientResult};
use crate::secret;

/// Resolves credentials from a Cloud Console file or inline values.
///
/// A credentials file wins over inline values. Inline values may be
/// `env::` or `pass::` references.
pub fn resolve(
    client_id: Option<String>,
    client_secret: Option<String>,
    credentials_file: Option<PathBuf>,
) -> ClientResult<Credentials> {
    if let Some(path) = credentials_file {
        return from_file(&path);
    }

    match (client_id, client_secret) {
        (Some(id), Some(secret)) => {
            let credentials = Credentials::new(secret::resolve(&id)?, secret::resolve(&secret)?);
            if !credentials.is_complete() {
                return Err(ClientError::Credentials(
                    "client id and secret must not be empty".to_string(),
                ));
            }
            Ok(credentials)
        }
        (Some(_), None) => Err(ClientError::Credentials(
            "--client-secret is required with --client-id".to_string(),
        )),
        (None, Some(_)) => Err(ClientError::Credentials(
            "--client-id is required with --client-secret".to_string(),
        )),
        (None, None) => Err(ClientError::Credentials(
            "pass --client-id and --client-secret, or --credentials-file".to_string(),
        )),
    }
}

fn from_file(path: &Path) -> ClientResult<Credentials> {
    let credentials = Credentials::from_file(path)
        .map_err(|e| ClientError::Credentials(format!("{}: {}", path.display(), e)))?;
    if !credentials.is_complete() {
        return Err(ClientError::Credentials(format!(
            "{} has no client id or secret",
            path.display()
        )));
    }
    Ok(credentials)
}

/// Stores client credentials.
pub async fn set(sync: &CalendarSync, credentials: Credentials) -> ClientResult<()> {
    let client_id = credentials.client_id.clone();
    SettingsUpdate::new(credentials).apply(sync).await?;

    info!(client_id = %client_id, "credentials stored");
    println!("Credentials stored. Next: `gcalsync auth url`.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_values() {
        let credentials = resolve(
            Some("cli-id.apps.googleusercontent.com".to_string()),
            Some(" cli-secret ".to_string()),
            None,
        )
        .unwrap();
        assert_eq!(
            credentials,
            Credentials::new("cli-id.apps.googleusercontent.com", "cli-secret")
        );
    }

    #[test]
    fn partial_or_missing_values_fail() {
        assert!(resolve(Some("id".to_string()), None, None).is_err());
        assert!(resolve(None, Some("secret".to_string()), None).is_err());
        assert!(resolve(None, None, None).is_err());
        assert!(resolve(Some(" ".to_string()), Some("secret".to_string()), None).is_err());
    }

    #[test]
    fn credentials_file_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("creds.json");
        std::fs::write(
            &path,
            r#"{"installed": {"client_id": "file-id.apps.googleusercontent.com", "client_secret": "file-secret"}}"#,
        )
        .unwrap();

        let credentials = resolve(
            Some("cli-id".to_string()),
            Some("cli-secret".to_string()),
            Some(path),
        )
        .unwrap();
        assert_eq!(credentials.client_id, "file-id.apps.googleusercontent.com");
        assert_eq!(credentials.client_secret, "file-secret");
    }

    #[test]
    fn unreadable_file_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let err = resolve(None, None, Some(tmp.path().join("missing.json"))).unwrap_err();
        assert!(err.to_string().contains("missing.json"));
    }
}
