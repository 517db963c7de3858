//! OAuth 2.0 client credentials.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, ProviderResult};

/// OAuth 2.0 client identity registered with the provider.
///
/// Set once by an operator; the sync core only reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// The OAuth 2.0 client ID.
    pub client_id: String,
    /// The OAuth 2.0 client secret.
    pub client_secret: String,
}

/// Layouts accepted for a downloaded client secret file: Google Cloud
/// Console nests the pair under `installed` or `web`, hand-written files
/// keep it at the root.
#[derive(Deserialize)]
#[serde(untagged)]
enum CredentialsFile {
    Installed { installed: Credentials },
    Web { web: Credentials },
    Flat(Credentials),
}

impl Credentials {
    /// Creates new credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Returns true iff both the client id and secret are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }

    /// Parses a client secret JSON document.
    pub fn from_json(json: &str) -> ProviderResult<Self> {
        let file: CredentialsFile = serde_json::from_str(json).map_err(|e| {
            ProviderError::configuration(
                "expected an 'installed' or 'web' section, or client_id/client_secret at the root",
            )
            .with_source(e)
        })?;
        Ok(match file {
            CredentialsFile::Installed { installed } => installed,
            CredentialsFile::Web { web } => web,
            CredentialsFile::Flat(credentials) => credentials,
        })
    }

    /// Reads and parses a client secret file.
    pub fn from_file(path: impl AsRef<Path>) -> ProviderResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::configuration(format!("cannot read {}", path.display())).with_source(e)
        })?;
        Self::from_json(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;

    #[test]
    fn completeness() {
        assert!(Credentials::new("id", "secret").is_complete());
        assert!(!Credentials::new("", "secret").is_complete());
        assert!(!Credentials::new("id", "").is_complete());
        assert!(!Credentials::new("  ", "secret").is_complete());
        assert!(!Credentials::default().is_complete());
    }

    #[test]
    fn from_json_installed() {
        let json = r#"{
            "installed": {
                "client_id": "test-id.apps.googleusercontent.com",
                "client_secret": "test-secret",
                "project_id": "my-project"
            }
        }"#;

        let creds = Credentials::from_json(json).unwrap();
        assert_eq!(creds.client_id, "test-id.apps.googleusercontent.com");
        assert_eq!(creds.client_secret, "test-secret");
    }

    #[test]
    fn from_json_web() {
        let json = r#"{"web": {"client_id": "web-id", "client_secret": "web-secret"}}"#;
        let creds = Credentials::from_json(json).unwrap();
        assert_eq!(creds, Credentials::new("web-id", "web-secret"));
    }

    #[test]
    fn from_json_flat() {
        let json = r#"{"client_id": "flat-id", "client_secret": "flat-secret", "token": "x"}"#;
        let creds = Credentials::from_json(json).unwrap();
        assert_eq!(creds, Credentials::new("flat-id", "flat-secret"));
    }

    #[test]
    fn unknown_layout_is_a_configuration_error() {
        for json in [r#"{ "other": {} }"#, r#"{"client_id": "only-id"}"#, "not json"] {
            let err = Credentials::from_json(json).unwrap_err();
            assert_eq!(err.code(), ProviderErrorCode::ConfigurationError, "{json}");
        }
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Credentials::from_file(dir.path().join("client_secret.json")).unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
        assert!(err.message().contains("client_secret.json"));
    }
}
