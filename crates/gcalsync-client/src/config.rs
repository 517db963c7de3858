//! Client configuration.
//!
//! Settings live in `~/.config/gcalsync/config.toml` by default:
//!
//! ```toml
//! [storage]
//! settings_path = "/home/me/.config/gcalsync/settings.json"
//! state_path = "/home/me/.local/share/gcalsync/state.json"
//!
//! [sync]
//! timeout_secs = 30
//! max_results = 10
//! ```
//!
//! `settings.json` holds credentials, the token and the calendar selection;
//! `state.json` holds the per-calendar event cache.

use std::path::{Path, PathBuf};
use std::time::Duration;

use gcalsync_sync::SyncOptions;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Configuration for the gcalsync client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Where settings and cache state are stored.
    pub storage: StorageSettings,

    /// Remote query settings.
    pub sync: SyncSettings,
}

/// Storage locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Settings file (credentials, token, calendar selection).
    pub settings_path: Option<PathBuf>,

    /// Event cache file.
    pub state_path: Option<PathBuf>,
}

/// Remote query settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Timeout for each remote call, in seconds.
    pub timeout_secs: u64,

    /// Maximum events fetched per calendar.
    pub max_results: u32,

    /// Expand recurring events into single instances.
    pub single_events: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_results: 10,
            single_events: true,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults if absent.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("failed to read config: {}", e)))?;
        toml::from_str(&content)
            .map_err(|e| ClientError::Config(format!("failed to parse config: {}", e)))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gcalsync")
    }

    /// Returns the default data directory path.
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gcalsync")
    }

    /// Returns the settings file path.
    pub fn settings_path(&self) -> PathBuf {
        self.storage
            .settings_path
            .clone()
            .unwrap_or_else(|| Self::default_config_dir().join("settings.json"))
    }

    /// Returns the event cache file path.
    pub fn state_path(&self) -> PathBuf {
        self.storage
            .state_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join("state.json"))
    }

    /// Returns the sync options derived from `[sync]`.
    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions::default()
            .with_request_timeout(Duration::from_secs(self.sync.timeout_secs.max(1)))
            .with_max_results(self.sync.max_results)
            .with_single_events(self.sync.single_events)
    }
}

/// Sets `key` (dotted, e.g. `sync.timeout_secs`) to `raw` in the TOML
/// document at `path`, keeping comments and unrelated keys.
///
/// `raw` is stored as an integer or boolean when it parses as one,
/// otherwise as a string. The result must still load as a [`ClientConfig`].
pub fn set_value(path: &Path, key: &str, raw: &str) -> ClientResult<()> {
    let content = if path.exists() {
        std::fs::read_to_string(path)?
    } else {
        String::new()
    };

    let mut doc = content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|e| ClientError::Config(format!("failed to parse {}: {}", path.display(), e)))?;

    let (table_key, field) = key
        .split_once('.')
        .filter(|(table, field)| !table.is_empty() && !field.is_empty() && !field.contains('.'))
        .ok_or_else(|| ClientError::Config(format!("expected `table.key`, got `{}`", key)))?;

    if !doc.contains_key(table_key) {
        doc[table_key] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    let table = doc[table_key]
        .as_table_mut()
        .ok_or_else(|| ClientError::Config(format!("`{}` is not a table", table_key)))?;

    table[field] = if let Ok(n) = raw.parse::<i64>() {
        toml_edit::value(n)
    } else if let Ok(b) = raw.parse::<bool>() {
        toml_edit::value(b)
    } else {
        toml_edit::value(raw)
    };

    let updated = doc.to_string();
    toml::from_str::<ClientConfig>(&updated)
        .map_err(|e| ClientError::Config(format!("invalid value for `{}`: {}", key, e)))?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, updated)?;
    Ok(())
}
