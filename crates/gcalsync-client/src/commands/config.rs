//! Configuration commands.

use std::path::Path;

use crate::config::{self as client_config, ClientConfig};
use crate::error::{ClientError, ClientResult};

/// Dump the current configuration to stdout.
pub fn dump(config: &ClientConfig, path: &Path) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", path.display());
    println!("{}", toml_str);
    Ok(())
}

/// Show the configuration and storage paths.
pub fn path(config: &ClientConfig, path: &Path) -> ClientResult<()> {
    println!("config: {}", path.display());
    println!("settings: {}", config.settings_path().display());
    println!("state: {}", config.state_path().display());
    Ok(())
}

/// Set one value in the configuration file.
pub fn set(path: &Path, key: &str, value: &str) -> ClientResult<()> {
    client_config::set_value(path, key, value)?;
    println!("{} = {} ({})", key, value, path.display());
    Ok(())
}
