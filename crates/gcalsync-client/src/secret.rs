//! Secret references for credential values.
//!
//! `credentials set` accepts values that point at a secret kept elsewhere:
//!
//! - `pass::path/in/store` reads the first line of `pass show path/in/store`
//! - `env::VAR_NAME` reads `$VAR_NAME`
//! - anything else is taken literally

use crate::error::{ClientError, ClientResult};

/// A credential value, possibly indirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretRef<'a> {
    /// Entry in the `pass` password store.
    Pass(&'a str),
    /// Environment variable.
    Env(&'a str),
    /// Literal value.
    Plain(&'a str),
}

impl<'a> SecretRef<'a> {
    /// Parses a value by prefix.
    pub fn parse(value: &'a str) -> Self {
        if let Some(path) = value.strip_prefix("pass::") {
            Self::Pass(path)
        } else if let Some(var) = value.strip_prefix("env::") {
            Self::Env(var)
        } else {
            Self::Plain(value)
        }
    }

    /// Resolves the reference to its value, trimmed.
    pub fn resolve(&self) -> ClientResult<String> {
        let value = match self {
            Self::Pass(path) => read_pass(path)?,
            Self::Env(var) => std::env::var(var).map_err(|_| {
                ClientError::Credentials(format!("environment variable `{}` is not set", var))
            })?,
            Self::Plain(value) => value.to_string(),
        };
        Ok(value.trim().to_string())
    }
}

/// Resolves `value`, following `pass::` and `env::` references.
pub fn resolve(value: &str) -> ClientResult<String> {
    SecretRef::parse(value).resolve()
}

fn read_pass(path: &str) -> ClientResult<String> {
    let output = std::process::Command::new("pass")
        .args(["show", path])
        .output()
        .map_err(|e| ClientError::Credentials(format!("failed to run `pass show {}`: {}", path, e)))?;

    if !output.status.success() {
        return Err(ClientError::Credentials(format!(
            "`pass show {}` failed ({}): {}",
            path,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(str::to_string)
        .ok_or_else(|| ClientError::Credentials(format!("`pass show {}` printed nothing", path)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefixes() {
        assert_eq!(SecretRef::parse("pass::google/id"), SecretRef::Pass("google/id"));
        assert_eq!(SecretRef::parse("env::GCAL_ID"), SecretRef::Env("GCAL_ID"));
        assert_eq!(
            SecretRef::parse("id.apps.googleusercontent.com"),
            SecretRef::Plain("id.apps.googleusercontent.com")
        );
    }

    #[test]
    fn plain_values_are_trimmed() {
        assert_eq!(resolve("  secret \n").unwrap(), "secret");
    }

    #[test]
    fn env_reference_resolves() {
        unsafe {
            std::env::set_var("_GCALSYNC_TEST_SECRET", "from-env");
        }
        assert_eq!(resolve("env::_GCALSYNC_TEST_SECRET").unwrap(), "from-env");
        unsafe {
            std::env::remove_var("_GCALSYNC_TEST_SECRET");
        }
    }

    #[test]
    fn missing_env_reference_errors() {
        let err = resolve("env::_GCALSYNC_UNSET_VAR_31337").unwrap_err();
        assert!(err.to_string().contains("not set"));
    }
}
