//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// gcalsync - Google Calendar sync for today's events
#[derive(Debug, Parser)]
#[command(name = "gcalsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "GCALSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Account authorization
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// OAuth client credentials
    Credentials {
        #[command(subcommand)]
        action: CredentialsAction,
    },

    /// Calendar listing and selection
    Calendars {
        #[command(subcommand)]
        action: CalendarsAction,
    },

    /// Show today's events
    Today {
        /// Calendar id (defaults to every selected calendar)
        calendar: Option<String>,

        /// Refetch even if today's events are cached
        #[arg(long, short)]
        force: bool,
    },

    /// Refetch today's events for every calendar
    Rebuild,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Authorization actions.
#[derive(Debug, Subcommand)]
pub enum AuthAction {
    /// Print the URL to obtain a verification code
    Url,

    /// Exchange a verification code for a token
    Code {
        /// Verification code shown after authorizing
        code: String,
    },

    /// Show whether the account is authorized
    Status,

    /// Forget the verification code and token
    Revoke,
}

/// Credential actions.
#[derive(Debug, Subcommand)]
pub enum CredentialsAction {
    /// Store the OAuth client id and secret
    ///
    /// Values may reference secrets kept elsewhere: `env::VAR` reads an
    /// environment variable, `pass::path` reads the first line of
    /// `pass show path`.
    Set {
        /// OAuth client ID (from Google Cloud Console)
        #[arg(long, env = "GOOGLE_CLIENT_ID")]
        client_id: Option<String>,

        /// OAuth client secret (from Google Cloud Console)
        #[arg(long, env = "GOOGLE_CLIENT_SECRET")]
        client_secret: Option<String>,

        /// Path to Google Cloud Console credentials JSON file
        ///
        /// Takes precedence over `--client-id` and `--client-secret`.
        #[arg(long, env = "GOOGLE_CREDENTIALS_FILE")]
        credentials_file: Option<PathBuf>,
    },
}

/// Calendar actions.
#[derive(Debug, Subcommand)]
pub enum CalendarsAction {
    /// List remote calendars with their selection state
    List,

    /// Replace the calendar selection
    ///
    /// Each entry is `ID` or `ID=WEIGHT`; without a weight, calendars are
    /// weighted by their position.
    Select {
        /// Calendars to select
        #[arg(required = true)]
        calendars: Vec<String>,

        /// Refetch today's events afterwards
        #[arg(long)]
        rebuild: bool,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Show configuration and storage paths
    Path,

    /// Set a configuration value, keeping the rest of the file intact
    Set {
        /// Dotted key, e.g. `sync.timeout_secs`
        key: String,

        /// New value
        value: String,
    },
}
