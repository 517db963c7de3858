//! gcalsync CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use gcalsync_core::{TracingConfig, init_tracing};

use gcalsync_client::cli::{
    AuthAction, CalendarsAction, Cli, Command, ConfigAction, CredentialsAction,
};
use gcalsync_client::commands::{self, auth, calendars, credentials, events};
use gcalsync_client::config::ClientConfig;
use gcalsync_client::error::ClientResult;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config = if cli.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::default()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: failed to initialize logging: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let config = if cli.config.is_some() {
        ClientConfig::load_from(&config_path)?
    } else {
        ClientConfig::load()?
    };

    let as_json = cli.json;
    // config commands run without opening the stores
    let open = || commands::open_sync(&config);

    match cli.command {
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config, &config_path),
            ConfigAction::Path => commands::config::path(&config, &config_path),
            ConfigAction::Set { key, value } => commands::config::set(&config_path, &key, &value),
        },
        Command::Auth { action } => {
            let sync = open()?;
            match action {
                AuthAction::Url => auth::url(&sync),
                AuthAction::Code { code } => auth::code(&sync, &code).await,
                AuthAction::Status => auth::status(&sync, as_json).await,
                AuthAction::Revoke => auth::revoke(&sync),
            }
        }
        Command::Credentials {
            action:
                CredentialsAction::Set {
                    client_id,
                    client_secret,
                    credentials_file,
                },
        } => {
            let resolved = credentials::resolve(client_id, client_secret, credentials_file)?;
            credentials::set(&open()?, resolved).await
        }
        Command::Calendars { action } => {
            let sync = open()?;
            match action {
                CalendarsAction::List => calendars::list(&sync, as_json).await,
                CalendarsAction::Select {
                    calendars: ids,
                    rebuild,
                } => calendars::select(&sync, &ids, rebuild).await,
            }
        }
        Command::Today { calendar, force } => {
            events::today(&open()?, calendar, force, as_json).await
        }
        Command::Rebuild => events::rebuild(&open()?, as_json).await,
    }
}
