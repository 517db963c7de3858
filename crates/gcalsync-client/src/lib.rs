//! CLI for the gcalsync sync core
//!
//! This crate provides the `gcalsync` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod secret;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
