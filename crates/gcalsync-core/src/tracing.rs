//! Log output for the gcalsync binaries.
//!
//! All crates log through `tracing`; [`init_tracing`] installs the single
//! stderr subscriber. `RUST_LOG` wins over the configured level unless an
//! explicit filter is given.
//!
//! ```ignore
//! use gcalsync_core::{TracingConfig, init_tracing};
//!
//! init_tracing(TracingConfig::cli_debug())?;
//! ```

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

/// Log targets of this workspace. The binary target is `gcalsync`.
const TARGETS: [&str; 5] = [
    "gcalsync",
    "gcalsync_client",
    "gcalsync_core",
    "gcalsync_providers",
    "gcalsync_sync",
];

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Subscriber installation failures.
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("a global tracing subscriber is already installed: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("invalid log filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),
}

/// Line format written to stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    /// Multi-line, for reading by eye.
    Pretty,
    #[default]
    Compact,
    /// One JSON object per line.
    Json,
}

/// How [`init_tracing`] sets up logging.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level for the workspace targets when no filter applies.
    pub level: Level,
    pub format: TracingOutputFormat,
    /// Print file and line of each event.
    pub source_location: bool,
    /// Print the module path of each event.
    pub targets: bool,
    pub timestamps: bool,
    /// Filter directive that replaces both `level` and `RUST_LOG`.
    pub env_filter: Option<String>,
}

impl Default for TracingConfig {
    /// Warnings and errors only, compact, timestamped.
    fn default() -> Self {
        Self {
            level: Level::WARN,
            format: TracingOutputFormat::Compact,
            source_location: false,
            targets: false,
            timestamps: true,
            env_filter: None,
        }
    }
}

impl TracingConfig {
    /// Preset for `gcalsync --debug`: everything down to DEBUG with
    /// targets and source locations, no timestamps.
    #[must_use]
    pub fn cli_debug() -> Self {
        Self {
            level: Level::DEBUG,
            source_location: true,
            targets: true,
            timestamps: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_level(self, level: Level) -> Self {
        Self { level, ..self }
    }

    #[must_use]
    pub fn with_format(self, format: TracingOutputFormat) -> Self {
        Self { format, ..self }
    }

    #[must_use]
    pub fn with_env_filter(self, filter: impl Into<String>) -> Self {
        Self {
            env_filter: Some(filter.into()),
            ..self
        }
    }

    /// Directive applying `level` to every workspace target, e.g.
    /// `gcalsync=WARN,gcalsync_client=WARN,...`.
    pub fn default_directive(&self) -> String {
        let level = self.level;
        TARGETS
            .map(|target| format!("{target}={level}"))
            .join(",")
    }

    fn filter(&self) -> Result<EnvFilter, TracingError> {
        if let Some(directive) = &self.env_filter {
            return Ok(EnvFilter::try_new(directive)?);
        }
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => Ok(EnvFilter::try_new(self.default_directive())?),
        }
    }

    fn layer(&self) -> BoxedLayer {
        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_file(self.source_location)
            .with_line_number(self.source_location)
            .with_target(self.targets);

        match (self.format, self.timestamps) {
            (TracingOutputFormat::Pretty, _) => layer.pretty().boxed(),
            (TracingOutputFormat::Json, _) => layer.json().boxed(),
            (TracingOutputFormat::Compact, true) => layer.compact().boxed(),
            (TracingOutputFormat::Compact, false) => layer.compact().without_time().boxed(),
        }
    }
}

/// Installs the global subscriber described by `config`.
///
/// Fails if a subscriber is already installed or the filter does not parse.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let filter = config.filter()?;
    let subscriber = tracing_subscriber::registry()
        .with(config.layer())
        .with(filter);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
