//! crates/psup_cli/src/telemetry.rs
//! Installs the `tracing` subscriber: compact lines on stderr, filtered by
//! `--log-level`, else `--quiet`, else `RUST_LOG`, else `info`.

use std::fmt;

use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

use crate::args::Args;

#[derive(Debug)]
pub enum TelemetryError {
    EnvFilter { value: String, source: ParseError },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::EnvFilter { value, .. } => write!(f, "invalid log filter '{value}'"),
            TelemetryError::Subscriber(err) => write!(f, "cannot install logger: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::EnvFilter { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(&**err),
        }
    }
}

fn filter_for(args: &Args) -> Result<EnvFilter, TelemetryError> {
    let explicit = match (&args.log_level, args.quiet) {
        (Some(level), _) => Some(level.as_str()),
        (None, true) => Some("warn"),
        (None, false) => None,
    };
    match explicit {
        Some(value) => EnvFilter::try_new(value)
            .map_err(|source| TelemetryError::EnvFilter { value: value.to_string(), source }),
        None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))),
    }
}

pub fn init(args: &Args) -> Result<(), TelemetryError> {
    tracing_subscriber::fmt()
        .with_env_filter(filter_for(args)?)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}
