//! crates/psup_cli/src/args.rs
//! Command-line surface of `psup` and the checks clap cannot express.

use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Json,
    Html,
}

/// Parsed CLI arguments.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "psup",
    version,
    disable_help_subcommand = true,
    about = "Computes one day of admission offers from a JSON input document"
)]
pub struct Args {
    /// Input document (JSON).
    #[arg(long)]
    pub input: PathBuf,

    /// Output document, written as canonical JSON.
    #[arg(long)]
    pub out: PathBuf,

    /// Day summary report path.
    #[arg(long)]
    pub report: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ReportFormat::Json)]
    pub report_format: ReportFormat,

    /// Report language.
    #[arg(long, value_parser = ["en", "fr"], default_value = "en")]
    pub lang: String,

    /// Skip input and output verification.
    #[arg(long)]
    pub no_verify: bool,

    /// Report violations without withholding any offer.
    #[arg(long)]
    pub advisory: bool,

    /// Write a canonical copy of the loaded input.
    #[arg(long)]
    pub save_input: Option<PathBuf>,

    /// Do not update waitlist ranks and displayed thresholds.
    #[arg(long)]
    pub no_displays: bool,

    /// Exit with a distinct code when verification withheld offers.
    #[arg(long)]
    pub fail_on_alert: bool,

    /// Log filter (e.g. `debug`, `psup_algo=trace`); overrides RUST_LOG.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Only log warnings and errors.
    #[arg(long, conflicts_with = "log_level")]
    pub quiet: bool,
}

#[derive(Debug)]
pub enum CliError {
    BadCombo(&'static str),
    NonLocalPath(String),
    NotFound(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::BadCombo(s) => write!(f, "invalid flag combination: {s}"),
            CliError::NonLocalPath(p) => write!(f, "path must be a local file (no scheme): {p}"),
            CliError::NotFound(p) => write!(f, "file not found: {p}"),
        }
    }
}

impl std::error::Error for CliError {}

pub fn parse_and_validate() -> Result<Args, CliError> {
    validate(Args::parse())
}

pub fn validate(args: Args) -> Result<Args, CliError> {
    for p in all_paths(&args) {
        ensure_local_path(p)?;
    }
    if !args.input.is_file() {
        return Err(CliError::NotFound(args.input.display().to_string()));
    }
    if args.advisory && args.no_verify {
        return Err(CliError::BadCombo("--advisory needs verification, drop --no-verify"));
    }
    let written = [Some(args.out.as_path()), args.report.as_deref(), args.save_input.as_deref()];
    if written.iter().flatten().any(|p| *p == args.input.as_path()) {
        return Err(CliError::BadCombo("an output path overwrites --input"));
    }
    if args.report.as_deref().is_some_and(|r| r == args.out.as_path())
        || args.save_input.as_deref().is_some_and(|s| s == args.out.as_path())
    {
        return Err(CliError::BadCombo("two outputs share a path"));
    }
    Ok(args)
}

fn has_scheme(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    lower.contains("://") || lower.starts_with("http:") || lower.starts_with("https:") || lower.starts_with("file:")
}

fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    match p.to_str() {
        Some(s) if has_scheme(s) => Err(CliError::NonLocalPath(s.to_string())),
        _ => Ok(()),
    }
}

fn all_paths(args: &Args) -> impl Iterator<Item = &Path> {
    [Some(args.input.as_path()), Some(args.out.as_path()), args.report.as_deref(), args.save_input.as_deref()]
        .into_iter()
        .flatten()
}
