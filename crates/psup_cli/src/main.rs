//! crates/psup_cli/src/main.rs
//! `psup`: one daily run from a JSON input file to a canonical JSON output,
//! with an optional day summary report.

mod args;
mod telemetry;

mod exitcodes {
    pub const OK: i32 = 0;
    /// Unreadable, malformed or schema-invalid input, or bad flags.
    pub const INPUT: i32 = 2;
    /// Input integrity or fatal verification failure.
    pub const VERIFICATION: i32 = 3;
    pub const IO: i32 = 4;
    /// Offers were withheld (only with `--fail-on-alert`).
    pub const ALERT: i32 = 5;
}

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use args::{parse_and_validate as parse_cli, Args, ReportFormat};
use psup_core::AdmissionInput;
use psup_io::{hasher, IoError, JsonFileSink, JsonFileSource};
use psup_pipeline::{AdmissionSource, DailyRun, Finding, PipelineError, RunOptions, RunOutcome, Severity};
use psup_report::{build_summary, FindingRow};
use tracing::{error, info, warn};

#[derive(Debug)]
enum MainError {
    Input(String),
    Verification(String),
    Io(String),
    Render(String),
}

impl std::fmt::Display for MainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MainError::Input(m) => write!(f, "input: {m}"),
            MainError::Verification(m) => write!(f, "verification: {m}"),
            MainError::Io(m) => write!(f, "io: {m}"),
            MainError::Render(m) => write!(f, "report: {m}"),
        }
    }
}

fn main() -> ExitCode {
    let args = match parse_cli() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("psup: error: {e}");
            return ExitCode::from(exitcodes::INPUT as u8);
        }
    };
    if let Err(e) = telemetry::init(&args) {
        eprintln!("psup: error: {e}");
        return ExitCode::from(exitcodes::INPUT as u8);
    }

    let rc = match run_once(&args) {
        Ok(rc) => rc,
        Err(e) => {
            error!("{e}");
            eprintln!("psup: error: {e}");
            map_error(&e)
        }
    };
    ExitCode::from(rc as u8)
}

fn map_error(e: &MainError) -> i32 {
    match e {
        MainError::Input(_) => exitcodes::INPUT,
        MainError::Verification(_) => exitcodes::VERIFICATION,
        MainError::Io(_) | MainError::Render(_) => exitcodes::IO,
    }
}

fn map_pipeline_err(e: PipelineError) -> MainError {
    match e {
        PipelineError::Io(io) => match io {
            IoError::Json { .. } | IoError::Schema { .. } => MainError::Input(io.to_string()),
            IoError::Model(v) => MainError::Verification(v.to_string()),
            IoError::Read { .. } | IoError::Write { .. } | IoError::Path(_) => MainError::Io(io.to_string()),
        },
        PipelineError::Verification(v) => MainError::Verification(v.to_string()),
        PipelineError::Export(m) => MainError::Io(m),
    }
}

// ---------- Run ----------

/// File source that remembers the digest of what it loaded.
struct DigestingSource {
    inner: JsonFileSource,
    digest: Option<String>,
}

impl AdmissionSource for DigestingSource {
    fn fetch(&mut self) -> Result<AdmissionInput, PipelineError> {
        let input = self.inner.load()?;
        self.digest = Some(hasher::input_digest(&input)?);
        Ok(input)
    }
}

fn run_once(args: &Args) -> Result<i32, MainError> {
    let source = DigestingSource { inner: JsonFileSource::new(&args.input), digest: None };
    let sink = match &args.save_input {
        Some(path) => JsonFileSink::new(&args.out).with_archive(path),
        None => JsonFileSink::new(&args.out),
    };
    let options = RunOptions {
        verify: !args.no_verify,
        quarantine_on_alert: !args.advisory,
        update_displays: !args.no_displays,
        archive_input: args.save_input.is_some(),
    };
    if args.no_verify {
        warn!("verification disabled, offers are exported unchecked");
    }

    let mut run = DailyRun::new(source, sink);
    let outcome = run.execute(&options).map_err(map_pipeline_err)?;
    let (source, _) = run.into_parts();

    if let Some(path) = &args.report {
        write_report(path, args, &outcome, source.digest.as_deref())?;
    }

    info!(
        offers = outcome.output.offers_of_the_day_count(),
        findings = outcome.findings.len(),
        alert = outcome.output.alert(),
        warning = outcome.output.warning(),
        "daily run finished"
    );
    if args.fail_on_alert && outcome.output.alert() {
        return Ok(exitcodes::ALERT);
    }
    Ok(exitcodes::OK)
}

fn finding_row(f: &Finding) -> FindingRow {
    FindingRow {
        severity: match f.severity {
            Severity::Error => "error".into(),
            Severity::Warning => "warning".into(),
        },
        code: f.code.to_string(),
        subject: f.subject.to_string(),
        message: f.message.clone(),
    }
}

fn write_report(path: &Path, args: &Args, outcome: &RunOutcome, digest: Option<&str>) -> Result<(), MainError> {
    let mut summary = build_summary(&outcome.output)
        .with_findings(outcome.findings.iter().map(finding_row).collect())
        .with_stripped_offers(outcome.quarantine.stripped_offers.len());
    if let Some(d) = digest {
        summary = summary.with_input_digest(d);
    }

    let text = match args.report_format {
        ReportFormat::Json => render_json(&summary)?,
        ReportFormat::Html => render_html(&summary, &args.lang)?,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| MainError::Io(format!("{}: {e}", parent.display())))?;
    }
    fs::write(path, text).map_err(|e| MainError::Io(format!("{}: {e}", path.display())))?;
    info!(path = %path.display(), "report written");
    Ok(())
}

#[cfg(feature = "report-json")]
fn render_json(summary: &psup_report::DaySummary) -> Result<String, MainError> {
    psup_report::render_json(summary).map_err(|e| MainError::Render(e.to_string()))
}

#[cfg(not(feature = "report-json"))]
fn render_json(_summary: &psup_report::DaySummary) -> Result<String, MainError> {
    Err(MainError::Render("built without the report-json feature".into()))
}

#[cfg(feature = "report-html")]
fn render_html(summary: &psup_report::DaySummary, lang: &str) -> Result<String, MainError> {
    Ok(psup_report::render_html(summary, lang))
}

#[cfg(not(feature = "report-html"))]
fn render_html(_summary: &psup_report::DaySummary, _lang: &str) -> Result<String, MainError> {
    Err(MainError::Render("built without the report-html feature".into()))
}
