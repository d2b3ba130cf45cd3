//! psup_pipeline: verified daily offer computation.
//!
//! `compute` is the entry point used by the daily run:
//! input integrity checks → offer computation (psup_algo) → output checks →
//! quarantine of invalid groups. `connector::DailyRun` wraps it between a
//! source and a sink and adds the display-rank update.
//!
//! Logging goes through `tracing`; callers install the subscriber.

#![forbid(unsafe_code)]

use psup_core::{AdmissionInput, AdmissionOutput, CoreResult, VerificationError, WishStatus};
use tracing::info;

pub mod closure;
pub mod connector;
pub mod gdd_checks;
pub mod responder_checks;
pub mod verify_input;
pub mod verify_output;

pub use connector::{AdmissionSink, AdmissionSource, DailyRun};
pub use verify_input::verify_input;
pub use verify_output::{quarantine, verify_output, Finding, OutputReport, QuarantineOutcome, Severity};

// ---------- Errors ----------

/// Single error surface for a daily run.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("io: {0}")]
    Io(#[source] psup_io::IoError),
    #[error("verification: {0}")]
    Verification(#[from] VerificationError),
    #[error("export: {0}")]
    Export(String),
}

impl From<psup_io::IoError> for PipelineError {
    fn from(e: psup_io::IoError) -> Self {
        match e {
            // a model error surfaced while loading is still a verification failure
            psup_io::IoError::Model(v) => PipelineError::Verification(v),
            other => PipelineError::Io(other),
        }
    }
}

// ---------- Options / outcome ----------

/// Run switches. Defaults are strict: verify, strip today's offers of invalid groups,
/// update displays. Advisory runs set `quarantine_on_alert` to false and only flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunOptions {
    pub verify: bool,
    /// Strict mode: remove today's offers of invalid groups. Advisory mode only reports.
    pub quarantine_on_alert: bool,
    pub update_displays: bool,
    /// Hand the loaded input to the sink for archiving before computing.
    pub archive_input: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { verify: true, quarantine_on_alert: true, update_displays: true, archive_input: false }
    }
}

/// Output of one computation plus what verification found.
#[derive(Clone, Debug, Default)]
pub struct RunOutcome {
    pub output: AdmissionOutput,
    pub findings: Vec<Finding>,
    pub quarantine: QuarantineOutcome,
}

// ---------- Entry points ----------

/// Computes the day's offers. With `verify`, input integrity violations are fatal
/// and output violations quarantine the groups involved.
pub fn compute(input: &AdmissionInput, verify: bool, quarantine_on_alert: bool) -> CoreResult<AdmissionOutput> {
    compute_with_findings(input, verify, quarantine_on_alert).map(|o| o.output)
}

pub fn compute_with_findings(input: &AdmissionInput, verify: bool, quarantine_on_alert: bool) -> CoreResult<RunOutcome> {
    info!("========== offer computation ==========");
    log_state(input);

    if verify {
        info!("---------- checking input integrity ----------");
        verify_input(input)?;
    }

    let mut output = psup_algo::compute_new_offers(input)?;
    info!(offers = output.offers_of_the_day_count(), "---------- offers of the day ----------");
    info!(
        responder = output.responder_resignation_count(),
        ordered = output.gdd_resignation_count(),
        "---------- automatic resignations ----------"
    );

    let mut outcome = RunOutcome::default();
    if verify {
        info!(offers = output.offers_of_the_day_count(), "---------- checking offers ----------");
        let report = verify_output(input, &output)?;
        outcome.quarantine = quarantine(&mut output, &report, quarantine_on_alert);
        outcome.findings = report.findings;
    }

    info!("========== offer computation done ==========");
    outcome.output = output;
    Ok(outcome)
}

fn log_state(input: &AdmissionInput) {
    info!(
        day = input.params.day,
        gdd_start_day = input.params.gdd_start_day,
        boarding_reservation_end_day = input.params.boarding_reservation_end_day,
        wishes = input.wishes().len(),
        "admission state before computation"
    );
    let counts = input.status_counts();
    for status in WishStatus::ALL {
        let n = counts.get(&status).copied().unwrap_or(0);
        if n > 0 {
            info!(status = status.name(), wishes = n, "wishes per status");
        }
    }
}
