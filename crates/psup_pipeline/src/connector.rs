//! crates/psup_pipeline/src/connector.rs
//! Daily run over pluggable data access: fetch the input, compute, update the
//! display figures, export. File-backed implementations come from `psup_io`.

use std::collections::BTreeSet;
use std::time::Instant;

use psup_core::{AdmissionInput, AdmissionOutput, WishId};
use psup_io::{JsonFileSink, JsonFileSource};
use tracing::info;

use crate::{compute_with_findings, PipelineError, RunOptions, RunOutcome};

/// Where the day's admission state comes from.
pub trait AdmissionSource {
    fn fetch(&mut self) -> Result<AdmissionInput, PipelineError>;
}

/// Where the day's results go.
pub trait AdmissionSink {
    /// Keeps a copy of the input as loaded. Sinks without an archive ignore it.
    fn archive_input(&mut self, _input: &AdmissionInput) -> Result<(), PipelineError> {
        Ok(())
    }

    fn export(&mut self, output: &AdmissionOutput) -> Result<(), PipelineError>;
}

/// One daily execution between a source and a sink.
pub struct DailyRun<S, K> {
    source: S,
    sink: K,
}

impl<S: AdmissionSource, K: AdmissionSink> DailyRun<S, K> {
    pub fn new(source: S, sink: K) -> Self {
        Self { source, sink }
    }

    pub fn execute(&mut self, options: &RunOptions) -> Result<RunOutcome, PipelineError> {
        let started = Instant::now();

        info!("fetching admission data");
        let input = self.source.fetch()?;
        if options.archive_input {
            info!("archiving input");
            self.sink.archive_input(&input)?;
        }

        let computing = Instant::now();
        let mut outcome = compute_with_findings(&input, options.verify, options.quarantine_on_alert)?;
        if outcome.output.alert() {
            info!("{}", outcome.output.alert_message());
        }
        if outcome.output.warning() {
            info!("verification raised a warning");
        }

        if options.update_displays {
            let offers: BTreeSet<WishId> = outcome
                .output
                .wishes
                .iter()
                .filter(|w| w.status.is_offer_of_the_day())
                .map(|w| w.id)
                .collect();
            psup_algo::update_displays(&mut outcome.output, &offers)?;
        }
        info!(elapsed_ms = computing.elapsed().as_millis() as u64, "computation time");

        info!("exporting results");
        self.sink.export(&outcome.output)?;
        info!(elapsed_ms = started.elapsed().as_millis() as u64, "total time including import and export");
        Ok(outcome)
    }

    pub fn into_parts(self) -> (S, K) {
        (self.source, self.sink)
    }
}

// ---------- File-backed connectors ----------

impl AdmissionSource for JsonFileSource {
    fn fetch(&mut self) -> Result<AdmissionInput, PipelineError> {
        Ok(self.load()?)
    }
}

impl AdmissionSink for JsonFileSink {
    fn archive_input(&mut self, input: &AdmissionInput) -> Result<(), PipelineError> {
        Ok(self.write_input_archive(input)?)
    }

    fn export(&mut self, output: &AdmissionOutput) -> Result<(), PipelineError> {
        Ok(self.write_output(output)?)
    }
}

// ---------- In-memory connectors ----------

/// Source handing out a prepared input once.
#[derive(Debug, Default)]
pub struct MemorySource(pub Option<AdmissionInput>);

impl AdmissionSource for MemorySource {
    fn fetch(&mut self) -> Result<AdmissionInput, PipelineError> {
        self.0.take().ok_or_else(|| PipelineError::Export("input already consumed".into()))
    }
}

/// Sink keeping everything it receives.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub archived: Option<AdmissionInput>,
    pub exported: Option<AdmissionOutput>,
}

impl AdmissionSink for MemorySink {
    fn archive_input(&mut self, input: &AdmissionInput) -> Result<(), PipelineError> {
        self.archived = Some(input.clone());
        Ok(())
    }

    fn export(&mut self, output: &AdmissionOutput) -> Result<(), PipelineError> {
        self.exported = Some(output.clone());
        Ok(())
    }
}
