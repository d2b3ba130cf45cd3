//! crates/psup_io/src/files.rs
//! File-backed source and sink for the daily run.

use std::path::{Path, PathBuf};

use psup_core::{AdmissionInput, AdmissionOutput};
use tracing::debug;

use crate::{loader, writer, IoResult};

/// Reads the day's input from one JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> IoResult<AdmissionInput> {
        loader::load_input_path(&self.path)
    }
}

/// Writes the output document, and optionally a canonical copy of the input.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    output: PathBuf,
    archive: Option<PathBuf>,
}

impl JsonFileSink {
    pub fn new(output: impl AsRef<Path>) -> Self {
        Self { output: output.as_ref().to_path_buf(), archive: None }
    }

    pub fn with_archive(mut self, path: impl AsRef<Path>) -> Self {
        self.archive = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn output_path(&self) -> &Path {
        &self.output
    }

    pub fn archive_path(&self) -> Option<&Path> {
        self.archive.as_deref()
    }

    pub fn write_output(&self, output: &AdmissionOutput) -> IoResult<()> {
        writer::write_output_path(&self.output, output)
    }

    /// No-op without an archive path.
    pub fn write_input_archive(&self, input: &AdmissionInput) -> IoResult<()> {
        match &self.archive {
            Some(path) => writer::write_input_path(path, input),
            None => {
                debug!("no archive path configured, input not archived");
                Ok(())
            }
        }
    }
}
