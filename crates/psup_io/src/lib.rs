//! crates/psup_io/src/lib.rs
//! I/O for the admission engine: the JSON wire format of the daily input and
//! output documents, schema validation of the input, canonical JSON writing,
//! SHA-256 digests, and file-backed source/sink types.
//!
//! Core types are only ever built through their validating constructors, so a
//! document that loads is a well-formed [`psup_core::AdmissionInput`].

#![forbid(unsafe_code)]

use std::path::PathBuf;

use psup_core::VerificationError;
use thiserror::Error;

pub mod canonical_json;
pub mod files;
pub mod hasher;
pub mod loader;
pub mod schema;
pub mod wire;
pub mod writer;

pub use files::{JsonFileSink, JsonFileSource};
pub use loader::{load_input_path, load_input_str};
pub use writer::{write_input_path, write_output_path};

/// Unified error for psup_io.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON syntax or shape errors, with a JSON Pointer when known.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// Schema validation failure at the first offending instance path.
    #[error("schema error at {pointer}: {msg}")]
    Schema { pointer: String, msg: String },

    /// The document is valid JSON but a core constructor rejected it.
    #[error("model error: {0}")]
    Model(#[from] VerificationError),

    #[error("io/path error: {0}")]
    Path(String),
}

pub type IoResult<T> = Result<T, IoError>;

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        IoError::Json { pointer: "/".to_string(), msg: e.to_string() }
    }
}
