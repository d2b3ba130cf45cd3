//! crates/psup_io/src/loader.rs
//! Reads a daily input document: size-capped read, JSON parse, schema
//! validation, then conversion through the core constructors.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use psup_core::AdmissionInput;
use serde_json::Value;
use tracing::{debug, info};

use crate::wire::InputDoc;
use crate::{schema, IoError, IoResult};

/// Upper bound on an input document.
pub const MAX_INPUT_BYTES: u64 = 512 * 1024 * 1024;

pub fn load_input_path(path: &Path) -> IoResult<AdmissionInput> {
    let read_err = |source| IoError::Read { path: path.to_path_buf(), source };
    let file = File::open(path).map_err(read_err)?;
    let mut text = String::new();
    file.take(MAX_INPUT_BYTES + 1).read_to_string(&mut text).map_err(read_err)?;
    if text.len() as u64 > MAX_INPUT_BYTES {
        return Err(IoError::Path(format!(
            "{} exceeds {} bytes",
            path.display(),
            MAX_INPUT_BYTES
        )));
    }
    info!(path = %path.display(), bytes = text.len(), "loading admission input");
    load_input_str(&text)
}

pub fn load_input_str(text: &str) -> IoResult<AdmissionInput> {
    let value: Value = serde_json::from_str(text)?;
    load_input_value(value)
}

pub fn load_input_value(value: Value) -> IoResult<AdmissionInput> {
    schema::validate_input(&value)?;
    let doc: InputDoc = serde_json::from_value(value)?;
    debug!(
        groups = doc.groups.len(),
        boarding_groups = doc.boarding_groups.len(),
        wishes = doc.wishes.len(),
        responders = doc.responder_candidates.len(),
        "input document parsed"
    );
    Ok(doc.into_input()?)
}
