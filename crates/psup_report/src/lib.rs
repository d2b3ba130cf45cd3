//! psup_report: day summary of a computed output, and its renderers.
//!
//! No I/O here. Callers pass the output of the run (plus the findings and
//! input digest they hold) and write the rendered text themselves.

#![deny(unsafe_code)]

pub mod model;
#[cfg(feature = "render_html")]
pub mod render_html;
#[cfg(feature = "render_json")]
pub mod render_json;

pub use model::{build_summary, DaySummary, FindingRow, Resignations, StatusCount, ThresholdRow, Verdict};
#[cfg(feature = "render_html")]
pub use render_html::render_html;
#[cfg(feature = "render_json")]
pub use render_json::render_json;

#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    #[error("report serialization failed: {0}")]
    Serialize(String),
}
