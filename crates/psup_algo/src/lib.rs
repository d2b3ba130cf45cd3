// crates/psup_algo/src/lib.rs
#![forbid(unsafe_code)]

//! Allocation layer of the daily admission-offer engine.
//!
//! - `thresholds`: maximum and working boarding thresholds
//! - `precompute`: per-run indexes built once from the input
//! - `offers`, `resignations`, `fixpoint`: the inner offer/resignation cascade
//! - `orchestrator`: the outer loop shrinking boarding thresholds
//! - `display`: candidate-facing ranks and thresholds on the final output
//!
//! Depends only on `psup_core`; logs through `tracing`, never installs a subscriber.

pub mod display;
pub mod fixpoint;
pub mod offers;
pub mod orchestrator;
pub mod precompute;
pub mod resignations;
pub mod thresholds;

pub use display::{check_waitlist_order, update_displays};
pub use fixpoint::{compute_offers_and_resignations, CascadeSwitches};
pub use orchestrator::compute_new_offers;
pub use precompute::Precomputed;
