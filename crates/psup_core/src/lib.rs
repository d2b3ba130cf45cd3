//! psup_core: Core types of the daily admission-offer engine.
//!
//! This crate is **I/O-free** and does not log. It defines the data model shared
//! by `psup_algo`, `psup_pipeline`, `psup_io`, `psup_report` and `psup_cli`:
//!
//! - Identifiers: candidates, wishes, program groups, boarding groups
//! - `WishStatus` and its classifier predicates
//! - `Wish`, `ProgramGroup`, `BoardingGroup`, `CampaignParams`
//! - `StatusLedger`: the single mutable structure of a run (arena-indexed)
//! - `AdmissionInput` / `AdmissionOutput` bundles
//! - `VerificationError` with stable reason codes
//!
//! Serialization derives (ids, statuses, params) are gated behind the `serde` feature.

pub mod errors;
pub mod groups;
pub mod ids;
pub mod input;
pub mod ledger;
pub mod output;
pub mod params;
pub mod status;
pub mod wish;

pub use errors::{CoreResult, Reason, Subject, VerificationError};
pub use groups::{BoardingGroup, ProgramGroup, UNBOUNDED_RANK};
pub use ids::{BoardingGroupId, BoardingPlacement, CandidateId, ProgramGroupId, WishId};
pub use input::AdmissionInput;
pub use ledger::{StatusLedger, WishIx};
pub use output::AdmissionOutput;
pub use params::CampaignParams;
pub use status::{AutoResignationKind, WishStatus};
pub use wish::{BoardingRequest, Wish, WishFields};
