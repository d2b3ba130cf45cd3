//! crates/psup_core/src/errors.rs
//! Typed verification errors: a closed set of reason codes plus the offending entity.
//! Every failure raised by the engine (construction checks, ledger misuse, input
//! integrity, output properties) is one of these; callers never match on strings.

use core::fmt;

use crate::ids::{BoardingGroupId, CandidateId, ProgramGroupId, WishId};

/// Machine-readable reason for a verification failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Reason {
    /// Free-form consistency failure (detail carries the explanation).
    Message,

    // ---------- Input assembly ----------
    DuplicateGroup,
    DuplicateBoardingGroup,
    DuplicateWish,

    // ---------- Entity construction ----------
    GroupParamsInconsistent,
    LastCalledInconsistent,
    NegativeCapacity,
    OutsideMainProcessStatus,
    NegativeRanks,
    MissingCallOrder,
    NullBoarding,

    // ---------- Ledger operations ----------
    OfferImpossible,
    AutoDeclineImpossible,
    OutsideMainProcessNotDeclinable,
    NotAnAutoResignation,

    // ---------- Input integrity ----------
    InputIntegrity,
    BoardingDuplicateWish,

    // ---------- Auto-responder properties ----------
    ResponderAwaitingWithoutRank,
    ResponderP7_1,
    ResponderP7_2,
    ResponderP7_3,
    ResponderP7_4,
    ResponderP7_5,
    ResponderP7_6,

    // ---------- Ordered-wish resignation properties ----------
    GddP8_1,
    GddP8_2,
    GddP8_3,

    // ---------- Output properties (recoverable, drive quarantine) ----------
    OutputP1,
    OutputP2,
    OutputP3,
    OutputP4,
    OutputP5,
    ThresholdAboveMaximum,
    OutputWishSetMismatch,
    UnknownGroup,

    // ---------- Displays ----------
    DisplayWaitlistOrder,
}

impl Reason {
    /// Stable code used in logs, reports and exit diagnostics.
    pub const fn code(self) -> &'static str {
        match self {
            Reason::Message => "MESSAGE",
            Reason::DuplicateGroup => "INPUT_DUPLICATE_GROUP",
            Reason::DuplicateBoardingGroup => "INPUT_DUPLICATE_BOARDING_GROUP",
            Reason::DuplicateWish => "INPUT_DUPLICATE_WISH",
            Reason::GroupParamsInconsistent => "GROUP_PARAMS_INCONSISTENT",
            Reason::LastCalledInconsistent => "GROUP_LAST_CALLED_INCONSISTENT",
            Reason::NegativeCapacity => "BOARDING_NEGATIVE_CAPACITY",
            Reason::OutsideMainProcessStatus => "WISH_OUTSIDE_MAIN_PROCESS_STATUS",
            Reason::NegativeRanks => "WISH_NEGATIVE_RANKS",
            Reason::MissingCallOrder => "WISH_MISSING_CALL_ORDER",
            Reason::NullBoarding => "WISH_NULL_BOARDING",
            Reason::OfferImpossible => "LEDGER_OFFER_IMPOSSIBLE",
            Reason::AutoDeclineImpossible => "LEDGER_AUTO_DECLINE_IMPOSSIBLE",
            Reason::OutsideMainProcessNotDeclinable => "LEDGER_OUTSIDE_MAIN_PROCESS_NOT_DECLINABLE",
            Reason::NotAnAutoResignation => "STATUS_NOT_AN_AUTO_RESIGNATION",
            Reason::InputIntegrity => "INPUT_INTEGRITY",
            Reason::BoardingDuplicateWish => "INPUT_BOARDING_DUPLICATE_WISH",
            Reason::ResponderAwaitingWithoutRank => "RESPONDER_AWAITING_WITHOUT_RANK",
            Reason::ResponderP7_1 => "RESPONDER_P7_1",
            Reason::ResponderP7_2 => "RESPONDER_P7_2",
            Reason::ResponderP7_3 => "RESPONDER_P7_3",
            Reason::ResponderP7_4 => "RESPONDER_P7_4",
            Reason::ResponderP7_5 => "RESPONDER_P7_5",
            Reason::ResponderP7_6 => "RESPONDER_P7_6",
            Reason::GddP8_1 => "GDD_P8_1",
            Reason::GddP8_2 => "GDD_P8_2",
            Reason::GddP8_3 => "GDD_P8_3",
            Reason::OutputP1 => "OUTPUT_P1_CALL_ORDER",
            Reason::OutputP2 => "OUTPUT_P2_CALL_AND_BOARDING_ORDER",
            Reason::OutputP3 => "OUTPUT_P3_BOARDING_ORDER",
            Reason::OutputP4 => "OUTPUT_P4_GROUP_CAPACITY",
            Reason::OutputP5 => "OUTPUT_P5_BOARDING_CAPACITY",
            Reason::ThresholdAboveMaximum => "OUTPUT_THRESHOLD_ABOVE_MAXIMUM",
            Reason::OutputWishSetMismatch => "OUTPUT_WISH_SET_MISMATCH",
            Reason::UnknownGroup => "OUTPUT_UNKNOWN_GROUP",
            Reason::DisplayWaitlistOrder => "DISPLAY_WAITLIST_ORDER",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Entity an error refers to.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Subject {
    None,
    Wish(WishId),
    Candidate(CandidateId),
    Group(ProgramGroupId),
    Boarding(BoardingGroupId),
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::None => f.write_str("-"),
            Subject::Wish(id) => write!(f, "{id}"),
            Subject::Candidate(id) => write!(f, "{id}"),
            Subject::Group(id) => write!(f, "{id}"),
            Subject::Boarding(id) => write!(f, "{id}"),
        }
    }
}

/// Verification failure: reason code, offending entity and human detail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationError {
    pub reason: Reason,
    pub subject: Subject,
    pub detail: String,
}

impl VerificationError {
    pub fn new(reason: Reason, subject: Subject) -> Self {
        Self { reason, subject, detail: String::new() }
    }

    pub fn with_detail(reason: Reason, subject: Subject, detail: impl Into<String>) -> Self {
        Self { reason, subject, detail: detail.into() }
    }

    pub fn wish(reason: Reason, id: WishId) -> Self {
        Self::new(reason, Subject::Wish(id))
    }
}

impl fmt::Display for VerificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.reason.code(), self.subject)?;
        if !self.detail.is_empty() {
            write!(f, ": {}", self.detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for VerificationError {}

pub type CoreResult<T> = Result<T, VerificationError>;
