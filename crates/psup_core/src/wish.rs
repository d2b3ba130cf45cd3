//! crates/psup_core/src/wish.rs
//! A candidate's wish for a program group, optionally with a boarding request.
//!
//! Wishes are immutable once built; the status a run assigns lives in the
//! [`crate::ledger::StatusLedger`] and is copied back with [`Wish::with_status`].

use crate::errors::{CoreResult, Reason, VerificationError};
use crate::ids::{BoardingGroupId, BoardingPlacement, CandidateId, ProgramGroupId, WishId};
use crate::status::WishStatus;

/// Boarding part of a wish.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BoardingRequest {
    #[default]
    None,
    /// Boarding requested, but the resource does not rank candidates itself.
    Unranked,
    /// Boarding requested with its own ranking.
    Ranked { boarding: BoardingGroupId, rank: i32 },
}

impl BoardingRequest {
    #[inline]
    pub fn is_requested(&self) -> bool {
        !matches!(self, BoardingRequest::None)
    }
}

/// Construction arguments for [`Wish::new`].
#[derive(Clone, Debug)]
pub struct WishFields {
    pub candidate: i32,
    pub group: ProgramGroupId,
    pub call_order: i32,
    pub displayed_call_order: i32,
    pub preference_rank: i32,
    pub status: WishStatus,
    pub boarding: BoardingRequest,
    pub outside_main_process: bool,
    pub ignored_in_waitlist_ranks: bool,
    pub ignored_in_displayed_thresholds: bool,
    pub previous_waitlist_rank: i32,
}

impl Default for WishFields {
    fn default() -> Self {
        Self {
            candidate: 0,
            group: ProgramGroupId::new(0, 0, 0),
            call_order: 0,
            displayed_call_order: 0,
            preference_rank: 0,
            status: WishStatus::NotRanked,
            boarding: BoardingRequest::None,
            outside_main_process: false,
            ignored_in_waitlist_ranks: false,
            ignored_in_displayed_thresholds: false,
            previous_waitlist_rank: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wish {
    pub id: WishId,
    pub group: ProgramGroupId,
    /// Call order used by allocation (unique per group).
    pub call_order: i32,
    /// Call order shown to the candidate; may differ after ranking corrections.
    pub displayed_call_order: i32,
    pub status: WishStatus,
    /// Candidate's own preference (0 = not ranked by the candidate).
    pub preference_rank: i32,
    /// Ranked boarding group, if any.
    pub boarding: Option<BoardingGroupId>,
    /// Boarding rank (0 without ranked boarding).
    pub boarding_rank: i32,
    pub ignored_in_waitlist_ranks: bool,
    pub ignored_in_displayed_thresholds: bool,
    pub previous_waitlist_rank: i32,
    /// Waitlist rank computed for display on the output copy.
    pub waitlist_rank: i32,
    outside_main_process: bool,
}

impl Wish {
    pub fn new(f: WishFields) -> CoreResult<Self> {
        let (boarding_flag, boarding, boarding_rank) = match f.boarding {
            BoardingRequest::None => (false, None, 0),
            BoardingRequest::Unranked => (true, None, 0),
            BoardingRequest::Ranked { boarding, rank } => (true, Some(boarding), rank),
        };
        let id = WishId::new(f.candidate, f.group.program, boarding_flag);

        if f.outside_main_process && !f.status.was_offered_previously() {
            return Err(VerificationError::wish(Reason::OutsideMainProcessStatus, id));
        }
        if f.call_order < 0 || f.preference_rank < 0 || boarding_rank < 0 {
            return Err(VerificationError::wish(Reason::NegativeRanks, id));
        }
        if f.call_order == 0 && !f.status.was_offered_previously() && f.status != WishStatus::NotRanked {
            return Err(VerificationError::wish(Reason::MissingCallOrder, id));
        }

        Ok(Self {
            id,
            group: f.group,
            call_order: f.call_order,
            displayed_call_order: f.displayed_call_order,
            status: f.status,
            preference_rank: f.preference_rank,
            boarding,
            boarding_rank,
            ignored_in_waitlist_ranks: f.ignored_in_waitlist_ranks,
            ignored_in_displayed_thresholds: f.ignored_in_displayed_thresholds,
            previous_waitlist_rank: f.previous_waitlist_rank,
            waitlist_rank: 0,
            outside_main_process: f.outside_main_process,
        })
    }

    /// Copy carrying another status.
    pub fn with_status(&self, status: WishStatus) -> Self {
        Self { status, ..self.clone() }
    }

    #[inline]
    pub fn candidate(&self) -> CandidateId {
        self.id.candidate
    }

    /// Resolved outside the main process (committee or direct admission).
    #[inline]
    pub fn is_outside_main_process(&self) -> bool {
        self.outside_main_process
    }

    /// The auto-responder can act on this wish only if the candidate ranked it.
    #[inline]
    pub fn responder_capable(&self) -> bool {
        self.preference_rank > 0
    }

    #[inline]
    pub fn has_ranked_boarding(&self) -> bool {
        self.boarding.is_some()
    }

    pub fn boarding_placement(&self) -> Option<BoardingPlacement> {
        self.boarding.map(|boarding| BoardingPlacement { candidate: self.candidate(), boarding })
    }

    /// Rebuilds the construction arguments (used to replay an output as input).
    pub fn fields(&self) -> WishFields {
        WishFields {
            candidate: self.id.candidate.0,
            group: self.group,
            call_order: self.call_order,
            displayed_call_order: self.displayed_call_order,
            preference_rank: self.preference_rank,
            status: self.status,
            boarding: match self.boarding {
                Some(boarding) => BoardingRequest::Ranked { boarding, rank: self.boarding_rank },
                None if self.id.boarding => BoardingRequest::Unranked,
                None => BoardingRequest::None,
            },
            outside_main_process: self.outside_main_process,
            ignored_in_waitlist_ranks: self.ignored_in_waitlist_ranks,
            ignored_in_displayed_thresholds: self.ignored_in_displayed_thresholds,
            previous_waitlist_rank: self.previous_waitlist_rank,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn g() -> ProgramGroupId {
        ProgramGroupId::new(1, 2, 3)
    }

    #[test]
    fn outside_main_process_requires_previous_offer() {
        let err = Wish::new(WishFields {
            candidate: 1,
            group: g(),
            call_order: 1,
            status: WishStatus::Awaiting,
            outside_main_process: true,
            ..WishFields::default()
        })
        .unwrap_err();
        assert_eq!(err.reason, Reason::OutsideMainProcessStatus);

        let ok = Wish::new(WishFields {
            candidate: 1,
            group: g(),
            status: WishStatus::OfferedPreviouslyAccepted,
            outside_main_process: true,
            ..WishFields::default()
        })
        .unwrap();
        assert!(ok.is_outside_main_process());
    }

    #[test]
    fn negative_ranks_rejected() {
        let err = Wish::new(WishFields {
            candidate: 1,
            group: g(),
            call_order: 1,
            status: WishStatus::Awaiting,
            boarding: BoardingRequest::Ranked { boarding: BoardingGroupId::new(1, 0), rank: -1 },
            ..WishFields::default()
        })
        .unwrap_err();
        assert_eq!(err.reason, Reason::NegativeRanks);
        assert_eq!(err.subject, crate::errors::Subject::Wish(WishId::new(1, 3, true)));
    }

    #[test]
    fn call_order_zero_only_for_previous_offers_or_unranked() {
        let err = Wish::new(WishFields {
            candidate: 1,
            group: g(),
            status: WishStatus::Awaiting,
            ..WishFields::default()
        })
        .unwrap_err();
        assert_eq!(err.reason, Reason::MissingCallOrder);
        assert!(Wish::new(WishFields { candidate: 1, group: g(), ..WishFields::default() }).is_ok());
    }

    #[test]
    fn boarding_shapes() {
        let unranked = Wish::new(WishFields {
            candidate: 4,
            group: g(),
            call_order: 2,
            status: WishStatus::Awaiting,
            boarding: BoardingRequest::Unranked,
            ..WishFields::default()
        })
        .unwrap();
        assert!(unranked.id.boarding);
        assert!(!unranked.has_ranked_boarding());
        assert_eq!(unranked.boarding_rank, 0);
        assert_eq!(unranked.fields().boarding, BoardingRequest::Unranked);

        let b = BoardingGroupId::new(9, 0);
        let ranked = Wish::new(WishFields {
            candidate: 4,
            group: g(),
            call_order: 2,
            preference_rank: 3,
            status: WishStatus::Awaiting,
            boarding: BoardingRequest::Ranked { boarding: b, rank: 7 },
            ..WishFields::default()
        })
        .unwrap();
        assert_eq!(ranked.boarding_placement(), Some(BoardingPlacement { candidate: CandidateId(4), boarding: b }));
        assert!(ranked.responder_capable());
        let copy = ranked.with_status(WishStatus::OfferedToday);
        assert_eq!(copy.id, ranked.id);
        assert_eq!(copy.status, WishStatus::OfferedToday);
    }
}
