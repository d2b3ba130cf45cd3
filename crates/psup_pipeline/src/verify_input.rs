//! crates/psup_pipeline/src/verify_input.rs
//! Integrity of the input before any computation. Every violation is fatal.
//!
//! Per program group, among awaiting wishes: one candidate per call order, one
//! call order per candidate, call orders strictly positive. Per boarding group,
//! the same for boarding ranks. Then the auto-responder and ordered-resignation
//! properties over the raw statuses.

use std::collections::{BTreeMap, BTreeSet};

use psup_core::{
    AdmissionInput, BoardingGroupId, CandidateId, CoreResult, ProgramGroupId, Reason, Subject, VerificationError, Wish,
    WishId,
};
use tracing::info;

use crate::{gdd_checks, responder_checks};

pub fn verify_input(input: &AdmissionInput) -> CoreResult<()> {
    check_wish_references(input)?;

    info!(groups = input.groups().len(), "checking program groups");
    let mut by_group: BTreeMap<ProgramGroupId, Vec<&Wish>> = BTreeMap::new();
    let mut by_boarding: BTreeMap<BoardingGroupId, Vec<&Wish>> = BTreeMap::new();
    for w in input.wishes() {
        by_group.entry(w.group).or_default().push(w);
        if let Some(b) = w.boarding {
            by_boarding.entry(b).or_default().push(w);
        }
    }
    for gid in input.groups().keys() {
        let wishes = by_group.get(gid).map(Vec::as_slice).unwrap_or_default();
        check_group(*gid, wishes)?;
    }

    info!(boarding_groups = input.boarding_groups().len(), "checking boarding groups");
    for bid in input.boarding_groups().keys() {
        let wishes = by_boarding.get(bid).map(Vec::as_slice).unwrap_or_default();
        check_boarding(*bid, wishes)?;
    }

    info!("checking auto-responder properties");
    responder_checks::verify(input.wishes(), input.responders())?;
    info!("checking ordered-wish resignation properties");
    gdd_checks::verify(input.wishes(), &input.params, input.responders())?;
    Ok(())
}

/// Wishes point to known groups, and a boarding group not shared across programs
/// belongs to the wish's own program.
fn check_wish_references(input: &AdmissionInput) -> CoreResult<()> {
    info!("checking group and boarding references of wishes");
    for w in input.wishes() {
        if !input.groups().contains_key(&w.group) {
            return Err(VerificationError::with_detail(Reason::UnknownGroup, Subject::Wish(w.id), w.group.to_string()));
        }
        if let Some(b) = w.boarding {
            if !input.boarding_groups().contains_key(&b) {
                return Err(VerificationError::with_detail(Reason::UnknownGroup, Subject::Wish(w.id), b.to_string()));
            }
            if !b.is_shared() && b.program != w.id.program {
                return Err(VerificationError::with_detail(
                    Reason::InputIntegrity,
                    Subject::Wish(w.id),
                    format!("boarding group {b} belongs to another program"),
                ));
            }
        }
    }
    Ok(())
}

/// One-to-one mapping between ranks and candidates among awaiting wishes.
struct RankBijection {
    rank_to_candidate: BTreeMap<i32, CandidateId>,
    candidate_to_rank: BTreeMap<CandidateId, i32>,
}

impl RankBijection {
    fn new() -> Self {
        Self { rank_to_candidate: BTreeMap::new(), candidate_to_rank: BTreeMap::new() }
    }

    /// Returns false when either direction already maps elsewhere.
    fn insert(&mut self, rank: i32, candidate: CandidateId) -> bool {
        let by_rank = *self.rank_to_candidate.entry(rank).or_insert(candidate);
        let by_candidate = *self.candidate_to_rank.entry(candidate).or_insert(rank);
        by_rank == candidate && by_candidate == rank
    }
}

fn check_group(id: ProgramGroupId, wishes: &[&Wish]) -> CoreResult<()> {
    let mut seen: BTreeSet<WishId> = BTreeSet::new();
    let mut orders = RankBijection::new();
    for w in wishes {
        if !seen.insert(w.id) {
            return Err(VerificationError::wish(Reason::DuplicateWish, w.id));
        }
        if !w.status.is_awaiting() {
            continue;
        }
        if !orders.insert(w.call_order, w.candidate()) {
            return Err(VerificationError::with_detail(
                Reason::InputIntegrity,
                Subject::Group(id),
                format!("call order {} shared or {} ranked twice", w.call_order, w.candidate()),
            ));
        }
        if w.call_order <= 0 {
            return Err(VerificationError::with_detail(
                Reason::InputIntegrity,
                Subject::Wish(w.id),
                "awaiting wish without a positive call order",
            ));
        }
    }
    Ok(())
}

fn check_boarding(id: BoardingGroupId, wishes: &[&Wish]) -> CoreResult<()> {
    let mut ranks = RankBijection::new();
    for w in wishes.iter().filter(|w| w.status.is_awaiting()) {
        if w.boarding_rank <= 0 {
            return Err(VerificationError::with_detail(
                Reason::InputIntegrity,
                Subject::Wish(w.id),
                "awaiting boarding wish without a positive boarding rank",
            ));
        }
        if !ranks.insert(w.boarding_rank, w.candidate()) {
            return Err(VerificationError::with_detail(
                Reason::BoardingDuplicateWish,
                Subject::Boarding(id),
                format!("boarding rank {} shared or {} ranked twice", w.boarding_rank, w.candidate()),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use psup_core::{BoardingGroup, BoardingRequest, CampaignParams, ProgramGroup, WishFields, WishStatus};

    fn gid() -> ProgramGroupId {
        ProgramGroupId::new(1, 1, 1)
    }

    fn base() -> AdmissionInput {
        let params = CampaignParams::new(5, 10, 20);
        let mut input = AdmissionInput::new(params);
        input.add_group(ProgramGroup::new(2, gid(), 0, 0, 0, &params).unwrap()).unwrap();
        input
    }

    fn awaiting(candidate: i32, order: i32, boarding: BoardingRequest) -> Wish {
        Wish::new(WishFields {
            candidate,
            group: gid(),
            call_order: order,
            status: WishStatus::Awaiting,
            boarding,
            ..WishFields::default()
        })
        .unwrap()
    }

    #[test]
    fn clean_input_passes() {
        let mut input = base();
        input.add_wish(awaiting(1, 1, BoardingRequest::None)).unwrap();
        input.add_wish(awaiting(2, 2, BoardingRequest::None)).unwrap();
        verify_input(&input).unwrap();
    }

    #[test]
    fn shared_call_order_is_rejected() {
        let mut input = base();
        input.add_wish(awaiting(1, 1, BoardingRequest::None)).unwrap();
        input.add_wish(awaiting(2, 1, BoardingRequest::None)).unwrap();
        let err = verify_input(&input).unwrap_err();
        assert_eq!(err.reason, Reason::InputIntegrity);
        assert_eq!(err.subject, Subject::Group(gid()));
    }

    #[test]
    fn candidate_with_two_call_orders_is_rejected() {
        let mut input = base();
        let bid = BoardingGroupId::new(7, 0);
        input.add_boarding_group(BoardingGroup::new(bid, 1).unwrap()).unwrap();
        input.add_wish(awaiting(1, 1, BoardingRequest::None)).unwrap();
        input.add_wish(awaiting(1, 2, BoardingRequest::Ranked { boarding: bid, rank: 1 })).unwrap();
        assert_eq!(verify_input(&input).unwrap_err().reason, Reason::InputIntegrity);
    }

    #[test]
    fn shared_boarding_rank_is_rejected() {
        let mut input = base();
        let bid = BoardingGroupId::new(7, 0);
        input.add_boarding_group(BoardingGroup::new(bid, 1).unwrap()).unwrap();
        input.add_wish(awaiting(1, 1, BoardingRequest::Ranked { boarding: bid, rank: 1 })).unwrap();
        input.add_wish(awaiting(2, 2, BoardingRequest::Ranked { boarding: bid, rank: 1 })).unwrap();
        let err = verify_input(&input).unwrap_err();
        assert_eq!(err.reason, Reason::BoardingDuplicateWish);
        assert_eq!(err.subject, Subject::Boarding(bid));
    }

    #[test]
    fn boarding_of_another_program_is_rejected() {
        let mut input = base();
        let bid = BoardingGroupId::new(7, 99);
        input.add_boarding_group(BoardingGroup::new(bid, 1).unwrap()).unwrap();
        input.add_wish(awaiting(1, 1, BoardingRequest::Ranked { boarding: bid, rank: 1 })).unwrap();
        assert_eq!(verify_input(&input).unwrap_err().reason, Reason::InputIntegrity);
    }

    #[test]
    fn unknown_group_is_rejected() {
        let mut input = base();
        let mut w = awaiting(1, 1, BoardingRequest::None);
        w.group = ProgramGroupId::new(9, 9, 9);
        input.add_wish(w).unwrap();
        assert_eq!(verify_input(&input).unwrap_err().reason, Reason::UnknownGroup);
    }
}
