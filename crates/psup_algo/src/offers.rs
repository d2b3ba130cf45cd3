//! crates/psup_algo/src/offers.rs
//! The three offer passes, one per group category.
//!
//! Each pass only reads the ledger and returns the wishes to offer; the caller
//! applies them before running the next pass. Lists are walked in ascending call
//! order. A wish gets an offer when a seat remains or its call order is within
//! the bloc-call limit.

use std::collections::{BTreeMap, BTreeSet};

use psup_core::{AdmissionInput, BoardingGroupId, BoardingPlacement, CandidateId, ProgramGroupId, StatusLedger, WishIx};

use crate::precompute::Precomputed;

fn offered_in_group<'a>(
    pre: &'a Precomputed,
    ledger: &'a StatusLedger,
    group: &ProgramGroupId,
) -> impl Iterator<Item = WishIx> + 'a {
    pre.awaiting_or_offered_by_group
        .get(group)
        .into_iter()
        .flatten()
        .copied()
        .filter(move |&ix| ledger.is_offer(ix))
}

/// Groups without any boarding request: one wish per candidate, so seats are a countdown.
/// Each group is independent of the others.
pub fn offers_without_boarding(
    pre: &Precomputed,
    input: &AdmissionInput,
    ledger: &StatusLedger,
    groups: &[ProgramGroupId],
) -> Vec<WishIx> {
    let wishes = input.wishes();
    let mut out = Vec::new();
    for gid in groups {
        let (Some(group), Some(list)) = (input.groups().get(gid), pre.awaiting_by_call_order.get(gid)) else {
            continue;
        };
        let offered = offered_in_group(pre, ledger, gid).count() as i64;
        let mut seats = i64::from(group.capacity) - offered;
        for &ix in list {
            if !ledger.is_awaiting(ix) {
                continue;
            }
            let bloc_call = wishes[ix].call_order <= group.bloc_call_limit;
            if seats > 0 || bloc_call {
                out.push(ix);
                seats -= 1;
            } else {
                break;
            }
        }
    }
    out
}

/// Groups with unranked boarding: seats are counted per distinct candidate, and a
/// candidate already counted passes even when seats are exhausted.
pub fn offers_boarding_unranked(
    pre: &Precomputed,
    input: &AdmissionInput,
    ledger: &StatusLedger,
    groups: &[ProgramGroupId],
) -> Vec<WishIx> {
    let wishes = input.wishes();
    let mut out = Vec::new();
    for gid in groups {
        let (Some(group), Some(list)) = (input.groups().get(gid), pre.awaiting_by_call_order.get(gid)) else {
            continue;
        };
        let mut placed: BTreeSet<CandidateId> =
            offered_in_group(pre, ledger, gid).map(|ix| wishes[ix].candidate()).collect();
        for &ix in list {
            if !ledger.is_awaiting(ix) {
                continue;
            }
            let w = &wishes[ix];
            let seats_left = i64::from(group.capacity) > placed.len() as i64;
            let bloc_call = w.call_order <= group.bloc_call_limit;
            if seats_left || bloc_call || placed.contains(&w.candidate()) {
                out.push(ix);
                placed.insert(w.candidate());
            } else {
                break;
            }
        }
    }
    out
}

/// Groups with ranked boarding. A ranked boarding wish is eligible when its rank is
/// within the working threshold of its boarding group or the candidate already holds
/// a seat there. Ineligible wishes are skipped; the walk does not stop on them.
pub fn offers_boarding_ranked(
    pre: &Precomputed,
    input: &AdmissionInput,
    ledger: &StatusLedger,
    groups: &[ProgramGroupId],
    thresholds: &BTreeMap<BoardingGroupId, i32>,
) -> Vec<WishIx> {
    let wishes = input.wishes();
    let seated: BTreeSet<BoardingPlacement> = pre
        .boarding_placements
        .iter()
        .filter(|(ix, _)| ledger.is_offer(**ix))
        .map(|(_, p)| *p)
        .collect();

    let mut out = Vec::new();
    for gid in groups {
        let Some(group) = input.groups().get(gid) else {
            continue;
        };
        let mut placed: BTreeSet<CandidateId> =
            offered_in_group(pre, ledger, gid).map(|ix| wishes[ix].candidate()).collect();
        let awaiting = pre.awaiting_by_call_order.get(gid).into_iter().flatten().copied();
        for ix in awaiting.filter(|&ix| ledger.is_awaiting(ix)) {
            let w = &wishes[ix];
            let eligible = match w.boarding_placement() {
                Some(p) => {
                    let threshold = thresholds.get(&p.boarding).copied().unwrap_or(0);
                    w.boarding_rank <= threshold || seated.contains(&p)
                }
                None => true,
            };
            if eligible
                && (w.call_order <= group.bloc_call_limit
                    || placed.contains(&w.candidate())
                    || (placed.len() as i64) < i64::from(group.capacity))
            {
                out.push(ix);
                placed.insert(w.candidate());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use psup_core::{BoardingGroup, BoardingRequest, CampaignParams, ProgramGroup, Wish, WishFields, WishStatus};

    fn p() -> CampaignParams {
        CampaignParams::new(3, 10, 20)
    }

    fn wish(c: i32, g: ProgramGroupId, order: i32, boarding: BoardingRequest, status: WishStatus) -> Wish {
        Wish::new(WishFields { candidate: c, group: g, call_order: order, status, boarding, ..WishFields::default() }).unwrap()
    }

    #[test]
    fn countdown_stops_at_first_refusal() {
        let g = ProgramGroupId::new(1, 1, 1);
        let mut input = AdmissionInput::new(p());
        input.add_group(ProgramGroup::new(1, g, 0, 0, 0, &p()).unwrap()).unwrap();
        input.add_wish(wish(1, g, 1, BoardingRequest::None, WishStatus::Awaiting)).unwrap();
        input.add_wish(wish(2, g, 2, BoardingRequest::None, WishStatus::Awaiting)).unwrap();
        let pre = Precomputed::build(&input);
        let ledger = input.initial_ledger();
        assert_eq!(offers_without_boarding(&pre, &input, &ledger, &pre.groups_without_boarding), vec![0]);
    }

    #[test]
    fn bloc_call_ignores_capacity() {
        let g = ProgramGroupId::new(1, 1, 1);
        let mut input = AdmissionInput::new(p());
        input.add_group(ProgramGroup::new(1, g, 3, 0, 0, &p()).unwrap()).unwrap();
        for c in 1..=4 {
            input.add_wish(wish(c, g, c, BoardingRequest::None, WishStatus::Awaiting)).unwrap();
        }
        let pre = Precomputed::build(&input);
        let ledger = input.initial_ledger();
        assert_eq!(offers_without_boarding(&pre, &input, &ledger, &pre.groups_without_boarding), vec![0, 1, 2]);
    }

    #[test]
    fn unranked_boarding_counts_candidates_once() {
        let g = ProgramGroupId::new(1, 1, 1);
        let mut input = AdmissionInput::new(p());
        input.add_group(ProgramGroup::new(1, g, 0, 0, 0, &p()).unwrap()).unwrap();
        // candidate 1 holds both a boarding and a non-boarding wish at call order 1
        input.add_wish(wish(1, g, 1, BoardingRequest::None, WishStatus::Awaiting)).unwrap();
        input.add_wish(wish(1, g, 1, BoardingRequest::Unranked, WishStatus::Awaiting)).unwrap();
        input.add_wish(wish(2, g, 2, BoardingRequest::Unranked, WishStatus::Awaiting)).unwrap();
        let pre = Precomputed::build(&input);
        let ledger = input.initial_ledger();
        assert_eq!(offers_boarding_unranked(&pre, &input, &ledger, &pre.groups_boarding_unranked), vec![0, 1]);
    }

    #[test]
    fn ranked_boarding_skips_wishes_over_threshold() {
        let g = ProgramGroupId::new(1, 1, 1);
        let b = BoardingGroupId::new(1, 0);
        let mut input = AdmissionInput::new(p());
        input.add_group(ProgramGroup::new(2, g, 0, 0, 0, &p()).unwrap()).unwrap();
        input.add_boarding_group(BoardingGroup::new(b, 5).unwrap()).unwrap();
        input.add_wish(wish(1, g, 1, BoardingRequest::Ranked { boarding: b, rank: 9 }, WishStatus::Awaiting)).unwrap();
        input.add_wish(wish(2, g, 2, BoardingRequest::Ranked { boarding: b, rank: 1 }, WishStatus::Awaiting)).unwrap();
        input.add_wish(wish(3, g, 3, BoardingRequest::None, WishStatus::Awaiting)).unwrap();
        input.add_wish(wish(4, g, 4, BoardingRequest::None, WishStatus::Awaiting)).unwrap();
        let pre = Precomputed::build(&input);
        let ledger = input.initial_ledger();
        let thresholds: BTreeMap<_, _> = [(b, 5)].into_iter().collect();
        let got = offers_boarding_ranked(&pre, &input, &ledger, &pre.groups_boarding_ranked, &thresholds);
        assert_eq!(got, vec![1, 2]);
    }
}
