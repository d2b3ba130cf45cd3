//! crates/psup_algo/src/orchestrator.rs
//! Outer loop: shrink boarding thresholds until no boarding group is over capacity.
//!
//! Each pass restarts the inner fixed point from the initial statuses with the
//! current thresholds. A boarding group over capacity that received a new offer
//! gets a strictly lower threshold, so the loop terminates.

use psup_core::{AdmissionInput, AdmissionOutput, BoardingGroupId, CoreResult, Wish};
use tracing::info;

use crate::fixpoint::{self, CascadeSwitches};
use crate::precompute::Precomputed;
use crate::thresholds;

/// Computes the day's offers and resignations. No verification is performed here.
pub fn compute_new_offers(input: &AdmissionInput) -> CoreResult<AdmissionOutput> {
    let switches = CascadeSwitches {
        ordered_resignations: input.params.gdd_active(),
        auto_responder: input.responder_enabled(),
    };
    if switches.ordered_resignations {
        info!("ordered-wish resignations will be applied");
    } else {
        info!("ordered-wish resignations will *not* be applied");
    }
    if switches.auto_responder {
        info!("auto-responder will be used");
    } else {
        info!("auto-responder will *not* be used");
    }

    let pre = Precomputed::build(input);
    let initial = input.initial_ledger();
    let mut working = thresholds::initial_thresholds(&pre.max_thresholds, &input.awaiting_ranks_per_boarding());

    info!("searching boarding thresholds without overcapacity");
    let mut outer: u32 = 1;
    loop {
        let ledger = fixpoint::compute_offers_and_resignations(&working, &initial, outer, switches, &pre, input)?;

        let before: i64 = working.values().map(|&t| i64::from(t)).sum();
        let placed = input.offered_candidates_per_boarding(&ledger);
        let with_new_offer = input.boarding_groups_with_new_offer(&ledger);

        let mut decreased = 0usize;
        for b in input.boarding_groups().values() {
            let current = working.get(&b.id).copied().unwrap_or(0);
            let overcapacity = placed.get(&b.id).copied().unwrap_or(0) as i64 - i64::from(b.capacity());
            if overcapacity > 0 && with_new_offer.contains(&b.id) && current > 0 {
                let awaiting = awaiting_by_rank_desc(&pre, input, b.id);
                working.insert(b.id, thresholds::shrink_threshold(current, &awaiting, overcapacity));
                decreased += 1;
            }
        }

        if decreased == 0 {
            info!(passes = outer, "offer computation done");
            return Ok(AdmissionOutput::assemble(input, working, pre.max_thresholds.clone(), &ledger));
        }
        let after: i64 = working.values().map(|&t| i64::from(t)).sum();
        info!(thresholds = decreased, ranks = before - after, "boarding thresholds decreased");
        outer += 1;
    }
}

fn awaiting_by_rank_desc<'a>(pre: &Precomputed, input: &'a AdmissionInput, id: BoardingGroupId) -> Vec<&'a Wish> {
    pre.awaiting_by_boarding_rank_desc
        .get(&id)
        .map(|ixs| ixs.iter().map(|&ix| &input.wishes()[ix]).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use psup_core::{
        BoardingGroup, BoardingRequest, CampaignParams, ProgramGroup, ProgramGroupId, WishFields, WishStatus, UNBOUNDED_RANK,
    };

    fn boarding_input(capacity: i32) -> AdmissionInput {
        let p = CampaignParams::new(10, 10, 90);
        let a = ProgramGroupId::new(1, 1, 1);
        let b = ProgramGroupId::new(2, 1, 2);
        let bid = BoardingGroupId::new(1, 0);
        let mut input = AdmissionInput::new(p);
        input.add_group(ProgramGroup::new(1, a, 0, 0, 0, &p).unwrap()).unwrap();
        input.add_group(ProgramGroup::new(1, b, 0, 0, 0, &p).unwrap()).unwrap();
        input.add_boarding_group(BoardingGroup::new(bid, capacity).unwrap()).unwrap();
        for (c, g, rank) in [(1, a, 1), (2, b, 2)] {
            input
                .add_wish(
                    Wish::new(WishFields {
                        candidate: c,
                        group: g,
                        call_order: 1,
                        status: WishStatus::Awaiting,
                        boarding: BoardingRequest::Ranked { boarding: bid, rank },
                        ..WishFields::default()
                    })
                    .unwrap(),
                )
                .unwrap();
        }
        input
    }

    #[test]
    fn overcapacity_shrinks_threshold_to_best_rank() {
        let input = boarding_input(1);
        let out = compute_new_offers(&input).unwrap();
        let bid = BoardingGroupId::new(1, 0);
        assert_eq!(out.thresholds[&bid], 1);
        assert_eq!(out.max_thresholds[&bid], UNBOUNDED_RANK);
        assert_eq!(out.wishes[0].status, WishStatus::OfferedToday);
        assert_eq!(out.wishes[1].status, WishStatus::Awaiting);
        assert_eq!(out.iteration_of(&out.wishes[0].id), 201);
    }

    #[test]
    fn enough_seats_keep_initial_threshold() {
        let input = boarding_input(2);
        let out = compute_new_offers(&input).unwrap();
        assert_eq!(out.thresholds[&BoardingGroupId::new(1, 0)], 2);
        assert_eq!(out.offers_of_the_day_count(), 2);
        assert_eq!(out.iteration_of(&out.wishes[1].id), 101);
    }
}
