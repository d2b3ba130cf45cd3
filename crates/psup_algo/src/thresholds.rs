//! crates/psup_algo/src/thresholds.rs
//! Boarding admission thresholds ("barres internat").
//!
//! The maximal threshold bounds how far down its ranking a boarding group may
//! admit without risking more boarders than seats once programs have called
//! the candidates they are expected to call by the reservation end day. The
//! initial working threshold is the lower of that bound and the worst awaiting rank.

use std::collections::{BTreeMap, BTreeSet};

use psup_core::{AdmissionInput, BoardingGroup, BoardingGroupId, CampaignParams, CandidateId, ProgramGroupId, Wish, UNBOUNDED_RANK};

/// Highest boarding rank the group may admit, given each program group's estimated
/// last-called rank at the reservation end day.
///
/// Wishes are scanned by ascending boarding rank. A wish counts toward the vacant
/// seats when its call order is under its program's estimate, its candidate does not
/// already hold an offer in this boarding group, and its rank differs from the last
/// counted one (the same candidate may appear once per program).
pub fn max_admissible_rank(
    boarding: &BoardingGroup,
    params: &CampaignParams,
    wishes: &[&Wish],
    estimates: &BTreeMap<ProgramGroupId, i32>,
) -> i32 {
    if params.boarding_reservation_over() {
        return UNBOUNDED_RANK;
    }
    let placed: BTreeSet<CandidateId> =
        wishes.iter().filter(|w| w.status.is_offer()).map(|w| w.candidate()).collect();
    let mut sorted: Vec<&Wish> = wishes.to_vec();
    sorted.sort_by_key(|w| (w.boarding_rank, w.id));

    let vacant = (i64::from(boarding.capacity()) - placed.len() as i64).max(0);
    let mut counted: i64 = 0;
    let mut last_rank = 0;
    for w in sorted {
        if counted == vacant {
            break;
        }
        let estimate = estimates.get(&w.group).copied().unwrap_or(UNBOUNDED_RANK);
        if w.call_order <= estimate && w.boarding_rank != last_rank && !placed.contains(&w.candidate()) {
            last_rank = w.boarding_rank;
            counted += 1;
        }
    }
    last_rank
}

/// Maximal threshold of every boarding group of the input.
/// Groups used by a program that stopped reserving seats are unbounded.
pub fn max_thresholds(input: &AdmissionInput) -> BTreeMap<BoardingGroupId, i32> {
    let without_reservation = input.boarding_groups_without_reservation();
    let estimates: BTreeMap<ProgramGroupId, i32> =
        input.groups().values().map(|g| (g.id, g.estimated_last_called_at_cutoff)).collect();
    let per_boarding = input.ranked_wishes_per_boarding();

    input
        .boarding_groups()
        .values()
        .map(|b| {
            let rank = if without_reservation.contains(&b.id) {
                UNBOUNDED_RANK
            } else {
                let wishes: Vec<&Wish> = per_boarding
                    .get(&b.id)
                    .map(|ixs| ixs.iter().map(|&ix| &input.wishes()[ix]).collect())
                    .unwrap_or_default();
                max_admissible_rank(b, &input.params, &wishes, &estimates)
            };
            (b.id, rank)
        })
        .collect()
}

/// Starting thresholds: for each boarding group with awaiting wishes,
/// min(worst awaiting boarding rank, maximal threshold).
pub fn initial_thresholds(
    maxima: &BTreeMap<BoardingGroupId, i32>,
    awaiting_ranks: &BTreeMap<BoardingGroupId, Vec<i32>>,
) -> BTreeMap<BoardingGroupId, i32> {
    awaiting_ranks
        .iter()
        .map(|(id, ranks)| {
            let worst = ranks.iter().copied().max().unwrap_or(0);
            (*id, worst.min(maxima.get(id).copied().unwrap_or(0)))
        })
        .collect()
}

/// New threshold after an overcapacity of `overcapacity` candidates: walking the
/// awaiting wishes by decreasing boarding rank, drop one candidate per unit of
/// overcapacity among ranks strictly under the current threshold.
pub fn shrink_threshold(current: i32, awaiting_by_rank_desc: &[&Wish], overcapacity: i64) -> i32 {
    let mut remaining = overcapacity - 1;
    for w in awaiting_by_rank_desc {
        if w.boarding_rank < current {
            remaining -= 1;
            if remaining <= 0 {
                return w.boarding_rank;
            }
        }
    }
    0
}
