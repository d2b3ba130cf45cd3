//! crates/psup_algo/src/precompute.rs
//! Read-only indexes built once per run over the wish arena.
//!
//! Every list holds arena indexes ([`WishIx`]) into `input.wishes()`, sorted with
//! the wish id as tie-breaker so that iteration order never depends on hashing.

use std::collections::{BTreeMap, BTreeSet};

use psup_core::{AdmissionInput, BoardingGroupId, BoardingPlacement, CandidateId, ProgramGroupId, WishIx};

use crate::thresholds;

/// Group partition and per-run indexes.
#[derive(Clone, Debug, Default)]
pub struct Precomputed {
    /// Open groups whose wishes never request boarding.
    pub groups_without_boarding: Vec<ProgramGroupId>,
    /// Open groups with boarding requests, none of them ranked.
    pub groups_boarding_unranked: Vec<ProgramGroupId>,
    /// Open groups with at least one ranked boarding wish.
    pub groups_boarding_ranked: Vec<ProgramGroupId>,
    /// Initially awaiting wishes per group, by ascending call order.
    pub awaiting_by_call_order: BTreeMap<ProgramGroupId, Vec<WishIx>>,
    /// Initially awaiting ranked boarding wishes per boarding group, by descending boarding rank.
    pub awaiting_by_boarding_rank_desc: BTreeMap<BoardingGroupId, Vec<WishIx>>,
    /// Initially awaiting or offered wishes per group.
    pub awaiting_or_offered_by_group: BTreeMap<ProgramGroupId, Vec<WishIx>>,
    /// Possible boarding placement of each initially awaiting or offered ranked boarding wish.
    pub boarding_placements: BTreeMap<WishIx, BoardingPlacement>,
    /// Wishes the auto-responder may act on: responders' in-process wishes initially awaiting or offered.
    pub responder_wishes: Vec<WishIx>,
    pub responders: BTreeSet<CandidateId>,
    pub max_thresholds: BTreeMap<BoardingGroupId, i32>,
}

impl Precomputed {
    pub fn build(input: &AdmissionInput) -> Self {
        let wishes = input.wishes();

        let ranked_groups: BTreeSet<ProgramGroupId> =
            wishes.iter().filter(|w| w.has_ranked_boarding()).map(|w| w.group).collect();
        let unranked_groups: BTreeSet<ProgramGroupId> = wishes
            .iter()
            .filter(|w| w.id.boarding && !w.has_ranked_boarding())
            .map(|w| w.group)
            .collect();

        let mut pre = Precomputed {
            responders: input.responders().clone(),
            max_thresholds: thresholds::max_thresholds(input),
            ..Precomputed::default()
        };

        for g in input.groups().values().filter(|g| g.is_open()) {
            // a group mixing ranked and unranked boarding requests is handled by the ranked pass only
            if ranked_groups.contains(&g.id) {
                pre.groups_boarding_ranked.push(g.id);
            } else if unranked_groups.contains(&g.id) {
                pre.groups_boarding_unranked.push(g.id);
            } else {
                pre.groups_without_boarding.push(g.id);
            }
        }

        for (ix, w) in wishes.iter().enumerate() {
            let awaiting = w.status.is_awaiting();
            let live = awaiting || w.status.is_offer();
            if awaiting {
                pre.awaiting_by_call_order.entry(w.group).or_default().push(ix);
                if let Some(b) = w.boarding {
                    pre.awaiting_by_boarding_rank_desc.entry(b).or_default().push(ix);
                }
            }
            if live {
                pre.awaiting_or_offered_by_group.entry(w.group).or_default().push(ix);
                if let Some(placement) = w.boarding_placement() {
                    pre.boarding_placements.insert(ix, placement);
                }
                if !w.is_outside_main_process() && pre.responders.contains(&w.candidate()) {
                    pre.responder_wishes.push(ix);
                }
            }
        }

        for list in pre.awaiting_by_call_order.values_mut() {
            list.sort_by_key(|&ix| (wishes[ix].call_order, wishes[ix].id));
        }
        for list in pre.awaiting_by_boarding_rank_desc.values_mut() {
            list.sort_by_key(|&ix| (std::cmp::Reverse(wishes[ix].boarding_rank), wishes[ix].id));
        }
        pre
    }
}
