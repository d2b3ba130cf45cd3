//! crates/psup_algo/src/fixpoint.rs
//! Inner loop: offers and automatic resignations until no seat is freed.
//!
//! Iteration `(outer, inner)` stamps every status change with `100 * outer + inner`;
//! both counters start at 1.
//! The first iteration never exits on "no new offer" because resignations can be
//! pending from the input alone. Later iterations only revisit the groups where a
//! seat was freed.

use std::collections::{BTreeMap, BTreeSet};

use psup_core::{AdmissionInput, BoardingGroupId, CoreResult, ProgramGroupId, StatusLedger, WishIx};
use tracing::info;

use crate::offers;
use crate::precompute::Precomputed;
use crate::resignations;

/// Switches for one run of the inner loop.
#[derive(Clone, Copy, Debug)]
pub struct CascadeSwitches {
    pub ordered_resignations: bool,
    pub auto_responder: bool,
}

/// Runs the inner fixed point from `initial`, leaving it untouched.
pub fn compute_offers_and_resignations(
    thresholds: &BTreeMap<BoardingGroupId, i32>,
    initial: &StatusLedger,
    outer: u32,
    switches: CascadeSwitches,
    pre: &Precomputed,
    input: &AdmissionInput,
) -> CoreResult<StatusLedger> {
    let mut ledger = initial.clone();
    let mut without_boarding = pre.groups_without_boarding.clone();
    let mut boarding_unranked = pre.groups_boarding_unranked.clone();
    let mut boarding_ranked = pre.groups_boarding_ranked.clone();
    let mut first = true;
    let mut inner: u32 = 1;

    loop {
        ledger.set_iteration(outer, inner);
        info!(outer, inner, "offer iteration");

        let plain = offers::offers_without_boarding(pre, input, &ledger, &without_boarding);
        info!(offers = plain.len(), groups = without_boarding.len(), "new offers in groups without boarding");
        ledger.grant_offers(&plain, input.wishes(), &pre.responders)?;

        let unranked = offers::offers_boarding_unranked(pre, input, &ledger, &boarding_unranked);
        info!(offers = unranked.len(), groups = boarding_unranked.len(), "new offers in groups with unranked boarding");
        ledger.grant_offers(&unranked, input.wishes(), &pre.responders)?;

        let ranked = offers::offers_boarding_ranked(pre, input, &ledger, &boarding_ranked, thresholds);
        info!(offers = ranked.len(), groups = boarding_ranked.len(), "new offers in groups with ranked boarding");
        ledger.grant_offers(&ranked, input.wishes(), &pre.responders)?;

        if !first && plain.is_empty() && unranked.is_empty() && ranked.is_empty() {
            info!("no new offer: leaving resignation loop");
            break;
        }
        if !switches.ordered_resignations && !switches.auto_responder {
            info!("no automatic resignation applies: leaving resignation loop");
            break;
        }

        let new_offers: Vec<WishIx> = plain.iter().chain(&unranked).chain(&ranked).copied().collect();
        let best = resignations::best_new_offer_ranks(input, &ledger, &new_offers);

        let mut freed: Vec<WishIx> = Vec::new();
        if switches.ordered_resignations {
            freed.extend(resignations::apply_ordered_resignations(pre, input, &mut ledger, &best));
        }
        if switches.auto_responder {
            freed.extend(resignations::apply_auto_responder(pre, input, &mut ledger, &best)?);
        }

        if freed.is_empty() {
            info!("no seat freed by automatic resignations: leaving resignation loop");
            break;
        }

        let touched: BTreeSet<ProgramGroupId> = freed.iter().map(|&ix| input.wishes()[ix].group).collect();
        without_boarding = restrict(&pre.groups_without_boarding, &touched);
        boarding_unranked = restrict(&pre.groups_boarding_unranked, &touched);
        boarding_ranked = restrict(&pre.groups_boarding_ranked, &touched);
        first = false;
        inner += 1;
    }
    Ok(ledger)
}

fn restrict(groups: &[ProgramGroupId], touched: &BTreeSet<ProgramGroupId>) -> Vec<ProgramGroupId> {
    groups.iter().filter(|g| touched.contains(g)).copied().collect()
}
