//! crates/psup_algo/src/resignations.rs
//! Automatic resignations triggered by the day's new offers.
//!
//! - Ordered-wish rule (GDD): candidates without the auto-responder lose every
//!   awaiting wish, and every plain offer of the day, ranked strictly worse than
//!   their best new offer.
//! - Auto-responder: responders keep only their best new offer; older offers and
//!   worse-ranked wishes are declined.
//!
//! Both return the offers they withdrew: those are the seats freed for the next iteration.

use std::collections::BTreeMap;

use psup_core::{AdmissionInput, CandidateId, CoreResult, StatusLedger, WishIx};
use tracing::info;

use crate::precompute::Precomputed;

/// Best (smallest) preference rank among the given new offers, per candidate.
/// Only wishes still holding an offer of the day are considered.
pub fn best_new_offer_ranks(
    input: &AdmissionInput,
    ledger: &StatusLedger,
    new_offers: &[WishIx],
) -> BTreeMap<CandidateId, i32> {
    let mut best: BTreeMap<CandidateId, i32> = BTreeMap::new();
    for &ix in new_offers {
        if !ledger.is_offer_of_the_day(ix) {
            continue;
        }
        let w = &input.wishes()[ix];
        best.entry(w.candidate())
            .and_modify(|r| *r = (*r).min(w.preference_rank))
            .or_insert(w.preference_rank);
    }
    best
}

/// Ordered-wish forced resignations.
pub fn apply_ordered_resignations(
    pre: &Precomputed,
    input: &AdmissionInput,
    ledger: &mut StatusLedger,
    best: &BTreeMap<CandidateId, i32>,
) -> Vec<WishIx> {
    let wishes = input.wishes();
    let selected = |ix: WishIx| {
        let w = &wishes[ix];
        match best.get(&w.candidate()) {
            Some(&rank) => rank < w.preference_rank && !pre.responders.contains(&w.candidate()),
            None => false,
        }
    };
    let resigned = ledger.resign_awaiting_ordered(selected);
    let freed = ledger.resign_offers_of_the_day_ordered(selected);
    if resigned.is_empty() && freed.is_empty() {
        info!("ordered-wish resignations freed no seat");
    } else {
        info!(awaiting = resigned.len(), offers = freed.len(), "ordered-wish resignations applied");
    }
    freed
}

/// Auto-responder decisions for candidates who received a new offer.
pub fn apply_auto_responder(
    pre: &Precomputed,
    input: &AdmissionInput,
    ledger: &mut StatusLedger,
    best: &BTreeMap<CandidateId, i32>,
) -> CoreResult<Vec<WishIx>> {
    if pre.responders.is_empty() {
        info!("no candidate enabled the auto-responder");
        return Ok(Vec::new());
    }
    info!(candidates = pre.responders.len(), "auto-responder enabled");
    let wishes = input.wishes();
    let mut freed = Vec::new();
    for &ix in &pre.responder_wishes {
        let w = &wishes[ix];
        let Some(&rank) = best.get(&w.candidate()) else {
            continue;
        };
        if !ledger.is_offer_or_awaiting(ix) {
            continue;
        }
        if w.status.was_offered_previously() || w.preference_rank > rank {
            if ledger.is_offer(ix) {
                freed.push(ix);
            }
            ledger.auto_decline(ix, w)?;
        }
    }
    if freed.is_empty() {
        info!("auto-responder freed no seat");
    } else {
        info!(seats = freed.len(), "auto-responder freed seats");
    }
    Ok(freed)
}
