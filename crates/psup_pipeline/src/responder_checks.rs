//! crates/psup_pipeline/src/responder_checks.rs
//! Auto-responder properties, checked on input statuses and again on output statuses.
//!
//! - P7.1 automatic acceptances and responder resignations belong to responder candidates
//! - P7.2 a responder candidate holds at most one in-process offer
//! - P7.3 a responder resignation comes with a better-ranked automatic acceptance
//! - P7.4 every non-previous wish of a responder candidate is ranked
//! - P7.5 preference ranks of a responder candidate are distinct
//! - P7.6 awaiting wishes of a responder candidate rank better than its offer
//!
//! Wishes resolved outside the main process are ignored by P7.2, P7.3 and P7.6.

use std::collections::{BTreeMap, BTreeSet};

use psup_core::{CandidateId, CoreResult, Reason, Subject, VerificationError, Wish, WishStatus};

pub fn verify(wishes: &[Wish], responders: &BTreeSet<CandidateId>) -> CoreResult<()> {
    check_enrolment_and_ranking(wishes, responders)?;
    check_single_offer(wishes, responders)?;
    check_resignations_backed(wishes, responders)?;
    check_distinct_ranks(wishes, responders)?;
    check_awaiting_better_than_offer(wishes, responders)?;
    Ok(())
}

/// P7.1 and P7.4.
fn check_enrolment_and_ranking(wishes: &[Wish], responders: &BTreeSet<CandidateId>) -> CoreResult<()> {
    for w in wishes {
        let enrolled = responders.contains(&w.candidate());
        if (w.status.is_responder_resignation() || w.status.is_auto_acceptance()) && !enrolled {
            return Err(VerificationError::wish(Reason::ResponderP7_1, w.id));
        }
        if enrolled
            && !w.status.was_offered_previously()
            && w.status != WishStatus::AutoDeclinedOffer
            && w.preference_rank <= 0
        {
            return Err(VerificationError::wish(Reason::ResponderP7_4, w.id));
        }
    }
    Ok(())
}

fn in_process_offers<'a>(
    wishes: &'a [Wish],
    responders: &'a BTreeSet<CandidateId>,
) -> impl Iterator<Item = &'a Wish> + 'a {
    wishes
        .iter()
        .filter(|w| responders.contains(&w.candidate()) && !w.is_outside_main_process() && w.status.is_offer())
}

/// P7.2.
fn check_single_offer(wishes: &[Wish], responders: &BTreeSet<CandidateId>) -> CoreResult<()> {
    let mut seen = BTreeSet::new();
    for w in in_process_offers(wishes, responders) {
        if !seen.insert(w.candidate()) {
            return Err(VerificationError::new(Reason::ResponderP7_2, Subject::Candidate(w.candidate())));
        }
    }
    Ok(())
}

/// P7.3.
fn check_resignations_backed(wishes: &[Wish], responders: &BTreeSet<CandidateId>) -> CoreResult<()> {
    let offers: BTreeMap<CandidateId, &Wish> = in_process_offers(wishes, responders).map(|w| (w.candidate(), w)).collect();
    for w in wishes.iter().filter(|w| w.status.is_responder_resignation()) {
        let backed = match offers.get(&w.candidate()) {
            Some(offer) => {
                offer.status.is_auto_acceptance()
                    && offer.preference_rank > 0
                    && !(w.status.is_responder_awaiting_resignation() && offer.preference_rank > w.preference_rank)
            }
            None => false,
        };
        if !backed {
            return Err(VerificationError::wish(Reason::ResponderP7_3, w.id));
        }
    }
    Ok(())
}

/// P7.5, plus awaiting responder wishes must carry a rank.
fn check_distinct_ranks(wishes: &[Wish], responders: &BTreeSet<CandidateId>) -> CoreResult<()> {
    let mut ranks: BTreeMap<CandidateId, BTreeSet<i32>> = BTreeMap::new();
    for w in wishes.iter().filter(|w| responders.contains(&w.candidate())) {
        if w.status.is_awaiting() && w.preference_rank <= 0 {
            return Err(VerificationError::wish(Reason::ResponderAwaitingWithoutRank, w.id));
        }
        if w.preference_rank > 0 && !ranks.entry(w.candidate()).or_default().insert(w.preference_rank) {
            return Err(VerificationError::wish(Reason::ResponderP7_5, w.id));
        }
    }
    Ok(())
}

/// P7.6.
fn check_awaiting_better_than_offer(wishes: &[Wish], responders: &BTreeSet<CandidateId>) -> CoreResult<()> {
    let mut offer_rank: BTreeMap<CandidateId, i32> = BTreeMap::new();
    let mut best_awaiting: BTreeMap<CandidateId, i32> = BTreeMap::new();
    let ranked = wishes.iter().filter(|w| {
        responders.contains(&w.candidate()) && !w.is_outside_main_process() && w.preference_rank > 0
    });
    for w in ranked {
        if w.status.is_offer() && offer_rank.insert(w.candidate(), w.preference_rank).is_some() {
            return Err(VerificationError::wish(Reason::ResponderP7_2, w.id));
        }
        if w.status.is_awaiting() {
            let best = best_awaiting.entry(w.candidate()).or_insert(i32::MAX);
            *best = (*best).min(w.preference_rank);
        }
    }
    for (candidate, awaiting) in best_awaiting {
        let offer = offer_rank.get(&candidate).copied().unwrap_or(i32::MAX);
        if awaiting >= offer {
            return Err(VerificationError::with_detail(
                Reason::ResponderP7_6,
                Subject::Candidate(candidate),
                format!("awaiting rank {awaiting} not better than offer rank {offer}"),
            ));
        }
    }
    Ok(())
}
