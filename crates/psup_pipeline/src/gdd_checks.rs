//! crates/psup_pipeline/src/gdd_checks.rs
//! Ordered-wish resignation properties. Only checked once the phase has started,
//! and only for candidates still holding an awaiting wish.
//!
//! - P8.1 a resigned wish is ranked and the candidate got a better-ranked offer today
//! - P8.2 responder candidates never get these resignations
//! - P8.3 every remaining non-resigned wish, previous offers aside, ranks better than the resigned ones

use std::collections::{BTreeMap, BTreeSet};

use psup_core::{CampaignParams, CandidateId, CoreResult, Reason, Subject, VerificationError, Wish};

pub fn verify(wishes: &[Wish], params: &CampaignParams, responders: &BTreeSet<CandidateId>) -> CoreResult<()> {
    if !params.gdd_active() {
        return Ok(());
    }
    let waiting: BTreeSet<CandidateId> =
        wishes.iter().filter(|w| w.status.is_awaiting()).map(|w| w.candidate()).collect();
    let mut by_candidate: BTreeMap<CandidateId, Vec<&Wish>> = BTreeMap::new();
    for w in wishes.iter().filter(|w| waiting.contains(&w.candidate())) {
        by_candidate.entry(w.candidate()).or_default().push(w);
    }

    check_resignation_backed(&by_candidate)?;
    if let Some(w) = wishes.iter().find(|w| responders.contains(&w.candidate()) && w.status.is_gdd_resignation()) {
        return Err(VerificationError::wish(Reason::GddP8_2, w.id));
    }
    check_remaining_better(&by_candidate)?;
    Ok(())
}

fn best_resigned_rank(wishes: &[&Wish]) -> Option<i32> {
    wishes.iter().filter(|w| w.status.is_gdd_resignation()).map(|w| w.preference_rank).min()
}

/// P8.1.
fn check_resignation_backed(by_candidate: &BTreeMap<CandidateId, Vec<&Wish>>) -> CoreResult<()> {
    for (&candidate, wishes) in by_candidate {
        let Some(resigned) = best_resigned_rank(wishes) else {
            continue;
        };
        let worst_new_offer = wishes
            .iter()
            .filter(|w| w.status.is_offer_of_the_day())
            .map(|w| w.preference_rank)
            .filter(|&r| r > 0)
            .max();
        if worst_new_offer.map_or(true, |offer| offer > resigned) {
            return Err(VerificationError::new(Reason::GddP8_1, Subject::Candidate(candidate)));
        }
    }
    Ok(())
}

/// P8.3.
fn check_remaining_better(by_candidate: &BTreeMap<CandidateId, Vec<&Wish>>) -> CoreResult<()> {
    for (&candidate, wishes) in by_candidate {
        let Some(resigned) = best_resigned_rank(wishes) else {
            continue;
        };
        let worst_kept = wishes
            .iter()
            .filter(|w| !w.status.is_gdd_resignation() && !w.status.is_previous_offer())
            .map(|w| w.preference_rank)
            .max();
        if worst_kept.map_or(true, |kept| kept >= resigned) {
            return Err(VerificationError::new(Reason::GddP8_3, Subject::Candidate(candidate)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use psup_core::{ProgramGroupId, WishFields, WishStatus};

    fn wish(candidate: i32, program: i32, rank: i32, status: WishStatus) -> Wish {
        Wish::new(WishFields {
            candidate,
            group: ProgramGroupId::new(program, program, program),
            call_order: 1,
            preference_rank: rank,
            status,
            ..WishFields::default()
        })
        .unwrap()
    }

    fn active() -> CampaignParams {
        CampaignParams::new(60, 10, 50)
    }

    #[test]
    fn ignored_before_phase_start() {
        let wishes = vec![wish(1, 1, 1, WishStatus::Awaiting), wish(1, 2, 2, WishStatus::GddResignedAwaiting)];
        verify(&wishes, &CampaignParams::new(10, 10, 50), &BTreeSet::new()).unwrap();
    }

    #[test]
    fn resignation_behind_new_offer_passes() {
        let wishes = vec![
            wish(1, 1, 1, WishStatus::Awaiting),
            wish(1, 2, 2, WishStatus::OfferedToday),
            wish(1, 3, 3, WishStatus::GddResignedAwaiting),
        ];
        verify(&wishes, &active(), &BTreeSet::new()).unwrap();
    }

    #[test]
    fn resignation_without_offer_is_p8_1() {
        let wishes = vec![wish(1, 1, 1, WishStatus::Awaiting), wish(1, 3, 3, WishStatus::GddResignedAwaiting)];
        assert_eq!(verify(&wishes, &active(), &BTreeSet::new()).unwrap_err().reason, Reason::GddP8_1);
    }

    #[test]
    fn responder_candidate_is_p8_2() {
        let wishes = vec![
            wish(1, 1, 1, WishStatus::Awaiting),
            wish(1, 2, 2, WishStatus::OfferedToday),
            wish(1, 3, 3, WishStatus::GddResignedAwaiting),
        ];
        let responders = BTreeSet::from([CandidateId(1)]);
        assert_eq!(verify(&wishes, &active(), &responders).unwrap_err().reason, Reason::GddP8_2);
    }

    #[test]
    fn worse_wish_kept_is_p8_3() {
        let wishes = vec![
            wish(1, 1, 1, WishStatus::OfferedToday),
            wish(1, 2, 2, WishStatus::GddResignedAwaiting),
            wish(1, 3, 3, WishStatus::Awaiting),
        ];
        assert_eq!(verify(&wishes, &active(), &BTreeSet::new()).unwrap_err().reason, Reason::GddP8_3);
    }
}
