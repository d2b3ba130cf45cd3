//! crates/psup_core/src/ledger.rs
//! The status ledger: the only mutable state of an allocation run.
//!
//! Wishes live in an arena (`&[Wish]`, indexed by [`WishIx`]); the ledger stores
//! one status per arena slot plus the cached offer/awaiting sets and the
//! iteration at which each wish last changed. Cloning gives an independent
//! snapshot, which the orchestrator uses to restart from the initial statuses.

use std::collections::{BTreeMap, BTreeSet};

use crate::errors::{CoreResult, Reason, VerificationError};
use crate::ids::CandidateId;
use crate::status::WishStatus;
use crate::wish::Wish;

/// Index of a wish in the run's arena.
pub type WishIx = usize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusLedger {
    statuses: Vec<WishStatus>,
    changed_at: BTreeMap<WishIx, u32>,
    offers: BTreeSet<WishIx>,
    awaiting: BTreeSet<WishIx>,
    iteration: u32,
}

impl StatusLedger {
    pub fn new(wishes: &[Wish]) -> Self {
        let statuses: Vec<WishStatus> = wishes.iter().map(|w| w.status).collect();
        let offers = statuses
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_offer())
            .map(|(ix, _)| ix)
            .collect();
        let awaiting = statuses
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_awaiting())
            .map(|(ix, _)| ix)
            .collect();
        Self { statuses, changed_at: BTreeMap::new(), offers, awaiting, iteration: 0 }
    }

    /// Iteration stamp is `100 * outer + inner`.
    pub fn set_iteration(&mut self, outer: u32, inner: u32) {
        self.iteration = 100 * outer + inner;
    }

    #[inline]
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    #[inline]
    pub fn status(&self, ix: WishIx) -> WishStatus {
        self.statuses[ix]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    #[inline]
    pub fn offers(&self) -> &BTreeSet<WishIx> {
        &self.offers
    }

    #[inline]
    pub fn awaiting(&self) -> &BTreeSet<WishIx> {
        &self.awaiting
    }

    #[inline]
    pub fn is_offer(&self, ix: WishIx) -> bool {
        self.offers.contains(&ix)
    }

    #[inline]
    pub fn is_awaiting(&self, ix: WishIx) -> bool {
        self.awaiting.contains(&ix)
    }

    #[inline]
    pub fn is_offer_or_awaiting(&self, ix: WishIx) -> bool {
        self.is_offer(ix) || self.is_awaiting(ix)
    }

    #[inline]
    pub fn is_offer_of_the_day(&self, ix: WishIx) -> bool {
        self.statuses[ix].is_offer_of_the_day()
    }

    /// Iterations of last status change, by arena index.
    #[inline]
    pub fn changed_at(&self) -> &BTreeMap<WishIx, u32> {
        &self.changed_at
    }

    fn stamp(&mut self, ix: WishIx) {
        self.changed_at.insert(ix, self.iteration);
    }

    /// Grants an offer to an awaiting wish; auto-accepted when the candidate uses the responder.
    pub fn grant_offer(&mut self, ix: WishIx, wish: &Wish, on_responder: bool) -> CoreResult<()> {
        if !self.statuses[ix].is_awaiting() {
            return Err(VerificationError::wish(Reason::OfferImpossible, wish.id));
        }
        self.statuses[ix] = if on_responder { WishStatus::AutoAccepted } else { WishStatus::OfferedToday };
        self.awaiting.remove(&ix);
        self.offers.insert(ix);
        self.stamp(ix);
        Ok(())
    }

    pub fn grant_offers(
        &mut self,
        ixs: &[WishIx],
        wishes: &[Wish],
        responders: &BTreeSet<CandidateId>,
    ) -> CoreResult<()> {
        for &ix in ixs {
            let wish = &wishes[ix];
            self.grant_offer(ix, wish, responders.contains(&wish.candidate()))?;
        }
        Ok(())
    }

    /// GDD on awaiting wishes: every selected awaiting wish becomes an ordered-wish resignation.
    pub fn resign_awaiting_ordered(&mut self, mut select: impl FnMut(WishIx) -> bool) -> Vec<WishIx> {
        let chosen: Vec<WishIx> = self.awaiting.iter().copied().filter(|&ix| select(ix)).collect();
        for &ix in &chosen {
            self.statuses[ix] = WishStatus::GddResignedAwaiting;
            self.awaiting.remove(&ix);
            self.stamp(ix);
        }
        chosen
    }

    /// GDD on today's offers: selected plain offers of the day are withdrawn and returned.
    pub fn resign_offers_of_the_day_ordered(&mut self, mut select: impl FnMut(WishIx) -> bool) -> Vec<WishIx> {
        let chosen: Vec<WishIx> = self
            .offers
            .iter()
            .copied()
            .filter(|&ix| self.statuses[ix] == WishStatus::OfferedToday && select(ix))
            .collect();
        for &ix in &chosen {
            self.statuses[ix] = WishStatus::GddResignedAwaiting;
            self.offers.remove(&ix);
            self.stamp(ix);
        }
        chosen
    }

    /// Auto-responder decline of an offer or awaiting wish.
    pub fn auto_decline(&mut self, ix: WishIx, wish: &Wish) -> CoreResult<()> {
        if wish.is_outside_main_process() {
            return Err(VerificationError::wish(Reason::OutsideMainProcessNotDeclinable, wish.id));
        }
        if self.is_awaiting(ix) && !wish.responder_capable() {
            return Err(VerificationError::wish(Reason::AutoDeclineImpossible, wish.id));
        }
        if self.is_offer(ix) {
            self.statuses[ix] = WishStatus::AutoDeclinedOffer;
        } else if self.is_awaiting(ix) {
            self.statuses[ix] = WishStatus::ResponderResignedAwaiting;
        } else {
            return Err(VerificationError::wish(Reason::AutoDeclineImpossible, wish.id));
        }
        self.offers.remove(&ix);
        self.awaiting.remove(&ix);
        self.stamp(ix);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ProgramGroupId;
    use crate::wish::WishFields;

    fn wish(candidate: i32, program: i32, status: WishStatus, pref: i32) -> Wish {
        Wish::new(WishFields {
            candidate,
            group: ProgramGroupId::new(program, program, program),
            call_order: 1,
            preference_rank: pref,
            status,
            ..WishFields::default()
        })
        .unwrap()
    }

    #[test]
    fn initial_sets_follow_predicates() {
        let ws = vec![
            wish(1, 1, WishStatus::Awaiting, 1),
            wish(1, 2, WishStatus::OfferedPreviouslyAccepted, 2),
            wish(2, 1, WishStatus::OfferedPreviouslyDeclined, 0),
        ];
        let l = StatusLedger::new(&ws);
        assert_eq!(l.awaiting().iter().copied().collect::<Vec<_>>(), vec![0]);
        assert_eq!(l.offers().iter().copied().collect::<Vec<_>>(), vec![1]);
        assert!(!l.is_offer_or_awaiting(2));
    }

    #[test]
    fn grant_offer_moves_between_sets_and_stamps() {
        let ws = vec![wish(1, 1, WishStatus::Awaiting, 1), wish(2, 1, WishStatus::Awaiting, 1)];
        let mut l = StatusLedger::new(&ws);
        l.set_iteration(2, 3);
        let responders: BTreeSet<_> = [CandidateId(2)].into_iter().collect();
        l.grant_offers(&[0, 1], &ws, &responders).unwrap();
        assert_eq!(l.status(0), WishStatus::OfferedToday);
        assert_eq!(l.status(1), WishStatus::AutoAccepted);
        assert!(l.awaiting().is_empty());
        assert_eq!(l.changed_at().get(&0), Some(&203));
        let err = l.grant_offer(0, &ws[0], false).unwrap_err();
        assert_eq!(err.reason, Reason::OfferImpossible);
    }

    #[test]
    fn ordered_resignations_only_touch_plain_offers_of_the_day() {
        let ws = vec![
            wish(1, 1, WishStatus::Awaiting, 1),
            wish(1, 2, WishStatus::Awaiting, 2),
            wish(1, 3, WishStatus::Awaiting, 3),
        ];
        let mut l = StatusLedger::new(&ws);
        l.grant_offer(0, &ws[0], false).unwrap();
        l.grant_offer(1, &ws[1], true).unwrap();
        let resigned = l.resign_awaiting_ordered(|ix| ix == 2);
        assert_eq!(resigned, vec![2]);
        let withdrawn = l.resign_offers_of_the_day_ordered(|_| true);
        assert_eq!(withdrawn, vec![0]);
        assert_eq!(l.status(1), WishStatus::AutoAccepted);
        assert_eq!(l.status(2), WishStatus::GddResignedAwaiting);
    }

    #[test]
    fn auto_decline_rules() {
        let ws = vec![
            wish(1, 1, WishStatus::OfferedPreviouslyAwaitingReply, 0),
            wish(1, 2, WishStatus::Awaiting, 0),
            wish(1, 3, WishStatus::Awaiting, 4),
            wish(1, 4, WishStatus::OfferedPreviouslyDeclined, 5),
        ];
        let mut l = StatusLedger::new(&ws);
        l.auto_decline(0, &ws[0]).unwrap();
        assert_eq!(l.status(0), WishStatus::AutoDeclinedOffer);
        assert_eq!(l.auto_decline(1, &ws[1]).unwrap_err().reason, Reason::AutoDeclineImpossible);
        l.auto_decline(2, &ws[2]).unwrap();
        assert_eq!(l.status(2), WishStatus::ResponderResignedAwaiting);
        assert_eq!(l.auto_decline(3, &ws[3]).unwrap_err().reason, Reason::AutoDeclineImpossible);
    }

    #[test]
    fn snapshot_is_independent() {
        let ws = vec![wish(1, 1, WishStatus::Awaiting, 1)];
        let base = StatusLedger::new(&ws);
        let mut run = base.clone();
        run.grant_offer(0, &ws[0], false).unwrap();
        assert!(base.is_awaiting(0));
        assert!(run.is_offer(0));
    }
}
