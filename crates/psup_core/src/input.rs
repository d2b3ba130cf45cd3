//! crates/psup_core/src/input.rs
//! One day's input bundle: parameters, program groups, boarding groups, wishes
//! and the candidates who enabled the auto-responder.
//!
//! Wishes are kept in an arena ordered by insertion with an id index on the
//! side; the arena index is the [`WishIx`] used by the ledger for the whole run.

use std::collections::{BTreeMap, BTreeSet};

use crate::errors::{CoreResult, Reason, Subject, VerificationError};
use crate::groups::{BoardingGroup, ProgramGroup};
use crate::ids::{BoardingGroupId, CandidateId, ProgramGroupId, WishId};
use crate::ledger::{StatusLedger, WishIx};
use crate::output::AdmissionOutput;
use crate::params::CampaignParams;
use crate::status::WishStatus;
use crate::wish::Wish;

#[derive(Clone, Debug, Default)]
pub struct AdmissionInput {
    pub params: CampaignParams,
    groups: BTreeMap<ProgramGroupId, ProgramGroup>,
    boarding_groups: BTreeMap<BoardingGroupId, BoardingGroup>,
    wishes: Vec<Wish>,
    wish_index: BTreeMap<WishId, WishIx>,
    responders: BTreeSet<CandidateId>,
}

impl AdmissionInput {
    pub fn new(params: CampaignParams) -> Self {
        Self { params, ..Self::default() }
    }

    // ---------- Assembly ----------

    pub fn add_group(&mut self, group: ProgramGroup) -> CoreResult<()> {
        if self.groups.contains_key(&group.id) {
            return Err(VerificationError::new(Reason::DuplicateGroup, Subject::Group(group.id)));
        }
        self.groups.insert(group.id, group);
        Ok(())
    }

    pub fn add_boarding_group(&mut self, boarding: BoardingGroup) -> CoreResult<()> {
        if self.boarding_groups.contains_key(&boarding.id) {
            return Err(VerificationError::new(Reason::DuplicateBoardingGroup, Subject::Boarding(boarding.id)));
        }
        self.boarding_groups.insert(boarding.id, boarding);
        Ok(())
    }

    pub fn add_wish(&mut self, wish: Wish) -> CoreResult<()> {
        if self.wish_index.contains_key(&wish.id) {
            return Err(VerificationError::wish(Reason::DuplicateWish, wish.id));
        }
        self.wish_index.insert(wish.id, self.wishes.len());
        self.wishes.push(wish);
        Ok(())
    }

    pub fn add_responder(&mut self, candidate: CandidateId) {
        self.responders.insert(candidate);
    }

    // ---------- Accessors ----------

    #[inline]
    pub fn wishes(&self) -> &[Wish] {
        &self.wishes
    }

    pub fn wish(&self, id: &WishId) -> Option<&Wish> {
        self.wish_index.get(id).map(|&ix| &self.wishes[ix])
    }

    pub fn wish_ix(&self, id: &WishId) -> Option<WishIx> {
        self.wish_index.get(id).copied()
    }

    #[inline]
    pub fn groups(&self) -> &BTreeMap<ProgramGroupId, ProgramGroup> {
        &self.groups
    }

    #[inline]
    pub fn boarding_groups(&self) -> &BTreeMap<BoardingGroupId, BoardingGroup> {
        &self.boarding_groups
    }

    #[inline]
    pub fn responders(&self) -> &BTreeSet<CandidateId> {
        &self.responders
    }

    pub fn initial_ledger(&self) -> StatusLedger {
        StatusLedger::new(&self.wishes)
    }

    // ---------- Queries ----------

    pub fn responder_enabled(&self) -> bool {
        !self.responders.is_empty()
    }

    /// Number of wishes per status, every status listed.
    pub fn status_counts(&self) -> BTreeMap<WishStatus, usize> {
        let mut counts: BTreeMap<WishStatus, usize> = WishStatus::ALL.iter().map(|&s| (s, 0)).collect();
        for w in &self.wishes {
            *counts.entry(w.status).or_insert(0) += 1;
        }
        counts
    }

    /// Boarding groups used by a program that stopped reserving boarding seats.
    pub fn boarding_groups_without_reservation(&self) -> BTreeSet<BoardingGroupId> {
        let over: BTreeSet<ProgramGroupId> = self
            .groups
            .values()
            .filter(|g| g.boarding_reservation_over)
            .map(|g| g.id)
            .collect();
        self.wishes
            .iter()
            .filter(|w| over.contains(&w.group))
            .filter_map(|w| w.boarding)
            .collect()
    }

    /// Distinct candidates holding an offer, per boarding group.
    pub fn offered_candidates_per_boarding(&self, ledger: &StatusLedger) -> BTreeMap<BoardingGroupId, usize> {
        let mut seen: BTreeMap<BoardingGroupId, BTreeSet<CandidateId>> = BTreeMap::new();
        for (ix, w) in self.wishes.iter().enumerate() {
            if let Some(b) = w.boarding {
                if ledger.status(ix).is_offer() {
                    seen.entry(b).or_default().insert(w.candidate());
                }
            }
        }
        seen.into_iter().map(|(b, c)| (b, c.len())).collect()
    }

    /// Boarding groups where at least one ranked boarding wish got an offer today.
    pub fn boarding_groups_with_new_offer(&self, ledger: &StatusLedger) -> BTreeSet<BoardingGroupId> {
        self.wishes
            .iter()
            .enumerate()
            .filter(|(ix, _)| ledger.is_offer_of_the_day(*ix))
            .filter_map(|(_, w)| w.boarding)
            .collect()
    }

    /// Ranked boarding wishes grouped by boarding group (arena indexes).
    pub fn ranked_wishes_per_boarding(&self) -> BTreeMap<BoardingGroupId, Vec<WishIx>> {
        let mut out: BTreeMap<BoardingGroupId, Vec<WishIx>> = BTreeMap::new();
        for (ix, w) in self.wishes.iter().enumerate() {
            if let Some(b) = w.boarding {
                out.entry(b).or_default().push(ix);
            }
        }
        out
    }

    /// Boarding ranks of the awaiting ranked boarding wishes, per boarding group.
    pub fn awaiting_ranks_per_boarding(&self) -> BTreeMap<BoardingGroupId, Vec<i32>> {
        let mut out: BTreeMap<BoardingGroupId, Vec<i32>> = BTreeMap::new();
        for w in &self.wishes {
            if let (true, Some(b)) = (w.status.is_awaiting(), w.boarding) {
                out.entry(b).or_default().push(w.boarding_rank);
            }
        }
        out
    }

    /// Wishes of one boarding group.
    pub fn wishes_of_boarding(&self, id: BoardingGroupId) -> Vec<&Wish> {
        self.wishes.iter().filter(|w| w.boarding == Some(id)).collect()
    }

    /// Rebuilds the next run's input from a computed output: same groups,
    /// boarding groups and responders, wishes carrying their final status.
    pub fn from_output(output: &AdmissionOutput) -> CoreResult<Self> {
        let mut input = Self::new(output.params);
        for g in output.groups.values() {
            input.add_group(g.clone())?;
        }
        for b in output.boarding_groups.values() {
            input.add_boarding_group(b.clone())?;
        }
        for w in &output.wishes {
            input.add_wish(Wish::new(w.fields())?)?;
        }
        for &c in &output.responders {
            input.add_responder(c);
        }
        Ok(input)
    }
}
