//! crates/psup_core/src/output.rs
//! Result of one daily run: wishes with their final status, working and maximal
//! boarding thresholds, the iteration trace, and the verification flags.

use std::collections::{BTreeMap, BTreeSet};

use crate::groups::{BoardingGroup, ProgramGroup};
use crate::ids::{BoardingGroupId, CandidateId, ProgramGroupId, WishId};
use crate::input::AdmissionInput;
use crate::ledger::StatusLedger;
use crate::params::CampaignParams;
use crate::wish::Wish;

#[derive(Clone, Debug, Default)]
pub struct AdmissionOutput {
    pub params: CampaignParams,
    /// Copies of the input wishes carrying the final status.
    pub wishes: Vec<Wish>,
    pub groups: BTreeMap<ProgramGroupId, ProgramGroup>,
    pub boarding_groups: BTreeMap<BoardingGroupId, BoardingGroup>,
    /// Working boarding thresholds at the end of the run.
    pub thresholds: BTreeMap<BoardingGroupId, i32>,
    /// Maximal boarding thresholds computed before the run.
    pub max_thresholds: BTreeMap<BoardingGroupId, i32>,
    /// `100 * outer + inner` for wishes whose status changed.
    pub iterations: BTreeMap<WishId, u32>,
    pub responders: BTreeSet<CandidateId>,
    alert: bool,
    warning: bool,
    groups_not_exported: BTreeSet<ProgramGroupId>,
}

impl AdmissionOutput {
    pub fn new(params: CampaignParams) -> Self {
        Self { params, ..Self::default() }
    }

    pub fn assemble(
        input: &AdmissionInput,
        thresholds: BTreeMap<BoardingGroupId, i32>,
        max_thresholds: BTreeMap<BoardingGroupId, i32>,
        ledger: &StatusLedger,
    ) -> Self {
        let wishes = input
            .wishes()
            .iter()
            .enumerate()
            .map(|(ix, w)| w.with_status(ledger.status(ix)))
            .collect();
        let iterations = ledger
            .changed_at()
            .iter()
            .map(|(&ix, &it)| (input.wishes()[ix].id, it))
            .collect();
        Self {
            params: input.params,
            wishes,
            groups: input.groups().clone(),
            boarding_groups: input.boarding_groups().clone(),
            thresholds,
            max_thresholds,
            iterations,
            responders: input.responders().clone(),
            alert: false,
            warning: false,
            groups_not_exported: BTreeSet::new(),
        }
    }

    // ---------- Flags ----------

    #[inline]
    pub fn alert(&self) -> bool {
        self.alert
    }

    #[inline]
    pub fn warning(&self) -> bool {
        self.warning
    }

    /// An alert supersedes any warning.
    pub fn set_alert(&mut self) {
        self.alert = true;
        self.warning = false;
    }

    pub fn set_warning(&mut self) {
        if !self.alert {
            self.warning = true;
        }
    }

    #[inline]
    pub fn groups_not_exported(&self) -> &BTreeSet<ProgramGroupId> {
        &self.groups_not_exported
    }

    pub fn alert_message(&self) -> String {
        let mut out = String::from("Verification raised an alert. The following groups are not exported:");
        for g in &self.groups_not_exported {
            out.push(' ');
            out.push_str(&g.to_string());
        }
        out
    }

    /// Removes today's offers in `groups` from the output and returns them.
    pub fn strip_offers_of_the_day(&mut self, groups: &BTreeSet<ProgramGroupId>) -> Vec<Wish> {
        self.groups_not_exported = groups.clone();
        let (removed, kept): (Vec<Wish>, Vec<Wish>) = std::mem::take(&mut self.wishes)
            .into_iter()
            .partition(|w| w.status.is_offer_of_the_day() && groups.contains(&w.group));
        self.wishes = kept;
        removed
    }

    // ---------- Queries ----------

    pub fn offers_of_the_day_count(&self) -> usize {
        self.wishes.iter().filter(|w| w.status.is_offer_of_the_day()).count()
    }

    pub fn responder_resignation_count(&self) -> usize {
        self.wishes.iter().filter(|w| w.status.is_responder_resignation()).count()
    }

    pub fn gdd_resignation_count(&self) -> usize {
        self.wishes.iter().filter(|w| w.status.is_gdd_resignation()).count()
    }

    /// Program groups with at least one wish in this boarding group, first-seen order.
    pub fn groups_for_boarding(&self, id: BoardingGroupId) -> Vec<ProgramGroupId> {
        let mut seen = BTreeSet::new();
        self.wishes
            .iter()
            .filter(|w| w.boarding == Some(id))
            .filter_map(|w| seen.insert(w.group).then_some(w.group))
            .collect()
    }

    pub fn iteration_of(&self, id: &WishId) -> u32 {
        self.iterations.get(id).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::WishStatus;
    use crate::wish::WishFields;

    fn out_with(statuses: &[(i32, i32, WishStatus)]) -> AdmissionOutput {
        let mut out = AdmissionOutput::new(CampaignParams::new(3, 10, 20));
        for &(c, g, s) in statuses {
            out.wishes.push(
                Wish::new(WishFields {
                    candidate: c,
                    group: ProgramGroupId::new(g, g, g),
                    call_order: 1,
                    status: s,
                    ..WishFields::default()
                })
                .unwrap(),
            );
        }
        out
    }

    #[test]
    fn alert_supersedes_warning() {
        let mut out = AdmissionOutput::default();
        out.set_warning();
        assert!(out.warning());
        out.set_alert();
        assert!(out.alert() && !out.warning());
        out.set_warning();
        assert!(!out.warning());
    }

    #[test]
    fn strip_removes_only_offers_of_the_day_of_listed_groups() {
        let mut out = out_with(&[
            (1, 1, WishStatus::OfferedToday),
            (2, 1, WishStatus::AutoAccepted),
            (3, 1, WishStatus::OfferedPreviouslyAccepted),
            (4, 2, WishStatus::OfferedToday),
        ]);
        let groups: BTreeSet<_> = [ProgramGroupId::new(1, 1, 1)].into_iter().collect();
        let removed = out.strip_offers_of_the_day(&groups);
        assert_eq!(removed.len(), 2);
        assert_eq!(out.wishes.len(), 2);
        assert_eq!(out.offers_of_the_day_count(), 1);
        assert!(out.alert_message().contains("G(1,1,1)"));
    }

    #[test]
    fn trace_defaults_to_zero() {
        let out = out_with(&[(1, 1, WishStatus::Awaiting)]);
        assert_eq!(out.iteration_of(&out.wishes[0].id), 0);
    }
}
