//! crates/psup_io/src/wire.rs
//! Wire-facing documents for the daily input and output.
//!
//! Maps keyed by composite ids are written as arrays of entries, ordered by key,
//! since JSON object keys must be strings.

use std::collections::BTreeMap;

use psup_core::{
    AdmissionInput, AdmissionOutput, BoardingGroup, BoardingGroupId, BoardingRequest, CampaignParams,
    CandidateId, CoreResult, ProgramGroup, ProgramGroupId, Reason, VerificationError, Wish, WishFields,
    WishId, WishStatus,
};
use serde::{Deserialize, Serialize};

fn is_false(b: &bool) -> bool {
    !*b
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

// ---------- Input document ----------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputDoc {
    pub params: CampaignParams,
    pub groups: Vec<GroupDoc>,
    pub boarding_groups: Vec<BoardingGroupDoc>,
    pub wishes: Vec<WishDoc>,
    #[serde(default)]
    pub responder_candidates: Vec<CandidateId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDoc {
    pub id: ProgramGroupId,
    pub capacity: i32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub bloc_call_limit: i32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub last_called_rank: i32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub last_called_rank_before: i32,
    /// Overrides the estimate derived from the two last-called ranks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_last_called_at_cutoff: Option<i32>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub boarding_reservation_over: bool,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub admission_stop: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardingGroupDoc {
    pub id: BoardingGroupId,
    pub capacity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishDoc {
    pub candidate: i32,
    pub group: ProgramGroupId,
    pub call_order: i32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub displayed_call_order: i32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub preference_rank: i32,
    pub status: WishStatus,
    #[serde(default, skip_serializing_if = "is_false")]
    pub boarding_requested: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boarding_group: Option<BoardingGroupId>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub boarding_rank: i32,
    #[serde(default, skip_serializing_if = "is_false")]
    pub outside_main_process: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub ignored_in_waitlist_ranks: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub ignored_in_displayed_thresholds: bool,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub previous_waitlist_rank: i32,
}

impl WishDoc {
    pub fn from_wish(wish: &Wish) -> Self {
        let f = wish.fields();
        let (boarding_requested, boarding_group, boarding_rank) = match f.boarding {
            BoardingRequest::None => (false, None, 0),
            BoardingRequest::Unranked => (true, None, 0),
            BoardingRequest::Ranked { boarding, rank } => (true, Some(boarding), rank),
        };
        Self {
            candidate: f.candidate,
            group: f.group,
            call_order: f.call_order,
            displayed_call_order: f.displayed_call_order,
            preference_rank: f.preference_rank,
            status: f.status,
            boarding_requested,
            boarding_group,
            boarding_rank,
            outside_main_process: f.outside_main_process,
            ignored_in_waitlist_ranks: f.ignored_in_waitlist_ranks,
            ignored_in_displayed_thresholds: f.ignored_in_displayed_thresholds,
            previous_waitlist_rank: f.previous_waitlist_rank,
        }
    }

    /// A boarding rank without a boarding group is rejected (`NullBoarding`).
    pub fn boarding_request(&self) -> CoreResult<BoardingRequest> {
        match (self.boarding_group, self.boarding_rank) {
            (Some(boarding), rank) => Ok(BoardingRequest::Ranked { boarding, rank }),
            (None, rank) if rank > 0 => Err(VerificationError::wish(
                Reason::NullBoarding,
                WishId::new(self.candidate, self.group.program, true),
            )),
            (None, _) if self.boarding_requested => Ok(BoardingRequest::Unranked),
            (None, _) => Ok(BoardingRequest::None),
        }
    }

    pub fn into_wish(self) -> CoreResult<Wish> {
        let boarding = self.boarding_request()?;
        Wish::new(WishFields {
            candidate: self.candidate,
            group: self.group,
            call_order: self.call_order,
            displayed_call_order: self.displayed_call_order,
            preference_rank: self.preference_rank,
            status: self.status,
            boarding,
            outside_main_process: self.outside_main_process,
            ignored_in_waitlist_ranks: self.ignored_in_waitlist_ranks,
            ignored_in_displayed_thresholds: self.ignored_in_displayed_thresholds,
            previous_waitlist_rank: self.previous_waitlist_rank,
        })
    }
}

impl InputDoc {
    pub fn from_input(input: &AdmissionInput) -> Self {
        Self {
            params: input.params,
            groups: input
                .groups()
                .values()
                .map(|g| GroupDoc {
                    id: g.id,
                    capacity: g.capacity,
                    bloc_call_limit: g.bloc_call_limit,
                    last_called_rank: 0,
                    last_called_rank_before: 0,
                    estimated_last_called_at_cutoff: Some(g.estimated_last_called_at_cutoff),
                    boarding_reservation_over: g.boarding_reservation_over,
                    admission_stop: g.admission_stop,
                })
                .collect(),
            boarding_groups: input
                .boarding_groups()
                .values()
                .map(|b| BoardingGroupDoc { id: b.id, capacity: b.capacity() })
                .collect(),
            wishes: input.wishes().iter().map(WishDoc::from_wish).collect(),
            responder_candidates: input.responders().iter().copied().collect(),
        }
    }

    /// Builds the core input; the first constructor failure aborts.
    pub fn into_input(self) -> CoreResult<AdmissionInput> {
        let params = self.params;
        let mut input = AdmissionInput::new(params);
        for g in self.groups {
            let mut group = ProgramGroup::new(
                g.capacity,
                g.id,
                g.bloc_call_limit,
                g.last_called_rank,
                g.last_called_rank_before,
                &params,
            )?
            .with_boarding_reservation_over(g.boarding_reservation_over)
            .with_admission_stop(g.admission_stop);
            if let Some(estimate) = g.estimated_last_called_at_cutoff {
                group.estimated_last_called_at_cutoff = estimate;
            }
            input.add_group(group)?;
        }
        for b in self.boarding_groups {
            input.add_boarding_group(BoardingGroup::new(b.id, b.capacity)?)?;
        }
        for w in self.wishes {
            input.add_wish(w.into_wish()?)?;
        }
        for c in self.responder_candidates {
            input.add_responder(c);
        }
        Ok(input)
    }
}

// ---------- Output document ----------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDoc {
    pub params: CampaignParams,
    pub wishes: Vec<OutputWishDoc>,
    pub groups: Vec<OutputGroupDoc>,
    pub boarding_groups: Vec<OutputBoardingGroupDoc>,
    pub thresholds: Vec<ThresholdEntry>,
    pub max_thresholds: Vec<ThresholdEntry>,
    pub responder_candidates: Vec<CandidateId>,
    pub alert: bool,
    pub warning: bool,
    pub groups_not_exported: Vec<ProgramGroupId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputWishDoc {
    #[serde(flatten)]
    pub wish: WishDoc,
    /// `100 * outer + inner` of the last status change, 0 when unchanged.
    pub iteration: u32,
    pub waitlist_rank: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputGroupDoc {
    pub id: ProgramGroupId,
    pub capacity: i32,
    pub bloc_call_limit: i32,
    pub estimated_last_called_at_cutoff: i32,
    pub boarding_reservation_over: bool,
    pub admission_stop: i32,
    pub displayed_last_called_rank: i32,
    pub waitlist_count: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputBoardingGroupDoc {
    pub id: BoardingGroupId,
    pub capacity: i32,
    pub displayed_thresholds: Vec<DisplayedThresholds>,
}

/// Displayed thresholds of one program group inside a boarding group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayedThresholds {
    pub group: ProgramGroupId,
    pub boarding_threshold: i32,
    pub call_threshold: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdEntry {
    pub boarding_group: BoardingGroupId,
    pub value: i32,
}

fn threshold_entries(map: &BTreeMap<BoardingGroupId, i32>) -> Vec<ThresholdEntry> {
    map.iter().map(|(&boarding_group, &value)| ThresholdEntry { boarding_group, value }).collect()
}

fn displayed_thresholds(b: &BoardingGroup) -> Vec<DisplayedThresholds> {
    let mut groups: Vec<ProgramGroupId> = b
        .displayed_boarding_thresholds
        .keys()
        .chain(b.displayed_call_thresholds.keys())
        .copied()
        .collect();
    groups.sort();
    groups.dedup();
    groups
        .into_iter()
        .map(|group| DisplayedThresholds {
            group,
            boarding_threshold: b.displayed_boarding_thresholds.get(&group).copied().unwrap_or(0),
            call_threshold: b.displayed_call_thresholds.get(&group).copied().unwrap_or(0),
        })
        .collect()
}

impl OutputDoc {
    pub fn from_output(output: &AdmissionOutput) -> Self {
        Self {
            params: output.params,
            wishes: output
                .wishes
                .iter()
                .map(|w| OutputWishDoc {
                    wish: WishDoc::from_wish(w),
                    iteration: output.iteration_of(&w.id),
                    waitlist_rank: w.waitlist_rank,
                })
                .collect(),
            groups: output
                .groups
                .values()
                .map(|g| OutputGroupDoc {
                    id: g.id,
                    capacity: g.capacity,
                    bloc_call_limit: g.bloc_call_limit,
                    estimated_last_called_at_cutoff: g.estimated_last_called_at_cutoff,
                    boarding_reservation_over: g.boarding_reservation_over,
                    admission_stop: g.admission_stop,
                    displayed_last_called_rank: g.displayed_last_called_rank,
                    waitlist_count: g.waitlist_count,
                })
                .collect(),
            boarding_groups: output
                .boarding_groups
                .values()
                .map(|b| OutputBoardingGroupDoc {
                    id: b.id,
                    capacity: b.capacity(),
                    displayed_thresholds: displayed_thresholds(b),
                })
                .collect(),
            thresholds: threshold_entries(&output.thresholds),
            max_thresholds: threshold_entries(&output.max_thresholds),
            responder_candidates: output.responders.iter().copied().collect(),
            alert: output.alert(),
            warning: output.warning(),
            groups_not_exported: output.groups_not_exported().iter().copied().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(boarding_group: Option<BoardingGroupId>, boarding_rank: i32, requested: bool) -> WishDoc {
        WishDoc {
            candidate: 7,
            group: ProgramGroupId::new(1, 1, 10),
            call_order: 3,
            displayed_call_order: 3,
            preference_rank: 0,
            status: WishStatus::Awaiting,
            boarding_requested: requested,
            boarding_group,
            boarding_rank,
            outside_main_process: false,
            ignored_in_waitlist_ranks: false,
            ignored_in_displayed_thresholds: false,
            previous_waitlist_rank: 0,
        }
    }

    #[test]
    fn boarding_request_follows_group_and_rank() {
        let b = BoardingGroupId::new(4, 0);
        assert_eq!(
            doc(Some(b), 2, false).boarding_request().unwrap(),
            BoardingRequest::Ranked { boarding: b, rank: 2 }
        );
        assert_eq!(doc(None, 0, true).boarding_request().unwrap(), BoardingRequest::Unranked);
        assert_eq!(doc(None, 0, false).boarding_request().unwrap(), BoardingRequest::None);
        assert_eq!(doc(None, 5, true).boarding_request().unwrap_err().reason, Reason::NullBoarding);
    }

    #[test]
    fn wish_doc_survives_a_trip_through_the_core_type() {
        let d = doc(Some(BoardingGroupId::new(4, 10)), 9, true);
        let wish = d.clone().into_wish().unwrap();
        assert!(wish.id.boarding);
        assert_eq!(WishDoc::from_wish(&wish), d);
    }

    #[test]
    fn estimate_override_replaces_the_derived_estimate() {
        let params = CampaignParams::new(5, 10, 20);
        let gid = ProgramGroupId::new(1, 1, 10);
        let input = InputDoc {
            params,
            groups: vec![GroupDoc {
                id: gid,
                capacity: 3,
                bloc_call_limit: 0,
                last_called_rank: 0,
                last_called_rank_before: 0,
                estimated_last_called_at_cutoff: Some(42),
                boarding_reservation_over: false,
                admission_stop: 0,
            }],
            boarding_groups: vec![],
            wishes: vec![],
            responder_candidates: vec![CandidateId(3)],
        }
        .into_input()
        .unwrap();
        assert_eq!(input.groups()[&gid].estimated_last_called_at_cutoff, 42);
        assert!(input.responders().contains(&CandidateId(3)));
    }

    #[test]
    fn threshold_maps_become_sorted_entries() {
        let mut map = BTreeMap::new();
        map.insert(BoardingGroupId::new(2, 0), 5);
        map.insert(BoardingGroupId::new(1, 3), 8);
        let entries = threshold_entries(&map);
        assert_eq!(entries[0].boarding_group, BoardingGroupId::new(1, 3));
        assert_eq!(entries[1].value, 5);
    }
}
