//! crates/psup_report/src/model.rs
//! Day summary: what the run changed, the boarding thresholds it settled on,
//! and whether verification let everything through.
//!
//! Every field is preformatted or a plain count so renderers stay dumb.

use psup_core::{AdmissionOutput, WishStatus};

#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DaySummary {
    pub day: i32,
    pub gdd_active: bool,
    pub responder_candidates: usize,
    pub wishes: usize,
    /// One row per status, in status order; zero counts are kept.
    pub status_counts: Vec<StatusCount>,
    pub offers_of_the_day: usize,
    pub auto_accepted: usize,
    pub resignations: Resignations,
    pub thresholds: Vec<ThresholdRow>,
    pub verdict: Verdict,
    pub findings: Vec<FindingRow>,
    /// Lower-hex SHA-256 of the canonical input, when the caller has it.
    pub input_sha256: Option<String>,
}

#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusCount {
    pub status: String,
    pub count: usize,
}

#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resignations {
    pub responder_awaiting: usize,
    pub responder_offers: usize,
    pub gdd: usize,
}

impl Resignations {
    pub fn total(&self) -> usize {
        self.responder_awaiting + self.responder_offers + self.gdd
    }
}

#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThresholdRow {
    pub boarding_group: String,
    pub capacity: i32,
    pub threshold: i32,
    pub maximum: i32,
}

#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Verdict {
    pub alert: bool,
    pub warning: bool,
    pub excluded_groups: Vec<String>,
    pub stripped_offers: usize,
}

/// A verification finding, already flattened to text by the caller.
#[cfg_attr(feature = "render_json", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FindingRow {
    pub severity: String,
    pub code: String,
    pub subject: String,
    pub message: String,
}

pub fn build_summary(output: &AdmissionOutput) -> DaySummary {
    let status_counts = WishStatus::ALL
        .iter()
        .map(|&s| StatusCount {
            status: s.name().to_string(),
            count: output.wishes.iter().filter(|w| w.status == s).count(),
        })
        .collect();

    let count = |pred: fn(WishStatus) -> bool| output.wishes.iter().filter(|w| pred(w.status)).count();
    let resignations = Resignations {
        responder_awaiting: count(WishStatus::is_responder_awaiting_resignation),
        responder_offers: count(WishStatus::is_responder_offer_resignation),
        gdd: count(WishStatus::is_gdd_resignation),
    };

    let thresholds = output
        .boarding_groups
        .values()
        .map(|b| ThresholdRow {
            boarding_group: b.id.to_string(),
            capacity: b.capacity(),
            threshold: output.thresholds.get(&b.id).copied().unwrap_or(0),
            maximum: output.max_thresholds.get(&b.id).copied().unwrap_or(0),
        })
        .collect();

    DaySummary {
        day: output.params.day,
        gdd_active: output.params.gdd_active(),
        responder_candidates: output.responders.len(),
        wishes: output.wishes.len(),
        status_counts,
        offers_of_the_day: output.offers_of_the_day_count(),
        auto_accepted: count(WishStatus::is_auto_acceptance),
        resignations,
        thresholds,
        verdict: Verdict {
            alert: output.alert(),
            warning: output.warning(),
            excluded_groups: output.groups_not_exported().iter().map(|g| g.to_string()).collect(),
            stripped_offers: 0,
        },
        findings: Vec::new(),
        input_sha256: None,
    }
}

impl DaySummary {
    pub fn with_findings(mut self, findings: Vec<FindingRow>) -> Self {
        self.findings = findings;
        self
    }

    pub fn with_input_digest(mut self, sha256: impl Into<String>) -> Self {
        self.input_sha256 = Some(sha256.into());
        self
    }

    pub fn with_stripped_offers(mut self, n: usize) -> Self {
        self.verdict.stripped_offers = n;
        self
    }

    /// Status rows with a non-zero count.
    pub fn nonzero_status_counts(&self) -> impl Iterator<Item = &StatusCount> {
        self.status_counts.iter().filter(|c| c.count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use psup_core::{
        BoardingGroup, BoardingGroupId, BoardingRequest, CampaignParams, ProgramGroupId, Wish, WishFields,
    };
    use std::collections::BTreeSet;

    fn sample_output() -> AdmissionOutput {
        let gid = ProgramGroupId::new(1, 2, 3);
        let bid = BoardingGroupId::new(2, 0);
        let mut out = AdmissionOutput::new(CampaignParams::new(12, 10, 11));
        let wish = |candidate, status, boarding| {
            Wish::new(WishFields {
                candidate,
                group: gid,
                call_order: candidate,
                preference_rank: candidate,
                status,
                boarding,
                ..WishFields::default()
            })
            .unwrap()
        };
        out.wishes = vec![
            wish(1, WishStatus::OfferedToday, BoardingRequest::Ranked { boarding: bid, rank: 1 }),
            wish(2, WishStatus::AutoAccepted, BoardingRequest::None),
            wish(3, WishStatus::AutoDeclinedOffer, BoardingRequest::None),
            wish(4, WishStatus::GddResignedAwaiting, BoardingRequest::None),
            wish(5, WishStatus::Awaiting, BoardingRequest::None),
        ];
        out.boarding_groups.insert(bid, BoardingGroup::new(bid, 4).unwrap());
        out.thresholds.insert(bid, 6);
        out.max_thresholds.insert(bid, 9);
        out
    }

    #[test]
    fn counts_follow_statuses() {
        let s = build_summary(&sample_output());
        assert_eq!(s.day, 12);
        assert!(s.gdd_active);
        assert_eq!(s.wishes, 5);
        assert_eq!(s.offers_of_the_day, 2);
        assert_eq!(s.auto_accepted, 1);
        assert_eq!(s.resignations, Resignations { responder_awaiting: 0, responder_offers: 1, gdd: 1 });
        assert_eq!(s.resignations.total(), 2);
        assert_eq!(s.status_counts.len(), WishStatus::ALL.len());
        assert_eq!(s.nonzero_status_counts().count(), 5);
    }

    #[test]
    fn thresholds_and_verdict() {
        let mut out = sample_output();
        let mut groups = BTreeSet::new();
        groups.insert(ProgramGroupId::new(1, 2, 3));
        let stripped = out.strip_offers_of_the_day(&groups);
        out.set_alert();

        let s = build_summary(&out).with_stripped_offers(stripped.len()).with_input_digest("ab12");
        assert_eq!(
            s.thresholds,
            vec![ThresholdRow { boarding_group: "I(2,0)".into(), capacity: 4, threshold: 6, maximum: 9 }]
        );
        assert!(s.verdict.alert && !s.verdict.warning);
        assert_eq!(s.verdict.excluded_groups, vec!["G(1,2,3)".to_string()]);
        assert_eq!(s.verdict.stripped_offers, 2);
        assert_eq!(s.offers_of_the_day, 0);
        assert_eq!(s.input_sha256.as_deref(), Some("ab12"));
    }
}
