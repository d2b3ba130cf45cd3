//! crates/psup_pipeline/src/verify_output.rs
//! Post-computation checks and quarantine.
//!
//! Responder and ordered-resignation properties and the wish-set equality are
//! fatal. Group-level properties are recoverable: each violation becomes a
//! `Finding` and invalidates the program groups involved. Invalid groups are
//! then extended through the dependency closure and, in strict mode, their
//! offers of the day are removed from the output.

use std::collections::{BTreeMap, BTreeSet};

use psup_core::{
    AdmissionInput, AdmissionOutput, BoardingGroup, BoardingGroupId, CandidateId, CoreResult, ProgramGroup,
    ProgramGroupId, Reason, Subject, VerificationError, Wish, WishId,
};
use tracing::{info, warn};

use crate::closure::DependencyGraph;
use crate::{gdd_checks, responder_checks};

// ---------- Findings ----------

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

/// One recoverable violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    pub subject: Subject,
}

impl From<VerificationError> for Finding {
    fn from(e: VerificationError) -> Self {
        Self { severity: Severity::Error, code: e.reason.code(), message: e.detail, subject: e.subject }
    }
}

/// Stable order: code, then subject, then message.
pub fn sort_findings(findings: &mut [Finding]) {
    findings.sort_by(|a, b| {
        a.code
            .cmp(b.code)
            .then_with(|| a.subject.cmp(&b.subject))
            .then_with(|| a.message.cmp(&b.message))
    });
}

/// Detection result, before any stripping.
#[derive(Clone, Debug, Default)]
pub struct OutputReport {
    pub findings: Vec<Finding>,
    /// Program groups directly invalidated by a finding.
    pub invalid_groups: BTreeSet<ProgramGroupId>,
    graph: DependencyGraph,
}

impl OutputReport {
    pub fn is_clean(&self) -> bool {
        self.invalid_groups.is_empty()
    }
}

/// What quarantine did to the output.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuarantineOutcome {
    /// Invalid groups plus everything linked to them through boarding groups.
    pub excluded_groups: BTreeSet<ProgramGroupId>,
    pub stripped_offers: Vec<WishId>,
}

// ---------- Indexes ----------

type Placed<K> = BTreeMap<K, BTreeSet<CandidateId>>;

/// Read-only views over input and output built once per verification.
struct Views<'a> {
    by_group: BTreeMap<ProgramGroupId, Vec<&'a Wish>>,
    by_boarding: BTreeMap<BoardingGroupId, Vec<&'a Wish>>,
    initially_placed_groups: Placed<ProgramGroupId>,
    initially_placed_boardings: Placed<BoardingGroupId>,
    placed_groups: Placed<ProgramGroupId>,
    placed_boardings: Placed<BoardingGroupId>,
    bloc_call_effective: BTreeSet<ProgramGroupId>,
    open_groups: BTreeSet<ProgramGroupId>,
}

impl<'a> Views<'a> {
    fn build(input: &AdmissionInput, output: &'a AdmissionOutput) -> CoreResult<Self> {
        let mut initially_placed_groups: Placed<ProgramGroupId> = BTreeMap::new();
        let mut initially_placed_boardings: Placed<BoardingGroupId> = BTreeMap::new();
        for w in input.wishes().iter().filter(|w| w.status.is_offer()) {
            initially_placed_groups.entry(w.group).or_default().insert(w.candidate());
            if let Some(b) = w.boarding {
                initially_placed_boardings.entry(b).or_default().insert(w.candidate());
            }
        }

        let mut views = Views {
            by_group: output.groups.keys().map(|g| (*g, Vec::new())).collect(),
            by_boarding: output.boarding_groups.keys().map(|b| (*b, Vec::new())).collect(),
            initially_placed_groups,
            initially_placed_boardings,
            placed_groups: BTreeMap::new(),
            placed_boardings: BTreeMap::new(),
            bloc_call_effective: BTreeSet::new(),
            open_groups: output.groups.values().filter(|g| g.is_open()).map(|g| g.id).collect(),
        };
        for w in &output.wishes {
            let Some(group) = output.groups.get(&w.group) else {
                return Err(VerificationError::with_detail(Reason::UnknownGroup, Subject::Wish(w.id), w.group.to_string()));
            };
            views.by_group.entry(w.group).or_default().push(w);
            if w.status.is_offer() {
                views.placed_groups.entry(w.group).or_default().insert(w.candidate());
            }
            if let Some(b) = w.boarding {
                views.by_boarding.entry(b).or_default().push(w);
                if w.status.is_offer() {
                    views.placed_boardings.entry(b).or_default().insert(w.candidate());
                }
            }
            if w.call_order <= group.bloc_call_limit
                && (w.status.is_offer() || w.status.is_responder_offer_resignation())
            {
                views.bloc_call_effective.insert(w.group);
            }
        }
        for list in views.by_group.values_mut() {
            list.sort_by_key(|w| (w.call_order, w.id));
        }
        for list in views.by_boarding.values_mut() {
            list.sort_by_key(|w| (w.boarding_rank, w.id));
        }
        Ok(views)
    }

    fn group_wishes(&self, id: &ProgramGroupId) -> &[&'a Wish] {
        self.by_group.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    fn initially_in_group(&self, id: &ProgramGroupId, c: CandidateId) -> bool {
        self.initially_placed_groups.get(id).is_some_and(|s| s.contains(&c))
    }

    fn initially_in_boarding(&self, id: &BoardingGroupId, c: CandidateId) -> bool {
        self.initially_placed_boardings.get(id).is_some_and(|s| s.contains(&c))
    }

    fn count<K: Ord>(placed: &Placed<K>, id: &K) -> usize {
        placed.get(id).map_or(0, BTreeSet::len)
    }
}

fn violation(reason: Reason, subject: Subject, message: String) -> VerificationError {
    VerificationError::with_detail(reason, subject, message)
}

// ---------- Entry point ----------

/// Runs every output check. Fatal violations come back as `Err`.
pub fn verify_output(input: &AdmissionInput, output: &AdmissionOutput) -> CoreResult<OutputReport> {
    let expected: BTreeSet<WishId> = input.wishes().iter().map(|w| w.id).collect();
    let produced: BTreeSet<WishId> = output.wishes.iter().map(|w| w.id).collect();
    if expected != produced {
        let detail = format!("{} input wishes, {} output wishes", expected.len(), produced.len());
        return Err(VerificationError::with_detail(Reason::OutputWishSetMismatch, Subject::None, detail));
    }

    let views = Views::build(input, output)?;
    let mut report = OutputReport {
        graph: DependencyGraph::build(output.groups.keys(), &output.wishes)?,
        ..OutputReport::default()
    };

    responder_checks::verify(&output.wishes, input.responders())?;
    gdd_checks::verify(&output.wishes, &output.params, &output.responders)?;

    info!(groups = output.groups.len(), "checking offers per program group");
    for group in output.groups.values() {
        if !group.is_open() {
            info!(group = %group.id, "group closed to admissions, not checked");
            continue;
        }
        let checked = check_call_order(&views, group)
            .and_then(|()| check_call_and_boarding_order(&views, group))
            .and_then(|()| check_group_capacity(&views, group));
        if let Err(e) = checked {
            warn!(group = %group.id, error = %e, "group invalidated");
            report.invalid_groups.insert(group.id);
            report.findings.push(e.into());
        }
    }

    info!(boarding_groups = output.boarding_groups.len(), "checking offers per boarding group");
    for boarding in output.boarding_groups.values() {
        let checked = check_threshold(output, boarding.id)
            .and_then(|()| check_boarding_order(&views, boarding))
            .and_then(|()| check_boarding_capacity(&views, boarding));
        if let Err(e) = checked {
            warn!(boarding = %boarding.id, error = %e, "boarding group invalidated");
            report.invalid_groups.extend(report.graph.groups_of_boarding(boarding.id));
            report.findings.push(e.into());
        }
    }

    sort_findings(&mut report.findings);
    Ok(report)
}

/// Extends the invalid groups through the dependency closure and, when `strip`
/// is set, removes their offers of the day and raises alert or warning.
pub fn quarantine(output: &mut AdmissionOutput, report: &OutputReport, strip: bool) -> QuarantineOutcome {
    if report.is_clean() {
        return QuarantineOutcome::default();
    }
    warn!("an output property does not hold");
    let excluded = report.graph.closure(&report.invalid_groups);
    warn!(groups = excluded.len(), "program groups invalidated in the output");
    if !strip {
        return QuarantineOutcome { excluded_groups: excluded, stripped_offers: Vec::new() };
    }

    let removed = output.strip_offers_of_the_day(&excluded);
    for w in &removed {
        warn!(wish = %w.id, "offer removed");
    }
    if removed.is_empty() {
        warn!("invalidation without consequence: no offer removed");
        output.set_warning();
    } else {
        warn!("{}", output.alert_message());
        warn!(
            offers = removed.len(),
            "offers removed; check the input data and run the computation again to complete the export"
        );
        output.set_alert();
    }
    QuarantineOutcome { excluded_groups: excluded, stripped_offers: removed.iter().map(|w| w.id).collect() }
}

// ---------- Program group properties ----------

/// P1: the best awaiting wish without ranked boarding is not overtaken by a
/// worse call order offered today to a candidate not already placed.
fn check_call_order(v: &Views<'_>, group: &ProgramGroup) -> CoreResult<()> {
    let wishes = v.group_wishes(&group.id);
    let Some(v1) = wishes.iter().find(|w| w.status.is_awaiting() && !w.has_ranked_boarding()) else {
        return Ok(());
    };
    if let Some(v2) = wishes.iter().find(|v2| {
        v2.status.is_offer_of_the_day() && !v.initially_in_group(&group.id, v2.candidate()) && v2.call_order > v1.call_order
    }) {
        return Err(violation(
            Reason::OutputP1,
            Subject::Group(group.id),
            format!("awaiting {} overtaken by {}", v1.id, v2.id),
        ));
    }
    Ok(())
}

/// P2: an awaiting ranked boarding wish is not overtaken by a new offer in the
/// same boarding group worse on both call order and boarding rank.
fn check_call_and_boarding_order(v: &Views<'_>, group: &ProgramGroup) -> CoreResult<()> {
    if !v.open_groups.contains(&group.id) {
        return Ok(());
    }
    let wishes = v.group_wishes(&group.id);
    for v1 in wishes {
        let Some(b) = v1.boarding else { continue };
        if !v1.status.is_awaiting() || v1.ignored_in_waitlist_ranks {
            continue;
        }
        let overtaking = wishes.iter().find(|v2| {
            v2.boarding == Some(b)
                && v2.status.is_offer_of_the_day()
                && v2.call_order > v1.call_order
                && !v.initially_in_group(&group.id, v2.candidate())
                && v2.boarding_rank > v1.boarding_rank
                && !v.initially_in_boarding(&b, v2.candidate())
                && !v2.ignored_in_waitlist_ranks
        });
        if let Some(v2) = overtaking {
            return Err(violation(
                Reason::OutputP2,
                Subject::Group(group.id),
                format!("awaiting {} overtaken by {} in {b}", v1.id, v2.id),
            ));
        }
    }
    Ok(())
}

/// P4: no new offer into an overfull group unless bloc call explains it, and an
/// underfull group keeps no awaiting wish without ranked boarding.
fn check_group_capacity(v: &Views<'_>, group: &ProgramGroup) -> CoreResult<()> {
    let placed = Views::count(&v.placed_groups, &group.id) as i64;
    let initially = Views::count(&v.initially_placed_groups, &group.id) as i64;
    let capacity = i64::from(group.capacity);
    if placed > capacity && placed > initially && !v.bloc_call_effective.contains(&group.id) {
        return Err(violation(
            Reason::OutputP4,
            Subject::Group(group.id),
            format!("new offers in a group over capacity ({placed} > {capacity})"),
        ));
    }
    if placed < capacity {
        if let Some(w) = v.group_wishes(&group.id).iter().find(|w| w.status.is_awaiting() && !w.has_ranked_boarding()) {
            return Err(violation(
                Reason::OutputP4,
                Subject::Group(group.id),
                format!("group under capacity ({placed} < {capacity}) while {} awaits", w.id),
            ));
        }
    }
    Ok(())
}

// ---------- Boarding group properties ----------

fn check_threshold(output: &AdmissionOutput, id: BoardingGroupId) -> CoreResult<()> {
    let threshold = output.thresholds.get(&id).copied().unwrap_or(0);
    let maximum = output.max_thresholds.get(&id).copied().unwrap_or(0);
    if threshold > maximum {
        return Err(violation(
            Reason::ThresholdAboveMaximum,
            Subject::Boarding(id),
            format!("threshold {threshold} above maximum {maximum}"),
        ));
    }
    Ok(())
}

/// P3: the best-ranked awaiting boarding wish whose candidate already holds the
/// program is not overtaken by a worse boarding rank offered today.
fn check_boarding_order(v: &Views<'_>, boarding: &BoardingGroup) -> CoreResult<()> {
    let wishes = v.by_boarding.get(&boarding.id).map(Vec::as_slice).unwrap_or_default();
    let first = wishes.iter().find(|w| {
        w.status.is_awaiting()
            && v.placed_groups.get(&w.group).is_some_and(|s| s.contains(&w.candidate()))
            && !w.ignored_in_waitlist_ranks
    });
    let Some(v1) = first else {
        return Ok(());
    };
    let overtaking = wishes.iter().find(|v2| {
        v2.status.is_offer_of_the_day()
            && v2.boarding_rank > v1.boarding_rank
            && !v.initially_in_boarding(&boarding.id, v2.candidate())
            && !v2.ignored_in_waitlist_ranks
            && v.open_groups.contains(&v1.group)
    });
    if let Some(v2) = overtaking {
        return Err(violation(
            Reason::OutputP3,
            Subject::Boarding(boarding.id),
            format!("awaiting {} overtaken by {}", v1.id, v2.id),
        ));
    }
    Ok(())
}

/// P5: no new boarding seat handed out in an overfull boarding group.
fn check_boarding_capacity(v: &Views<'_>, boarding: &BoardingGroup) -> CoreResult<()> {
    let placed = Views::count(&v.placed_boardings, &boarding.id) as i64;
    let initially = Views::count(&v.initially_placed_boardings, &boarding.id) as i64;
    let capacity = i64::from(boarding.capacity());
    if placed > capacity && placed > initially {
        return Err(violation(
            Reason::OutputP5,
            Subject::Boarding(boarding.id),
            format!("new offers in a boarding group over capacity ({placed} > {capacity})"),
        ));
    }
    Ok(())
}
