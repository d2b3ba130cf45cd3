//! crates/psup_algo/src/display.rs
//! Figures shown to candidates once the day's allocation is final: waitlist
//! ranks, waitlist counts, last-called ranks per program group, and displayed
//! boarding/call thresholds per boarding group.
//!
//! Runs on the output only; nothing here feeds back into allocation.
//! Wishes offered on a previous day or resolved outside the main process are ignored.

use std::collections::{BTreeMap, BTreeSet};

use psup_core::{
    AdmissionOutput, BoardingGroupId, CoreResult, ProgramGroupId, Reason, Subject, VerificationError, Wish, WishId,
};
use tracing::info;

/// Updates every display figure of `output`. `offers_of_the_day` holds the ids
/// offered by today's run, before any quarantine.
pub fn update_displays(output: &mut AdmissionOutput, offers_of_the_day: &BTreeSet<WishId>) -> CoreResult<()> {
    let mut by_group: BTreeMap<ProgramGroupId, Vec<usize>> = BTreeMap::new();
    let mut by_boarding: BTreeMap<BoardingGroupId, Vec<usize>> = BTreeMap::new();
    for (i, w) in output.wishes.iter().enumerate() {
        if w.status.was_offered_previously() || w.is_outside_main_process() {
            continue;
        }
        by_group.entry(w.group).or_default().push(i);
        if let Some(b) = w.boarding {
            by_boarding.entry(b).or_default().push(i);
        }
    }
    for list in by_group.values_mut().chain(by_boarding.values_mut()) {
        list.sort_by_key(|&i| (output.wishes[i].call_order, output.wishes[i].id));
    }

    info!("updating waitlist ranks and displayed last-called ranks");
    let day = output.params.day;
    for (gid, list) in &by_group {
        let count = update_waitlist_ranks(&mut output.wishes, list, offers_of_the_day, day);
        let last_called = displayed_last_called_rank(&output.wishes, list, &output.thresholds);
        if let Some(group) = output.groups.get_mut(gid) {
            group.waitlist_count = count;
            group.displayed_last_called_rank = last_called;
        }
    }

    info!("updating displayed boarding thresholds");
    for (bid, list) in &by_boarding {
        let concerned = output.groups_for_boarding(*bid);
        let (boarding_thresholds, call_thresholds) = displayed_boarding_thresholds(&output.wishes, list, &concerned);
        if let Some(boarding) = output.boarding_groups.get_mut(bid) {
            boarding.displayed_boarding_thresholds = boarding_thresholds;
            boarding.displayed_call_thresholds = call_thresholds;
        }
    }

    info!("checking waitlist ranks");
    for list in by_group.values() {
        check_waitlist_order(&output.wishes, list)?;
    }
    Ok(())
}

/// Sets the waitlist rank of the awaiting wishes without ranked boarding of one
/// group (`list` sorted by call order) and returns the number of distinct waiting candidates.
fn update_waitlist_ranks(wishes: &mut [Wish], list: &[usize], offers_of_the_day: &BTreeSet<WishId>, day: i32) -> i32 {
    let mut last_candidate = None;
    let mut waiting: i32 = 0;
    let mut distinct: i32 = 0;
    for &i in list {
        wishes[i].waitlist_rank = 0;
    }
    for (pos, &i) in list.iter().enumerate() {
        let w = &wishes[i];
        if !w.status.is_awaiting() || w.has_ranked_boarding() {
            continue;
        }
        // a candidate offered today on the sibling wish and consecutive wishes of one candidate count once
        if !offers_of_the_day.contains(&w.id.sibling()) && last_candidate != Some(w.candidate()) {
            waiting += 1;
            distinct += 1;
            last_candidate = Some(w.candidate());
        }
        let rank = if day == 1 {
            waiting.max(1)
        } else {
            let yesterday = if w.previous_waitlist_rank > 0 {
                w.previous_waitlist_rank
            } else {
                reintegration_rank(wishes, &list[pos + 1..], w, waiting)
            };
            waiting = waiting.min(yesterday);
            waiting
        };
        wishes[i].waitlist_rank = rank;
    }
    distinct
}

/// A wish without yesterday's rank was reintegrated: it takes the rank of the
/// next waiting candidate, if lower.
fn reintegration_rank(wishes: &[Wish], following: &[usize], wish: &Wish, current: i32) -> i32 {
    following
        .iter()
        .map(|&i| &wishes[i])
        .find(|v| v.call_order > wish.call_order && v.previous_waitlist_rank > 0 && v.candidate() != wish.candidate())
        .map(|v| current.min(v.previous_waitlist_rank))
        .unwrap_or(current)
}

/// Highest displayed call order among offers, up to the first awaiting wish
/// waiting for a genuine reason (not ignored, not blocked by its boarding threshold).
fn displayed_last_called_rank(wishes: &[Wish], list: &[usize], thresholds: &BTreeMap<BoardingGroupId, i32>) -> i32 {
    let mut rank = 0;
    for &i in list {
        let w = &wishes[i];
        if w.status.is_offer() {
            rank = rank.max(w.displayed_call_order);
        } else if w.status.is_awaiting() && !w.ignored_in_waitlist_ranks {
            let blocked_by_boarding = match w.boarding {
                Some(b) => w.boarding_rank > thresholds.get(&b).copied().unwrap_or(0),
                None => false,
            };
            if !blocked_by_boarding {
                break;
            }
        }
    }
    rank
}

type DisplayMaps = (BTreeMap<ProgramGroupId, i32>, BTreeMap<ProgramGroupId, i32>);

fn displayed_boarding_thresholds(wishes: &[Wish], list: &[usize], concerned: &[ProgramGroupId]) -> DisplayMaps {
    let mut boarding_thresholds = BTreeMap::new();
    let mut call_thresholds = BTreeMap::new();
    for gid in concerned {
        let in_group = || list.iter().map(|&i| &wishes[i]).filter(move |w| w.group == *gid);
        let Some(boarding_threshold) = in_group().filter(|w| w.status.is_offer()).map(|w| w.boarding_rank).max() else {
            boarding_thresholds.insert(*gid, 0);
            call_thresholds.insert(*gid, 0);
            continue;
        };
        boarding_thresholds.insert(*gid, boarding_threshold);
        let mut call = 0;
        for w in in_group() {
            if w.status.is_offer() {
                call = call.max(w.displayed_call_order);
            } else if w.ignored_in_waitlist_ranks || w.ignored_in_displayed_thresholds {
                continue;
            } else if w.status.is_awaiting() && w.boarding_rank <= boarding_threshold {
                break;
            }
        }
        call_thresholds.insert(*gid, call);
    }
    (boarding_thresholds, call_thresholds)
}

/// Waitlist ranks of awaiting wishes without ranked boarding never decrease along the call order.
pub fn check_waitlist_order(wishes: &[Wish], list: &[usize]) -> CoreResult<()> {
    let mut previous: Option<&Wish> = None;
    for w in list.iter().map(|&i| &wishes[i]) {
        if !w.status.is_awaiting() || w.has_ranked_boarding() {
            continue;
        }
        if let Some(p) = previous {
            if p.call_order < w.call_order && p.waitlist_rank > w.waitlist_rank {
                return Err(VerificationError::with_detail(
                    Reason::DisplayWaitlistOrder,
                    Subject::Group(w.group),
                    format!("{} ranked {} before {} ranked {}", p.id, p.waitlist_rank, w.id, w.waitlist_rank),
                ));
            }
        }
        previous = Some(w);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use psup_core::{BoardingGroup, BoardingRequest, CampaignParams, ProgramGroup, WishFields, WishStatus};

    fn gid() -> ProgramGroupId {
        ProgramGroupId::new(1, 1, 1)
    }

    fn wish(c: i32, order: i32, status: WishStatus, previous: i32) -> Wish {
        Wish::new(WishFields {
            candidate: c,
            group: gid(),
            call_order: order,
            displayed_call_order: order,
            status,
            previous_waitlist_rank: previous,
            ..WishFields::default()
        })
        .unwrap()
    }

    fn output(day: i32, wishes: Vec<Wish>) -> AdmissionOutput {
        let p = CampaignParams::new(day, 10, 20);
        let mut out = AdmissionOutput::new(p);
        out.groups.insert(gid(), ProgramGroup::new(1, gid(), 0, 0, 0, &p).unwrap());
        out.wishes = wishes;
        out
    }

    #[test]
    fn first_day_ranks_count_waiting_candidates() {
        let mut out = output(
            1,
            vec![
                wish(1, 1, WishStatus::OfferedToday, 0),
                wish(2, 2, WishStatus::Awaiting, 0),
                wish(3, 3, WishStatus::Awaiting, 0),
            ],
        );
        update_displays(&mut out, &BTreeSet::new()).unwrap();
        assert_eq!(out.wishes[1].waitlist_rank, 1);
        assert_eq!(out.wishes[2].waitlist_rank, 2);
        let g = &out.groups[&gid()];
        assert_eq!(g.waitlist_count, 2);
        assert_eq!(g.displayed_last_called_rank, 1);
    }

    #[test]
    fn later_days_never_exceed_yesterday_and_reintegrate() {
        let mut out = output(
            4,
            vec![
                wish(1, 1, WishStatus::Awaiting, 1),
                wish(2, 2, WishStatus::Awaiting, 0), // reintegrated
                wish(3, 3, WishStatus::Awaiting, 2),
            ],
        );
        update_displays(&mut out, &BTreeSet::new()).unwrap();
        let ranks: Vec<i32> = out.wishes.iter().map(|w| w.waitlist_rank).collect();
        assert_eq!(ranks, vec![1, 2, 2]);
    }

    #[test]
    fn boarding_display_maps() {
        let bid = BoardingGroupId::new(1, 0);
        let mut out = output(3, Vec::new());
        out.boarding_groups.insert(bid, BoardingGroup::new(bid, 2).unwrap());
        out.thresholds.insert(bid, 2);
        for (c, order, rank, status) in [(1, 1, 2, WishStatus::OfferedToday), (2, 2, 1, WishStatus::Awaiting), (3, 3, 3, WishStatus::Awaiting)] {
            out.wishes.push(
                Wish::new(WishFields {
                    candidate: c,
                    group: gid(),
                    call_order: order,
                    displayed_call_order: order,
                    status,
                    boarding: BoardingRequest::Ranked { boarding: bid, rank },
                    ..WishFields::default()
                })
                .unwrap(),
            );
        }
        update_displays(&mut out, &BTreeSet::new()).unwrap();
        let b = &out.boarding_groups[&bid];
        assert_eq!(b.displayed_boarding_thresholds[&gid()], 2);
        assert_eq!(b.displayed_call_thresholds[&gid()], 1);
        // candidate 2 waits under the threshold, so the group's last-called rank stops at 1
        assert_eq!(out.groups[&gid()].displayed_last_called_rank, 1);
    }

    #[test]
    fn decreasing_waitlist_rank_is_rejected() {
        let mut a = wish(1, 1, WishStatus::Awaiting, 0);
        let mut b = wish(2, 2, WishStatus::Awaiting, 0);
        a.waitlist_rank = 2;
        b.waitlist_rank = 1;
        let err = check_waitlist_order(&[a, b], &[0, 1]).unwrap_err();
        assert_eq!(err.reason, Reason::DisplayWaitlistOrder);
    }
}
