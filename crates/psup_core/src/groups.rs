//! crates/psup_core/src/groups.rs
//! Program groups (admission units with call order and capacity) and boarding
//! groups (dormitory resources shared by several program groups).
//!
//! Both are built once per run through validating constructors; only the
//! display fields are updated afterwards, on the output copy.

use std::collections::BTreeMap;

use crate::errors::{CoreResult, Reason, Subject, VerificationError};
use crate::ids::{BoardingGroupId, ProgramGroupId};
use crate::params::CampaignParams;

/// Days between the two last-called ranks used for extrapolation.
pub const DAYS_FOR_BOARDING_INTERPOLATION: i64 = 4;

/// Rank meaning "no bound".
pub const UNBOUNDED_RANK: i32 = i32::MAX;

// ---------- Program group ----------

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgramGroup {
    pub id: ProgramGroupId,
    /// Desired recruitment (seats).
    pub capacity: i32,
    /// Bloc-call limit: every call order at or below gets an offer.
    pub bloc_call_limit: i32,
    /// Estimated last-called rank on the boarding reservation end day.
    pub estimated_last_called_at_cutoff: i32,
    /// The program no longer reserves boarding seats.
    pub boarding_reservation_over: bool,
    /// Administrative stop flag; 0 means open.
    pub admission_stop: i32,
    /// Display: last-called rank shown to candidates.
    pub displayed_last_called_rank: i32,
    /// Display: number of distinct waitlisted candidates.
    pub waitlist_count: i32,
}

impl ProgramGroup {
    /// `last_called_now` / `last_called_before` are the last-called ranks today and
    /// [`DAYS_FOR_BOARDING_INTERPOLATION`] days earlier.
    pub fn new(
        capacity: i32,
        id: ProgramGroupId,
        bloc_call_limit: i32,
        last_called_now: i32,
        last_called_before: i32,
        params: &CampaignParams,
    ) -> CoreResult<Self> {
        if capacity < 0 || bloc_call_limit < 0 || last_called_now < 0 {
            return Err(VerificationError::new(Reason::GroupParamsInconsistent, Subject::Group(id)));
        }
        let estimated = estimate_last_called_at_cutoff(
            last_called_now,
            last_called_before,
            bloc_call_limit,
            params,
        )
        .map_err(|e| VerificationError { subject: Subject::Group(id), ..e })?;
        Ok(Self {
            id,
            capacity,
            bloc_call_limit,
            estimated_last_called_at_cutoff: estimated,
            boarding_reservation_over: false,
            admission_stop: 0,
            displayed_last_called_rank: 0,
            waitlist_count: 0,
        })
    }

    pub fn with_boarding_reservation_over(mut self, over: bool) -> Self {
        self.boarding_reservation_over = over;
        self
    }

    pub fn with_admission_stop(mut self, flag: i32) -> Self {
        self.admission_stop = flag;
        self
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.admission_stop == 0
    }
}

/// Estimate of the last-called rank on the boarding reservation end day.
///
/// Day 1 (or earlier) and missing data are fully conservative (unbounded).
/// From the cutoff day on, the current rank is used as is. In between the rank
/// is extrapolated linearly, never below the bloc-call limit nor the current rank.
pub fn estimate_last_called_at_cutoff(
    last_called_now: i32,
    last_called_before: i32,
    bloc_call_limit: i32,
    params: &CampaignParams,
) -> CoreResult<i32> {
    if last_called_now < last_called_before {
        return Err(VerificationError::with_detail(
            Reason::LastCalledInconsistent,
            Subject::None,
            format!("{last_called_now} < {last_called_before}"),
        ));
    }
    if params.day <= 1 {
        return Ok(UNBOUNDED_RANK);
    }
    if params.day >= params.boarding_reservation_end_day {
        return Ok(bloc_call_limit.max(last_called_now));
    }
    if last_called_now <= 0 {
        return Ok(UNBOUNDED_RANK);
    }
    let now = i64::from(last_called_now);
    let end = i64::from(params.boarding_reservation_end_day);
    let day = i64::from(params.day);
    let estimate = if last_called_before <= 0 {
        now * (end - 1) / (day - 1)
    } else {
        now + ((end - day) * (now - i64::from(last_called_before))) / DAYS_FOR_BOARDING_INTERPOLATION
    };
    let clamped = estimate.min(i64::from(UNBOUNDED_RANK)) as i32;
    Ok(clamped.max(bloc_call_limit.max(last_called_now)))
}

// ---------- Boarding group ----------

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardingGroup {
    pub id: BoardingGroupId,
    capacity: i32,
    /// Display: per program group, highest boarding rank holding an offer.
    pub displayed_boarding_thresholds: BTreeMap<ProgramGroupId, i32>,
    /// Display: per program group, highest displayed call order under that threshold.
    pub displayed_call_thresholds: BTreeMap<ProgramGroupId, i32>,
}

impl BoardingGroup {
    pub fn new(id: BoardingGroupId, capacity: i32) -> CoreResult<Self> {
        if capacity < 0 {
            return Err(VerificationError::new(Reason::NegativeCapacity, Subject::Boarding(id)));
        }
        Ok(Self {
            id,
            capacity,
            displayed_boarding_thresholds: BTreeMap::new(),
            displayed_call_thresholds: BTreeMap::new(),
        })
    }

    #[inline]
    pub fn capacity(&self) -> i32 {
        self.capacity
    }

    pub fn set_capacity(&mut self, capacity: i32) -> CoreResult<()> {
        if capacity < 0 {
            return Err(VerificationError::new(Reason::NegativeCapacity, Subject::Boarding(self.id)));
        }
        self.capacity = capacity;
        Ok(())
    }
}
