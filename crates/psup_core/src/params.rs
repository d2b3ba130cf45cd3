//! crates/psup_core/src/params.rs
//! Campaign calendar parameters for one daily run.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Day counters of the admissions campaign.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CampaignParams {
    /// Current campaign day (1 = first day).
    pub day: i32,
    /// Day on which programs stop reserving boarding seats.
    pub boarding_reservation_end_day: i32,
    /// Day from which ordered-wish forced resignations (GDD) apply.
    pub gdd_start_day: i32,
}

impl CampaignParams {
    pub const fn new(day: i32, boarding_reservation_end_day: i32, gdd_start_day: i32) -> Self {
        Self { day, boarding_reservation_end_day, gdd_start_day }
    }

    #[inline]
    pub fn gdd_active(&self) -> bool {
        self.day >= self.gdd_start_day
    }

    #[inline]
    pub fn boarding_reservation_over(&self) -> bool {
        self.day >= self.boarding_reservation_end_day
    }
}

impl Default for CampaignParams {
    fn default() -> Self {
        Self::new(0, 0, 0)
    }
}
