//! crates/psup_core/src/status.rs
//! Wish statuses and the classifier predicates the rest of the engine relies on.
//! Components never test raw variants for offer/awaiting/resignation semantics;
//! they call the predicates below, which encode the reference boolean tables.

use core::fmt;

use crate::errors::{Reason, Subject, VerificationError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum WishStatus {
    /// Waitlisted, no offer yet.
    Awaiting,
    /// Offer issued by today's run.
    OfferedToday,
    /// Awaiting wish resigned by the auto-responder.
    ResponderResignedAwaiting,
    /// Awaiting wish resigned by the ordered-wish rule (GDD).
    GddResignedAwaiting,
    /// Offer issued today and accepted by the auto-responder.
    AutoAccepted,
    /// Offer declined by the auto-responder.
    AutoDeclinedOffer,
    /// Offered on a previous day, candidate has not answered.
    OfferedPreviouslyAwaitingReply,
    /// Offered on a previous day and accepted.
    OfferedPreviouslyAccepted,
    /// Offered on a previous day and declined.
    OfferedPreviouslyDeclined,
    /// Refused or resigned by the candidate (simulation only).
    RefusedOrResigned,
    /// Not yet ranked by the program (simulation only).
    NotRanked,
}

/// Which mechanism produced an automatic resignation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AutoResignationKind {
    Gdd,
    Responder,
}

impl WishStatus {
    pub const ALL: [WishStatus; 11] = [
        WishStatus::Awaiting,
        WishStatus::OfferedToday,
        WishStatus::ResponderResignedAwaiting,
        WishStatus::GddResignedAwaiting,
        WishStatus::AutoAccepted,
        WishStatus::AutoDeclinedOffer,
        WishStatus::OfferedPreviouslyAwaitingReply,
        WishStatus::OfferedPreviouslyAccepted,
        WishStatus::OfferedPreviouslyDeclined,
        WishStatus::RefusedOrResigned,
        WishStatus::NotRanked,
    ];

    #[inline]
    pub fn is_gdd_resignation(self) -> bool {
        self == WishStatus::GddResignedAwaiting
    }

    #[inline]
    pub fn is_responder_resignation(self) -> bool {
        matches!(self, WishStatus::ResponderResignedAwaiting | WishStatus::AutoDeclinedOffer)
    }

    #[inline]
    pub fn is_auto_resignation(self) -> bool {
        self.is_responder_resignation() || self.is_gdd_resignation()
    }

    #[inline]
    pub fn is_responder_awaiting_resignation(self) -> bool {
        self == WishStatus::ResponderResignedAwaiting
    }

    #[inline]
    pub fn is_responder_offer_resignation(self) -> bool {
        self == WishStatus::AutoDeclinedOffer
    }

    #[inline]
    pub fn is_auto_acceptance(self) -> bool {
        self == WishStatus::AutoAccepted
    }

    /// Offer issued by today's run (accepted automatically or not).
    #[inline]
    pub fn is_offer_of_the_day(self) -> bool {
        matches!(self, WishStatus::AutoAccepted | WishStatus::OfferedToday)
    }

    /// Active offer: today's or a previous day's one not declined.
    #[inline]
    pub fn is_offer(self) -> bool {
        matches!(
            self,
            WishStatus::AutoAccepted
                | WishStatus::OfferedToday
                | WishStatus::OfferedPreviouslyAccepted
                | WishStatus::OfferedPreviouslyAwaitingReply
        )
    }

    #[inline]
    pub fn is_awaiting(self) -> bool {
        self == WishStatus::Awaiting
    }

    /// Offered on a previous day, whatever the answer.
    #[inline]
    pub fn was_offered_previously(self) -> bool {
        matches!(
            self,
            WishStatus::OfferedPreviouslyAccepted
                | WishStatus::OfferedPreviouslyAwaitingReply
                | WishStatus::OfferedPreviouslyDeclined
        )
    }

    /// Offered on a previous day and still active.
    #[inline]
    pub fn is_previous_offer(self) -> bool {
        matches!(
            self,
            WishStatus::OfferedPreviouslyAccepted | WishStatus::OfferedPreviouslyAwaitingReply
        )
    }

    pub fn auto_resignation_kind(self) -> Result<AutoResignationKind, VerificationError> {
        if !self.is_auto_resignation() {
            return Err(VerificationError::with_detail(
                Reason::NotAnAutoResignation,
                Subject::None,
                self.name(),
            ));
        }
        Ok(if self.is_gdd_resignation() {
            AutoResignationKind::Gdd
        } else {
            AutoResignationKind::Responder
        })
    }

    /// Stable wire name.
    pub const fn name(self) -> &'static str {
        match self {
            WishStatus::Awaiting => "AWAITING",
            WishStatus::OfferedToday => "OFFERED_TODAY",
            WishStatus::ResponderResignedAwaiting => "RESPONDER_RESIGNED_AWAITING",
            WishStatus::GddResignedAwaiting => "GDD_RESIGNED_AWAITING",
            WishStatus::AutoAccepted => "AUTO_ACCEPTED",
            WishStatus::AutoDeclinedOffer => "AUTO_DECLINED_OFFER",
            WishStatus::OfferedPreviouslyAwaitingReply => "OFFERED_PREVIOUSLY_AWAITING_REPLY",
            WishStatus::OfferedPreviouslyAccepted => "OFFERED_PREVIOUSLY_ACCEPTED",
            WishStatus::OfferedPreviouslyDeclined => "OFFERED_PREVIOUSLY_DECLINED",
            WishStatus::RefusedOrResigned => "REFUSED_OR_RESIGNED",
            WishStatus::NotRanked => "NOT_RANKED",
        }
    }
}

impl fmt::Display for WishStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use WishStatus::*;

    #[test]
    fn offer_tables() {
        let offers: Vec<_> = WishStatus::ALL.iter().copied().filter(|s| s.is_offer()).collect();
        assert_eq!(
            offers,
            vec![OfferedToday, AutoAccepted, OfferedPreviouslyAwaitingReply, OfferedPreviouslyAccepted]
        );
        let today: Vec<_> = WishStatus::ALL.iter().copied().filter(|s| s.is_offer_of_the_day()).collect();
        assert_eq!(today, vec![OfferedToday, AutoAccepted]);
        assert!(OfferedPreviouslyDeclined.was_offered_previously());
        assert!(!OfferedPreviouslyDeclined.is_previous_offer());
        assert!(!OfferedPreviouslyDeclined.is_offer());
    }

    #[test]
    fn resignation_tables() {
        let auto: Vec<_> = WishStatus::ALL.iter().copied().filter(|s| s.is_auto_resignation()).collect();
        assert_eq!(auto, vec![ResponderResignedAwaiting, GddResignedAwaiting, AutoDeclinedOffer]);
        assert!(!AutoAccepted.is_auto_resignation());
        assert!(RefusedOrResigned.auto_resignation_kind().is_err());
        assert_eq!(GddResignedAwaiting.auto_resignation_kind(), Ok(AutoResignationKind::Gdd));
        assert_eq!(AutoDeclinedOffer.auto_resignation_kind(), Ok(AutoResignationKind::Responder));
    }

    #[test]
    fn not_an_auto_resignation_carries_code() {
        let err = Awaiting.auto_resignation_kind().unwrap_err();
        assert_eq!(err.reason, Reason::NotAnAutoResignation);
        assert_eq!(err.detail, "AWAITING");
    }
}
