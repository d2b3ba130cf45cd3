//! crates/psup_core/src/ids.rs
//! Composite identifiers for candidates, wishes, program groups and boarding groups.
//! All ids are plain integers coming from the admissions database; ordering is
//! derived field by field so every collection keyed by them iterates deterministically.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Candidate number.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CandidateId(pub i32);

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

/// Program group: ranking group, institution and program numbers.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProgramGroupId {
    pub ranking_group: i32,
    pub institution: i32,
    pub program: i32,
}

impl ProgramGroupId {
    pub const fn new(ranking_group: i32, institution: i32, program: i32) -> Self {
        Self { ranking_group, institution, program }
    }
}

impl fmt::Display for ProgramGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G({},{},{})", self.ranking_group, self.institution, self.program)
    }
}

/// Boarding group. `program == 0` marks a boarding resource shared by several programs.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoardingGroupId {
    pub boarding: i32,
    pub program: i32,
}

impl BoardingGroupId {
    pub const fn new(boarding: i32, program: i32) -> Self {
        Self { boarding, program }
    }

    /// Shared across programs of the institution.
    #[inline]
    pub fn is_shared(&self) -> bool {
        self.program == 0
    }
}

impl fmt::Display for BoardingGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "I({},{})", self.boarding, self.program)
    }
}

/// A wish is unique per candidate, program and boarding request flag.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WishId {
    pub candidate: CandidateId,
    pub program: i32,
    pub boarding: bool,
}

impl WishId {
    pub const fn new(candidate: i32, program: i32, boarding: bool) -> Self {
        Self { candidate: CandidateId(candidate), program, boarding }
    }

    /// The sibling wish of the same candidate on the same program with the other boarding flag.
    #[inline]
    pub fn sibling(&self) -> Self {
        Self { boarding: !self.boarding, ..*self }
    }
}

impl fmt::Display for WishId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "V({},{},{})",
            self.candidate.0,
            self.program,
            if self.boarding { 1 } else { 0 }
        )
    }
}

/// (candidate, boarding group) pair used to track who already holds a boarding seat.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct BoardingPlacement {
    pub candidate: CandidateId,
    pub boarding: BoardingGroupId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wish_ids_order_by_candidate_then_program_then_flag() {
        let a = WishId::new(1, 10, false);
        let b = WishId::new(1, 10, true);
        let c = WishId::new(2, 1, false);
        assert!(a < b && b < c);
        assert_eq!(a.sibling(), b);
    }

    #[test]
    fn display_shapes() {
        assert_eq!(WishId::new(3, 7, true).to_string(), "V(3,7,1)");
        assert_eq!(ProgramGroupId::new(1, 2, 3).to_string(), "G(1,2,3)");
        assert!(BoardingGroupId::new(4, 0).is_shared());
    }
}
