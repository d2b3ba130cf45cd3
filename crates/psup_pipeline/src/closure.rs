//! crates/psup_pipeline/src/closure.rs
//! Dependency closure over the bipartite graph linking program groups to the
//! boarding groups their ranked boarding wishes point to.
//!
//! The adjacency index is built once per verification; the closure is a plain
//! worklist walk over it.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use psup_core::{BoardingGroupId, CoreResult, ProgramGroupId, Reason, Subject, VerificationError, Wish};

/// Program group <-> boarding group edges induced by wishes.
#[derive(Clone, Debug, Default)]
pub struct DependencyGraph {
    boardings_of_group: BTreeMap<ProgramGroupId, BTreeSet<BoardingGroupId>>,
    groups_of_boarding: BTreeMap<BoardingGroupId, BTreeSet<ProgramGroupId>>,
}

impl DependencyGraph {
    /// Fails when a boarding wish references a program group outside `groups`.
    pub fn build<'a>(
        groups: impl IntoIterator<Item = &'a ProgramGroupId>,
        wishes: &[Wish],
    ) -> CoreResult<Self> {
        let known: BTreeSet<ProgramGroupId> = groups.into_iter().copied().collect();
        let mut graph = Self::default();
        for w in wishes {
            let Some(b) = w.boarding else { continue };
            if !known.contains(&w.group) {
                return Err(VerificationError::with_detail(
                    Reason::UnknownGroup,
                    Subject::Wish(w.id),
                    format!("no program group {} for boarding group {b}", w.group),
                ));
            }
            graph.boardings_of_group.entry(w.group).or_default().insert(b);
            graph.groups_of_boarding.entry(b).or_default().insert(w.group);
        }
        Ok(graph)
    }

    pub fn groups_of_boarding(&self, id: BoardingGroupId) -> impl Iterator<Item = ProgramGroupId> + '_ {
        self.groups_of_boarding.get(&id).into_iter().flatten().copied()
    }

    /// Every program group reachable from `seeds` through shared boarding groups, seeds included.
    pub fn closure(&self, seeds: &BTreeSet<ProgramGroupId>) -> BTreeSet<ProgramGroupId> {
        let mut reached: BTreeSet<ProgramGroupId> = seeds.clone();
        let mut visited_boardings: BTreeSet<BoardingGroupId> = BTreeSet::new();
        let mut queue: VecDeque<ProgramGroupId> = seeds.iter().copied().collect();
        while let Some(g) = queue.pop_front() {
            for &b in self.boardings_of_group.get(&g).into_iter().flatten() {
                if !visited_boardings.insert(b) {
                    continue;
                }
                for next in self.groups_of_boarding(b) {
                    if reached.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }
        reached
    }
}
