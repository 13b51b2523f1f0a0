//! Hierarchy builder: reconstructs the mentor forest from a flat member list.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use generational_arena::Index;
use itertools::Itertools;
use tracing::{debug, instrument, warn};

use crate::domain::arena::{Forest, HierarchyNode, RootKind};
use crate::domain::entities::Member;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    OnPath,
    Done,
}

/// Builds a [`Forest`] in two linear passes plus a cycle sweep.
///
/// Members that lie on a mentor cycle (self-mentorship included) lose their
/// mentor edge and become unassigned roots. Members hanging below a cycle
/// stay attached to the cycle member they report to.
#[derive(Debug, Default)]
pub struct HierarchyBuilder {
    visit_state: HashMap<Index, Visit>,
}

impl HierarchyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(level = "debug", skip(self, members), fields(members = members.len()))]
    pub fn build_forest(&mut self, members: &[Member]) -> Forest {
        self.visit_state.clear();
        let mut forest = Forest::default();

        // Pass 1: one node per member
        for member in members {
            let idx = forest.arena.insert(HierarchyNode {
                member: member.clone(),
                mentor: None,
                mentees: Vec::new(),
            });
            forest.order.push(idx);
            match forest.by_id.entry(member.id.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(idx);
                }
                Entry::Occupied(_) => {
                    warn!(member = %member.id, "duplicate member id, mentees resolve to the first occurrence");
                }
            }
        }

        // Pass 2: resolve mentor references
        for &idx in &forest.order {
            let mentor_idx = forest
                .arena
                .get(idx)
                .and_then(|node| node.member.mentor())
                .and_then(|mentor_id| forest.by_id.get(mentor_id))
                .copied();

            if let Some(mentor_idx) = mentor_idx {
                if let Some(node) = forest.arena.get_mut(idx) {
                    node.mentor = Some(mentor_idx);
                }
                if let Some(mentor) = forest.arena.get_mut(mentor_idx) {
                    mentor.mentees.push(idx);
                }
            }
        }

        let cycle_members = self.break_cycles(&mut forest);
        Self::classify_roots(&mut forest, &cycle_members);

        debug!(
            founders = forest.founders.len(),
            unassigned = forest.unassigned.len(),
            cycles = forest.cycles.len(),
            "forest built"
        );
        forest
    }

    /// Walk each mentor chain once; a node met again while still on the
    /// current path closes a cycle.
    fn break_cycles(&mut self, forest: &mut Forest) -> Vec<Index> {
        let mut cycles: Vec<Vec<Index>> = Vec::new();

        for &start in &forest.order {
            if self.visit_state.contains_key(&start) {
                continue;
            }
            let mut path = Vec::new();
            let mut current = Some(start);
            while let Some(idx) = current {
                match self.visit_state.get(&idx) {
                    Some(Visit::Done) => break,
                    Some(Visit::OnPath) => {
                        if let Some(pos) = path.iter().position(|&p| p == idx) {
                            cycles.push(path[pos..].to_vec());
                        }
                        break;
                    }
                    None => {
                        self.visit_state.insert(idx, Visit::OnPath);
                        path.push(idx);
                        current = forest.arena.get(idx).and_then(|node| node.mentor);
                    }
                }
            }
            for idx in path {
                self.visit_state.insert(idx, Visit::Done);
            }
        }

        let mut cycle_members = Vec::new();
        for cycle in cycles {
            for &idx in &cycle {
                let mentor = forest.arena.get_mut(idx).and_then(|node| node.mentor.take());
                if let Some(mentor_idx) = mentor {
                    if let Some(mentor_node) = forest.arena.get_mut(mentor_idx) {
                        mentor_node.mentees.retain(|&m| m != idx);
                    }
                }
            }
            let ids: Vec<String> = cycle
                .iter()
                .filter_map(|&idx| forest.arena.get(idx))
                .map(|node| node.member.id.clone())
                .collect();
            warn!(
                members = %ids.iter().join(" -> "),
                "mentor cycle detected, members degraded to unassigned"
            );
            forest.cycles.push(ids);
            cycle_members.extend(cycle);
        }
        cycle_members
    }

    fn classify_roots(forest: &mut Forest, cycle_members: &[Index]) {
        for &idx in &forest.order {
            let Some(node) = forest.arena.get(idx) else {
                continue;
            };
            if node.mentor.is_some() {
                continue;
            }

            let kind = if cycle_members.contains(&idx) {
                RootKind::Cycle
            } else if let Some(mentor_id) = node.member.mentor() {
                RootKind::DanglingMentor(mentor_id.to_string())
            } else if node.mentees.is_empty() {
                RootKind::Standalone
            } else {
                RootKind::Founder
            };

            if kind.is_founder() {
                forest.founders.push(idx);
            } else {
                forest.unassigned.push(idx);
            }
            forest.all_roots.push(idx);
            forest.root_kinds.insert(idx, kind);
        }
    }
}

/// Build the forest for a member list with a fresh builder.
pub fn build_forest(members: &[Member]) -> Forest {
    HierarchyBuilder::new().build_forest(members)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(forest: &Forest, indices: &[Index]) -> Vec<String> {
        indices
            .iter()
            .filter_map(|&idx| forest.node(idx))
            .map(|node| node.member.id.clone())
            .collect()
    }

    #[test]
    fn test_self_mentor_becomes_unassigned_cycle() {
        let members = vec![Member::new("a", "Ada", "Lead").with_mentor("a")];
        let forest = build_forest(&members);

        assert!(forest.founders().is_empty());
        assert_eq!(ids(&forest, forest.unassigned()), vec!["a"]);
        assert_eq!(forest.cycles(), &[vec!["a".to_string()]]);
        let idx = forest.find("a").unwrap();
        assert!(forest.node(idx).unwrap().mentees.is_empty());
        assert_eq!(forest.root_kind(idx), Some(&RootKind::Cycle));
    }

    #[test]
    fn test_builder_is_reusable() {
        let mut builder = HierarchyBuilder::new();
        let first = builder.build_forest(&[
            Member::new("a", "Ada", "Lead").with_mentor("b"),
            Member::new("b", "Bob", "Lead").with_mentor("a"),
        ]);
        let second = builder.build_forest(&[
            Member::new("a", "Ada", "Lead"),
            Member::new("b", "Bob", "Dev").with_mentor("a"),
        ]);

        assert_eq!(first.cycles().len(), 1);
        assert!(second.cycles().is_empty());
        assert_eq!(ids(&second, second.founders()), vec!["a"]);
    }

    #[test]
    fn test_duplicate_ids_keep_one_node_each() {
        let members = vec![
            Member::new("a", "Ada", "Lead"),
            Member::new("a", "Ada again", "Lead"),
            Member::new("b", "Bob", "Dev").with_mentor("a"),
        ];
        let forest = build_forest(&members);

        assert_eq!(forest.len(), 3);
        let first = forest.founders()[0];
        assert_eq!(forest.node(first).unwrap().member.display_name, "Ada");
        assert_eq!(forest.unassigned().len(), 1);
    }
}
