//! Arena-backed storage for the mentor forest.

use std::collections::HashMap;
use std::fmt;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::entities::Member;

/// One node per member, augmented with its direct reports.
#[derive(Debug, Clone)]
pub struct HierarchyNode {
    pub member: Member,
    /// Index of the resolved mentor node, None for roots
    pub mentor: Option<Index>,
    /// Direct reports, in input order
    pub mentees: Vec<Index>,
}

impl fmt::Display for HierarchyNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.member.display_name, self.member.id)
    }
}

/// Why a root ended up where it did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootKind {
    /// No mentor and at least one mentee.
    Founder,
    /// No mentor and no mentees.
    Standalone,
    /// Mentor reference does not resolve to any member.
    DanglingMentor(String),
    /// Member sat on a mentor cycle; its mentor edge was removed.
    Cycle,
}

impl RootKind {
    pub fn is_founder(&self) -> bool {
        matches!(self, RootKind::Founder)
    }
}

/// The reconstructed forest plus its classified root sets.
///
/// Every member owns exactly one node. A node is attached to at most one
/// mentor, so founder subtrees and unassigned subtrees partition the members.
#[derive(Debug, Default)]
pub struct Forest {
    pub(crate) arena: Arena<HierarchyNode>,
    pub(crate) order: Vec<Index>,
    pub(crate) by_id: HashMap<String, Index>,
    pub(crate) founders: Vec<Index>,
    pub(crate) unassigned: Vec<Index>,
    pub(crate) all_roots: Vec<Index>,
    pub(crate) root_kinds: HashMap<Index, RootKind>,
    pub(crate) cycles: Vec<Vec<String>>,
}

impl Forest {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn node(&self, idx: Index) -> Option<&HierarchyNode> {
        self.arena.get(idx)
    }

    pub fn find(&self, member_id: &str) -> Option<Index> {
        self.by_id.get(member_id).copied()
    }

    pub fn founders(&self) -> &[Index] {
        &self.founders
    }

    pub fn unassigned(&self) -> &[Index] {
        &self.unassigned
    }

    /// Founders and unassigned roots, in input order.
    pub fn all_roots(&self) -> &[Index] {
        &self.all_roots
    }

    pub fn root_kind(&self, idx: Index) -> Option<&RootKind> {
        self.root_kinds.get(&idx)
    }

    /// Member ids of every mentor cycle that was broken during construction.
    pub fn cycles(&self) -> &[Vec<String>] {
        &self.cycles
    }

    /// All nodes in input order.
    pub fn iter(&self) -> impl Iterator<Item = (Index, &HierarchyNode)> + '_ {
        self.order
            .iter()
            .filter_map(move |&idx| self.arena.get(idx).map(|node| (idx, node)))
    }

    pub fn mentees(&self, idx: Index) -> impl Iterator<Item = (Index, &HierarchyNode)> + '_ {
        self.arena
            .get(idx)
            .map(|node| node.mentees.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter_map(move |&child| self.arena.get(child).map(|node| (child, node)))
    }

    /// Pre-order walk of the subtree rooted at `idx`.
    pub fn iter_subtree(&self, idx: Index) -> SubtreeIterator<'_> {
        SubtreeIterator::new(self, idx)
    }

    /// Member ids below `idx`, excluding `idx` itself.
    pub fn descendants(&self, idx: Index) -> Vec<String> {
        self.iter_subtree(idx)
            .skip(1)
            .map(|(_, node)| node.member.id.clone())
            .collect()
    }

    /// Number of levels in the subtree rooted at `idx` (a leaf has depth 1).
    #[instrument(level = "trace", skip(self))]
    pub fn depth(&self, idx: Index) -> usize {
        if let Some(node) = self.arena.get(idx) {
            1 + node
                .mentees
                .iter()
                .map(|&child| self.depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Member ids from `member_id` up to its root, starting with the member itself.
    pub fn path_to_root(&self, member_id: &str) -> Vec<String> {
        let mut path = Vec::new();
        let mut current = self.find(member_id);
        while let Some(idx) = current {
            match self.arena.get(idx) {
                Some(node) => {
                    path.push(node.member.id.clone());
                    current = node.mentor;
                }
                None => break,
            }
        }
        path
    }
}

pub struct SubtreeIterator<'a> {
    forest: &'a Forest,
    stack: Vec<Index>,
}

impl<'a> SubtreeIterator<'a> {
    fn new(forest: &'a Forest, root: Index) -> Self {
        Self {
            forest,
            stack: vec![root],
        }
    }
}

impl<'a> Iterator for SubtreeIterator<'a> {
    type Item = (Index, &'a HierarchyNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.forest.arena.get(current) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.mentees.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current, node));
            }
        }
        None
    }
}
