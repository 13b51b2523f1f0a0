//! Layout optimizer: size-reduction passes applied to a render tree before drawing.
//!
//! The optimizer always works on a deep copy, so the caller's tree is never
//! touched. Strategies run top-down: each node is transformed first, then its
//! (possibly restructured) children are visited one level deeper.

use std::fmt;

use tracing::{debug, instrument};

use crate::domain::entities::{RenderAttributes, RenderTreeNode};

/// A structure-aware transform of one node, given its depth below the root.
pub trait LayoutStrategy: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn transform(&self, node: RenderTreeNode, depth: usize) -> RenderTreeNode;
}

/// Leaves every node untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThrough;

impl LayoutStrategy for PassThrough {
    fn name(&self) -> &'static str {
        "pass-through"
    }

    fn transform(&self, node: RenderTreeNode, _depth: usize) -> RenderTreeNode {
        node
    }
}

/// Splits sibling sets larger than `max_siblings` into synthetic "Team N" nodes.
///
/// A sibling set that already contains a group is left alone, which keeps the
/// pass idempotent.
#[derive(Debug, Clone, Copy)]
pub struct SiblingGrouping {
    max_siblings: usize,
}

impl SiblingGrouping {
    pub fn new(max_siblings: usize) -> Self {
        Self {
            max_siblings: max_siblings.max(1),
        }
    }
}

impl LayoutStrategy for SiblingGrouping {
    fn name(&self) -> &'static str {
        "sibling-grouping"
    }

    fn transform(&self, mut node: RenderTreeNode, _depth: usize) -> RenderTreeNode {
        let Some(children) = node.children.take() else {
            return node;
        };
        if children.len() <= self.max_siblings || children.iter().any(|c| c.is_group()) {
            node.children = Some(children);
            return node;
        }

        let mut groups = Vec::new();
        let mut remaining = children.into_iter().peekable();
        while remaining.peek().is_some() {
            let team: Vec<RenderTreeNode> = remaining.by_ref().take(self.max_siblings).collect();
            let attributes = RenderAttributes {
                is_group: Some(true),
                member_count: Some(team.len()),
                ..Default::default()
            };
            let name = format!("Team {}", groups.len() + 1);
            groups.push(RenderTreeNode::leaf(name, Some(attributes)).with_children(team));
        }
        node.children = Some(groups);
        node
    }
}

/// Cuts the tree below `max_depth`, recording how many members were hidden.
///
/// The cut node keeps `hiddenDescendants` so a renderer can offer to expand it.
/// The root itself is never cut.
#[derive(Debug, Clone, Copy)]
pub struct DepthLimit {
    max_depth: usize,
}

impl DepthLimit {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth: max_depth.max(1),
        }
    }
}

impl LayoutStrategy for DepthLimit {
    fn name(&self) -> &'static str {
        "depth-limit"
    }

    fn transform(&self, mut node: RenderTreeNode, depth: usize) -> RenderTreeNode {
        if depth < self.max_depth || node.is_leaf() {
            return node;
        }
        let hidden = node.member_descendants();
        node.children = None;
        node.attributes
            .get_or_insert_with(RenderAttributes::default)
            .hidden_descendants = Some(hidden);
        node
    }
}

/// Ordered chain of layout strategies.
#[derive(Debug)]
pub struct LayoutOptimizer {
    strategies: Vec<Box<dyn LayoutStrategy>>,
}

impl Default for LayoutOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutOptimizer {
    /// Optimizer with the pass-through strategy only.
    pub fn new() -> Self {
        Self {
            strategies: vec![Box::new(PassThrough)],
        }
    }

    /// Build from optional grouping and depth limits; absent limits add no pass.
    pub fn from_limits(max_siblings: Option<usize>, max_depth: Option<usize>) -> Self {
        let mut optimizer = Self::new();
        if let Some(max) = max_siblings {
            optimizer = optimizer.with_strategy(SiblingGrouping::new(max));
        }
        if let Some(depth) = max_depth {
            optimizer = optimizer.with_strategy(DepthLimit::new(depth));
        }
        optimizer
    }

    pub fn with_strategy(mut self, strategy: impl LayoutStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Deep-copy `tree` and run every strategy over every node.
    #[instrument(level = "debug", skip(self, tree), fields(strategies = ?self.strategy_names()))]
    pub fn optimize(&self, tree: &RenderTreeNode) -> RenderTreeNode {
        let optimized = self.transform_node(tree.clone(), 0);
        debug!(
            before = tree.node_count(),
            after = optimized.node_count(),
            "render tree optimized"
        );
        optimized
    }

    fn transform_node(&self, node: RenderTreeNode, depth: usize) -> RenderTreeNode {
        let mut node = self
            .strategies
            .iter()
            .fold(node, |node, strategy| strategy.transform(node, depth));
        if let Some(children) = node.children.take() {
            let children = children
                .into_iter()
                .map(|child| self.transform_node(child, depth + 1))
                .collect();
            node = node.with_children(children);
        }
        node
    }
}

/// Optimize with the default pass-through pipeline.
pub fn optimize(tree: &RenderTreeNode) -> RenderTreeNode {
    LayoutOptimizer::new().optimize(tree)
}
