//! Conversion from hierarchy nodes to the renderable tree shape.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use generational_arena::Index;
use termtree::Tree;
use tracing::{instrument, warn};

use crate::domain::arena::Forest;
use crate::domain::entities::{RenderAttributes, RenderTreeNode};
use crate::domain::node::NodeView;

/// en-US short date, e.g. `3/7/2021`.
pub const DEFAULT_DATE_FORMAT: &str = "%-m/%-d/%Y";

/// Maps forest nodes into [`RenderTreeNode`]s, formatting joining dates on the way.
#[derive(Debug, Clone)]
pub struct TreeFormatConverter {
    date_format: String,
}

impl Default for TreeFormatConverter {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl TreeFormatConverter {
    /// Create a converter; an unusable strftime pattern falls back to the default.
    pub fn new(date_format: &str) -> Self {
        let valid = !date_format.is_empty()
            && StrftimeItems::new(date_format).all(|item| !matches!(item, Item::Error));
        if !valid {
            warn!(date_format, "invalid date format, using default");
            return Self::default();
        }
        Self {
            date_format: date_format.to_string(),
        }
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Render a raw joining date. Unparseable input is shown verbatim.
    pub fn format_date(&self, raw: &str) -> String {
        let raw = raw.trim();
        let date = DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.date_naive())
            .ok()
            .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                    .map(|dt| dt.date())
                    .ok()
            });
        match date {
            Some(date) => date.format(&self.date_format).to_string(),
            None => raw.to_string(),
        }
    }

    /// Convert the subtree rooted at `idx`. Returns None for a stale index.
    pub fn to_render_tree(&self, forest: &Forest, idx: Index) -> Option<RenderTreeNode> {
        let node = forest.node(idx)?;
        let member = &node.member;
        let attributes = RenderAttributes {
            designation: member.designation.clone(),
            role: Some(member.role.clone()),
            joining_date: member.joining_date.as_deref().map(|d| self.format_date(d)),
            id: Some(member.id.clone()),
            ..Default::default()
        };
        let children: Vec<RenderTreeNode> = node
            .mentees
            .iter()
            .filter_map(|&child| self.to_render_tree(forest, child))
            .collect();

        Some(RenderTreeNode::leaf(member.display_name.clone(), Some(attributes)).with_children(children))
    }

    /// Synthetic organization root whose children are the founder subtrees.
    #[instrument(level = "debug", skip(self, forest))]
    pub fn organization_tree(&self, name: &str, forest: &Forest) -> RenderTreeNode {
        let children: Vec<RenderTreeNode> = forest
            .founders()
            .iter()
            .filter_map(|&idx| self.to_render_tree(forest, idx))
            .collect();
        let attributes = RenderAttributes {
            is_organization: Some(true),
            member_count: Some(forest.len()),
            hierarchy_count: Some(forest.founders().len()),
            ..Default::default()
        };
        RenderTreeNode::leaf(name, Some(attributes)).with_children(children)
    }

    /// Unassigned roots, each with whatever subtree still hangs below it.
    pub fn unassigned_list(&self, forest: &Forest) -> Vec<RenderTreeNode> {
        forest
            .unassigned()
            .iter()
            .filter_map(|&idx| self.to_render_tree(forest, idx))
            .collect()
    }
}

/// Text rendering of a render tree via `termtree`.
pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for RenderTreeNode {
    fn to_tree_string(&self) -> Tree<String> {
        let leaves: Vec<_> = self.children().iter().map(|c| c.to_tree_string()).collect();
        Tree::new(NodeView::new(self).label()).with_leaves(leaves)
    }
}
