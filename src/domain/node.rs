//! Presentation of a single render tree node and its selection behavior.

use crate::domain::entities::RenderTreeNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Space,
    Other(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    Click,
    Key(Key),
}

impl Interaction {
    fn activates(self) -> bool {
        matches!(
            self,
            Interaction::Click | Interaction::Key(Key::Enter) | Interaction::Key(Key::Space)
        )
    }
}

/// Stateless view over one node.
#[derive(Debug, Clone, Copy)]
pub struct NodeView<'a> {
    node: &'a RenderTreeNode,
}

impl<'a> NodeView<'a> {
    pub fn new(node: &'a RenderTreeNode) -> Self {
        Self { node }
    }

    /// Organization roots and team groups are not members and cannot be selected.
    pub fn is_selectable(&self) -> bool {
        !self.node.is_organization() && !self.node.is_group() && self.node.member_id().is_some()
    }

    /// Secondary lines shown under the name.
    pub fn details(&self) -> Vec<String> {
        let Some(attrs) = self.node.attributes.as_ref() else {
            return Vec::new();
        };
        let mut lines = Vec::new();
        if attrs.is_organization == Some(true) {
            if let Some(count) = attrs.member_count {
                lines.push(format!("{count} members"));
            }
            if let Some(count) = attrs.hierarchy_count {
                lines.push(format!("{count} hierarchies"));
            }
            return lines;
        }
        if let Some(designation) = &attrs.designation {
            lines.push(designation.clone());
        }
        if let Some(role) = &attrs.role {
            lines.push(role.clone());
        }
        if let Some(date) = &attrs.joining_date {
            lines.push(format!("joined {date}"));
        }
        if let Some(count) = attrs.member_count.filter(|_| attrs.is_group == Some(true)) {
            lines.push(format!("{count} members"));
        }
        if let Some(hidden) = attrs.hidden_descendants {
            lines.push(format!("+{hidden} more"));
        }
        lines
    }

    /// Single-line label: name followed by details in brackets.
    pub fn label(&self) -> String {
        let details = self.details();
        if details.is_empty() {
            self.node.name.clone()
        } else {
            format!("{} [{}]", self.node.name, details.join(", "))
        }
    }

    /// Member id reported by an activating interaction, if any.
    pub fn interact(&self, interaction: Interaction) -> Option<&'a str> {
        if interaction.activates() && self.is_selectable() {
            self.node.member_id()
        } else {
            None
        }
    }
}

/// Report the node's member id to `on_selected` when the interaction selects it.
pub fn handle_interaction(
    node: &RenderTreeNode,
    interaction: Interaction,
    mut on_selected: impl FnMut(&str),
) -> bool {
    match NodeView::new(node).interact(interaction) {
        Some(id) => {
            on_selected(id);
            true
        }
        None => false,
    }
}
