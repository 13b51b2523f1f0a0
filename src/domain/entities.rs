//! Domain entities: core data structures

use serde::{Deserialize, Serialize};

/// An organization member as delivered by the member store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    /// Id of this member's mentor. May be absent or reference an unknown member.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joining_date: Option<String>,
    #[serde(rename = "displayName")]
    pub display_name: String,
}

impl Member {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            mentor_id: None,
            designation: None,
            role: role.into(),
            joining_date: None,
            display_name: display_name.into(),
        }
    }

    pub fn with_mentor(mut self, mentor_id: impl Into<String>) -> Self {
        self.mentor_id = Some(mentor_id.into());
        self
    }

    pub fn with_designation(mut self, designation: impl Into<String>) -> Self {
        self.designation = Some(designation.into());
        self
    }

    pub fn with_joining_date(mut self, joining_date: impl Into<String>) -> Self {
        self.joining_date = Some(joining_date.into());
        self
    }

    /// Effective mentor reference. Blank ids count as "no mentor";
    /// any other id is returned verbatim.
    pub fn mentor(&self) -> Option<&str> {
        self.mentor_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
    }
}

/// Optional attributes carried by a render tree node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, rename = "joining_date", skip_serializing_if = "Option::is_none")]
    pub joining_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_organization: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hierarchy_count: Option<usize>,
    /// Synthetic team node inserted by sibling grouping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_group: Option<bool>,
    /// Members hidden below a depth-limited node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden_descendants: Option<usize>,
}

/// Library-agnostic `name/attributes/children` tree consumed by renderers.
///
/// `children` is `None` for leaves, never an empty vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderTreeNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<RenderAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<RenderTreeNode>>,
}

impl RenderTreeNode {
    pub fn leaf(name: impl Into<String>, attributes: Option<RenderAttributes>) -> Self {
        Self {
            name: name.into(),
            attributes,
            children: None,
        }
    }

    /// Attach children, keeping the leaf contract (empty input stays `None`).
    pub fn with_children(mut self, children: Vec<RenderTreeNode>) -> Self {
        self.children = if children.is_empty() {
            None
        } else {
            Some(children)
        };
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn children(&self) -> &[RenderTreeNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn member_id(&self) -> Option<&str> {
        self.attributes.as_ref().and_then(|a| a.id.as_deref())
    }

    pub fn is_organization(&self) -> bool {
        self.attributes
            .as_ref()
            .and_then(|a| a.is_organization)
            .unwrap_or(false)
    }

    pub fn is_group(&self) -> bool {
        self.attributes
            .as_ref()
            .and_then(|a| a.is_group)
            .unwrap_or(false)
    }

    /// Total number of nodes in this subtree, including self.
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Number of levels in this subtree (a leaf has depth 1).
    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(|c| c.depth())
            .max()
            .unwrap_or(0)
    }

    /// Member nodes below this one, skipping synthetic group nodes.
    pub fn member_descendants(&self) -> usize {
        self.children()
            .iter()
            .map(|c| usize::from(!c.is_group()) + c.member_descendants())
            .sum()
    }
}

/// Result of a mentor mutation against the member store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl MutationResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}
