//! Detached hierarchy snapshots
//!
//! A [`Blueprint`] mirrors the shape of a live hierarchy: labeled nodes
//! carrying ordered member lists and ordered children. It is scanned exactly
//! like a live node, without facets.

use crate::node::{Node, NodeRef};
use crate::value::Value;
use std::sync::Arc;

/// Read-only snapshot node
#[derive(Clone)]
pub struct Blueprint {
    label: String,
    members: Vec<Value>,
    children: Vec<Arc<Blueprint>>,
}

impl Blueprint {
    /// Create a snapshot node
    #[must_use]
    pub fn new(
        label: impl Into<String>,
        members: impl IntoIterator<Item = Value>,
        children: impl IntoIterator<Item = Blueprint>,
    ) -> Self {
        Self {
            label: label.into(),
            members: members.into_iter().collect(),
            children: children.into_iter().map(Arc::new).collect(),
        }
    }

    /// Create a leaf snapshot node
    #[must_use]
    pub fn leaf(label: impl Into<String>, members: impl IntoIterator<Item = Value>) -> Self {
        Self::new(label, members, std::iter::empty())
    }

    /// Append a member
    #[must_use]
    pub fn with_member(mut self, member: Value) -> Self {
        self.members.push(member);
        self
    }

    /// Append a child
    #[must_use]
    pub fn with_child(mut self, child: Blueprint) -> Self {
        self.children.push(Arc::new(child));
        self
    }

    /// Node label
    #[inline]
    #[must_use]
    pub fn label_str(&self) -> &str {
        &self.label
    }

    /// Members in order
    #[inline]
    #[must_use]
    pub fn member_values(&self) -> &[Value] {
        &self.members
    }

    /// Children in order
    #[inline]
    #[must_use]
    pub fn child_nodes(&self) -> &[Arc<Blueprint>] {
        &self.children
    }
}

impl std::fmt::Debug for Blueprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blueprint")
            .field("label", &self.label)
            .field("members", &self.members.len())
            .field("children", &self.children)
            .finish()
    }
}

impl Node for Blueprint {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn members(&self) -> Vec<Value> {
        self.members.clone()
    }

    fn children(&self) -> Vec<NodeRef> {
        self.children
            .iter()
            .map(|child| Arc::clone(child) as NodeRef)
            .collect()
    }
}
