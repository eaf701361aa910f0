//! Scene nodes and components

use crate::element::{RefId, TypeTag, WorldElement};
use crate::node::{Facet, FacetRef, Node, NodeRef};
use crate::value::Value;
use parking_lot::RwLock;
use std::sync::Arc;

/// Live hierarchy node
///
/// Nodes are world elements themselves, so reference slots may target them.
pub struct SceneNode {
    id: RefId,
    name: String,
    members: RwLock<Vec<Value>>,
    facets: RwLock<Vec<FacetRef>>,
    children: RwLock<Vec<Arc<SceneNode>>>,
}

impl SceneNode {
    /// Runtime type of every scene node
    pub const TYPE_NAME: &'static str = "Slot";

    /// Create a detached node
    #[must_use]
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: RefId::next(),
            name: name.into(),
            members: RwLock::new(Vec::new()),
            facets: RwLock::new(Vec::new()),
            children: RwLock::new(Vec::new()),
        })
    }

    /// Create and append a child node
    pub fn add_child(&self, name: impl Into<String>) -> Arc<SceneNode> {
        let child = Self::new(name);
        self.children.write().push(Arc::clone(&child));
        child
    }

    /// Attach a facet
    pub fn attach(&self, facet: FacetRef) {
        self.facets.write().push(facet);
    }

    /// Add a node-level member
    pub fn add_member(&self, member: Value) {
        self.members.write().push(member);
    }

    /// Node name (may be blank)
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Label used in paths: the name, or the reference id when the name is blank
    #[must_use]
    pub fn describe(&self) -> String {
        if self.name.trim().is_empty() {
            self.id.to_string()
        } else {
            self.name.clone()
        }
    }
}

impl std::fmt::Debug for SceneNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneNode")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("children", &self.children.read().len())
            .finish_non_exhaustive()
    }
}

impl Node for SceneNode {
    fn label(&self) -> String {
        self.describe()
    }

    fn members(&self) -> Vec<Value> {
        self.members.read().clone()
    }

    fn facets(&self) -> Vec<FacetRef> {
        self.facets.read().clone()
    }

    fn children(&self) -> Vec<NodeRef> {
        self.children
            .read()
            .iter()
            .map(|child| Arc::clone(child) as NodeRef)
            .collect()
    }
}

impl WorldElement for SceneNode {
    fn reference_id(&self) -> RefId {
        self.id
    }

    fn runtime_type(&self) -> TypeTag {
        TypeTag::new(Self::TYPE_NAME)
    }

    fn display_name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

/// Component attached to a scene node
pub struct Component {
    id: RefId,
    type_name: String,
    members: Vec<Value>,
}

impl Component {
    /// Create an empty component of the given type
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            id: RefId::next(),
            type_name: type_name.into(),
            members: Vec::new(),
        }
    }

    /// Append a member
    #[must_use]
    pub fn with_member(mut self, member: Value) -> Self {
        self.members.push(member);
        self
    }

    /// Finish building
    #[must_use]
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl std::fmt::Debug for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.id)
            .field("type_name", &self.type_name)
            .field("members", &self.members.len())
            .finish()
    }
}

impl Facet for Component {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn members(&self) -> Vec<Value> {
        self.members.clone()
    }
}

impl WorldElement for Component {
    fn reference_id(&self) -> RefId {
        self.id
    }

    fn runtime_type(&self) -> TypeTag {
        TypeTag::new(self.type_name.as_str())
    }
}
