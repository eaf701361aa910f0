//! Graph vertices and their facets

use crate::value::Value;
use std::sync::Arc;

/// Shared handle to a node
pub type NodeRef = Arc<dyn Node>;

/// Shared handle to a facet
pub type FacetRef = Arc<dyn Facet>;

/// Vertex of the host graph
///
/// Accessors return owned handles so hosts may snapshot their children and
/// facets under their own locks. Order is significant: it determines the
/// order in which references are discovered.
pub trait Node: Send + Sync {
    /// Path label of this node
    fn label(&self) -> String;

    /// Members stored on the node itself
    fn members(&self) -> Vec<Value> {
        Vec::new()
    }

    /// Attached facets, in declaration order
    fn facets(&self) -> Vec<FacetRef> {
        Vec::new()
    }

    /// Child nodes, in declaration order
    fn children(&self) -> Vec<NodeRef>;
}

/// Component-like unit attached to a node
pub trait Facet: Send + Sync {
    /// Type name, used as the facet's path segment
    fn type_name(&self) -> &str;

    /// Members of the facet, in declaration order
    fn members(&self) -> Vec<Value>;
}

/// Object identity of two nodes
#[inline]
#[must_use]
pub fn same_node(a: &dyn Node, b: &dyn Node) -> bool {
    std::ptr::eq(a as *const _ as *const (), b as *const _ as *const ())
}
