//! Traversal paths
//!
//! Provides [`TraversalPath`], the diagnostic location attached to every match.

use std::fmt::{self, Display, Formatter};

/// Human-readable location in the graph
///
/// Built incrementally and never mutated in place; every step returns a new
/// path.
///
/// # Format
/// - child node: `Root/Child`
/// - facet: `Root::Renderer`
/// - member: `Root::Renderer.Material`
/// - named sub-view: `Root.Dict.BoxedEntries`
/// - container element: `Root.Items[3]`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TraversalPath(String);

impl TraversalPath {
    /// Path of a traversal root
    #[inline]
    #[must_use]
    pub fn from_root(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Step into a facet attached to the current node
    #[inline]
    #[must_use]
    pub fn facet(&self, type_name: &str) -> Self {
        Self(format!("{}::{type_name}", self.0))
    }

    /// Step into a child node
    #[inline]
    #[must_use]
    pub fn child(&self, label: &str) -> Self {
        Self(format!("{}/{label}", self.0))
    }

    /// Step into a member
    #[inline]
    #[must_use]
    pub fn member(&self, name: &str) -> Self {
        Self(format!("{}.{name}", self.0))
    }

    /// Step into a named sub-view of a container
    #[inline]
    #[must_use]
    pub fn property(&self, name: &str) -> Self {
        Self(format!("{}.{name}", self.0))
    }

    /// Step into a container element
    #[inline]
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        Self(format!("{}[{index}]", self.0))
    }

    /// Path text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the path text
    #[inline]
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for TraversalPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TraversalPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<TraversalPath> for String {
    fn from(path: TraversalPath) -> Self {
        path.0
    }
}
