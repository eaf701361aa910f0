//! Scan configuration

use refscan_graph::NodeRef;
use std::fmt;

/// Options applied to every scan run by a [`Scanner`](crate::Scanner)
#[derive(Clone)]
pub struct ScanOptions {
    excluded: Option<NodeRef>,
    match_by_reference_id: bool,
}

impl ScanOptions {
    /// Create default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip a node and its whole subtree
    #[must_use]
    pub fn exclude(mut self, node: NodeRef) -> Self {
        self.excluded = Some(node);
        self
    }

    /// Treat slots whose target carries the source's reference id as matching,
    /// even when the target is a different handle (default: on)
    #[inline]
    #[must_use]
    pub fn match_by_reference_id(mut self, enabled: bool) -> Self {
        self.match_by_reference_id = enabled;
        self
    }

    /// Excluded subtree root
    #[inline]
    #[must_use]
    pub fn excluded(&self) -> Option<&NodeRef> {
        self.excluded.as_ref()
    }

    /// Whether reference-id equality counts as a source match
    #[inline]
    #[must_use]
    pub fn matches_by_reference_id(&self) -> bool {
        self.match_by_reference_id
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            excluded: None,
            match_by_reference_id: true,
        }
    }
}

impl fmt::Debug for ScanOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanOptions")
            .field("excluded", &self.excluded.as_ref().map(|node| node.label()))
            .field("match_by_reference_id", &self.match_by_reference_id)
            .finish()
    }
}
