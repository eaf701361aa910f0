//! Scan results
//!
//! [`ScanResult`] is the only thing a scan hands back. It is immutable; the
//! edit and presentation layers read it and never see scan internals.

use refscan_graph::{ElementRef, Identity, SlotRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference slot found pointing at the source
#[derive(Clone)]
pub struct Match {
    slot: SlotRef,
    path: String,
}

impl Match {
    /// Create match
    #[must_use]
    pub fn new(slot: SlotRef, path: impl Into<String>) -> Self {
        Self {
            slot,
            path: path.into(),
        }
    }

    /// The captured slot
    #[inline]
    #[must_use]
    pub fn slot(&self) -> &SlotRef {
        &self.slot
    }

    /// Path at which the slot was first discovered
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Debug for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Match")
            .field("slot", &format_args!("{:#x}", Identity::of_slot(&self.slot).address()))
            .field("path", &self.path)
            .finish()
    }
}

/// Outcome of one scan
#[derive(Clone)]
pub struct ScanResult {
    source: ElementRef,
    matches: Vec<Match>,
    incompatible_count: usize,
    visited_member_count: usize,
    last_matched_path: Option<String>,
}

impl ScanResult {
    pub(crate) fn new(
        source: ElementRef,
        matches: Vec<Match>,
        incompatible_count: usize,
        visited_member_count: usize,
        last_matched_path: Option<String>,
    ) -> Self {
        Self {
            source,
            matches,
            incompatible_count,
            visited_member_count,
            last_matched_path,
        }
    }

    /// Element the scan searched for
    #[inline]
    #[must_use]
    pub fn source(&self) -> &ElementRef {
        &self.source
    }

    /// Matches in discovery order
    #[inline]
    #[must_use]
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    /// Number of matches
    #[inline]
    #[must_use]
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Whether nothing replaceable was found
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Slots pointing at the source whose type constraint rejects the target
    #[inline]
    #[must_use]
    pub fn incompatible_count(&self) -> usize {
        self.incompatible_count
    }

    /// Members examined
    #[inline]
    #[must_use]
    pub fn visited_member_count(&self) -> usize {
        self.visited_member_count
    }

    /// Path of the most recent match
    #[inline]
    #[must_use]
    pub fn last_matched_path(&self) -> Option<&str> {
        self.last_matched_path.as_deref()
    }

    /// Match paths in discovery order
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        self.matches.iter().map(Match::path).collect()
    }

    /// Counters for presentation
    #[must_use]
    pub fn summary(&self) -> ScanSummary {
        ScanSummary {
            matches: self.matches.len(),
            incompatible: self.incompatible_count,
            visited_members: self.visited_member_count,
            last_matched_path: self.last_matched_path.clone(),
        }
    }
}

impl fmt::Debug for ScanResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanResult")
            .field("source", &self.source.reference_id())
            .field("matches", &self.matches)
            .field("incompatible_count", &self.incompatible_count)
            .field("visited_member_count", &self.visited_member_count)
            .field("last_matched_path", &self.last_matched_path)
            .finish()
    }
}

/// Serializable counters of a [`ScanResult`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Number of matches
    pub matches: usize,
    /// Incompatible slots skipped
    pub incompatible: usize,
    /// Members examined
    pub visited_members: usize,
    /// Path of the most recent match
    pub last_matched_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use refscan_graph::live::{Element, SyncRef};

    fn result_with(paths: &[&str]) -> ScanResult {
        let source = Element::shared("S", "Thing");
        let matches: Vec<Match> = paths
            .iter()
            .map(|path| Match::new(SyncRef::untyped("Ref", Some(source.clone())), *path))
            .collect();
        let last = paths.last().map(|p| (*p).to_string());
        ScanResult::new(source, matches, 2, 9, last)
    }

    #[test]
    fn accessors() {
        let result = result_with(&["Root.A", "Root.B"]);

        assert_eq!(result.match_count(), 2);
        assert_eq!(result.paths(), vec!["Root.A", "Root.B"]);
        assert_eq!(result.incompatible_count(), 2);
        assert_eq!(result.visited_member_count(), 9);
        assert_eq!(result.last_matched_path(), Some("Root.B"));
        assert!(!result.is_empty());
    }

    #[test]
    fn summary_mirrors_counters() {
        let summary = result_with(&["Root.A"]).summary();
        assert_eq!(
            summary,
            ScanSummary {
                matches: 1,
                incompatible: 2,
                visited_members: 9,
                last_matched_path: Some("Root.A".to_string()),
            }
        );
    }

    #[test]
    fn match_debug_shows_path() {
        let result = result_with(&["Root.A"]);
        let debug = format!("{:?}", result.matches()[0]);
        assert!(debug.contains("Root.A"));
    }
}
