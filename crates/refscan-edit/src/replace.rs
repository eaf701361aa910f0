//! Retargeting matched slots

use crate::error::EditError;
use crate::undo::{BatchGuard, UndoSink};
use refscan_core::ScanResult;
use refscan_graph::{same_element, ElementRef};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Outcome of applying a replacement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceReport {
    /// Slots retargeted
    pub replaced: usize,
    /// Slots skipped because they already held the replacement
    pub already_targeted: usize,
    /// Incompatible slots reported by the scan, left untouched
    pub incompatible: usize,
}

/// Applies one scan result to the graph
///
/// # Example
/// ```
/// use refscan_core::{ScanRequest, Scanner};
/// use refscan_edit::{Replacer, UndoLog};
/// use refscan_graph::live::{Element, SceneNode, SyncRef};
/// use refscan_graph::{ReferenceSlot, TypeHierarchy};
///
/// let old = Element::shared("Old", "Material");
/// let new = Element::shared("New", "Material");
/// let root = SceneNode::new("Root");
/// let slot = SyncRef::typed("Material", "Material", Some(old.clone()));
/// root.add_member(slot.clone());
///
/// let types = TypeHierarchy::new();
/// let result = Scanner::new(&types)
///     .scan(ScanRequest::of(&*root, old, new.clone()))
///     .unwrap();
///
/// let mut undo = UndoLog::new();
/// let report = Replacer::new(&result, new).unwrap().apply(&mut undo).unwrap();
///
/// assert_eq!(report.replaced, 1);
/// assert_eq!(undo.batches()[0].description(), "Reference Replacement (1)");
/// assert_eq!(slot.target().unwrap().display_name(), Some("New"));
/// ```
pub struct Replacer<'r> {
    result: &'r ScanResult,
    target: ElementRef,
}

impl<'r> Replacer<'r> {
    /// Prepare to retarget every match of `result` to `target`
    ///
    /// # Errors
    /// Returns [`EditError::SourceIsTarget`] if `target` is the scan's source,
    /// by handle or by reference id.
    pub fn new(result: &'r ScanResult, target: ElementRef) -> Result<Self, EditError> {
        if is_same(result.source(), &target) {
            return Err(EditError::SourceIsTarget);
        }
        Ok(Self { result, target })
    }

    /// Undo batch description
    #[must_use]
    pub fn description(&self) -> String {
        format!("Reference Replacement ({})", self.result.match_count())
    }

    /// Retarget every match inside a single undo batch
    ///
    /// Each slot's previous target is recorded before it is changed. Slots that
    /// already hold the replacement are skipped. The batch is closed however
    /// this returns; on error it keeps the records of the slots already
    /// changed. A result without matches opens no batch.
    ///
    /// # Errors
    /// Returns an error if a slot refuses the assignment.
    pub fn apply(&self, sink: &mut dyn UndoSink) -> Result<ReplaceReport, EditError> {
        let mut report = ReplaceReport {
            incompatible: self.result.incompatible_count(),
            ..ReplaceReport::default()
        };
        if self.result.is_empty() {
            return Ok(report);
        }

        let mut batch = BatchGuard::open(sink, &self.description());
        for found in self.result.matches() {
            let slot = found.slot();
            let previous = slot.target();

            if previous
                .as_ref()
                .is_some_and(|current| is_same(current, &self.target))
            {
                debug!(path = found.path(), "slot already holds replacement");
                report.already_targeted += 1;
                continue;
            }

            batch.record(slot, found.path(), previous);
            slot.set_target(Some(self.target.clone()))
                .map_err(|source| EditError::assignment(found.path(), source))?;
            report.replaced += 1;
        }
        drop(batch);

        info!(
            replaced = report.replaced,
            already_targeted = report.already_targeted,
            incompatible = report.incompatible,
            "reference replacement applied"
        );
        Ok(report)
    }
}

impl std::fmt::Debug for Replacer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Replacer")
            .field("matches", &self.result.match_count())
            .field("target", &self.target.reference_id())
            .finish()
    }
}

fn is_same(a: &ElementRef, b: &ElementRef) -> bool {
    same_element(a, b) || a.reference_id() == b.reference_id()
}
