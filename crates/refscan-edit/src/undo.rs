//! Undo recording
//!
//! The edit layer never mutates a slot without first telling an [`UndoSink`]
//! what the slot held. Mutations from one scan result form one batch.

use crate::error::EditError;
use refscan_graph::{ElementRef, SlotRef};
use std::fmt;
use tracing::debug;

/// Receiver of undo information
pub trait UndoSink {
    /// Open a batch; every record until [`end_batch`](Self::end_batch) belongs
    /// to it
    fn begin_batch(&mut self, description: &str);

    /// Remember what `slot` held before it is retargeted
    fn record(&mut self, slot: &SlotRef, path: &str, previous: Option<ElementRef>);

    /// Close the open batch
    fn end_batch(&mut self);
}

/// Open batch that closes itself when dropped
pub(crate) struct BatchGuard<'a> {
    sink: &'a mut dyn UndoSink,
}

impl<'a> BatchGuard<'a> {
    pub(crate) fn open(sink: &'a mut dyn UndoSink, description: &str) -> Self {
        sink.begin_batch(description);
        Self { sink }
    }

    pub(crate) fn record(&mut self, slot: &SlotRef, path: &str, previous: Option<ElementRef>) {
        self.sink.record(slot, path, previous);
    }
}

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        self.sink.end_batch();
    }
}

/// Previous state of one slot
#[derive(Clone)]
pub struct UndoRecord {
    slot: SlotRef,
    path: String,
    previous: Option<ElementRef>,
}

impl UndoRecord {
    /// Path of the slot when it was changed
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Target before the change
    #[inline]
    #[must_use]
    pub fn previous(&self) -> Option<&ElementRef> {
        self.previous.as_ref()
    }

    /// The changed slot
    #[inline]
    #[must_use]
    pub fn slot(&self) -> &SlotRef {
        &self.slot
    }
}

impl fmt::Debug for UndoRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoRecord")
            .field("path", &self.path)
            .field("previous", &self.previous.as_ref().map(|e| e.reference_id()))
            .finish_non_exhaustive()
    }
}

/// Closed group of records, undone together
#[derive(Debug, Clone)]
pub struct UndoBatch {
    description: String,
    records: Vec<UndoRecord>,
}

impl UndoBatch {
    /// Batch description
    #[inline]
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Records in the order they were made
    #[inline]
    #[must_use]
    pub fn records(&self) -> &[UndoRecord] {
        &self.records
    }
}

/// In-memory undo history
#[derive(Debug, Default)]
pub struct UndoLog {
    batches: Vec<UndoBatch>,
    open: Option<UndoBatch>,
}

impl UndoLog {
    /// Create empty log
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Closed batches, oldest first
    #[inline]
    #[must_use]
    pub fn batches(&self) -> &[UndoBatch] {
        &self.batches
    }

    /// Whether a batch is currently open
    #[inline]
    #[must_use]
    pub fn has_open_batch(&self) -> bool {
        self.open.is_some()
    }

    /// Revert the most recent batch, restoring records newest first
    ///
    /// Returns the number of slots restored, or `None` if there is nothing to
    /// undo. A batch that fails part way is dropped from the history.
    ///
    /// # Errors
    /// Returns an error if a slot refuses its previous target.
    pub fn undo_last(&mut self) -> Result<Option<usize>, EditError> {
        let Some(batch) = self.batches.pop() else {
            return Ok(None);
        };

        for record in batch.records.iter().rev() {
            record
                .slot
                .set_target(record.previous.clone())
                .map_err(|source| EditError::assignment(record.path.as_str(), source))?;
        }
        debug!(batch = %batch.description, restored = batch.records.len(), "undo applied");
        Ok(Some(batch.records.len()))
    }
}

impl UndoSink for UndoLog {
    fn begin_batch(&mut self, description: &str) {
        if let Some(unclosed) = self.open.take() {
            self.batches.push(unclosed);
        }
        self.open = Some(UndoBatch {
            description: description.to_string(),
            records: Vec::new(),
        });
    }

    fn record(&mut self, slot: &SlotRef, path: &str, previous: Option<ElementRef>) {
        if let Some(batch) = self.open.as_mut() {
            batch.records.push(UndoRecord {
                slot: SlotRef::clone(slot),
                path: path.to_string(),
                previous,
            });
        }
    }

    fn end_batch(&mut self) {
        if let Some(batch) = self.open.take() {
            self.batches.push(batch);
        }
    }
}
