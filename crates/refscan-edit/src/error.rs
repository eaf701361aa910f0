//! Error types for the edit layer

use refscan_graph::AccessError;

/// Errors during replacement or undo
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    /// Replacement would retarget slots to the element they already match
    #[error("source and replacement are identical")]
    SourceIsTarget,

    /// Slot refused the assignment but the host reports it as recoverable
    #[error("slot at {path} is unavailable: {source}")]
    SlotUnavailable {
        /// Path of the slot
        path: String,
        /// Refusal reported by the host
        #[source]
        source: AccessError,
    },

    /// Slot assignment failed
    #[error("failed to retarget slot at {path}: {source}")]
    Access {
        /// Path of the slot
        path: String,
        /// Underlying assignment failure
        #[source]
        source: AccessError,
    },
}

impl EditError {
    /// Classify a failed assignment at `path`
    pub fn assignment(path: impl Into<String>, source: AccessError) -> Self {
        let path = path.into();
        if source.is_recoverable() {
            Self::SlotUnavailable { path, source }
        } else {
            Self::Access { path, source }
        }
    }
}
