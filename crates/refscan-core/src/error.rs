//! Error types for scanning
//!
//! A scan fails in two ways:
//! - usage errors, raised before any traversal
//! - fatal container-access failures, raised mid-walk with the path reached

use crate::path::TraversalPath;
use refscan_graph::AccessError;

/// Errors returned by [`Scanner::scan`](crate::Scanner::scan)
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Root, source or target was not supplied
    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),

    /// A container accessor failed in a way the scan cannot skip
    #[error("container access failed at {path}: {source}")]
    Access {
        /// Path of the container or element being read
        path: String,
        /// Underlying accessor failure
        #[source]
        source: AccessError,
    },
}

impl ScanError {
    /// Create access error at path
    pub fn access(path: &TraversalPath, source: AccessError) -> Self {
        Self::Access {
            path: path.to_string(),
            source,
        }
    }

    /// Path at which the scan aborted, if it got that far
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::MissingArgument(_) => None,
            Self::Access { path, .. } => Some(path),
        }
    }
}
