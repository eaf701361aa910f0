//! refscan Edit Layer
//!
//! Consumes a [`ScanResult`](refscan_core::ScanResult):
//!
//! - [`Replacer`] retargets every match inside one undo batch, recording each
//!   slot's previous target before changing it
//! - [`UndoLog`] is an in-memory [`UndoSink`] that can revert the last batch
//! - [`StatusReport`] renders the user-facing status and detail lines

#![warn(unreachable_pub)]
#![warn(missing_docs)]

mod error;
mod replace;
mod report;
mod undo;

// Re-exports
pub use error::EditError;
pub use replace::{ReplaceReport, Replacer};
pub use report::StatusReport;
pub use undo::{UndoBatch, UndoLog, UndoRecord, UndoSink};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
