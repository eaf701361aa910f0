//! refscan Core
//!
//! Finds every reference slot in an object graph that points at a source
//! element, and classifies each as replaceable by a target element or as
//! type-incompatible with it.
//!
//! # Architecture
//!
//! ```text
//! Scanner::scan(root, source, target)
//!   └─ Walk (depth-first, preorder)
//!        ├─ shape::classify   closed Shape per concrete type, cached
//!        ├─ TraversalPath     `Root/Child::Facet.Member.View[i]`
//!        └─ MatchAccumulator  dedup sets + matches + counters (leased)
//!             └─ build() → ScanResult
//! ```
//!
//! # Guarantees
//!
//! - Scanning an unchanged graph twice yields the same paths and counters
//! - Each reference slot is recorded at most once, at its first-discovered path
//! - Each container is entered at most once per access route, so
//!   self-containing containers terminate
//! - Scratch containers return to their pool on every exit path

#![warn(unreachable_pub)]
#![warn(missing_docs)]

mod accumulator;
mod engine;
mod error;
mod options;
mod path;
mod result;

pub mod lease;
pub mod shape;

// Re-exports
pub use accumulator::MatchAccumulator;
pub use engine::{ScanRequest, Scanner};
pub use error::ScanError;
pub use lease::{Lease, PoolConfig, PoolStats, ScratchPool, ScratchPools};
pub use options::ScanOptions;
pub use path::TraversalPath;
pub use result::{Match, ScanResult, ScanSummary};
pub use shape::Shape;

/// Commonly used items
pub mod prelude {
    pub use crate::{Match, ScanError, ScanOptions, ScanRequest, ScanResult, Scanner};
    pub use refscan_graph::{ElementRef, Node, TypeModel};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
