//! refscan Graph Model
//!
//! The object graph the reference scanner walks.
//!
//! # Core Concepts
//!
//! - [`Node`]: vertex with members, facets and ordered children
//! - [`Facet`]: component-like unit exposing named members
//! - [`GraphValue`]: anything stored below a node, probed for capabilities
//! - [`ReferenceSlot`]: member holding zero or one [`WorldElement`] target
//! - [`Blueprint`]: detached snapshot tree, scanned like a live node
//! - [`TypeModel`]: the host's answer to "may this slot hold that element?"
//!
//! # Example
//!
//! ```rust
//! use refscan_graph::live::{Component, Element, SceneNode, SyncRef};
//! use refscan_graph::{Node, ReferenceSlot};
//!
//! let texture = Element::shared("Brick", "Texture");
//! let root = SceneNode::new("Root");
//! let slot = SyncRef::typed("Albedo", "Texture", Some(texture));
//! root.attach(Component::new("Material").with_member(slot.clone()).into_shared());
//!
//! assert_eq!(root.facets().len(), 1);
//! assert!(slot.target().is_some());
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

mod blueprint;
mod element;
mod error;
mod node;
mod value;

pub mod live;

// Re-exports
pub use blueprint::Blueprint;
pub use element::{same_element, ElementRef, RefId, TypeHierarchy, TypeModel, TypeTag, WorldElement};
pub use error::AccessError;
pub use node::{same_node, Facet, FacetRef, Node, NodeRef};
pub use value::{
    ArrayMember, BagMember, DictionaryEntry, DictionaryMember, GraphValue, Identity, Iterable,
    ListMember, Record, ReferenceSlot, Route, SlotRef, Value, ValueIter,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
