//! In-memory host graph
//!
//! A complete, thread-safe implementation of the graph model: scene nodes
//! with components, reference slots and every container shape the scanner
//! understands. Embedders with their own object model implement the traits
//! directly instead.

mod element;
mod members;
mod scene;

pub use element::Element;
pub use members::{
    DictEntry, KeyValuePair, SyncArray, SyncBag, SyncCollection, SyncDictionary, SyncField,
    SyncList, SyncRef, Text,
};
pub use scene::{Component, SceneNode};
