//! Container shape classification
//!
//! Reduces the open set of host value types to a closed [`Shape`] by probing
//! capabilities once per concrete type. Results are memoized in a
//! process-wide read-through cache, since a type's capabilities never change.

use dashmap::DashMap;
use once_cell::sync::Lazy;
use refscan_graph::Value;
use std::any::TypeId;
use std::sync::Arc;

static SHAPES: Lazy<DashMap<TypeId, Shape>> = Lazy::new(DashMap::new);

/// How the scanner treats a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Reference slot; captured, never iterated
    Reference,
    /// List with an `Elements` view
    List {
        /// Also iterable on its own
        iterable: bool,
    },
    /// Bag with `Elements` and `Values` views
    Bag {
        /// Also iterable on its own
        iterable: bool,
    },
    /// Dictionary with `BoxedEntries` and `Values` views
    Dictionary {
        /// Also iterable on its own
        iterable: bool,
    },
    /// Array with counted, fallible indexed access
    Array {
        /// Also iterable on its own
        iterable: bool,
    },
    /// Anything else that iterates
    Iterable,
    /// Typed dictionary entry that may wrap a reference
    Entry,
    /// Record that may be a two-field pair wrapping a reference
    Pair,
    /// Never entered
    Scalar,
}

impl Shape {
    /// Whether the value can be enumerated as a generic iterable
    #[inline]
    #[must_use]
    pub fn is_iterable(self) -> bool {
        match self {
            Self::Iterable => true,
            Self::List { iterable }
            | Self::Bag { iterable }
            | Self::Dictionary { iterable }
            | Self::Array { iterable } => iterable,
            Self::Reference | Self::Entry | Self::Pair | Self::Scalar => false,
        }
    }

    /// Whether the value is one of the four named container shapes
    #[inline]
    #[must_use]
    pub fn is_named_container(self) -> bool {
        matches!(
            self,
            Self::List { .. } | Self::Bag { .. } | Self::Dictionary { .. } | Self::Array { .. }
        )
    }
}

/// Shape of a value, memoized per concrete type
#[must_use]
pub fn classify(value: &Value) -> Shape {
    let key = value.as_any().type_id();
    if let Some(shape) = SHAPES.get(&key) {
        return *shape;
    }

    let shape = probe(value);
    SHAPES.insert(key, shape);
    shape
}

/// Number of concrete types classified so far
#[must_use]
pub fn cached_shapes() -> usize {
    SHAPES.len()
}

/// Classify by capability presence, bypassing the cache
#[must_use]
pub fn probe(value: &Value) -> Shape {
    if value.is_text() {
        return Shape::Scalar;
    }
    if Arc::clone(value).to_reference().is_some() {
        return Shape::Reference;
    }
    if value.as_entry().is_some() {
        return Shape::Entry;
    }

    let iterable = value.as_iterable().is_some();
    if value.as_list().is_some() {
        Shape::List { iterable }
    } else if value.as_bag().is_some() {
        Shape::Bag { iterable }
    } else if value.as_dictionary().is_some() {
        Shape::Dictionary { iterable }
    } else if value.as_array().is_some() {
        Shape::Array { iterable }
    } else if iterable {
        Shape::Iterable
    } else if value.as_record().is_some() {
        Shape::Pair
    } else {
        Shape::Scalar
    }
}
