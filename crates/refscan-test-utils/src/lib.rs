//! Testing utilities for the refscan workspace
//!
//! Shared fixtures, fault-injecting containers and tracing setup.

#![allow(missing_docs)]

use once_cell::sync::Lazy;
use refscan_graph::live::{Element, SceneNode};
use refscan_graph::{
    AccessError, ArrayMember, DictionaryMember, ElementRef, GraphValue, Iterable, TypeHierarchy,
    Value, ValueIter,
};
use std::any::Any;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

static TRACING: Lazy<()> = Lazy::new(|| {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
});

/// Install a test-friendly subscriber once per process (`RUST_LOG` aware)
pub fn init_tracing() {
    Lazy::force(&TRACING);
}

/// Type hierarchy used across tests
///
/// `Texture` and `Material` are `Asset`s, `Slot` and `Asset` are
/// `WorldElement`s, `T1` and `T2` are unrelated.
pub fn type_hierarchy() -> TypeHierarchy {
    TypeHierarchy::new()
        .with_supertype("Texture", "Asset")
        .with_supertype("Material", "Asset")
        .with_supertype("Asset", "WorldElement")
        .with_supertype(SceneNode::TYPE_NAME, "WorldElement")
}

pub fn element(name: &str, runtime_type: &str) -> ElementRef {
    Element::shared(name, runtime_type)
}

/// Source `S` and target `R`, both of type `T1`
pub fn source_and_target() -> (ElementRef, ElementRef) {
    (element("S", "T1"), element("R", "T1"))
}

/// Failure a fault-injecting container raises
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    NotSupported,
    InvalidOperation,
    Fatal,
}

impl Fault {
    pub fn raise(self, what: &str) -> AccessError {
        match self {
            Self::NotSupported => AccessError::not_supported(what),
            Self::InvalidOperation => AccessError::invalid_operation(what),
            Self::Fatal => AccessError::fault(what),
        }
    }
}

/// Array whose accessors fail on demand
pub struct FaultyArray {
    name: String,
    items: Vec<Option<Value>>,
    count_fault: Option<Fault>,
    element_faults: Vec<(usize, Fault)>,
}

impl FaultyArray {
    pub fn new(name: &str, items: impl IntoIterator<Item = Option<Value>>) -> Self {
        Self {
            name: name.to_string(),
            items: items.into_iter().collect(),
            count_fault: None,
            element_faults: Vec::new(),
        }
    }

    /// Fail `element(index)`
    #[must_use]
    pub fn fail_at(mut self, index: usize, fault: Fault) -> Self {
        self.element_faults.push((index, fault));
        self
    }

    /// Fail `count()`
    #[must_use]
    pub fn fail_count(mut self, fault: Fault) -> Self {
        self.count_fault = Some(fault);
        self
    }

    pub fn into_value(self) -> Value {
        Arc::new(self)
    }
}

impl GraphValue for FaultyArray {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn member_name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn as_array(&self) -> Option<&dyn ArrayMember> {
        Some(self)
    }
}

impl ArrayMember for FaultyArray {
    fn count(&self) -> Result<usize, AccessError> {
        match self.count_fault {
            Some(fault) => Err(fault.raise("count unavailable")),
            None => Ok(self.items.len()),
        }
    }

    fn element(&self, index: usize) -> Result<Option<Value>, AccessError> {
        if let Some((_, fault)) = self.element_faults.iter().find(|(i, _)| *i == index) {
            return Err(fault.raise(&format!("element {index} unavailable")));
        }
        Ok(self.items.get(index).cloned().flatten())
    }
}

/// Iterable member that yields its items, then fails at a given position
pub struct FailingIterable {
    name: String,
    items: Vec<Value>,
    fail_at: usize,
    fault: Fault,
}

impl FailingIterable {
    pub fn new(name: &str, items: Vec<Value>, fail_at: usize, fault: Fault) -> Value {
        Arc::new(Self {
            name: name.to_string(),
            items,
            fail_at,
            fault,
        })
    }
}

impl GraphValue for FailingIterable {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn member_name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn as_iterable(&self) -> Option<&dyn Iterable> {
        Some(self)
    }
}

impl Iterable for FailingIterable {
    fn iter_values(&self) -> Result<ValueIter<'_>, AccessError> {
        let fail_at = self.fail_at;
        let fault = self.fault;
        Ok(Box::new((0..=fail_at).map(move |index| {
            if index == fail_at {
                Err(fault.raise("collection was modified"))
            } else {
                Ok(self.items.get(index).cloned())
            }
        })))
    }
}

/// Dictionary whose `BoxedEntries` getter fails and whose `Values` view works
pub struct FaultyDictionary {
    name: String,
    fault: Fault,
    values: ValueList,
}

struct ValueList(Vec<Value>);

impl Iterable for ValueList {
    fn iter_values(&self) -> Result<ValueIter<'_>, AccessError> {
        Ok(Box::new(self.0.iter().map(|value| Ok(Some(Arc::clone(value))))))
    }
}

impl FaultyDictionary {
    pub fn new(name: &str, values: Vec<Value>, fault: Fault) -> Value {
        Arc::new(Self {
            name: name.to_string(),
            fault,
            values: ValueList(values),
        })
    }
}

impl GraphValue for FaultyDictionary {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn member_name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn as_dictionary(&self) -> Option<&dyn DictionaryMember> {
        Some(self)
    }
}

impl DictionaryMember for FaultyDictionary {
    fn boxed_entries(&self) -> Result<Option<&dyn Iterable>, AccessError> {
        Err(self.fault.raise("boxed entries unavailable"))
    }

    fn values(&self) -> Result<Option<&dyn Iterable>, AccessError> {
        Ok(Some(&self.values))
    }
}
