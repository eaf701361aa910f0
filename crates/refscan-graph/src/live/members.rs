//! In-memory members and container values
//!
//! Shapes follow the host conventions the scanner expects:
//! - [`SyncList`] is iterable and its `Elements` view is the list itself
//! - [`SyncBag`] exposes `Elements` (key/value pairs) and `Values`
//! - [`SyncDictionary`] exposes `BoxedEntries` (typed entries) and `Values`
//! - [`SyncArray`] exposes only counted, indexed access
//! - [`SyncCollection`] is a plain iterable member

use crate::element::{ElementRef, TypeTag};
use crate::error::AccessError;
use crate::value::{
    ArrayMember, BagMember, DictionaryEntry, DictionaryMember, GraphValue, Iterable, ListMember,
    Record, ReferenceSlot, SlotRef, Value, ValueIter,
};
use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

fn snapshot(items: &RwLock<Vec<Value>>) -> ValueIter<'static> {
    let items = items.read().clone();
    Box::new(items.into_iter().map(|item| Ok(Some(item))))
}

/// Reference slot with an optional required type
pub struct SyncRef {
    name: String,
    required: Option<TypeTag>,
    target: RwLock<Option<ElementRef>>,
}

impl SyncRef {
    /// Slot constrained to `required`
    #[must_use]
    pub fn typed(
        name: impl Into<String>,
        required: impl Into<TypeTag>,
        target: Option<ElementRef>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            required: Some(required.into()),
            target: RwLock::new(target),
        })
    }

    /// Slot accepting any target
    #[must_use]
    pub fn untyped(name: impl Into<String>, target: Option<ElementRef>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            required: None,
            target: RwLock::new(target),
        })
    }
}

impl fmt::Debug for SyncRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = self.target.read().as_ref().map(|t| t.reference_id());
        f.debug_struct("SyncRef")
            .field("name", &self.name)
            .field("required", &self.required)
            .field("target", &target)
            .finish()
    }
}

impl GraphValue for SyncRef {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn member_name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn to_reference(self: Arc<Self>) -> Option<SlotRef> {
        Some(self)
    }
}

impl ReferenceSlot for SyncRef {
    fn target(&self) -> Option<ElementRef> {
        self.target.read().clone()
    }

    fn required_type(&self) -> Option<TypeTag> {
        self.required.clone()
    }

    fn set_target(&self, target: Option<ElementRef>) -> Result<(), AccessError> {
        *self.target.write() = target;
        Ok(())
    }
}

/// Scalar member (counted by the scanner, never entered)
#[derive(Debug)]
pub struct SyncField {
    name: String,
    value: RwLock<String>,
}

impl SyncField {
    /// Create a field with an initial value
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            value: RwLock::new(value.into()),
        })
    }

    /// Current value
    #[must_use]
    pub fn get(&self) -> String {
        self.value.read().clone()
    }
}

impl GraphValue for SyncField {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn member_name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

/// Text scalar
///
/// Iterable over its characters, but always treated as a scalar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text(pub String);

impl Text {
    /// Shared text value
    #[must_use]
    pub fn shared(text: impl Into<String>) -> Value {
        Arc::new(Self(text.into()))
    }
}

impl GraphValue for Text {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn is_text(&self) -> bool {
        true
    }

    fn as_iterable(&self) -> Option<&dyn Iterable> {
        Some(self)
    }
}

impl Iterable for Text {
    fn iter_values(&self) -> Result<ValueIter<'_>, AccessError> {
        Ok(Box::new(
            self.0.chars().map(|c| Ok(Some(Text::shared(c.to_string())))),
        ))
    }
}

/// Growable list member
pub struct SyncList {
    name: String,
    items: RwLock<Vec<Value>>,
}

impl SyncList {
    /// Create a list
    #[must_use]
    pub fn new(name: impl Into<String>, items: impl IntoIterator<Item = Value>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            items: RwLock::new(items.into_iter().collect()),
        })
    }

    /// Append an element
    pub fn push(&self, item: Value) {
        self.items.write().push(item);
    }

    /// Number of elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Whether the list is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

impl GraphValue for SyncList {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn member_name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn as_iterable(&self) -> Option<&dyn Iterable> {
        Some(self)
    }

    fn as_list(&self) -> Option<&dyn ListMember> {
        Some(self)
    }
}

impl Iterable for SyncList {
    fn iter_values(&self) -> Result<ValueIter<'_>, AccessError> {
        Ok(snapshot(&self.items))
    }
}

impl ListMember for SyncList {
    fn elements(&self) -> Result<Option<&dyn Iterable>, AccessError> {
        Ok(Some(self))
    }
}

/// Plain iterable member with nullable elements
pub struct SyncCollection {
    name: String,
    items: RwLock<Vec<Option<Value>>>,
}

impl SyncCollection {
    /// Create a collection
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        items: impl IntoIterator<Item = Option<Value>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            items: RwLock::new(items.into_iter().collect()),
        })
    }

    /// Append an element
    pub fn push(&self, item: Option<Value>) {
        self.items.write().push(item);
    }
}

impl GraphValue for SyncCollection {
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

impl Iterable for SyncCollection {
    fn iter_values(&self) -> Result<ValueIter<'_>, AccessError> {
        let items = self.items.read().clone();
        Ok(Box::new(items.into_iter().map(Ok)))
    }
}

/// Generic two-field pair, recognised only structurally
#[derive(Clone)]
pub struct KeyValuePair {
    key: Option<Value>,
    value: Option<Value>,
}

impl KeyValuePair {
    /// Shared pair value
    #[must_use]
    pub fn shared(key: Option<Value>, value: Option<Value>) -> Value {
        Arc::new(Self { key, value })
    }
}

impl GraphValue for KeyValuePair {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_record(&self) -> Option<&dyn Record> {
        Some(self)
    }
}

impl Record for KeyValuePair {
    fn type_name(&self) -> &str {
        "KeyValuePair"
    }

    fn fields(&self) -> Vec<(&str, Option<Value>)> {
        vec![("Key", self.key.clone()), ("Value", self.value.clone())]
    }
}

/// Typed dictionary entry
#[derive(Clone)]
pub struct DictEntry {
    key: Option<Value>,
    value: Option<Value>,
}

impl DictEntry {
    /// Shared entry value
    #[must_use]
    pub fn shared(key: Option<Value>, value: Option<Value>) -> Value {
        Arc::new(Self { key, value })
    }
}

impl GraphValue for DictEntry {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_entry(&self) -> Option<&dyn DictionaryEntry> {
        Some(self)
    }
}

impl DictionaryEntry for DictEntry {
    fn key(&self) -> Option<Value> {
        self.key.clone()
    }

    fn value(&self) -> Option<Value> {
        self.value.clone()
    }
}

type Entries = Arc<RwLock<Vec<(Value, Value)>>>;

struct PairView(Entries);

impl Iterable for PairView {
    fn iter_values(&self) -> Result<ValueIter<'_>, AccessError> {
        let entries = self.0.read().clone();
        Ok(Box::new(entries.into_iter().map(|(key, value)| {
            Ok(Some(KeyValuePair::shared(Some(key), Some(value))))
        })))
    }
}

struct EntryView(Entries);

impl Iterable for EntryView {
    fn iter_values(&self) -> Result<ValueIter<'_>, AccessError> {
        let entries = self.0.read().clone();
        Ok(Box::new(entries.into_iter().map(|(key, value)| {
            Ok(Some(DictEntry::shared(Some(key), Some(value))))
        })))
    }
}

struct ValuesView(Entries);

impl Iterable for ValuesView {
    fn iter_values(&self) -> Result<ValueIter<'_>, AccessError> {
        let entries = self.0.read().clone();
        Ok(Box::new(entries.into_iter().map(|(_, value)| Ok(Some(value)))))
    }
}

/// Keyed bag member
pub struct SyncBag {
    name: String,
    entries: Entries,
    elements: PairView,
    values: ValuesView,
}

impl SyncBag {
    /// Create a bag
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        entries: impl IntoIterator<Item = (Value, Value)>,
    ) -> Arc<Self> {
        let entries: Entries = Arc::new(RwLock::new(entries.into_iter().collect()));
        Arc::new(Self {
            name: name.into(),
            elements: PairView(Arc::clone(&entries)),
            values: ValuesView(Arc::clone(&entries)),
            entries,
        })
    }

    /// Add an entry
    pub fn insert(&self, key: Value, value: Value) {
        self.entries.write().push((key, value));
    }
}

impl GraphValue for SyncBag {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn member_name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn as_bag(&self) -> Option<&dyn BagMember> {
        Some(self)
    }
}

impl BagMember for SyncBag {
    fn elements(&self) -> Result<Option<&dyn Iterable>, AccessError> {
        Ok(Some(&self.elements))
    }

    fn values(&self) -> Result<Option<&dyn Iterable>, AccessError> {
        Ok(Some(&self.values))
    }
}

/// Dictionary member
pub struct SyncDictionary {
    name: String,
    entries: Entries,
    boxed: EntryView,
    values: ValuesView,
}

impl SyncDictionary {
    /// Create a dictionary
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        entries: impl IntoIterator<Item = (Value, Value)>,
    ) -> Arc<Self> {
        let entries: Entries = Arc::new(RwLock::new(entries.into_iter().collect()));
        Arc::new(Self {
            name: name.into(),
            boxed: EntryView(Arc::clone(&entries)),
            values: ValuesView(Arc::clone(&entries)),
            entries,
        })
    }

    /// Add an entry
    pub fn insert(&self, key: Value, value: Value) {
        self.entries.write().push((key, value));
    }
}

impl GraphValue for SyncDictionary {
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

impl DictionaryMember for SyncDictionary {
    fn boxed_entries(&self) -> Result<Option<&dyn Iterable>, AccessError> {
        Ok(Some(&self.boxed))
    }

    fn values(&self) -> Result<Option<&dyn Iterable>, AccessError> {
        Ok(Some(&self.values))
    }
}

/// Fixed-size array member
pub struct SyncArray {
    name: String,
    items: RwLock<Vec<Option<Value>>>,
}

impl SyncArray {
    /// Create an array
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        items: impl IntoIterator<Item = Option<Value>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            items: RwLock::new(items.into_iter().collect()),
        })
    }

    /// Overwrite an element
    ///
    /// # Errors
    /// Returns [`AccessError::InvalidOperation`] if `index` is out of range.
    pub fn set(&self, index: usize, item: Option<Value>) -> Result<(), AccessError> {
        let mut items = self.items.write();
        let len = items.len();
        let slot = items.get_mut(index).ok_or_else(|| {
            AccessError::invalid_operation(format!("index {index} out of range for length {len}"))
        })?;
        *slot = item;
        Ok(())
    }
}

impl GraphValue for SyncArray {
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

impl ArrayMember for SyncArray {
    fn count(&self) -> Result<usize, AccessError> {
        Ok(self.items.read().len())
    }

    fn element(&self, index: usize) -> Result<Option<Value>, AccessError> {
        let items = self.items.read();
        items.get(index).cloned().ok_or_else(|| {
            AccessError::invalid_operation(format!(
                "index {index} out of range for length {}",
                items.len()
            ))
        })
    }
}
