//! Graph values and their capabilities
//!
//! Everything reachable below a node (members, container elements, dictionary
//! entries, pairs) is a [`GraphValue`] shared as a [`Value`]. A value exposes
//! what it can do through capability probes (`as_list`, `as_iterable`, ...);
//! each probe defaults to "not supported", so hosts implement only the
//! capabilities their types actually have.
//!
//! Identity of a value is an [`Identity`]: the address of its data plus its
//! concrete type, never structural equality.

use crate::element::{ElementRef, TypeTag};
use crate::error::AccessError;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Shared handle to any graph value
pub type Value = Arc<dyn GraphValue>;

/// Shared handle to a reference slot
pub type SlotRef = Arc<dyn ReferenceSlot>;

/// Lazily produced, fallible sequence of container elements
///
/// `None` items are null elements and are skipped by consumers.
pub type ValueIter<'a> = Box<dyn Iterator<Item = Result<Option<Value>, AccessError>> + 'a>;

/// A value stored somewhere in the graph
///
/// Capabilities must be fixed per concrete type: the scanner classifies a
/// type once and reuses the answer for every instance.
pub trait GraphValue: Send + Sync + 'static {
    /// Concrete type, used to memoize shape classification
    fn as_any(&self) -> &dyn Any;

    /// Member name when this value is a named member of a facet or node
    fn member_name(&self) -> Option<&str> {
        None
    }

    /// Text-like scalars are never iterated, even when they are iterable
    fn is_text(&self) -> bool {
        false
    }

    /// Reference slot capability
    fn to_reference(self: Arc<Self>) -> Option<SlotRef> {
        None
    }

    /// Generic index-ordered iteration
    fn as_iterable(&self) -> Option<&dyn Iterable> {
        None
    }

    /// List capability
    fn as_list(&self) -> Option<&dyn ListMember> {
        None
    }

    /// Bag capability
    fn as_bag(&self) -> Option<&dyn BagMember> {
        None
    }

    /// Dictionary capability
    fn as_dictionary(&self) -> Option<&dyn DictionaryMember> {
        None
    }

    /// Fixed array capability
    fn as_array(&self) -> Option<&dyn ArrayMember> {
        None
    }

    /// Typed dictionary entry (key plus value)
    fn as_entry(&self) -> Option<&dyn DictionaryEntry> {
        None
    }

    /// Field-level introspection for values the scanner has no adapter for
    fn as_record(&self) -> Option<&dyn Record> {
        None
    }
}

/// Slot holding zero or one target element
pub trait ReferenceSlot: GraphValue {
    /// Current target
    fn target(&self) -> Option<ElementRef>;

    /// Type a new target must satisfy, if constrained
    fn required_type(&self) -> Option<TypeTag>;

    /// Retarget the slot
    ///
    /// # Errors
    /// Returns an error if the host refuses the assignment.
    fn set_target(&self, target: Option<ElementRef>) -> Result<(), AccessError>;
}

/// Index-ordered iteration over a container
pub trait Iterable: Send + Sync + 'static {
    /// Iterate elements in ascending index order
    ///
    /// # Errors
    /// Returns an error if iteration cannot start; per-element failures are
    /// reported through the iterator.
    fn iter_values(&self) -> Result<ValueIter<'_>, AccessError>;

    /// Concrete type behind the view
    ///
    /// The provided implementation is correct for every implementor.
    fn concrete_type(&self) -> TypeId {
        TypeId::of::<Self>()
    }
}

/// List-shaped member
pub trait ListMember: Send + Sync {
    /// `Elements` view
    ///
    /// # Errors
    /// Returns an error if the view cannot be produced.
    fn elements(&self) -> Result<Option<&dyn Iterable>, AccessError>;
}

/// Bag-shaped member (keyed, unordered storage exposed in insertion order)
pub trait BagMember: Send + Sync {
    /// `Elements` view
    ///
    /// # Errors
    /// Returns an error if the view cannot be produced.
    fn elements(&self) -> Result<Option<&dyn Iterable>, AccessError>;

    /// `Values` view
    ///
    /// # Errors
    /// Returns an error if the view cannot be produced.
    fn values(&self) -> Result<Option<&dyn Iterable>, AccessError>;
}

/// Dictionary-shaped member
pub trait DictionaryMember: Send + Sync {
    /// `BoxedEntries` view, yielding [`DictionaryEntry`] values
    ///
    /// # Errors
    /// Returns an error if the view cannot be produced.
    fn boxed_entries(&self) -> Result<Option<&dyn Iterable>, AccessError>;

    /// `Values` view
    ///
    /// # Errors
    /// Returns an error if the view cannot be produced.
    fn values(&self) -> Result<Option<&dyn Iterable>, AccessError>;
}

/// Fixed array with fallible indexed access
pub trait ArrayMember: Send + Sync {
    /// Number of elements
    ///
    /// # Errors
    /// Returns an error if the count is unavailable.
    fn count(&self) -> Result<usize, AccessError>;

    /// Element at `index`
    ///
    /// # Errors
    /// Returns an error if the element cannot be read.
    fn element(&self, index: usize) -> Result<Option<Value>, AccessError>;
}

/// Boxed dictionary entry
pub trait DictionaryEntry: Send + Sync {
    /// Entry key
    fn key(&self) -> Option<Value>;

    /// Entry value
    fn value(&self) -> Option<Value>;
}

/// Structural view of a value's fields, in declaration order
pub trait Record: Send + Sync {
    /// Type name of the record
    fn type_name(&self) -> &str;

    /// Field names and values
    fn fields(&self) -> Vec<(&str, Option<Value>)>;
}

impl fmt::Debug for dyn GraphValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphValue")
            .field("member", &self.member_name())
            .field("text", &self.is_text())
            .finish_non_exhaustive()
    }
}

/// How a container is being read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// The object itself, or enumeration of it
    Direct,
    /// Counted, indexed element access
    Indexed,
}

/// Identity of a value, slot or container view within one scan
///
/// A struct and its first field share a data address, so the concrete type is
/// part of the key. Two identities are equal only when they name the same
/// object read the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity {
    address: usize,
    concrete: TypeId,
    route: Route,
}

impl Identity {
    /// Identity of a shared value
    #[inline]
    #[must_use]
    pub fn of_value(value: &Value) -> Self {
        Self {
            address: Arc::as_ptr(value).cast::<()>() as usize,
            concrete: value.as_any().type_id(),
            route: Route::Direct,
        }
    }

    /// Identity of a reference slot
    #[inline]
    #[must_use]
    pub fn of_slot(slot: &SlotRef) -> Self {
        Self {
            address: Arc::as_ptr(slot).cast::<()>() as usize,
            concrete: slot.as_any().type_id(),
            route: Route::Direct,
        }
    }

    /// Identity of a borrowed container view
    #[inline]
    #[must_use]
    pub fn of_view(view: &dyn Iterable) -> Self {
        Self {
            address: (view as *const _ as *const ()) as usize,
            concrete: view.concrete_type(),
            route: Route::Direct,
        }
    }

    /// Same object, read through `route`
    #[inline]
    #[must_use]
    pub fn via(self, route: Route) -> Self {
        Self { route, ..self }
    }

    /// Data address
    #[inline]
    #[must_use]
    pub fn address(&self) -> usize {
        self.address
    }

    /// Access route
    #[inline]
    #[must_use]
    pub fn route(&self) -> Route {
        self.route
    }
}
