//! World elements, reference ids and runtime type tags
//!
//! A [`WorldElement`] is anything a reference slot can point at. Elements are
//! shared as [`ElementRef`] handles; identity is the address of the shared
//! allocation, with the [`RefId`] as a secondary, host-assigned identity.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Host-assigned reference id of a world element
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RefId(u64);

impl RefId {
    /// Wrap a raw id
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Allocate a fresh, process-unique id
    #[must_use]
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl Display for RefId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ID{:X}", self.0)
    }
}

/// Runtime type descriptor
///
/// Tags compare by name. Subtyping is not encoded in the tag itself; it is
/// answered by a [`TypeModel`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeTag(Arc<str>);

impl TypeTag {
    /// Create a tag from a type name
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// Type name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Display for TypeTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeTag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Anything a reference slot may target
pub trait WorldElement: Send + Sync {
    /// Host-assigned reference id
    fn reference_id(&self) -> RefId;

    /// Concrete runtime type, checked against a slot's required type
    fn runtime_type(&self) -> TypeTag;

    /// Human-readable name, if the element has one
    fn display_name(&self) -> Option<&str> {
        None
    }
}

/// Shared handle to a world element
pub type ElementRef = Arc<dyn WorldElement>;

/// Object identity of two element handles
#[inline]
#[must_use]
pub fn same_element(a: &ElementRef, b: &ElementRef) -> bool {
    Arc::as_ptr(a).cast::<()>() == Arc::as_ptr(b).cast::<()>()
}

/// Type-description facility of the host graph
///
/// Answers whether a value of runtime type `candidate` may be stored in a slot
/// whose required type is `required`.
pub trait TypeModel: Send + Sync {
    /// `true` if `candidate` satisfies `required`
    fn accepts(&self, required: &TypeTag, candidate: &TypeTag) -> bool;
}

/// Nominal type hierarchy with multiple supertypes
///
/// A type accepts itself and every type that declares it, directly or
/// transitively, as a supertype.
///
/// # Example
/// ```
/// use refscan_graph::{TypeHierarchy, TypeModel, TypeTag};
///
/// let types = TypeHierarchy::new()
///     .with_supertype("Slot", "WorldElement")
///     .with_supertype("Material", "Asset");
///
/// assert!(types.accepts(&TypeTag::new("WorldElement"), &TypeTag::new("Slot")));
/// assert!(!types.accepts(&TypeTag::new("Asset"), &TypeTag::new("Slot")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypeHierarchy {
    supertypes: IndexMap<TypeTag, Vec<TypeTag>>,
}

impl TypeHierarchy {
    /// Create empty hierarchy (every type accepts only itself)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `supertype` as a direct supertype of `subtype`
    pub fn declare(&mut self, subtype: impl Into<TypeTag>, supertype: impl Into<TypeTag>) {
        let parents = self.supertypes.entry(subtype.into()).or_default();
        let supertype = supertype.into();
        if !parents.contains(&supertype) {
            parents.push(supertype);
        }
    }

    /// Builder form of [`declare`](Self::declare)
    #[must_use]
    pub fn with_supertype(
        mut self,
        subtype: impl Into<TypeTag>,
        supertype: impl Into<TypeTag>,
    ) -> Self {
        self.declare(subtype, supertype);
        self
    }

    /// Direct supertypes of a type, in declaration order
    #[must_use]
    pub fn supertypes_of(&self, tag: &TypeTag) -> &[TypeTag] {
        self.supertypes.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl TypeModel for TypeHierarchy {
    fn accepts(&self, required: &TypeTag, candidate: &TypeTag) -> bool {
        if required == candidate {
            return true;
        }

        let mut seen: IndexSet<&TypeTag> = IndexSet::new();
        let mut pending = vec![candidate];
        while let Some(tag) = pending.pop() {
            for parent in self.supertypes_of(tag) {
                if parent == required {
                    return true;
                }
                if seen.insert(parent) {
                    pending.push(parent);
                }
            }
        }
        false
    }
}
