//! Standalone world elements

use crate::element::{ElementRef, RefId, TypeTag, WorldElement};
use std::sync::Arc;

/// Named element of a given runtime type
#[derive(Debug, Clone)]
pub struct Element {
    id: RefId,
    name: String,
    runtime_type: TypeTag,
}

impl Element {
    /// Create an element with a fresh reference id
    #[must_use]
    pub fn new(name: impl Into<String>, runtime_type: impl Into<TypeTag>) -> Self {
        Self::with_id(RefId::next(), name, runtime_type)
    }

    /// Create an element with an explicit reference id
    #[must_use]
    pub fn with_id(id: RefId, name: impl Into<String>, runtime_type: impl Into<TypeTag>) -> Self {
        Self {
            id,
            name: name.into(),
            runtime_type: runtime_type.into(),
        }
    }

    /// Shared handle to a new element
    #[must_use]
    pub fn shared(name: impl Into<String>, runtime_type: impl Into<TypeTag>) -> ElementRef {
        Arc::new(Self::new(name, runtime_type))
    }

    /// Element name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl WorldElement for Element {
    fn reference_id(&self) -> RefId {
        self.id
    }

    fn runtime_type(&self) -> TypeTag {
        self.runtime_type.clone()
    }

    fn display_name(&self) -> Option<&str> {
        Some(&self.name)
    }
}
