//! Container access errors
//!
//! Host containers report failures through [`AccessError`]. Two kinds are
//! recoverable (the scanner skips the affected container or index); every
//! other failure is fatal and aborts the scan.

/// Failure raised by a container accessor
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// The container does not support the requested access
    #[error("operation not supported: {0}")]
    NotSupported(String),

    /// The container is in a state that forbids the access
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Any other failure
    #[error("access fault: {0}")]
    Fault(String),
}

impl AccessError {
    /// Create a not-supported error
    pub fn not_supported(message: impl Into<String>) -> Self {
        Self::NotSupported(message.into())
    }

    /// Create an invalid-operation error
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }

    /// Create a fatal fault
    pub fn fault(message: impl Into<String>) -> Self {
        Self::Fault(message.into())
    }

    /// Whether the scanner may skip past this failure
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotSupported(_) | Self::InvalidOperation(_))
    }
}
