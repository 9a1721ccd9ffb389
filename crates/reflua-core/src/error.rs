//! Error types for conversion and registration.
//!
//! ```text
//! ConversionError   - a Variant did not hold the requested Rust type
//! RegistrationError - the registry rejected a type or member
//! ```

use thiserror::Error;

use crate::TypeHash;

// ============================================================================
// Conversion Errors
// ============================================================================

/// Failure to extract a typed value from a [`Variant`](crate::Variant).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The variant holds a different type (or no value at all).
    #[error("expected '{expected}', found {actual}")]
    TypeMismatch {
        /// Script name of the requested type.
        expected: &'static str,
        /// Type actually held by the variant.
        actual: TypeHash,
    },
}

// ============================================================================
// Registration Errors
// ============================================================================

/// Errors raised while populating the type registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// A type with this name already exists.
    #[error("duplicate type: {0}")]
    DuplicateType(String),

    /// A member with this name already exists on the owner.
    #[error("duplicate member '{member}' on '{owner}'")]
    DuplicateMember {
        /// Owning type (or `Global` for free functions).
        owner: String,
        /// The duplicated member name.
        member: String,
    },

    /// A referenced type was not registered.
    #[error("unknown type: {0}")]
    UnknownType(String),
}
