//! Conversion traits between typed Rust values and [`Variant`]s.
//!
//! - [`FromVariant`]: extract a typed argument from a variant
//! - [`IntoVariant`]: wrap a typed return value into a variant
//!
//! Both traits also report the [`TypeHash`] of the Rust type, which is how
//! registered members describe their parameter and return types.
//!
//! ## Supported Types
//!
//! - Every [`Reflect`] type, by value
//! - [`Shared<T>`] handles for every `T: Reflect` (pointer types)
//! - Unit `()` as the void return type

use crate::error::ConversionError;
use crate::{Reflect, Shared, TypeHash, Variant, primitives};

/// Extract a value from a [`Variant`].
pub trait FromVariant: Sized + 'static {
    /// Type expected in the variant.
    fn expected_type() -> TypeHash;

    /// Extract (copy) a value from the variant.
    fn from_variant(value: &Variant) -> Result<Self, ConversionError>;
}

/// Convert a value into a [`Variant`].
pub trait IntoVariant: 'static {
    /// Type produced by the conversion.
    fn produced_type() -> TypeHash;

    /// Wrap this value.
    fn into_variant(self) -> Variant;
}

impl<T: Reflect> FromVariant for T {
    fn expected_type() -> TypeHash {
        <T as Reflect>::type_hash()
    }

    fn from_variant(value: &Variant) -> Result<Self, ConversionError> {
        value
            .with_ref(|v: &T| v.clone())
            .ok_or_else(|| ConversionError::TypeMismatch {
                expected: T::type_name(),
                actual: value.type_hash(),
            })
    }
}

impl<T: Reflect> IntoVariant for T {
    fn produced_type() -> TypeHash {
        <T as Reflect>::type_hash()
    }

    fn into_variant(self) -> Variant {
        Variant::new(self)
    }
}

impl<T: Reflect> FromVariant for Shared<T> {
    fn expected_type() -> TypeHash {
        TypeHash::pointer_to(<T as Reflect>::type_hash())
    }

    fn from_variant(value: &Variant) -> Result<Self, ConversionError> {
        value
            .get_value::<Shared<T>>()
            .ok_or_else(|| ConversionError::TypeMismatch {
                expected: T::type_name(),
                actual: value.type_hash(),
            })
    }
}

impl<T: Reflect> IntoVariant for Shared<T> {
    fn produced_type() -> TypeHash {
        TypeHash::pointer_to(<T as Reflect>::type_hash())
    }

    fn into_variant(self) -> Variant {
        Variant::from_shared(self)
    }
}

impl IntoVariant for () {
    fn produced_type() -> TypeHash {
        primitives::VOID
    }

    fn into_variant(self) -> Variant {
        Variant::Void
    }
}

impl IntoVariant for Variant {
    fn produced_type() -> TypeHash {
        TypeHash::EMPTY
    }

    fn into_variant(self) -> Variant {
        self
    }
}
