//! Reflect trait for registrable types.
//!
//! Every Rust type exposed through the registry implements [`Reflect`], which
//! gives it a script-facing name and the [`TypeHash`] derived from it.
//!
//! # Example
//!
//! ```
//! use reflua_core::{Reflect, TypeHash};
//!
//! #[derive(Clone, Default)]
//! struct Vec2 {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl Reflect for Vec2 {
//!     fn type_name() -> &'static str {
//!         "Vec"
//!     }
//! }
//!
//! assert_eq!(Vec2::type_hash(), TypeHash::from_name("Vec"));
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::{TypeHash, primitives};

/// Trait for types that can be registered and carried in a [`Variant`](crate::Variant).
///
/// Values are copied when they cross into a script, so implementors must be
/// `Clone`.
pub trait Reflect: Clone + 'static {
    /// Name of the type as seen by scripts.
    fn type_name() -> &'static str;

    /// Identity of the type. Derived from [`Reflect::type_name`].
    fn type_hash() -> TypeHash {
        TypeHash::from_name(Self::type_name())
    }
}

/// Shared handle to a native value: the pointer form of a registered type.
///
/// A `Shared<T>` crossing into a script keeps reference semantics: every
/// holder observes the same `T`.
pub type Shared<T> = Rc<RefCell<T>>;

/// Wrap a value in a [`Shared`] handle.
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

macro_rules! impl_reflect_primitive {
    ($($ty:ty => $name:literal, $hash:expr;)*) => {
        $(
            impl Reflect for $ty {
                fn type_name() -> &'static str {
                    $name
                }

                fn type_hash() -> TypeHash {
                    $hash
                }
            }
        )*
    };
}

impl_reflect_primitive! {
    bool => "bool", primitives::BOOL;
    i16 => "short", primitives::INT16;
    i32 => "int", primitives::INT32;
    f32 => "float", primitives::FLOAT;
    f64 => "double", primitives::DOUBLE;
    String => "string", primitives::STRING;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_names() {
        assert_eq!(i32::type_name(), "int");
        assert_eq!(i16::type_name(), "short");
        assert_eq!(f64::type_name(), "double");
    }

    #[test]
    fn primitive_hashes_match_names() {
        assert_eq!(i32::type_hash(), TypeHash::from_name(i32::type_name()));
        assert_eq!(i16::type_hash(), TypeHash::from_name(i16::type_name()));
        assert_eq!(String::type_hash(), TypeHash::from_name("string"));
    }

    #[test]
    fn shared_handles_alias() {
        let a = shared(5i32);
        let b = Rc::clone(&a);
        *b.borrow_mut() = 6;
        assert_eq!(*a.borrow(), 6);
    }
}
