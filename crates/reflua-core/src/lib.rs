//! Core types for the reflua reflection layer.
//!
//! This crate provides the runtime type metadata consumed by the Lua bridge:
//!
//! - [`TypeHash`]: deterministic identity for types and members
//! - [`Reflect`]: trait giving a Rust type its script-facing name
//! - [`Variant`]: dynamic value passed to and returned from native calls
//! - [`NativeFn`]: type-erased native callable
//! - [`TypeEntry`], [`MethodEntry`], [`PropertyEntry`]: registry entries

mod convert;
mod entries;
mod error;
mod flags;
mod native_fn;
mod reflect;
mod type_hash;
mod variant;

pub use convert::{FromVariant, IntoVariant};
pub use entries::{
    Constructor, Getter, MethodEntry, PropertyEntry, Setter, TypeEntry,
};
pub use error::{ConversionError, RegistrationError};
pub use flags::TypeFlags;
pub use native_fn::{ByMut, ByRef, IntoFunction, IntoMethod, NativeCallable, NativeFn};
pub use reflect::{Reflect, Shared, shared};
pub use type_hash::{TypeHash, hash_constants, primitives};
pub use variant::{NativeValue, Variant};
