//! Registry entry types.
//!
//! - [`TypeEntry`] - a registered type (primitive, class or pointer)
//! - [`MethodEntry`] - a method or free function with its native invoker
//! - [`PropertyEntry`] - a property with getter and optional setter

mod member;
mod type_entry;

pub use member::{Getter, MethodEntry, PropertyEntry, Setter};
pub use type_entry::{Constructor, TypeEntry};
