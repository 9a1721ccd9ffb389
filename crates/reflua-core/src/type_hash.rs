//! Deterministic hash-based type identity.
//!
//! [`TypeHash`] is a 64-bit hash that identifies reflected types and their
//! members. Hashes are computed from names, so the same name always maps to
//! the same identity regardless of registration order.
//!
//! # Examples
//!
//! ```
//! use reflua_core::{TypeHash, primitives};
//!
//! assert_eq!(TypeHash::from_name("int"), primitives::INT32);
//!
//! let vec = TypeHash::from_name("Vec");
//! assert_ne!(TypeHash::pointer_to(vec), vec);
//! ```

use std::fmt;
use xxhash_rust::const_xxh64::xxh64;

/// Domain-specific mixing constants for hash computation.
pub mod hash_constants {
    /// Separator constant used when chaining components.
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for type hashes.
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for global function hashes.
    pub const FUNCTION: u64 = 0x5ea77ffbcdf5f302;

    /// Domain marker for method hashes.
    pub const METHOD: u64 = 0x7d3c8b4a92e15f6d;

    /// Domain marker for property hashes.
    pub const PROPERTY: u64 = 0x3e9f5d2a8c7b1403;

    /// Domain marker for pointer types.
    pub const POINTER: u64 = 0x9a7f3d5e2b8c4601;
}

/// A deterministic 64-bit hash identifying a type, function, method or property.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Create a type hash from a type name.
    #[inline]
    pub const fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Hash of the pointer type whose pointee is `pointee`.
    #[inline]
    pub const fn pointer_to(pointee: TypeHash) -> Self {
        TypeHash(hash_constants::POINTER ^ pointee.0.wrapping_mul(hash_constants::SEP))
    }

    /// Hash of a free function.
    #[inline]
    pub const fn from_function(name: &str) -> Self {
        TypeHash(hash_constants::FUNCTION ^ xxh64(name.as_bytes(), 0))
    }

    /// Hash of a method, distinguished by its owner.
    #[inline]
    pub const fn from_method(owner: TypeHash, name: &str) -> Self {
        TypeHash(hash_constants::METHOD ^ owner.0.wrapping_mul(hash_constants::SEP) ^ xxh64(name.as_bytes(), 0))
    }

    /// Hash of a property, distinguished by its owner.
    #[inline]
    pub const fn from_property(owner: TypeHash, name: &str) -> Self {
        TypeHash(hash_constants::PROPERTY ^ owner.0.wrapping_mul(hash_constants::SEP) ^ xxh64(name.as_bytes(), 0))
    }

    /// Check if this is an empty/invalid hash.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Get the underlying u64 value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Hashes of the built-in scalar types.
pub mod primitives {
    use super::TypeHash;

    /// Hash for `void`
    pub const VOID: TypeHash = TypeHash::from_name("void");

    /// Hash for `bool`
    pub const BOOL: TypeHash = TypeHash::from_name("bool");

    /// Hash for `short` (16-bit signed integer)
    pub const INT16: TypeHash = TypeHash::from_name("short");

    /// Hash for `int` (32-bit signed integer)
    pub const INT32: TypeHash = TypeHash::from_name("int");

    /// Hash for `float`
    pub const FLOAT: TypeHash = TypeHash::from_name("float");

    /// Hash for `double`
    pub const DOUBLE: TypeHash = TypeHash::from_name("double");

    /// Hash for `string`
    pub const STRING: TypeHash = TypeHash::from_name("string");

    /// Every primitive with its name, in registration order.
    pub const ALL: [(&str, TypeHash); 7] = [
        ("void", VOID),
        ("bool", BOOL),
        ("short", INT16),
        ("int", INT32),
        ("float", FLOAT),
        ("double", DOUBLE),
        ("string", STRING),
    ];
}
