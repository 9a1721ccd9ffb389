//! Registry entry for a type.

use std::fmt;
use std::sync::Arc;

use crate::{RegistrationError, TypeFlags, TypeHash, Variant};

use super::{MethodEntry, PropertyEntry};

/// Default constructor producing a fresh value of the type.
pub type Constructor = Arc<dyn Fn() -> Variant + Send + Sync>;

/// Registry entry for a primitive, class or pointer type.
#[derive(Clone)]
pub struct TypeEntry {
    /// Script-visible name (`T*` for pointers).
    pub name: String,
    /// Type identity.
    pub type_hash: TypeHash,
    /// Kind flags.
    pub flags: TypeFlags,
    /// Pointee of a pointer type.
    pub pointee: Option<TypeHash>,

    // === Members ===
    /// Methods, in registration order.
    pub methods: Vec<MethodEntry>,
    /// Properties, in registration order.
    pub properties: Vec<PropertyEntry>,
    /// Default constructor.
    pub constructor: Option<Constructor>,
}

impl TypeEntry {
    /// Create a built-in scalar entry.
    pub fn primitive(name: impl Into<String>, type_hash: TypeHash) -> Self {
        let mut entry = Self::empty(name.into(), type_hash, TypeFlags::PRIMITIVE);
        if entry.name == "void" {
            entry.flags |= TypeFlags::VOID;
        }
        entry
    }

    /// Create an empty class entry.
    pub fn class(name: impl Into<String>, type_hash: TypeHash) -> Self {
        Self::empty(name.into(), type_hash, TypeFlags::CLASS)
    }

    /// Create the pointer type for `pointee`.
    pub fn pointer_to(pointee: &TypeEntry) -> Self {
        let mut entry = Self::empty(
            format!("{}*", pointee.name),
            TypeHash::pointer_to(pointee.type_hash),
            TypeFlags::POINTER,
        );
        entry.pointee = Some(pointee.type_hash);
        entry
    }

    fn empty(name: String, type_hash: TypeHash, flags: TypeFlags) -> Self {
        Self {
            name,
            type_hash,
            flags,
            pointee: None,
            methods: Vec::new(),
            properties: Vec::new(),
            constructor: None,
        }
    }

    /// Builder: set the default constructor.
    pub fn with_constructor(mut self, constructor: Constructor) -> Self {
        self.constructor = Some(constructor);
        self
    }

    // ==========================================================================
    // Classification
    // ==========================================================================

    /// Whether this is a user class.
    #[inline]
    pub fn is_class(&self) -> bool {
        self.flags.contains(TypeFlags::CLASS)
    }

    /// Whether this is a pointer type.
    #[inline]
    pub fn is_pointer(&self) -> bool {
        self.flags.contains(TypeFlags::POINTER)
    }

    /// Whether this is a built-in scalar.
    #[inline]
    pub fn is_primitive(&self) -> bool {
        self.flags.contains(TypeFlags::PRIMITIVE)
    }

    /// The type members are dispatched against: the pointee for pointers,
    /// the type itself otherwise.
    #[inline]
    pub fn raw_type(&self) -> TypeHash {
        self.pointee.unwrap_or(self.type_hash)
    }

    // ==========================================================================
    // Members
    // ==========================================================================

    /// Find a method by name.
    pub fn method(&self, name: &str) -> Option<&MethodEntry> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Find a property by name.
    pub fn property(&self, name: &str) -> Option<&PropertyEntry> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Add a method, rejecting a name already used by a member.
    pub fn add_method(&mut self, method: MethodEntry) -> Result<(), RegistrationError> {
        self.check_unique(&method.name)?;
        self.methods.push(method);
        Ok(())
    }

    /// Add a property, rejecting a name already used by a member.
    pub fn add_property(&mut self, property: PropertyEntry) -> Result<(), RegistrationError> {
        self.check_unique(&property.name)?;
        self.properties.push(property);
        Ok(())
    }

    fn check_unique(&self, name: &str) -> Result<(), RegistrationError> {
        if self.method(name).is_some() || self.property(name).is_some() {
            return Err(RegistrationError::DuplicateMember {
                owner: self.name.clone(),
                member: name.to_string(),
            });
        }
        Ok(())
    }

    /// Default-construct a value. `None` without a constructor.
    pub fn construct(&self) -> Option<Variant> {
        self.constructor.as_ref().map(|ctor| ctor())
    }
}

impl fmt::Debug for TypeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeEntry")
            .field("name", &self.name)
            .field("type_hash", &self.type_hash)
            .field("flags", &self.flags)
            .field("pointee", &self.pointee)
            .field("methods", &self.methods)
            .field("properties", &self.properties)
            .field("constructor", &self.constructor.is_some())
            .finish()
    }
}
