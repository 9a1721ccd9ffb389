//! TypeRegistry - storage for registered types and free functions.
//!
//! Types are stored by [`TypeHash`] with a name index and a registration-order
//! list, so enumeration is deterministic. Free functions are kept in
//! registration order as well.
//!
//! The registry is populated single-threaded and becomes read-only once the
//! bridge is bound.
//!
//! # Example
//!
//! ```
//! use reflua_registry::TypeRegistry;
//! use reflua_core::primitives;
//!
//! let mut registry = TypeRegistry::with_primitives();
//! registry.register_function("twice", |x: i32| x * 2).unwrap();
//!
//! assert!(registry.get(primitives::INT32).is_some());
//! assert!(registry.function("twice").is_some());
//! ```

use rustc_hash::FxHashMap;

use reflua_core::{
    IntoFunction, MethodEntry, Reflect, RegistrationError, TypeEntry, TypeHash, primitives,
};

use crate::ClassBuilder;

/// Registry of types and free functions.
#[derive(Default)]
pub struct TypeRegistry {
    /// Types by hash.
    types: FxHashMap<TypeHash, TypeEntry>,
    /// Name index.
    by_name: FxHashMap<String, TypeHash>,
    /// Registration order.
    order: Vec<TypeHash>,
    /// Free functions in registration order.
    functions: Vec<MethodEntry>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in scalars registered.
    pub fn with_primitives() -> Self {
        let mut registry = Self::new();
        registry.register_all_primitives();
        registry
    }

    /// Register every built-in scalar that is not registered yet.
    pub fn register_all_primitives(&mut self) {
        for (name, hash) in primitives::ALL {
            if !self.types.contains_key(&hash) {
                self.insert(TypeEntry::primitive(name, hash));
            }
        }
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Start registering class `T`.
    pub fn register_class<T: Reflect>(&mut self) -> ClassBuilder<'_, T> {
        ClassBuilder::new(self)
    }

    /// Register a fully built type entry.
    pub fn register_type(&mut self, entry: TypeEntry) -> Result<(), RegistrationError> {
        if self.types.contains_key(&entry.type_hash) || self.by_name.contains_key(&entry.name) {
            return Err(RegistrationError::DuplicateType(entry.name));
        }
        if let Some(pointee) = entry.pointee
            && !self.types.contains_key(&pointee)
        {
            return Err(RegistrationError::UnknownType(entry.name));
        }
        log::debug!("registered type '{}' ({})", entry.name, entry.type_hash);
        self.insert(entry);
        Ok(())
    }

    /// Register a free function.
    pub fn register_function<F, M>(
        &mut self,
        name: impl Into<String>,
        f: F,
    ) -> Result<(), RegistrationError>
    where
        F: IntoFunction<M>,
    {
        let name = name.into();
        if self.function(&name).is_some() {
            return Err(RegistrationError::DuplicateMember {
                owner: "Global".to_string(),
                member: name,
            });
        }
        let hash = TypeHash::from_function(&name);
        let func = <F as IntoFunction<M>>::into_native_fn(f, hash);
        log::debug!("registered function '{}'", name);
        self.functions.push(MethodEntry::function(
            name,
            <F as IntoFunction<M>>::param_types(),
            <F as IntoFunction<M>>::return_type(),
            func,
        ));
        Ok(())
    }

    fn insert(&mut self, entry: TypeEntry) {
        self.by_name.insert(entry.name.clone(), entry.type_hash);
        self.order.push(entry.type_hash);
        self.types.insert(entry.type_hash, entry);
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Get a type by hash.
    pub fn get(&self, hash: TypeHash) -> Option<&TypeEntry> {
        self.types.get(&hash)
    }

    /// Get a type by name.
    pub fn get_by_name(&self, name: &str) -> Option<&TypeEntry> {
        self.by_name.get(name).and_then(|hash| self.types.get(hash))
    }

    /// Check if a type is registered.
    pub fn contains(&self, hash: TypeHash) -> bool {
        self.types.contains_key(&hash)
    }

    /// Get the entry members of `hash` dispatch against: the pointee for a
    /// pointer type, the type itself otherwise.
    pub fn resolve(&self, hash: TypeHash) -> Option<&TypeEntry> {
        let entry = self.types.get(&hash)?;
        match entry.pointee {
            Some(pointee) => self.types.get(&pointee),
            None => Some(entry),
        }
    }

    /// Name of a registered type, or `"<unknown>"`.
    pub fn type_name(&self, hash: TypeHash) -> &str {
        self.types
            .get(&hash)
            .map(|e| e.name.as_str())
            .unwrap_or("<unknown>")
    }

    /// Get a free function by name.
    pub fn function(&self, name: &str) -> Option<&MethodEntry> {
        self.functions.iter().find(|f| f.name == name)
    }

    // ==========================================================================
    // Enumeration
    // ==========================================================================

    /// All types in registration order.
    pub fn types(&self) -> impl Iterator<Item = &TypeEntry> {
        self.order.iter().filter_map(|hash| self.types.get(hash))
    }

    /// Class types in registration order.
    pub fn classes(&self) -> impl Iterator<Item = &TypeEntry> {
        self.types().filter(|e| e.is_class())
    }

    /// Free functions in registration order.
    pub fn global_functions(&self) -> &[MethodEntry] {
        &self.functions
    }

    /// Number of registered types.
    pub fn type_count(&self) -> usize {
        self.types.len()
    }
}
