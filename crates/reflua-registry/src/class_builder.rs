//! ClassBuilder for registering native classes.
//!
//! ```
//! use reflua_core::Reflect;
//! use reflua_registry::TypeRegistry;
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
//! let mut registry = TypeRegistry::with_primitives();
//! registry
//!     .register_class::<Vec2>()
//!     .constructor()
//!     .property("x", |v: &Vec2| v.x, |v: &mut Vec2, x| v.x = x)?
//!     .property("y", |v: &Vec2| v.y, |v: &mut Vec2, y| v.y = y)?
//!     .method("length", |v: &Vec2| v.x.abs() + v.y.abs())?
//!     .build()?;
//!
//! assert!(registry.get_by_name("Vec").is_some());
//! assert!(registry.get_by_name("Vec*").is_some());
//! # Ok::<(), reflua_core::RegistrationError>(())
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use reflua_core::{
    FromVariant, IntoMethod, IntoVariant, MethodEntry, PropertyEntry, Reflect,
    RegistrationError, TypeEntry, TypeHash, Variant,
};

use crate::TypeRegistry;

/// Fluent builder for a class `T`.
///
/// Created by [`TypeRegistry::register_class`]. Nothing is registered until
/// [`build`](Self::build), which also registers the pointer type `T*`.
pub struct ClassBuilder<'r, T: Reflect> {
    registry: &'r mut TypeRegistry,
    entry: TypeEntry,
    _marker: PhantomData<T>,
}

impl<'r, T: Reflect> ClassBuilder<'r, T> {
    pub(crate) fn new(registry: &'r mut TypeRegistry) -> Self {
        Self {
            registry,
            entry: TypeEntry::class(T::type_name(), T::type_hash()),
            _marker: PhantomData,
        }
    }

    /// Use `T::default()` as the default constructor.
    pub fn constructor(self) -> Self
    where
        T: Default,
    {
        self.constructor_with(T::default)
    }

    /// Use `f` as the default constructor.
    pub fn constructor_with<F>(mut self, f: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.entry.constructor = Some(Arc::new(move || Variant::new(f())));
        self
    }

    /// Register a read-write property.
    pub fn property<V, G, S>(
        mut self,
        name: &str,
        getter: G,
        setter: S,
    ) -> Result<Self, RegistrationError>
    where
        V: FromVariant + IntoVariant,
        G: Fn(&T) -> V + Send + Sync + 'static,
        S: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.entry.add_property(PropertyEntry::read_write(
            T::type_hash(),
            name,
            getter,
            setter,
        ))?;
        Ok(self)
    }

    /// Register a read-only property.
    pub fn property_get<V, G>(mut self, name: &str, getter: G) -> Result<Self, RegistrationError>
    where
        V: IntoVariant,
        G: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.entry
            .add_property(PropertyEntry::read_only(T::type_hash(), name, getter))?;
        Ok(self)
    }

    /// Register a method taking `&T` or `&mut T` plus up to four arguments.
    pub fn method<F, M>(mut self, name: &str, f: F) -> Result<Self, RegistrationError>
    where
        F: IntoMethod<T, M>,
    {
        let owner = T::type_hash();
        let func = <F as IntoMethod<T, M>>::into_native_fn(f, TypeHash::from_method(owner, name));
        self.entry.add_method(MethodEntry::method(
            owner,
            name,
            <F as IntoMethod<T, M>>::param_types(),
            <F as IntoMethod<T, M>>::return_type(),
            func,
        ))?;
        Ok(self)
    }

    /// Register the class and its pointer type.
    pub fn build(self) -> Result<TypeHash, RegistrationError> {
        let hash = self.entry.type_hash;
        let pointer = TypeEntry::pointer_to(&self.entry);
        self.registry.register_type(self.entry)?;
        self.registry.register_type(pointer)?;
        Ok(hash)
    }
}
