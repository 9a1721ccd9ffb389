//! Member entries: methods, free functions and properties.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::{FromVariant, IntoVariant, NativeFn, TypeHash, Variant};

/// Registry entry for a method or free function.
///
/// Free functions have no owner and are invoked without an instance.
#[derive(Debug, Clone)]
pub struct MethodEntry {
    /// Script-visible name.
    pub name: String,
    /// Member identity.
    pub hash: TypeHash,
    /// Owning type, `None` for free functions.
    pub owner: Option<TypeHash>,
    /// Declared parameter types, receiver excluded.
    pub params: Vec<TypeHash>,
    /// Declared return type.
    pub return_type: TypeHash,
    /// Native implementation.
    pub func: NativeFn,
}

impl MethodEntry {
    /// Create a method entry owned by `owner`.
    pub fn method(
        owner: TypeHash,
        name: impl Into<String>,
        params: Vec<TypeHash>,
        return_type: TypeHash,
        func: NativeFn,
    ) -> Self {
        let name = name.into();
        Self {
            hash: TypeHash::from_method(owner, &name),
            name,
            owner: Some(owner),
            params,
            return_type,
            func,
        }
    }

    /// Create a free function entry.
    pub fn function(
        name: impl Into<String>,
        params: Vec<TypeHash>,
        return_type: TypeHash,
        func: NativeFn,
    ) -> Self {
        let name = name.into();
        Self {
            hash: TypeHash::from_function(&name),
            name,
            owner: None,
            params,
            return_type,
            func,
        }
    }

    /// Number of declared parameters.
    #[inline]
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Whether this is a free function.
    pub fn is_function(&self) -> bool {
        self.owner.is_none()
    }

    /// Invoke the native implementation.
    #[inline]
    pub fn invoke(&self, instance: Option<&mut Variant>, args: &[Variant]) -> Variant {
        self.func.call(instance, args)
    }
}

/// Property read accessor.
pub type Getter = Arc<dyn Fn(&Variant) -> Variant + Send + Sync>;

/// Property write accessor. Returns `false` when the write did not happen.
pub type Setter = Arc<dyn Fn(&mut Variant, &Variant) -> bool + Send + Sync>;

/// Registry entry for a property.
#[derive(Clone)]
pub struct PropertyEntry {
    /// Script-visible name.
    pub name: String,
    /// Member identity.
    pub hash: TypeHash,
    /// Declared value type.
    pub value_type: TypeHash,
    getter: Getter,
    setter: Option<Setter>,
}

impl PropertyEntry {
    /// Create a property from raw accessors.
    pub fn new(
        owner: TypeHash,
        name: impl Into<String>,
        value_type: TypeHash,
        getter: Getter,
        setter: Option<Setter>,
    ) -> Self {
        let name = name.into();
        Self {
            hash: TypeHash::from_property(owner, &name),
            name,
            value_type,
            getter,
            setter,
        }
    }

    /// Create a read-write property from typed accessors on `T`.
    ///
    /// The instance may hold `T` by value or through a shared handle.
    pub fn read_write<T, V>(
        owner: TypeHash,
        name: impl Into<String>,
        get: impl Fn(&T) -> V + Send + Sync + 'static,
        set: impl Fn(&mut T, V) + Send + Sync + 'static,
    ) -> Self
    where
        T: Any,
        V: FromVariant + IntoVariant,
    {
        let setter: Setter = Arc::new(move |instance: &mut Variant, value: &Variant| {
            let Ok(value) = V::from_variant(value) else {
                return false;
            };
            instance.with_mut(|this: &mut T| set(this, value)).is_some()
        });
        Self::new(
            owner,
            name,
            V::produced_type(),
            Self::typed_getter(get),
            Some(setter),
        )
    }

    /// Create a read-only property from a typed accessor on `T`.
    pub fn read_only<T, V>(
        owner: TypeHash,
        name: impl Into<String>,
        get: impl Fn(&T) -> V + Send + Sync + 'static,
    ) -> Self
    where
        T: Any,
        V: IntoVariant,
    {
        Self::new(owner, name, V::produced_type(), Self::typed_getter(get), None)
    }

    fn typed_getter<T: Any, V: IntoVariant>(
        get: impl Fn(&T) -> V + Send + Sync + 'static,
    ) -> Getter {
        Arc::new(move |instance: &Variant| {
            instance
                .with_ref(|this: &T| get(this))
                .map(IntoVariant::into_variant)
                .unwrap_or(Variant::Invalid(V::produced_type()))
        })
    }

    /// Read the property. `Invalid` when the instance is not of the owner type.
    pub fn get(&self, instance: &Variant) -> Variant {
        (self.getter)(instance)
    }

    /// Write the property. `false` if read-only or the write failed.
    pub fn set(&self, instance: &mut Variant, value: &Variant) -> bool {
        match &self.setter {
            Some(setter) => setter(instance, value),
            None => false,
        }
    }

    /// Whether the property has no setter.
    pub fn is_read_only(&self) -> bool {
        self.setter.is_none()
    }
}

impl fmt::Debug for PropertyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyEntry")
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .field("read_only", &self.is_read_only())
            .finish_non_exhaustive()
    }
}
