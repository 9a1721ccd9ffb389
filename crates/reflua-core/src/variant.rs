//! Dynamic value produced and consumed by reflected calls.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::{Reflect, Shared, TypeHash, primitives};

/// Object-safe view of a boxed native payload.
///
/// Implemented for every `Any + Clone` type, so any registered value can be
/// stored in a [`Variant`] and copied out of it.
pub trait NativeValue: Any {
    /// Copy the payload into a new box.
    fn clone_value(&self) -> Box<dyn NativeValue>;
    /// Upcast for downcasting.
    fn as_any(&self) -> &dyn Any;
    /// Upcast for mutable downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any + Clone> NativeValue for T {
    fn clone_value(&self) -> Box<dyn NativeValue> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Result of invoking a reflected member, and the payload stored inside
/// every script-owned native instance.
///
/// - `Invalid` reports a failed call, remembering the type that was expected.
/// - `Void` is the result of members that return nothing.
/// - `Value` carries a typed payload tagged with its [`TypeHash`].
pub enum Variant {
    /// Failure
    Invalid(TypeHash),
    /// No value
    Void,
    /// Typed payload
    Value {
        /// Registered type of the payload
        type_hash: TypeHash,
        /// The payload itself
        value: Box<dyn NativeValue>,
    },
}

impl Variant {
    /// Wrap a registered value.
    pub fn new<T: Reflect>(value: T) -> Self {
        Variant::Value {
            type_hash: T::type_hash(),
            value: Box::new(value),
        }
    }

    /// Wrap a shared handle; the variant is typed as the pointer to `T`.
    pub fn from_shared<T: Reflect>(handle: Shared<T>) -> Self {
        Variant::Value {
            type_hash: TypeHash::pointer_to(T::type_hash()),
            value: Box::new(handle),
        }
    }

    /// Wrap an arbitrary cloneable value under an explicit type hash.
    pub fn with_type<T: Any + Clone>(type_hash: TypeHash, value: T) -> Self {
        Variant::Value {
            type_hash,
            value: Box::new(value),
        }
    }

    /// `false` for [`Variant::Invalid`].
    pub fn is_valid(&self) -> bool {
        !matches!(self, Variant::Invalid(_))
    }

    /// `true` for [`Variant::Void`].
    pub fn is_void(&self) -> bool {
        matches!(self, Variant::Void)
    }

    /// The type this variant holds (or was expected to hold).
    pub fn type_hash(&self) -> TypeHash {
        match self {
            Variant::Invalid(hash) => *hash,
            Variant::Void => primitives::VOID,
            Variant::Value { type_hash, .. } => *type_hash,
        }
    }

    /// Check the payload's registered type.
    pub fn is_type<T: Reflect>(&self) -> bool {
        matches!(self, Variant::Value { type_hash, .. } if *type_hash == T::type_hash())
    }

    /// Borrow the payload as `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Variant::Value { value, .. } => (**value).as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Mutably borrow the payload as `T`.
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        match self {
            Variant::Value { value, .. } => (**value).as_any_mut().downcast_mut::<T>(),
            _ => None,
        }
    }

    /// Copy the payload out as `T`.
    pub fn get_value<T: Any + Clone>(&self) -> Option<T> {
        self.downcast_ref::<T>().cloned()
    }

    /// Run `f` against the `T` this variant refers to.
    ///
    /// Works for a `T` held by value and for a [`Shared<T>`] handle. Returns
    /// `None` on a type mismatch or when the shared value is mutably borrowed.
    pub fn with_ref<T: Any, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        if let Some(value) = self.downcast_ref::<T>() {
            return Some(f(value));
        }
        let handle = self.downcast_ref::<Rc<RefCell<T>>>()?;
        let guard = handle.try_borrow().ok()?;
        Some(f(&guard))
    }

    /// Run `f` against the `T` this variant refers to, mutably.
    ///
    /// Mutating through a [`Shared<T>`] handle is visible to every holder.
    pub fn with_mut<T: Any, R>(&mut self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        if let Some(value) = self.downcast_mut::<T>() {
            return Some(f(value));
        }
        let handle = self.downcast_ref::<Rc<RefCell<T>>>()?;
        let mut guard = handle.try_borrow_mut().ok()?;
        Some(f(&mut guard))
    }
}

impl Clone for Variant {
    fn clone(&self) -> Self {
        match self {
            Variant::Invalid(hash) => Variant::Invalid(*hash),
            Variant::Void => Variant::Void,
            Variant::Value { type_hash, value } => Variant::Value {
                type_hash: *type_hash,
                value: (**value).clone_value(),
            },
        }
    }
}

impl fmt::Debug for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Invalid(hash) => write!(f, "Invalid({:?})", hash),
            Variant::Void => write!(f, "Void"),
            Variant::Value { type_hash, .. } => write!(f, "Value({:?})", type_hash),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Point {
        x: i32,
    }

    impl Reflect for Point {
        fn type_name() -> &'static str {
            "Point"
        }
    }

    #[test]
    fn variant_type_hashes() {
        assert_eq!(Variant::Void.type_hash(), primitives::VOID);
        assert_eq!(Variant::new(1i32).type_hash(), primitives::INT32);
        assert_eq!(Variant::Invalid(primitives::INT16).type_hash(), primitives::INT16);
    }

    #[test]
    fn variant_validity() {
        assert!(!Variant::Invalid(TypeHash::EMPTY).is_valid());
        assert!(Variant::Void.is_valid());
        assert!(Variant::Void.is_void());
        assert!(!Variant::new(1i16).is_void());
    }

    #[test]
    fn variant_downcast() {
        let mut v = Variant::new(Point { x: 3 });
        assert!(v.is_type::<Point>());
        assert_eq!(v.downcast_ref::<Point>(), Some(&Point { x: 3 }));
        assert!(v.downcast_ref::<i32>().is_none());

        v.downcast_mut::<Point>().unwrap().x = 4;
        assert_eq!(v.get_value::<Point>(), Some(Point { x: 4 }));
    }

    #[test]
    fn clone_copies_payload() {
        let original = Variant::new(Point { x: 1 });
        let mut copy = original.clone();
        copy.with_mut(|p: &mut Point| p.x = 9);

        assert_eq!(original.get_value::<Point>(), Some(Point { x: 1 }));
        assert_eq!(copy.get_value::<Point>(), Some(Point { x: 9 }));
    }

    #[test]
    fn shared_variant_is_pointer_typed() {
        let handle = shared(Point { x: 2 });
        let v = Variant::from_shared(handle.clone());
        assert_eq!(v.type_hash(), TypeHash::pointer_to(Point::type_hash()));
        assert!(!v.is_type::<Point>());
    }

    #[test]
    fn shared_variant_mutation_is_visible() {
        let handle = shared(Point { x: 2 });
        let mut v = Variant::from_shared(handle.clone());
        let copy = v.clone();

        assert_eq!(v.with_mut(|p: &mut Point| { p.x += 1; p.x }), Some(3));
        assert_eq!(handle.borrow().x, 3);
        assert_eq!(copy.with_ref(|p: &Point| p.x), Some(3));
    }

    #[test]
    fn with_ref_rejects_wrong_type() {
        let v = Variant::new(5i32);
        assert!(v.with_ref(|p: &Point| p.x).is_none());
        assert!(Variant::Void.with_ref(|x: &i32| *x).is_none());
    }

    #[test]
    fn borrowed_shared_value_is_refused() {
        let handle = shared(Point { x: 2 });
        let mut v = Variant::from_shared(handle.clone());
        let _guard = handle.borrow();
        assert!(v.with_mut(|p: &mut Point| p.x = 0).is_none());
    }
}
