//! Type-erased native callables.
//!
//! Registered methods and free functions are stored as [`NativeFn`]s. A
//! `NativeFn` takes the receiver (for methods) and the already-marshalled
//! arguments as [`Variant`]s and produces a `Variant` result. A failed call
//! (wrong argument count, wrong argument type, missing receiver) yields
//! [`Variant::Invalid`] tagged with the type that was expected.
//!
//! Typed Rust closures are turned into `NativeFn`s through [`IntoMethod`] and
//! [`IntoFunction`], which also report parameter and return types.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::{FromVariant, IntoVariant, TypeHash, Variant};

/// Type-erased native function.
///
/// The inner callable is shared, so cloning a `NativeFn` is cheap.
pub struct NativeFn {
    /// Identity of the member this function implements.
    pub id: TypeHash,
    inner: Arc<dyn NativeCallable + Send + Sync>,
}

impl NativeFn {
    /// Wrap a callable under the given member id.
    pub fn new<F>(id: TypeHash, f: F) -> Self
    where
        F: NativeCallable + Send + Sync + 'static,
    {
        Self {
            id,
            inner: Arc::new(f),
        }
    }

    /// Invoke with an optional receiver.
    #[inline]
    pub fn call(&self, instance: Option<&mut Variant>, args: &[Variant]) -> Variant {
        self.inner.call(instance, args)
    }
}

impl Clone for NativeFn {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFn")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Trait for callable native functions.
pub trait NativeCallable {
    /// Call with the receiver (if any) and positional arguments.
    fn call(&self, instance: Option<&mut Variant>, args: &[Variant]) -> Variant;
}

impl<F> NativeCallable for F
where
    F: Fn(Option<&mut Variant>, &[Variant]) -> Variant,
{
    fn call(&self, instance: Option<&mut Variant>, args: &[Variant]) -> Variant {
        (self)(instance, args)
    }
}

/// Marker for methods taking `&T`.
pub struct ByRef<Sig>(PhantomData<Sig>);

/// Marker for methods taking `&mut T`.
pub struct ByMut<Sig>(PhantomData<Sig>);

/// Conversion from a typed Rust closure into a method on `T`.
///
/// The receiver may be stored by value or behind a [`Shared`](crate::Shared)
/// handle; both resolve to the same `&T` / `&mut T`.
pub trait IntoMethod<T, Marker> {
    /// Declared parameter types, in order (receiver excluded).
    fn param_types() -> Vec<TypeHash>;
    /// Declared return type.
    fn return_type() -> TypeHash;
    /// Erase into a [`NativeFn`].
    fn into_native_fn(self, id: TypeHash) -> NativeFn;
}

/// Conversion from a typed Rust closure into a free function.
pub trait IntoFunction<Marker> {
    /// Declared parameter types, in order.
    fn param_types() -> Vec<TypeHash>;
    /// Declared return type.
    fn return_type() -> TypeHash;
    /// Erase into a [`NativeFn`].
    fn into_native_fn(self, id: TypeHash) -> NativeFn;
}

// Unpacks `$args` into typed values or returns `Invalid` from the enclosing
// closure.
macro_rules! unpack_args {
    ($args:ident, $ret:ty; $($arg:ident $val:ident),*) => {
        let [$($val),*] = $args else {
            return Variant::Invalid(<$ret as IntoVariant>::produced_type());
        };
        $(
            let Ok($val) = <$arg as FromVariant>::from_variant($val) else {
                return Variant::Invalid(<$arg as FromVariant>::expected_type());
            };
        )*
    };
}

macro_rules! impl_callables {
    ($($arg:ident $val:ident),*) => {
        impl<T, F, R, $($arg,)*> IntoMethod<T, ByRef<fn($($arg),*) -> R>> for F
        where
            T: Any,
            F: Fn(&T, $($arg),*) -> R + Send + Sync + 'static,
            R: IntoVariant,
            $($arg: FromVariant,)*
        {
            fn param_types() -> Vec<TypeHash> {
                vec![$(<$arg as FromVariant>::expected_type()),*]
            }

            fn return_type() -> TypeHash {
                R::produced_type()
            }

            fn into_native_fn(self, id: TypeHash) -> NativeFn {
                NativeFn::new(id, move |instance: Option<&mut Variant>, args: &[Variant]| {
                    unpack_args!(args, R; $($arg $val),*);
                    let Some(instance) = instance else {
                        return Variant::Invalid(TypeHash::EMPTY);
                    };
                    let expected = instance.type_hash();
                    match instance.with_ref(|this: &T| (self)(this, $($val),*)) {
                        Some(result) => result.into_variant(),
                        None => Variant::Invalid(expected),
                    }
                })
            }
        }

        impl<T, F, R, $($arg,)*> IntoMethod<T, ByMut<fn($($arg),*) -> R>> for F
        where
            T: Any,
            F: Fn(&mut T, $($arg),*) -> R + Send + Sync + 'static,
            R: IntoVariant,
            $($arg: FromVariant,)*
        {
            fn param_types() -> Vec<TypeHash> {
                vec![$(<$arg as FromVariant>::expected_type()),*]
            }

            fn return_type() -> TypeHash {
                R::produced_type()
            }

            fn into_native_fn(self, id: TypeHash) -> NativeFn {
                NativeFn::new(id, move |instance: Option<&mut Variant>, args: &[Variant]| {
                    unpack_args!(args, R; $($arg $val),*);
                    let Some(instance) = instance else {
                        return Variant::Invalid(TypeHash::EMPTY);
                    };
                    let expected = instance.type_hash();
                    match instance.with_mut(|this: &mut T| (self)(this, $($val),*)) {
                        Some(result) => result.into_variant(),
                        None => Variant::Invalid(expected),
                    }
                })
            }
        }

        impl<F, R, $($arg,)*> IntoFunction<fn($($arg),*) -> R> for F
        where
            F: Fn($($arg),*) -> R + Send + Sync + 'static,
            R: IntoVariant,
            $($arg: FromVariant,)*
        {
            fn param_types() -> Vec<TypeHash> {
                vec![$(<$arg as FromVariant>::expected_type()),*]
            }

            fn return_type() -> TypeHash {
                R::produced_type()
            }

            fn into_native_fn(self, id: TypeHash) -> NativeFn {
                NativeFn::new(id, move |_instance: Option<&mut Variant>, args: &[Variant]| {
                    unpack_args!(args, R; $($arg $val),*);
                    (self)($($val),*).into_variant()
                })
            }
        }
    };
}

impl_callables!();
impl_callables!(A a);
impl_callables!(A a, B b);
impl_callables!(A a, B b, C c);
impl_callables!(A a, B b, C c, D d);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Reflect, primitives, shared};

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Counter {
        value: i32,
    }

    impl Reflect for Counter {
        fn type_name() -> &'static str {
            "Counter"
        }
    }

    fn method<M>(f: impl IntoMethod<Counter, M>) -> NativeFn {
        IntoMethod::into_native_fn(f, TypeHash::from_method(Counter::type_hash(), "test"))
    }

    // ========================================================================
    // Methods
    // ========================================================================

    #[test]
    fn by_ref_method_reads_receiver() {
        let f = method(|c: &Counter| c.value * 2);
        let mut this = Variant::new(Counter { value: 21 });
        let result = f.call(Some(&mut this), &[]);
        assert_eq!(result.get_value::<i32>(), Some(42));
    }

    #[test]
    fn by_mut_method_mutates_receiver() {
        let f = method(|c: &mut Counter, by: i32| c.value += by);
        let mut this = Variant::new(Counter { value: 1 });
        let result = f.call(Some(&mut this), &[Variant::new(4i32)]);
        assert!(result.is_void());
        assert_eq!(this.get_value::<Counter>(), Some(Counter { value: 5 }));
    }

    #[test]
    fn method_through_shared_receiver() {
        let handle = shared(Counter { value: 1 });
        let f = method(|c: &mut Counter| c.value = 10);
        let mut this = Variant::from_shared(handle.clone());
        f.call(Some(&mut this), &[]);
        assert_eq!(handle.borrow().value, 10);
    }

    #[test]
    fn method_reports_signature() {
        fn sig<M, F: IntoMethod<Counter, M>>(_: &F) -> (Vec<TypeHash>, TypeHash) {
            (F::param_types(), F::return_type())
        }

        let f = |_: &Counter, _: i16, _: i32| -> f64 { 0.0 };
        assert_eq!(
            sig(&f),
            (vec![primitives::INT16, primitives::INT32], primitives::DOUBLE)
        );
    }

    #[test]
    fn wrong_argument_count_is_invalid() {
        let f = method(|c: &Counter, by: i32| c.value + by);
        let mut this = Variant::new(Counter::default());
        assert!(!f.call(Some(&mut this), &[]).is_valid());
    }

    #[test]
    fn wrong_argument_type_is_invalid() {
        let f = method(|c: &Counter, by: i32| c.value + by);
        let mut this = Variant::new(Counter::default());
        let result = f.call(Some(&mut this), &[Variant::new(1i16)]);
        assert!(!result.is_valid());
        assert_eq!(result.type_hash(), primitives::INT32);
    }

    #[test]
    fn missing_receiver_is_invalid() {
        let f = method(|c: &Counter| c.value);
        assert!(!f.call(None, &[]).is_valid());
    }

    #[test]
    fn receiver_of_other_type_is_invalid() {
        let f = method(|c: &Counter| c.value);
        let mut this = Variant::new(3i32);
        let result = f.call(Some(&mut this), &[]);
        assert!(!result.is_valid());
        assert_eq!(result.type_hash(), primitives::INT32);
    }

    // ========================================================================
    // Free functions
    // ========================================================================

    #[test]
    fn free_function_call() {
        fn add(a: i32, b: i32) -> i32 {
            a + b
        }

        let f = IntoFunction::into_native_fn(add, TypeHash::from_function("add"));
        let result = f.call(None, &[Variant::new(2i32), Variant::new(3i32)]);
        assert_eq!(result.get_value::<i32>(), Some(5));
        assert_eq!(f.id, TypeHash::from_function("add"));
    }

    #[test]
    fn free_function_returning_class() {
        let f = IntoFunction::into_native_fn(|| Counter { value: 9 }, TypeHash::from_function("make"));
        let result = f.call(None, &[]);
        assert_eq!(result.type_hash(), Counter::type_hash());
    }

    #[test]
    fn native_fn_clone_shares_callable() {
        let f = IntoFunction::into_native_fn(|| 1i32, TypeHash::from_function("one"));
        let g = f.clone();
        assert_eq!(g.id, f.id);
        assert_eq!(g.call(None, &[]).get_value::<i32>(), Some(1));
    }
}
