//! Value marshalling between Lua values and [`Variant`]s.
//!
//! Scalars are converted through a strategy table keyed by [`TypeHash`]:
//! each [`ScalarConversion`] turns a Lua number into a `Variant` of its type
//! and back. Numbers are converted with C-cast semantics, truncating toward
//! zero and wrapping to the width of the target, so `70000` written to a
//! `short` becomes `4464`.
//!
//! Class and pointer values travel as native instances: arguments are copied
//! out of the userdatum, results are wrapped into a new one.

use mlua::{Lua, MultiValue, Value};
use rustc_hash::FxHashMap;

use reflua_core::{MethodEntry, PropertyEntry, TypeEntry, TypeHash, Variant, primitives};
use reflua_registry::TypeRegistry;

use crate::binder::Bridge;
use crate::error::BridgeError;
use crate::instance::{self, NativeInstance};

/// A Lua number, as integer or float subtype.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptNumber {
    Integer(i64),
    Float(f64),
}

impl ScriptNumber {
    /// Read a number out of a Lua value.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(i) => Some(ScriptNumber::Integer(*i)),
            Value::Number(n) => Some(ScriptNumber::Float(*n)),
            _ => None,
        }
    }

    /// Integer value, truncating floats toward zero.
    #[inline]
    pub fn truncate(self) -> i64 {
        match self {
            ScriptNumber::Integer(i) => i,
            ScriptNumber::Float(f) => f as i64,
        }
    }

    /// Floating point value.
    #[inline]
    pub fn to_f64(self) -> f64 {
        match self {
            ScriptNumber::Integer(i) => i as f64,
            ScriptNumber::Float(f) => f,
        }
    }
}

/// Conversion strategy for one scalar type.
#[derive(Debug, Clone, Copy)]
pub struct ScalarConversion {
    /// Lua number to a variant of the scalar type.
    pub to_native: fn(ScriptNumber) -> Variant,
    /// Variant of the scalar type to a Lua value. `None` on a payload mismatch.
    pub to_script: fn(&Variant) -> Option<Value>,
}

macro_rules! scalar_conversion {
    ($(#[$doc:meta])* $name:ident: $ty:ty, |$n:ident| $native:expr, |$v:ident| $script:expr) => {
        $(#[$doc])*
        pub const $name: ScalarConversion = {
            fn to_native($n: ScriptNumber) -> Variant {
                Variant::new::<$ty>($native)
            }

            fn to_script(value: &Variant) -> Option<Value> {
                value.get_value::<$ty>().map(|$v| $script)
            }

            ScalarConversion {
                to_native,
                to_script,
            }
        };
    };
}

/// Built-in scalar strategies.
pub mod conversions {
    use super::*;

    scalar_conversion!(
        /// `int` (`i32`), sent to Lua as an integer.
        INT: i32, |n| n.truncate() as i32, |v| Value::Integer(v as i64)
    );
    scalar_conversion!(
        /// `short` (`i16`), sent to Lua as an integer.
        SHORT: i16, |n| n.truncate() as i32 as i16, |v| Value::Integer(v as i64)
    );
    scalar_conversion!(
        /// `float` (`f32`).
        FLOAT: f32, |n| n.to_f64() as f32, |v| Value::Number(v as f64)
    );
    scalar_conversion!(
        /// `double` (`f64`).
        DOUBLE: f64, |n| n.to_f64(), |v| Value::Number(v)
    );
}

/// Why a single Lua value could not be converted.
enum Rejection {
    NoStrategy,
    ValueKind(&'static str),
    Mismatch(TypeHash),
}

/// Converts arguments, property values and results between Lua and native.
#[derive(Debug, Clone)]
pub struct Marshaller {
    strategies: FxHashMap<TypeHash, ScalarConversion>,
}

impl Default for Marshaller {
    fn default() -> Self {
        let mut marshaller = Self::empty();
        marshaller.register(primitives::INT32, conversions::INT);
        marshaller.register(primitives::INT16, conversions::SHORT);
        marshaller.register(primitives::FLOAT, conversions::FLOAT);
        marshaller.register(primitives::DOUBLE, conversions::DOUBLE);
        marshaller
    }
}

impl Marshaller {
    /// A marshaller with no scalar strategies.
    pub fn empty() -> Self {
        Self {
            strategies: FxHashMap::default(),
        }
    }

    /// Add or replace the strategy for a scalar type.
    pub fn register(
        &mut self,
        type_hash: TypeHash,
        conversion: ScalarConversion,
    ) -> Option<ScalarConversion> {
        self.strategies.insert(type_hash, conversion)
    }

    /// Strategy for a type, if any.
    pub fn strategy(&self, type_hash: TypeHash) -> Option<&ScalarConversion> {
        self.strategies.get(&type_hash)
    }

    // ==========================================================================
    // Script -> Native
    // ==========================================================================

    /// Convert call arguments to the declared parameter types of `method`.
    ///
    /// `args` must already exclude the receiver.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn script_to_native(
        &self,
        registry: &TypeRegistry,
        method: &MethodEntry,
        args: &[Value],
    ) -> Result<Vec<Variant>, BridgeError> {
        if args.len() != method.param_count() {
            return Err(BridgeError::ArgumentCount {
                member: method.name.clone(),
                expected: method.param_count(),
                actual: args.len(),
            });
        }

        args.iter()
            .zip(&method.params)
            .enumerate()
            .map(|(index, (arg, &param))| {
                let position = index + 1;
                self.value_to_native(arg, param).map_err(|rejection| match rejection {
                    Rejection::NoStrategy => BridgeError::UnsupportedParameterType {
                        type_name: registry.type_name(param).to_string(),
                        position,
                        member: method.name.clone(),
                    },
                    Rejection::ValueKind(kind) => BridgeError::UnsupportedScriptValue {
                        kind,
                        position,
                        member: method.name.clone(),
                    },
                    Rejection::Mismatch(actual) => BridgeError::TypeMismatch {
                        target: format!("parameter {position} of '{}'", method.name),
                        expected: registry.type_name(param).to_string(),
                        actual: registry.type_name(actual).to_string(),
                    },
                })
            })
            .collect()
    }

    /// Convert a value written to `property` of `owner`.
    pub fn property_to_native(
        &self,
        registry: &TypeRegistry,
        owner: &TypeEntry,
        property: &PropertyEntry,
        value: &Value,
    ) -> Result<Variant, BridgeError> {
        self.value_to_native(value, property.value_type)
            .map_err(|rejection| match rejection {
                Rejection::NoStrategy => BridgeError::UnsupportedPropertyType {
                    property: property.name.clone(),
                    type_name: owner.name.clone(),
                    value_type: registry.type_name(property.value_type).to_string(),
                },
                Rejection::ValueKind(kind) => BridgeError::UnsupportedPropertyValue {
                    property: property.name.clone(),
                    type_name: owner.name.clone(),
                    kind,
                },
                Rejection::Mismatch(actual) => BridgeError::TypeMismatch {
                    target: format!("property '{}' of '{}'", property.name, owner.name),
                    expected: registry.type_name(property.value_type).to_string(),
                    actual: registry.type_name(actual).to_string(),
                },
            })
    }

    fn value_to_native(&self, value: &Value, target: TypeHash) -> Result<Variant, Rejection> {
        match value {
            Value::Integer(_) | Value::Number(_) => {
                let conversion = self.strategies.get(&target).ok_or(Rejection::NoStrategy)?;
                let number = ScriptNumber::from_value(value).ok_or(Rejection::NoStrategy)?;
                Ok((conversion.to_native)(number))
            }
            Value::UserData(ud) => {
                let instance = ud
                    .borrow::<NativeInstance>()
                    .map_err(|_| Rejection::ValueKind("userdata"))?;
                if instance.type_hash() != target {
                    return Err(Rejection::Mismatch(instance.type_hash()));
                }
                Ok(instance.value().clone())
            }
            other => Err(Rejection::ValueKind(other.type_name())),
        }
    }

    // ==========================================================================
    // Native -> Script
    // ==========================================================================

    /// Convert a call result into the values returned to Lua (zero or one).
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn native_to_script(
        &self,
        lua: &Lua,
        bridge: &Bridge,
        result: Variant,
    ) -> mlua::Result<MultiValue> {
        let mut values = MultiValue::new();
        if let Some(value) = self.to_script_value(lua, bridge, result)? {
            values.push_back(value);
        }
        Ok(values)
    }

    /// Convert a single native value. `None` for `Void`.
    pub fn to_script_value(
        &self,
        lua: &Lua,
        bridge: &Bridge,
        result: Variant,
    ) -> mlua::Result<Option<Value>> {
        let registry = bridge.registry();
        let type_hash = match &result {
            Variant::Invalid(expected) => {
                return Err(BridgeError::UnsendableValue {
                    type_name: registry.type_name(*expected).to_string(),
                }
                .into());
            }
            Variant::Void => return Ok(None),
            Variant::Value { type_hash, .. } => *type_hash,
        };

        if let Some(conversion) = self.strategies.get(&type_hash)
            && let Some(value) = (conversion.to_script)(&result)
        {
            return Ok(Some(value));
        }

        match registry.get(type_hash) {
            Some(entry) if entry.is_class() || entry.is_pointer() => {
                let ud = instance::wrap_existing(lua, bridge, result)?;
                Ok(Some(Value::UserData(ud)))
            }
            _ => Err(BridgeError::UnhandledNativeType {
                type_name: registry.type_name(type_hash).to_string(),
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reflua_core::IntoFunction;

    fn registry_with(name: &str, f: impl IntoFunction<fn(i16, i32) -> i32>) -> TypeRegistry {
        let mut registry = TypeRegistry::with_primitives();
        registry.register_function(name, f).unwrap();
        registry
    }

    // ========================================================================
    // Scalar strategies
    // ========================================================================

    #[test]
    fn short_wraps_like_a_c_cast() {
        let v = (conversions::SHORT.to_native)(ScriptNumber::Integer(70000));
        assert_eq!(v.get_value::<i16>(), Some(4464));

        let v = (conversions::SHORT.to_native)(ScriptNumber::Integer(-1));
        assert_eq!(v.get_value::<i16>(), Some(-1));
    }

    #[test]
    fn floats_truncate_toward_zero() {
        let v = (conversions::INT.to_native)(ScriptNumber::Float(3.9));
        assert_eq!(v.get_value::<i32>(), Some(3));
        let v = (conversions::INT.to_native)(ScriptNumber::Float(-3.9));
        assert_eq!(v.get_value::<i32>(), Some(-3));
    }

    #[test]
    fn int_wraps_to_32_bits() {
        let v = (conversions::INT.to_native)(ScriptNumber::Integer(1 << 32 | 5));
        assert_eq!(v.get_value::<i32>(), Some(5));
    }

    #[test]
    fn scalars_go_back_as_lua_numbers() {
        let int = (conversions::INT.to_script)(&Variant::new(7i32));
        assert!(matches!(int, Some(Value::Integer(7))));
        let double = (conversions::DOUBLE.to_script)(&Variant::new(0.5f64));
        assert!(matches!(double, Some(Value::Number(n)) if n == 0.5));
        assert!((conversions::INT.to_script)(&Variant::new(7i16)).is_none());
    }

    #[test]
    fn default_strategies() {
        let marshaller = Marshaller::default();
        for hash in [primitives::INT32, primitives::INT16, primitives::FLOAT, primitives::DOUBLE] {
            assert!(marshaller.strategy(hash).is_some());
        }
        assert!(marshaller.strategy(primitives::STRING).is_none());
        assert!(Marshaller::empty().strategy(primitives::INT32).is_none());
    }

    #[test]
    fn register_replaces_strategy() {
        let mut marshaller = Marshaller::empty();
        assert!(marshaller.register(primitives::INT32, conversions::INT).is_none());
        assert!(marshaller.register(primitives::INT32, conversions::INT).is_some());
    }

    // ========================================================================
    // Arguments
    // ========================================================================

    #[test]
    fn arguments_convert_to_parameter_types() {
        let registry = registry_with("mix", |a: i16, b: i32| a as i32 + b);
        let method = registry.function("mix").unwrap();

        let args = Marshaller::default()
            .script_to_native(&registry, method, &[Value::Integer(70000), Value::Number(2.7)])
            .unwrap();
        assert_eq!(args[0].get_value::<i16>(), Some(4464));
        assert_eq!(args[1].get_value::<i32>(), Some(2));
    }

    #[test]
    fn argument_count_mismatch() {
        let registry = registry_with("mix", |a: i16, b: i32| a as i32 + b);
        let method = registry.function("mix").unwrap();

        let err = Marshaller::default()
            .script_to_native(&registry, method, &[Value::Integer(1)])
            .unwrap_err();
        assert_eq!(
            err,
            BridgeError::ArgumentCount {
                member: "mix".into(),
                expected: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn unsupported_lua_kind_names_position_and_member() {
        let registry = registry_with("mix", |a: i16, b: i32| a as i32 + b);
        let method = registry.function("mix").unwrap();

        let err = Marshaller::default()
            .script_to_native(&registry, method, &[Value::Integer(1), Value::Boolean(true)])
            .unwrap_err();
        assert_eq!(
            err,
            BridgeError::UnsupportedScriptValue {
                kind: "boolean",
                position: 2,
                member: "mix".into(),
            }
        );
    }

    #[test]
    fn number_for_type_without_strategy() {
        let registry = registry_with("mix", |a: i16, b: i32| a as i32 + b);
        let method = registry.function("mix").unwrap();

        let err = Marshaller::empty()
            .script_to_native(&registry, method, &[Value::Integer(1), Value::Integer(2)])
            .unwrap_err();
        assert_eq!(
            err,
            BridgeError::UnsupportedParameterType {
                type_name: "short".into(),
                position: 1,
                member: "mix".into(),
            }
        );
    }
}
