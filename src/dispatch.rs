//! Dispatch hooks: the entry points Lua calls into.
//!
//! - construct: `<Type>.new()` builds a default instance
//! - read: `instance.name` resolves a method, then a property, then the
//!   side-table
//! - write: `instance.name = v` writes a property or the side-table
//! - invoke: calling a bound method or free function
//!
//! Every failure surfaces as a Lua error carrying a [`BridgeError`] and aborts
//! only the current script call.

use std::rc::Rc;

use mlua::{AnyUserData, Function, Lua, MultiValue, Table, Value};

use reflua_core::{MethodEntry, TypeEntry, TypeHash};

use crate::binder::Bridge;
use crate::error::BridgeError;
use crate::instance::{self, NativeInstance};

/// Construct hook: works for both `T.new()` and `T:new()`.
pub(crate) fn construct(lua: &Lua, bridge: &Bridge, class: TypeHash) -> mlua::Result<AnyUserData> {
    instance::create_instance(lua, bridge, class)
}

/// Class entry a behavior table dispatches against.
fn class_of<'b>(bridge: &'b Bridge, class: TypeHash) -> Result<&'b TypeEntry, BridgeError> {
    let registry = bridge.registry();
    registry
        .get(class)
        .ok_or_else(|| BridgeError::UnhandledNativeType {
            type_name: registry.type_name(class).to_string(),
        })
}

/// Member name from an index key.
fn member_name(key: &Value, type_name: &str) -> mlua::Result<String> {
    match key {
        Value::String(name) => Ok(name.to_str()?.to_string()),
        other => Err(BridgeError::NotAMemberName {
            type_name: type_name.to_string(),
            kind: other.type_name(),
        }
        .into()),
    }
}

// ============================================================================
// Read
// ============================================================================

/// `__index`: method, then property, then side-table.
#[cfg_attr(feature = "profiling", profiling::function)]
pub(crate) fn read_member(lua: &Lua, ud: &AnyUserData, key: Value) -> mlua::Result<Value> {
    let bridge = Bridge::from_lua(lua)?;
    let instance = ud.borrow::<NativeInstance>()?;
    let behavior = Rc::clone(instance.behavior());
    let name = member_name(&key, behavior.class_name())?;
    let class = class_of(&bridge, behavior.class())?;

    if let Some(method) = class.method(&name) {
        drop(instance);
        return bound_method(lua, &bridge, method.clone(), ud.clone()).map(Value::Function);
    }

    if let Some(property) = class.property(&name) {
        let result = property.get(instance.value());
        drop(instance);
        if result.is_valid() {
            let value = bridge.marshaller().to_script_value(lua, &bridge, result)?;
            return Ok(value.unwrap_or(Value::Nil));
        }
        log::trace!("'{}.{}' read failed, falling back to side-table", class.name, name);
    } else {
        drop(instance);
    }

    let side: Table = ud.user_value()?;
    side.get(key)
}

/// Closure invoking `method` on `receiver`, handed out by the read hook.
fn bound_method(
    lua: &Lua,
    bridge: &Rc<Bridge>,
    method: MethodEntry,
    receiver: AnyUserData,
) -> mlua::Result<Function> {
    let bridge = Rc::clone(bridge);
    lua.create_function(move |lua, args: MultiValue| {
        invoke(lua, &bridge, &method, Some(&receiver), args)
    })
}

// ============================================================================
// Write
// ============================================================================

/// `__newindex`: property write, else side-table.
#[cfg_attr(feature = "profiling", profiling::function)]
pub(crate) fn write_member(lua: &Lua, ud: &AnyUserData, key: Value, value: Value) -> mlua::Result<()> {
    let bridge = Bridge::from_lua(lua)?;
    let behavior = Rc::clone(ud.borrow::<NativeInstance>()?.behavior());
    let name = member_name(&key, behavior.class_name())?;
    let class = class_of(&bridge, behavior.class())?;

    let Some(property) = class.property(&name) else {
        let side: Table = ud.user_value()?;
        return side.set(key, value);
    };

    if property.is_read_only() {
        return Err(BridgeError::ReadOnlyProperty {
            property: name,
            type_name: class.name.clone(),
        }
        .into());
    }

    let native = bridge
        .marshaller()
        .property_to_native(bridge.registry(), class, property, &value)?;
    let mut instance = ud
        .borrow_mut::<NativeInstance>()
        .map_err(|_| BridgeError::ReceiverBusy {
            member: name.clone(),
        })?;
    if !property.set(instance.value_mut(), &native) {
        log::error!("writing converted value to '{}.{}' failed", class.name, name);
        debug_assert!(false, "property write failed after conversion");
    }
    Ok(())
}

// ============================================================================
// Invoke
// ============================================================================

/// Invoke a method or free function with Lua arguments.
///
/// For methods, the receiver is always the instance the method was read
/// from. A `:` call passes that same instance again as the leading argument;
/// it is dropped before the argument count is checked. Arguments are
/// converted before the receiver is borrowed, so a failed conversion leaves
/// the instance untouched.
#[cfg_attr(feature = "profiling", profiling::function)]
pub(crate) fn invoke(
    lua: &Lua,
    bridge: &Bridge,
    method: &MethodEntry,
    captured: Option<&AnyUserData>,
    args: MultiValue,
) -> mlua::Result<MultiValue> {
    let mut args: Vec<Value> = args.into_iter().collect();

    let receiver = match method.owner {
        None => None,
        Some(owner) => {
            let receiver = captured.cloned().ok_or_else(|| BridgeError::NotAUserdatum {
                member: method.name.clone(),
            })?;
            let self_call = matches!(
                args.first(),
                Some(Value::UserData(leading)) if leading.to_pointer() == receiver.to_pointer()
            );
            if self_call {
                args.remove(0);
            }
            Some((owner, receiver))
        }
    };

    let native_args = bridge
        .marshaller()
        .script_to_native(bridge.registry(), method, &args)?;

    let result = match &receiver {
        Some((owner, ud)) => {
            let mut instance = ud
                .borrow_mut::<NativeInstance>()
                .map_err(|_| BridgeError::ReceiverBusy {
                    member: method.name.clone(),
                })?;
            if instance.behavior().class() != *owner {
                let registry = bridge.registry();
                return Err(BridgeError::TypeMismatch {
                    target: format!("receiver of '{}'", method.name),
                    expected: registry.type_name(*owner).to_string(),
                    actual: instance.behavior().class_name().to_string(),
                }
                .into());
            }
            method.invoke(Some(instance.value_mut()), &native_args)
        }
        None => method.invoke(None, &native_args),
    };

    bridge.marshaller().native_to_script(lua, bridge, result)
}

/// Closure for a free function.
pub(crate) fn global_function(lua: &Lua, bridge: &Rc<Bridge>, function: MethodEntry) -> mlua::Result<Function> {
    let bridge = Rc::clone(bridge);
    lua.create_function(move |lua, args: MultiValue| invoke(lua, &bridge, &function, None, args))
}
