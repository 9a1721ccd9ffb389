//! Native instances owned by Lua.
//!
//! Every native value that crosses into Lua is moved into a userdatum holding
//! a [`NativeInstance`]. The userdatum also carries a side-table (its Lua
//! user value) for fields scripts add ad hoc. Lua owns the storage; the value
//! is dropped exactly once, when Lua collects the userdatum.

use std::rc::Rc;

use mlua::{AnyUserData, Lua, MetaMethod, UserData, UserDataMethods, Value};

use reflua_core::{TypeHash, Variant};

use crate::behavior::BehaviorTable;
use crate::binder::Bridge;
use crate::dispatch;
use crate::error::BridgeError;

/// A native value stored inside a Lua userdatum.
pub struct NativeInstance {
    value: Variant,
    behavior: Rc<BehaviorTable>,
}

impl NativeInstance {
    /// The embedded value.
    pub fn value(&self) -> &Variant {
        &self.value
    }

    /// The embedded value, mutably.
    pub fn value_mut(&mut self) -> &mut Variant {
        &mut self.value
    }

    /// Type of the embedded value (a class or a pointer to one).
    pub fn type_hash(&self) -> TypeHash {
        self.value.type_hash()
    }

    /// Behavior table members are dispatched through.
    pub fn behavior(&self) -> &Rc<BehaviorTable> {
        &self.behavior
    }
}

impl UserData for NativeInstance {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_meta_function(MetaMethod::Index, |lua, (ud, key): (AnyUserData, Value)| {
            dispatch::read_member(lua, &ud, key)
        });
        methods.add_meta_function(
            MetaMethod::NewIndex,
            |lua, (ud, key, value): (AnyUserData, Value, Value)| {
                dispatch::write_member(lua, &ud, key, value)
            },
        );
        methods.add_meta_method(MetaMethod::ToString, |_, this, ()| {
            Ok(format!("{}: native instance", this.behavior.class_name()))
        });
    }
}

impl Drop for NativeInstance {
    fn drop(&mut self) {
        log::trace!("finalizing '{}' instance", self.behavior.class_name());
    }
}

/// Default-construct a `class` value and move it into a new userdatum.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn create_instance(lua: &Lua, bridge: &Bridge, class: TypeHash) -> mlua::Result<AnyUserData> {
    let registry = bridge.registry();
    let entry = registry
        .get(class)
        .ok_or_else(|| BridgeError::UnhandledNativeType {
            type_name: registry.type_name(class).to_string(),
        })?;
    let value = entry.construct().ok_or_else(|| BridgeError::NoConstructor {
        type_name: entry.name.clone(),
    })?;
    log::trace!("constructing '{}'", entry.name);
    wrap_existing(lua, bridge, value)
}

/// Move an existing value into a new userdatum.
///
/// The value must be of a bound class or a pointer to one.
pub fn wrap_existing(lua: &Lua, bridge: &Bridge, value: Variant) -> mlua::Result<AnyUserData> {
    let registry = bridge.registry();
    let behavior = bridge
        .behaviors()
        .for_type(registry, value.type_hash())
        .ok_or_else(|| BridgeError::UnhandledNativeType {
            type_name: registry.type_name(value.type_hash()).to_string(),
        })?;

    let ud = lua.create_userdata(NativeInstance { value, behavior })?;
    ud.set_user_value(lua.create_table()?)?;
    Ok(ud)
}
