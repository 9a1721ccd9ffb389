//! Binding a registry into a Lua state.
//!
//! [`Binder::bind`] freezes the registry into a shared [`Bridge`] stored as
//! Lua app data, then publishes:
//!
//! - every free function, in the global function table and (optionally) as
//!   a top-level global
//! - a global table per class, whose `new` field constructs instances
//!
//! # Example
//!
//! ```
//! use mlua::Lua;
//! use reflua::{Binder, TypeRegistry};
//!
//! let mut registry = TypeRegistry::with_primitives();
//! registry.register_function("answer", || 42i32).unwrap();
//!
//! let lua = Lua::new();
//! let report = Binder::new(registry).bind(&lua).unwrap();
//! assert_eq!(report.functions, ["answer"]);
//!
//! let value: i32 = lua.load("return Global.answer()").eval().unwrap();
//! assert_eq!(value, 42);
//! ```

use std::rc::Rc;

use mlua::Lua;

use reflua_registry::TypeRegistry;

use crate::behavior::BehaviorTables;
use crate::dispatch;
use crate::error::{BindError, BridgeError};
use crate::marshal::Marshaller;
use crate::options::BindOptions;

/// Frozen bridge state shared by every hook of one Lua state.
pub struct Bridge {
    registry: TypeRegistry,
    marshaller: Marshaller,
    behaviors: BehaviorTables,
    options: BindOptions,
}

impl Bridge {
    /// The bound registry.
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// The marshaller used for every call.
    pub fn marshaller(&self) -> &Marshaller {
        &self.marshaller
    }

    /// Behavior tables of the bound classes.
    pub fn behaviors(&self) -> &BehaviorTables {
        &self.behaviors
    }

    /// Options the bridge was bound with.
    pub fn options(&self) -> &BindOptions {
        &self.options
    }

    /// The bridge bound to `lua`.
    pub fn from_lua(lua: &Lua) -> Result<Rc<Bridge>, BridgeError> {
        lua.app_data_ref::<Rc<Bridge>>()
            .map(|bridge| Rc::clone(&bridge))
            .ok_or(BridgeError::NotBound)
    }
}

/// What [`Binder::bind`] published.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindReport {
    /// Class tables, in registration order.
    pub classes: Vec<String>,
    /// Free functions, in registration order.
    pub functions: Vec<String>,
}

/// Publishes a [`TypeRegistry`] into a Lua state.
pub struct Binder {
    registry: TypeRegistry,
    marshaller: Marshaller,
    options: BindOptions,
}

impl Binder {
    /// Bind `registry` with the default marshaller and options.
    pub fn new(registry: TypeRegistry) -> Self {
        Self {
            registry,
            marshaller: Marshaller::default(),
            options: BindOptions::default(),
        }
    }

    /// Builder: set the binding options.
    pub fn with_options(mut self, options: BindOptions) -> Self {
        self.options = options;
        self
    }

    /// Builder: use a custom marshaller (for extra scalar strategies).
    pub fn with_marshaller(mut self, marshaller: Marshaller) -> Self {
        self.marshaller = marshaller;
        self
    }

    /// Publish every class and free function into `lua`.
    ///
    /// A Lua state can carry a single bridge.
    pub fn bind(self, lua: &Lua) -> Result<BindReport, BindError> {
        if lua.app_data_ref::<Rc<Bridge>>().is_some() {
            return Err(BindError::AlreadyBound);
        }

        let mut behaviors = BehaviorTables::new();
        for class in self.registry.classes() {
            behaviors.create(class);
        }
        log::debug!("created {} behavior tables", behaviors.len());

        let bridge = Rc::new(Bridge {
            registry: self.registry,
            marshaller: self.marshaller,
            behaviors,
            options: self.options,
        });
        lua.set_app_data(Rc::clone(&bridge));

        let mut report = BindReport::default();
        bind_functions(lua, &bridge, &mut report)?;
        bind_classes(lua, &bridge, &mut report)?;
        Ok(report)
    }
}

fn bind_functions(lua: &Lua, bridge: &Rc<Bridge>, report: &mut BindReport) -> Result<(), BindError> {
    let globals = lua.globals();
    let options = bridge.options();
    let namespace = lua.create_table()?;

    for function in bridge.registry().global_functions() {
        let callable = dispatch::global_function(lua, bridge, function.clone())?;
        namespace.set(function.name.as_str(), callable.clone())?;
        if options.exposes_functions_as_globals() {
            globals.set(function.name.as_str(), callable)?;
        }
        log::debug!("bound function '{}'", function.name);
        report.functions.push(function.name.clone());
    }

    globals.set(options.global_table_name(), namespace)?;
    Ok(())
}

fn bind_classes(lua: &Lua, bridge: &Rc<Bridge>, report: &mut BindReport) -> Result<(), BindError> {
    let globals = lua.globals();

    for class in bridge.registry().classes() {
        let hash = class.type_hash;
        let hook = Rc::clone(bridge);
        let new = lua.create_function(move |lua, _: mlua::MultiValue| {
            dispatch::construct(lua, &hook, hash)
        })?;

        let table = lua.create_table()?;
        table.set("new", new)?;
        globals.set(class.name.as_str(), table)?;

        log::debug!(
            "bound class '{}' ({} methods, {} properties)",
            class.name,
            class.methods.len(),
            class.properties.len()
        );
        report.classes.push(class.name.clone());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reflua_core::Reflect;

    #[derive(Clone, Default)]
    struct Lamp {
        lit: i32,
    }

    impl Reflect for Lamp {
        fn type_name() -> &'static str {
            "Lamp"
        }
    }

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::with_primitives();
        registry
            .register_class::<Lamp>()
            .constructor()
            .property("lit", |l: &Lamp| l.lit, |l: &mut Lamp, v| l.lit = v)
            .unwrap()
            .build()
            .unwrap();
        registry.register_function("seven", || 7i32).unwrap();
        registry
    }

    #[test]
    fn report_lists_bindings() {
        let lua = Lua::new();
        let report = Binder::new(registry()).bind(&lua).unwrap();
        assert_eq!(report.classes, ["Lamp"]);
        assert_eq!(report.functions, ["seven"]);
    }

    #[test]
    fn bridge_is_stored_as_app_data() {
        let lua = Lua::new();
        assert!(matches!(Bridge::from_lua(&lua), Err(BridgeError::NotBound)));

        Binder::new(registry()).bind(&lua).unwrap();
        let bridge = Bridge::from_lua(&lua).unwrap();
        assert_eq!(bridge.behaviors().len(), 1);
        assert!(bridge.behaviors().get("Lamp_MT_").is_some());
    }

    #[test]
    fn second_bind_is_rejected() {
        let lua = Lua::new();
        Binder::new(registry()).bind(&lua).unwrap();
        assert!(matches!(
            Binder::new(registry()).bind(&lua),
            Err(BindError::AlreadyBound)
        ));
    }

    #[test]
    fn functions_can_stay_out_of_globals() {
        let lua = Lua::new();
        let options = BindOptions::default()
            .global_table("Native")
            .expose_functions_as_globals(false);
        Binder::new(registry()).with_options(options).bind(&lua).unwrap();

        let top: mlua::Value = lua.globals().get("seven").unwrap();
        assert!(top.is_nil());
        let value: i32 = lua.load("return Native.seven()").eval().unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn class_table_has_constructor() {
        let lua = Lua::new();
        Binder::new(registry()).bind(&lua).unwrap();
        let kind: String = lua.load("return type(Lamp.new)").eval().unwrap();
        assert_eq!(kind, "function");
    }
}
