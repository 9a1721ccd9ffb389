//! Reflection-driven bridge exposing native Rust types to Lua.
//!
//! Types are described once in a [`TypeRegistry`] and published into an
//! [`mlua::Lua`] state by a [`Binder`]. No per-type binding code is written:
//! construction, property access and method calls are all routed through the
//! registry at runtime.
//!
//! ```
//! use mlua::Lua;
//! use reflua::{Binder, Reflect, TypeRegistry};
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
//!     .method("length", |v: &Vec2| v.x + v.y)?
//!     .build()?;
//!
//! let lua = Lua::new();
//! Binder::new(registry).bind(&lua)?;
//!
//! let length: i32 = lua
//!     .load("local v = Vec.new(); v.x = 3; v.y = 4; return v:length()")
//!     .eval()?;
//! assert_eq!(length, 7);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The arena allocator lives in [`reflua_arena`], re-exported as [`arena`].
//! [`ArenaLua`] runs a bridge inside a Lua state backed by it.

pub mod behavior;
pub mod binder;
mod dispatch;
pub mod error;
pub mod instance;
pub mod marshal;
pub mod options;
pub mod state;

pub use behavior::{BehaviorTable, BehaviorTables, behavior_table_name};
pub use binder::{BindReport, Binder, Bridge};
pub use error::{BindError, BridgeError};
pub use instance::{NativeInstance, create_instance, wrap_existing};
pub use marshal::{Marshaller, ScalarConversion, ScriptNumber, conversions};
pub use options::BindOptions;
pub use state::ArenaLua;

pub use reflua_arena as arena;
pub use reflua_core::{
    IntoFunction, IntoMethod, Reflect, RegistrationError, Shared, TypeHash, Variant, primitives,
    shared,
};
pub use reflua_registry::{ClassBuilder, TypeRegistry};
