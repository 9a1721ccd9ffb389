//! Lua states whose memory comes from an arena.
//!
//! [`ArenaLua`] creates a Lua state with [`lua_alloc`] as its allocator and
//! owns the [`ArenaAllocator`] behind it. Every Lua object (tables, strings,
//! closures, native instance userdata) is carved from the pool, falling back
//! to the heap once the pool is exhausted.
//!
//! ```
//! use reflua::{ArenaLua, Binder, TypeRegistry};
//! use reflua::arena::ArenaConfig;
//!
//! let mut registry = TypeRegistry::with_primitives();
//! registry.register_function("answer", || 42i32)?;
//!
//! let lua = ArenaLua::new(ArenaConfig::with_capacity(256 * 1024))?;
//! Binder::new(registry).bind(&lua)?;
//!
//! let value: i32 = lua.load("return Global.answer()").eval()?;
//! assert_eq!(value, 42);
//! assert!(lua.arena_stats().bump_allocations > 0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fmt;
use std::mem::ManuallyDrop;
use std::ops::Deref;
use std::ptr::NonNull;

use mlua::{Lua, ffi};
use reflua_arena::{ArenaAllocator, ArenaConfig, ArenaStats, lua_alloc};

/// A Lua state allocating through an arena it owns.
///
/// Derefs to [`Lua`], so it is bound and driven like any other state. On
/// drop the state is closed first (finalizing every native instance), then
/// the arena is released. `Lua` handles cloned from it must not outlive it.
pub struct ArenaLua {
    lua: ManuallyDrop<Lua>,
    state: *mut ffi::lua_State,
    arena: NonNull<ArenaAllocator>,
}

impl ArenaLua {
    /// Create a state on a new pool described by `config`, with the standard
    /// libraries opened.
    pub fn new(config: ArenaConfig) -> mlua::Result<Self> {
        let arena = NonNull::from(Box::leak(Box::new(ArenaAllocator::new(config))));

        // SAFETY: the arena stays alive and untouched by Rust code while the
        // state runs; it is freed in `Drop` after `lua_close`.
        let state = unsafe { ffi::lua_newstate(lua_alloc, arena.as_ptr().cast()) };
        if state.is_null() {
            // SAFETY: no state refers to the arena.
            drop(unsafe { Box::from_raw(arena.as_ptr()) });
            return Err(mlua::Error::MemoryError(
                "failed to create an arena-backed Lua state".to_string(),
            ));
        }

        // SAFETY: `state` is a fresh main state that this value owns.
        let lua = unsafe {
            ffi::luaL_openlibs(state);
            Lua::init_from_ptr(state)
        };
        log::debug!("created Lua state on a {} byte arena", config.capacity);

        Ok(Self {
            lua: ManuallyDrop::new(lua),
            state,
            arena,
        })
    }

    /// Allocation path counters of the backing arena.
    pub fn arena_stats(&self) -> ArenaStats {
        // SAFETY: Lua only touches the arena while it runs, never while a
        // shared borrow of `self` is being read here.
        unsafe { self.arena.as_ref() }.stats()
    }

    /// Bytes the bump pointer has consumed in the backing arena.
    pub fn arena_bytes_used(&self) -> usize {
        // SAFETY: as in `arena_stats`.
        unsafe { self.arena.as_ref() }.bytes_used()
    }
}

impl Deref for ArenaLua {
    type Target = Lua;

    fn deref(&self) -> &Lua {
        &self.lua
    }
}

impl Drop for ArenaLua {
    fn drop(&mut self) {
        // SAFETY: the handle is dropped exactly once and before the state it
        // refers to; the state is closed before its allocator is freed.
        unsafe {
            ManuallyDrop::drop(&mut self.lua);
            ffi::lua_close(self.state);
            drop(Box::from_raw(self.arena.as_ptr()));
        }
    }
}

impl fmt::Debug for ArenaLua {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArenaLua")
            .field("arena_stats", &self.arena_stats())
            .finish_non_exhaustive()
    }
}
