//! Drives a raw Lua state allocating through the arena.

use std::ffi::c_void;

use mlua::ffi;
use reflua_arena::{ArenaAllocator, ArenaConfig, lua_alloc};

/// Run `chunk` in a fresh state backed by `arena` and return its integer result.
fn eval_in_arena(arena: &mut ArenaAllocator, chunk: &std::ffi::CStr) -> i64 {
    let ud = (arena as *mut ArenaAllocator).cast::<c_void>();
    unsafe {
        let state = ffi::lua_newstate(lua_alloc, ud);
        assert!(!state.is_null());
        assert_eq!(ffi::luaL_loadstring(state, chunk.as_ptr()), ffi::LUA_OK);
        assert_eq!(ffi::lua_pcall(state, 0, 1, 0), ffi::LUA_OK);
        let result = ffi::lua_tointeger(state, -1);
        ffi::lua_close(state);
        result
    }
}

#[test]
fn lua_state_runs_on_arena() {
    let mut arena = ArenaAllocator::new(ArenaConfig::with_capacity(256 * 1024));
    let result = eval_in_arena(
        &mut arena,
        c"local t = {} for i = 1, 100 do t[i] = i end return #t + t[50]",
    );
    assert_eq!(result, 150);

    let stats = arena.stats();
    assert!(stats.bump_allocations > 0);
    assert_eq!(stats.fallback_allocations, 0);
    assert!(stats.arena_frees > 0);
}

#[test]
fn small_pool_falls_back_to_heap() {
    let mut arena = ArenaAllocator::new(ArenaConfig::with_capacity(1024));
    let result = eval_in_arena(&mut arena, c"return 6 * 7");
    assert_eq!(result, 42);

    let stats = arena.stats();
    assert!(stats.fallback_allocations > 0);
    assert_eq!(stats.fallback_allocations, stats.fallback_frees);
}
