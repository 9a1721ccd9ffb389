//! `lua_Alloc` trampoline.

use std::ffi::c_void;

use crate::ArenaAllocator;

/// Lua allocator function backed by an [`ArenaAllocator`].
///
/// Pass it to `lua_newstate` with `ud` pointing at the arena. See
/// [`ArenaAllocator::realloc`] for the protocol.
///
/// # Safety
///
/// `ud` must point to a live `ArenaAllocator` that outlives the Lua state and
/// is not accessed elsewhere while Lua runs. Lua guarantees the `ptr`/`osize`
/// pairing.
pub unsafe extern "C-unwind" fn lua_alloc(
    ud: *mut c_void,
    ptr: *mut c_void,
    osize: usize,
    nsize: usize,
) -> *mut c_void {
    debug_assert!(!ud.is_null(), "lua_alloc needs an arena");
    // SAFETY: guaranteed by the caller.
    let arena = unsafe { &mut *ud.cast::<ArenaAllocator>() };
    unsafe { arena.realloc(ptr.cast(), osize, nsize).cast() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AllocationSource, ArenaConfig};
    use std::ptr::{self, NonNull};

    #[test]
    fn trampoline_allocates_from_arena() {
        let mut arena = ArenaAllocator::new(ArenaConfig::with_capacity(512));
        let ud = (&mut arena as *mut ArenaAllocator).cast::<c_void>();

        unsafe {
            let block = lua_alloc(ud, ptr::null_mut(), 0, 40);
            let block = NonNull::new(block.cast::<u8>()).unwrap();
            assert_eq!((*ud.cast::<ArenaAllocator>()).source_of(block), AllocationSource::Arena);
            assert!(lua_alloc(ud, block.as_ptr().cast(), 40, 0).is_null());
        }
        assert_eq!(arena.free_list_len(), 1);
    }

    #[test]
    fn trampoline_returns_null_when_refused() {
        let mut arena = ArenaAllocator::new(ArenaConfig::with_capacity(64));
        let ud = (&mut arena as *mut ArenaAllocator).cast::<c_void>();
        unsafe {
            assert!(lua_alloc(ud, ptr::null_mut(), 0, usize::MAX).is_null());
        }
    }
}
