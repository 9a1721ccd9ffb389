//! Fixed-capacity pool allocator for script object storage.
//!
//! This crate provides [`ArenaAllocator`], a bump allocator over a fixed pool
//! that recycles freed blocks through an intrusive free list and falls back
//! to the global heap once the pool is exhausted. Allocation never fails
//! (short of a real out-of-memory condition).
//!
//! ## Key Types
//!
//! - [`ArenaAllocator`]: the pool itself
//! - [`GlobalAllocator`]: the heap fallback
//! - [`ArenaConfig`]: pool configuration
//! - [`ArenaStats`]: allocation path counters
//!
//! ## Lua integration
//!
//! [`lua_alloc`] has the shape of Lua's `lua_Alloc` and can be handed to
//! `lua_newstate` together with a pointer to an [`ArenaAllocator`].
//!
//! # Example
//!
//! ```
//! use reflua_arena::{ArenaAllocator, ArenaConfig, MIN_BLOCK_SIZE};
//!
//! let mut arena = ArenaAllocator::new(ArenaConfig::with_capacity(1024));
//! let block = arena.allocate(16);
//! unsafe { arena.deallocate(block, 16) };
//!
//! // Small requests are served from the free list first.
//! let again = arena.allocate(MIN_BLOCK_SIZE);
//! assert_eq!(block, again);
//! assert_eq!(arena.stats().free_list_hits, 1);
//! ```

mod arena;
mod global;
mod lua;

pub use arena::{AllocationSource, ArenaAllocator, ArenaConfig, ArenaStats, with_global_arena};
pub use global::GlobalAllocator;
pub use lua::lua_alloc;

/// Alignment applied to every arena block.
pub const ALIGNMENT: usize = 8;

/// Smallest block the arena hands out. Any freed block can serve any request
/// of this size or smaller.
pub const MIN_BLOCK_SIZE: usize = ALIGNMENT * 8;

/// Capacity of the thread's default pool (see [`with_global_arena`]).
pub const DEFAULT_POOL_SIZE: usize = 1024 * 10;
