//! Bump allocator over a fixed pool with free-list recycling.

use std::alloc::{self, Layout};
use std::cell::RefCell;
use std::fmt;
use std::ptr::{self, NonNull};

use crate::{ALIGNMENT, DEFAULT_POOL_SIZE, GlobalAllocator, MIN_BLOCK_SIZE};

/// Pool configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Size of the pool in bytes.
    pub capacity: usize,
}

impl ArenaConfig {
    /// Configuration for a pool of `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { capacity }
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_POOL_SIZE)
    }
}

/// Counters describing which path served each request.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ArenaStats {
    /// Requests carved from the bump pointer.
    pub bump_allocations: usize,
    /// Requests served by popping the free list.
    pub free_list_hits: usize,
    /// Requests forwarded to the heap.
    pub fallback_allocations: usize,
    /// Arena blocks pushed onto the free list.
    pub arena_frees: usize,
    /// Heap blocks returned to the fallback.
    pub fallback_frees: usize,
}

/// Where a block lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationSource {
    /// Inside the pool bounds.
    Arena,
    /// Outside the pool; owned by the heap fallback.
    Heap,
}

/// Intrusive free-list node written into the first bytes of a freed block.
struct FreeBlock {
    next: Option<NonNull<FreeBlock>>,
}

/// Fixed-capacity pool allocator.
///
/// - Every block is aligned to [`ALIGNMENT`] and at least [`MIN_BLOCK_SIZE`] bytes.
/// - Freed pool blocks go onto a free list and are reused for requests of
///   [`MIN_BLOCK_SIZE`] bytes or fewer. The bump pointer never moves back.
/// - Once the pool is exhausted, requests go to [`GlobalAllocator`].
/// - Deallocation is routed by address: pool-range pointers stay in the
///   arena, everything else goes to the heap.
///
/// The allocator does no locking. It is `!Send`, so a pool is only ever
/// touched by the thread driving its script runtime.
pub struct ArenaAllocator {
    pool: NonNull<u8>,
    pool_layout: Layout,
    begin: *mut u8,
    end: *mut u8,
    curr: *mut u8,
    free_list_head: Option<NonNull<FreeBlock>>,
    fallback: GlobalAllocator,
    stats: ArenaStats,
}

impl ArenaAllocator {
    /// Allocate a new pool.
    pub fn new(config: ArenaConfig) -> Self {
        let pool_layout = Layout::from_size_align(config.capacity.max(ALIGNMENT), ALIGNMENT)
            .expect("arena capacity exceeds isize::MAX");
        // SAFETY: pool_layout has a non-zero size.
        let raw = unsafe { alloc::alloc(pool_layout) };
        let pool = NonNull::new(raw).unwrap_or_else(|| alloc::handle_alloc_error(pool_layout));
        let begin = pool.as_ptr();
        // SAFETY: one past the end of the pool allocation.
        let end = unsafe { begin.add(pool_layout.size()) };

        Self {
            pool,
            pool_layout,
            begin,
            end,
            curr: begin,
            free_list_head: None,
            fallback: GlobalAllocator,
            stats: ArenaStats::default(),
        }
    }

    /// Forget every allocation: empty the free list and rewind the bump pointer.
    ///
    /// # Safety
    ///
    /// Invalidates every pointer previously handed out from the pool. Only
    /// call this when no pool allocation is live. Heap fallback blocks are
    /// unaffected and must still be deallocated.
    pub unsafe fn reset(&mut self) {
        self.free_list_head = None;
        self.curr = self.begin;
    }

    /// Round a request up to the arena's minimum block size.
    pub fn size_to_allocate(size: usize) -> usize {
        size.max(MIN_BLOCK_SIZE)
    }

    /// Allocate `size` bytes. Never fails short of a real out-of-memory
    /// condition.
    pub fn allocate(&mut self, size: usize) -> NonNull<u8> {
        match self.try_allocate(size) {
            Some(block) => block,
            None => self.fallback.allocate(size),
        }
    }

    /// Allocate `size` bytes, or `None` when neither the pool nor the heap
    /// can serve the request.
    pub fn try_allocate(&mut self, size: usize) -> Option<NonNull<u8>> {
        let allocated_bytes = Self::size_to_allocate(size);

        if allocated_bytes <= MIN_BLOCK_SIZE
            && let Some(head) = self.free_list_head
        {
            // SAFETY: every free-list node was written by `deallocate` into a
            // pool block that is at least MIN_BLOCK_SIZE bytes.
            self.free_list_head = unsafe { head.as_ref().next };
            self.stats.free_list_hits += 1;
            return Some(head.cast());
        }

        let curr_addr = self.curr as usize;
        let aligned_addr = (curr_addr + (ALIGNMENT - 1)) & !(ALIGNMENT - 1);
        let end_addr = self.end as usize;

        if aligned_addr <= end_addr && end_addr - aligned_addr >= allocated_bytes {
            // SAFETY: aligned_addr and aligned_addr + allocated_bytes are both
            // within the pool (checked above).
            let block = unsafe { self.curr.add(aligned_addr - curr_addr) };
            self.curr = unsafe { block.add(allocated_bytes) };
            self.stats.bump_allocations += 1;
            // SAFETY: derived from the non-null pool pointer.
            return Some(unsafe { NonNull::new_unchecked(block) });
        }

        log::trace!("arena exhausted, {size} bytes served from the heap");
        let block = self.fallback.try_allocate(size)?;
        self.stats.fallback_allocations += 1;
        Some(block)
    }

    /// Release a block.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this allocator (or its heap fallback)
    /// for a request of `size` bytes, and must not be used afterwards.
    pub unsafe fn deallocate(&mut self, ptr: NonNull<u8>, size: usize) {
        match self.source_of(ptr) {
            AllocationSource::Arena => {
                debug_assert!(Self::size_to_allocate(size) >= MIN_BLOCK_SIZE);
                let node = ptr.cast::<FreeBlock>();
                // SAFETY: the block is at least MIN_BLOCK_SIZE bytes, aligned to
                // ALIGNMENT, and no longer in use.
                unsafe {
                    node.as_ptr().write(FreeBlock {
                        next: self.free_list_head,
                    })
                };
                self.free_list_head = Some(node);
                self.stats.arena_frees += 1;
            }
            AllocationSource::Heap => {
                self.stats.fallback_frees += 1;
                // SAFETY: out-of-range blocks came from the fallback.
                unsafe { self.fallback.deallocate(ptr, size) }
            }
        }
    }

    /// Move a block into a new allocation of `new_size` bytes.
    ///
    /// Always allocates a new block, copies `min(old_size, new_size)` bytes
    /// and frees the old block, even when shrinking.
    ///
    /// # Safety
    ///
    /// Same contract as [`ArenaAllocator::deallocate`] for `ptr`/`old_size`.
    pub unsafe fn reallocate(&mut self, ptr: NonNull<u8>, old_size: usize, new_size: usize) -> NonNull<u8> {
        let new_ptr = self.allocate(new_size);
        // SAFETY: guaranteed by the caller.
        unsafe { self.move_block(ptr, old_size, new_ptr, new_size) };
        new_ptr
    }

    /// Like [`ArenaAllocator::reallocate`], but returns `None` and leaves the
    /// old block untouched when the new block cannot be allocated.
    ///
    /// # Safety
    ///
    /// Same contract as [`ArenaAllocator::deallocate`] for `ptr`/`old_size`.
    pub unsafe fn try_reallocate(
        &mut self,
        ptr: NonNull<u8>,
        old_size: usize,
        new_size: usize,
    ) -> Option<NonNull<u8>> {
        let new_ptr = self.try_allocate(new_size)?;
        // SAFETY: guaranteed by the caller.
        unsafe { self.move_block(ptr, old_size, new_ptr, new_size) };
        Some(new_ptr)
    }

    unsafe fn move_block(&mut self, from: NonNull<u8>, old_size: usize, to: NonNull<u8>, new_size: usize) {
        // SAFETY: `from` is still live (its block cannot be handed out again
        // before the deallocate below) and both blocks hold the copied bytes.
        unsafe {
            ptr::copy_nonoverlapping(from.as_ptr(), to.as_ptr(), old_size.min(new_size));
            self.deallocate(from, old_size);
        }
    }

    /// Lua allocator protocol.
    ///
    /// - `nsize == 0`: free `ptr` (if non-null) and return null.
    /// - null `ptr`: allocate `nsize` bytes (`osize` is ignored).
    /// - otherwise: reallocate from `osize` to `nsize` bytes.
    ///
    /// A request that cannot be served returns null; on a failed reallocation
    /// the old block stays valid.
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must be a live block of `osize` bytes from this
    /// allocator.
    pub unsafe fn realloc(&mut self, ptr: *mut u8, osize: usize, nsize: usize) -> *mut u8 {
        match (NonNull::new(ptr), nsize) {
            (Some(block), 0) => {
                // SAFETY: guaranteed by the caller.
                unsafe { self.deallocate(block, osize) };
                ptr::null_mut()
            }
            (None, 0) => ptr::null_mut(),
            (None, _) => self.try_allocate(nsize).map_or(ptr::null_mut(), NonNull::as_ptr),
            // SAFETY: guaranteed by the caller.
            (Some(block), _) => unsafe {
                self.try_reallocate(block, osize, nsize)
                    .map_or(ptr::null_mut(), NonNull::as_ptr)
            },
        }
    }

    /// Classify a pointer by the pool bounds.
    pub fn source_of(&self, ptr: NonNull<u8>) -> AllocationSource {
        let addr = ptr.as_ptr() as usize;
        if addr >= self.begin as usize && addr < self.end as usize {
            AllocationSource::Arena
        } else {
            AllocationSource::Heap
        }
    }

    /// Pool size in bytes.
    pub fn capacity(&self) -> usize {
        self.pool_layout.size()
    }

    /// Bytes consumed by the bump pointer so far.
    pub fn bytes_used(&self) -> usize {
        self.curr as usize - self.begin as usize
    }

    /// Bytes still available to the bump pointer.
    pub fn remaining(&self) -> usize {
        self.end as usize - self.curr as usize
    }

    /// Number of blocks waiting on the free list.
    pub fn free_list_len(&self) -> usize {
        let mut len = 0;
        let mut node = self.free_list_head;
        while let Some(current) = node {
            len += 1;
            // SAFETY: free-list nodes are valid until popped.
            node = unsafe { current.as_ref().next };
        }
        len
    }

    /// Allocation path counters.
    pub fn stats(&self) -> ArenaStats {
        self.stats
    }
}

impl Drop for ArenaAllocator {
    fn drop(&mut self) {
        // SAFETY: the pool was allocated with pool_layout in `new`.
        unsafe { alloc::dealloc(self.pool.as_ptr(), self.pool_layout) }
    }
}

impl fmt::Debug for ArenaAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArenaAllocator")
            .field("capacity", &self.capacity())
            .field("bytes_used", &self.bytes_used())
            .field("free_list_len", &self.free_list_len())
            .field("stats", &self.stats)
            .finish()
    }
}

thread_local! {
    static GLOBAL_ARENA: RefCell<ArenaAllocator> =
        RefCell::new(ArenaAllocator::new(ArenaConfig::default()));
}

/// Run `f` against the calling thread's default pool.
///
/// The pool ([`DEFAULT_POOL_SIZE`] bytes) is created on first use and lives
/// until the thread exits. Calls must not nest.
pub fn with_global_arena<R>(f: impl FnOnce(&mut ArenaAllocator) -> R) -> R {
    GLOBAL_ARENA.with(|arena| f(&mut arena.borrow_mut()))
}
