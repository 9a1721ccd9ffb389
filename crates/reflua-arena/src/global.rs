//! Heap fallback used once the arena pool is exhausted.

use std::alloc::{self, Layout};
use std::ptr::{self, NonNull};

use crate::ALIGNMENT;

/// Allocates straight from the global heap.
///
/// Blocks are aligned to [`ALIGNMENT`]. Zero-sized requests are bumped to a
/// single byte so every returned pointer is unique and deallocatable.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlobalAllocator;

impl GlobalAllocator {
    fn layout(size: usize) -> Option<Layout> {
        Layout::from_size_align(size.max(1), ALIGNMENT).ok()
    }

    /// Allocate `size` bytes, or `None` if the heap refuses or the size is
    /// not representable.
    pub fn try_allocate(&self, size: usize) -> Option<NonNull<u8>> {
        let layout = Self::layout(size)?;
        // SAFETY: layout has a non-zero size.
        NonNull::new(unsafe { alloc::alloc(layout) })
    }

    /// Allocate `size` bytes.
    ///
    /// # Panics
    ///
    /// If `size` exceeds `isize::MAX`. Out-of-memory aborts through
    /// [`alloc::handle_alloc_error`].
    pub fn allocate(&self, size: usize) -> NonNull<u8> {
        let Some(layout) = Self::layout(size) else {
            panic!("allocation of {size} bytes exceeds isize::MAX");
        };
        // SAFETY: layout has a non-zero size.
        let raw = unsafe { alloc::alloc(layout) };
        NonNull::new(raw).unwrap_or_else(|| alloc::handle_alloc_error(layout))
    }

    /// Return a block to the heap.
    ///
    /// # Safety
    ///
    /// `ptr` must come from [`GlobalAllocator::allocate`] with the same `size`.
    pub unsafe fn deallocate(&self, ptr: NonNull<u8>, size: usize) {
        let Some(layout) = Self::layout(size) else {
            debug_assert!(false, "no heap block of {size} bytes can exist");
            return;
        };
        // SAFETY: guaranteed by the caller.
        unsafe { alloc::dealloc(ptr.as_ptr(), layout) }
    }

    /// Move a block into a freshly allocated one of `new_size` bytes.
    ///
    /// # Safety
    ///
    /// Same contract as [`GlobalAllocator::deallocate`] for `ptr`/`old_size`.
    pub unsafe fn reallocate(&self, ptr: NonNull<u8>, old_size: usize, new_size: usize) -> NonNull<u8> {
        let new_ptr = self.allocate(new_size);
        // SAFETY: both blocks hold at least min(old_size, new_size) bytes and
        // do not overlap.
        unsafe {
            ptr::copy_nonoverlapping(ptr.as_ptr(), new_ptr.as_ptr(), old_size.min(new_size));
            self.deallocate(ptr, old_size);
        }
        new_ptr
    }
}
