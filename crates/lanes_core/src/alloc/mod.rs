//! # Allocation Layer
//!
//! The store does not talk to the global allocator directly. Every column
//! routes its memory through an injected strategy object implementing
//! [`RawAlloc`], so callers control memory provenance per store.
//!
//! ## Design Philosophy
//!
//! - The raw contract is untyped: bytes plus alignment, nothing else
//! - The typed, per-field view lives in [`FieldAlloc`], which translates
//!   element counts into layouts and floors alignment at a cache line
//! - Identity matters: two handles to the same underlying instance must
//!   report [`RawAlloc::same_instance`], because instance equality is what
//!   permits moving storage between containers without copying

// SAFETY: This module requires unsafe to call the std allocation entry
// points. All unsafe blocks are documented.
#![allow(unsafe_code)]

mod adapter;

pub use adapter::FieldAlloc;

use std::alloc::Layout;
use std::ptr::NonNull;
use std::sync::Arc;
use thiserror::Error;

/// Minimum alignment handed to the raw allocator, in bytes.
///
/// One cache line. Column bases are aligned at least this much so that
/// per-field traversal never straddles a line at element zero.
pub const MIN_ALIGN: usize = 64;

/// A raw allocation request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("allocation of {size} bytes (align {align}) failed")]
pub struct AllocError {
    /// Requested size in bytes.
    pub size: usize,
    /// Requested alignment in bytes.
    pub align: usize,
}

impl AllocError {
    /// Creates an error describing a refused layout.
    #[must_use]
    pub const fn new(layout: Layout) -> Self {
        Self {
            size: layout.size(),
            align: layout.align(),
        }
    }
}

/// The untyped allocation strategy a store consumes.
///
/// Implementations may be zero-sized global strategies, arena handles, or
/// shared references to stateful allocators. A store clones one handle per
/// column; for stateful allocators the clone must refer to the *same*
/// underlying instance (use [`Arc`] or a shared reference).
pub trait RawAlloc {
    /// Allocates a block described by `layout`.
    ///
    /// `layout.size()` is never zero; columns handle zero-sized requests
    /// themselves and never forward them here.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] when the block cannot be provided. The caller
    /// propagates the failure without retrying.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Releases a block previously returned by [`RawAlloc::allocate`].
    ///
    /// # Safety
    ///
    /// `ptr` must come from `allocate` on this same instance with this same
    /// `layout`, and must not be released twice.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Reports whether two handles denote the same allocator instance.
    ///
    /// Blocks are only interchangeable between handles for which this
    /// returns `true`.
    fn same_instance(&self, other: &Self) -> bool;
}

/// The default allocation strategy: the std allocator.
///
/// Zero-sized and stateless, so every instance is the same instance. The
/// cache-line alignment floor is applied by [`FieldAlloc`] before requests
/// reach this type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheAligned;

impl RawAlloc for CacheAligned {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        debug_assert!(layout.size() > 0, "zero-sized raw allocation");
        // SAFETY: layout has non-zero size per the trait contract.
        let ptr = unsafe { std::alloc::alloc(layout) };
        NonNull::new(ptr).ok_or(AllocError::new(layout))
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: caller guarantees ptr/layout came from allocate above.
        unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) };
    }

    #[inline]
    fn same_instance(&self, _other: &Self) -> bool {
        true
    }
}

/// Shared ownership of a stateful allocator.
///
/// Cloning the handle shares the instance, and identity follows the
/// allocation, not the handle.
impl<A: RawAlloc> RawAlloc for Arc<A> {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        (**self).allocate(layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded verbatim; the inner instance is the one that
        // produced ptr.
        unsafe { (**self).deallocate(ptr, layout) };
    }

    #[inline]
    fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

/// A borrowed allocator owned by the caller.
impl<A: RawAlloc> RawAlloc for &A {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        (**self).allocate(layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded verbatim to the borrowed instance.
        unsafe { (**self).deallocate(ptr, layout) };
    }

    #[inline]
    fn same_instance(&self, other: &Self) -> bool {
        std::ptr::eq(*self, *other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct Counting {
        live: AtomicUsize,
    }

    impl RawAlloc for Counting {
        fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
            self.live.fetch_add(1, Ordering::Relaxed);
            CacheAligned.allocate(layout)
        }

        unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
            self.live.fetch_sub(1, Ordering::Relaxed);
            unsafe { CacheAligned.deallocate(ptr, layout) };
        }

        fn same_instance(&self, other: &Self) -> bool {
            std::ptr::eq(self, other)
        }
    }

    #[test]
    fn test_cache_aligned_roundtrip() {
        let layout = Layout::from_size_align(128, MIN_ALIGN).unwrap();
        let ptr = CacheAligned.allocate(layout).unwrap();
        assert_eq!(ptr.as_ptr() as usize % MIN_ALIGN, 0);
        unsafe { CacheAligned.deallocate(ptr, layout) };
    }

    #[test]
    fn test_arc_handle_identity() {
        let a = Arc::new(Counting::default());
        let b = Arc::clone(&a);
        let c = Arc::new(Counting::default());
        assert!(a.same_instance(&b));
        assert!(!a.same_instance(&c));
    }

    #[test]
    fn test_borrowed_handle_identity() {
        let a = Counting::default();
        let b = Counting::default();
        assert!((&a).same_instance(&&a));
        assert!(!(&a).same_instance(&&b));
    }

    #[test]
    fn test_arc_handle_balances_calls() {
        let alloc = Arc::new(Counting::default());
        let layout = Layout::from_size_align(64, MIN_ALIGN).unwrap();
        let ptr = alloc.allocate(layout).unwrap();
        assert_eq!(alloc.live.load(Ordering::Relaxed), 1);
        unsafe { alloc.deallocate(ptr, layout) };
        assert_eq!(alloc.live.load(Ordering::Relaxed), 0);
    }
}
