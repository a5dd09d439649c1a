//! # Field-Allocator Adapter
//!
//! The bridge between one typed column and the untyped [`RawAlloc`]
//! strategy shared by the whole store. Each column owns one adapter; all
//! adapters of a store wrap clones of the same underlying handle.

// SAFETY: This module requires unsafe for the typed deallocation path.
// All unsafe blocks are documented.
#![allow(unsafe_code)]

use super::{AllocError, RawAlloc, MIN_ALIGN};
use std::alloc::Layout;
use std::marker::PhantomData;
use std::ptr::NonNull;

/// Typed allocation view over a shared raw strategy.
///
/// Translates `count`-of-`T` requests into byte layouts, flooring the
/// alignment at `max(align_of::<T>(), MIN_ALIGN)`. The same translation is
/// applied on release, so allocate/deallocate pairs always agree on layout.
pub struct FieldAlloc<T, A: RawAlloc> {
    raw: A,
    _field: PhantomData<T>,
}

impl<T, A: RawAlloc> FieldAlloc<T, A> {
    /// Wraps a raw allocator handle for elements of type `T`.
    #[must_use]
    pub const fn new(raw: A) -> Self {
        Self {
            raw,
            _field: PhantomData,
        }
    }

    /// Returns the wrapped raw allocator handle.
    #[inline]
    #[must_use]
    pub const fn raw(&self) -> &A {
        &self.raw
    }

    /// Byte layout for `count` contiguous elements of `T`.
    fn layout_for(count: usize) -> Result<Layout, AllocError> {
        let align = std::mem::align_of::<T>().max(MIN_ALIGN);
        let size = std::mem::size_of::<T>()
            .checked_mul(count)
            .filter(|&s| s <= isize::MAX as usize)
            .ok_or(AllocError {
                size: usize::MAX,
                align,
            })?;
        Layout::from_size_align(size, align).map_err(|_| AllocError { size, align })
    }

    /// Allocates room for `count` contiguous elements of `T`.
    ///
    /// `count` must be non-zero and `T` must not be zero-sized; columns
    /// short-circuit both cases before reaching the allocator.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] when the layout overflows or the raw
    /// allocator refuses the request.
    pub fn allocate(&self, count: usize) -> Result<NonNull<T>, AllocError> {
        debug_assert!(count > 0, "zero-count field allocation");
        debug_assert!(std::mem::size_of::<T>() > 0, "zero-sized field type");
        let layout = Self::layout_for(count)?;
        Ok(self.raw.allocate(layout)?.cast())
    }

    /// Releases a block previously returned by [`FieldAlloc::allocate`].
    ///
    /// # Safety
    ///
    /// `ptr` must come from `allocate(count)` on an adapter wrapping the
    /// same underlying instance, with the same `count`, and must not be
    /// released twice.
    pub unsafe fn deallocate(&self, ptr: NonNull<T>, count: usize) {
        let layout = Self::layout_for(count).expect("layout was valid at allocation time");
        // SAFETY: per this function's contract, ptr/layout match the
        // original allocation on the same instance.
        unsafe { self.raw.deallocate(ptr.cast(), layout) };
    }
}

impl<T, A: RawAlloc + Clone> Clone for FieldAlloc<T, A> {
    fn clone(&self) -> Self {
        Self::new(self.raw.clone())
    }
}

impl<T, A: RawAlloc + std::fmt::Debug> std::fmt::Debug for FieldAlloc<T, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldAlloc").field("raw", &self.raw).finish()
    }
}

/// Adapters compare by underlying instance, across field types.
///
/// Two adapters for different fields of the same store wrap the same
/// instance and therefore compare equal; adapters over distinct instances
/// compare unequal. This identity is what governs whether storage could be
/// handed between containers without reallocating.
impl<T, U, A: RawAlloc> PartialEq<FieldAlloc<U, A>> for FieldAlloc<T, A> {
    fn eq(&self, other: &FieldAlloc<U, A>) -> bool {
        self.raw.same_instance(&other.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::CacheAligned;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Default)]
    struct Counting {
        calls: AtomicUsize,
    }

    impl RawAlloc for Counting {
        fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            CacheAligned.allocate(layout)
        }

        unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
            unsafe { CacheAligned.deallocate(ptr, layout) };
        }

        fn same_instance(&self, other: &Self) -> bool {
            std::ptr::eq(self, other)
        }
    }

    #[test]
    fn test_alignment_floor() {
        let adapter: FieldAlloc<u8, CacheAligned> = FieldAlloc::new(CacheAligned);
        let ptr = adapter.allocate(3).unwrap();
        assert_eq!(ptr.as_ptr() as usize % MIN_ALIGN, 0);
        unsafe { adapter.deallocate(ptr, 3) };
    }

    #[test]
    fn test_equality_across_field_types() {
        let shared = Arc::new(Counting::default());
        let ints: FieldAlloc<i32, _> = FieldAlloc::new(Arc::clone(&shared));
        let strings: FieldAlloc<String, _> = FieldAlloc::new(Arc::clone(&shared));
        let other: FieldAlloc<i32, _> = FieldAlloc::new(Arc::new(Counting::default()));

        assert!(ints == strings);
        assert!(ints != other);
    }

    #[test]
    fn test_delegates_to_raw() {
        let shared = Arc::new(Counting::default());
        let adapter: FieldAlloc<u64, _> = FieldAlloc::new(Arc::clone(&shared));
        let ptr = adapter.allocate(16).unwrap();
        assert_eq!(shared.calls.load(Ordering::Relaxed), 1);
        unsafe { adapter.deallocate(ptr, 16) };
    }

    #[test]
    fn test_overflowing_count_is_an_error() {
        let adapter: FieldAlloc<u64, CacheAligned> = FieldAlloc::new(CacheAligned);
        assert!(adapter.allocate(usize::MAX / 2).is_err());
    }
}
