//! # Column Storage
//!
//! One contiguous, allocator-backed dynamic array holding a single field
//! across all rows. This is the building block the [`columnar!`] macro
//! assembles stores from; it is not meant to be driven directly.
//!
//! Growth is amortized doubling. Element memory is requested and released
//! exclusively through the column's [`FieldAlloc`] adapter, so the whole
//! lifecycle of a field's storage flows through one allocator instance.
//!
//! [`columnar!`]: crate::columnar

// SAFETY: This module requires unsafe for raw element storage.
// All unsafe blocks are documented.
#![allow(unsafe_code)]

use crate::alloc::{AllocError, FieldAlloc, RawAlloc};
use std::ptr::NonNull;

/// A contiguous dynamic array for one field.
///
/// Behaves like a `Vec<T>` whose backing memory comes from an injected
/// [`RawAlloc`] strategy. Zero-sized `T` is supported and never allocates.
pub struct RawColumn<T, A: RawAlloc> {
    /// Base of the backing array; dangling while capacity is zero.
    data: NonNull<T>,
    /// Number of initialized elements.
    len: usize,
    /// Number of element slots allocated.
    cap: usize,
    /// Typed view over the store's shared allocator.
    alloc: FieldAlloc<T, A>,
}

impl<T, A: RawAlloc> RawColumn<T, A> {
    /// Creates an empty column backed by `alloc`.
    ///
    /// No memory is requested until capacity is needed.
    #[must_use]
    pub const fn new_in(alloc: A) -> Self {
        Self {
            data: NonNull::dangling(),
            len: 0,
            cap: 0,
            alloc: FieldAlloc::new(alloc),
        }
    }

    /// Returns the number of initialized elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Checks if the column holds no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of slots available without reallocation.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.cap
    }

    /// Returns the column's allocator adapter.
    #[inline]
    #[must_use]
    pub const fn allocator(&self) -> &FieldAlloc<T, A> {
        &self.alloc
    }

    /// Base pointer of the backing array.
    ///
    /// Dangling (but aligned) while capacity is zero; valid for reads of
    /// `len` elements otherwise. Any operation that can reallocate
    /// invalidates previously obtained pointers.
    #[inline]
    #[must_use]
    pub const fn as_ptr(&self) -> *const T {
        self.data.as_ptr()
    }

    /// Mutable base pointer of the backing array.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.data.as_ptr()
    }

    /// Views the initialized elements as a slice.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: data is valid for len initialized elements (dangling is
        // fine for len 0).
        unsafe { std::slice::from_raw_parts(self.data.as_ptr(), self.len) }
    }

    /// Views the initialized elements as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: data is valid for len initialized elements and we hold
        // the exclusive borrow.
        unsafe { std::slice::from_raw_parts_mut(self.data.as_ptr(), self.len) }
    }

    /// Gets an element by index.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    /// Gets a mutable element by index.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    /// Moves the backing array to a fresh allocation of `new_cap` slots.
    ///
    /// `new_cap` must be at least `len`. Zero-sized element types never
    /// allocate; their capacity only ever grows on paper.
    fn try_regrow(&mut self, new_cap: usize) -> Result<(), AllocError> {
        debug_assert!(new_cap >= self.len);

        if std::mem::size_of::<T>() == 0 {
            self.cap = self.cap.max(new_cap);
            return Ok(());
        }
        if new_cap == self.cap {
            return Ok(());
        }
        if new_cap == 0 {
            // SAFETY: cap > 0 here (new_cap != cap), so data was allocated
            // with exactly cap slots by our own adapter.
            unsafe { self.alloc.deallocate(self.data, self.cap) };
            self.data = NonNull::dangling();
            self.cap = 0;
            return Ok(());
        }

        let new_data = self.alloc.allocate(new_cap)?;
        // SAFETY: both regions are valid for len elements and cannot
        // overlap since new_data is a fresh allocation.
        unsafe {
            std::ptr::copy_nonoverlapping(self.data.as_ptr(), new_data.as_ptr(), self.len);
        }
        if self.cap > 0 {
            // SAFETY: data was allocated with exactly cap slots by our own
            // adapter.
            unsafe { self.alloc.deallocate(self.data, self.cap) };
        }
        self.data = new_data;
        self.cap = new_cap;
        Ok(())
    }

    /// Ensures capacity for at least `capacity` elements.
    ///
    /// Length is unaffected. On failure nothing changes.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] when the allocator refuses the request.
    pub fn try_reserve(&mut self, capacity: usize) -> Result<(), AllocError> {
        if capacity > self.cap {
            self.try_regrow(capacity)?;
        }
        Ok(())
    }

    /// Ensures capacity for at least `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if the allocator refuses the request.
    pub fn reserve(&mut self, capacity: usize) {
        if let Err(err) = self.try_reserve(capacity) {
            panic!("column allocation failed: {err}");
        }
    }

    /// Makes room for `extra` more elements, doubling capacity as needed.
    fn ensure_room(&mut self, extra: usize) {
        let needed = self.len.checked_add(extra).expect("column length overflow");
        if needed > self.cap {
            let target = needed.max(self.cap * 2).max(8);
            self.reserve(target);
        }
    }

    /// Releases capacity beyond the current length.
    pub fn shrink_to_fit(&mut self) {
        if std::mem::size_of::<T>() == 0 {
            self.cap = self.len;
            return;
        }
        if self.cap > self.len {
            if let Err(err) = self.try_regrow(self.len) {
                panic!("column allocation failed: {err}");
            }
        }
    }

    /// Appends one element.
    pub fn push(&mut self, value: T) {
        self.ensure_room(1);
        // SAFETY: len < cap after ensure_room, so the slot is in bounds
        // and uninitialized.
        unsafe { std::ptr::write(self.data.as_ptr().add(self.len), value) };
        self.len += 1;
    }

    /// Removes and returns the last element.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot at the old last index is initialized and is
        // never read again after len was decremented.
        Some(unsafe { std::ptr::read(self.data.as_ptr().add(self.len)) })
    }

    /// Inserts one element at `at`, shifting the tail right.
    ///
    /// `at` must be at most `len`; the store validates this before any
    /// column is touched.
    pub fn insert(&mut self, at: usize, value: T) {
        debug_assert!(at <= self.len);
        self.ensure_room(1);
        // SAFETY: len < cap after ensure_room; the shifted region stays in
        // bounds and the vacated slot is then written exactly once.
        unsafe {
            let base = self.data.as_ptr();
            std::ptr::copy(base.add(at), base.add(at + 1), self.len - at);
            std::ptr::write(base.add(at), value);
        }
        self.len += 1;
    }

    /// Removes the half-open index range `[start, end)`, shifting the tail
    /// left.
    ///
    /// Bounds must satisfy `start <= end <= len`; the store validates this
    /// before any column is touched.
    pub fn remove_range(&mut self, start: usize, end: usize) {
        debug_assert!(start <= end && end <= self.len);
        let removed = end - start;
        if removed == 0 {
            return;
        }
        // SAFETY: the range is initialized and in bounds; after dropping,
        // the tail is moved over it with a possibly-overlapping copy.
        unsafe {
            let base = self.data.as_ptr();
            std::ptr::drop_in_place(std::ptr::slice_from_raw_parts_mut(base.add(start), removed));
            std::ptr::copy(base.add(end), base.add(start), self.len - end);
        }
        self.len -= removed;
    }

    /// Shortens the column to `new_len` elements, dropping the tail.
    ///
    /// No effect when `new_len >= len`.
    pub fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len {
            return;
        }
        let tail = self.len - new_len;
        // Commit the new length before dropping so a panicking Drop cannot
        // expose dropped elements.
        self.len = new_len;
        // SAFETY: the tail elements were initialized and are now outside
        // the committed length.
        unsafe {
            std::ptr::drop_in_place(std::ptr::slice_from_raw_parts_mut(
                self.data.as_ptr().add(new_len),
                tail,
            ));
        }
    }

    /// Removes every element, keeping capacity.
    #[inline]
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Grows or shrinks to `new_len`, filling new slots from `fill`.
    pub fn resize_with<F: FnMut() -> T>(&mut self, new_len: usize, mut fill: F) {
        if new_len <= self.len {
            self.truncate(new_len);
            return;
        }
        self.reserve(new_len);
        while self.len < new_len {
            // SAFETY: len < new_len <= cap, so the slot is in bounds and
            // uninitialized. Length is committed per element so a panicking
            // fill leaves the column valid.
            unsafe { std::ptr::write(self.data.as_ptr().add(self.len), fill()) };
            self.len += 1;
        }
    }
}

impl<T, A: RawAlloc> Drop for RawColumn<T, A> {
    fn drop(&mut self) {
        // SAFETY: the first len slots are initialized.
        unsafe {
            std::ptr::drop_in_place(std::ptr::slice_from_raw_parts_mut(
                self.data.as_ptr(),
                self.len,
            ));
        }
        if self.cap > 0 && std::mem::size_of::<T>() > 0 {
            // SAFETY: data was allocated with exactly cap slots by our own
            // adapter and is released exactly once.
            unsafe { self.alloc.deallocate(self.data, self.cap) };
        }
    }
}

// SAFETY: the column exclusively owns its elements and allocator handle, so
// it is as Send/Sync as they are.
unsafe impl<T: Send, A: RawAlloc + Send> Send for RawColumn<T, A> {}
// SAFETY: shared access only exposes &T and &A.
unsafe impl<T: Sync, A: RawAlloc + Sync> Sync for RawColumn<T, A> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::CacheAligned;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn column<T>() -> RawColumn<T, CacheAligned> {
        RawColumn::new_in(CacheAligned)
    }

    #[test]
    fn test_push_pop() {
        let mut col = column::<u32>();
        assert!(col.is_empty());
        col.push(1);
        col.push(2);
        col.push(3);
        assert_eq!(col.as_slice(), &[1, 2, 3]);
        assert_eq!(col.pop(), Some(3));
        assert_eq!(col.len(), 2);
        assert_eq!(col.pop(), Some(2));
        assert_eq!(col.pop(), Some(1));
        assert_eq!(col.pop(), None);
    }

    #[test]
    fn test_insert_shifts_tail() {
        let mut col = column::<u32>();
        col.push(1);
        col.push(3);
        col.insert(1, 2);
        assert_eq!(col.as_slice(), &[1, 2, 3]);
        col.insert(0, 0);
        assert_eq!(col.as_slice(), &[0, 1, 2, 3]);
        col.insert(4, 4);
        assert_eq!(col.as_slice(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_remove_range() {
        let mut col = column::<u32>();
        for v in 0..6 {
            col.push(v);
        }
        col.remove_range(1, 4);
        assert_eq!(col.as_slice(), &[0, 4, 5]);
        col.remove_range(0, 0);
        assert_eq!(col.as_slice(), &[0, 4, 5]);
    }

    #[test]
    fn test_reserve_keeps_length() {
        let mut col = column::<u64>();
        col.try_reserve(100).unwrap();
        assert!(col.capacity() >= 100);
        assert_eq!(col.len(), 0);
    }

    #[test]
    fn test_shrink_to_fit_releases_tail_capacity() {
        let mut col = column::<u64>();
        col.reserve(64);
        col.push(7);
        col.shrink_to_fit();
        assert_eq!(col.capacity(), 1);
        assert_eq!(col.as_slice(), &[7]);

        col.pop();
        col.shrink_to_fit();
        assert_eq!(col.capacity(), 0);
    }

    #[test]
    fn test_resize_with() {
        let mut col = column::<String>();
        col.resize_with(3, || "x".to_string());
        assert_eq!(col.as_slice(), &["x", "x", "x"]);
        col.resize_with(1, String::new);
        assert_eq!(col.as_slice(), &["x"]);
    }

    #[test]
    fn test_drop_runs_for_all_elements() {
        static DROPS: AtomicUsize = AtomicUsize::new(0);

        struct Probe;
        impl Drop for Probe {
            fn drop(&mut self) {
                DROPS.fetch_add(1, Ordering::Relaxed);
            }
        }

        DROPS.store(0, Ordering::Relaxed);
        let mut col = column::<Probe>();
        for _ in 0..5 {
            col.push(Probe);
        }
        col.truncate(3);
        assert_eq!(DROPS.load(Ordering::Relaxed), 2);
        drop(col);
        assert_eq!(DROPS.load(Ordering::Relaxed), 5);
    }

    #[test]
    fn test_zero_sized_elements_never_allocate() {
        let mut col = column::<()>();
        for _ in 0..1000 {
            col.push(());
        }
        assert_eq!(col.len(), 1000);
        assert!(col.capacity() >= 1000);
        assert_eq!(col.pop(), Some(()));
    }
}
