//! # Partial Iterators
//!
//! Iterators over a caller-chosen subset of a store's fields. One raw
//! pointer per *selected* field is stepped in lockstep, so traversal never
//! touches the columns the caller did not ask for.
//!
//! Pointer invalidation follows contiguous-array rules: any store
//! operation that can reallocate requires `&mut` access, which the borrow
//! checker refuses while one of these iterators is alive.

// SAFETY: This module requires unsafe to step and dereference the tracked
// column pointers. All unsafe blocks are documented.
#![allow(unsafe_code)]

use crate::field::Columnar;
use crate::select::{FieldSelect, FieldSelectMut};
use std::marker::PhantomData;

/// Shared iterator over a field selection of store `S`.
///
/// Yields one reference tuple per row, in row order and selection-tuple
/// order within each item. Supports constant-time skipping from both ends.
pub struct PartialIter<'a, S, Sel: FieldSelect<S>> {
    /// Tracked pointers, positioned at the next front element.
    ptrs: Sel::Ptrs,
    /// Rows not yet yielded from either end.
    remaining: usize,
    _store: PhantomData<&'a S>,
}

impl<'a, S: Columnar, Sel: FieldSelect<S>> PartialIter<'a, S, Sel> {
    /// Positions a new iterator at row 0 of `store`.
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self {
            ptrs: Sel::base(store),
            remaining: store.len(),
            _store: PhantomData,
        }
    }
}

impl<'a, S, Sel: FieldSelect<S>> Iterator for PartialIter<'a, S, Sel> {
    type Item = Sel::Refs<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        // SAFETY: remaining > 0 proves every tracked pointer addresses an
        // initialized element, and advancing stays within one past the end.
        let item = unsafe { Sel::refs(self.ptrs) };
        self.ptrs = unsafe { Sel::offset(self.ptrs, 1) };
        self.remaining -= 1;
        Some(item)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }

    #[inline]
    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        if n >= self.remaining {
            self.remaining = 0;
            return None;
        }
        // SAFETY: n < remaining keeps every tracked pointer in bounds.
        self.ptrs = unsafe { Sel::offset(self.ptrs, n as isize) };
        self.remaining -= n;
        self.next()
    }
}

impl<'a, S, Sel: FieldSelect<S>> DoubleEndedIterator for PartialIter<'a, S, Sel> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        // SAFETY: remaining now indexes the last unyielded row, which is
        // initialized and in bounds for every tracked pointer.
        Some(unsafe { Sel::refs(Sel::offset(self.ptrs, self.remaining as isize)) })
    }

    #[inline]
    fn nth_back(&mut self, n: usize) -> Option<Self::Item> {
        if n >= self.remaining {
            self.remaining = 0;
            return None;
        }
        self.remaining -= n;
        self.next_back()
    }
}

impl<'a, S, Sel: FieldSelect<S>> ExactSizeIterator for PartialIter<'a, S, Sel> {}
impl<'a, S, Sel: FieldSelect<S>> std::iter::FusedIterator for PartialIter<'a, S, Sel> {}

impl<'a, S, Sel: FieldSelect<S>> Clone for PartialIter<'a, S, Sel> {
    fn clone(&self) -> Self {
        Self {
            ptrs: self.ptrs,
            remaining: self.remaining,
            _store: PhantomData,
        }
    }
}

/// Mutable iterator over a field selection of store `S`.
///
/// The selection must not repeat a field; repeats are rejected at compile
/// time when the iterator is constructed.
pub struct PartialIterMut<'a, S, Sel: FieldSelectMut<S>> {
    /// Tracked pointers, positioned at the next front element.
    ptrs: Sel::PtrsMut,
    /// Rows not yet yielded from either end.
    remaining: usize,
    _store: PhantomData<&'a mut S>,
}

impl<'a, S: Columnar, Sel: FieldSelectMut<S>> PartialIterMut<'a, S, Sel> {
    /// Positions a new iterator at row 0 of `store`.
    #[must_use]
    pub fn new(store: &'a mut S) -> Self {
        let () = Sel::DISTINCT;
        let remaining = store.len();
        Self {
            ptrs: Sel::base_mut(store),
            remaining,
            _store: PhantomData,
        }
    }
}

impl<'a, S, Sel: FieldSelectMut<S>> Iterator for PartialIterMut<'a, S, Sel> {
    type Item = Sel::RefsMut<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        // SAFETY: remaining > 0 proves the row is initialized; each row is
        // yielded at most once, so the exclusive references never alias.
        let item = unsafe { Sel::refs_mut(self.ptrs) };
        self.ptrs = unsafe { Sel::offset_mut(self.ptrs, 1) };
        self.remaining -= 1;
        Some(item)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }

    #[inline]
    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        if n >= self.remaining {
            self.remaining = 0;
            return None;
        }
        // SAFETY: n < remaining keeps every tracked pointer in bounds.
        self.ptrs = unsafe { Sel::offset_mut(self.ptrs, n as isize) };
        self.remaining -= n;
        self.next()
    }
}

impl<'a, S, Sel: FieldSelectMut<S>> DoubleEndedIterator for PartialIterMut<'a, S, Sel> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        // SAFETY: remaining now indexes the last unyielded row; the front
        // cursor can no longer reach it, so exclusivity holds.
        Some(unsafe { Sel::refs_mut(Sel::offset_mut(self.ptrs, self.remaining as isize)) })
    }

    #[inline]
    fn nth_back(&mut self, n: usize) -> Option<Self::Item> {
        if n >= self.remaining {
            self.remaining = 0;
            return None;
        }
        self.remaining -= n;
        self.next_back()
    }
}

impl<'a, S, Sel: FieldSelectMut<S>> ExactSizeIterator for PartialIterMut<'a, S, Sel> {}
impl<'a, S, Sel: FieldSelectMut<S>> std::iter::FusedIterator for PartialIterMut<'a, S, Sel> {}
