//! # Field Selection
//!
//! Tuples of field markers form partial views: an ordered, possibly
//! repeating subset of a store's fields. The tuple order is the view's
//! order, unrelated to field declaration order, and each selected field
//! contributes one tracked pointer to the view's iterator.
//!
//! Shared selections may repeat a field. Mutable selections must not,
//! since a repeat would alias two exclusive references; this is rejected
//! at compile time through a const assertion evaluated when the selection
//! is first used.

// SAFETY: This module requires unsafe for the pointer-stepping selection
// contract. All unsafe blocks are documented.
#![allow(unsafe_code)]

use crate::field::{slots_distinct, Field};

/// An ordered selection of fields from store `S`, for shared iteration.
///
/// Implemented for tuples of [`Field`] markers up to arity 8.
pub trait FieldSelect<S>: Sized {
    /// One const pointer per selected field, in selection order.
    type Ptrs: Copy;

    /// One shared reference per selected field, in selection order.
    type Refs<'a>;

    /// Base pointers of the selected columns.
    fn base(store: &S) -> Self::Ptrs;

    /// Offsets every tracked pointer by `delta` elements.
    ///
    /// # Safety
    ///
    /// The resulting pointers must stay within (or one past) the columns'
    /// allocations.
    unsafe fn offset(ptrs: Self::Ptrs, delta: isize) -> Self::Ptrs;

    /// Dereferences every tracked pointer.
    ///
    /// # Safety
    ///
    /// Every pointer must be in bounds and the referenced elements must
    /// stay borrowed for `'a`.
    unsafe fn refs<'a>(ptrs: Self::Ptrs) -> Self::Refs<'a>;
}

/// An ordered selection of distinct fields from store `S`, for mutable
/// iteration.
pub trait FieldSelectMut<S>: Sized {
    /// One mut pointer per selected field, in selection order.
    type PtrsMut: Copy;

    /// One exclusive reference per selected field, in selection order.
    type RefsMut<'a>;

    /// Compile-time proof that no field is selected twice.
    ///
    /// Evaluated when a mutable view is constructed; a repeated field
    /// fails the build.
    const DISTINCT: ();

    /// Base pointers of the selected columns.
    fn base_mut(store: &mut S) -> Self::PtrsMut;

    /// Offsets every tracked pointer by `delta` elements.
    ///
    /// # Safety
    ///
    /// The resulting pointers must stay within (or one past) the columns'
    /// allocations.
    unsafe fn offset_mut(ptrs: Self::PtrsMut, delta: isize) -> Self::PtrsMut;

    /// Dereferences every tracked pointer exclusively.
    ///
    /// # Safety
    ///
    /// Every pointer must be in bounds, distinct (guaranteed by
    /// [`Self::DISTINCT`]), not handed out twice for overlapping
    /// lifetimes, and the referenced elements must stay exclusively
    /// borrowed for `'a`.
    unsafe fn refs_mut<'a>(ptrs: Self::PtrsMut) -> Self::RefsMut<'a>;
}

macro_rules! impl_field_select {
    ($( $F:ident . $idx:tt ),+) => {
        impl<S, $($F: Field<S>),+> FieldSelect<S> for ($($F,)+) {
            type Ptrs = ($(*const $F::Value,)+);
            type Refs<'a> = ($(&'a $F::Value,)+);

            #[inline]
            fn base(store: &S) -> Self::Ptrs {
                ($($F::as_ptr(store),)+)
            }

            #[inline]
            unsafe fn offset(ptrs: Self::Ptrs, delta: isize) -> Self::Ptrs {
                // SAFETY: per this function's contract the offsets stay in
                // bounds of each column.
                ($(unsafe { ptrs.$idx.offset(delta) },)+)
            }

            #[inline]
            unsafe fn refs<'a>(ptrs: Self::Ptrs) -> Self::Refs<'a> {
                // SAFETY: per this function's contract every pointer is in
                // bounds and borrowed for 'a.
                ($(unsafe { &*ptrs.$idx },)+)
            }
        }

        impl<S, $($F: Field<S>),+> FieldSelectMut<S> for ($($F,)+) {
            type PtrsMut = ($(*mut $F::Value,)+);
            type RefsMut<'a> = ($(&'a mut $F::Value,)+);

            const DISTINCT: () = assert!(
                slots_distinct(&[$($F::SLOT),+]),
                "mutable field selection repeats a field"
            );

            #[inline]
            fn base_mut(store: &mut S) -> Self::PtrsMut {
                ($($F::as_mut_ptr(store),)+)
            }

            #[inline]
            unsafe fn offset_mut(ptrs: Self::PtrsMut, delta: isize) -> Self::PtrsMut {
                // SAFETY: per this function's contract the offsets stay in
                // bounds of each column.
                ($(unsafe { ptrs.$idx.offset(delta) },)+)
            }

            #[inline]
            unsafe fn refs_mut<'a>(ptrs: Self::PtrsMut) -> Self::RefsMut<'a> {
                // SAFETY: the pointers target distinct columns (DISTINCT)
                // and the caller hands each element out at most once.
                ($(unsafe { &mut *ptrs.$idx },)+)
            }
        }
    };
}

impl_field_select!(F0.0);
impl_field_select!(F0.0, F1.1);
impl_field_select!(F0.0, F1.1, F2.2);
impl_field_select!(F0.0, F1.1, F2.2, F3.3);
impl_field_select!(F0.0, F1.1, F2.2, F3.3, F4.4);
impl_field_select!(F0.0, F1.1, F2.2, F3.3, F4.4, F5.5);
impl_field_select!(F0.0, F1.1, F2.2, F3.3, F4.4, F5.5, F6.6);
impl_field_select!(F0.0, F1.1, F2.2, F3.3, F4.4, F5.5, F6.6, F7.7);
