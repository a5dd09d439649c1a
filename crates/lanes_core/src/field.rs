//! # Field Binding
//!
//! The compile-time mapping from a symbolic field identifier to its column
//! inside a store. The [`columnar!`] macro emits one marker type per field
//! and implements [`Field`] for it, pinning the identifier to a slot; the
//! type system then carries the binding into access methods and partial
//! views with no runtime lookup.
//!
//! [`columnar!`]: crate::columnar

/// A store with a known, fixed set of columns.
///
/// Implemented by every struct the [`columnar!`](crate::columnar) macro
/// generates.
pub trait Columnar {
    /// Number of declared fields (columns).
    const FIELD_COUNT: usize;

    /// Shared logical length of all columns.
    fn len(&self) -> usize;

    /// Checks if the store holds no rows.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A field identifier bound to one column of store `S`.
///
/// Implementations are generated; the marker type is the identifier and
/// the associated items are the binding. Requesting a field a store does
/// not declare is a missing impl and therefore a compile error.
pub trait Field<S>: Sized {
    /// Element type of the bound column.
    type Value: 'static;

    /// Slot of the column in field declaration order.
    const SLOT: usize;

    /// Declared field name.
    const NAME: &'static str;

    /// Base pointer of the bound column.
    ///
    /// Dangling while the store is unallocated; stepped by iterators, never
    /// dereferenced past the store's length.
    fn as_ptr(store: &S) -> *const Self::Value;

    /// Mutable base pointer of the bound column.
    fn as_mut_ptr(store: &mut S) -> *mut Self::Value;

    /// The bound column as a slice.
    fn slice(store: &S) -> &[Self::Value];

    /// The bound column as a mutable slice.
    fn slice_mut(store: &mut S) -> &mut [Self::Value];
}

/// Checks that a slot list has no repeats.
///
/// Used in const assertions guarding mutable field selections, where a
/// repeated slot would alias two exclusive references.
#[must_use]
pub const fn slots_distinct(slots: &[usize]) -> bool {
    let mut i = 0;
    while i < slots.len() {
        let mut j = i + 1;
        while j < slots.len() {
            if slots[i] == slots[j] {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_distinct() {
        assert!(slots_distinct(&[]));
        assert!(slots_distinct(&[0]));
        assert!(slots_distinct(&[0, 1, 2]));
        assert!(!slots_distinct(&[0, 1, 0]));
        assert!(!slots_distinct(&[2, 2]));
    }
}
