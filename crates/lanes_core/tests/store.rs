//! # Store Verification Tests
//!
//! These tests verify the structure-of-arrays store end to end:
//!
//! 1. **Lockstep**: every length-changing operation keeps all columns equal
//! 2. **Rows**: owned/shared/exclusive row tuples and their conversions
//! 3. **Partial views**: field-subset iteration agrees with whole-row iteration
//! 4. **Allocation**: custom strategies see every request, balanced and aligned
//!
//! Run with: cargo test --test store -- --nocapture

use std::alloc::Layout;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lanes_core::{columnar, AllocError, Error, RawAlloc, MIN_ALIGN};

columnar! {
    /// Three-field store exercised by most tests below.
    pub struct Items {
        id: u32,
        weight: f32,
        label: String,
    }
}

columnar! {
    /// Two-field store used by the canonical walkthrough sequence.
    pub struct Entries {
        num: i32,
        tag: String,
    }
}

columnar! {
    /// Field names that shadow iterator-adjacent vocabulary.
    pub struct Cursors {
        remaining: usize,
        marker: u8,
    }
}

fn sample() -> Items {
    let mut items = Items::new();
    items.push(1, 0.5, "anvil".to_string());
    items.push(2, 0.25, "ingot".to_string());
    items.push(3, 4.0, "crate".to_string());
    items
}

// ============================================================================
// LOCKSTEP AND LENGTH-CHANGING OPERATIONS
// ============================================================================

#[test]
fn verify_lockstep_through_mixed_operations() {
    let mut items = Items::new();
    assert!(items.is_empty());

    items.push(10, 1.0, "a".to_string());
    items.push_row(ItemsRow {
        id: 11,
        weight: 2.0,
        label: "b".to_string(),
    });
    items.insert(1, 12, 3.0, "c".to_string());
    assert_eq!(items.len(), 3);
    assert_eq!(items.id().len(), 3);
    assert_eq!(items.weight().len(), 3);
    assert_eq!(items.label().len(), 3);
    assert_eq!(items.id(), &[10, 12, 11]);

    items.erase(1);
    assert_eq!(items.id(), &[10, 11]);
    assert_eq!(items.label(), &["a", "b"]);

    items.resize(4);
    assert_eq!(items.len(), 4);
    assert_eq!(items.id(), &[10, 11, 0, 0]);
    assert_eq!(items.label()[2], "");

    items.truncate(1);
    assert_eq!(items.len(), 1);
    items.clear();
    assert!(items.is_empty());
}

#[test]
fn verify_default_strategy_constructors_infer() {
    // No type annotations: the default strategy must be pinned by the
    // constructors themselves.
    let a = Items::new();
    assert!(a.is_empty());
    let b = Items::with_capacity(8);
    assert!(b.capacity() >= 8);
    let c: Items = Items::default();
    assert_eq!(c.len(), 0);

    // Default also covers custom strategies once the type names one.
    let d: Items<Arc<Counting>> = Items::default();
    assert!(d.is_empty());
}

#[test]
fn verify_two_field_walkthrough() {
    let mut entries = Entries::new();
    entries.push(1, "a".to_string());
    entries.push(2, "b".to_string());
    entries.push(3, "c".to_string());

    let next = entries.erase(0);
    assert_eq!(next, 0);
    assert_eq!(entries.num(), &[2, 3]);
    assert_eq!(entries.tag(), &["b", "c"]);

    entries.resize_with(
        4,
        EntriesRow {
            num: 0,
            tag: "z".to_string(),
        },
    );
    assert_eq!(entries.num(), &[2, 3, 0, 0]);
    assert_eq!(entries.tag(), &["b", "c", "z", "z"]);

    // sort() must leave the columns untouched and in lockstep.
    entries.sort();
    assert_eq!(entries.num(), &[2, 3, 0, 0]);
    assert_eq!(entries.tag(), &["b", "c", "z", "z"]);
}

#[test]
fn verify_iterator_adjacent_field_names() {
    let mut cursors = Cursors::new();
    cursors.push(5, 1);
    cursors.push(3, 2);

    let left: Vec<usize> = cursors.iter().map(|row| *row.remaining).collect();
    assert_eq!(left, [5, 3]);
    let tags: Vec<u8> = cursors.iter().rev().map(|row| *row.marker).collect();
    assert_eq!(tags, [2, 1]);

    for (remaining,) in cursors.iter_fields_mut::<(cursors_fields::remaining,)>() {
        *remaining -= 1;
    }
    assert_eq!(cursors.remaining(), &[4, 2]);
}

#[test]
fn verify_pop_first_last() {
    let mut items = Items::new();
    assert!(items.pop().is_none());
    assert!(items.first().is_none());
    assert!(items.last().is_none());

    items = sample();
    {
        let first = items.first().unwrap();
        assert_eq!(*first.id, 1);
    }
    {
        let last = items.last().unwrap();
        assert_eq!(last.label, "crate");
    }

    let popped = items.pop().unwrap();
    assert_eq!(popped.id, 3);
    assert_eq!(popped.label, "crate");
    assert_eq!(items.len(), 2);

    if let Some(last) = items.last_mut() {
        *last.weight = 9.0;
    }
    assert_eq!(items.weight(), &[0.5, 9.0]);
}

#[test]
fn verify_insert_at_len_matches_push() {
    let mut a = sample();
    let mut b = sample();
    let row = ItemsRow {
        id: 4,
        weight: 1.5,
        label: "rope".to_string(),
    };
    a.insert_row(a.len(), row.clone());
    b.push_row(row);
    assert_eq!(a.id(), b.id());
    assert_eq!(a.label(), b.label());
}

#[test]
fn verify_erase_returns_successor_index() {
    let mut items = sample();
    let next = items.erase(0);
    assert_eq!(next, 0);
    assert_eq!(items.id(), &[2, 3]);

    items = sample();
    let next = items.erase_range(1..3);
    assert_eq!(next, 1);
    assert_eq!(items.id(), &[1]);

    // Empty range is a no-op but still validated.
    let next = items.erase_range(1..1);
    assert_eq!(next, 1);
    assert_eq!(items.len(), 1);
}

#[test]
fn verify_resize_with_clones_fill_row() {
    let mut items = sample();
    items.resize_with(
        5,
        ItemsRow {
            id: 0,
            weight: 0.0,
            label: "pad".to_string(),
        },
    );
    assert_eq!(items.len(), 5);
    assert_eq!(items.label(), &["anvil", "ingot", "crate", "pad", "pad"]);

    // Shrinking ignores the fill.
    items.resize_with(
        2,
        ItemsRow {
            id: 99,
            weight: 9.9,
            label: "unused".to_string(),
        },
    );
    assert_eq!(items.id(), &[1, 2]);
}

#[test]
fn verify_extend_from_rows() {
    let mut items = Items::new();
    items.extend((0..4).map(|i| ItemsRow {
        id: i,
        weight: f32::from(u8::try_from(i).unwrap()),
        label: format!("item-{i}"),
    }));
    assert_eq!(items.len(), 4);
    assert_eq!(items.label()[3], "item-3");
}

#[test]
#[should_panic(expected = "insert index 5 out of range")]
fn verify_insert_past_len_panics() {
    let mut items = sample();
    items.insert(5, 9, 9.0, "bad".to_string());
}

#[test]
#[should_panic(expected = "erase range 2..1 out of range")]
fn verify_inverted_erase_range_panics() {
    let mut items = sample();
    items.erase_range(2..1);
}

#[test]
#[should_panic(expected = "out of range for store of length 3")]
fn verify_erase_past_len_panics() {
    let mut items = sample();
    items.erase(3);
}

// ============================================================================
// ROW ACCESS
// ============================================================================

#[test]
fn verify_value_at_roundtrip() {
    let items = sample();
    let row = items.value_at(1).unwrap();
    assert_eq!(row.id, 2);
    assert_eq!(row.label, "ingot");

    let err = items.value_at(3).map(|_| ()).unwrap_err();
    assert_eq!(err, Error::OutOfRange { index: 3, len: 3 });
}

#[test]
fn verify_push_row_from_view_clones() {
    let mut items = sample();
    let copy = ItemsRow::from(items.get(0).unwrap());
    items.push_row(copy);
    assert_eq!(items.len(), 4);
    assert_eq!(items.label(), &["anvil", "ingot", "crate", "anvil"]);

    // Mutating the copy leaves the original untouched.
    items.get_mut(3).unwrap().label.push_str("-copy");
    assert_eq!(items.label()[0], "anvil");
    assert_eq!(items.label()[3], "anvil-copy");
}

#[test]
fn verify_get_and_views() {
    let mut items = sample();
    assert!(items.get(3).is_none());
    assert!(items.get_mut(3).is_none());
    assert!(items.ref_at(3).is_err());
    assert!(items.mut_at(3).is_err());

    {
        let row = items.ref_at(2).unwrap();
        assert_eq!(*row.id, 3);
        // RowRef is Copy.
        let again = row;
        assert_eq!(again.label, "crate");
    }

    let row = items.mut_at(0).unwrap();
    *row.weight = 100.0;
    row.label.make_ascii_uppercase();
    assert_eq!(items.weight()[0], 100.0);
    assert_eq!(items.label()[0], "ANVIL");
}

#[test]
fn verify_single_field_access() {
    let mut items = sample();
    assert_eq!(*items.at::<items_fields::id>(2).unwrap(), 3);
    *items.at_mut::<items_fields::weight>(1).unwrap() = 7.5;
    assert_eq!(items.weight(), &[0.5, 7.5, 4.0]);

    let err = items.at::<items_fields::id>(9).unwrap_err();
    assert_eq!(err, Error::OutOfRange { index: 9, len: 3 });
}

#[test]
fn verify_field_identifiers() {
    assert_eq!(ItemsFieldId::COUNT, 3);
    assert_eq!(ItemsFieldId::NAMES, ["id", "weight", "label"]);
    assert_eq!(ItemsFieldId::id.slot(), 0);
    assert_eq!(ItemsFieldId::label.slot(), 2);
    assert_eq!(ItemsFieldId::weight.name(), "weight");
}

// ============================================================================
// ITERATION
// ============================================================================

#[test]
fn verify_whole_row_iteration() {
    let items = sample();
    let ids: Vec<u32> = items.iter().map(|row| *row.id).collect();
    assert_eq!(ids, [1, 2, 3]);

    let back: Vec<u32> = items.iter().rev().map(|row| *row.id).collect();
    assert_eq!(back, [3, 2, 1]);

    let mut iter = items.iter();
    assert_eq!(iter.len(), 3);
    assert_eq!(*iter.nth(1).unwrap().id, 2);
    assert_eq!(iter.len(), 1);
    assert_eq!(*iter.next().unwrap().id, 3);
    assert!(iter.next().is_none());
    assert!(iter.next().is_none());

    // IntoIterator for &Items.
    let mut count = 0;
    for row in &items {
        assert!(!row.label.is_empty());
        count += 1;
    }
    assert_eq!(count, 3);
}

#[test]
fn verify_whole_row_mutation() {
    let mut items = sample();
    for row in &mut items {
        *row.id *= 10;
        row.label.insert(0, '#');
    }
    assert_eq!(items.id(), &[10, 20, 30]);
    assert_eq!(items.label()[0], "#anvil");
}

#[test]
fn verify_partial_view_matches_whole_rows() {
    let items = sample();

    let pairs: Vec<(u32, String)> = items
        .iter_fields::<(items_fields::label, items_fields::id)>()
        .map(|(label, id)| (*id, label.clone()))
        .collect();
    let full: Vec<(u32, String)> = items.iter().map(|row| (*row.id, row.label.clone())).collect();
    assert_eq!(pairs, full);

    // Selection order is the item order, independent of declaration order.
    let (label, id) = items
        .iter_fields::<(items_fields::label, items_fields::id)>()
        .next()
        .unwrap();
    assert_eq!((label.as_str(), *id), ("anvil", 1));

    // Shared selections may repeat a field.
    for (a, b) in items.iter_fields::<(items_fields::id, items_fields::id)>() {
        assert_eq!(a, b);
    }
}

#[test]
fn verify_partial_view_mutation() {
    let mut items = sample();
    for (weight, id) in items.iter_fields_mut::<(items_fields::weight, items_fields::id)>() {
        *weight += 1.0;
        *id += 100;
    }
    assert_eq!(items.id(), &[101, 102, 103]);
    assert_eq!(items.weight(), &[1.5, 1.25, 5.0]);

    // Single-field mutable selection.
    for (label,) in items.iter_fields_mut::<(items_fields::label,)>() {
        label.truncate(3);
    }
    assert_eq!(items.label(), &["anv", "ing", "cra"]);
}

#[test]
fn verify_partial_view_double_ended() {
    let items = sample();
    let mut iter = items.iter_fields::<(items_fields::id,)>();
    assert_eq!(iter.next_back().map(|(id,)| *id), Some(3));
    assert_eq!(iter.next().map(|(id,)| *id), Some(1));
    assert_eq!(iter.next().map(|(id,)| *id), Some(2));
    assert!(iter.next_back().is_none());
    assert_eq!(iter.size_hint(), (0, Some(0)));
}

// ============================================================================
// CAPACITY AND ALLOCATION
// ============================================================================

/// Allocation strategy that counts and validates every request.
#[derive(Debug, Default)]
struct Counting {
    allocs: AtomicUsize,
    deallocs: AtomicUsize,
}

#[allow(unsafe_code)]
impl RawAlloc for Counting {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        assert!(layout.align() >= MIN_ALIGN, "columns must be cache-aligned");
        self.allocs.fetch_add(1, Ordering::Relaxed);
        // SAFETY: callers never request zero-size layouts.
        let ptr = unsafe { std::alloc::alloc(layout) };
        NonNull::new(ptr).ok_or_else(|| AllocError::new(layout))
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.deallocs.fetch_add(1, Ordering::Relaxed);
        // SAFETY: forwarded from a deallocation contractually paired with
        // an earlier allocate for the same layout.
        unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) };
    }

    fn same_instance(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

#[test]
fn verify_custom_allocator_sees_balanced_traffic() {
    let strategy = Arc::new(Counting::default());
    {
        let mut items = Items::new_in(Arc::clone(&strategy));
        for i in 0..100 {
            items.push(i, 0.0, i.to_string());
        }
        assert!(Arc::ptr_eq(items.allocator(), &strategy));
        assert!(strategy.allocs.load(Ordering::Relaxed) > 0);
        items.shrink_to_fit();
        assert_eq!(items.len(), 100);
    }
    // Store dropped: every allocation was returned.
    assert_eq!(
        strategy.allocs.load(Ordering::Relaxed),
        strategy.deallocs.load(Ordering::Relaxed),
    );
}

#[test]
fn verify_reserve_and_capacity() {
    let mut items = Items::with_capacity(32);
    assert!(items.capacity() >= 32);
    assert!(items.is_empty());

    let cap = items.capacity();
    for i in 0..32 {
        items.push(i, 0.0, String::new());
    }
    // No regrowth within the reserved room.
    assert_eq!(items.capacity(), cap);

    items.reserve(1000);
    assert!(items.capacity() >= 1000);
    assert_eq!(items.len(), 32);

    items.try_reserve(2000).unwrap();
    assert!(items.capacity() >= 2000);

    items.clear();
    items.shrink_to_fit();
    assert_eq!(items.capacity(), 0);
}

#[test]
fn verify_stores_do_not_share_state() {
    let mut a = sample();
    let b = sample();
    a.erase(0);
    a.get_mut(0).unwrap().label.push('!');
    assert_eq!(b.len(), 3);
    assert_eq!(b.label(), &["anvil", "ingot", "crate"]);
}
