//! # Store Generation
//!
//! The [`columnar!`] macro turns a record-shaped declaration into a
//! structure-of-arrays store: one allocator-backed column per field, kept
//! in lockstep by every operation, plus the row tuples, field identifiers
//! and iterators that go with it.

/// Declares a structure-of-arrays store.
///
/// For a declaration
///
/// ```
/// use lanes_core::columnar;
///
/// columnar! {
///     /// Particle columns.
///     pub struct Sprites {
///         x: f32,
///         y: f32,
///         label: String,
///     }
/// }
///
/// let mut sprites = Sprites::new();
/// sprites.push(1.0, 2.0, "alpha".to_string());
/// sprites.push(3.0, 4.0, "beta".to_string());
/// assert_eq!(sprites.len(), 2);
/// assert_eq!(sprites.x(), &[1.0, 3.0]);
///
/// for (label, y) in sprites.iter_fields::<(sprites_fields::label, sprites_fields::y)>() {
///     assert!(!label.is_empty());
///     assert!(*y > 0.0);
/// }
/// ```
///
/// the macro generates, for a store named `Sprites`:
///
/// - `Sprites<A>`: the store itself, generic over a [`RawAlloc`] strategy
///   (default [`CacheAligned`]), holding one column per declared field;
/// - `SpritesRow` / `SpritesRowRef<'a>` / `SpritesRowMut<'a>`: owned,
///   shared and exclusive row tuples, with clone-based conversions from
///   the reference forms to the owned form;
/// - `SpritesFieldId`: a `#[repr(usize)]` identifier enum whose
///   discriminants are the column slots in declaration order;
/// - `sprites_fields`: marker types implementing [`Field`], used to name
///   fields in `at`, `iter_fields` and `iter_fields_mut` selections;
/// - `SpritesIter<'a>` / `SpritesIterMut<'a>`: whole-row iterators
///   stepping one pointer per column in lockstep.
///
/// Every length-changing operation applies to all columns, in declaration
/// order, within the same call; no partially updated length is ever
/// observable.
///
/// # Requirements
///
/// - Field types must be `Clone + Default + 'static`.
/// - The macro must be invoked where items may be declared (module or fn
///   body scope).
/// - Field names share the store's method namespace, so names such as
///   `len`, `push` or `iter` cannot be used as fields. Names starting
///   with a double underscore are reserved for the generated iterators'
///   internal state.
///
/// [`RawAlloc`]: crate::alloc::RawAlloc
/// [`CacheAligned`]: crate::alloc::CacheAligned
/// [`Field`]: crate::field::Field
#[macro_export]
macro_rules! columnar {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Store:ident {
            $( $(#[$fmeta:meta])* $field:ident : $fty:ty ),+ $(,)?
        }
    ) => { $crate::__paste! {
        $(#[$meta])*
        $vis struct $Store<A: $crate::alloc::RawAlloc + Clone = $crate::alloc::CacheAligned> {
            $( $(#[$fmeta])* $field: $crate::column::RawColumn<$fty, A>, )+
        }

        #[doc = "Field identifiers for [`" $Store "`], one per column in declaration order."]
        #[doc = ""]
        #[doc = "The discriminant of each identifier is the column's slot."]
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[repr(usize)]
        #[allow(non_camel_case_types)]
        $vis enum [<$Store FieldId>] {
            $( #[doc = "Identifier of the `" $field "` column."] $field, )+
        }

        impl [<$Store FieldId>] {
            #[doc = "Number of declared fields."]
            $vis const COUNT: usize = [ $( stringify!($field) ),+ ].len();

            #[doc = "Field names in declaration order."]
            $vis const NAMES: [&'static str; Self::COUNT] = [ $( stringify!($field) ),+ ];

            #[doc = "Returns the column slot bound to this identifier."]
            #[inline]
            #[must_use]
            $vis const fn slot(self) -> usize {
                self as usize
            }

            #[doc = "Returns the declared name of this field."]
            #[inline]
            #[must_use]
            $vis const fn name(self) -> &'static str {
                Self::NAMES[self.slot()]
            }
        }

        const _: () = assert!(
            [<$Store FieldId>]::COUNT > 0,
            "a columnar store needs at least one field"
        );

        #[doc = "Owned row of [`" $Store "`] field values, in declaration order."]
        #[derive(Clone)]
        $vis struct [<$Store Row>] {
            $( #[doc = "Value of the `" $field "` field."] $vis $field: $fty, )+
        }

        #[doc = "Shared whole-row view into [`" $Store "`]."]
        #[derive(Clone, Copy)]
        $vis struct [<$Store RowRef>]<'a> {
            $( #[doc = "Reference to the `" $field "` field."] $vis $field: &'a $fty, )+
        }

        #[doc = "Exclusive whole-row view into [`" $Store "`]."]
        $vis struct [<$Store RowMut>]<'a> {
            $( #[doc = "Exclusive reference to the `" $field "` field."] $vis $field: &'a mut $fty, )+
        }

        impl From<[<$Store RowRef>]<'_>> for [<$Store Row>] {
            /// Clones every field out of the view; the result shares
            /// nothing with the source row.
            fn from(row: [<$Store RowRef>]<'_>) -> Self {
                Self { $( $field: ::core::clone::Clone::clone(row.$field), )+ }
            }
        }

        impl From<[<$Store RowMut>]<'_>> for [<$Store Row>] {
            /// Clones every field out of the view; the result shares
            /// nothing with the source row.
            fn from(row: [<$Store RowMut>]<'_>) -> Self {
                Self { $( $field: ::core::clone::Clone::clone(&*row.$field), )+ }
            }
        }

        #[doc = "Field marker types for [`" $Store "`], used in partial-view selections."]
        #[allow(non_camel_case_types)]
        $vis mod [<$Store:snake _fields>] {
            $(
                #[doc = "Marker selecting the `" $field "` column."]
                #[derive(Clone, Copy, Debug)]
                pub struct $field;
            )+
        }

        $(
            impl<A: $crate::alloc::RawAlloc + Clone> $crate::field::Field<$Store<A>>
                for [<$Store:snake _fields>]::$field
            {
                type Value = $fty;
                const SLOT: usize = [<$Store FieldId>]::$field as usize;
                const NAME: &'static str = stringify!($field);

                #[inline]
                fn as_ptr(store: &$Store<A>) -> *const $fty {
                    store.$field.as_ptr()
                }

                #[inline]
                fn as_mut_ptr(store: &mut $Store<A>) -> *mut $fty {
                    store.$field.as_mut_ptr()
                }

                #[inline]
                fn slice(store: &$Store<A>) -> &[$fty] {
                    store.$field.as_slice()
                }

                #[inline]
                fn slice_mut(store: &mut $Store<A>) -> &mut [$fty] {
                    store.$field.as_mut_slice()
                }
            }
        )+

        impl<A: $crate::alloc::RawAlloc + Clone> $crate::field::Columnar for $Store<A> {
            const FIELD_COUNT: usize = [<$Store FieldId>]::COUNT;

            #[inline]
            fn len(&self) -> usize {
                Self::len(self)
            }
        }

        impl<A: $crate::alloc::RawAlloc + Clone + Default> Default for $Store<A> {
            fn default() -> Self {
                Self::new_in(A::default())
            }
        }

        // Concrete impl so `new()` call sites infer the default strategy,
        // as `HashMap::new` pins `RandomState`.
        impl $Store<$crate::alloc::CacheAligned> {
            #[doc = "Creates an empty store using the default allocation strategy."]
            #[must_use]
            $vis fn new() -> Self {
                Self::new_in($crate::alloc::CacheAligned)
            }

            #[doc = "Creates an empty store with room for `capacity` rows."]
            #[must_use]
            $vis fn with_capacity(capacity: usize) -> Self {
                Self::with_capacity_in(capacity, $crate::alloc::CacheAligned)
            }
        }

        impl<A: $crate::alloc::RawAlloc + Clone> $Store<A> {
            #[doc = "Creates an empty store whose columns allocate through `alloc`."]
            #[doc = ""]
            #[doc = "Every column receives a clone of the handle; for stateful"]
            #[doc = "allocators the clones must share one instance."]
            #[must_use]
            $vis fn new_in(alloc: A) -> Self {
                Self {
                    $( $field: $crate::column::RawColumn::new_in(alloc.clone()), )+
                }
            }

            #[doc = "Creates an empty store with room for `capacity` rows, allocating through `alloc`."]
            #[must_use]
            $vis fn with_capacity_in(capacity: usize, alloc: A) -> Self {
                let mut store = Self::new_in(alloc);
                store.reserve(capacity);
                store
            }

            #[doc = "Returns the shared logical length of all columns."]
            #[inline]
            #[must_use]
            $vis fn len(&self) -> usize {
                let lens = [ $( self.$field.len() ),+ ];
                debug_assert!(
                    {
                        let mut ok = true;
                        let mut i = 1;
                        while i < lens.len() {
                            ok = ok && lens[i] == lens[0];
                            i += 1;
                        }
                        ok
                    },
                    "columns out of lockstep"
                );
                lens[0]
            }

            #[doc = "Checks if the store holds no rows."]
            #[inline]
            #[must_use]
            $vis fn is_empty(&self) -> bool {
                self.len() == 0
            }

            #[doc = "Returns the capacity of the first column."]
            #[doc = ""]
            #[doc = "Columns may briefly diverge in capacity after a failed grow;"]
            #[doc = "the first column is the reported one."]
            #[inline]
            #[must_use]
            $vis fn capacity(&self) -> usize {
                let caps = [ $( self.$field.capacity() ),+ ];
                caps[0]
            }

            #[doc = "Returns the allocator handle shared by all columns."]
            #[must_use]
            $vis fn allocator(&self) -> &A {
                let handles = [ $( self.$field.allocator().raw() ),+ ];
                handles[0]
            }

            #[doc = "Ensures every column can hold at least `capacity` rows."]
            #[doc = ""]
            #[doc = "Length is unaffected."]
            #[doc = ""]
            #[doc = "# Panics"]
            #[doc = ""]
            #[doc = "Panics if the allocator refuses the request."]
            $vis fn reserve(&mut self, capacity: usize) {
                $( self.$field.reserve(capacity); )+
            }

            #[doc = "Ensures every column can hold at least `capacity` rows,"]
            #[doc = "propagating allocator failure."]
            #[doc = ""]
            #[doc = "On failure the length is unchanged; columns that already"]
            #[doc = "grew keep their capacity, which is not observable through"]
            #[doc = "the public surface."]
            #[doc = ""]
            #[doc = "# Errors"]
            #[doc = ""]
            #[doc = "Returns the allocator's refusal verbatim."]
            $vis fn try_reserve(&mut self, capacity: usize) -> Result<(), $crate::alloc::AllocError> {
                $( self.$field.try_reserve(capacity)?; )+
                Ok(())
            }

            #[doc = "Releases unused capacity in every column."]
            $vis fn shrink_to_fit(&mut self) {
                $( self.$field.shrink_to_fit(); )+
            }

            #[doc = "Removes every row. Capacity is kept."]
            $vis fn clear(&mut self) {
                $( self.$field.clear(); )+
            }

            #[doc = "Shortens the store to `new_len` rows, dropping the tail."]
            $vis fn truncate(&mut self, new_len: usize) {
                $( self.$field.truncate(new_len); )+
            }

            #[doc = "Appends one row from per-field values, in declaration order."]
            $vis fn push(&mut self, $( $field: $fty ),+) {
                $( self.$field.push($field); )+
            }

            #[doc = "Appends one row from an owned row or a row view."]
            #[doc = ""]
            #[doc = "View forms are cloned field by field before any column is"]
            #[doc = "touched; the appended row never aliases the source."]
            $vis fn push_row(&mut self, row: impl Into<[<$Store Row>]>) {
                let row = row.into();
                $( self.$field.push(row.$field); )+
            }

            #[doc = "Removes and returns the last row, or `None` on an empty store."]
            $vis fn pop(&mut self) -> Option<[<$Store Row>]> {
                if self.is_empty() {
                    return None;
                }
                Some([<$Store Row>] {
                    $( $field: self.$field.pop().expect("columns out of lockstep"), )+
                })
            }

            #[doc = "Grows or truncates every column to `new_len` rows."]
            #[doc = ""]
            #[doc = "New rows hold each field's default value."]
            $vis fn resize(&mut self, new_len: usize) {
                $( self.$field.resize_with(new_len, ::core::default::Default::default); )+
            }

            #[doc = "Grows or truncates every column to `new_len` rows, filling"]
            #[doc = "new rows with clones of `fill`."]
            #[doc = ""]
            #[doc = "If a field's `Clone` panics mid-fill the store must be"]
            #[doc = "dropped; this is the one operation that cannot re-establish"]
            #[doc = "lockstep after a panicking field constructor."]
            $vis fn resize_with(&mut self, new_len: usize, fill: impl Into<[<$Store Row>]>) {
                let fill = fill.into();
                $( self.$field.resize_with(new_len, || ::core::clone::Clone::clone(&fill.$field)); )+
            }

            #[doc = "Inserts one row at index `at` from per-field values."]
            #[doc = ""]
            #[doc = "# Panics"]
            #[doc = ""]
            #[doc = "Panics if `at > len`, before any column is touched."]
            $vis fn insert(&mut self, at: usize, $( $field: $fty ),+) {
                let len = self.len();
                assert!(at <= len, "insert index {at} out of range for store of length {len}");
                $( self.$field.insert(at, $field); )+
            }

            #[doc = "Inserts one row at index `at` from an owned row or a row view."]
            #[doc = ""]
            #[doc = "Inserting at `len` is equivalent to [`push_row`](Self::push_row)."]
            #[doc = ""]
            #[doc = "# Panics"]
            #[doc = ""]
            #[doc = "Panics if `at > len`, before any column is touched."]
            $vis fn insert_row(&mut self, at: usize, row: impl Into<[<$Store Row>]>) {
                let row = row.into();
                let len = self.len();
                assert!(at <= len, "insert index {at} out of range for store of length {len}");
                $( self.$field.insert(at, row.$field); )+
            }

            #[doc = "Removes the row at `at`, shifting later rows down."]
            #[doc = ""]
            #[doc = "Returns `at`, the index now holding the next surviving row."]
            #[doc = ""]
            #[doc = "# Panics"]
            #[doc = ""]
            #[doc = "Panics if `at >= len`, before any column is touched."]
            $vis fn erase(&mut self, at: usize) -> usize {
                self.erase_range(at..at + 1)
            }

            #[doc = "Removes the half-open row range, shifting later rows down."]
            #[doc = ""]
            #[doc = "Returns the range start, the index now holding the next"]
            #[doc = "surviving row."]
            #[doc = ""]
            #[doc = "# Panics"]
            #[doc = ""]
            #[doc = "Panics on an inverted or out-of-bounds range, before any"]
            #[doc = "column is touched."]
            $vis fn erase_range(&mut self, range: ::core::ops::Range<usize>) -> usize {
                let len = self.len();
                assert!(
                    range.start <= range.end && range.end <= len,
                    "erase range {}..{} out of range for store of length {len}",
                    range.start,
                    range.end,
                );
                $( self.$field.remove_range(range.start, range.end); )+
                range.start
            }

            #[doc = "Returns a reference to one field of the row at `index`."]
            #[doc = ""]
            #[doc = "The field is named by its marker type."]
            #[doc = ""]
            #[doc = "# Errors"]
            #[doc = ""]
            #[doc = "Returns an out-of-range error past the end."]
            $vis fn at<F>(&self, index: usize) -> Result<&F::Value, $crate::Error>
            where
                F: $crate::field::Field<Self>,
            {
                let len = self.len();
                F::slice(self)
                    .get(index)
                    .ok_or($crate::Error::OutOfRange { index, len })
            }

            #[doc = "Returns a mutable reference to one field of the row at `index`."]
            #[doc = ""]
            #[doc = "# Errors"]
            #[doc = ""]
            #[doc = "Returns an out-of-range error past the end."]
            $vis fn at_mut<F>(&mut self, index: usize) -> Result<&mut F::Value, $crate::Error>
            where
                F: $crate::field::Field<Self>,
            {
                let len = self.len();
                F::slice_mut(self)
                    .get_mut(index)
                    .ok_or($crate::Error::OutOfRange { index, len })
            }

            #[doc = "Returns a shared view of the row at `index`, or `None` past the end."]
            #[must_use]
            $vis fn get(&self, index: usize) -> Option<[<$Store RowRef>]<'_>> {
                if index >= self.len() {
                    return None;
                }
                Some([<$Store RowRef>] {
                    $( $field: &self.$field.as_slice()[index], )+
                })
            }

            #[doc = "Returns an exclusive view of the row at `index`, or `None` past the end."]
            #[must_use]
            $vis fn get_mut(&mut self, index: usize) -> Option<[<$Store RowMut>]<'_>> {
                if index >= self.len() {
                    return None;
                }
                Some([<$Store RowMut>] {
                    $( $field: &mut self.$field.as_mut_slice()[index], )+
                })
            }

            #[doc = "Returns an owned copy of the row at `index`."]
            #[doc = ""]
            #[doc = "Every field is cloned out of its column."]
            #[doc = ""]
            #[doc = "# Errors"]
            #[doc = ""]
            #[doc = "Returns an out-of-range error past the end."]
            $vis fn value_at(&self, index: usize) -> Result<[<$Store Row>], $crate::Error> {
                let len = self.len();
                self.get(index)
                    .map(::core::convert::Into::into)
                    .ok_or($crate::Error::OutOfRange { index, len })
            }

            #[doc = "Returns a shared view of the row at `index`."]
            #[doc = ""]
            #[doc = "# Errors"]
            #[doc = ""]
            #[doc = "Returns an out-of-range error past the end."]
            $vis fn ref_at(&self, index: usize) -> Result<[<$Store RowRef>]<'_>, $crate::Error> {
                let len = self.len();
                self.get(index).ok_or($crate::Error::OutOfRange { index, len })
            }

            #[doc = "Returns an exclusive view of the row at `index`."]
            #[doc = ""]
            #[doc = "# Errors"]
            #[doc = ""]
            #[doc = "Returns an out-of-range error past the end."]
            $vis fn mut_at(&mut self, index: usize) -> Result<[<$Store RowMut>]<'_>, $crate::Error> {
                let len = self.len();
                self.get_mut(index).ok_or($crate::Error::OutOfRange { index, len })
            }

            #[doc = "Returns a shared view of the first row, or `None` on an empty store."]
            #[must_use]
            $vis fn first(&self) -> Option<[<$Store RowRef>]<'_>> {
                self.get(0)
            }

            #[doc = "Returns an exclusive view of the first row, or `None` on an empty store."]
            #[must_use]
            $vis fn first_mut(&mut self) -> Option<[<$Store RowMut>]<'_>> {
                self.get_mut(0)
            }

            #[doc = "Returns a shared view of the last row, or `None` on an empty store."]
            #[must_use]
            $vis fn last(&self) -> Option<[<$Store RowRef>]<'_>> {
                self.len().checked_sub(1).and_then(|i| self.get(i))
            }

            #[doc = "Returns an exclusive view of the last row, or `None` on an empty store."]
            #[must_use]
            $vis fn last_mut(&mut self) -> Option<[<$Store RowMut>]<'_>> {
                self.len().checked_sub(1).and_then(|i| self.get_mut(i))
            }

            #[doc = "Iterates shared whole-row views in row order."]
            $vis fn iter(&self) -> [<$Store Iter>]<'_> {
                [<$Store Iter>] {
                    __remaining: self.len(),
                    $( $field: self.$field.as_ptr(), )+
                    __marker: ::core::marker::PhantomData,
                }
            }

            #[doc = "Iterates exclusive whole-row views in row order."]
            $vis fn iter_mut(&mut self) -> [<$Store IterMut>]<'_> {
                [<$Store IterMut>] {
                    __remaining: self.len(),
                    $( $field: self.$field.as_mut_ptr(), )+
                    __marker: ::core::marker::PhantomData,
                }
            }

            #[doc = "Iterates a field selection in row order."]
            #[doc = ""]
            #[doc = "`Sel` is a tuple of field markers; items are reference tuples"]
            #[doc = "in the selection's order, which may repeat fields and need"]
            #[doc = "not follow declaration order."]
            $vis fn iter_fields<Sel>(&self) -> $crate::iter::PartialIter<'_, Self, Sel>
            where
                Sel: $crate::select::FieldSelect<Self>,
            {
                $crate::iter::PartialIter::new(self)
            }

            #[doc = "Mutably iterates a field selection in row order."]
            #[doc = ""]
            #[doc = "The selection must not repeat a field; repeats fail the build."]
            $vis fn iter_fields_mut<Sel>(&mut self) -> $crate::iter::PartialIterMut<'_, Self, Sel>
            where
                Sel: $crate::select::FieldSelectMut<Self>,
            {
                $crate::iter::PartialIterMut::new(self)
            }

            #[doc = "Reserved ordering hook."]
            #[doc = ""]
            #[doc = "Guaranteed to leave the store untouched until a cross-column"]
            #[doc = "permutation sort exists; kept so call sites can already take"]
            #[doc = "a dependency on it."]
            $vis fn sort(&mut self) {}

            $(
                #[doc = "Returns the `" $field "` column as a slice."]
                #[inline]
                #[must_use]
                $vis fn $field(&self) -> &[$fty] {
                    self.$field.as_slice()
                }

                #[doc = "Returns the `" $field "` column as a mutable slice."]
                #[inline]
                $vis fn [<$field _mut>](&mut self) -> &mut [$fty] {
                    self.$field.as_mut_slice()
                }
            )+
        }

        impl<A: $crate::alloc::RawAlloc + Clone> Extend<[<$Store Row>]> for $Store<A> {
            fn extend<I: IntoIterator<Item = [<$Store Row>]>>(&mut self, rows: I) {
                for row in rows {
                    self.push_row(row);
                }
            }
        }

        #[doc = "Lockstep iterator over shared whole-row views of [`" $Store "`]."]
        $vis struct [<$Store Iter>]<'a> {
            /// Rows not yet yielded from either end.
            __remaining: usize,
            $( $field: *const $fty, )+
            __marker: ::core::marker::PhantomData<&'a ()>,
        }

        impl<'a> Clone for [<$Store Iter>]<'a> {
            fn clone(&self) -> Self {
                Self {
                    __remaining: self.__remaining,
                    $( $field: self.$field, )+
                    __marker: ::core::marker::PhantomData,
                }
            }
        }

        #[allow(unsafe_code)]
        impl<'a> Iterator for [<$Store Iter>]<'a> {
            type Item = [<$Store RowRef>]<'a>;

            #[inline]
            fn next(&mut self) -> Option<Self::Item> {
                if self.__remaining == 0 {
                    return None;
                }
                // SAFETY: remaining > 0 proves every column pointer addresses
                // an initialized element; advancing stays within one past the
                // end of each column.
                let item = [<$Store RowRef>] {
                    $( $field: unsafe { &*self.$field }, )+
                };
                $( self.$field = unsafe { self.$field.add(1) }; )+
                self.__remaining -= 1;
                Some(item)
            }

            #[inline]
            fn size_hint(&self) -> (usize, Option<usize>) {
                (self.__remaining, Some(self.__remaining))
            }

            #[inline]
            fn nth(&mut self, n: usize) -> Option<Self::Item> {
                if n >= self.__remaining {
                    self.__remaining = 0;
                    return None;
                }
                // SAFETY: n < remaining keeps every column pointer in bounds.
                $( self.$field = unsafe { self.$field.add(n) }; )+
                self.__remaining -= n;
                self.next()
            }
        }

        #[allow(unsafe_code)]
        impl<'a> DoubleEndedIterator for [<$Store Iter>]<'a> {
            #[inline]
            fn next_back(&mut self) -> Option<Self::Item> {
                if self.__remaining == 0 {
                    return None;
                }
                self.__remaining -= 1;
                // SAFETY: remaining now indexes the last unyielded row, in
                // bounds for every column pointer.
                Some([<$Store RowRef>] {
                    $( $field: unsafe { &*self.$field.add(self.__remaining) }, )+
                })
            }

            #[inline]
            fn nth_back(&mut self, n: usize) -> Option<Self::Item> {
                if n >= self.__remaining {
                    self.__remaining = 0;
                    return None;
                }
                self.__remaining -= n;
                self.next_back()
            }
        }

        impl<'a> ExactSizeIterator for [<$Store Iter>]<'a> {}
        impl<'a> ::core::iter::FusedIterator for [<$Store Iter>]<'a> {}

        #[doc = "Lockstep iterator over exclusive whole-row views of [`" $Store "`]."]
        $vis struct [<$Store IterMut>]<'a> {
            /// Rows not yet yielded from either end.
            __remaining: usize,
            $( $field: *mut $fty, )+
            __marker: ::core::marker::PhantomData<&'a mut ()>,
        }

        #[allow(unsafe_code)]
        impl<'a> Iterator for [<$Store IterMut>]<'a> {
            type Item = [<$Store RowMut>]<'a>;

            #[inline]
            fn next(&mut self) -> Option<Self::Item> {
                if self.__remaining == 0 {
                    return None;
                }
                // SAFETY: remaining > 0 proves the row is initialized; each
                // row is yielded at most once, so the exclusive references
                // never alias.
                let item = [<$Store RowMut>] {
                    $( $field: unsafe { &mut *self.$field }, )+
                };
                $( self.$field = unsafe { self.$field.add(1) }; )+
                self.__remaining -= 1;
                Some(item)
            }

            #[inline]
            fn size_hint(&self) -> (usize, Option<usize>) {
                (self.__remaining, Some(self.__remaining))
            }

            #[inline]
            fn nth(&mut self, n: usize) -> Option<Self::Item> {
                if n >= self.__remaining {
                    self.__remaining = 0;
                    return None;
                }
                // SAFETY: n < remaining keeps every column pointer in bounds.
                $( self.$field = unsafe { self.$field.add(n) }; )+
                self.__remaining -= n;
                self.next()
            }
        }

        #[allow(unsafe_code)]
        impl<'a> DoubleEndedIterator for [<$Store IterMut>]<'a> {
            #[inline]
            fn next_back(&mut self) -> Option<Self::Item> {
                if self.__remaining == 0 {
                    return None;
                }
                self.__remaining -= 1;
                // SAFETY: remaining now indexes the last unyielded row; the
                // front cursor can no longer reach it, so exclusivity holds.
                Some([<$Store RowMut>] {
                    $( $field: unsafe { &mut *self.$field.add(self.__remaining) }, )+
                })
            }

            #[inline]
            fn nth_back(&mut self, n: usize) -> Option<Self::Item> {
                if n >= self.__remaining {
                    self.__remaining = 0;
                    return None;
                }
                self.__remaining -= n;
                self.next_back()
            }
        }

        impl<'a> ExactSizeIterator for [<$Store IterMut>]<'a> {}
        impl<'a> ::core::iter::FusedIterator for [<$Store IterMut>]<'a> {}

        impl<'a, A: $crate::alloc::RawAlloc + Clone> IntoIterator for &'a $Store<A> {
            type Item = [<$Store RowRef>]<'a>;
            type IntoIter = [<$Store Iter>]<'a>;

            fn into_iter(self) -> Self::IntoIter {
                self.iter()
            }
        }

        impl<'a, A: $crate::alloc::RawAlloc + Clone> IntoIterator for &'a mut $Store<A> {
            type Item = [<$Store RowMut>]<'a>;
            type IntoIter = [<$Store IterMut>]<'a>;

            fn into_iter(self) -> Self::IntoIter {
                self.iter_mut()
            }
        }
    }};
}
