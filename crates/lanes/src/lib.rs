//! # LANES
//!
//! Length-synchronized structure-of-arrays storage.
//!
//! Declare a record with [`columnar!`] and get a store that keeps one
//! contiguous, cache-line-aligned column per field, with whole-row and
//! field-subset iteration over all of them in lockstep.
//!
//! ## Example
//!
//! ```rust
//! use lanes::columnar;
//!
//! columnar! {
//!     /// One column per field.
//!     pub struct Readings {
//!         sensor: u16,
//!         value: f64,
//!     }
//! }
//!
//! let mut readings = Readings::new();
//! readings.push(7, 21.5);
//! assert_eq!(readings.sensor(), &[7]);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

// Re-export the engine
pub use lanes_core as core;

// Re-export commonly used types
pub use lanes_core::{
    columnar, AllocError, CacheAligned, Columnar, Error, Field, FieldAlloc, FieldSelect,
    FieldSelectMut, PartialIter, PartialIterMut, RawAlloc, RawColumn, MIN_ALIGN,
};
