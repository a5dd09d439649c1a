//! # LANES Core
//!
//! Structure-of-arrays storage designed for:
//! - One contiguous, cache-line-aligned column per field
//! - Field-parallel traversal that touches only the columns you ask for
//! - Pluggable allocation strategies behind a small untyped contract
//!
//! ## Architecture Rules
//!
//! 1. **Columns move in lockstep** - every length-changing operation
//!    applies to all columns within the same call
//! 2. **Data-oriented layout** - each field lives in its own array, so a
//!    partial traversal streams only the bytes it needs
//! 3. **Fields are types** - field identifiers are compile-time markers;
//!    asking for an undeclared field is a compile error, not a runtime one
//!
//! ## Example
//!
//! ```rust
//! use lanes_core::columnar;
//!
//! columnar! {
//!     /// Projectile state, one column per field.
//!     pub struct Projectiles {
//!         x: f32,
//!         dx: f32,
//!         ttl: u32,
//!     }
//! }
//!
//! let mut shots = Projectiles::new();
//! shots.push(0.0, 1.5, 120);
//! shots.push(4.0, -0.5, 60);
//!
//! for (x, dx) in shots.iter_fields_mut::<(projectiles_fields::x, projectiles_fields::dx)>() {
//!     *x += *dx;
//! }
//! assert_eq!(shots.x(), &[1.5, 3.5]);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod alloc;
pub mod column;
pub mod error;
pub mod field;
pub mod iter;
mod macros;
pub mod select;

pub use alloc::{AllocError, CacheAligned, FieldAlloc, RawAlloc, MIN_ALIGN};
pub use column::RawColumn;
pub use error::Error;
pub use field::{Columnar, Field};
pub use iter::{PartialIter, PartialIterMut};
pub use select::{FieldSelect, FieldSelectMut};

#[doc(hidden)]
pub use paste::paste as __paste;
