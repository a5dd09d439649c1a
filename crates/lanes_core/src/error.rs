//! # Store Errors
//!
//! Error values surfaced by indexed access and fallible capacity changes.
//!
//! Errors are always local to the failing call; there is no shared error
//! state anywhere in the engine.

use crate::alloc::AllocError;
use thiserror::Error;

/// Errors reported by store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// An index-based access landed outside `[0, len)`.
    #[error("index {index} out of range for store of length {len}")]
    OutOfRange {
        /// The requested row index.
        index: usize,
        /// The store length at the time of the call.
        len: usize,
    },

    /// The injected allocator refused a column allocation.
    ///
    /// The store never recovers from this on its own; the length is
    /// unchanged and the error is handed straight back to the caller.
    #[error(transparent)]
    Alloc(#[from] AllocError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_display() {
        let err = Error::OutOfRange { index: 7, len: 3 };
        assert_eq!(
            err.to_string(),
            "index 7 out of range for store of length 3"
        );
    }
}
