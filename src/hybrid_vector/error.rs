use core::fmt;
use std::alloc::Layout;

/// Errors returned by the fallible `HybridVector` operations.
///
/// A failed growth or shrink leaves the vector exactly as it was before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HybridVectorError {
    /// The required capacity overflowed `usize`, exceeded `max_size()`, or could not be
    /// expressed as an allocation layout.
    CapacityOverflow,
    /// The global allocator returned a null pointer.
    AllocationFailure {
        /// The layout that was requested from the allocator.
        layout: Layout,
    },
    /// A checked access was made past the end of the vector.
    IndexOutOfRange { index: usize, len: usize },
}

impl fmt::Display for HybridVectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityOverflow => f.write_str("HybridVector capacity overflow"),
            Self::AllocationFailure { layout } => write!(
                f,
                "HybridVector allocation of {} bytes (align {}) failed",
                layout.size(),
                layout.align()
            ),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index (is {index}) should be < len (is {len})")
            }
        }
    }
}

impl std::error::Error for HybridVectorError {}

/// Unwraps the result of a growth operation for the panicking conveniences.
#[inline]
pub(crate) fn infallible<T>(result: Result<T, HybridVectorError>) -> T {
    match result {
        Ok(value) => value,
        Err(HybridVectorError::CapacityOverflow) => panic!("capacity overflow"),
        Err(HybridVectorError::AllocationFailure { layout }) => {
            std::alloc::handle_alloc_error(layout)
        }
        Err(err @ HybridVectorError::IndexOutOfRange { .. }) => panic!("{err}"),
    }
}
