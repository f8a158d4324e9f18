//! Errors for fallible allocation.

use core::alloc::Layout;
use core::fmt::{self, Display, Formatter};

/// The error returned by [`CowVec::try_reserve`](crate::CowVec::try_reserve)
/// and [`CowVec::try_push`](crate::CowVec::try_push).
///
/// The vector is left exactly as it was before the failed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TryReserveError {
    /// The required capacity exceeds `isize::MAX` bytes.
    CapacityOverflow,
    /// The memory allocator returned an error.
    AllocError {
        /// The layout that was passed to the allocator.
        layout: Layout,
    },
}

impl Display for TryReserveError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::CapacityOverflow => f.write_str("capacity overflow"),
            Self::AllocError { layout } => write!(
                f,
                "memory allocation of {} bytes failed",
                layout.size()
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TryReserveError {}

/// Unwraps the result of a fallible allocation the way `Vec` would fail.
#[inline]
pub(crate) fn infallible<T>(result: Result<T, TryReserveError>) -> T {
    match result {
        Ok(value) => value,
        Err(TryReserveError::CapacityOverflow) => capacity_overflow(),
        Err(TryReserveError::AllocError { layout }) => {
            alloc::alloc::handle_alloc_error(layout)
        }
    }
}

#[cold]
pub(crate) fn capacity_overflow() -> ! {
    panic!("capacity overflow");
}

#[cold]
pub(crate) fn out_of_bounds(index: usize, len: usize) -> ! {
    panic!("index is out bounds (index: {index}, len: {len})");
}

#[cold]
pub(crate) fn invalid_range(start: usize, end: usize, len: usize) -> ! {
    panic!("invalid range (start: {start}, end: {end}, len: {len})");
}
