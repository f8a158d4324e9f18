use core::cell::Cell;

/// The number of handles referencing a block *in addition to* the one
/// holding it. Zero means the holder owns the block exclusively.
///
/// The count is a plain [`Cell`]. Vectors sharing a block must never be
/// touched from two threads at once; the raw block pointer keeps
/// [`CowVec`](crate::CowVec) `!Send` and `!Sync` so this can't happen by
/// accident.
#[derive(Debug)]
pub(crate) struct Sharers(Cell<usize>);

impl Sharers {
    /// A count for a freshly allocated block with a single owner.
    #[inline]
    pub const fn exclusive() -> Self {
        Self(Cell::new(0))
    }

    /// Whether the holder is the only handle.
    #[inline]
    pub fn is_exclusive(&self) -> bool {
        self.0.get() == 0
    }

    /// Registers one more handle.
    ///
    /// Returns `true` if the count has overflown.
    #[inline]
    pub fn acquire(&self) -> bool {
        let prev = self.0.get();
        self.0.set(prev.wrapping_add(1));
        prev >= isize::MAX as usize
    }

    /// Gives up one handle.
    ///
    /// Returns `true` if this was the last handle, in which case the count is
    /// left untouched and the caller must destroy the block.
    #[inline]
    pub fn release(&self) -> bool {
        match self.0.get() {
            0 => true,
            prev => {
                self.0.set(prev - 1);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Sharers;

    #[test]
    fn acquire_and_release() {
        let sharers = Sharers::exclusive();
        assert!(sharers.is_exclusive());
        assert!(!sharers.acquire());
        assert!(!sharers.acquire());
        assert_eq!(sharers.0.get(), 2);
        assert!(!sharers.release());
        assert!(!sharers.release());
        assert!(sharers.is_exclusive());
        assert!(sharers.release());
        assert_eq!(sharers.0.get(), 0);
    }

    #[test]
    fn overflow_is_reported() {
        let sharers = Sharers(core::cell::Cell::new(isize::MAX as usize));
        assert!(sharers.acquire());
    }
}
