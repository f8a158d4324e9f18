//! The heap block behind a spilled [`CowVec`](crate::CowVec).

use core::alloc::Layout;
use core::marker::PhantomData;
use core::mem;
use core::ptr::{self, NonNull};

use crate::error::TryReserveError;
use crate::sharers::Sharers;

/// An owning handle to a heap block: a header followed by `capacity` slots
/// for `T`, of which the first `len` are initialized.
///
/// Several handles may reference the same block. Elements and the header's
/// `len` and `capacity` may only be mutated through a handle that is
/// exclusive, i.e. whose block has no extra sharers.
pub(crate) struct Block<T> {
    /// Points to the header at the start of a live allocation. The elements
    /// start `Self::offset()` bytes later.
    ptr: NonNull<Header>,
    phantom: PhantomData<T>,
}

/// The start of the backing allocation.
///
/// This is followed by padding, if necessary, and then the elements.
#[derive(Debug)]
struct Header {
    /// How many other handles reference this block.
    sharers: Sharers,
    /// The number of element slots.
    ///
    /// Invariant: `1 <= capacity <= isize::MAX`.
    capacity: usize,
    /// The number of initialized elements.
    ///
    /// Invariant: `len <= capacity`.
    len: usize,
}

impl<T> Block<T> {
    /// Allocate an empty, exclusive block with room for `capacity` elements.
    ///
    /// Nothing is constructed; on failure nothing is allocated.
    pub fn try_allocate(capacity: usize) -> Result<Self, TryReserveError> {
        debug_assert!(capacity > 0);

        let layout = Self::layout(capacity)?;

        // Safety:
        // The layout has non-zero size because `Self::offset() > 0`.
        let allocation = unsafe { alloc::alloc::alloc(layout) };
        let ptr = NonNull::new(allocation.cast::<Header>())
            .ok_or(TryReserveError::AllocError { layout })?;

        // Safety:
        // The freshly allocated pointer is valid for a write of the header.
        unsafe {
            ptr::write(
                ptr.as_ptr(),
                Header { sharers: Sharers::exclusive(), capacity, len: 0 },
            );
        }

        Ok(Self { ptr, phantom: PhantomData })
    }

    /// The number of initialized elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.header().len
    }

    /// The number of element slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.header().capacity
    }

    /// Whether this handle is the only one referencing the block.
    #[inline]
    pub fn is_exclusive(&self) -> bool {
        self.header().sharers.is_exclusive()
    }

    /// Whether both handles reference the same block.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr
    }

    /// Create another handle to the same block.
    #[inline]
    pub fn share(&self) -> Self {
        if self.header().sharers.acquire() {
            sharer_overflow(self.ptr);
        }

        Self { ptr: self.ptr, phantom: PhantomData }
    }

    /// The initialized elements.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // Safety:
        // - The data pointer is non-null, well-aligned and valid for `len`
        //   reads of `T`.
        // - No handle mutates the elements while the block is shared, and
        //   the returned slice borrows `self`.
        unsafe { core::slice::from_raw_parts(self.data(), self.len()) }
    }

    /// The initialized elements, mutably.
    ///
    /// May only be called if the block is exclusive.
    #[inline]
    pub unsafe fn as_mut_slice(&mut self) -> &mut [T] {
        debug_assert!(self.is_exclusive());

        // Safety:
        // Same as `as_slice()`, plus the caller guarantees that no other
        // handle can observe the elements.
        unsafe { core::slice::from_raw_parts_mut(self.data(), self.len()) }
    }

    /// The data pointer.
    ///
    /// Valid for `len` reads and, if the block is exclusive, for `capacity`
    /// writes of `T`.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.data()
    }

    /// Write `value` into the first free slot.
    ///
    /// May only be called if the block is exclusive and `len < capacity`.
    #[inline]
    pub unsafe fn push_unchecked(&mut self, value: T) {
        debug_assert!(self.is_exclusive());
        debug_assert!(self.len() < self.capacity());

        unsafe {
            // Safety:
            // The data pointer is valid for `capacity` writes and the caller
            // ensures `len < capacity`.
            let len = self.len();
            ptr::write(self.data().add(len), value);

            // Safety:
            // Exclusive, so nobody else reads the header's `len`.
            self.header_mut().len = len + 1;
        }
    }

    /// Move the last element out.
    ///
    /// May only be called if the block is exclusive and `len > 0`.
    #[inline]
    pub unsafe fn pop_unchecked(&mut self) -> T {
        debug_assert!(self.is_exclusive());
        debug_assert!(self.len() > 0);

        unsafe {
            // Safety:
            // Decrement first, the slot at the new `len` is then logically
            // uninitialized and owned by the returned value.
            let len = self.len() - 1;
            self.header_mut().len = len;
            ptr::read(self.data().add(len))
        }
    }

    /// Move the element at `index` out without adjusting `len`.
    ///
    /// May only be called if the block is exclusive and `index < len`. The
    /// caller must make sure the slot is never read or dropped again.
    #[inline]
    pub unsafe fn read(&self, index: usize) -> T {
        debug_assert!(index < self.len());

        // Safety:
        // The data pointer is valid for `len` reads.
        unsafe { ptr::read(self.data().add(index)) }
    }

    /// Overwrite `len` without touching any element.
    ///
    /// May only be called if the block is exclusive. Lowering the length leaks
    /// the cut-off elements unless the caller drops them.
    #[inline]
    pub unsafe fn set_len(&mut self, len: usize) {
        debug_assert!(self.is_exclusive());
        debug_assert!(len <= self.capacity());

        // Safety:
        // Exclusive, so nobody else reads the header.
        unsafe { self.header_mut().len = len }
    }

    /// Grow the block to `target` slots, moving the elements if the
    /// allocator has to relocate.
    ///
    /// May only be called if the block is exclusive and `target > capacity`.
    /// On failure the block is left untouched.
    pub unsafe fn try_grow(&mut self, target: usize) -> Result<(), TryReserveError> {
        debug_assert!(self.is_exclusive());
        debug_assert!(target > self.capacity());

        let layout = Self::layout(target)?;

        // Safety:
        // - `self.ptr` was allocated with the layout of the current capacity.
        // - `layout.size()` is non-zero and, rounded up to the alignment,
        //   does not overflow `isize::MAX` (checked by `Self::layout()`).
        let allocation = unsafe {
            alloc::alloc::realloc(
                self.ptr.as_ptr().cast::<u8>(),
                Self::layout_unchecked(self.capacity()),
                layout.size(),
            )
        };

        // On failure, `realloc` leaves the old allocation alone.
        self.ptr = NonNull::new(allocation.cast::<Header>())
            .ok_or(TryReserveError::AllocError { layout })?;

        // Safety:
        // The header was moved along with the rest of the allocation and we
        // are still the only handle.
        unsafe { self.header_mut().capacity = target };

        Ok(())
    }

    #[inline]
    fn header(&self) -> &Header {
        // Safety:
        // `self.ptr` always points to an initialized header.
        unsafe { self.ptr.as_ref() }
    }

    /// May only be called if the block is exclusive.
    #[inline]
    unsafe fn header_mut(&mut self) -> &mut Header {
        // Safety:
        // The caller ensures no other handle reads the header concurrently
        // through a shared reference.
        unsafe { self.ptr.as_mut() }
    }

    #[inline]
    fn data(&self) -> *mut T {
        // Safety:
        // The allocation is at least `Self::offset()` bytes large, so this
        // stays in bounds (or one past the end for zero-sized `T`).
        unsafe { self.ptr.as_ptr().cast::<u8>().add(Self::offset()).cast::<T>() }
    }

    /// The layout of a block with the given capacity.
    fn layout(capacity: usize) -> Result<Layout, TryReserveError> {
        if capacity > isize::MAX as usize {
            return Err(TryReserveError::CapacityOverflow);
        }

        let size = mem::size_of::<T>()
            .checked_mul(capacity)
            .and_then(|size| Self::offset().checked_add(size))
            .ok_or(TryReserveError::CapacityOverflow)?;

        Layout::from_size_align(size, Self::align())
            .map_err(|_| TryReserveError::CapacityOverflow)
    }

    /// The layout of a block that was successfully allocated before.
    #[inline]
    unsafe fn layout_unchecked(capacity: usize) -> Layout {
        // Safety:
        // The caller ensures `Self::layout(capacity)` succeeded once.
        unsafe {
            Layout::from_size_align_unchecked(
                Self::offset() + mem::size_of::<T>() * capacity,
                Self::align(),
            )
        }
    }

    /// The alignment of the allocation.
    #[inline]
    const fn align() -> usize {
        max(mem::align_of::<Header>(), mem::align_of::<T>())
    }

    /// The offset of the elements in the allocation. Always `> 0`.
    #[inline]
    const fn offset() -> usize {
        let header = mem::size_of::<Header>();
        let align = Self::align();
        (header + align - 1) / align * align
    }
}

impl<T: Clone> Block<T> {
    /// Clone `slice` into a new exclusive block with room for `capacity`
    /// elements.
    ///
    /// If a clone panics, the partially filled block is dropped, which drops
    /// the clones made so far and frees the allocation.
    pub fn try_from_slice(slice: &[T], capacity: usize) -> Result<Self, TryReserveError> {
        debug_assert!(capacity >= slice.len());

        let mut block = Self::try_allocate(capacity)?;
        for value in slice {
            // Safety:
            // The block is fresh and thus exclusive, and it has room for all
            // of `slice`.
            unsafe { block.push_unchecked(value.clone()) };
        }

        Ok(block)
    }

    /// Clone the elements into a new exclusive block with room for
    /// `capacity` elements. The source block is never modified.
    #[inline]
    pub fn try_clone_with_capacity(&self, capacity: usize) -> Result<Self, TryReserveError> {
        Self::try_from_slice(self.as_slice(), capacity)
    }
}

impl<T> Drop for Block<T> {
    fn drop(&mut self) {
        // Only the last handle tears the block down.
        if !self.header().sharers.release() {
            return;
        }

        // Ensures that the block is deallocated even if one of the element
        // drops panics.
        struct Dealloc(*mut u8, Layout);

        impl Drop for Dealloc {
            fn drop(&mut self) {
                // Safety: See below.
                unsafe { alloc::alloc::dealloc(self.0, self.1) }
            }
        }

        // Safety:
        // The block was allocated with the layout of its current capacity.
        let _dealloc = Dealloc(self.ptr.as_ptr().cast::<u8>(), unsafe {
            Self::layout_unchecked(self.capacity())
        });

        // Safety:
        // No other handle references the block and the first `len` slots are
        // initialized.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.data(), self.len()));
        }
    }
}

#[cold]
fn sharer_overflow(ptr: NonNull<Header>) -> ! {
    // Give back the count taken by `share()` before unwinding.
    // Safety: the header is live while the caller's handle is.
    unsafe { ptr.as_ref().sharers.release() };
    panic!("sharer count overflow");
}

// Copy of `std::cmp::max::<usize>()` that is callable in `const` contexts
#[inline]
const fn max(x: usize, y: usize) -> usize {
    if x > y {
        x
    } else {
        y
    }
}

#[cfg(test)]
mod tests {
    use super::Block;

    #[test]
    fn allocate_and_share() {
        let mut block = Block::<u32>::try_allocate(3).unwrap();
        assert_eq!(block.capacity(), 3);
        assert_eq!(block.len(), 0);
        unsafe {
            block.push_unchecked(7);
            block.push_unchecked(8);
        }
        let other = block.share();
        assert!(!block.is_exclusive());
        assert!(block.ptr_eq(&other));
        assert_eq!(other.as_slice(), [7, 8]);
        drop(other);
        assert!(block.is_exclusive());
        assert_eq!(unsafe { block.pop_unchecked() }, 8);
        assert_eq!(block.as_slice(), [7]);
    }

    #[test]
    fn grow_keeps_elements() {
        let mut block = Block::<alloc::string::String>::try_allocate(1).unwrap();
        unsafe {
            block.push_unchecked("a".into());
            block.try_grow(5).unwrap();
            block.push_unchecked("b".into());
        }
        assert_eq!(block.capacity(), 5);
        assert_eq!(block.as_slice(), ["a", "b"]);
    }

    #[test]
    fn clone_leaves_source_alone() {
        let source = Block::try_from_slice(&[1u8, 2, 3], 3).unwrap();
        let copy = source.try_clone_with_capacity(8).unwrap();
        assert!(!source.ptr_eq(&copy));
        assert!(source.is_exclusive());
        assert_eq!(copy.capacity(), 8);
        assert_eq!(copy.as_slice(), source.as_slice());
    }

    #[test]
    fn overflowing_layout_is_an_error() {
        assert!(Block::<u64>::try_allocate(usize::MAX / 4).is_err());
        assert!(Block::<()>::try_allocate(usize::MAX).is_err());
    }

    #[test]
    fn zero_sized_elements() {
        let mut block = Block::<()>::try_allocate(2).unwrap();
        unsafe {
            block.push_unchecked(());
            block.push_unchecked(());
        }
        assert_eq!(block.as_slice().len(), 2);
    }

    #[test]
    fn over_aligned_elements() {
        #[derive(Clone, Debug, PartialEq)]
        #[repr(align(64))]
        struct Wide(u8);

        let block = Block::try_from_slice(&[Wide(1), Wide(2)], 2).unwrap();
        assert_eq!(block.as_slice().as_ptr() as usize % 64, 0);
        assert_eq!(block.as_slice(), [Wide(1), Wide(2)]);
    }
}
