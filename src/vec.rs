//! A clone-on-write vector with a single inline slot.

use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt::{self, Debug, Formatter};
use core::hash::{Hash, Hasher};
use core::mem;
use core::ops::{Bound, Deref, Index, IndexMut, RangeBounds};
use core::ptr;

use alloc::vec::Vec;

use crate::block::Block;
use crate::error::{infallible, invalid_range, out_of_bounds, TryReserveError};

/// The capacity of the block allocated when a second element is pushed onto
/// an inline vector.
pub const PROMOTED_CAPACITY: usize = 4;

/// Create a new [`CowVec`] with the given elements.
/// ```
/// # use monocow::cow_vec;
/// assert_eq!(cow_vec![1; 4], [1; 4]);
/// assert_eq!(cow_vec![1, 2, 3], [1, 2, 3]);
/// ```
#[macro_export]
macro_rules! cow_vec {
    () => { $crate::CowVec::new() };
    ($elem:expr; $n:expr) => { $crate::CowVec::from_elem($elem, $n) };
    ($($value:expr),+ $(,)?) => { $crate::CowVec::from([$($value),+]) };
}

/// A vector with value semantics that stores up to one element inline and
/// shares its heap block between clones.
///
/// - An empty vector or a vector with a single element never allocates.
/// - Pushing a second element moves both into a heap block with room for
///   [`PROMOTED_CAPACITY`] elements.
/// - Cloning a vector with a heap block only bumps a counter in the block.
///   The block is cloned the first time one of the sharing vectors is
///   mutated.
///
/// The sharer count is not atomic, so `CowVec` is neither [`Send`] nor
/// [`Sync`].
///
/// Mutating methods require [`T: Clone`](Clone) due to clone-on-write
/// semantics. They provide the strong guarantee: if a clone of an element
/// panics or an allocation fails, the vector is left as it was.
///
/// # Example
/// ```
/// use monocow::CowVec;
///
/// // Neither of these allocates.
/// let mut first = CowVec::new();
/// first.push(1);
/// assert!(first.is_inline());
///
/// // This one moves both elements into a heap block.
/// first.push(2);
/// assert_eq!(first, [1, 2]);
///
/// // This clone is cheap, it references the same block.
/// let mut second = first.clone();
/// assert_eq!(first.as_ptr(), second.as_ptr());
///
/// // This makes a real copy (clone-on-write).
/// second.push(3);
/// assert_eq!(first, [1, 2]);
/// assert_eq!(second, [1, 2, 3]);
/// ```
pub struct CowVec<T> {
    repr: Repr<T>,
}

/// The two storage modes.
enum Repr<T> {
    /// Zero or one element, held by value.
    Inline(Option<T>),
    /// A handle to a heap block, possibly shared with other vectors.
    Shared(Block<T>),
}

impl<T> CowVec<T> {
    /// Create a new, empty vector. Does not allocate.
    #[inline]
    pub const fn new() -> Self {
        Self { repr: Repr::Inline(None) }
    }

    /// Create a new, empty vector with room for at least `capacity`
    /// elements.
    ///
    /// A capacity of one or less is served by the inline slot and does not
    /// allocate.
    pub fn with_capacity(capacity: usize) -> Self {
        if capacity <= 1 {
            return Self::new();
        }

        Self { repr: Repr::Shared(infallible(Block::try_allocate(capacity))) }
    }

    /// The number of elements in the vector.
    #[inline]
    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::Inline(slot) => slot.is_some() as usize,
            Repr::Shared(block) => block.len(),
        }
    }

    /// Returns `true` if the vector contains no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many elements the vector's heap block can hold.
    ///
    /// Inline vectors report zero: their single slot is not a heap block.
    /// Even if `len < capacity`, pushing may still allocate if the block is
    /// shared with other vectors.
    #[inline]
    pub fn capacity(&self) -> usize {
        match &self.repr {
            Repr::Inline(_) => 0,
            Repr::Shared(block) => block.capacity(),
        }
    }

    /// Whether the vector stores its element (if any) inline, without a
    /// heap block.
    #[inline]
    pub fn is_inline(&self) -> bool {
        matches!(self.repr, Repr::Inline(_))
    }

    /// Whether no other vector references the same heap block. Inline
    /// vectors are always unique.
    #[inline]
    pub fn is_unique(&self) -> bool {
        match &self.repr {
            Repr::Inline(_) => true,
            Repr::Shared(block) => block.is_exclusive(),
        }
    }

    /// Extracts a slice containing the entire vector.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        match &self.repr {
            Repr::Inline(None) => &[],
            Repr::Inline(Some(value)) => core::slice::from_ref(value),
            Repr::Shared(block) => block.as_slice(),
        }
    }

    /// A pointer to the first element, or null if the vector is empty.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        if self.is_empty() {
            ptr::null()
        } else {
            self.as_slice().as_ptr()
        }
    }

    /// The first element.
    ///
    /// Panics if the vector is empty.
    #[inline]
    pub fn front(&self) -> &T {
        &self[0]
    }

    /// The last element.
    ///
    /// Panics if the vector is empty.
    #[inline]
    pub fn back(&self) -> &T {
        match self.len() {
            0 => out_of_bounds(0, 0),
            len => &self[len - 1],
        }
    }

    /// Removes all values from the vector.
    ///
    /// The vector returns to the empty inline state. If the heap block was
    /// shared, only this vector's reference to it is given up.
    #[inline]
    pub fn clear(&mut self) {
        self.repr = Repr::Inline(None);
    }

    /// Exchanges the contents of two vectors without touching any element.
    #[inline]
    pub fn swap_with(&mut self, other: &mut Self) {
        mem::swap(&mut self.repr, &mut other.repr);
    }
}

impl<T: Clone> CowVec<T> {
    /// Create a new vector with `n` copies of `value`.
    pub fn from_elem(value: T, n: usize) -> Self {
        let mut vec = Self::with_capacity(n);
        for _ in 1..n {
            vec.push(value.clone());
        }
        if n > 0 {
            vec.push(value);
        }
        vec
    }

    /// Produce a mutable slice containing the entire vector.
    ///
    /// Clones the heap block if it is shared.
    pub fn make_mut(&mut self) -> &mut [T] {
        if self.is_empty() {
            return &mut [];
        }

        self.make_unique();

        match &mut self.repr {
            Repr::Inline(None) => &mut [],
            Repr::Inline(Some(value)) => core::slice::from_mut(value),
            // Safety: `make_unique` left the block exclusive.
            Repr::Shared(block) => unsafe { block.as_mut_slice() },
        }
    }

    /// A mutable pointer to the first element, or null if the vector is
    /// empty.
    ///
    /// Clones the heap block if it is shared.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        if self.is_empty() {
            ptr::null_mut()
        } else {
            self.make_mut().as_mut_ptr()
        }
    }

    /// A mutable reference to the element at `index`, or `None` if out of
    /// bounds.
    ///
    /// Clones the heap block if it is shared and `index` is in bounds.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len() {
            return None;
        }

        self.make_mut().get_mut(index)
    }

    /// The first element, mutably.
    ///
    /// Panics if the vector is empty.
    #[inline]
    pub fn front_mut(&mut self) -> &mut T {
        &mut self[0]
    }

    /// The last element, mutably.
    ///
    /// Panics if the vector is empty.
    #[inline]
    pub fn back_mut(&mut self) -> &mut T {
        match self.len() {
            0 => out_of_bounds(0, 0),
            len => &mut self[len - 1],
        }
    }

    /// A mutable iterator over the elements.
    ///
    /// Clones the heap block if it is shared.
    #[inline]
    pub fn iter_mut(&mut self) -> core::slice::IterMut<'_, T> {
        self.make_mut().iter_mut()
    }

    /// Add a value at the end of the vector.
    ///
    /// Clones the heap block if it is shared. Panics or aborts if the
    /// allocation fails.
    #[inline]
    pub fn push(&mut self, value: T) {
        infallible(self.try_push(value));
    }

    /// Add a value at the end of the vector, reporting allocation failure.
    ///
    /// On error the vector is unchanged and `value` is dropped.
    pub fn try_push(&mut self, value: T) -> Result<(), TryReserveError> {
        match &mut self.repr {
            Repr::Inline(None) => {
                self.repr = Repr::Inline(Some(value));
            }
            Repr::Inline(slot) => {
                let mut block = Block::try_allocate(PROMOTED_CAPACITY)?;
                unsafe {
                    // Safety:
                    // The block is fresh and has room for two elements.
                    if let Some(first) = slot.take() {
                        block.push_unchecked(first);
                    }
                    block.push_unchecked(value);
                }
                self.repr = Repr::Shared(block);
            }
            Repr::Shared(block) => {
                let capacity = block.capacity();
                if block.len() == capacity {
                    let target = capacity
                        .max(1)
                        .checked_mul(2)
                        .ok_or(TryReserveError::CapacityOverflow)?;
                    Self::try_resize(block, target)?;
                } else if !block.is_exclusive() {
                    *block = block.try_clone_with_capacity(capacity)?;
                }

                // Safety:
                // The block is exclusive and not full.
                unsafe { block.push_unchecked(value) };
            }
        }

        Ok(())
    }

    /// Removes the last element and returns it, or `None` if the vector is
    /// empty.
    ///
    /// Clones the heap block if it is shared.
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        self.make_unique();

        match &mut self.repr {
            Repr::Inline(slot) => slot.take(),
            // Safety:
            // The block is exclusive because of `make_unique` and non-empty.
            Repr::Shared(block) => Some(unsafe { block.pop_unchecked() }),
        }
    }

    /// Reserve space for at least `additional` more elements.
    ///
    /// Guarantees that the vector is unique afterwards and can take
    /// `additional` more elements without reallocating. Never shrinks.
    #[inline]
    pub fn reserve(&mut self, additional: usize) {
        infallible(self.try_reserve(additional));
    }

    /// Like [`reserve`](Self::reserve), but reports allocation failure
    /// instead of aborting. On error the vector is unchanged.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        let target = self
            .len()
            .checked_add(additional)
            .ok_or(TryReserveError::CapacityOverflow)?;

        match &mut self.repr {
            // The inline slot is enough.
            Repr::Inline(_) if target <= 1 => {}
            Repr::Inline(slot) => {
                let mut block = Block::try_allocate(target)?;
                if let Some(value) = slot.take() {
                    // Safety:
                    // The block is fresh and `target > 1`.
                    unsafe { block.push_unchecked(value) };
                }
                self.repr = Repr::Shared(block);
            }
            Repr::Shared(block) => {
                let capacity = block.capacity();
                if target > capacity || !block.is_exclusive() {
                    Self::try_resize(block, target.max(capacity))?;
                }
            }
        }

        Ok(())
    }

    /// Inserts an element at position `index`, shifting all elements after
    /// it to the right.
    ///
    /// Inserting at the end is a [`push`](Self::push). Anywhere else, the
    /// vector is rebuilt into a fresh block which only replaces the old
    /// contents once every element has been cloned.
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, value: T) {
        let len = self.len();
        if index > len {
            out_of_bounds(index, len);
        }

        if index == len {
            self.push(value);
            return;
        }

        let (prefix, suffix) = self.as_slice().split_at(index);
        let mut scratch = Self::with_capacity(len + 1);
        scratch.extend_from_slice(prefix);
        scratch.push(value);
        scratch.extend_from_slice(suffix);
        *self = scratch;
    }

    /// Removes the elements in `range`, keeping the order of the rest.
    ///
    /// Removing a tail of a unique vector pops the elements one by one.
    /// Otherwise the survivors are cloned into a fresh block that replaces
    /// the old contents only once complete.
    ///
    /// Panics if the range is decreasing or ends after `len`.
    pub fn erase<R>(&mut self, range: R)
    where
        R: RangeBounds<usize>,
    {
        let len = self.len();
        let (start, end) = bounds(range, len);
        if start == end {
            return;
        }

        if end == len && self.is_unique() {
            for _ in start..end {
                self.pop();
            }
            return;
        }

        let values = self.as_slice();
        let mut scratch = Self::with_capacity(len - (end - start));
        scratch.extend_from_slice(&values[..start]);
        scratch.extend_from_slice(&values[end..]);
        *self = scratch;
    }

    /// Removes the element at `index`, keeping the order of the rest.
    ///
    /// Panics if `index >= len`.
    #[inline]
    pub fn erase_at(&mut self, index: usize) {
        let len = self.len();
        if index >= len {
            out_of_bounds(index, len);
        }

        self.erase(index..index + 1);
    }

    /// Removes and returns the element at `index`.
    ///
    /// The returned element is a clone taken before erasing.
    ///
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> T {
        let value = self[index].clone();
        self.erase_at(index);
        value
    }

    /// Shortens the vector, keeping the first `target` elements.
    #[inline]
    pub fn truncate(&mut self, target: usize) {
        if target < self.len() {
            self.erase(target..);
        }
    }

    /// Retains only the elements specified by the predicate.
    ///
    /// The vector (and a heap block it shares) is left alone if every
    /// element is kept.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&T) -> bool,
    {
        let kept: Self = self.iter().filter(|value| f(value)).cloned().collect();
        if kept.len() < self.len() {
            *self = kept;
        }
    }

    /// Clones and pushes all elements in a slice to the vector.
    ///
    /// If a clone panics, the elements pushed so far are removed again.
    pub fn extend_from_slice(&mut self, slice: &[T]) {
        if slice.is_empty() {
            return;
        }

        self.reserve(slice.len());
        let rollback = Rollback::new(self);
        for value in slice {
            rollback.vec.push(value.clone());
        }
        rollback.commit();
    }

    /// Ensure that this vector does not share its heap block.
    ///
    /// Keeps the capacity.
    #[inline]
    fn make_unique(&mut self) {
        infallible(self.try_make_unique());
    }

    fn try_make_unique(&mut self) -> Result<(), TryReserveError> {
        if let Repr::Shared(block) = &mut self.repr {
            if !block.is_exclusive() {
                *block = block.try_clone_with_capacity(block.capacity())?;
            }
        }

        Ok(())
    }

    /// Leave `block` exclusive with `target` slots.
    ///
    /// A shared block is cloned straight into the new size, an exclusive one
    /// is grown in place.
    fn try_resize(block: &mut Block<T>, target: usize) -> Result<(), TryReserveError> {
        if !block.is_exclusive() {
            *block = block.try_clone_with_capacity(target)?;
        } else if target > block.capacity() {
            // Safety: just checked both preconditions.
            unsafe { block.try_grow(target)? };
        }

        Ok(())
    }
}

/// Truncates a vector back to its original length when dropped, unless
/// committed.
///
/// Only used on a vector that was made unique beforehand, so the truncation
/// never clones.
struct Rollback<'a, T: Clone> {
    vec: &'a mut CowVec<T>,
    len: usize,
}

impl<'a, T: Clone> Rollback<'a, T> {
    #[inline]
    fn new(vec: &'a mut CowVec<T>) -> Self {
        Self { len: vec.len(), vec }
    }

    #[inline]
    fn commit(self) {
        mem::forget(self);
    }
}

impl<T: Clone> Drop for Rollback<'_, T> {
    fn drop(&mut self) {
        self.vec.truncate(self.len);
    }
}

/// Resolve `range` against `len`.
fn bounds<R>(range: R, len: usize) -> (usize, usize)
where
    R: RangeBounds<usize>,
{
    let start = match range.start_bound() {
        Bound::Included(&start) => start,
        Bound::Excluded(&start) => {
            start.checked_add(1).unwrap_or_else(|| invalid_range(start, len, len))
        }
        Bound::Unbounded => 0,
    };

    let end = match range.end_bound() {
        Bound::Included(&end) => {
            end.checked_add(1).unwrap_or_else(|| invalid_range(start, end, len))
        }
        Bound::Excluded(&end) => end,
        Bound::Unbounded => len,
    };

    if start > end || end > len {
        invalid_range(start, end, len);
    }

    (start, end)
}

/// Exchanges the contents of two vectors.
#[inline]
pub fn swap<T>(a: &mut CowVec<T>, b: &mut CowVec<T>) {
    a.swap_with(b);
}

impl<T: Clone> Clone for CowVec<T> {
    #[inline]
    fn clone(&self) -> Self {
        let repr = match &self.repr {
            Repr::Inline(slot) => Repr::Inline(slot.clone()),
            Repr::Shared(block) => Repr::Shared(block.share()),
        };
        Self { repr }
    }

    fn clone_from(&mut self, source: &Self) {
        // Already sharing the same block.
        if let (Repr::Shared(ours), Repr::Shared(theirs)) = (&self.repr, &source.repr) {
            if ours.ptr_eq(theirs) {
                return;
            }
        }

        *self = source.clone();
    }
}

impl<T> Deref for CowVec<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T> Index<usize> for CowVec<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        match self.as_slice().get(index) {
            Some(value) => value,
            None => out_of_bounds(index, self.len()),
        }
    }
}

impl<T: Clone> IndexMut<usize> for CowVec<T> {
    /// Clones the heap block if it is shared.
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        let len = self.len();
        match self.get_mut(index) {
            Some(value) => value,
            None => out_of_bounds(index, len),
        }
    }
}

impl<T> Borrow<[T]> for CowVec<T> {
    #[inline]
    fn borrow(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> AsRef<[T]> for CowVec<T> {
    #[inline]
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> Default for CowVec<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Debug> Debug for CowVec<T> {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        self.as_slice().fmt(f)
    }
}

impl<T: Hash> Hash for CowVec<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T: Eq> Eq for CowVec<T> {}

impl<T: PartialEq> PartialEq for CowVec<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: PartialEq> PartialEq<[T]> for CowVec<T> {
    #[inline]
    fn eq(&self, other: &[T]) -> bool {
        self.as_slice() == other
    }
}

impl<T: PartialEq> PartialEq<&[T]> for CowVec<T> {
    #[inline]
    fn eq(&self, other: &&[T]) -> bool {
        self.as_slice() == *other
    }
}

impl<T: PartialEq, const N: usize> PartialEq<[T; N]> for CowVec<T> {
    #[inline]
    fn eq(&self, other: &[T; N]) -> bool {
        self.as_slice() == other
    }
}

impl<T: PartialEq, const N: usize> PartialEq<&[T; N]> for CowVec<T> {
    #[inline]
    fn eq(&self, other: &&[T; N]) -> bool {
        self.as_slice() == *other
    }
}

impl<T: PartialEq> PartialEq<Vec<T>> for CowVec<T> {
    #[inline]
    fn eq(&self, other: &Vec<T>) -> bool {
        self.as_slice() == other
    }
}

impl<T: PartialEq> PartialEq<CowVec<T>> for [T] {
    #[inline]
    fn eq(&self, other: &CowVec<T>) -> bool {
        self == other.as_slice()
    }
}

impl<T: PartialEq, const N: usize> PartialEq<CowVec<T>> for [T; N] {
    #[inline]
    fn eq(&self, other: &CowVec<T>) -> bool {
        self == other.as_slice()
    }
}

impl<T: PartialEq> PartialEq<CowVec<T>> for Vec<T> {
    #[inline]
    fn eq(&self, other: &CowVec<T>) -> bool {
        self == other.as_slice()
    }
}

/// Ascending lexicographic order: the first differing element decides, and
/// a strict prefix is smaller.
impl<T: Ord> Ord for CowVec<T> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl<T: PartialOrd> PartialOrd for CowVec<T> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.as_slice().partial_cmp(other.as_slice())
    }
}

impl<T: Clone> From<&[T]> for CowVec<T> {
    fn from(slice: &[T]) -> Self {
        let mut vec = Self::new();
        vec.extend_from_slice(slice);
        vec
    }
}

impl<T: Clone, const N: usize> From<[T; N]> for CowVec<T> {
    fn from(array: [T; N]) -> Self {
        array.into_iter().collect()
    }
}

impl<T: Clone> From<Vec<T>> for CowVec<T> {
    /// This needs to allocate to change the layout.
    fn from(other: Vec<T>) -> Self {
        other.into_iter().collect()
    }
}

impl<T: Clone> FromIterator<T> for CowVec<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let hint = iter.size_hint().0;
        let mut vec = Self::with_capacity(hint);
        vec.extend(iter);
        vec
    }
}

impl<T: Clone> Extend<T> for CowVec<T> {
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = T>,
    {
        let iter = iter.into_iter();
        let hint = iter.size_hint().0;
        if hint > 0 {
            self.reserve(hint);
        }

        let rollback = Rollback::new(self);
        for value in iter {
            rollback.vec.push(value);
        }
        rollback.commit();
    }
}

impl<'a, T> IntoIterator for &'a CowVec<T> {
    type IntoIter = core::slice::Iter<'a, T>;
    type Item = &'a T;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<'a, T: Clone> IntoIterator for &'a mut CowVec<T> {
    type IntoIter = core::slice::IterMut<'a, T>;
    type Item = &'a mut T;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T: Clone> IntoIterator for CowVec<T> {
    type IntoIter = IntoIter<T>;
    type Item = T;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        let repr = match self.repr {
            Repr::Inline(slot) => IntoIterRepr::Inline(slot),
            Repr::Shared(block) => IntoIterRepr::Shared {
                unique: block.is_exclusive(),
                front: 0,
                back: block.len(),
                block,
            },
        };
        IntoIter { repr }
    }
}

/// An owned iterator over a [`CowVec`].
///
/// If the vector did not share its heap block, this moves out of it,
/// otherwise it lazily clones.
pub struct IntoIter<T> {
    repr: IntoIterRepr<T>,
}

enum IntoIterRepr<T> {
    Inline(Option<T>),
    Shared {
        /// The underlying block.
        block: Block<T>,
        /// Whether we have exclusive ownership over the block.
        unique: bool,
        /// How many elements we have already read from the front.
        /// If `unique` is true, these must not be dropped in our drop impl!
        ///
        /// Invariant: `0 <= front <= back`.
        front: usize,
        /// Elements at and after this index have already been read from the
        /// back. If `unique` is true, these must not be dropped in our drop
        /// impl!
        ///
        /// Invariant: `back <= len`.
        back: usize,
    },
}

impl<T> IntoIter<T> {
    /// Returns the remaining items of this iterator as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        match &self.repr {
            IntoIterRepr::Inline(None) => &[],
            IntoIterRepr::Inline(Some(value)) => core::slice::from_ref(value),
            IntoIterRepr::Shared { block, front, back, .. } => {
                &block.as_slice()[*front..*back]
            }
        }
    }
}

impl<T: Clone> Iterator for IntoIter<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.repr {
            IntoIterRepr::Inline(slot) => slot.take(),
            IntoIterRepr::Shared { block, unique, front, back } => {
                (*front < *back).then(|| {
                    let prev = *front;
                    *front += 1;
                    if *unique {
                        // Safety:
                        // - We have exclusive ownership over the block.
                        // - We know that `prev < back <= len`.
                        // - We take ownership of the value and don't drop it
                        //   again in our drop impl.
                        unsafe { block.read(prev) }
                    } else {
                        block.as_slice()[prev].clone()
                    }
                })
            }
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.as_slice().len();
        (len, Some(len))
    }

    #[inline]
    fn count(self) -> usize {
        self.len()
    }
}

impl<T: Clone> DoubleEndedIterator for IntoIter<T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        match &mut self.repr {
            IntoIterRepr::Inline(slot) => slot.take(),
            IntoIterRepr::Shared { block, unique, front, back } => {
                (*back > *front).then(|| {
                    *back -= 1;
                    if *unique {
                        // Safety:
                        // Same as in `next`, with `back < len` after the
                        // subtraction.
                        unsafe { block.read(*back) }
                    } else {
                        block.as_slice()[*back].clone()
                    }
                })
            }
        }
    }
}

impl<T: Clone> ExactSizeIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        let IntoIterRepr::Shared { block, unique: true, front, back } = &mut self.repr
        else {
            return;
        };

        unsafe {
            // Safety:
            // Set len to zero before dropping to prevent double dropping in
            // the block's drop impl in case of panic.
            block.set_len(0);

            // Safety:
            // The elements in `..front` and `back..` have already been moved
            // out. Thus, we only drop the elements that remain in the middle.
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                block.as_mut_ptr().add(*front),
                *back - *front,
            ));
        }
    }
}

impl<T: Debug> Debug for IntoIter<T> {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}
