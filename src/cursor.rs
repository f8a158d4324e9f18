//! Random-access cursors over the elements of a [`CowVec`].
//!
//! A cursor is a position in `0..=len` over the vector's contiguous
//! elements, whether they live in the inline slot or in a heap block. The
//! position `len` is the past-the-end position; dereferencing it panics.
//!
//! Cursors borrow the vector, so anything that could relocate the elements
//! (pushing, inserting, erasing, reserving, assigning) can only happen once
//! every cursor is gone.

use core::cmp::Ordering;
use core::fmt::{self, Debug, Formatter};
use core::ops::{Add, AddAssign, Deref, DerefMut, Index, IndexMut, Sub, SubAssign};

use crate::error::out_of_bounds;
use crate::CowVec;

/// Movement shared by [`Cursor`] and [`CursorMut`], used by [`Rev`] to walk
/// them backwards.
pub trait Seek {
    /// The current position, in `0..=end_position()`.
    fn position(&self) -> usize;

    /// The past-the-end position, i.e. the number of elements the cursor
    /// ranges over.
    fn end_position(&self) -> usize;

    /// Move by `delta` positions.
    ///
    /// Panics if the new position is outside of `0..=end_position()`.
    fn seek(&mut self, delta: isize);
}

/// A read-only cursor. Cheap to copy.
pub struct Cursor<'a, T> {
    slice: &'a [T],
    index: usize,
    /// The vector the cursor was created from, compared by address.
    vec: *const (),
}

/// A cursor that allows mutating the element under it.
pub struct CursorMut<'a, T> {
    slice: &'a mut [T],
    index: usize,
    vec: *const (),
}

/// Walks the wrapped cursor in the opposite direction.
///
/// Like a reversed C++ iterator, a reversed cursor whose base sits at
/// position `p` refers to the element at `p - 1`. So the reversed cursor
/// built from `end()` refers to the last element.
#[derive(Clone, Copy)]
pub struct Rev<C> {
    base: C,
}

impl<T> CowVec<T> {
    /// A cursor at the first element. Never clones the heap block.
    #[inline]
    pub fn begin(&self) -> Cursor<'_, T> {
        Cursor { slice: self.as_slice(), index: 0, vec: owner(self) }
    }

    /// A cursor at the past-the-end position. Never clones the heap block.
    #[inline]
    pub fn end(&self) -> Cursor<'_, T> {
        Cursor { slice: self.as_slice(), index: self.len(), vec: owner(self) }
    }

    /// A reversed cursor at the last element.
    #[inline]
    pub fn rbegin(&self) -> Rev<Cursor<'_, T>> {
        Rev::new(self.end())
    }

    /// A reversed cursor past the first element.
    #[inline]
    pub fn rend(&self) -> Rev<Cursor<'_, T>> {
        Rev::new(self.begin())
    }
}

impl<T: Clone> CowVec<T> {
    /// A mutable cursor at position `index`.
    ///
    /// Clones the heap block if it is shared. Panics if `index > len`.
    pub fn cursor_mut(&mut self, index: usize) -> CursorMut<'_, T> {
        let len = self.len();
        if index > len {
            out_of_bounds(index, len);
        }

        let vec = owner(self);
        CursorMut { slice: self.make_mut(), index, vec }
    }

    /// A mutable cursor at the first element.
    ///
    /// Clones the heap block if it is shared.
    #[inline]
    pub fn begin_mut(&mut self) -> CursorMut<'_, T> {
        self.cursor_mut(0)
    }

    /// A mutable cursor at the past-the-end position.
    ///
    /// Clones the heap block if it is shared.
    #[inline]
    pub fn end_mut(&mut self) -> CursorMut<'_, T> {
        let len = self.len();
        self.cursor_mut(len)
    }

    /// A reversed mutable cursor at the last element.
    #[inline]
    pub fn rbegin_mut(&mut self) -> Rev<CursorMut<'_, T>> {
        Rev::new(self.end_mut())
    }

    /// A reversed mutable cursor past the first element.
    #[inline]
    pub fn rend_mut(&mut self) -> Rev<CursorMut<'_, T>> {
        Rev::new(self.begin_mut())
    }
}

impl<'a, T> Cursor<'a, T> {
    /// The position of the cursor.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The element under the cursor, or `None` at the end.
    #[inline]
    pub fn get(&self) -> Option<&'a T> {
        self.slice.get(self.index)
    }

    /// Advance by one (pre-increment).
    #[inline]
    pub fn move_next(&mut self) -> &mut Self {
        self.seek(1);
        self
    }

    /// Step back by one (pre-decrement).
    #[inline]
    pub fn move_prev(&mut self) -> &mut Self {
        self.seek(-1);
        self
    }

    /// Advance by one, returning the cursor from before the move
    /// (post-increment).
    #[inline]
    pub fn post_next(&mut self) -> Self {
        let prev = *self;
        self.seek(1);
        prev
    }

    /// Step back by one, returning the cursor from before the move
    /// (post-decrement).
    #[inline]
    pub fn post_prev(&mut self) -> Self {
        let prev = *self;
        self.seek(-1);
        prev
    }

    /// The elements from this cursor up to (excluding) `end`.
    ///
    /// Panics if `end` is before this cursor.
    #[inline]
    pub fn iter_to(self, end: Self) -> core::slice::Iter<'a, T> {
        debug_assert!(self.vec == end.vec);
        self.slice[self.index..end.index].iter()
    }
}

impl<'a, T> Seek for Cursor<'a, T> {
    #[inline]
    fn position(&self) -> usize {
        self.index
    }

    #[inline]
    fn end_position(&self) -> usize {
        self.slice.len()
    }

    #[inline]
    fn seek(&mut self, delta: isize) {
        self.index = moved(self.index, delta, self.slice.len());
    }
}

impl<'a, T> CursorMut<'a, T> {
    /// The position of the cursor.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The element under the cursor, or `None` at the end.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        self.slice.get(self.index)
    }

    /// The element under the cursor mutably, or `None` at the end.
    #[inline]
    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.slice.get_mut(self.index)
    }

    /// Advance by one (pre-increment).
    #[inline]
    pub fn move_next(&mut self) -> &mut Self {
        self.seek(1);
        self
    }

    /// Step back by one (pre-decrement).
    #[inline]
    pub fn move_prev(&mut self) -> &mut Self {
        self.seek(-1);
        self
    }

    /// Advance by one, returning the position from before the move
    /// (post-increment).
    ///
    /// A mutable cursor can't be duplicated, so this returns the old
    /// [`index`](Self::index) instead of the old cursor.
    #[inline]
    pub fn post_next(&mut self) -> usize {
        let prev = self.index;
        self.seek(1);
        prev
    }

    /// Step back by one, returning the position from before the move
    /// (post-decrement).
    #[inline]
    pub fn post_prev(&mut self) -> usize {
        let prev = self.index;
        self.seek(-1);
        prev
    }

    /// A read-only cursor at the same position, borrowing from this one.
    #[inline]
    pub fn as_cursor(&self) -> Cursor<'_, T> {
        Cursor { slice: &*self.slice, index: self.index, vec: self.vec }
    }

    /// Turn into a read-only cursor at the same position.
    #[inline]
    pub fn into_cursor(self) -> Cursor<'a, T> {
        Cursor { slice: self.slice, index: self.index, vec: self.vec }
    }
}

impl<'a, T> Seek for CursorMut<'a, T> {
    #[inline]
    fn position(&self) -> usize {
        self.index
    }

    #[inline]
    fn end_position(&self) -> usize {
        self.slice.len()
    }

    #[inline]
    fn seek(&mut self, delta: isize) {
        self.index = moved(self.index, delta, self.slice.len());
    }
}

impl<C: Seek> Rev<C> {
    /// Reverse `base`.
    #[inline]
    pub fn new(base: C) -> Self {
        Self { base }
    }

    /// The underlying cursor.
    #[inline]
    pub fn base(&self) -> &C {
        &self.base
    }

    /// Unwrap the underlying cursor.
    #[inline]
    pub fn into_base(self) -> C {
        self.base
    }

    /// How many steps this cursor has taken from the reversed start, i.e.
    /// from the last element.
    #[inline]
    pub fn index(&self) -> usize {
        self.base.end_position() - self.base.position()
    }

    /// Advance by one, towards the front of the vector.
    #[inline]
    pub fn move_next(&mut self) -> &mut Self {
        self.base.seek(-1);
        self
    }

    /// Step back by one, towards the back of the vector.
    #[inline]
    pub fn move_prev(&mut self) -> &mut Self {
        self.base.seek(1);
        self
    }

    /// The position of the element this cursor refers to in the vector.
    #[inline]
    fn target(&self, offset: usize) -> usize {
        let len = self.base.end_position();
        match self.base.position().checked_sub(offset + 1) {
            Some(position) => position,
            None => out_of_bounds(len, len),
        }
    }
}

impl<'a, T> Rev<Cursor<'a, T>> {
    /// The element under the cursor, or `None` at the reversed end.
    #[inline]
    pub fn get(&self) -> Option<&'a T> {
        let position = self.base.index.checked_sub(1)?;
        self.base.slice.get(position)
    }

    /// Advance by one, returning the cursor from before the move
    /// (post-increment).
    #[inline]
    pub fn post_next(&mut self) -> Self {
        let prev = *self;
        self.move_next();
        prev
    }

    /// Step back by one, returning the cursor from before the move
    /// (post-decrement).
    #[inline]
    pub fn post_prev(&mut self) -> Self {
        let prev = *self;
        self.move_prev();
        prev
    }
}

impl<'a, T> Rev<CursorMut<'a, T>> {
    /// The element under the cursor, or `None` at the reversed end.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        let position = self.base.index.checked_sub(1)?;
        self.base.slice.get(position)
    }

    /// The element under the cursor mutably, or `None` at the reversed end.
    #[inline]
    pub fn get_mut(&mut self) -> Option<&mut T> {
        let position = self.base.index.checked_sub(1)?;
        self.base.slice.get_mut(position)
    }
}

/// The position `delta` steps away from `index`, bounded by `0..=len`.
#[inline]
fn moved(index: usize, delta: isize, len: usize) -> usize {
    match index.checked_add_signed(delta) {
        Some(target) if target <= len => target,
        _ => cursor_out_of_bounds(index, delta, len),
    }
}

/// The identity of a vector, for telling cursors of different vectors
/// apart. Empty vectors all hand out the same empty slice, so the slice
/// pointer alone is not enough.
#[inline]
fn owner<T>(vec: &CowVec<T>) -> *const () {
    (vec as *const CowVec<T>).cast()
}

#[cold]
fn cursor_out_of_bounds(index: usize, delta: isize, len: usize) -> ! {
    panic!("cursor moved out of bounds (index: {index}, delta: {delta}, len: {len})");
}

#[cold]
fn deref_end(len: usize) -> ! {
    panic!("dereferenced cursor at the end (len: {len})");
}

impl<T> Clone for Cursor<'_, T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<'_, T> {}

impl<T> Deref for Cursor<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        self.get().unwrap_or_else(|| deref_end(self.slice.len()))
    }
}

impl<T> Index<usize> for Cursor<'_, T> {
    type Output = T;

    /// The element `offset` positions after the cursor.
    #[inline]
    fn index(&self, offset: usize) -> &T {
        let index = self.index + offset;
        match self.slice.get(index) {
            Some(value) => value,
            None => out_of_bounds(index, self.slice.len()),
        }
    }
}

impl<T> Add<usize> for Cursor<'_, T> {
    type Output = Self;

    #[inline]
    fn add(mut self, offset: usize) -> Self {
        self += offset;
        self
    }
}

impl<T> Sub<usize> for Cursor<'_, T> {
    type Output = Self;

    #[inline]
    fn sub(mut self, offset: usize) -> Self {
        self -= offset;
        self
    }
}

impl<T> AddAssign<usize> for Cursor<'_, T> {
    #[inline]
    fn add_assign(&mut self, offset: usize) {
        self.seek(signed(offset));
    }
}

impl<T> SubAssign<usize> for Cursor<'_, T> {
    #[inline]
    fn sub_assign(&mut self, offset: usize) {
        self.seek(-signed(offset));
    }
}

/// The number of positions from `other` to `self`.
impl<T> Sub for Cursor<'_, T> {
    type Output = isize;

    #[inline]
    fn sub(self, other: Self) -> isize {
        debug_assert!(self.vec == other.vec);
        self.index as isize - other.index as isize
    }
}

impl<T> PartialEq for Cursor<'_, T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.vec == other.vec && self.index == other.index
    }
}

impl<T> Eq for Cursor<'_, T> {}

/// Cursors over different vectors are unordered.
impl<T> PartialOrd for Cursor<'_, T> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        (self.vec == other.vec).then(|| self.index.cmp(&other.index))
    }
}

impl<T> Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("index", &self.index)
            .field("len", &self.slice.len())
            .finish()
    }
}

impl<T> Deref for CursorMut<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        let len = self.slice.len();
        self.get().unwrap_or_else(|| deref_end(len))
    }
}

impl<T> DerefMut for CursorMut<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        let len = self.slice.len();
        self.get_mut().unwrap_or_else(|| deref_end(len))
    }
}

impl<T> Index<usize> for CursorMut<'_, T> {
    type Output = T;

    #[inline]
    fn index(&self, offset: usize) -> &T {
        let index = self.index + offset;
        match self.slice.get(index) {
            Some(value) => value,
            None => out_of_bounds(index, self.slice.len()),
        }
    }
}

impl<T> IndexMut<usize> for CursorMut<'_, T> {
    #[inline]
    fn index_mut(&mut self, offset: usize) -> &mut T {
        let index = self.index + offset;
        let len = self.slice.len();
        match self.slice.get_mut(index) {
            Some(value) => value,
            None => out_of_bounds(index, len),
        }
    }
}

impl<T> Add<usize> for CursorMut<'_, T> {
    type Output = Self;

    #[inline]
    fn add(mut self, offset: usize) -> Self {
        self += offset;
        self
    }
}

impl<T> Sub<usize> for CursorMut<'_, T> {
    type Output = Self;

    #[inline]
    fn sub(mut self, offset: usize) -> Self {
        self -= offset;
        self
    }
}

impl<T> AddAssign<usize> for CursorMut<'_, T> {
    #[inline]
    fn add_assign(&mut self, offset: usize) {
        self.seek(signed(offset));
    }
}

impl<T> SubAssign<usize> for CursorMut<'_, T> {
    #[inline]
    fn sub_assign(&mut self, offset: usize) {
        self.seek(-signed(offset));
    }
}

impl<'a, T> From<CursorMut<'a, T>> for Cursor<'a, T> {
    #[inline]
    fn from(cursor: CursorMut<'a, T>) -> Self {
        cursor.into_cursor()
    }
}

impl<T> Debug for CursorMut<'_, T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("CursorMut")
            .field("index", &self.index)
            .field("len", &self.slice.len())
            .finish()
    }
}

impl<T> Deref for Rev<Cursor<'_, T>> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self[0]
    }
}

impl<T> Index<usize> for Rev<Cursor<'_, T>> {
    type Output = T;

    /// The element `offset` positions further along the reversed direction.
    #[inline]
    fn index(&self, offset: usize) -> &T {
        &self.base.slice[self.target(offset)]
    }
}

impl<T> Deref for Rev<CursorMut<'_, T>> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self[0]
    }
}

impl<T> DerefMut for Rev<CursorMut<'_, T>> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        &mut self[0]
    }
}

impl<T> Index<usize> for Rev<CursorMut<'_, T>> {
    type Output = T;

    #[inline]
    fn index(&self, offset: usize) -> &T {
        &self.base.slice[self.target(offset)]
    }
}

impl<T> IndexMut<usize> for Rev<CursorMut<'_, T>> {
    #[inline]
    fn index_mut(&mut self, offset: usize) -> &mut T {
        let position = self.target(offset);
        &mut self.base.slice[position]
    }
}

impl<C: Seek> Add<usize> for Rev<C> {
    type Output = Self;

    #[inline]
    fn add(mut self, offset: usize) -> Self {
        self += offset;
        self
    }
}

impl<C: Seek> Sub<usize> for Rev<C> {
    type Output = Self;

    #[inline]
    fn sub(mut self, offset: usize) -> Self {
        self -= offset;
        self
    }
}

impl<C: Seek> AddAssign<usize> for Rev<C> {
    #[inline]
    fn add_assign(&mut self, offset: usize) {
        self.base.seek(-signed(offset));
    }
}

impl<C: Seek> SubAssign<usize> for Rev<C> {
    #[inline]
    fn sub_assign(&mut self, offset: usize) {
        self.base.seek(signed(offset));
    }
}

/// The number of reversed steps from `other` to `self`.
impl<T> Sub for Rev<Cursor<'_, T>> {
    type Output = isize;

    #[inline]
    fn sub(self, other: Self) -> isize {
        other.base - self.base
    }
}

impl<T> PartialEq for Rev<Cursor<'_, T>> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base
    }
}

impl<T> Eq for Rev<Cursor<'_, T>> {}

impl<T> PartialOrd for Rev<Cursor<'_, T>> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        other.base.partial_cmp(&self.base)
    }
}

impl<C: Debug> Debug for Rev<C> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_tuple("Rev").field(&self.base).finish()
    }
}

#[inline]
fn signed(offset: usize) -> isize {
    isize::try_from(offset).unwrap_or(isize::MAX)
}
