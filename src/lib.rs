/*!
Clone-on-write vector that keeps zero or one element inline.

## Types
- A [`CowVec`] is a vector with value semantics. While it holds at most one
  element, the element is stored inline and nothing is allocated. From the
  second element on, the elements live in a heap block that starts with a
  small header (capacity, length and a sharer count). Cloning such a vector
  only bumps the sharer count; the block is cloned the first time one of the
  vectors sharing it is mutated.

- [`Cursor`] and [`CursorMut`] are random-access positions into a vector,
  and [`Rev`] walks either of them backwards.

## Example
```
use monocow::{cow_vec, CowVec};

// Stored inline, no allocation.
let mut digits = CowVec::new();
digits.push(1);
assert!(digits.is_inline());

// Moves to the heap. `copy` shares the block with `digits`.
digits.push(2);
let mut copy = digits.clone();
assert_eq!(copy.as_ptr(), digits.as_ptr());

// Writing to `copy` clones the block first; `digits` is unaffected.
copy[0] = 7;
assert_eq!(digits, [1, 2]);
assert_eq!(copy, cow_vec![7, 2]);
```

## Threads
The sharer count is a plain integer, not an atomic. A `CowVec` is neither
`Send` nor `Sync` and must stay on the thread that created it, together with
every vector it shares a block with.

```compile_fail
fn assert_send<T: Send>() {}
assert_send::<monocow::CowVec<u8>>();
```

```compile_fail
fn assert_sync<T: Sync>() {}
assert_sync::<monocow::CowVec<u8>>();
```

## Failure
Mutating methods give the strong guarantee: if an allocation fails or a
clone of an element panics, the vector is left exactly as it was and no
block shared with other vectors is touched. Fallible allocation is available
through [`CowVec::try_reserve`] and [`CowVec::try_push`].
*/

#![no_std]
#![deny(missing_docs)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod block;
mod cursor;
mod error;
mod sharers;
mod vec;

pub use self::cursor::*;
pub use self::error::TryReserveError;
pub use self::vec::*;


// Run doctests on the README too
#[doc = include_str!("../README.md")]
#[cfg(doctest)]
pub struct ReadmeDoctests;
