// Every mutation must leave the vector (and any vector it shares a block
// with) exactly as it was when cloning an element panics halfway.

use std::cell::Cell;
use std::panic::{catch_unwind, AssertUnwindSafe};

use monocow::CowVec;

thread_local! {
    /// How many more clones may succeed, `None` for unlimited.
    static BUDGET: Cell<Option<usize>> = const { Cell::new(None) };
    /// The number of `Flaky` values alive on this thread.
    static LIVE: Cell<isize> = const { Cell::new(0) };
}

/// An element whose clone panics once the budget is used up.
#[derive(Debug, PartialEq)]
struct Flaky(u32);

impl Flaky {
    fn new(value: u32) -> Self {
        LIVE.with(|live| live.set(live.get() + 1));
        Self(value)
    }
}

impl Clone for Flaky {
    fn clone(&self) -> Self {
        BUDGET.with(|budget| match budget.get() {
            Some(0) => panic!("clone failed"),
            Some(n) => budget.set(Some(n - 1)),
            None => {}
        });
        Self::new(self.0)
    }
}

impl Drop for Flaky {
    fn drop(&mut self) {
        LIVE.with(|live| live.set(live.get() - 1));
    }
}

fn live() -> isize {
    LIVE.with(Cell::get)
}

fn flaky(values: &[u32]) -> CowVec<Flaky> {
    values.iter().map(|&value| Flaky::new(value)).collect()
}

fn values(vec: &CowVec<Flaky>) -> Vec<u32> {
    vec.iter().map(|flaky| flaky.0).collect()
}

/// Runs `op` with a clone budget of 0, 1, 2, ... and checks that every failed
/// attempt leaves `vec` untouched and leaks nothing. Returns the budget that
/// was finally enough.
fn clones_needed<F>(vec: &mut CowVec<Flaky>, mut op: F) -> usize
where
    F: FnMut(&mut CowVec<Flaky>),
{
    let before = values(vec);
    let ptr = vec.as_ptr();
    let capacity = vec.capacity();

    for budget in 0.. {
        let alive = live();
        BUDGET.with(|cell| cell.set(Some(budget)));
        let result = catch_unwind(AssertUnwindSafe(|| op(vec)));
        BUDGET.with(|cell| cell.set(None));

        if result.is_ok() {
            return budget;
        }

        assert_eq!(values(vec), before);
        assert_eq!(vec.as_ptr(), ptr);
        assert_eq!(vec.capacity(), capacity);
        assert_eq!(live(), alive);
    }

    unreachable!()
}

#[test]
fn insert() {
    let mut vec = flaky(&[1, 2, 3, 4]);
    let n = clones_needed(&mut vec, |vec| vec.insert(2, Flaky::new(9)));
    assert_eq!(n, 4);
    assert_eq!(values(&vec), [1, 2, 9, 3, 4]);
}

#[test]
fn insert_into_shared() {
    let mut vec = flaky(&[1, 2, 3]);
    let other = vec.clone();
    let n = clones_needed(&mut vec, |vec| vec.insert(0, Flaky::new(0)));
    assert_eq!(n, 3);
    assert_eq!(values(&vec), [0, 1, 2, 3]);
    assert_eq!(values(&other), [1, 2, 3]);
    assert!(other.is_unique());
}

#[test]
fn erase() {
    let mut vec = flaky(&[1, 2, 3, 4]);
    let n = clones_needed(&mut vec, |vec| vec.erase(1..2));
    assert_eq!(n, 3);
    assert_eq!(values(&vec), [1, 3, 4]);
}

#[test]
fn erase_tail_of_shared() {
    let mut vec = flaky(&[1, 2, 3, 4]);
    let other = vec.clone();
    let n = clones_needed(&mut vec, |vec| vec.erase(2..));
    assert_eq!(n, 2);
    assert_eq!(values(&vec), [1, 2]);
    assert_eq!(values(&other), [1, 2, 3, 4]);
}

#[test]
fn push_onto_shared() {
    let mut vec = flaky(&[1, 2, 3]);
    let other = vec.clone();
    let n = clones_needed(&mut vec, |vec| vec.push(Flaky::new(4)));
    assert_eq!(n, 3);
    assert_eq!(values(&vec), [1, 2, 3, 4]);
    assert_eq!(values(&other), [1, 2, 3]);
}

#[test]
fn pop_from_shared() {
    let mut vec = flaky(&[1, 2, 3]);
    let other = vec.clone();
    let n = clones_needed(&mut vec, |vec| {
        vec.pop();
    });
    assert_eq!(n, 3);
    assert_eq!(values(&vec), [1, 2]);
    assert_eq!(values(&other), [1, 2, 3]);
}

#[test]
fn write_to_shared() {
    let mut vec = flaky(&[1, 2, 3]);
    let other = vec.clone();
    let n = clones_needed(&mut vec, |vec| vec[1] = Flaky::new(7));
    assert_eq!(n, 3);
    assert_eq!(values(&vec), [1, 7, 3]);
    assert_eq!(values(&other), [1, 2, 3]);
}

#[test]
fn reserve_on_shared() {
    let mut vec = flaky(&[1, 2]);
    let other = vec.clone();
    let n = clones_needed(&mut vec, |vec| vec.reserve(10));
    assert_eq!(n, 2);
    assert!(vec.capacity() >= 12);
    assert!(vec.is_unique());
    assert_eq!(values(&other), [1, 2]);
}

#[test]
fn extend_from_slice() {
    let mut vec = flaky(&[1, 2]);
    let tail = flaky(&[3, 4, 5]);
    vec.reserve(tail.len());
    let n = clones_needed(&mut vec, |vec| vec.extend_from_slice(&tail));
    assert_eq!(n, 3);
    assert_eq!(values(&vec), [1, 2, 3, 4, 5]);
}

#[test]
fn retain() {
    let mut vec = flaky(&[1, 2, 3, 4]);
    let n = clones_needed(&mut vec, |vec| vec.retain(|flaky| flaky.0 % 2 == 0));
    assert_eq!(n, 2);
    assert_eq!(values(&vec), [2, 4]);
}

#[test]
fn clone_from_inline() {
    let source = flaky(&[5]);
    let mut vec = flaky(&[1, 2]);
    let n = clones_needed(&mut vec, |vec| vec.clone_from(&source));
    assert_eq!(n, 1);
    assert_eq!(values(&vec), [5]);
}

#[test]
fn nothing_leaks() {
    {
        let mut vec = flaky(&[1, 2, 3]);
        let _other = vec.clone();
        clones_needed(&mut vec, |vec| vec.insert(1, Flaky::new(0)));
        clones_needed(&mut vec, |vec| vec.erase(0..1));
    }
    assert_eq!(live(), 0);
}
