//! Append-only storage for dictionary entries and weights.
//!
//! A [`Pool`] hands out integer slots and never frees them one by one. The
//! whole region goes away when the pool is dropped or replaced, so an index
//! handed out by [`Pool::alloc`] stays valid for the lifetime of the pool.

use std::mem;
use std::ops::{Index, IndexMut, Range};

/// Capacity for tiny tables, mostly useful in tests.
pub const TINY: usize = 1 << 6;
/// Capacity for small tables.
pub const SMALL: usize = 1 << 10;
/// Default bucket count.
pub const MEDIUM: usize = 1 << 16;
/// Default pool size in bytes.
pub const LARGE: usize = 1 << 20;

/// Upper bound on the number of slots reserved up front.
const MAX_RESERVE: usize = 1 << 22;

/// Bulk, never individually freed storage.
#[derive(Debug, Clone)]
pub struct Pool<T> {
    items: Vec<T>,
}

impl<T> Pool<T> {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Create a pool reserving roughly `bytes` bytes of slots.
    pub fn with_bytes(bytes: usize) -> Self {
        let slots = bytes / mem::size_of::<T>().max(1);
        Self {
            items: Vec::with_capacity(slots.min(MAX_RESERVE)),
        }
    }

    /// Store `item` and return its slot.
    pub fn alloc(&mut self, item: T) -> usize {
        self.items.push(item);
        self.items.len() - 1
    }

    /// Number of allocated slots.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing was allocated yet.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// Contiguous view over a range of slots.
    pub fn slice(&self, range: Range<usize>) -> &[T] {
        debug_assert!(range.end <= self.items.len(), "pool range out of bounds");
        &self.items[range]
    }

    pub fn slice_mut(&mut self, range: Range<usize>) -> &mut [T] {
        debug_assert!(range.end <= self.items.len(), "pool range out of bounds");
        &mut self.items[range]
    }
}

impl<T: Clone> Pool<T> {
    /// Copy a range of slots to the end of the pool and return the new range.
    ///
    /// The old slots stay allocated.
    pub fn relocate(&mut self, range: Range<usize>) -> Range<usize> {
        let begin = self.items.len();
        self.items.extend_from_within(range);
        begin..self.items.len()
    }
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for Pool<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<T> IndexMut<usize> for Pool<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.items[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_returns_stable_slots() {
        let mut pool = Pool::new();
        let a = pool.alloc("a");
        let b = pool.alloc("b");
        for i in 0..1000 {
            pool.alloc(if i % 2 == 0 { "x" } else { "y" });
        }
        assert_eq!(pool[a], "a");
        assert_eq!(pool[b], "b");
        assert_eq!(pool.len(), 1002);
    }

    #[test]
    fn test_relocate_keeps_old_slots() {
        let mut pool = Pool::with_bytes(SMALL);
        for i in 0..4u32 {
            pool.alloc(i);
        }
        let moved = pool.relocate(1..3);
        assert_eq!(moved, 4..6);
        assert_eq!(pool.slice(moved), &[1, 2]);
        assert_eq!(pool.slice(0..4), &[0, 1, 2, 3]);
    }
}
