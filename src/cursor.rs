//! Cursors and iterators over an [`OrderedSet`].
//!
//! # Types
//!
//! - [`Cursor`]: a movable position borrowed from a set, for bidirectional
//!   walks that report running off either end as an error.
//! - [`Iter`]: ascending iteration over every element; double-ended.
//! - [`Range`]: ascending iteration over the elements within bounds.
//! - [`IntoIter`]: owning ascending iteration, from `OrderedSet::into_iter`.

use std::fmt;
use std::iter::FusedIterator;

use crate::arena::{Idx, NULL};
use crate::error::SetError;
use crate::rbtree::RbTree;
use crate::set::{OrderedSet, Position};

/// A position together with the set it belongs to.
///
/// Moving a cursor off either end fails with [`SetError::OutOfRange`] and
/// leaves the cursor where it was.
///
/// ```
/// use rbset::{OrderedSet, SetError};
///
/// let set = OrderedSet::from([10, 20]);
/// let mut cursor = set.cursor_front();
/// assert_eq!(cursor.get(), Ok(&10));
/// cursor.move_next().unwrap();
/// cursor.move_next().unwrap();
/// assert!(cursor.is_end());
/// assert_eq!(cursor.move_next(), Err(SetError::OutOfRange));
/// cursor.move_prev().unwrap();
/// assert_eq!(cursor.get(), Ok(&20));
/// ```
pub struct Cursor<'a, T, C> {
    set: &'a OrderedSet<T, C>,
    pos: Position,
}

impl<'a, T, C> Cursor<'a, T, C> {
    pub(crate) fn new(set: &'a OrderedSet<T, C>, pos: Position) -> Self {
        Cursor { set, pos }
    }

    /// The position the cursor is at, usable with the set after the cursor
    /// is gone.
    #[inline]
    pub fn position(&self) -> Position {
        self.pos
    }

    #[inline]
    pub fn is_end(&self) -> bool {
        self.pos.is_end()
    }

    /// The element under the cursor. Fails at the end.
    pub fn get(&self) -> Result<&'a T, SetError> {
        self.set.get(self.pos)
    }

    /// Step to the next larger element, or to the end from the largest.
    pub fn move_next(&mut self) -> Result<(), SetError> {
        self.pos = self.set.successor(self.pos)?;
        Ok(())
    }

    /// Step to the next smaller element, or to the largest from the end.
    pub fn move_prev(&mut self) -> Result<(), SetError> {
        self.pos = self.set.predecessor(self.pos)?;
        Ok(())
    }
}

impl<T, C> Clone for Cursor<'_, T, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, C> Copy for Cursor<'_, T, C> {}

impl<T, C> PartialEq for Cursor<'_, T, C> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.set, other.set) && self.pos == other.pos
    }
}

impl<T, C> Eq for Cursor<'_, T, C> {}

impl<T: fmt::Debug, C> fmt::Debug for Cursor<'_, T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("position", &self.pos)
            .field("element", &self.get().ok())
            .finish()
    }
}

// --- Iter ---

/// Ascending iterator over `&T`, created by [`OrderedSet::iter`].
pub struct Iter<'a, T> {
    tree: &'a RbTree<T>,
    /// Next node from the front.
    front: Idx,
    /// Next node from the back.
    back: Idx,
    /// Elements not yet yielded from either end. The two ends meet when it
    /// hits zero.
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(tree: &'a RbTree<T>) -> Self {
        Iter {
            tree,
            front: tree.first(),
            back: tree.last(),
            remaining: tree.len(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let idx = self.front;
        self.front = self.tree.successor(idx);
        self.remaining -= 1;
        Some(self.tree.value(idx))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let idx = self.back;
        self.back = self.tree.predecessor(idx);
        self.remaining -= 1;
        Some(self.tree.value(idx))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

// --- Range ---

/// Ascending iterator over the elements within bounds, created by
/// [`OrderedSet::range`].
pub struct Range<'a, T> {
    tree: &'a RbTree<T>,
    front: Idx,
    /// First node past the range, or NULL to run to the end.
    end: Idx,
}

impl<'a, T> Range<'a, T> {
    pub(crate) fn new(tree: &'a RbTree<T>, front: Idx, end: Idx) -> Self {
        Range { tree, front, end }
    }
}

impl<'a, T> Iterator for Range<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.front == self.end || self.front == NULL {
            self.front = NULL;
            self.end = NULL;
            return None;
        }
        let idx = self.front;
        self.front = self.tree.successor(idx);
        Some(self.tree.value(idx))
    }
}

impl<T> FusedIterator for Range<'_, T> {}

impl<T> Clone for Range<'_, T> {
    fn clone(&self) -> Self {
        Range {
            tree: self.tree,
            front: self.front,
            end: self.end,
        }
    }
}

// --- IntoIter ---

/// Owning ascending iterator, created by `OrderedSet::into_iter`.
#[derive(Debug, Clone)]
pub struct IntoIter<T> {
    inner: std::vec::IntoIter<T>,
}

impl<T> IntoIter<T> {
    pub(crate) fn new(sorted: Vec<T>) -> Self {
        IntoIter {
            inner: sorted.into_iter(),
        }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

#[cfg(test)]
mod tests {
    use crate::error::SetError;
    use crate::set::OrderedSet;

    #[test]
    fn cursor_walks_both_ways() {
        let set = OrderedSet::from([3, 1, 2]);
        let mut cursor = set.cursor_front();
        let mut seen = Vec::new();
        while !cursor.is_end() {
            seen.push(*cursor.get().unwrap());
            cursor.move_next().unwrap();
        }
        assert_eq!(seen, vec![1, 2, 3]);

        seen.clear();
        while cursor.move_prev().is_ok() {
            seen.push(*cursor.get().unwrap());
        }
        assert_eq!(seen, vec![3, 2, 1]);
        assert_eq!(cursor.get(), Ok(&1));
    }

    #[test]
    fn cursor_errors_leave_position() {
        let set = OrderedSet::from([5]);
        let mut cursor = set.cursor_front();
        assert_eq!(cursor.move_prev(), Err(SetError::OutOfRange));
        assert_eq!(cursor.get(), Ok(&5));

        cursor.move_next().unwrap();
        assert_eq!(cursor.get(), Err(SetError::InvalidIterator));
        assert_eq!(cursor.move_next(), Err(SetError::OutOfRange));
        assert!(cursor.is_end());
    }

    #[test]
    fn cursor_on_empty_set() {
        let set: OrderedSet<u8> = OrderedSet::new();
        let mut cursor = set.cursor_end();
        assert!(cursor.is_end());
        assert_eq!(cursor.move_prev(), Err(SetError::OutOfRange));
        assert_eq!(cursor, set.cursor_front());
    }

    #[test]
    fn cursor_at_stale_position() {
        let mut set = OrderedSet::from([1, 2]);
        let pos = set.find(&2);
        assert_eq!(set.cursor_at(pos).unwrap().get(), Ok(&2));
        set.erase(&2);
        assert_eq!(set.cursor_at(pos).err(), Some(SetError::InvalidIterator));
        assert!(set.cursor_at(set.end()).unwrap().is_end());
    }

    #[test]
    fn iter_double_ended() {
        let set: OrderedSet<i32> = (1..=6).collect();
        let mut iter = set.iter();
        assert_eq!(iter.len(), 6);
        assert_eq!(iter.next(), Some(&1));
        assert_eq!(iter.next_back(), Some(&6));
        assert_eq!(iter.next(), Some(&2));
        assert_eq!(iter.next_back(), Some(&5));
        assert_eq!(iter.len(), 2);
        assert_eq!(iter.next(), Some(&3));
        assert_eq!(iter.next(), Some(&4));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn iter_rev() {
        let set = OrderedSet::from(['b', 'c', 'a']);
        let rev: String = set.iter().rev().collect();
        assert_eq!(rev, "cba");
        assert_eq!(format!("{:?}", set.iter()), "['a', 'b', 'c']");
    }

    #[test]
    fn range_is_fused() {
        let set: OrderedSet<i32> = (0..5).collect();
        let mut range = set.range(3..);
        assert_eq!(range.next(), Some(&3));
        assert_eq!(range.next(), Some(&4));
        assert_eq!(range.next(), None);
        assert_eq!(range.next(), None);
    }

    #[test]
    fn into_iter_both_ends() {
        let set = OrderedSet::from([String::from("b"), String::from("a"), String::from("c")]);
        let mut owned = set.into_iter();
        assert_eq!(owned.len(), 3);
        assert_eq!(owned.next_back().as_deref(), Some("c"));
        assert_eq!(owned.next().as_deref(), Some("a"));
    }
}
