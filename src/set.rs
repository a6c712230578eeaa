//! The ordered set.

use std::fmt;
use std::ops::{Bound, RangeBounds};

use crate::arena::{Handle, Idx, NULL};
use crate::compare::{Compare, NaturalOrder};
use crate::cursor::{Cursor, IntoIter, Iter, Range};
use crate::error::{InvariantViolation, SetError};
use crate::rbtree::RbTree;

/// A place in an [`OrderedSet`]: an element, or the end sentinel one past
/// the largest element.
///
/// Positions are plain copyable handles with no borrow of the set, so they
/// can be kept across mutations. A position stays valid until its own
/// element is removed (by `erase`, `take`, `erase_at`, `clear` or
/// `clone_from`); after that every use of it fails with
/// [`SetError::InvalidIterator`]. Inserting or removing *other* elements
/// never invalidates it.
///
/// A position is only meaningful for the set that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position(Handle);

impl Position {
    /// The end sentinel of every set.
    pub const END: Position = Position(Handle::NONE);

    /// Returns `true` for the end sentinel.
    #[inline]
    pub fn is_end(&self) -> bool {
        return self.0.is_none();
    }
}

/// A set of distinct elements kept in sorted order by a red-black tree.
///
/// Ordering comes from `C`, a [`Compare`] strict weak ordering. It defaults
/// to [`NaturalOrder`], i.e. `T: Ord`. Elements that neither order before
/// the other are the same element as far as the set is concerned: inserting
/// a second one is a no-op.
///
/// ```
/// use rbset::OrderedSet;
///
/// let mut set: OrderedSet<i32> = [5, 3, 8, 1, 4, 7, 9].into_iter().collect();
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), [1, 3, 4, 5, 7, 8, 9]);
///
/// let seven = set.lower_bound(&6);
/// assert_eq!(set.get(seven), Ok(&7));
///
/// set.erase(&5);
/// assert_eq!(set.len(), 6);
/// assert!(!set.contains(&5));
/// ```
pub struct OrderedSet<T, C = NaturalOrder> {
    tree: RbTree<T>,
    cmp: C,
}

impl<T: Ord> OrderedSet<T> {
    /// Create an empty set ordered by `T: Ord`.
    pub fn new() -> OrderedSet<T> {
        return OrderedSet::with_comparator(NaturalOrder);
    }
}

impl<T, C> OrderedSet<T, C> {
    /// Create an empty set ordered by `cmp`.
    ///
    /// ```
    /// use rbset::OrderedSet;
    ///
    /// let mut set: OrderedSet<i32, _> = OrderedSet::with_comparator(|a: &i32, b: &i32| a > b);
    /// set.extend([1, 3, 2]);
    /// assert_eq!(set.iter().copied().collect::<Vec<_>>(), [3, 2, 1]);
    /// ```
    pub fn with_comparator(cmp: C) -> OrderedSet<T, C> {
        return OrderedSet {
            tree: RbTree::new(),
            cmp,
        };
    }

    /// The ordering this set uses.
    pub fn comparator(&self) -> &C {
        return &self.cmp;
    }

    /// Number of elements. O(1).
    #[inline]
    pub fn len(&self) -> usize {
        return self.tree.len();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        return self.tree.len() == 0;
    }

    /// Position of the smallest element, or `end()` if the set is empty.
    pub fn begin(&self) -> Position {
        return self.position(self.tree.first());
    }

    /// The end sentinel.
    #[inline]
    pub fn end(&self) -> Position {
        return Position::END;
    }

    pub fn first(&self) -> Option<&T> {
        return self.value_at(self.tree.first());
    }

    pub fn last(&self) -> Option<&T> {
        return self.value_at(self.tree.last());
    }

    /// The element at `pos`.
    ///
    /// Fails with [`SetError::InvalidIterator`] for `end()` and for
    /// positions whose element has been removed.
    pub fn get(&self, pos: Position) -> Result<&T, SetError> {
        let idx = self.resolve(pos)?;
        return Ok(self.tree.value(idx));
    }

    /// The position after `pos`; the successor of the largest element is
    /// `end()`.
    ///
    /// Fails with [`SetError::OutOfRange`] when `pos` is already `end()`.
    pub fn successor(&self, pos: Position) -> Result<Position, SetError> {
        if pos.is_end() {
            return Err(SetError::OutOfRange);
        }
        let idx = self.resolve(pos)?;
        return Ok(self.position(self.tree.successor(idx)));
    }

    /// The position before `pos`; the predecessor of `end()` is the largest
    /// element.
    ///
    /// Fails with [`SetError::OutOfRange`] when `pos` is the smallest
    /// element, or `end()` of an empty set.
    pub fn predecessor(&self, pos: Position) -> Result<Position, SetError> {
        let prev = if pos.is_end() {
            self.tree.last()
        } else {
            let idx = self.resolve(pos)?;
            self.tree.predecessor(idx)
        };
        if prev == NULL {
            return Err(SetError::OutOfRange);
        }
        return Ok(self.position(prev));
    }

    /// A cursor at the smallest element (or at the end if empty).
    pub fn cursor_front(&self) -> Cursor<'_, T, C> {
        return Cursor::new(self, self.begin());
    }

    /// A cursor at the end sentinel. Step back once to reach the largest element.
    pub fn cursor_end(&self) -> Cursor<'_, T, C> {
        return Cursor::new(self, Position::END);
    }

    /// A cursor at `pos`.
    pub fn cursor_at(&self, pos: Position) -> Result<Cursor<'_, T, C>, SetError> {
        if !pos.is_end() {
            self.resolve(pos)?;
        }
        return Ok(Cursor::new(self, pos));
    }

    /// Iterate in ascending order.
    pub fn iter(&self) -> Iter<'_, T> {
        return Iter::new(&self.tree);
    }

    /// Remove every element.
    ///
    /// Every outstanding position becomes invalid. The node storage is kept
    /// for reuse, like `Vec::clear`.
    pub fn clear(&mut self) {
        log::debug!(
            "clearing set of {} elements ({} node slots kept)",
            self.tree.len(),
            self.tree.capacity()
        );
        self.tree.clear();
    }

    // --- Position helpers ---

    #[inline]
    fn position(&self, idx: Idx) -> Position {
        return Position(self.tree.handle(idx));
    }

    #[inline]
    fn resolve(&self, pos: Position) -> Result<Idx, SetError> {
        return self.tree.resolve(pos.0).ok_or(SetError::InvalidIterator);
    }

    #[inline]
    fn value_at(&self, idx: Idx) -> Option<&T> {
        if idx == NULL {
            return None;
        }
        return Some(self.tree.value(idx));
    }
}

impl<T, C: Compare<T>> OrderedSet<T, C> {
    /// Insert `value`. Returns `false`, dropping `value`, if an equivalent
    /// element is already present.
    pub fn insert(&mut self, value: T) -> bool {
        let (_, inserted) = self.insert_position(value);
        return inserted;
    }

    /// Insert `value`, returning the position of the element that is now in
    /// the set and whether it was newly inserted.
    pub fn insert_position(&mut self, value: T) -> (Position, bool) {
        let (idx, inserted) = self.tree.insert(value, &self.cmp);
        if inserted {
            self.check_invariants();
        }
        return (self.position(idx), inserted);
    }

    /// Remove the element equivalent to `value`. Returns whether one was
    /// present.
    #[doc(alias = "remove")]
    pub fn erase(&mut self, value: &T) -> bool {
        return self.take(value).is_some();
    }

    /// Remove and return the element equivalent to `value`.
    pub fn take(&mut self, value: &T) -> Option<T> {
        let idx = self.tree.search(value, &self.cmp);
        if idx == NULL {
            return None;
        }
        let removed = self.tree.remove(idx);
        self.check_invariants();
        return Some(removed);
    }

    /// Remove the element at `pos`, returning the position of the element
    /// that followed it (or `end()`).
    pub fn erase_at(&mut self, pos: Position) -> Result<Position, SetError> {
        let idx = self.resolve(pos)?;
        // The successor's node survives the removal, so its handle does too.
        let next = self.position(self.tree.successor(idx));
        log::trace!("erasing node {} of {}", idx, self.tree.len());
        drop(self.tree.remove(idx));
        self.check_invariants();
        return Ok(next);
    }

    pub fn contains(&self, value: &T) -> bool {
        return self.tree.search(value, &self.cmp) != NULL;
    }

    /// Position of the element equivalent to `value`, or `end()`.
    pub fn find(&self, value: &T) -> Position {
        return self.position(self.tree.search(value, &self.cmp));
    }

    /// Position of the first element not less than `value`, or `end()`.
    pub fn lower_bound(&self, value: &T) -> Position {
        return self.position(self.tree.lower_bound(value, &self.cmp));
    }

    /// Position of the first element greater than `value`, or `end()`.
    pub fn upper_bound(&self, value: &T) -> Position {
        return self.position(self.tree.upper_bound(value, &self.cmp));
    }

    /// Iterate over the elements within `range`, in ascending order.
    ///
    /// A range whose start lies after its end is empty.
    ///
    /// ```
    /// use rbset::OrderedSet;
    ///
    /// let set: OrderedSet<u32> = (0..10).collect();
    /// assert_eq!(set.range(3..6).copied().collect::<Vec<_>>(), [3, 4, 5]);
    /// assert_eq!(set.range(8..).count(), 2);
    /// ```
    pub fn range<R: RangeBounds<T>>(&self, range: R) -> Range<'_, T> {
        let start = match range.start_bound() {
            Bound::Included(value) => self.tree.lower_bound(value, &self.cmp),
            Bound::Excluded(value) => self.tree.upper_bound(value, &self.cmp),
            Bound::Unbounded => self.tree.first(),
        };
        let end = match range.end_bound() {
            Bound::Included(value) => self.tree.upper_bound(value, &self.cmp),
            Bound::Excluded(value) => self.tree.lower_bound(value, &self.cmp),
            Bound::Unbounded => NULL,
        };

        let inverted = start != NULL
            && end != NULL
            && !self.cmp.less(self.tree.value(start), self.tree.value(end));
        if inverted {
            return Range::new(&self.tree, NULL, NULL);
        }
        return Range::new(&self.tree, start, end);
    }

    /// Walk the whole tree and check every red-black invariant. O(n).
    ///
    /// Only a bug in this crate (or an ordering that is not a strict weak
    /// ordering) can make this fail.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        return self.tree.validate(&self.cmp);
    }

    #[cfg(feature = "check-invariants")]
    fn check_invariants(&self) {
        if let Err(violation) = self.tree.validate(&self.cmp) {
            log::error!("red-black invariant violated: {}", violation);
            panic!("INVARIANT VIOLATED: {}", violation);
        }
    }

    #[cfg(not(feature = "check-invariants"))]
    #[inline(always)]
    fn check_invariants(&self) {}
}

impl<T, C: Default> Default for OrderedSet<T, C> {
    fn default() -> Self {
        return OrderedSet::with_comparator(C::default());
    }
}

impl<T: Clone, C: Clone> Clone for OrderedSet<T, C> {
    /// A deep copy with the same shape and colors. The two sets share
    /// nothing afterwards.
    fn clone(&self) -> Self {
        log::debug!("copying set of {} elements", self.tree.len());
        return OrderedSet {
            tree: self.tree.clone(),
            cmp: self.cmp.clone(),
        };
    }

    /// Tear down the current contents, then copy `source` into the freed
    /// storage. Positions into the old contents stay invalid.
    fn clone_from(&mut self, source: &Self) {
        log::debug!(
            "replacing set of {} elements with a copy of {}",
            self.tree.len(),
            source.tree.len()
        );
        self.tree.clear();
        self.tree.copy_from(&source.tree);
        self.cmp = source.cmp.clone();
    }
}

impl<T: fmt::Debug, C> fmt::Debug for OrderedSet<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.debug_set().entries(self.iter()).finish();
    }
}

/// Sets are equal when they hold equal elements in the same order.
/// Comparators are not compared.
impl<T: PartialEq, C> PartialEq for OrderedSet<T, C> {
    fn eq(&self, other: &Self) -> bool {
        return self.len() == other.len() && self.iter().eq(other.iter());
    }
}

impl<T: Eq, C> Eq for OrderedSet<T, C> {}

impl<T, C: Compare<T> + Default> FromIterator<T> for OrderedSet<T, C> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = OrderedSet::with_comparator(C::default());
        for value in iter {
            set.insert(value);
        }
        return set;
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for OrderedSet<T> {
    fn from(values: [T; N]) -> Self {
        return values.into_iter().collect();
    }
}

impl<T, C: Compare<T>> Extend<T> for OrderedSet<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T: Copy + 'a, C: Compare<T>> Extend<&'a T> for OrderedSet<T, C> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(*value);
        }
    }
}

impl<'a, T, C> IntoIterator for &'a OrderedSet<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        return self.iter();
    }
}

impl<T, C> IntoIterator for OrderedSet<T, C> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    /// Consume the set, yielding its elements in ascending order.
    fn into_iter(self) -> IntoIter<T> {
        return IntoIter::new(self.tree.into_sorted_vec());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::Reversed;

    fn collect<C>(set: &OrderedSet<i32, C>) -> Vec<i32> {
        return set.iter().copied().collect();
    }

    #[test]
    fn empty_set() {
        let set: OrderedSet<i32> = OrderedSet::new();
        assert_eq!(set.len(), 0);
        assert!(set.is_empty());
        assert_eq!(set.begin(), set.end());
        assert_eq!(set.first(), None);
        assert_eq!(set.last(), None);
        assert_eq!(set.find(&1), set.end());
        assert_eq!(set.lower_bound(&1), set.end());
        assert_eq!(set.predecessor(set.end()), Err(SetError::OutOfRange));
        assert_eq!(set.validate(), Ok(()));
    }

    #[test]
    fn insert_reports_duplicates() {
        let mut set = OrderedSet::new();
        assert!(set.insert(4));
        assert!(set.insert(2));
        assert!(!set.insert(4));
        assert_eq!(set.len(), 2);
        assert_eq!(collect(&set), vec![2, 4]);
    }

    #[test]
    fn insert_position_points_at_existing() {
        let mut set = OrderedSet::new();
        let (first, inserted) = set.insert_position(10);
        assert!(inserted);
        let (again, inserted) = set.insert_position(10);
        assert!(!inserted);
        assert_eq!(first, again);
        assert_eq!(set.get(again), Ok(&10));
    }

    #[test]
    fn take_returns_element() {
        let mut set = OrderedSet::from([1, 2, 3]);
        assert_eq!(set.take(&2), Some(2));
        assert_eq!(set.take(&2), None);
        assert_eq!(collect(&set), vec![1, 3]);
    }

    #[test]
    fn get_end_is_invalid() {
        let set = OrderedSet::from([1]);
        assert_eq!(set.get(set.end()), Err(SetError::InvalidIterator));
        assert_eq!(set.successor(set.end()), Err(SetError::OutOfRange));
    }

    #[test]
    fn predecessor_of_begin_is_out_of_range() {
        let set = OrderedSet::from([1, 2]);
        assert_eq!(set.predecessor(set.begin()), Err(SetError::OutOfRange));
        let last = set.predecessor(set.end()).unwrap();
        assert_eq!(set.get(last), Ok(&2));
    }

    #[test]
    fn erase_at_returns_next() {
        let mut set = OrderedSet::from([1, 2, 3]);
        let two = set.find(&2);
        let next = set.erase_at(two).unwrap();
        assert_eq!(set.get(next), Ok(&3));
        assert_eq!(set.get(two), Err(SetError::InvalidIterator));
        assert_eq!(set.erase_at(two), Err(SetError::InvalidIterator));

        let three = set.find(&3);
        assert_eq!(set.erase_at(three), Ok(set.end()));
        assert_eq!(set.erase_at(set.end()), Err(SetError::InvalidIterator));
        assert_eq!(collect(&set), vec![1]);
    }

    #[test]
    fn reversed_comparator() {
        let mut set: OrderedSet<i32, _> = OrderedSet::with_comparator(Reversed(NaturalOrder));
        set.extend([3, 1, 2]);
        assert_eq!(collect(&set), vec![3, 2, 1]);
        assert_eq!(set.get(set.lower_bound(&5)), Ok(&3));
        assert_eq!(set.get(set.lower_bound(&2)), Ok(&2));
        assert_eq!(set.validate(), Ok(()));
    }

    #[test]
    fn equivalent_elements_collapse() {
        // Ordered by length only: "bb" and "cc" are the same element.
        let mut set = OrderedSet::with_comparator(|a: &&str, b: &&str| a.len() < b.len());
        assert!(set.insert("a"));
        assert!(set.insert("bb"));
        assert!(!set.insert("cc"));
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec!["a", "bb"]);
        assert!(set.contains(&"zz"));
        assert!(set.erase(&"zz"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn range_bounds() {
        let set: OrderedSet<i32> = (0..10).map(|x| x * 10).collect();
        let got = |r: Vec<&i32>| r.into_iter().copied().collect::<Vec<_>>();

        assert_eq!(got(set.range(15..45).collect()), vec![20, 30, 40]);
        assert_eq!(got(set.range(20..=40).collect()), vec![20, 30, 40]);
        assert_eq!(
            got(set.range((Bound::Excluded(20), Bound::Included(40))).collect()),
            vec![30, 40]
        );
        assert_eq!(got(set.range(..15).collect()), vec![0, 10]);
        assert_eq!(got(set.range(85..).collect()), vec![90]);
        assert_eq!(set.range(..).count(), 10);
        assert_eq!(set.range(40..20).count(), 0);
        assert_eq!(set.range(30..30).count(), 0);
        assert_eq!(set.range(100..).count(), 0);
    }

    #[test]
    fn debug_and_eq() {
        let a = OrderedSet::from([2, 1]);
        let b = OrderedSet::from([1, 2]);
        assert_eq!(format!("{:?}", a), "{1, 2}");
        assert_eq!(a, b);
        assert_ne!(a, OrderedSet::from([1]));
    }

    #[test]
    fn into_iter_sorted() {
        let set = OrderedSet::from(["pear", "apple", "fig"]);
        let owned: Vec<&str> = set.into_iter().collect();
        assert_eq!(owned, vec!["apple", "fig", "pear"]);
    }

    #[test]
    fn clone_from_invalidates_positions() {
        let mut target = OrderedSet::from([1, 2, 3, 4]);
        let stale = target.find(&1);
        let source = OrderedSet::from([7, 8]);

        target.clone_from(&source);
        assert_eq!(collect(&target), vec![7, 8]);
        assert_eq!(target.get(stale), Err(SetError::InvalidIterator));
        assert_eq!(target.validate(), Ok(()));
    }
}
