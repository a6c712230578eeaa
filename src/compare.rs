//! Ordering relations.
//!
//! The set never asks whether two elements are equal. It only asks whether
//! one orders before the other, and treats two elements as equivalent when
//! neither does. Any strict weak ordering works:
//!
//! - irreflexive: `less(a, a)` is false
//! - transitive: `less(a, b) && less(b, c)` implies `less(a, c)`
//! - equivalence is transitive
//!
//! A relation that breaks these rules leaves the set in an unspecified (but
//! memory safe) state.

/// A strict weak ordering over `T`.
pub trait Compare<T: ?Sized> {
    /// Returns `true` if `a` orders strictly before `b`.
    fn less(&self, a: &T, b: &T) -> bool;

    /// Returns `true` if neither element orders before the other.
    #[inline]
    fn equivalent(&self, a: &T, b: &T) -> bool {
        return !self.less(a, b) && !self.less(b, a);
    }
}

/// The ordering given by `T: Ord`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NaturalOrder;

impl<T: Ord + ?Sized> Compare<T> for NaturalOrder {
    #[inline]
    fn less(&self, a: &T, b: &T) -> bool {
        return a < b;
    }
}

/// Flips another ordering, so the set iterates from largest to smallest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Reversed<C>(pub C);

impl<T: ?Sized, C: Compare<T>> Compare<T> for Reversed<C> {
    #[inline]
    fn less(&self, a: &T, b: &T) -> bool {
        return self.0.less(b, a);
    }
}

/// Any `Fn(&T, &T) -> bool` is an ordering, e.g. `|a, b| a.key < b.key`.
impl<T: ?Sized, F> Compare<T> for F
where
    F: Fn(&T, &T) -> bool,
{
    #[inline]
    fn less(&self, a: &T, b: &T) -> bool {
        return self(a, b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_order() {
        assert!(NaturalOrder.less(&1, &2));
        assert!(!NaturalOrder.less(&2, &1));
        assert!(!NaturalOrder.less(&2, &2));
        assert!(NaturalOrder.equivalent(&2, &2));
        assert!(NaturalOrder.less("abc", "abd"));
    }

    #[test]
    fn reversed_order() {
        let cmp = Reversed(NaturalOrder);
        assert!(cmp.less(&2, &1));
        assert!(!cmp.less(&1, &2));
        assert!(cmp.equivalent(&7, &7));
    }

    #[test]
    fn closure_order_by_key() {
        let by_len = |a: &&str, b: &&str| a.len() < b.len();
        assert!(by_len.less(&"ab", &"abc"));
        // Same length means equivalent, even though the strings differ.
        assert!(by_len.equivalent(&"ab", &"xy"));
    }
}
