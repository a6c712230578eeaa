//! rbset - An ordered set backed by a red-black tree.
//!
//! Elements are kept sorted by a pluggable strict weak ordering, with
//! logarithmic insert, erase and lookup, and stable positions: a
//! [`Position`] keeps referring to its element until that element is
//! removed, however many other elements come and go.
//!
//! # Quick Start
//!
//! ```
//! use rbset::{OrderedSet, SetError};
//!
//! let mut set = OrderedSet::new();
//! for x in [5, 3, 8, 1, 4, 7, 9] {
//!     set.insert(x);
//! }
//!
//! // Sorted iteration
//! assert_eq!(set.iter().copied().collect::<Vec<_>>(), [1, 3, 4, 5, 7, 8, 9]);
//!
//! // Positions survive unrelated removals
//! let eight = set.find(&8);
//! set.erase(&5);
//! assert_eq!(set.get(eight), Ok(&8));
//!
//! // ...but not removal of their own element
//! set.erase(&8);
//! assert_eq!(set.get(eight), Err(SetError::InvalidIterator));
//! ```
//!
//! # Modules
//!
//! - [`compare`]: the [`Compare`] trait and stock orderings.
//! - [`cursor`]: cursors and iterators.
//! - [`error`]: [`SetError`] and [`InvariantViolation`].
//!
//! # Features
//!
//! - `check-invariants`: validate the whole tree after every mutation and
//!   panic on the first broken invariant. Slow; meant for tests and fuzzing.

mod arena;
pub mod compare;
pub mod cursor;
pub mod error;
mod rbtree;
mod set;

pub use compare::{Compare, NaturalOrder, Reversed};
pub use cursor::{Cursor, IntoIter, Iter, Range};
pub use error::{InvariantViolation, SetError};
pub use set::{OrderedSet, Position};
