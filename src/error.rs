//! Error types.
//!
//! Lookups never fail: a missing element is reported as the end position.
//! The only runtime errors are misuse of positions, and the findings of
//! [`OrderedSet::validate`](crate::OrderedSet::validate).

use std::fmt;

/// Error returned when a position cannot be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetError {
    /// The position is the end sentinel and was dereferenced, or the element
    /// it referred to has been removed.
    InvalidIterator,
    /// The position was advanced past the end, or moved back from the
    /// smallest element.
    OutOfRange,
}

impl fmt::Display for SetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetError::InvalidIterator => {
                write!(f, "position does not refer to an element of this set")
            }
            SetError::OutOfRange => write!(f, "position moved outside of the set"),
        }
    }
}

impl std::error::Error for SetError {}

/// A broken red-black invariant found by a full tree walk.
///
/// Seeing one of these means the tree code has a bug; no sequence of public
/// operations is supposed to produce it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvariantViolation {
    /// The root node is red.
    RedRoot,
    /// The root node has a parent link.
    RootHasParent,
    /// A red node has a red child.
    RedRed,
    /// Two paths from the root to an empty subtree cross a different number
    /// of black nodes.
    BlackHeight { expected: usize, found: usize },
    /// A child does not point back at its parent.
    ParentLink,
    /// In-order traversal is not strictly increasing.
    Order,
    /// The stored element count disagrees with the nodes reachable from the root.
    Length { expected: usize, found: usize },
    /// A live node is not reachable from the root, or is reachable twice.
    Unreachable { live: usize, reachable: usize },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantViolation::RedRoot => write!(f, "root is red"),
            InvariantViolation::RootHasParent => write!(f, "root has a parent"),
            InvariantViolation::RedRed => write!(f, "red node has a red child"),
            InvariantViolation::BlackHeight { expected, found } => {
                write!(f, "black height {} on one path, {} on another", expected, found)
            }
            InvariantViolation::ParentLink => write!(f, "child does not link back to its parent"),
            InvariantViolation::Order => write!(f, "elements are not in strictly increasing order"),
            InvariantViolation::Length { expected, found } => {
                write!(f, "len() is {} but the tree holds {} nodes", expected, found)
            }
            InvariantViolation::Unreachable { live, reachable } => {
                write!(f, "{} live nodes but {} reachable from the root", live, reachable)
            }
        }
    }
}

impl std::error::Error for InvariantViolation {}
