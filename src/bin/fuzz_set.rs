//! AFL fuzz harness for OrderedSet
//!
//! Drives a set and a `BTreeSet` model with the same byte-decoded operations
//! and checks after every step that:
//! 1. Both hold the same elements in the same order
//! 2. Every red-black invariant holds (`validate`)
//! 3. Positions taken earlier still resolve to their element, unless it
//!    was removed
//!
//! Run with `cargo afl build --features afl --bin fuzz_set`.

use std::collections::BTreeSet;
use std::ops::Bound;

use afl::fuzz;
use rbset::{OrderedSet, Position, SetError};

/// Positions held across operations.
const NUM_SLOTS: usize = 4;

/// Operation types the fuzzer can generate
#[derive(Debug, Clone, Copy)]
enum FuzzOp {
    Insert { value: u8 },
    Erase { value: u8 },
    /// Remember the position of `value` (or end) in a slot
    Find { slot: u8, value: u8 },
    /// Erase through the position held in a slot
    EraseAt { slot: u8 },
    /// Query bounds and a range against the model
    Bounds { low: u8, high: u8 },
    Clear,
    /// Replace the set with a copy of itself
    CloneFrom,
}

impl FuzzOp {
    fn from_bytes(bytes: &[u8]) -> Option<(FuzzOp, &[u8])> {
        if bytes.is_empty() {
            return None;
        }

        let op_type = bytes[0] % 8;
        let rest = &bytes[1..];

        match op_type {
            // Inserts are twice as likely so sets actually grow.
            0 | 1 if !rest.is_empty() => Some((FuzzOp::Insert { value: rest[0] }, &rest[1..])),
            2 if !rest.is_empty() => Some((FuzzOp::Erase { value: rest[0] }, &rest[1..])),
            3 if rest.len() >= 2 => {
                let op = FuzzOp::Find {
                    slot: rest[0] % NUM_SLOTS as u8,
                    value: rest[1],
                };
                Some((op, &rest[2..]))
            }
            4 if !rest.is_empty() => {
                let op = FuzzOp::EraseAt {
                    slot: rest[0] % NUM_SLOTS as u8,
                };
                Some((op, &rest[1..]))
            }
            5 if rest.len() >= 2 => {
                let op = FuzzOp::Bounds {
                    low: rest[0],
                    high: rest[1],
                };
                Some((op, &rest[2..]))
            }
            6 => Some((FuzzOp::Clear, rest)),
            7 => Some((FuzzOp::CloneFrom, rest)),
            _ => None,
        }
    }
}

fn main() {
    fuzz!(|data: &[u8]| {
        let mut set: OrderedSet<u8> = OrderedSet::new();
        let mut model: BTreeSet<u8> = BTreeSet::new();
        // Each slot holds a position and the element it should resolve to.
        let mut slots: [(Position, Option<u8>); NUM_SLOTS] = [(Position::END, None); NUM_SLOTS];
        let mut remaining = data;

        while let Some((op, rest)) = FuzzOp::from_bytes(remaining) {
            remaining = rest;

            match op {
                FuzzOp::Insert { value } => {
                    assert_eq!(set.insert(value), model.insert(value));
                }

                FuzzOp::Erase { value } => {
                    assert_eq!(set.erase(&value), model.remove(&value));
                    for slot in slots.iter_mut() {
                        if slot.1 == Some(value) {
                            assert_eq!(set.get(slot.0), Err(SetError::InvalidIterator));
                            *slot = (Position::END, None);
                        }
                    }
                }

                FuzzOp::Find { slot, value } => {
                    let pos = set.find(&value);
                    assert_eq!(pos.is_end(), !model.contains(&value));
                    slots[slot as usize] = (pos, model.get(&value).copied());
                }

                FuzzOp::EraseAt { slot } => {
                    let (pos, expected) = slots[slot as usize];
                    match expected {
                        Some(value) => {
                            let next = set.erase_at(pos).expect("held position is live");
                            assert!(model.remove(&value));
                            let model_next = model.range(value..).next().copied();
                            assert_eq!(set.get(next).ok().copied(), model_next);
                            for other in slots.iter_mut() {
                                if other.1 == Some(value) {
                                    *other = (Position::END, None);
                                }
                            }
                        }
                        None => {
                            assert_eq!(set.erase_at(pos), Err(SetError::InvalidIterator));
                        }
                    }
                }

                FuzzOp::Bounds { low, high } => {
                    let lower = set.get(set.lower_bound(&low)).ok().copied();
                    assert_eq!(lower, model.range(low..).next().copied());
                    let upper = set.get(set.upper_bound(&low)).ok().copied();
                    let above = (Bound::Excluded(low), Bound::Unbounded);
                    assert_eq!(upper, model.range(above).next().copied());

                    let ours: Vec<u8> = set.range(low..=high).copied().collect();
                    let theirs: Vec<u8> = if low <= high {
                        model.range(low..=high).copied().collect()
                    } else {
                        Vec::new()
                    };
                    assert_eq!(ours, theirs);
                }

                FuzzOp::Clear => {
                    set.clear();
                    model.clear();
                    for slot in slots.iter_mut() {
                        if slot.1.is_some() {
                            assert_eq!(set.get(slot.0), Err(SetError::InvalidIterator));
                        }
                        *slot = (Position::END, None);
                    }
                }

                FuzzOp::CloneFrom => {
                    let copy = set.clone();
                    set.clone_from(&copy);
                    for slot in slots.iter_mut() {
                        *slot = (Position::END, None);
                    }
                }
            }

            // CRITICAL INVARIANT: the tree is a valid red-black tree
            if let Err(violation) = set.validate() {
                panic!("Invariant violated after {:?}: {}", op, violation);
            }
            assert_eq!(set.len(), model.len(), "Length mismatch after {:?}", op);

            for &(pos, expected) in slots.iter() {
                if let Some(value) = expected {
                    assert_eq!(set.get(pos), Ok(&value), "Position lost its element");
                }
            }
        }

        // Final contents must match the model exactly
        let ours: Vec<u8> = set.iter().copied().collect();
        let theirs: Vec<u8> = model.iter().copied().collect();
        assert_eq!(ours, theirs, "Final contents diverged");
        let backwards: Vec<u8> = set.iter().rev().copied().collect();
        assert_eq!(backwards, theirs.iter().rev().copied().collect::<Vec<_>>());
    });
}
