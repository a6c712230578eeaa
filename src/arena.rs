//! Slot arena owning every node of a tree.
//!
//! Nodes live in one `Vec` and refer to each other by `u32` index, so links
//! are plain integers and a rotation is a handful of index writes. Freed
//! slots are threaded onto a free list and reused by later allocations.
//!
//! Every slot carries a generation counter that is bumped whenever the slot
//! is freed. A [`Handle`] records the generation it was taken at, which lets
//! callers holding a handle across mutations detect that its node is gone
//! instead of silently reading whatever reuses the slot.

/// Node index type. u32 saves space vs usize on 64-bit.
pub(crate) type Idx = u32;

/// Null index marker: empty subtree, no parent, end of free list.
pub(crate) const NULL: Idx = Idx::MAX;

/// An index plus the generation of the slot when the index was handed out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct Handle {
    pub(crate) idx: Idx,
    pub(crate) generation: u32,
}

impl Handle {
    /// The handle of no node at all.
    pub(crate) const NONE: Handle = Handle { idx: NULL, generation: 0 };

    #[inline]
    pub(crate) fn is_none(&self) -> bool {
        self.idx == NULL
    }
}

#[derive(Debug)]
enum Entry<N> {
    Occupied(N),
    /// Next free slot, or NULL.
    Vacant(Idx),
}

#[derive(Debug)]
struct Slot<N> {
    generation: u32,
    entry: Entry<N>,
}

/// Arena of `N`s. Knows nothing about trees.
#[derive(Debug)]
pub(crate) struct Arena<N> {
    slots: Vec<Slot<N>>,
    /// Head of the free list.
    free: Idx,
    /// Number of occupied slots.
    live: usize,
}

impl<N> Arena<N> {
    pub(crate) fn new() -> Self {
        Arena {
            slots: Vec::new(),
            free: NULL,
            live: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Arena {
            slots: Vec::with_capacity(capacity),
            free: NULL,
            live: 0,
        }
    }

    /// Number of occupied slots.
    #[inline]
    pub(crate) fn live(&self) -> usize {
        self.live
    }

    /// Number of slots, occupied or not.
    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Store `node`, reusing a freed slot if there is one.
    ///
    /// Panics if the arena would need more than `u32::MAX - 1` slots.
    pub(crate) fn alloc(&mut self, node: N) -> Idx {
        if self.free != NULL {
            let idx = self.free;
            let slot = &mut self.slots[idx as usize];
            match slot.entry {
                Entry::Vacant(next) => self.free = next,
                Entry::Occupied(_) => unreachable!("free list points at an occupied slot"),
            }
            slot.entry = Entry::Occupied(node);
            self.live += 1;
            return idx;
        }

        let idx = self.slots.len();
        assert!(idx < NULL as usize, "too many nodes (max {})", NULL);
        self.slots.push(Slot {
            generation: 0,
            entry: Entry::Occupied(node),
        });
        self.live += 1;
        idx as Idx
    }

    /// Vacate slot `idx`, returning its node. The slot's generation is
    /// bumped so outstanding handles to it stop resolving.
    ///
    /// A slot whose generation reaches `u32::MAX` is retired instead of
    /// going back on the free list, so generations never wrap.
    pub(crate) fn free(&mut self, idx: Idx) -> N {
        let slot = &mut self.slots[idx as usize];
        let entry = std::mem::replace(&mut slot.entry, Entry::Vacant(NULL));
        match entry {
            Entry::Occupied(node) => {
                slot.generation += 1;
                if slot.generation != u32::MAX {
                    slot.entry = Entry::Vacant(self.free);
                    self.free = idx;
                }
                self.live -= 1;
                node
            }
            Entry::Vacant(_) => panic!("double free of arena slot {}", idx),
        }
    }

    /// Borrow an occupied slot. Panics on a vacant one: the tree only
    /// follows links it owns, so that would be a bug in the tree.
    #[inline]
    pub(crate) fn get(&self, idx: Idx) -> &N {
        match &self.slots[idx as usize].entry {
            Entry::Occupied(node) => node,
            Entry::Vacant(_) => panic!("arena slot {} is vacant", idx),
        }
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, idx: Idx) -> &mut N {
        match &mut self.slots[idx as usize].entry {
            Entry::Occupied(node) => node,
            Entry::Vacant(_) => panic!("arena slot {} is vacant", idx),
        }
    }

    /// Handle for an occupied slot.
    #[inline]
    pub(crate) fn handle(&self, idx: Idx) -> Handle {
        Handle {
            idx,
            generation: self.slots[idx as usize].generation,
        }
    }

    /// Resolve a handle back to an index, if its node still exists.
    pub(crate) fn resolve(&self, handle: Handle) -> Option<Idx> {
        let slot = self.slots.get(handle.idx as usize)?;
        match slot.entry {
            Entry::Occupied(_) if slot.generation == handle.generation => Some(handle.idx),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_and_get() {
        let mut arena = Arena::new();
        let a = arena.alloc("a");
        let b = arena.alloc("b");
        assert_eq!(*arena.get(a), "a");
        assert_eq!(*arena.get(b), "b");
        assert_eq!(arena.live(), 2);
    }

    #[test]
    fn free_reuses_slot() {
        let mut arena = Arena::new();
        let a = arena.alloc(1);
        let _b = arena.alloc(2);
        assert_eq!(arena.free(a), 1);
        assert_eq!(arena.live(), 1);

        let c = arena.alloc(3);
        assert_eq!(c, a);
        assert_eq!(arena.capacity(), 2);
        assert_eq!(*arena.get(c), 3);
    }

    #[test]
    fn free_list_is_lifo() {
        let mut arena = Arena::new();
        let ids: Vec<_> = (0..4).map(|i| arena.alloc(i)).collect();
        arena.free(ids[1]);
        arena.free(ids[3]);
        assert_eq!(arena.alloc(10), ids[3]);
        assert_eq!(arena.alloc(11), ids[1]);
        assert_eq!(arena.alloc(12), 4);
    }

    #[test]
    fn stale_handle_does_not_resolve() {
        let mut arena = Arena::new();
        let a = arena.alloc('x');
        let handle = arena.handle(a);
        assert_eq!(arena.resolve(handle), Some(a));

        arena.free(a);
        assert_eq!(arena.resolve(handle), None);

        // Same slot, new generation.
        let again = arena.alloc('y');
        assert_eq!(again, a);
        assert_eq!(arena.resolve(handle), None);
        assert_eq!(arena.resolve(arena.handle(again)), Some(a));
    }

    #[test]
    fn none_handle_never_resolves() {
        let mut arena = Arena::new();
        arena.alloc(0u8);
        assert!(Handle::NONE.is_none());
        assert_eq!(arena.resolve(Handle::NONE), None);
    }

    #[test]
    fn exhausted_slot_is_retired() {
        let mut arena = Arena::new();
        let a = arena.alloc(1);
        arena.slots[a as usize].generation = u32::MAX - 1;
        let handle = arena.handle(a);

        arena.free(a);
        assert_eq!(arena.resolve(handle), None);

        // The slot is never handed out again, so no handle can come back.
        let b = arena.alloc(2);
        assert_ne!(b, a);
        assert_eq!(arena.capacity(), 2);
        assert_eq!(arena.resolve(handle), None);
        assert_eq!(arena.live(), 1);
    }

    #[test]
    #[should_panic(expected = "double free")]
    fn double_free_panics() {
        let mut arena = Arena::new();
        let a = arena.alloc(());
        arena.free(a);
        arena.free(a);
    }
}
