//! Red-black tree engine.
//!
//! Nodes live in an [`Arena`] and link to each other by index. The tree
//! itself is comparator-agnostic: operations that descend take the ordering
//! as an argument, so the same engine serves every `OrderedSet<T, C>`.
//!
//! # Invariants
//!
//! 1. In-order traversal is strictly increasing under the ordering.
//! 2. Every node is red or black; `NULL` children count as black.
//! 3. The root is black.
//! 4. A red node has no red child.
//! 5. Every path from a node down to a `NULL` crosses the same number of
//!    black nodes.
//! 6. Parent and child links agree.
//!
//! Together these bound the height by `2 * log2(n + 1)`.
//!
//! Erasure never moves a value between nodes. A node with two children is
//! swapped structurally with its in-order successor, so handles to every
//! other element keep pointing at the same element.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::arena::{Arena, Handle, Idx, NULL};
use crate::compare::Compare;
use crate::error::InvariantViolation;

/// Inline capacity of traversal stacks. A tree addressable by `u32` indices
/// is at most 64 levels deep, so these never spill to the heap.
const STACK_INLINE: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Color {
    Red,
    Black,
}

/// Which child of its parent a node is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    fn flip(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

#[derive(Debug)]
pub(crate) struct Node<T> {
    value: T,
    left: Idx,
    right: Idx,
    parent: Idx,
    color: Color,
}

impl<T> Node<T> {
    fn new(value: T, color: Color) -> Self {
        Node {
            value,
            left: NULL,
            right: NULL,
            parent: NULL,
            color,
        }
    }

    #[inline]
    fn child(&self, side: Side) -> Idx {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    fn set_child(&mut self, side: Side, child: Idx) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }
}

#[derive(Debug)]
pub(crate) struct RbTree<T> {
    arena: Arena<Node<T>>,
    root: Idx,
    len: usize,
}

impl<T> RbTree<T> {
    pub(crate) fn new() -> Self {
        RbTree {
            arena: Arena::new(),
            root: NULL,
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Node slots held, occupied or free.
    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    // --- Node access helpers ---

    #[inline]
    fn node(&self, idx: Idx) -> &Node<T> {
        self.arena.get(idx)
    }

    #[inline]
    fn node_mut(&mut self, idx: Idx) -> &mut Node<T> {
        self.arena.get_mut(idx)
    }

    #[inline]
    pub(crate) fn value(&self, idx: Idx) -> &T {
        &self.node(idx).value
    }

    #[inline]
    fn parent(&self, idx: Idx) -> Idx {
        self.node(idx).parent
    }

    #[inline]
    fn child(&self, idx: Idx, side: Side) -> Idx {
        self.node(idx).child(side)
    }

    /// Color of `idx`, with `NULL` counting as black.
    #[inline]
    fn color(&self, idx: Idx) -> Color {
        if idx == NULL {
            Color::Black
        } else {
            self.node(idx).color
        }
    }

    #[inline]
    fn is_red(&self, idx: Idx) -> bool {
        self.color(idx) == Color::Red
    }

    #[inline]
    fn set_color(&mut self, idx: Idx, color: Color) {
        self.node_mut(idx).color = color;
    }

    #[inline]
    fn set_parent(&mut self, idx: Idx, parent: Idx) {
        if idx != NULL {
            self.node_mut(idx).parent = parent;
        }
    }

    /// Which child of its parent `idx` is. `idx` must not be the root.
    #[inline]
    fn side_of(&self, idx: Idx) -> Side {
        let parent = self.parent(idx);
        debug_assert!(parent != NULL, "side_of called on the root");
        if self.node(parent).left == idx {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// Point whichever link referred to `old` (a child link of `parent`, or
    /// the root when `parent` is `NULL`) at `new` instead.
    fn replace_child(&mut self, parent: Idx, old: Idx, new: Idx) {
        if parent == NULL {
            self.root = new;
            return;
        }
        let node = self.node_mut(parent);
        if node.left == old {
            node.left = new;
        } else {
            debug_assert!(node.right == old, "{} is not a child of {}", old, parent);
            node.right = new;
        }
    }

    // --- Handles ---

    #[inline]
    pub(crate) fn handle(&self, idx: Idx) -> Handle {
        if idx == NULL {
            Handle::NONE
        } else {
            self.arena.handle(idx)
        }
    }

    #[inline]
    pub(crate) fn resolve(&self, handle: Handle) -> Option<Idx> {
        self.arena.resolve(handle)
    }

    // --- Navigation ---

    pub(crate) fn minimum(&self, mut idx: Idx) -> Idx {
        while self.node(idx).left != NULL {
            idx = self.node(idx).left;
        }
        idx
    }

    pub(crate) fn maximum(&self, mut idx: Idx) -> Idx {
        while self.node(idx).right != NULL {
            idx = self.node(idx).right;
        }
        idx
    }

    /// Smallest element, or `NULL` when empty.
    pub(crate) fn first(&self) -> Idx {
        if self.root == NULL { NULL } else { self.minimum(self.root) }
    }

    /// Largest element, or `NULL` when empty.
    pub(crate) fn last(&self) -> Idx {
        if self.root == NULL { NULL } else { self.maximum(self.root) }
    }

    /// Next node in order, or `NULL` after the maximum.
    pub(crate) fn successor(&self, idx: Idx) -> Idx {
        self.step(idx, Side::Right)
    }

    /// Previous node in order, or `NULL` before the minimum.
    pub(crate) fn predecessor(&self, idx: Idx) -> Idx {
        self.step(idx, Side::Left)
    }

    /// One in-order step toward `side`: descend to the nearest node of the
    /// `side` subtree, or climb until we arrive from the opposite side.
    fn step(&self, mut idx: Idx, side: Side) -> Idx {
        let down = self.child(idx, side);
        if down != NULL {
            return match side {
                Side::Right => self.minimum(down),
                Side::Left => self.maximum(down),
            };
        }

        let mut parent = self.parent(idx);
        while parent != NULL && self.child(parent, side) == idx {
            idx = parent;
            parent = self.parent(idx);
        }
        parent
    }

    // --- Search ---

    /// Node equivalent to `value`, or `NULL`.
    pub(crate) fn search<C: Compare<T>>(&self, value: &T, cmp: &C) -> Idx {
        let mut idx = self.root;
        while idx != NULL {
            let node = self.node(idx);
            if cmp.less(value, &node.value) {
                idx = node.left;
            } else if cmp.less(&node.value, value) {
                idx = node.right;
            } else {
                return idx;
            }
        }
        NULL
    }

    /// First node not less than `value`, or `NULL`.
    ///
    /// The candidate is the last node at which the descent turned left,
    /// which is the smallest node seen that is not less than `value`.
    pub(crate) fn lower_bound<C: Compare<T>>(&self, value: &T, cmp: &C) -> Idx {
        let mut idx = self.root;
        let mut candidate = NULL;
        while idx != NULL {
            let node = self.node(idx);
            if cmp.less(&node.value, value) {
                idx = node.right;
            } else {
                candidate = idx;
                idx = node.left;
            }
        }
        candidate
    }

    /// First node greater than `value`, or `NULL`.
    pub(crate) fn upper_bound<C: Compare<T>>(&self, value: &T, cmp: &C) -> Idx {
        let mut idx = self.root;
        let mut candidate = NULL;
        while idx != NULL {
            let node = self.node(idx);
            if cmp.less(value, &node.value) {
                candidate = idx;
                idx = node.left;
            } else {
                idx = node.right;
            }
        }
        candidate
    }

    // --- Rotations ---

    /// Promote the right child of `x` into its place.
    pub(crate) fn rotate_left(&mut self, x: Idx) {
        self.relink_rotation(x, Side::Left);
    }

    /// Promote the left child of `x` into its place.
    pub(crate) fn rotate_right(&mut self, x: Idx) {
        self.relink_rotation(x, Side::Right);
    }

    /// Rotate `x` down toward `side`.
    #[inline]
    fn rotate(&mut self, x: Idx, side: Side) {
        match side {
            Side::Left => self.rotate_left(x),
            Side::Right => self.rotate_right(x),
        }
    }

    /// Move `x` down toward `side`; its child on the other side rises.
    ///
    /// ```text
    ///   rotate(x, Left):
    ///
    ///       x                y
    ///      / \              / \
    ///     a   y     =>     x   c
    ///        / \          / \
    ///       b   c        a   b
    /// ```
    fn relink_rotation(&mut self, x: Idx, side: Side) {
        let y = self.child(x, side.flip());
        debug_assert!(y != NULL, "rotating {} without a child to promote", x);
        let inner = self.child(y, side);
        let parent = self.parent(x);

        self.node_mut(x).set_child(side.flip(), inner);
        self.set_parent(inner, x);

        self.node_mut(y).parent = parent;
        self.replace_child(parent, x, y);

        self.node_mut(y).set_child(side, x);
        self.node_mut(x).parent = y;
    }

    // --- Insertion ---

    /// Insert `value` unless an equivalent element is present.
    ///
    /// Returns the node holding the element and whether it was inserted.
    /// On a duplicate the new value is dropped and the tree is untouched.
    pub(crate) fn insert<C: Compare<T>>(&mut self, value: T, cmp: &C) -> (Idx, bool) {
        if self.root == NULL {
            let idx = self.arena.alloc(Node::new(value, Color::Black));
            self.root = idx;
            self.len = 1;
            return (idx, true);
        }

        let mut idx = self.root;
        loop {
            let node = self.node(idx);
            let side = if cmp.less(&value, &node.value) {
                Side::Left
            } else if cmp.less(&node.value, &value) {
                Side::Right
            } else {
                return (idx, false);
            };

            let next = node.child(side);
            if next != NULL {
                idx = next;
                continue;
            }

            let mut leaf = Node::new(value, Color::Red);
            leaf.parent = idx;
            let new_idx = self.arena.alloc(leaf);
            self.node_mut(idx).set_child(side, new_idx);
            self.len += 1;
            self.insert_fixup(new_idx);
            return (new_idx, true);
        }
    }

    /// Restore invariants 3 and 4 after attaching red node `z`.
    fn insert_fixup(&mut self, mut z: Idx) {
        loop {
            let parent = self.parent(z);
            if parent == NULL || !self.is_red(parent) {
                break;
            }
            // A red parent is never the root, so the grandparent exists.
            let grandparent = self.parent(parent);
            let parent_side = self.side_of(parent);
            let uncle = self.child(grandparent, parent_side.flip());

            if self.is_red(uncle) {
                // Red uncle: push the blackness down from the grandparent.
                self.set_color(parent, Color::Black);
                self.set_color(uncle, Color::Black);
                self.set_color(grandparent, Color::Red);
                z = grandparent;
                continue;
            }

            if self.side_of(z) != parent_side {
                // Inner grandchild: straighten the line first.
                z = parent;
                self.rotate(z, parent_side);
            }

            let parent = self.parent(z);
            let grandparent = self.parent(parent);
            self.set_color(parent, Color::Black);
            self.set_color(grandparent, Color::Red);
            self.rotate(grandparent, parent_side.flip());
        }

        let root = self.root;
        self.set_color(root, Color::Black);
    }

    // --- Removal ---

    /// Unlink node `z`, free it and return its value.
    pub(crate) fn remove(&mut self, z: Idx) -> T {
        if self.node(z).left != NULL && self.node(z).right != NULL {
            let successor = self.minimum(self.node(z).right);
            self.swap_positions(z, successor);
        }

        let node = self.node(z);
        let child = if node.left != NULL { node.left } else { node.right };

        if child == NULL {
            if z == self.root {
                self.root = NULL;
            } else {
                // Fix up while z still holds its place; the sibling
                // analysis needs it linked.
                if self.color(z) == Color::Black {
                    self.delete_fixup(z);
                }
                let parent = self.parent(z);
                self.replace_child(parent, z, NULL);
            }
        } else {
            let parent = self.parent(z);
            self.replace_child(parent, z, child);
            self.node_mut(child).parent = parent;
            if self.color(z) == Color::Black {
                self.delete_fixup(child);
            }
        }

        self.len -= 1;
        self.arena.free(z).value
    }

    /// Exchange the tree positions (links and colors) of `a` and its
    /// in-order successor `b`. Values stay in their nodes.
    fn swap_positions(&mut self, a: Idx, b: Idx) {
        debug_assert!(self.node(b).left == NULL, "successor has a left child");

        let (a_parent, a_left, a_right, a_color) = {
            let n = self.node(a);
            (n.parent, n.left, n.right, n.color)
        };
        let (b_parent, b_left, b_right, b_color) = {
            let n = self.node(b);
            (n.parent, n.left, n.right, n.color)
        };

        // `b` may be `a`'s own right child; links between the two swap too.
        let swap = |idx: Idx| {
            if idx == a {
                b
            } else if idx == b {
                a
            } else {
                idx
            }
        };

        self.replace_child(a_parent, a, b);
        if b_parent != a {
            self.replace_child(b_parent, b, a);
        }

        {
            let n = self.node_mut(a);
            n.parent = swap(b_parent);
            n.left = swap(b_left);
            n.right = swap(b_right);
            n.color = b_color;
        }
        {
            let n = self.node_mut(b);
            n.parent = a_parent;
            n.left = swap(a_left);
            n.right = swap(a_right);
            n.color = a_color;
        }

        for (owner, side) in [(a, Side::Left), (a, Side::Right), (b, Side::Left), (b, Side::Right)] {
            let child = self.child(owner, side);
            self.set_parent(child, owner);
        }
    }

    /// Restore invariant 5 when the subtree at `x` is one black short.
    fn delete_fixup(&mut self, mut x: Idx) {
        while x != self.root && self.color(x) == Color::Black {
            let parent = self.parent(x);
            let side = self.side_of(x);
            let sibling = self.child(parent, side.flip());
            debug_assert!(sibling != NULL, "black node {} has no sibling", x);

            if self.is_red(sibling) {
                // Red sibling: rotate it above the parent, then retry.
                self.set_color(sibling, Color::Black);
                self.set_color(parent, Color::Red);
                self.rotate(parent, side);
                continue;
            }

            let near = self.child(sibling, side);
            let far = self.child(sibling, side.flip());

            if !self.is_red(near) && !self.is_red(far) {
                self.set_color(sibling, Color::Red);
                if self.is_red(parent) {
                    self.set_color(parent, Color::Black);
                    x = self.root;
                } else {
                    x = parent;
                }
                continue;
            }

            if !self.is_red(far) {
                // Near nephew red: turn it into the far case.
                self.set_color(near, Color::Black);
                self.set_color(sibling, Color::Red);
                self.rotate(sibling, side.flip());
                continue;
            }

            let parent_color = self.color(parent);
            self.set_color(far, Color::Black);
            self.set_color(sibling, parent_color);
            self.set_color(parent, Color::Black);
            self.rotate(parent, side);
            x = self.root;
        }

        let root = self.root;
        self.set_color(root, Color::Black);
        self.set_color(x, Color::Black);
    }

    // --- Whole-tree operations ---

    /// Free every node, children before parents.
    pub(crate) fn clear(&mut self) {
        let mut stack: SmallVec<[Idx; STACK_INLINE]> = SmallVec::new();
        if self.root != NULL {
            stack.push(self.root);
        }

        while let Some(&top) = stack.last() {
            let node = self.node_mut(top);
            if node.left != NULL {
                let left = std::mem::replace(&mut node.left, NULL);
                stack.push(left);
            } else if node.right != NULL {
                let right = std::mem::replace(&mut node.right, NULL);
                stack.push(right);
            } else {
                stack.pop();
                drop(self.arena.free(top));
            }
        }

        self.root = NULL;
        self.len = 0;
    }

    /// Node indices in ascending order.
    pub(crate) fn in_order(&self) -> Vec<Idx> {
        let mut order = Vec::with_capacity(self.len);
        let mut idx = self.first();
        while idx != NULL {
            order.push(idx);
            idx = self.successor(idx);
        }
        order
    }

    /// Move every value out in ascending order.
    pub(crate) fn into_sorted_vec(mut self) -> Vec<T> {
        // Collect first: successor() climbs through ancestors, which must
        // still be allocated.
        let order = self.in_order();
        let mut values = Vec::with_capacity(order.len());
        for idx in order {
            values.push(self.arena.free(idx).value);
        }
        values
    }

    /// Check every invariant with one walk over the tree.
    pub(crate) fn validate<C: Compare<T>>(&self, cmp: &C) -> Result<(), InvariantViolation> {
        if self.root == NULL {
            if self.len != 0 {
                return Err(InvariantViolation::Length { expected: self.len, found: 0 });
            }
            if self.arena.live() != 0 {
                return Err(InvariantViolation::Unreachable { live: self.arena.live(), reachable: 0 });
            }
            return Ok(());
        }

        if self.parent(self.root) != NULL {
            return Err(InvariantViolation::RootHasParent);
        }
        if self.is_red(self.root) {
            return Err(InvariantViolation::RedRoot);
        }

        let mut visited: FxHashSet<Idx> = FxHashSet::default();
        let mut black_height: Option<usize> = None;
        let mut stack: SmallVec<[(Idx, usize); STACK_INLINE]> = SmallVec::new();
        stack.push((self.root, 0));

        while let Some((idx, blacks_above)) = stack.pop() {
            if !visited.insert(idx) {
                return Err(InvariantViolation::Unreachable {
                    live: self.arena.live(),
                    reachable: visited.len(),
                });
            }

            let node = self.node(idx);
            let blacks = blacks_above + (node.color == Color::Black) as usize;

            for child in [node.left, node.right] {
                if child == NULL {
                    match black_height {
                        None => black_height = Some(blacks),
                        Some(expected) if expected != blacks => {
                            return Err(InvariantViolation::BlackHeight { expected, found: blacks });
                        }
                        Some(_) => {}
                    }
                    continue;
                }
                if self.parent(child) != idx {
                    return Err(InvariantViolation::ParentLink);
                }
                if node.color == Color::Red && self.is_red(child) {
                    return Err(InvariantViolation::RedRed);
                }
                stack.push((child, blacks));
            }
        }

        if visited.len() != self.len {
            return Err(InvariantViolation::Length { expected: self.len, found: visited.len() });
        }
        if self.arena.live() != visited.len() {
            return Err(InvariantViolation::Unreachable {
                live: self.arena.live(),
                reachable: visited.len(),
            });
        }

        let mut prev = self.first();
        let mut idx = self.successor(prev);
        while idx != NULL {
            if !cmp.less(self.value(prev), self.value(idx)) {
                return Err(InvariantViolation::Order);
            }
            prev = idx;
            idx = self.successor(idx);
        }

        Ok(())
    }
}

impl<T: Clone> RbTree<T> {
    /// Copy every node of `source` into this empty tree, keeping shape and
    /// colors. Slots freed earlier are reused, so handles into this tree's
    /// previous contents stay stale.
    pub(crate) fn copy_from(&mut self, source: &RbTree<T>) {
        debug_assert!(self.root == NULL, "copy_from into a non-empty tree");
        if source.root == NULL {
            return;
        }

        let top = source.node(source.root);
        let root = self.arena.alloc(Node::new(top.value.clone(), top.color));

        // (source node, copied parent, side of the parent it hangs from)
        let mut stack: SmallVec<[(Idx, Idx, Side); STACK_INLINE]> = SmallVec::new();
        if top.right != NULL {
            stack.push((top.right, root, Side::Right));
        }
        if top.left != NULL {
            stack.push((top.left, root, Side::Left));
        }

        while let Some((idx, copy_parent, side)) = stack.pop() {
            let node = source.node(idx);
            let mut copy = Node::new(node.value.clone(), node.color);
            copy.parent = copy_parent;
            let copy_idx = self.arena.alloc(copy);
            self.node_mut(copy_parent).set_child(side, copy_idx);

            if node.right != NULL {
                stack.push((node.right, copy_idx, Side::Right));
            }
            if node.left != NULL {
                stack.push((node.left, copy_idx, Side::Left));
            }
        }

        self.root = root;
        self.len = source.len;
    }
}

impl<T: Clone> Clone for RbTree<T> {
    /// The copy is compact: its arena has no free slots.
    fn clone(&self) -> Self {
        let mut tree = RbTree {
            arena: Arena::with_capacity(self.len),
            root: NULL,
            len: 0,
        };
        tree.copy_from(self);
        tree
    }
}
