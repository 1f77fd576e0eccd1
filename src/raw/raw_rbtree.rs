use core::borrow::Borrow;
use core::cmp::Ordering;
use core::iter::FusedIterator;

use log::{debug, trace};
use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Color, Dir, Links, Node};
use crate::NodeId;
use crate::error::InvariantViolation;

/// The core red-black tree backing `RbTree`.
///
/// Every absent child and the root's parent is [`Handle::NIL`], which resolves to the
/// tree's own `sentinel` links. Link reads therefore never need an `Option`.
#[derive(Clone)]
pub(crate) struct RawRbTree<K> {
    /// Arena owning all real nodes.
    nodes: Arena<Node<K>>,
    /// Links of the shared nil node. Always black.
    sentinel: Links,
    /// Root node, or `Handle::NIL` when empty.
    root: Handle,
    /// Number of keys in the tree.
    len: usize,
    /// Stamp handed to the next inserted node. Never reset, not even by `clear`.
    next_stamp: u64,
}

impl<K> RawRbTree<K> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            sentinel: Links::SENTINEL,
            root: Handle::NIL,
            len: 0,
            next_stamp: 0,
        }
    }

    /// Creates a new tree with room for `capacity` nodes.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            sentinel: Links::SENTINEL,
            root: Handle::NIL,
            len: 0,
            next_stamp: 0,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) const fn root(&self) -> Handle {
        self.root
    }

    /// Public id of the live node at `handle`.
    pub(crate) fn id(&self, handle: Handle) -> NodeId {
        NodeId::new(handle, self.nodes.get(handle).stamp())
    }

    /// Maps `id` back to its handle, or `None` once its node has been erased, even if the
    /// slot now holds a newer node.
    pub(crate) fn resolve(&self, id: NodeId) -> Option<Handle> {
        let handle = id.handle();
        (self.nodes.contains(handle) && self.nodes.get(handle).stamp() == id.stamp()).then_some(handle)
    }

    #[inline]
    fn links(&self, handle: Handle) -> &Links {
        if handle.is_nil() {
            &self.sentinel
        } else {
            self.nodes.get(handle).links()
        }
    }

    #[inline]
    fn links_mut(&mut self, handle: Handle) -> &mut Links {
        if handle.is_nil() {
            &mut self.sentinel
        } else {
            self.nodes.get_mut(handle).links_mut()
        }
    }

    #[inline]
    pub(crate) fn parent(&self, handle: Handle) -> Handle {
        self.links(handle).parent()
    }

    #[inline]
    pub(crate) fn child(&self, handle: Handle, dir: Dir) -> Handle {
        self.links(handle).child(dir)
    }

    #[inline]
    pub(crate) fn color(&self, handle: Handle) -> Color {
        self.links(handle).color()
    }

    #[inline]
    fn is_red(&self, handle: Handle) -> bool {
        self.color(handle) == Color::Red
    }

    #[inline]
    fn is_black(&self, handle: Handle) -> bool {
        self.color(handle) == Color::Black
    }

    #[inline]
    fn set_color(&mut self, handle: Handle, color: Color) {
        self.links_mut(handle).set_color(color);
    }

    /// Returns the key stored at a real node.
    #[inline]
    pub(crate) fn key(&self, handle: Handle) -> &K {
        self.nodes.get(handle).key()
    }

    /// Side of its parent that `handle` hangs on.
    ///
    /// A nil `handle` is reported as a left child when the parent's left link is nil,
    /// which is the only reading delete-fixup needs: the deficient side's sibling is never nil.
    fn dir_of(&self, handle: Handle) -> Dir {
        if self.child(self.parent(handle), Dir::Left) == handle {
            Dir::Left
        } else {
            Dir::Right
        }
    }

    /// Follows `dir` links from `handle` as far as they go.
    pub(crate) fn edge(&self, mut handle: Handle, dir: Dir) -> Handle {
        loop {
            let next = self.child(handle, dir);
            if next.is_nil() {
                return handle;
            }
            handle = next;
        }
    }

    /// Smallest (`Dir::Left`) or largest (`Dir::Right`) node, or nil when empty.
    pub(crate) fn extreme(&self, dir: Dir) -> Handle {
        if self.root.is_nil() {
            Handle::NIL
        } else {
            self.edge(self.root, dir)
        }
    }

    /// In-order neighbour of `handle`: the successor for `Dir::Right`, the predecessor
    /// for `Dir::Left`. Nil when `handle` is the last node in that direction.
    pub(crate) fn step(&self, mut handle: Handle, dir: Dir) -> Handle {
        let child = self.child(handle, dir);
        if !child.is_nil() {
            return self.edge(child, dir.flip());
        }

        let mut parent = self.parent(handle);
        while !parent.is_nil() && self.child(parent, dir) == handle {
            handle = parent;
            parent = self.parent(handle);
        }
        parent
    }

    /// Puts the subtree rooted at `v` where the subtree rooted at `u` was.
    ///
    /// Only the parent side is rewired; `v.parent` is written even when `v` is the sentinel.
    fn transplant(&mut self, u: Handle, v: Handle) {
        let parent = self.parent(u);
        if parent.is_nil() {
            self.root = v;
        } else {
            let side = self.dir_of(u);
            self.links_mut(parent).set_child(side, v);
        }
        self.links_mut(v).set_parent(parent);
    }

    /// Moves `x` down in direction `dir`, promoting its opposite child.
    ///
    /// `rotate(x, Dir::Left)` is the classic left rotation.
    fn rotate(&mut self, x: Handle, dir: Dir) {
        let y = self.child(x, dir.flip());
        debug_assert!(!y.is_nil(), "`RawRbTree::rotate()` - no child to promote!");

        let inner = self.child(y, dir);
        self.links_mut(x).set_child(dir.flip(), inner);
        if !inner.is_nil() {
            self.links_mut(inner).set_parent(x);
        }

        self.transplant(x, y);
        self.links_mut(y).set_child(dir, x);
        self.links_mut(x).set_parent(y);
    }

    /// Unlinks `z`, rebalances and returns its key.
    pub(crate) fn erase(&mut self, z: Handle) -> K {
        let mut removed_color = self.color(z);
        let x;

        if self.child(z, Dir::Left).is_nil() {
            x = self.child(z, Dir::Right);
            self.transplant(z, x);
        } else if self.child(z, Dir::Right).is_nil() {
            x = self.child(z, Dir::Left);
            self.transplant(z, x);
        } else {
            // Two children: the in-order successor takes z's place and color.
            let y = self.edge(self.child(z, Dir::Right), Dir::Left);
            removed_color = self.color(y);
            x = self.child(y, Dir::Right);

            if self.parent(y) == z {
                self.links_mut(x).set_parent(y);
            } else {
                self.transplant(y, x);
                let right = self.child(z, Dir::Right);
                self.links_mut(y).set_child(Dir::Right, right);
                self.links_mut(right).set_parent(y);
            }

            self.transplant(z, y);
            let left = self.child(z, Dir::Left);
            self.links_mut(y).set_child(Dir::Left, left);
            self.links_mut(left).set_parent(y);
            let color = self.color(z);
            self.set_color(y, color);
        }

        if removed_color == Color::Black {
            self.erase_fixup(x);
        }

        self.sentinel.set_parent(Handle::NIL);
        self.len -= 1;
        self.nodes.take(z).into_key()
    }

    /// Resolves the double-black defect left at `x` by removing a black node.
    fn erase_fixup(&mut self, mut x: Handle) {
        while x != self.root && self.is_black(x) {
            let parent = self.parent(x);
            let side = self.dir_of(x);
            let far = side.flip();
            let mut sibling = self.child(parent, far);

            if self.is_red(sibling) {
                trace!("erase fixup at {x:?}: red sibling {sibling:?}, rotating {parent:?}");
                self.set_color(sibling, Color::Black);
                self.set_color(parent, Color::Red);
                self.rotate(parent, side);
                sibling = self.child(parent, far);
            }

            if self.is_black(self.child(sibling, side)) && self.is_black(self.child(sibling, far)) {
                trace!("erase fixup at {x:?}: black nephews, moving defect to {parent:?}");
                self.set_color(sibling, Color::Red);
                x = parent;
                continue;
            }

            if self.is_black(self.child(sibling, far)) {
                trace!("erase fixup at {x:?}: red near nephew, rotating {sibling:?}");
                let near = self.child(sibling, side);
                self.set_color(near, Color::Black);
                self.set_color(sibling, Color::Red);
                self.rotate(sibling, far);
                sibling = self.child(parent, far);
            }

            trace!("erase fixup at {x:?}: red far nephew, rotating {parent:?}");
            let parent_color = self.color(parent);
            self.set_color(sibling, parent_color);
            self.set_color(parent, Color::Black);
            let far_nephew = self.child(sibling, far);
            self.set_color(far_nephew, Color::Black);
            self.rotate(parent, side);
            x = self.root;
        }

        self.set_color(x, Color::Black);
    }

    /// Removes every node by erasing the root until the tree is empty.
    pub(crate) fn clear(&mut self) {
        debug!("clearing tree of {} nodes", self.len);
        while !self.root.is_nil() {
            let root = self.root;
            self.erase(root);
        }
        self.nodes.clear();
        self.sentinel = Links::SENTINEL;
    }

    /// Walks the tree in order with an explicit stack.
    pub(crate) fn in_order(&self) -> InOrder<'_, K> {
        InOrder::new(self)
    }
}

impl<K: Ord> RawRbTree<K> {
    /// Inserts `key` and returns the handle of the new node.
    ///
    /// Keys equal to an existing key descend right, so they follow it in order.
    pub(crate) fn insert(&mut self, key: K) -> Handle {
        let mut parent = Handle::NIL;
        let mut side = Dir::Left;
        let mut current = self.root;

        while !current.is_nil() {
            parent = current;
            side = if key < *self.key(current) { Dir::Left } else { Dir::Right };
            current = self.child(current, side);
        }

        let z = self.nodes.alloc(Node::new(key, parent, self.next_stamp));
        self.next_stamp += 1;
        if parent.is_nil() {
            self.root = z;
        } else {
            self.links_mut(parent).set_child(side, z);
        }
        self.len += 1;

        self.insert_fixup(z);
        z
    }

    /// Restores the red-black rules after `z` was linked in red.
    fn insert_fixup(&mut self, mut z: Handle) {
        while self.is_red(self.parent(z)) {
            // A red parent is never the root, so the grandparent is real.
            let parent = self.parent(z);
            let grandparent = self.parent(parent);
            let side = self.dir_of(parent);
            let uncle = self.child(grandparent, side.flip());

            if self.is_red(uncle) {
                trace!("insert fixup at {z:?}: red uncle {uncle:?}, recoloring {grandparent:?}");
                self.set_color(parent, Color::Black);
                self.set_color(uncle, Color::Black);
                self.set_color(grandparent, Color::Red);
                z = grandparent;
                continue;
            }

            if self.dir_of(z) != side {
                trace!("insert fixup at {z:?}: inner grandchild, rotating {parent:?}");
                z = parent;
                self.rotate(z, side);
            }

            trace!("insert fixup at {z:?}: outer grandchild, rotating {grandparent:?}");
            let parent = self.parent(z);
            self.set_color(parent, Color::Black);
            self.set_color(grandparent, Color::Red);
            self.rotate(grandparent, side.flip());
        }

        let root = self.root;
        self.set_color(root, Color::Black);
    }

    /// Finds a node whose key equals `key`. Any one of several duplicates may be returned.
    pub(crate) fn find<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        while !current.is_nil() {
            current = match self.key(current).borrow().cmp(key) {
                Ordering::Greater => self.child(current, Dir::Left),
                Ordering::Less => self.child(current, Dir::Right),
                Ordering::Equal => return Some(current),
            };
        }
        None
    }

    /// Checks every structural invariant, reporting the first violation found.
    pub(crate) fn validate(&self) -> Result<(), InvariantViolation> {
        if self.sentinel.color() != Color::Black {
            return Err(InvariantViolation::SentinelNotBlack);
        }
        if self.sentinel != Links::SENTINEL {
            return Err(InvariantViolation::SentinelLinked);
        }

        if !self.root.is_nil() {
            let root = self.id(self.root);
            if self.is_red(self.root) {
                return Err(InvariantViolation::RedRoot { root });
            }
            if !self.parent(self.root).is_nil() {
                return Err(InvariantViolation::RootHasParent { root });
            }
        }

        let mut reachable = 0;
        self.validate_subtree(self.root, &mut reachable)?;
        for actual in [reachable, self.nodes.len()] {
            if actual != self.len {
                return Err(InvariantViolation::LenMismatch {
                    expected: self.len,
                    actual,
                });
            }
        }

        let mut keys = self.in_order().map(|handle| self.key(handle));
        if let Some(mut previous) = keys.next() {
            for (offset, key) in keys.enumerate() {
                if key < previous {
                    return Err(InvariantViolation::OutOfOrder { position: offset + 1 });
                }
                previous = key;
            }
        }

        Ok(())
    }

    /// Returns the number of black nodes on every path from `node` down to the sentinel.
    fn validate_subtree(&self, node: Handle, reachable: &mut usize) -> Result<usize, InvariantViolation> {
        if node.is_nil() {
            return Ok(0);
        }

        // A child-link cycle would otherwise recurse forever.
        *reachable += 1;
        if *reachable > self.nodes.len() {
            return Err(InvariantViolation::LenMismatch {
                expected: self.len,
                actual: *reachable,
            });
        }

        let id = self.id(node);
        for dir in [Dir::Left, Dir::Right] {
            let child = self.child(node, dir);
            if child.is_nil() {
                continue;
            }
            let child_id = self.id(child);
            if self.parent(child) != node {
                return Err(InvariantViolation::BrokenParentLink {
                    parent: id,
                    child: child_id,
                });
            }
            if self.is_red(node) && self.is_red(child) {
                return Err(InvariantViolation::RedChildOfRed { node: id, child: child_id });
            }
        }

        let left = self.validate_subtree(self.child(node, Dir::Left), reachable)?;
        let right = self.validate_subtree(self.child(node, Dir::Right), reachable)?;
        if left != right {
            return Err(InvariantViolation::BlackHeightMismatch { node: id, left, right });
        }
        Ok(left + usize::from(self.is_black(node)))
    }
}

/// In-order walk over node handles, driven by an explicit stack of pending ancestors.
pub(crate) struct InOrder<'a, K> {
    tree: &'a RawRbTree<K>,
    stack: SmallVec<[Handle; 32]>,
    remaining: usize,
}

impl<'a, K> InOrder<'a, K> {
    fn new(tree: &'a RawRbTree<K>) -> Self {
        let mut walk = Self {
            tree,
            stack: SmallVec::new(),
            remaining: tree.len,
        };
        walk.push_left_spine(tree.root);
        walk
    }

    fn push_left_spine(&mut self, mut handle: Handle) {
        while !handle.is_nil() {
            self.stack.push(handle);
            handle = self.tree.child(handle, Dir::Left);
        }
    }

    pub(crate) fn tree(&self) -> &'a RawRbTree<K> {
        self.tree
    }
}

impl<K> Iterator for InOrder<'_, K> {
    type Item = Handle;

    fn next(&mut self) -> Option<Handle> {
        let handle = self.stack.pop()?;
        self.push_left_spine(self.tree.child(handle, Dir::Right));
        self.remaining -= 1;
        Some(handle)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for InOrder<'_, K> {}

impl<K> FusedIterator for InOrder<'_, K> {}

impl<K> Clone for InOrder<'_, K> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}
