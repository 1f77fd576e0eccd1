use core::borrow::Borrow;
use core::fmt;
use core::iter::FusedIterator;

use alloc::vec::Vec;

use crate::error::InvariantViolation;
use crate::raw::{Color, Dir, Handle, InOrder, RawRbTree};

mod capacity;

/// An ordered multiset of keys stored in a red-black tree.
///
/// Nodes live in an arena and are addressed by [`NodeId`]s. Every absent child, and the
/// root's parent, is a single shared black sentinel, so the balancing code never has to
/// special-case a missing node. Equal keys are allowed: a new key that compares equal to
/// existing ones is placed after them in order.
///
/// It is a logic error for a key to be modified in such a way that its ordering relative to
/// any other key changes while it is in the tree, or to pass a [`NodeId`] obtained from a
/// different tree. The behavior resulting from such a logic error is not specified, but will
/// be encapsulated to the `RbTree` that observed it and not result in undefined behavior.
///
/// # Examples
///
/// ```
/// use akakuro::RbTree;
///
/// let mut tree = RbTree::new();
/// tree.insert(20);
/// tree.insert(10);
/// let thirty = tree.insert(30);
///
/// assert_eq!(tree.len(), 3);
/// assert_eq!(tree.erase(thirty), 30);
/// assert!(tree.find(&30).is_none());
/// assert_eq!(tree.export_sorted(10), [10, 20]);
/// ```
pub struct RbTree<K> {
    raw: RawRbTree<K>,
}

/// A stable reference to one node of an [`RbTree`].
///
/// A `NodeId` stays valid until its node is erased. A later insertion may reuse the node's
/// slot, but never its id: stale ids are rejected even then.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct NodeId {
    handle: Handle,
    stamp: u64,
}

impl NodeId {
    #[inline]
    pub(crate) const fn new(handle: Handle, stamp: u64) -> Self {
        Self { handle, stamp }
    }

    #[inline]
    pub(crate) const fn handle(self) -> Handle {
        self.handle
    }

    #[inline]
    pub(crate) const fn stamp(self) -> u64 {
        self.stamp
    }
}

/// An iterator over the keys of an `RbTree`, in ascending order.
///
/// This `struct` is created by the [`iter`] method on [`RbTree`].
///
/// [`iter`]: RbTree::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K: 'a> {
    inner: InOrder<'a, K>,
}

/// An iterator over the [`NodeId`]s of an `RbTree`, in ascending key order.
///
/// This `struct` is created by the [`node_ids`] method on [`RbTree`].
///
/// [`node_ids`]: RbTree::node_ids
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct NodeIds<'a, K: 'a> {
    inner: InOrder<'a, K>,
}

impl<K> RbTree<K> {
    /// Makes a new, empty `RbTree`. Does not allocate.
    ///
    /// # Examples
    ///
    /// ```
    /// use akakuro::RbTree;
    ///
    /// let tree: RbTree<i64> = RbTree::new();
    /// assert!(tree.is_empty());
    /// assert!(tree.root().is_none());
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        RbTree { raw: RawRbTree::new() }
    }

    /// Returns the number of keys in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use akakuro::RbTree;
    ///
    /// let mut tree = RbTree::new();
    /// tree.insert(1);
    /// tree.insert(1);
    /// assert_eq!(tree.len(), 2);
    /// ```
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree contains no keys.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Removes every key, erasing the root repeatedly until the tree is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use akakuro::RbTree;
    ///
    /// let mut tree = RbTree::from([3, 1, 2]);
    /// tree.clear();
    /// assert!(tree.is_empty());
    /// assert!(tree.root().is_none());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n log n), one erase per key.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Removes the node `node` and returns its key.
    ///
    /// # Panics
    ///
    /// Panics if `node` has already been erased.
    ///
    /// # Examples
    ///
    /// ```
    /// use akakuro::RbTree;
    ///
    /// let mut tree = RbTree::new();
    /// let node = tree.insert("a");
    /// assert_eq!(tree.erase(node), "a");
    /// assert!(tree.is_empty());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn erase(&mut self, node: NodeId) -> K {
        self.raw.erase(self.resolve(node))
    }

    /// Returns `true` if `node` refers to a node currently in this tree.
    ///
    /// An erased node's id stays dead even after its slot is reused.
    ///
    /// # Examples
    ///
    /// ```
    /// use akakuro::RbTree;
    ///
    /// let mut tree = RbTree::new();
    /// let node = tree.insert(5);
    /// assert!(tree.contains_node(node));
    /// tree.erase(node);
    /// assert!(!tree.contains_node(node));
    ///
    /// let newer = tree.insert(9);
    /// assert!(tree.contains_node(newer));
    /// assert!(!tree.contains_node(node));
    /// ```
    #[must_use]
    pub fn contains_node(&self, node: NodeId) -> bool {
        self.raw.resolve(node).is_some()
    }

    /// Returns the key stored at `node`.
    ///
    /// # Panics
    ///
    /// Panics if `node` has been erased.
    #[must_use]
    pub fn key(&self, node: NodeId) -> &K {
        self.raw.key(self.resolve(node))
    }

    /// Returns the color of `node`.
    ///
    /// # Panics
    ///
    /// Panics if `node` has been erased.
    #[must_use]
    pub fn color(&self, node: NodeId) -> Color {
        self.raw.color(self.resolve(node))
    }

    /// Returns the root node, or `None` if the tree is empty.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.link(self.raw.root())
    }

    /// Returns the left child of `node`, if any.
    ///
    /// # Panics
    ///
    /// Panics if `node` has been erased.
    #[must_use]
    pub fn left(&self, node: NodeId) -> Option<NodeId> {
        self.link(self.raw.child(self.resolve(node), Dir::Left))
    }

    /// Returns the right child of `node`, if any.
    ///
    /// # Panics
    ///
    /// Panics if `node` has been erased.
    #[must_use]
    pub fn right(&self, node: NodeId) -> Option<NodeId> {
        self.link(self.raw.child(self.resolve(node), Dir::Right))
    }

    /// Returns the parent of `node`, or `None` for the root.
    ///
    /// # Panics
    ///
    /// Panics if `node` has been erased.
    ///
    /// # Examples
    ///
    /// ```
    /// use akakuro::{Color, RbTree};
    ///
    /// let mut tree = RbTree::new();
    /// let ten = tree.insert(10);
    /// let twenty = tree.insert(20);
    /// let thirty = tree.insert(30);
    ///
    /// // Ascending inserts rotate the middle key up.
    /// assert_eq!(tree.root(), Some(twenty));
    /// assert_eq!(tree.parent(ten), Some(twenty));
    /// assert_eq!(tree.parent(thirty), Some(twenty));
    /// assert_eq!(tree.parent(twenty), None);
    /// assert_eq!(tree.color(ten), Color::Red);
    /// ```
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.link(self.raw.parent(self.resolve(node)))
    }

    /// Returns the node holding the smallest key, or `None` if the tree is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use akakuro::RbTree;
    ///
    /// let tree = RbTree::from([4, 2, 9]);
    /// let min = tree.min().unwrap();
    /// assert_eq!(*tree.key(min), 2);
    /// assert!(RbTree::<i32>::new().min().is_none());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn min(&self) -> Option<NodeId> {
        self.link(self.raw.extreme(Dir::Left))
    }

    /// Returns the node holding the largest key, or `None` if the tree is empty.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn max(&self) -> Option<NodeId> {
        self.link(self.raw.extreme(Dir::Right))
    }

    /// Returns the smallest key, or `None` if the tree is empty.
    #[must_use]
    pub fn first(&self) -> Option<&K> {
        self.min().map(|node| self.key(node))
    }

    /// Returns the largest key, or `None` if the tree is empty.
    #[must_use]
    pub fn last(&self) -> Option<&K> {
        self.max().map(|node| self.key(node))
    }

    /// Returns the node that follows `node` in key order.
    ///
    /// # Panics
    ///
    /// Panics if `node` has been erased.
    ///
    /// # Examples
    ///
    /// ```
    /// use akakuro::RbTree;
    ///
    /// let mut tree = RbTree::new();
    /// let one = tree.insert(1);
    /// let three = tree.insert(3);
    /// assert_eq!(tree.successor(one), Some(three));
    /// assert_eq!(tree.successor(three), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn successor(&self, node: NodeId) -> Option<NodeId> {
        self.link(self.raw.step(self.resolve(node), Dir::Right))
    }

    /// Returns the node that precedes `node` in key order.
    ///
    /// # Panics
    ///
    /// Panics if `node` has been erased.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn predecessor(&self, node: NodeId) -> Option<NodeId> {
        self.link(self.raw.step(self.resolve(node), Dir::Left))
    }

    /// Gets an iterator over the keys in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use akakuro::RbTree;
    ///
    /// let tree = RbTree::from([3, 1, 2, 1]);
    /// let keys: Vec<_> = tree.iter().copied().collect();
    /// assert_eq!(keys, [1, 1, 2, 3]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            inner: self.raw.in_order(),
        }
    }

    /// Gets an iterator over the node ids in ascending key order.
    pub fn node_ids(&self) -> NodeIds<'_, K> {
        NodeIds {
            inner: self.raw.in_order(),
        }
    }

    /// Maps `node` to its handle.
    ///
    /// # Panics
    ///
    /// Panics if `node` has been erased.
    fn resolve(&self, node: NodeId) -> Handle {
        self.raw.resolve(node).expect("`RbTree::resolve()` - `node` has been erased!")
    }

    /// Maps the sentinel to `None`.
    fn link(&self, handle: Handle) -> Option<NodeId> {
        if handle.is_nil() { None } else { Some(self.raw.id(handle)) }
    }
}

impl<K: Clone> RbTree<K> {
    /// Returns at most `capacity` keys in ascending order.
    ///
    /// Keys beyond `capacity` are left out; a tree larger than the request is not an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use akakuro::RbTree;
    ///
    /// let tree = RbTree::from([50, 10, 40, 20, 30]);
    /// assert_eq!(tree.export_sorted(3), [10, 20, 30]);
    /// assert_eq!(tree.export_sorted(9), [10, 20, 30, 40, 50]);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n + capacity)
    #[must_use]
    pub fn export_sorted(&self, capacity: usize) -> Vec<K> {
        self.iter().take(capacity).cloned().collect()
    }

    /// Fills `out` with the smallest keys in ascending order and returns how many were written.
    ///
    /// # Examples
    ///
    /// ```
    /// use akakuro::RbTree;
    ///
    /// let tree = RbTree::from([3, 1, 2]);
    /// let mut out = [0; 2];
    /// assert_eq!(tree.export_into(&mut out), 2);
    /// assert_eq!(out, [1, 2]);
    ///
    /// let mut wide = [0; 5];
    /// assert_eq!(tree.export_into(&mut wide), 3);
    /// assert_eq!(wide, [1, 2, 3, 0, 0]);
    /// ```
    pub fn export_into(&self, out: &mut [K]) -> usize {
        let mut written = 0;
        for (slot, key) in out.iter_mut().zip(self.iter()) {
            slot.clone_from(key);
            written += 1;
        }
        written
    }
}

impl<K: Ord> RbTree<K> {
    /// Inserts `key` and returns the id of the new node.
    ///
    /// Duplicates are kept: the new node follows every existing equal key in order.
    ///
    /// # Examples
    ///
    /// ```
    /// use akakuro::RbTree;
    ///
    /// let mut tree = RbTree::new();
    /// let first = tree.insert(7);
    /// let second = tree.insert(7);
    /// assert_ne!(first, second);
    /// assert_eq!(tree.successor(first), Some(second));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, key: K) -> NodeId {
        let handle = self.raw.insert(key);
        self.raw.id(handle)
    }

    /// Returns a node whose key equals `key`, or `None` if there is none.
    ///
    /// When several equal keys are present, any one of their nodes may be returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use akakuro::RbTree;
    ///
    /// let tree = RbTree::from([1, 2, 3]);
    /// let node = tree.find(&2).unwrap();
    /// assert_eq!(*tree.key(node), 2);
    /// assert!(tree.find(&4).is_none());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn find<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.find(key).map(|handle| self.raw.id(handle))
    }

    /// Returns `true` if the tree contains a key equal to `key`.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.find(key).is_some()
    }

    /// Removes one key equal to `key` and returns it.
    ///
    /// # Examples
    ///
    /// ```
    /// use akakuro::RbTree;
    ///
    /// let mut tree = RbTree::from([1, 2, 2]);
    /// assert_eq!(tree.remove(&2), Some(2));
    /// assert_eq!(tree.remove(&2), Some(2));
    /// assert_eq!(tree.remove(&2), None);
    /// assert_eq!(tree.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove<Q>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.raw.find(key)?;
        Some(self.raw.erase(handle))
    }

    /// Checks every red-black and bookkeeping invariant.
    ///
    /// A tree only ever mutated through this API always validates; this is meant for tests.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    ///
    /// # Examples
    ///
    /// ```
    /// use akakuro::RbTree;
    ///
    /// let mut tree: RbTree<u32> = (0..100).collect();
    /// tree.remove(&42);
    /// assert_eq!(tree.validate(), Ok(()));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        self.raw.validate()
    }
}

impl<K: Clone> Clone for RbTree<K> {
    fn clone(&self) -> Self {
        RbTree { raw: self.raw.clone() }
    }
}

impl<K: fmt::Debug> fmt::Debug for RbTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K> Default for RbTree<K> {
    fn default() -> Self {
        RbTree::new()
    }
}

impl<K: PartialEq> PartialEq for RbTree<K> {
    fn eq(&self, other: &RbTree<K>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq> Eq for RbTree<K> {}

impl<K: Ord> FromIterator<K> for RbTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = RbTree::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord> Extend<K> for RbTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, K: 'a + Ord + Copy> Extend<&'a K> for RbTree<K> {
    fn extend<I: IntoIterator<Item = &'a K>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<K: Ord, const N: usize> From<[K; N]> for RbTree<K> {
    fn from(arr: [K; N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<'a, K> IntoIterator for &'a RbTree<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Iter<'a, K> {
        self.iter()
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        let handle = self.inner.next()?;
        Some(self.inner.tree().key(handle))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

impl<K> FusedIterator for Iter<'_, K> {}

impl<K> Clone for Iter<'_, K> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for Iter<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<K> Iterator for NodeIds<'_, K> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let handle = self.inner.next()?;
        Some(self.inner.tree().id(handle))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K> ExactSizeIterator for NodeIds<'_, K> {}

impl<K> FusedIterator for NodeIds<'_, K> {}

impl<K> Clone for NodeIds<'_, K> {
    fn clone(&self) -> Self {
        NodeIds {
            inner: self.inner.clone(),
        }
    }
}
