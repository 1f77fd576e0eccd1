use super::RbTree;
use crate::raw::RawRbTree;

impl<K> RbTree<K> {
    /// Creates an empty tree with room for at least `capacity` nodes.
    ///
    /// # Examples
    ///
    /// ```
    /// use akakuro::RbTree;
    ///
    /// let tree: RbTree<i32> = RbTree::with_capacity(16);
    /// assert!(tree.is_empty());
    /// assert!(tree.capacity() >= 16);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        RbTree {
            raw: RawRbTree::with_capacity(capacity),
        }
    }

    /// Returns the number of nodes the tree can hold without reallocating.
    ///
    /// Slots freed by [`erase`](RbTree::erase) are reused before the arena grows.
    ///
    /// # Examples
    ///
    /// ```
    /// use akakuro::RbTree;
    ///
    /// let mut tree = RbTree::with_capacity(4);
    /// let capacity = tree.capacity();
    /// let node = tree.insert(1);
    /// tree.erase(node);
    /// tree.insert(2);
    /// assert_eq!(tree.capacity(), capacity);
    /// ```
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }
}
