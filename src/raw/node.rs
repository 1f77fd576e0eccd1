use super::handle::Handle;

/// The color of a red-black tree node.
///
/// # Examples
///
/// ```
/// use akakuro::{Color, RbTree};
///
/// let mut tree = RbTree::new();
/// let root = tree.insert(1);
/// assert_eq!(tree.color(root), Color::Black);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Color {
    Red,
    Black,
}

/// Which side of a parent a child hangs on. Mirrored fixup cases are written once
/// against a `Dir` and its [`flip`](Dir::flip).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Dir {
    Left = 0,
    Right = 1,
}

impl Dir {
    #[inline]
    pub(crate) const fn flip(self) -> Self {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }

    #[inline]
    const fn index(self) -> usize {
        self as usize
    }
}

/// Structural part of a node: color plus parent and child links.
///
/// The sentinel is a bare `Links` owned by the tree, so it never carries a key.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Links {
    parent: Handle,
    children: [Handle; 2],
    color: Color,
}

impl Links {
    pub(crate) const SENTINEL: Self = Self {
        parent: Handle::NIL,
        children: [Handle::NIL, Handle::NIL],
        color: Color::Black,
    };

    /// Links of a freshly inserted node: red, no children.
    const fn red_leaf(parent: Handle) -> Self {
        Self {
            parent,
            children: [Handle::NIL, Handle::NIL],
            color: Color::Red,
        }
    }

    #[inline]
    pub(crate) const fn parent(&self) -> Handle {
        self.parent
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: Handle) {
        self.parent = parent;
    }

    #[inline]
    pub(crate) const fn child(&self, dir: Dir) -> Handle {
        self.children[dir.index()]
    }

    #[inline]
    pub(crate) fn set_child(&mut self, dir: Dir, child: Handle) {
        self.children[dir.index()] = child;
    }

    #[inline]
    pub(crate) const fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub(crate) fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

/// A real tree node. Only the arena owns these.
#[derive(Clone, Debug)]
pub(crate) struct Node<K> {
    links: Links,
    /// Insertion number, unique within one tree. Tells a reused slot from its old tenant.
    stamp: u64,
    key: K,
}

impl<K> Node<K> {
    pub(crate) const fn new(key: K, parent: Handle, stamp: u64) -> Self {
        Self {
            links: Links::red_leaf(parent),
            stamp,
            key,
        }
    }

    #[inline]
    pub(crate) const fn stamp(&self) -> u64 {
        self.stamp
    }

    #[inline]
    pub(crate) const fn key(&self) -> &K {
        &self.key
    }

    pub(crate) fn into_key(self) -> K {
        self.key
    }

    #[inline]
    pub(crate) const fn links(&self) -> &Links {
        &self.links
    }

    #[inline]
    pub(crate) fn links_mut(&mut self) -> &mut Links {
        &mut self.links
    }
}
