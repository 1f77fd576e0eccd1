use thiserror::Error;

use crate::NodeId;

/// A structural problem found by [`RbTree::validate`](crate::RbTree::validate).
///
/// None of these can be produced through the public API of a correct tree; the
/// validator exists so tests can check the red-black rules after every mutation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("the sentinel is red")]
    SentinelNotBlack,

    #[error("the sentinel links to a real node")]
    SentinelLinked,

    #[error("the root {root:?} is red")]
    RedRoot { root: NodeId },

    #[error("the root {root:?} has a parent")]
    RootHasParent { root: NodeId },

    #[error("red node {node:?} has red child {child:?}")]
    RedChildOfRed { node: NodeId, child: NodeId },

    #[error("black height below {node:?} differs: left {left}, right {right}")]
    BlackHeightMismatch { node: NodeId, left: usize, right: usize },

    #[error("child {child:?} does not point back at its parent {parent:?}")]
    BrokenParentLink { parent: NodeId, child: NodeId },

    #[error("in-order key at position {position} is smaller than its predecessor")]
    OutOfOrder { position: usize },

    #[error("tree reports {expected} nodes but {actual} are reachable")]
    LenMismatch { expected: usize, actual: usize },
}

/// Errors returned by [`IndexedList`](crate::IndexedList) operations.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum ListError {
    #[error("index {index} is out of bounds for a list of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("value is already present in the list")]
    DuplicateValue,
}
