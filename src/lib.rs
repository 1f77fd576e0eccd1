//! Arena-backed red-black tree for Rust.
//!
//! This crate provides [`RbTree`], an ordered multiset kept balanced by the classic
//! red-black rules, and [`IndexedList`], a small positional list used alongside it.
//!
//! - [`insert`](RbTree::insert) returns a [`NodeId`] for the new node
//! - [`erase`](RbTree::erase) removes a node by id and hands back its key
//! - [`find`](RbTree::find), [`min`](RbTree::min) and [`max`](RbTree::max) locate nodes
//! - [`export_sorted`](RbTree::export_sorted) copies out a bounded, sorted prefix
//!
//! # Example
//!
//! ```
//! use akakuro::{Color, RbTree};
//!
//! let mut tree = RbTree::new();
//! for key in [10, 20, 30] {
//!     tree.insert(key);
//! }
//!
//! let root = tree.root().unwrap();
//! assert_eq!(*tree.key(root), 20);
//! assert_eq!(tree.color(root), Color::Black);
//!
//! let twenty = tree.find(&20).unwrap();
//! assert_eq!(tree.erase(twenty), 20);
//! assert_eq!(tree.export_sorted(8), [10, 30]);
//! assert_eq!(tree.validate(), Ok(()));
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Sentinel links** - Absent children point at one shared black nil node
//! - **Stable node ids** - Nodes live in an arena; ids survive unrelated mutations
//!
//! # Implementation
//!
//! Nodes are stored in a slot arena and linked by `NonZero` handles. The top handle value is
//! reserved for the sentinel, whose links live inside the tree, so every link read is valid
//! without an `Option`. Mirrored rebalancing cases are written once against a direction.
//! Rebalancing steps are reported through the [`log`] facade at `trace` level.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod indexed_list;
mod raw;
mod rb_tree;

pub use error::{InvariantViolation, ListError};
pub use indexed_list::IndexedList;
pub use raw::Color;
pub use rb_tree::{Iter, NodeId, NodeIds, RbTree};
