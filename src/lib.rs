//! Classic linked data structures around a rotation-balanced binary
//! search tree.
//!
//! The centerpiece is [`TreeMap`], an ordered key to value map that
//! rebalances itself opportunistically: after every insertion or removal
//! the nodes along the modified path are checked bottom-up and rotated
//! once whenever their subtree heights differ by more than one. Heights
//! are recomputed on demand rather than cached, and only single
//! rotations are applied.
//!
//! # Balance caveat
//!
//! Because the rebalancing step never applies a double rotation, this is
//! not a true AVL tree: when a node's heavy child leans the opposite way
//! (a zig-zag shape), the single rotation does not restore balance and
//! the tree can stay lopsided until later updates happen to straighten
//! it. The ordering invariant always holds and every operation stays
//! correct; only the height bound is best effort. [`TreeMap::is_balanced`]
//! reports the root's balance factor, and the regression tests pin the
//! shapes that stay tilted.
//!
//! [`LinkQueue`] and [`LinkStack`] are the linked FIFO/LIFO companions
//! the map's iterators are built on, and [`Network`] is an unrelated
//! adjacency-list graph with depth-first keyed lookup that shares only
//! the error type.

mod error;
mod graph;
mod map;
mod queue;
mod stack;

pub use error::KeyNotFound;
pub use graph::{Network, NodeId};
pub use map::{Iter, Keys, TreeMap};
pub use queue::LinkQueue;
pub use stack::LinkStack;
