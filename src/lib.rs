//! This crate exposes an ordered set of integers backed by a Binary Search Tree (BST)
//! which can optionally balance itself as an AVL tree.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree stores its keys in `Node`s. Every `Node` has up to two
//! children and the whole structure obeys two invariants:
//!
//! 1. For every `Node` in a BST, all the `Node`s in its left subtree have a
//!    key less than its own key.
//! 2. For every `Node` in a BST, all the `Node`s in its right subtree have a
//!    key greater than its own key.
//!
//! Searching, inserting and removing take `O(height)`. Without any balancing,
//! inserting keys in sorted order degenerates the tree into a chain and `height`
//! becomes `N`. In [`Mode::Balanced`] the tree rotates nodes after every mutation
//! so that the heights of any node's subtrees differ by at most one, which keeps
//! `height` in `O(lg N)`.
//!
//! ## Layout
//!
//! - [`tree`] is the engine: nodes stored in an arena, recursive insert and
//!   remove, in-order iteration, invariant validation.
//! - [`balance`] holds the single place where the [`Mode`] decides whether a
//!   subtree gets rotated.
//! - [`set`] is the thin ordered-set API most callers want.
//! - [`dot`] renders a tree as a Graphviz document for debugging.
//! - [`command`] drives a set from a line-oriented command stream.
//!
//! # Examples
//!
//! ```
//! use treeset::{Mode, Set};
//!
//! let mut set = Set::new(Mode::Balanced);
//! for key in [5, 3, 8] {
//!     set.insert(key).unwrap();
//! }
//!
//! assert!(set.contains(3));
//! assert!(set.insert(3).is_err());
//! assert_eq!(set.iter().collect::<Vec<_>>(), vec![3, 5, 8]);
//! ```

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

pub mod balance;
pub mod command;
pub mod dot;
pub mod error;
pub mod set;
pub mod tree;


pub use balance::Mode;
pub use error::{Error, ExportError, Violation};
pub use set::Set;
pub use tree::{Key, Tree};
