//! Error types reported by the tree, the set façade and the exporter.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::tree::Key;

/// Outcome of a mutation that did not change the tree.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The key was already in the tree so nothing was inserted.
    #[error("key {0} is already present")]
    AlreadyPresent(Key),

    /// The key wasn't in the tree so nothing was removed.
    #[error("key {0} was not found")]
    NotFound(Key),

    /// No node could be obtained for the key. The tree is left as it was before the call.
    #[error("no room for key {key}: node capacity of {capacity} is exhausted")]
    AllocationFailure {
        /// The key that was being inserted.
        key: Key,
        /// The fixed number of nodes the tree can hold.
        capacity: usize,
    },
}

/// The visualization sink could not be produced. The tree itself is never affected.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The target file could not be created or truncated.
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        /// Where the export was headed.
        path: PathBuf,
        /// The underlying failure.
        source: io::Error,
    },

    /// The target file was opened but writing to it failed.
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        /// Where the export was headed.
        path: PathBuf,
        /// The underlying failure.
        source: io::Error,
    },
}

/// The first broken invariant found by [`Tree::validate`](crate::Tree::validate).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// A key sits on the wrong side of one of its ancestors.
    #[error("key {key} breaks the search tree ordering")]
    Ordering {
        /// The misplaced key.
        key: Key,
    },

    /// A node's cached height disagrees with the height of its subtree.
    #[error("node {key} caches height {cached} but its subtree is {actual} high")]
    Height {
        /// The node's key.
        key: Key,
        /// The height stored in the node.
        cached: usize,
        /// The recomputed height.
        actual: usize,
    },

    /// A balanced tree holds a node whose subtrees differ in height by more than one.
    #[error("node {key} has balance factor {factor}")]
    Balance {
        /// The node's key.
        key: Key,
        /// Left subtree height minus right subtree height.
        factor: isize,
    },

    /// Nodes are stored that the root can't reach.
    #[error("{stored} nodes are stored but only {reachable} are reachable from the root")]
    Detached {
        /// Nodes found by walking from the root.
        reachable: usize,
        /// Nodes held in storage.
        stored: usize,
    },
}
