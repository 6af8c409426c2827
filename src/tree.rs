//! The tree engine behind [`Set`](crate::Set). Nodes live in a generational arena and refer
//! to their children by [`Index`] so the recursive insert, remove and rotation code can relink
//! subtrees without any shared ownership.
//!
//! # Examples
//!
//! ```
//! use treeset::{Error, Mode, Tree};
//!
//! let mut tree = Tree::new(Mode::Balanced);
//!
//! // Nothing in here yet.
//! assert!(!tree.find(1));
//!
//! tree.insert(1).unwrap();
//! assert!(tree.find(1));
//!
//! // Keys are unique.
//! assert_eq!(tree.insert(1), Err(Error::AlreadyPresent(1)));
//!
//! tree.remove(1).unwrap();
//! assert!(!tree.find(1));
//! assert_eq!(tree.remove(1), Err(Error::NotFound(1)));
//! ```

use std::cmp::Ordering;

use generational_arena::{Arena, Index};
use tracing::{debug, instrument};

use crate::balance::Mode;
use crate::error::{Error, Violation};

/// The type of the keys stored in a [`Tree`].
pub type Key = i32;

/// A single entry of the tree. Owned by the arena, reachable through its parent's link.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Node {
    pub(crate) key: Key,
    pub(crate) left: Option<Index>,
    pub(crate) right: Option<Index>,
    /// How many levels are in the subtree rooted at this node. A node with no children has a
    /// height of 1.
    pub(crate) height: usize,
}

impl Node {
    pub(crate) fn new(key: Key) -> Self {
        Self {
            key,
            left: None,
            right: None,
            height: 1,
        }
    }
}

/// Height of the subtree behind `link`, 0 when there is none.
pub(crate) fn height_of(nodes: &Arena<Node>, link: Option<Index>) -> usize {
    link.map_or(0, |idx| nodes[idx].height)
}

/// Adjusts the height of the node at `idx` to be the max of its children's heights + 1.
pub(crate) fn fix_height(nodes: &mut Arena<Node>, idx: Index) {
    let Node { left, right, .. } = nodes[idx];
    nodes[idx].height = height_of(nodes, left).max(height_of(nodes, right)) + 1;
}

/// The height of the left subtree minus the height of the right subtree.
pub(crate) fn balance_factor(nodes: &Arena<Node>, idx: Index) -> isize {
    let Node { left, right, .. } = nodes[idx];
    height_of(nodes, left) as isize - height_of(nodes, right) as isize
}

/// A Binary Search Tree of unique keys which, depending on its [`Mode`], keeps itself balanced
/// as an AVL tree.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Arena<Node>,
    root: Option<Index>,
    mode: Mode,
    /// `false` when the tree was built with a fixed node capacity.
    growable: bool,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new(Mode::default())
    }
}

impl Tree {
    /// Generate a new, empty `Tree`. The mode can't be changed afterwards.
    pub fn new(mode: Mode) -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            mode,
            growable: true,
        }
    }

    /// Generate a new, empty `Tree` which can hold at most `capacity` keys at once. Inserting
    /// into a full tree fails with [`Error::AllocationFailure`].
    ///
    /// # Examples
    ///
    /// ```
    /// use treeset::{Error, Mode, Tree};
    ///
    /// let mut tree = Tree::with_capacity(Mode::Balanced, 1);
    /// tree.insert(1).unwrap();
    ///
    /// assert_eq!(
    ///     tree.insert(2),
    ///     Err(Error::AllocationFailure { key: 2, capacity: 1 })
    /// );
    /// ```
    pub fn with_capacity(mode: Mode, capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
            mode,
            growable: false,
        }
    }

    /// The balancing mode this tree was created with.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Number of keys in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// `true` when the tree holds no keys.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of levels in the tree, 0 for an empty tree.
    pub fn height(&self) -> usize {
        height_of(&self.nodes, self.root)
    }

    /// Read-only view of the root node, if there is one.
    pub fn root(&self) -> Option<NodeRef<'_>> {
        self.root.map(|index| NodeRef {
            nodes: &self.nodes,
            index,
        })
    }

    /// Returns whether the key is in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use treeset::{Mode, Tree};
    ///
    /// let mut tree = Tree::new(Mode::Unbalanced);
    /// tree.insert(1).unwrap();
    ///
    /// assert!(tree.find(1));
    /// assert!(!tree.find(42));
    /// ```
    pub fn find(&self, key: Key) -> bool {
        let mut current = self.root;
        while let Some(idx) = current {
            let node = &self.nodes[idx];
            current = match key.cmp(&node.key) {
                Ordering::Less => node.left,
                Ordering::Equal => return true,
                Ordering::Greater => node.right,
            };
        }
        false
    }

    /// Inserts the key into the tree. Inserting a key that is already present changes nothing
    /// and reports [`Error::AlreadyPresent`].
    #[instrument(level = "trace", skip(self))]
    pub fn insert(&mut self, key: Key) -> Result<(), Error> {
        if self.find(key) {
            debug!(key, "insert rejected, key already present");
            return Err(Error::AlreadyPresent(key));
        }

        // The node is obtained before anything is relinked so a failure leaves the tree alone.
        let node = Node::new(key);
        let new = if self.growable {
            self.nodes.insert(node)
        } else {
            self.nodes.try_insert(node).map_err(|_| {
                debug!(key, capacity = self.nodes.capacity(), "node capacity exhausted");
                Error::AllocationFailure {
                    key,
                    capacity: self.nodes.capacity(),
                }
            })?
        };

        let root = self.link(self.root, new);
        self.root = Some(root);
        Ok(())
    }

    /// Hangs the detached node `new` into the subtree rooted at `subtree` and returns the root
    /// of the resulting subtree.
    fn link(&mut self, subtree: Option<Index>, new: Index) -> Index {
        let Some(current) = subtree else {
            return new;
        };

        let key = self.nodes[new].key;
        let Node { left, right, .. } = self.nodes[current];
        match key.cmp(&self.nodes[current].key) {
            Ordering::Less => {
                let new_left = self.link(left, new);
                self.nodes[current].left = Some(new_left);
            }
            Ordering::Greater => {
                let new_right = self.link(right, new);
                self.nodes[current].right = Some(new_right);
            }
            Ordering::Equal => unreachable!("Duplicate keys are rejected before linking"),
        }

        fix_height(&mut self.nodes, current);
        self.mode.rebalance(&mut self.nodes, current)
    }

    /// Removes the key from the tree. If the tree does not contain the key, nothing happens and
    /// [`Error::NotFound`] is reported.
    ///
    /// # Examples
    ///
    /// ```
    /// use treeset::{Error, Mode, Tree};
    ///
    /// let mut tree = Tree::new(Mode::Balanced);
    /// for key in [10, 5, 15] {
    ///     tree.insert(key).unwrap();
    /// }
    ///
    /// // 10 has two children so its successor takes its place.
    /// tree.remove(10).unwrap();
    /// assert_eq!(tree.root().map(|n| n.key()), Some(15));
    /// assert_eq!(tree.remove(10), Err(Error::NotFound(10)));
    /// ```
    #[instrument(level = "trace", skip(self))]
    pub fn remove(&mut self, key: Key) -> Result<(), Error> {
        if !self.find(key) {
            debug!(key, "remove rejected, key not found");
            return Err(Error::NotFound(key));
        }

        self.root = self.unlink(self.root, key);
        Ok(())
    }

    /// Removes `key` from the subtree rooted at `subtree` and returns the new root of that
    /// subtree, `None` if it became empty.
    fn unlink(&mut self, subtree: Option<Index>, key: Key) -> Option<Index> {
        let current = subtree?;
        let Node { left, right, .. } = self.nodes[current];

        match key.cmp(&self.nodes[current].key) {
            Ordering::Less => {
                let new_left = self.unlink(left, key);
                self.nodes[current].left = new_left;
            }
            Ordering::Greater => {
                let new_right = self.unlink(right, key);
                self.nodes[current].right = new_right;
            }
            Ordering::Equal => match (left, right) {
                // The sole child (if any) is already a well formed subtree and replaces us.
                (None, child) | (child, None) => {
                    self.nodes.remove(current);
                    return child;
                }
                (Some(_), Some(right)) => {
                    // Take over the key of our successor (the smallest key to our right) and
                    // remove the successor from the right subtree instead.
                    let successor = self.nodes[self.leftmost(right)].key;
                    self.nodes[current].key = successor;
                    let new_right = self.unlink(Some(right), successor);
                    self.nodes[current].right = new_right;
                }
            },
        }

        fix_height(&mut self.nodes, current);
        Some(self.mode.rebalance(&mut self.nodes, current))
    }

    fn leftmost(&self, mut idx: Index) -> Index {
        while let Some(left) = self.nodes[idx].left {
            idx = left;
        }
        idx
    }

    /// Iterates the keys in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use treeset::{Mode, Tree};
    ///
    /// let mut tree = Tree::new(Mode::Unbalanced);
    /// for key in [2, 3, 1] {
    ///     tree.insert(key).unwrap();
    /// }
    ///
    /// assert_eq!(tree.iter().collect::<Vec<_>>(), vec![1, 2, 3]);
    /// ```
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self)
    }

    /// Checks every invariant of the tree and returns the first one found broken:
    ///
    /// 1. keys are ordered,
    /// 2. every cached height matches the subtree,
    /// 3. in [`Mode::Balanced`], no balance factor is outside `-1..=1`,
    /// 4. every stored node is reachable from the root.
    ///
    /// Subtrees are checked left before right and children before their parent. The walk
    /// keeps its own stack, so unbalanced chains of any depth can be checked.
    pub fn validate(&self) -> Result<(), Violation> {
        let mut reachable = 0;
        let mut pending = vec![Visit::Enter {
            link: self.root,
            lower: None,
            upper: None,
        }];
        // True heights of the subtrees checked so far whose parent hasn't been.
        let mut heights: Vec<usize> = Vec::new();

        while let Some(visit) = pending.pop() {
            match visit {
                Visit::Enter { link: None, .. } => heights.push(0),
                Visit::Enter {
                    link: Some(idx),
                    lower,
                    upper,
                } => {
                    let node = self.nodes[idx];
                    reachable += 1;

                    let too_small = lower.is_some_and(|lower| node.key <= lower);
                    let too_large = upper.is_some_and(|upper| node.key >= upper);
                    if too_small || too_large {
                        return Err(Violation::Ordering { key: node.key });
                    }

                    pending.push(Visit::Exit(idx));
                    pending.push(Visit::Enter {
                        link: node.right,
                        lower: Some(node.key),
                        upper,
                    });
                    pending.push(Visit::Enter {
                        link: node.left,
                        lower,
                        upper: Some(node.key),
                    });
                }
                Visit::Exit(idx) => {
                    let right_height = heights.pop().expect("Exit => right subtree checked");
                    let left_height = heights.pop().expect("Exit => left subtree checked");
                    heights.push(self.check_node(idx, left_height, right_height)?);
                }
            }
        }

        if reachable != self.nodes.len() {
            return Err(Violation::Detached {
                reachable,
                stored: self.nodes.len(),
            });
        }
        Ok(())
    }

    /// Shorthand for `self.validate().is_ok()`.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Checks the node at `idx` against the true heights of its subtrees and returns its own.
    fn check_node(
        &self,
        idx: Index,
        left_height: usize,
        right_height: usize,
    ) -> Result<usize, Violation> {
        let node = self.nodes[idx];

        let actual = left_height.max(right_height) + 1;
        if node.height != actual {
            return Err(Violation::Height {
                key: node.key,
                cached: node.height,
                actual,
            });
        }

        let factor = left_height as isize - right_height as isize;
        if self.mode == Mode::Balanced && factor.abs() > 1 {
            return Err(Violation::Balance {
                key: node.key,
                factor,
            });
        }

        Ok(actual)
    }

    /// Releases every node, children before their parents. The tree is empty afterwards but
    /// keeps its mode.
    #[instrument(level = "trace", skip(self))]
    pub fn clear(&mut self) {
        let mut stack: Vec<(Index, bool)> =
            self.root.take().map(|r| (r, false)).into_iter().collect();
        let mut released = 0;

        while let Some((idx, expanded)) = stack.pop() {
            if expanded {
                self.nodes.remove(idx);
                released += 1;
                continue;
            }

            let Node { left, right, .. } = self.nodes[idx];
            stack.push((idx, true));
            stack.extend(right.map(|r| (r, false)));
            stack.extend(left.map(|l| (l, false)));
        }

        debug!(released, "tree cleared");
    }
}

/// A step of [`Tree::validate`].
enum Visit {
    /// Check a subtree whose keys must lie strictly between `lower` and `upper`.
    Enter {
        link: Option<Index>,
        lower: Option<Key>,
        upper: Option<Key>,
    },
    /// Both subtrees of this node are checked; check the node itself.
    Exit(Index),
}

impl<'a> IntoIterator for &'a Tree {
    type Item = Key;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A read-only handle on one node of a [`Tree`]. Any mutation of the tree invalidates it,
/// which the borrow checker enforces.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    nodes: &'a Arena<Node>,
    index: Index,
}

impl<'a> NodeRef<'a> {
    /// The key stored in this node.
    pub fn key(&self) -> Key {
        self.nodes[self.index].key
    }

    /// Number of levels in the subtree rooted here.
    pub fn height(&self) -> usize {
        self.nodes[self.index].height
    }

    /// Left subtree height minus right subtree height.
    pub fn balance_factor(&self) -> isize {
        balance_factor(self.nodes, self.index)
    }

    /// The root of the subtree holding smaller keys.
    pub fn left(&self) -> Option<NodeRef<'a>> {
        self.child(self.nodes[self.index].left)
    }

    /// The root of the subtree holding larger keys.
    pub fn right(&self) -> Option<NodeRef<'a>> {
        self.child(self.nodes[self.index].right)
    }

    fn child(&self, link: Option<Index>) -> Option<NodeRef<'a>> {
        link.map(|index| NodeRef {
            nodes: self.nodes,
            index,
        })
    }
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("key", &self.key())
            .field("height", &self.height())
            .field("left", &self.left())
            .field("right", &self.right())
            .finish()
    }
}

/// In-order iterator over the keys of a [`Tree`]. Created by [`Tree::iter`].
pub struct Iter<'a> {
    nodes: &'a Arena<Node>,
    /// Nodes whose left subtree has been (or is being) visited but which haven't been yielded.
    stack: Vec<Index>,
    remaining: usize,
}

impl<'a> Iter<'a> {
    fn new(tree: &'a Tree) -> Self {
        let mut iter = Self {
            nodes: &tree.nodes,
            stack: Vec::with_capacity(tree.height()),
            remaining: tree.len(),
        };
        iter.push_left_spine(tree.root);
        iter
    }

    fn push_left_spine(&mut self, mut link: Option<Index>) {
        while let Some(idx) = link {
            self.stack.push(idx);
            link = self.nodes[idx].left;
        }
    }
}

impl Iterator for Iter<'_> {
    type Item = Key;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.stack.pop()?;
        let node = &self.nodes[idx];
        self.push_left_spine(node.right);
        self.remaining -= 1;
        Some(node.key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

#[cfg(test)]
impl Tree {
    /// An unbalanced tree holding `0..len` where every key is the right child of the one
    /// before. Built straight into the arena so no recursive code runs on the way.
    pub(crate) fn right_chain(len: usize) -> Self {
        let mut tree = Tree::new(Mode::Unbalanced);
        for (height, key) in (0..len as Key).rev().enumerate() {
            let node = Node {
                key,
                left: None,
                right: tree.root,
                height: height + 1,
            };
            tree.root = Some(tree.nodes.insert(node));
        }
        tree
    }
}


#[cfg(test)]
mod quicktests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::test::quick::Op;

    /// Applies a set of operations to a tree and a `BTreeSet`.
    /// This way we can ensure that after a random smattering of inserts
    /// and removes we have the same set of keys in both.
    fn do_ops(ops: &[Op<Key>], tree: &mut Tree, set: &mut BTreeSet<Key>) -> bool {
        for op in ops {
            let agrees = match op {
                Op::Insert(k) => tree.insert(*k).is_ok() == set.insert(*k),
                Op::Remove(k) => tree.remove(*k).is_ok() == set.remove(k),
                Op::Iter => tree.iter().eq(set.iter().copied()),
            };
            if !agrees || !tree.is_valid() {
                return false;
            }
        }
        true
    }

    quickcheck::quickcheck! {
        fn fuzz_multiple_operations_balanced(ops: Vec<Op<Key>>) -> bool {
            let mut tree = Tree::new(Mode::Balanced);
            let mut set = BTreeSet::new();

            do_ops(&ops, &mut tree, &mut set)
                && set.iter().all(|&key| tree.find(key))
                && tree.len() == set.len()
        }
    }

    quickcheck::quickcheck! {
        fn fuzz_multiple_operations_unbalanced(ops: Vec<Op<i8>>) -> bool {
            // Small keys keep the unbalanced recursion shallow.
            let ops: Vec<Op<Key>> = ops.into_iter().map(|op| op.map(Key::from)).collect();
            let mut tree = Tree::new(Mode::Unbalanced);
            let mut set = BTreeSet::new();

            do_ops(&ops, &mut tree, &mut set)
                && set.iter().all(|&key| tree.find(key))
                && tree.len() == set.len()
        }
    }

    quickcheck::quickcheck! {
        fn balanced_height_is_logarithmic(xs: Vec<Key>) -> bool {
            let mut tree = Tree::new(Mode::Balanced);
            for x in &xs {
                let _ = tree.insert(*x);
            }

            // An AVL tree with n nodes is at most ~1.44 * lg(n + 2) high.
            let bound = 1.45 * ((tree.len() + 2) as f64).log2();
            tree.height() as f64 <= bound
        }
    }
}
