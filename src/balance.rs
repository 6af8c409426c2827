//! The balancing policy of a [`Tree`](crate::Tree). The [`Mode`] is picked when the tree is
//! created and is consulted in exactly one place: [`Mode::rebalance`], which the tree calls on
//! every node whose subtree may have changed on the way back up from an insert or a remove.

use generational_arena::{Arena, Index};
use tracing::trace;

use crate::tree::{balance_factor, fix_height, Node};

/// Whether a tree rebalances itself after each mutation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Self-balancing AVL tree: every node's balance factor stays within `-1..=1`.
    #[default]
    Balanced,
    /// Plain Binary Search Tree: nodes stay where they were inserted.
    Unbalanced,
}

impl Mode {
    /// Restores the balance of the subtree rooted at `root` (whose height must already be up
    /// to date) and returns the index of the node now at the top of that subtree.
    pub(crate) fn rebalance(self, nodes: &mut Arena<Node>, root: Index) -> Index {
        match self {
            Self::Unbalanced => root,
            Self::Balanced => rebalance_avl(nodes, root),
        }
    }
}

/// See <https://en.wikipedia.org/wiki/AVL_tree#Rebalancing> for terminology.
fn rebalance_avl(nodes: &mut Arena<Node>, root: Index) -> Index {
    match balance_factor(nodes, root) {
        factor if factor > 1 => {
            let left = nodes[root].left.expect("Left heavy => left child");
            // Left-right case: lift the left child's right subtree first.
            if balance_factor(nodes, left) < 0 {
                let new_left = rotate_left(nodes, left);
                nodes[root].left = Some(new_left);
            }
            rotate_right(nodes, root)
        }
        factor if factor < -1 => {
            let right = nodes[root].right.expect("Right heavy => right child");
            // Right-left case.
            if balance_factor(nodes, right) > 0 {
                let new_right = rotate_right(nodes, right);
                nodes[root].right = Some(new_right);
            }
            rotate_left(nodes, root)
        }
        _ => root,
    }
}

/// Rotate `old_root` to the right. This moves the left child up vertically and `old_root` down
/// vertically. Used to rebalance the tree when the left child is too tall.
///
/// ## Panics
///
/// When called on a node without a left child.
///
/// # Diagram
///
/// ```text
///      old_root             new_root
///       /     \              /     \
///   new_root   z   rotate ->  x   old_root
///    /   \                         /   \
///   x     y                       y     z
/// ```
pub(crate) fn rotate_right(nodes: &mut Arena<Node>, old_root: Index) -> Index {
    let new_root = nodes[old_root].left.expect("Rotate right => left child");
    let moved = nodes[new_root].right;

    nodes[old_root].left = moved;
    fix_height(nodes, old_root);

    nodes[new_root].right = Some(old_root);
    fix_height(nodes, new_root);

    trace!(
        from = nodes[old_root].key,
        to = nodes[new_root].key,
        "rotated right"
    );
    new_root
}

/// Mirror image of [`rotate_right`]: the right child moves up and `old_root` becomes its left
/// child.
///
/// ## Panics
///
/// When called on a node without a right child.
pub(crate) fn rotate_left(nodes: &mut Arena<Node>, old_root: Index) -> Index {
    let new_root = nodes[old_root].right.expect("Rotate left => right child");
    let moved = nodes[new_root].left;

    nodes[old_root].right = moved;
    fix_height(nodes, old_root);

    nodes[new_root].left = Some(old_root);
    fix_height(nodes, new_root);

    trace!(
        from = nodes[old_root].key,
        to = nodes[new_root].key,
        "rotated left"
    );
    new_root
}
