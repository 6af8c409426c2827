//! An ordered set of integers. This is a thin layer over [`Tree`] which most callers should
//! prefer: it only exposes set semantics and hides the node structure.
//!
//! # Examples
//!
//! ```
//! use treeset::{Error, Mode, Set};
//!
//! let mut set = Set::new(Mode::Balanced);
//! set.insert(2).unwrap();
//! set.insert(1).unwrap();
//!
//! assert_eq!(set.insert(2), Err(Error::AlreadyPresent(2)));
//! assert!(set.contains(1));
//!
//! let mut out = Vec::new();
//! set.print_to(&mut out).unwrap();
//! assert_eq!(out, b"1\n2\n");
//!
//! assert!(set.verify());
//! set.teardown();
//! ```

use std::io::{self, Write};
use std::path::Path;

use tracing::debug;

use crate::balance::Mode;
use crate::dot;
use crate::error::{Error, ExportError};
use crate::tree::{Iter, Key, Tree};

/// A set of unique [`Key`]s kept in ascending order.
#[derive(Debug, Clone, Default)]
pub struct Set {
    tree: Tree,
}

impl Set {
    /// Creates an empty set. The mode is fixed for the lifetime of the set.
    pub fn new(mode: Mode) -> Self {
        Self {
            tree: Tree::new(mode),
        }
    }

    /// Creates an empty set that can hold at most `capacity` keys at once.
    pub fn with_capacity(mode: Mode, capacity: usize) -> Self {
        Self {
            tree: Tree::with_capacity(mode, capacity),
        }
    }

    /// Adds `key` to the set. Fails with [`Error::AlreadyPresent`] if it is already a member.
    pub fn insert(&mut self, key: Key) -> Result<(), Error> {
        self.tree.insert(key)
    }

    /// Returns whether `key` is a member of the set.
    pub fn contains(&self, key: Key) -> bool {
        self.tree.find(key)
    }

    /// Takes `key` out of the set. Fails with [`Error::NotFound`] if it wasn't a member.
    pub fn remove(&mut self, key: Key) -> Result<(), Error> {
        self.tree.remove(key)
    }

    /// Writes every key to standard output, one per line, in ascending order.
    pub fn print(&self) -> io::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.print_to(&mut out)
    }

    /// Writes every key to `out`, one per line, in ascending order.
    pub fn print_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for key in self.iter() {
            writeln!(out, "{key}")?;
        }
        Ok(())
    }

    /// Checks the structure backing the set. Returns `false` if any ordering, height or (for
    /// balanced sets) balance invariant is broken; see [`Tree::validate`] for the details.
    pub fn verify(&self) -> bool {
        match self.tree.validate() {
            Ok(()) => true,
            Err(violation) => {
                debug!(%violation, "set failed verification");
                false
            }
        }
    }

    /// The keys in ascending order.
    pub fn iter(&self) -> Iter<'_> {
        self.tree.iter()
    }

    /// Number of keys in the set.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// `true` when the set has no members.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Height of the tree backing the set.
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// The balancing mode the set was created with.
    pub fn mode(&self) -> Mode {
        self.tree.mode()
    }

    /// Read-only access to the tree backing the set.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Writes a Graphviz rendering of the tree backing the set to `path`. See [`dot`].
    pub fn export_dot(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        dot::export_dot(&self.tree, path)
    }

    /// Inserts every key from `iter`, skipping the ones that are already present.
    ///
    /// Stops at the first key that can't be stored and returns its error. Keys inserted
    /// before it stay in the set; keys after it are never read.
    ///
    /// ```
    /// use treeset::{Error, Mode, Set};
    ///
    /// let mut set = Set::with_capacity(Mode::Balanced, 1);
    /// assert_eq!(
    ///     set.try_extend([1, 1, 2]),
    ///     Err(Error::AllocationFailure { key: 2, capacity: 1 })
    /// );
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn try_extend<I: IntoIterator<Item = Key>>(&mut self, iter: I) -> Result<(), Error> {
        for key in iter {
            match self.insert(key) {
                Ok(()) | Err(Error::AlreadyPresent(_)) => {}
                Err(error) => {
                    debug!(%error, "stopped extending set");
                    return Err(error);
                }
            }
        }
        Ok(())
    }

    /// Releases every node and then the set itself.
    pub fn teardown(mut self) {
        debug!(len = self.len(), mode = ?self.mode(), "tearing down set");
        self.tree.clear();
    }
}

/// Collects keys into a balanced set, skipping duplicates.
impl FromIterator<Key> for Set {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        let mut set = Set::new(Mode::Balanced);
        set.extend(iter);
        set
    }
}

/// Inserts every key, skipping the ones that are already present.
///
/// # Panics
///
/// Panics if the set runs out of room, which only happens to sets made with
/// [`Set::with_capacity`]. Use [`Set::try_extend`] to get the error instead.
impl Extend<Key> for Set {
    fn extend<I: IntoIterator<Item = Key>>(&mut self, iter: I) {
        if let Err(error) = self.try_extend(iter) {
            panic!("failed to extend set: {error}");
        }
    }
}

impl<'a> IntoIterator for &'a Set {
    type Item = Key;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_writes_ascending_lines() {
        let set: Set = [5, 3, 8, 1, 4, 7, 9].into_iter().collect();

        let mut out = Vec::new();
        set.print_to(&mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "1\n3\n4\n5\n7\n8\n9\n");
    }

    #[test]
    fn print_empty_set_writes_nothing() {
        let set = Set::new(Mode::Unbalanced);

        let mut out = Vec::new();
        set.print_to(&mut out).unwrap();

        assert!(out.is_empty());
    }

    #[test]
    fn insert_and_remove_round_trip() {
        let mut set: Set = [10, 20, 30].into_iter().collect();

        assert_eq!(set.insert(15), Ok(()));
        assert_eq!(set.remove(15), Ok(()));

        assert!(!set.contains(15));
        assert!([10, 20, 30].iter().all(|&k| set.contains(k)));
        assert!(set.verify());
    }

    #[test]
    fn collecting_skips_duplicates() {
        let set: Set = [3, 1, 3, 2, 1].into_iter().collect();

        assert_eq!(set.len(), 3);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(set.mode(), Mode::Balanced);
    }

    #[test]
    fn try_extend_reports_when_capacity_runs_out() {
        let mut set = Set::with_capacity(Mode::Unbalanced, 2);

        assert_eq!(
            set.try_extend([1, 1, 2, 3, 4]),
            Err(Error::AllocationFailure {
                key: 3,
                capacity: 2
            })
        );
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![1, 2]);
        assert!(set.verify());
    }

    #[test]
    fn try_extend_skips_duplicates() {
        let mut set = Set::with_capacity(Mode::Balanced, 3);

        assert_eq!(set.try_extend([2, 1, 2, 3, 1]), Ok(()));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    #[should_panic(expected = "no room for key 2")]
    fn extend_panics_when_capacity_runs_out() {
        let mut set = Set::with_capacity(Mode::Balanced, 1);
        set.extend([1, 2, 3]);
    }

    #[test]
    fn teardown_of_empty_set() {
        Set::new(Mode::Balanced).teardown();
    }
}
