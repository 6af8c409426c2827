#[macro_use(quickcheck)]
extern crate quickcheck_macros;

use quickcheck::{Arbitrary, Gen};

mod set;

/// An enum for the various kinds of "things" to do to
/// a set in a quicktest.
#[derive(Copy, Clone, Debug)]
enum Op {
    /// Insert the key into the set
    Insert(i8),
    /// Remove the key from the set
    Remove(i8),
    /// Compare iterators
    Iter,
}

impl Arbitrary for Op {
    /// Tells quickcheck how to randomly choose an operation
    fn arbitrary(g: &mut Gen) -> Self {
        match g.choose(&[0, 1, 2]).unwrap() {
            0 => Op::Insert(i8::arbitrary(g)),
            1 => Op::Remove(i8::arbitrary(g)),
            2 => Op::Iter,
            _ => unreachable!(),
        }
    }
}
