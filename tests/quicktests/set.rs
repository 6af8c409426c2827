use std::collections::BTreeSet;

use treeset::{Error, Mode, Set};

use crate::Op;

/// Applies a set of operations to a `Set` and a `BTreeSet`, checking after every step that
/// both agree and that the tree backing the set is well formed.
fn do_ops(ops: &[Op], set: &mut Set, model: &mut BTreeSet<i32>) -> bool {
    for op in ops {
        let agrees = match *op {
            Op::Insert(k) => {
                let k = i32::from(k);
                match set.insert(k) {
                    Ok(()) => model.insert(k),
                    Err(Error::AlreadyPresent(key)) => key == k && model.contains(&k),
                    Err(_) => false,
                }
            }
            Op::Remove(k) => {
                let k = i32::from(k);
                match set.remove(k) {
                    Ok(()) => model.remove(&k),
                    Err(Error::NotFound(key)) => key == k && !model.contains(&k),
                    Err(_) => false,
                }
            }
            Op::Iter => set.iter().eq(model.iter().copied()),
        };
        if !agrees || !set.verify() || set.len() != model.len() {
            return false;
        }
    }
    true
}

#[quickcheck]
fn fuzz_multiple_operations_balanced(ops: Vec<Op>) -> bool {
    let mut set = Set::new(Mode::Balanced);
    let mut model = BTreeSet::new();

    do_ops(&ops, &mut set, &mut model) && model.iter().all(|&key| set.contains(key))
}

#[quickcheck]
fn fuzz_multiple_operations_unbalanced(ops: Vec<Op>) -> bool {
    let mut set = Set::new(Mode::Unbalanced);
    let mut model = BTreeSet::new();

    do_ops(&ops, &mut set, &mut model) && model.iter().all(|&key| set.contains(key))
}

#[quickcheck]
fn contains(xs: Vec<i32>) -> bool {
    let set: Set = xs.iter().copied().collect();

    xs.iter().all(|&x| set.contains(x))
}

#[quickcheck]
fn contains_not(xs: Vec<i32>, nots: Vec<i32>) -> bool {
    let set: Set = xs.iter().copied().collect();
    let added: BTreeSet<_> = xs.into_iter().collect();
    let nots: BTreeSet<_> = nots.into_iter().collect();
    let mut nots = nots.difference(&added);

    nots.all(|&x| !set.contains(x))
}

#[quickcheck]
fn with_deletions(xs: Vec<i8>, deletes: Vec<i8>) -> bool {
    for mode in [Mode::Balanced, Mode::Unbalanced] {
        let mut set = Set::new(mode);
        for &x in &xs {
            let _ = set.insert(x.into());
        }
        for &delete in &deletes {
            let _ = set.remove(delete.into());
        }

        let mut still_present = xs.iter().filter(|x| !deletes.contains(x));
        let ok = deletes.iter().all(|&x| !set.contains(x.into()))
            && still_present.all(|&x| set.contains(x.into()))
            && set.verify();
        if !ok {
            return false;
        }
    }
    true
}

#[quickcheck]
fn iteration_is_strictly_ascending(xs: Vec<i32>) -> bool {
    let set: Set = xs.into_iter().collect();
    let keys: Vec<_> = set.iter().collect();

    keys.len() == set.len() && keys.windows(2).all(|pair| pair[0] < pair[1])
}

#[quickcheck]
fn insert_then_remove_restores_membership(xs: Vec<i32>, key: i32) -> bool {
    let mut set: Set = xs.iter().copied().filter(|&x| x != key).collect();
    let before: Vec<_> = set.iter().collect();

    set.insert(key) == Ok(())
        && set.remove(key) == Ok(())
        && !set.contains(key)
        && set.iter().eq(before.iter().copied())
        && set.verify()
}
