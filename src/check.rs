//! Test support: a walk asserting every red-black invariant, and the
//! property tests that lean on it.

use std::{cell::Cell, cmp::Ordering, collections::BTreeSet, rc::Rc};

use pretty_assertions::assert_eq;
use quickcheck_macros::quickcheck;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{NodePtr, NodePtrExt, Tree};

/// Asserts every invariant the tree promises: binary coloring with black
/// absent children, black root, no red node with a red child, uniform
/// black-height, coherent parent links, strict comparator order, accurate
/// size, logarithmic height.
pub(crate) fn assert_invariants<T>(tree: &Tree<T>) {
    assert!(tree.root.node.is_black(), "the root must be black");
    if let Some(top) = tree.root.node {
        assert!(
            unsafe { top.as_ref() }.parent.is_none(),
            "the root has no parent"
        );
    }

    let (_, count, height) = check_node(tree.root.node);
    assert_eq!(tree.len(), count, "size must count the real nodes");

    let bound = 2.0 * ((count as f64) + 1.0).log2();
    assert!(
        height as f64 <= bound,
        "height {height} exceeds 2*log2({count}+1)"
    );

    let elements: Vec<&T> = tree.iter().collect();
    for pair in elements.windows(2) {
        assert_eq!(
            Ordering::Less,
            (tree.compare)(pair[0], pair[1]),
            "in-order traversal must be strictly ascending"
        );
    }
}

/// Returns (black-height, node count, height) of the subtree, asserting
/// the local invariants on the way down.
fn check_node<T>(node: NodePtr<T>) -> (usize, usize, usize) {
    let Some(node) = node else {
        // The absent child: one (virtual) black node, nothing else.
        return (1, 0, 0);
    };
    let node_ref = unsafe { node.as_ref() };

    if node_ref.is_red() {
        assert!(
            node_ref.left.is_black() && node_ref.right.is_black(),
            "a red node must have black children"
        );
    }
    if let Some(left) = node_ref.left {
        assert_eq!(
            Some(node),
            unsafe { left.as_ref() }.parent,
            "left child must point back at its parent"
        );
    }
    if let Some(right) = node_ref.right {
        assert_eq!(
            Some(node),
            unsafe { right.as_ref() }.parent,
            "right child must point back at its parent"
        );
    }

    let (left_black, left_count, left_height) = check_node(node_ref.left);
    let (right_black, right_count, right_height) = check_node(node_ref.right);
    assert_eq!(left_black, right_black, "black-height must be uniform");

    let own = if node_ref.is_black() { 1 } else { 0 };
    (
        left_black + own,
        left_count + right_count + 1,
        1 + left_height.max(right_height),
    )
}

#[quickcheck]
fn in_order_matches_the_model(values: Vec<i32>) -> bool {
    let mut tree = Tree::ordered();
    let mut model = BTreeSet::new();
    for v in values {
        assert_eq!(model.insert(v), tree.insert(v));
    }
    assert_invariants(&tree);
    tree.len() == model.len() && tree.iter().copied().eq(model.iter().copied())
}

#[quickcheck]
fn interleaved_ops_match_the_model(ops: Vec<(bool, i8)>) -> bool {
    let mut tree = Tree::ordered();
    let mut model = BTreeSet::new();
    for (insert, v) in ops {
        // A narrow domain so removals actually hit.
        let v = i32::from(v);
        if insert {
            assert_eq!(model.insert(v), tree.insert(v));
        } else {
            assert_eq!(model.remove(&v), tree.remove(&v));
        }
        assert_invariants(&tree);
    }
    tree.iter().copied().eq(model.iter().copied())
}

#[quickcheck]
fn reverse_traversal_mirrors_forward(values: Vec<i32>) -> bool {
    let tree: Tree<i32> = values.into_iter().collect();
    let forward: Vec<i32> = tree.iter().copied().collect();
    let mut backward: Vec<i32> = tree.iter().rev().copied().collect();
    backward.reverse();
    forward == backward
}

#[quickcheck]
fn every_value_is_destroyed_exactly_once(values: Vec<i8>) -> bool {
    let destroyed = Rc::new(Cell::new(0));
    let total = values.len();
    {
        let counter = Rc::clone(&destroyed);
        let mut tree =
            Tree::with_destroy(i8::cmp, Box::new(move |_| counter.set(counter.get() + 1)));
        for v in &values {
            // Duplicates are destroyed on rejection, the rest on removal
            // or drop.
            tree.insert(*v);
        }
        for v in values.iter().take(total / 2) {
            tree.remove(v);
        }
    }
    destroyed.get() == total
}

#[test]
fn ascending_and_descending_runs_stay_balanced() {
    let mut tree = Tree::ordered();
    for v in 0..1024 {
        tree.insert(v);
    }
    assert_invariants(&tree);

    let mut tree = Tree::ordered();
    for v in (0..1024).rev() {
        tree.insert(v);
    }
    assert_invariants(&tree);
}

#[test]
fn seeded_stress_run_matches_the_model() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
    let mut tree = Tree::ordered();
    let mut model = BTreeSet::new();

    for round in 0_u32..10_000 {
        let v: u16 = rng.random_range(0..512);
        if rng.random_bool(0.6) {
            assert_eq!(model.insert(v), tree.insert(v));
        } else {
            assert_eq!(model.remove(&v), tree.remove(&v));
        }
        if round % 256 == 0 {
            assert_invariants(&tree);
        }
    }

    assert_invariants(&tree);
    assert_eq!(model.len(), tree.len());
    assert!(tree.iter().copied().eq(model.iter().copied()));
}
