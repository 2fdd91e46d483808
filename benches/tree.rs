use criterion::{Criterion, criterion_group, criterion_main};
use ensemble::Tree;

fn insert(c: &mut Criterion) {
    c.bench_function("ensemble_insert", |b| {
        b.iter(|| {
            let mut tree = Tree::ordered();
            for k in 0..100 {
                tree.insert(k);
            }
            tree
        })
    });
    c.bench_function("rbtree_insert", |b| {
        b.iter(|| {
            let mut tree = rbtree::RBTree::new();
            for k in 0..100 {
                tree.insert(k, ());
            }
            tree
        })
    });
}

fn lookup(c: &mut Criterion) {
    let mut tree = Tree::ordered();
    for k in 0..1000 {
        tree.insert(k);
    }
    c.bench_function("ensemble_contains", |b| {
        b.iter(|| (0..1000).filter(|k| tree.contains(k)).count())
    });

    let mut baseline = rbtree::RBTree::new();
    for k in 0..1000 {
        baseline.insert(k, ());
    }
    c.bench_function("rbtree_contains", |b| {
        b.iter(|| (0..1000).filter(|k| baseline.contains_key(k)).count())
    });
}

fn remove(c: &mut Criterion) {
    c.bench_function("ensemble_remove", |b| {
        b.iter(|| {
            let mut tree = Tree::ordered();
            for k in 0..100 {
                tree.insert(k);
            }
            for k in 0..100 {
                tree.remove(&k);
            }
        })
    });
    c.bench_function("rbtree_remove", |b| {
        b.iter(|| {
            let mut tree = rbtree::RBTree::new();
            for k in 0..100 {
                tree.insert(k, ());
            }
            for k in 0..100 {
                tree.remove(&k);
            }
        })
    });
}

criterion_group!(benches, insert, lookup, remove);
criterion_main!(benches);
