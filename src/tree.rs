use std::{cmp::Ordering::*, fmt, mem, ptr::NonNull};

use crate::{
    Color, CompareFn, Cursor, DestroyFn, Node, Root, Side, Tree, alloc,
};

impl<T> Tree<T> {
    /// An empty tree ordered by `compare`. `compare` must be a total
    /// order; an inconsistent one produces a useless (but memory-safe)
    /// tree.
    pub fn new(compare: CompareFn<T>) -> Self {
        Tree {
            root: Root::new(),
            size: 0,
            compare,
            destroy: None,
        }
    }

    /// Like [`Tree::new`], with a destroy callback that every element is
    /// handed to when it leaves the tree: removal, duplicate rejection,
    /// [`Tree::clear`], drop.
    pub fn with_destroy(compare: CompareFn<T>, destroy: DestroyFn<T>) -> Self {
        Tree {
            root: Root::new(),
            size: 0,
            compare,
            destroy: Some(destroy),
        }
    }

    pub const fn len(&self) -> usize {
        self.size
    }

    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Swaps the destroy callback, returning the previous one. Elements
    /// already in the tree are destroyed by whichever callback is set when
    /// they leave it.
    pub fn set_destroy(&mut self, destroy: Option<DestroyFn<T>>) -> Option<DestroyFn<T>> {
        mem::replace(&mut self.destroy, destroy)
    }

    /// Inserts `value`; `false` if an equal element is already present, in
    /// which case the rejected value is destroyed so the caller does not
    /// have to track it.
    pub fn insert(&mut self, value: T) -> bool {
        let Some(top) = self.root.node else {
            let mut node = alloc::alloc(value);
            unsafe { node.as_mut() }.color = Color::Black;
            self.root.node = Some(node);
            self.size = 1;
            return true;
        };

        let mut parent = top;
        let side = loop {
            let current = unsafe { parent.as_ref() };
            match (self.compare)(&value, &current.element) {
                Equal => {
                    self.dispose(value);
                    return false;
                }
                Less => match current.left {
                    Some(left) => parent = left,
                    None => break Side::Left,
                },
                Greater => match current.right {
                    Some(right) => parent = right,
                    None => break Side::Right,
                },
            }
        };

        let node = alloc::alloc(value);
        self.root.attach(node, parent, side);
        self.root.insert_fixup(node);
        self.size += 1;
        true
    }

    /// Removes the element equal to `value`, destroying it; `false` if it
    /// was not present.
    pub fn remove(&mut self, value: &T) -> bool {
        let Some(node) = self.find_node(value) else {
            return false;
        };
        self.root.erase(node);
        // SAFETY: erase unlinked it; nothing points at the node any more.
        let node = unsafe { alloc::reclaim(node) };
        self.dispose(node.element);
        self.size -= 1;
        true
    }

    /// A reference to the stored element equal to `value`.
    pub fn get(&self, value: &T) -> Option<&T> {
        self.find_node(value).map(|n| &unsafe { n.as_ref() }.element)
    }

    pub fn contains(&self, value: &T) -> bool {
        self.find_node(value).is_some()
    }

    /// A cursor at the element equal to `value`, for stepping to its
    /// neighbors without another descent.
    pub fn find(&self, value: &T) -> Option<Cursor<'_, T>> {
        self.find_node(value).map(Cursor::new)
    }

    /// The smallest element.
    pub fn first(&self) -> Option<&T> {
        self.root.first().map(|n| &unsafe { n.as_ref() }.element)
    }

    /// The largest element.
    pub fn last(&self) -> Option<&T> {
        self.root.last().map(|n| &unsafe { n.as_ref() }.element)
    }

    /// Destroys every element and frees every node. No recursion: the walk
    /// descends to a leaf, reclaims it and climbs back out through the
    /// parent links.
    pub fn clear(&mut self) {
        let mut node = self.root.node.take();
        self.size = 0;
        while let Some(current) = node {
            let current_ref = unsafe { current.as_ref() };
            if current_ref.left.is_some() {
                node = current_ref.left;
                continue;
            }
            if current_ref.right.is_some() {
                node = current_ref.right;
                continue;
            }

            let parent = current_ref.parent;
            if let Some(mut up) = parent {
                let up = unsafe { up.as_mut() };
                if up.left == Some(current) {
                    up.left = None;
                } else {
                    up.right = None;
                }
            }
            // SAFETY: the parent no longer links to it.
            let leaf = unsafe { alloc::reclaim(current) };
            self.dispose(leaf.element);
            node = parent;
        }
    }

    fn find_node(&self, value: &T) -> Option<NonNull<Node<T>>> {
        let mut node = self.root.node;
        while let Some(current) = node {
            let current_ref = unsafe { current.as_ref() };
            match (self.compare)(value, &current_ref.element) {
                Equal => return Some(current),
                Less => node = current_ref.left,
                Greater => node = current_ref.right,
            }
        }
        None
    }

    fn dispose(&mut self, element: T) {
        match self.destroy.as_mut() {
            Some(destroy) => destroy(element),
            None => drop(element),
        }
    }
}

impl<T: Ord> Tree<T> {
    /// An empty tree ordered by the element type's own `Ord`.
    pub fn ordered() -> Self {
        Tree::new(T::cmp)
    }
}

impl<T> Drop for Tree<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T> Extend<T> for Tree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T: Ord> FromIterator<T> for Tree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Tree::ordered();
        tree.extend(iter);
        tree
    }
}

impl<T: fmt::Debug> fmt::Debug for Tree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod test {
    use std::{cell::Cell, rc::Rc};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::check::assert_invariants;

    fn root_element<T: Copy>(tree: &Tree<T>) -> T {
        unsafe { tree.root.node.unwrap().as_ref() }.element
    }

    /// A destroy callback that counts its invocations.
    fn counting(counter: &Rc<Cell<usize>>) -> DestroyFn<i32> {
        let counter = Rc::clone(counter);
        Box::new(move |_| counter.set(counter.get() + 1))
    }

    #[test]
    fn ctor_works() {
        let tree: Tree<i32> = Tree::ordered();
        assert_eq!(0, tree.len());
        assert!(tree.is_empty());
        assert_eq!(None, tree.first());
        assert_eq!(None, tree.last());
    }

    #[test]
    fn empty_tree_misses() {
        let mut tree: Tree<i32> = Tree::ordered();
        assert!(!tree.contains(&42));
        assert!(!tree.remove(&42));
        assert_eq!(0, tree.len());
    }

    #[test]
    fn insert_and_contains_many() {
        let mut tree = Tree::ordered();
        for v in [42, 0, 100] {
            assert!(tree.insert(v));
        }
        assert_eq!(3, tree.len());
        assert!(tree.contains(&42));
        assert!(tree.contains(&0));
        assert!(tree.contains(&100));
        assert!(!tree.contains(&1));
        assert!(!tree.contains(&1000));
        assert_invariants(&tree);
    }

    #[test]
    fn first_and_last() {
        let mut tree = Tree::ordered();
        tree.insert(42);
        assert_eq!(Some(&42), tree.first());
        assert_eq!(Some(&42), tree.last());

        tree.insert(0);
        tree.insert(100);
        assert_eq!(Some(&0), tree.first());
        assert_eq!(Some(&100), tree.last());
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut tree = Tree::ordered();
        assert!(tree.insert(42));
        assert!(!tree.insert(42));
        assert_eq!(1, tree.len());
        assert_invariants(&tree);
    }

    #[test]
    fn duplicate_insert_destroys_the_rejected_value() {
        let destroyed = Rc::new(Cell::new(0));
        let mut tree = Tree::with_destroy(i32::cmp, counting(&destroyed));
        assert!(tree.insert(7));
        assert!(!tree.insert(7));
        // The tree still holds the first 7; only the rejected one died.
        assert_eq!(1, destroyed.get());
        assert_eq!(1, tree.len());
        assert!(tree.contains(&7));
    }

    #[test]
    fn ascending_run_rebalances() {
        let mut tree = Tree::ordered();
        for v in 1..=7 {
            assert!(tree.insert(v));
        }
        assert_eq!(7, tree.len());
        assert_invariants(&tree);
        // A plain BST would have left 1 at the top with everything hanging
        // off to the right; the fixup must have rotated.
        assert_eq!(2, root_element(&tree));
        assert_eq!(Some(&1), tree.first());
        assert_eq!(Some(&7), tree.last());
    }

    #[test]
    fn remove_leaf_and_miss() {
        let mut tree: Tree<i32> = [50, 30, 70].into_iter().collect();
        assert!(!tree.remove(&99));
        assert_eq!(3, tree.len());

        assert!(tree.remove(&30));
        assert_eq!(2, tree.len());
        assert!(!tree.contains(&30));
        assert_invariants(&tree);
    }

    #[test]
    fn remove_node_with_one_child() {
        let mut tree: Tree<i32> = [50, 30, 70, 60].into_iter().collect();
        assert!(tree.remove(&70));
        assert_eq!(vec![30, 50, 60], tree.iter().copied().collect::<Vec<_>>());
        assert_invariants(&tree);
    }

    #[test]
    fn remove_two_children_promotes_the_successor() {
        let mut tree: Tree<i32> = [50, 30, 70, 20, 40, 60, 80].into_iter().collect();
        assert_eq!(50, root_element(&tree));

        assert!(tree.remove(&50));
        assert_eq!(6, tree.len());
        // The in-order successor of 50 takes over its position.
        assert_eq!(60, root_element(&tree));
        assert_eq!(
            vec![20, 30, 40, 60, 70, 80],
            tree.iter().copied().collect::<Vec<_>>()
        );
        assert_invariants(&tree);
    }

    #[test]
    fn remove_every_element() {
        let mut tree: Tree<i32> = (0..64).collect();
        for v in 0..64 {
            assert!(tree.remove(&v), "remove {v}");
            assert_invariants(&tree);
        }
        assert!(tree.is_empty());
        assert_eq!(None, tree.first());
    }

    #[test]
    fn insert_then_remove_round_trips() {
        let mut tree: Tree<i32> = [50, 30, 70, 20, 40].into_iter().collect();
        let before: Vec<i32> = tree.iter().copied().collect();

        assert!(tree.insert(35));
        assert_invariants(&tree);
        assert!(tree.remove(&35));
        assert_invariants(&tree);
        assert_eq!(before, tree.iter().copied().collect::<Vec<_>>());
    }

    #[test]
    fn destroy_runs_once_per_removal() {
        let destroyed = Rc::new(Cell::new(0));
        let mut tree = Tree::with_destroy(i32::cmp, counting(&destroyed));
        for v in 0..10 {
            tree.insert(v);
        }
        assert!(tree.remove(&3));
        assert_eq!(1, destroyed.get());
        assert!(!tree.remove(&3));
        assert_eq!(1, destroyed.get());
    }

    #[test]
    fn destroy_runs_for_every_element_on_drop() {
        let destroyed = Rc::new(Cell::new(0));
        {
            let mut tree = Tree::with_destroy(i32::cmp, counting(&destroyed));
            for v in 0..10 {
                tree.insert(v);
            }
        }
        assert_eq!(10, destroyed.get());
    }

    #[test]
    fn clear_destroys_and_empties() {
        let destroyed = Rc::new(Cell::new(0));
        let mut tree = Tree::with_destroy(i32::cmp, counting(&destroyed));
        for v in 0..10 {
            tree.insert(v);
        }
        tree.clear();
        assert_eq!(10, destroyed.get());
        assert!(tree.is_empty());
        assert_eq!(None, tree.first());

        // The tree stays usable.
        assert!(tree.insert(1));
        assert_eq!(1, tree.len());
    }

    #[test]
    fn set_destroy_swaps_the_callback() {
        let old_count = Rc::new(Cell::new(0));
        let new_count = Rc::new(Cell::new(0));
        let mut tree = Tree::with_destroy(i32::cmp, counting(&old_count));
        tree.insert(1);
        tree.insert(2);
        assert!(tree.remove(&1));
        assert_eq!(1, old_count.get());

        let previous = tree.set_destroy(Some(counting(&new_count)));
        assert!(previous.is_some());
        assert!(tree.remove(&2));
        assert_eq!(1, old_count.get());
        assert_eq!(1, new_count.get());
    }

    #[test]
    fn custom_comparator_reverses_the_order() {
        fn descending(a: &i32, b: &i32) -> std::cmp::Ordering {
            b.cmp(a)
        }
        let mut tree = Tree::new(descending);
        tree.extend([1, 3, 2]);
        assert_eq!(Some(&3), tree.first());
        assert_eq!(Some(&1), tree.last());
        assert_eq!(vec![3, 2, 1], tree.iter().copied().collect::<Vec<_>>());
        assert_invariants(&tree);
    }

    #[test]
    fn get_returns_the_stored_element() {
        let mut tree: Tree<String> = Tree::ordered();
        tree.insert("carotte".to_string());
        assert_eq!(Some(&"carotte".to_string()), tree.get(&"carotte".to_string()));
        assert_eq!(None, tree.get(&"navet".to_string()));
    }

    #[test]
    fn debug_prints_in_order() {
        let tree: Tree<i32> = [2, 1, 3].into_iter().collect();
        assert_eq!("{1, 2, 3}", format!("{tree:?}"));
    }
}
