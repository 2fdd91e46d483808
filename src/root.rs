use std::ptr::NonNull;

use crate::{Color, Node, NodePtr, NodePtrExt, Root, Side};

// Shape-changing primitives. Rotations and transplant are the only
// operations that restructure the tree outside of attach/erase.
impl<T> Root<T> {
    pub(crate) fn first(&self) -> NodePtr<T> {
        self.node.map(Node::leftmost)
    }

    pub(crate) fn last(&self) -> NodePtr<T> {
        self.node.map(Node::rightmost)
    }

    /// Links a detached red `node` into the `side` slot of `parent`.
    /// Run [`Root::insert_fixup`] afterwards.
    pub(crate) fn attach(&mut self, mut node: NonNull<Node<T>>, mut parent: NonNull<Node<T>>, side: Side) {
        unsafe {
            node.as_mut().parent = Some(parent);
            match side {
                Side::Left => parent.as_mut().left = Some(node),
                Side::Right => parent.as_mut().right = Some(node),
            }
        }
    }

    /// Rotates left around `x`, which must have a right child. In-order
    /// sequence is unchanged.
    ///
    /// ```text
    ///      x                y
    ///     / \              / \
    ///    a   y    -->     x   c
    ///       / \          / \
    ///      b   c        a   b
    /// ```
    fn rotate_left(&mut self, mut x: NonNull<Node<T>>) {
        let mut y = unsafe { x.as_ref() }.right.unwrap();
        let b = unsafe { y.as_ref() }.left;
        let upper = unsafe { x.as_ref() }.parent;

        unsafe { x.as_mut() }.right = b;
        b.set_parent(Some(x));
        unsafe { y.as_mut() }.left = Some(x);
        unsafe { y.as_mut() }.parent = upper;
        self.change_child(x, Some(y), upper);
        unsafe { x.as_mut() }.parent = Some(y);
    }

    /// The mirror of [`Root::rotate_left`]; `x` must have a left child.
    fn rotate_right(&mut self, mut x: NonNull<Node<T>>) {
        let mut y = unsafe { x.as_ref() }.left.unwrap();
        let b = unsafe { y.as_ref() }.right;
        let upper = unsafe { x.as_ref() }.parent;

        unsafe { x.as_mut() }.left = b;
        b.set_parent(Some(x));
        unsafe { y.as_mut() }.right = Some(x);
        unsafe { y.as_mut() }.parent = upper;
        self.change_child(x, Some(y), upper);
        unsafe { x.as_mut() }.parent = Some(y);
    }

    /// Points `parent`'s child slot (or the root) at `new` instead of
    /// `old`. Parent links are left to the caller.
    fn change_child(&mut self, old: NonNull<Node<T>>, new: NodePtr<T>, parent: NodePtr<T>) {
        match parent {
            None => self.node = new,
            Some(mut parent) => {
                let parent = unsafe { parent.as_mut() };
                if parent.left == Some(old) {
                    parent.left = new;
                } else {
                    parent.right = new;
                }
            }
        }
    }

    /// Splices `new` (possibly absent) into `old`'s slot, fixing the links
    /// on both sides. `old`'s own links are left dangling.
    fn transplant(&mut self, old: NonNull<Node<T>>, new: NodePtr<T>) {
        let parent = unsafe { old.as_ref() }.parent;
        self.change_child(old, new, parent);
        new.set_parent(parent);
    }
}

// Insertion.
impl<T> Root<T> {
    /// Restores the red-black invariants after a red leaf was attached.
    /// Walks up while there are two reds in a row, recoloring past red
    /// uncles and rotating otherwise; at most two rotations total.
    pub(crate) fn insert_fixup(&mut self, node: NonNull<Node<T>>) {
        let mut node: NodePtr<T> = Some(node);

        // Loop invariant: node is red.
        loop {
            let parent = node.parent();
            if parent.is_none() || parent.is_black() {
                break;
            }
            // A red parent is never the root, so the grandparent exists.
            let grand = parent.parent();

            if grand.left() == parent {
                let uncle = grand.right();
                if uncle.is_red() {
                    // Red uncle: push the grandparent's black down one
                    // level and retry from the grandparent.
                    //
                    //       G            g
                    //      / \          / \
                    //     p   u  -->   P   U
                    //    /            /
                    //   n            n
                    parent.set_color(Color::Black);
                    uncle.set_color(Color::Black);
                    grand.set_color(Color::Red);
                    node = grand;
                    continue;
                }

                let top = if parent.right() == node {
                    // Inner grandchild: rotate it outward first.
                    //
                    //      G           G
                    //     / \         / \
                    //    p   U  -->  n   U
                    //     \         /
                    //      n       p
                    self.rotate_left(parent.unwrap());
                    node
                } else {
                    parent
                };

                // Outer case: the pair's top replaces the grandparent and
                // takes its black.
                //
                //        G           N
                //       / \         / \
                //      n   U  -->  c   g
                //     /                 \
                //    c                   U
                top.set_color(Color::Black);
                grand.set_color(Color::Red);
                self.rotate_right(grand.unwrap());
                break;
            } else {
                let uncle = grand.left();
                if uncle.is_red() {
                    // Red uncle, mirrored.
                    parent.set_color(Color::Black);
                    uncle.set_color(Color::Black);
                    grand.set_color(Color::Red);
                    node = grand;
                    continue;
                }

                let top = if parent.left() == node {
                    // Inner grandchild, mirrored.
                    self.rotate_right(parent.unwrap());
                    node
                } else {
                    parent
                };

                // Outer case, mirrored.
                top.set_color(Color::Black);
                grand.set_color(Color::Red);
                self.rotate_left(grand.unwrap());
                break;
            }
        }

        // The walk may have recolored all the way up.
        self.node.set_color(Color::Black);
    }
}

// Deletion.
impl<T> Root<T> {
    /// Unlinks `node` from the tree, restoring the invariants. The node's
    /// own links are dangling afterwards; the caller reclaims the
    /// allocation.
    pub(crate) fn erase(&mut self, node: NonNull<Node<T>>) {
        let (left, right, mut spliced_color) = {
            let n = unsafe { node.as_ref() };
            (n.left, n.right, n.color)
        };
        let fix_node;
        let fix_parent;

        if left.is_none() {
            fix_node = right;
            fix_parent = unsafe { node.as_ref() }.parent;
            self.transplant(node, right);
        } else if right.is_none() {
            fix_node = left;
            fix_parent = unsafe { node.as_ref() }.parent;
            self.transplant(node, left);
        } else {
            // Two children: the in-order successor node is relocated into
            // the vacated slot, colors and subtrees re-linked. The
            // successor keeps its identity; the erased node's does not.
            let mut successor = Node::leftmost(right.unwrap());
            spliced_color = unsafe { successor.as_ref() }.color;
            fix_node = unsafe { successor.as_ref() }.right;

            if unsafe { successor.as_ref() }.parent == Some(node) {
                // The successor is the erased node's right child: it only
                // moves up, keeping its right subtree.
                fix_parent = Some(successor);
            } else {
                fix_parent = unsafe { successor.as_ref() }.parent;
                self.transplant(successor, fix_node);
                unsafe { successor.as_mut() }.right = right;
                right.set_parent(Some(successor));
            }

            self.transplant(node, Some(successor));
            unsafe { successor.as_mut() }.left = left;
            left.set_parent(Some(successor));
            unsafe { successor.as_mut() }.color = unsafe { node.as_ref() }.color;
        }

        // Splicing out a red node breaks nothing. A black one leaves the
        // paths through `fix_node` one black short.
        if spliced_color == Color::Black {
            self.erase_fixup(fix_node, fix_parent);
        }
    }

    /// Pushes the missing black up from `node` until it can be absorbed.
    /// `node` may be absent, which is why its parent is threaded
    /// explicitly: a `None` link has no parent to consult.
    fn erase_fixup(&mut self, mut node: NodePtr<T>, mut parent: NodePtr<T>) {
        loop {
            if node == self.node || node.is_red() {
                break;
            }
            // Not the root, so the parent exists.
            let up = parent.unwrap();

            if unsafe { up.as_ref() }.left == node {
                let mut sibling = unsafe { up.as_ref() }.right;
                if sibling.is_red() {
                    // Red sibling: rotate it up to expose a black one.
                    //
                    //     P               S
                    //    / \             / \
                    //   N   s    -->    p   Sr
                    //      / \         / \
                    //     Sl  Sr      N   Sl
                    sibling.set_color(Color::Black);
                    parent.set_color(Color::Red);
                    self.rotate_left(up);
                    sibling = unsafe { up.as_ref() }.right;
                }

                if sibling.left().is_black() && sibling.right().is_black() {
                    // Both nephews black: drain one black from this level
                    // and push the deficit to the parent.
                    sibling.set_color(Color::Red);
                    node = parent;
                    parent = node.parent();
                    continue;
                }

                if sibling.right().is_black() {
                    // Near nephew red: rotate it into the far slot.
                    //
                    //   (p)           (p)
                    //   / \           / \
                    //  N   S    -->  N   sl
                    //     / \             \
                    //    sl  sr            S
                    //                       \
                    //                        sr
                    sibling.left().set_color(Color::Black);
                    sibling.set_color(Color::Red);
                    self.rotate_right(sibling.unwrap());
                    sibling = unsafe { up.as_ref() }.right;
                }

                // Far nephew red: the sibling takes over the parent's
                // color, the deficit is absorbed, done.
                //
                //      (p)             (s)
                //      / \             / \
                //     N   S     -->   P   Sr
                //        / \         / \
                //      (sl) sr      N  (sl)
                sibling.set_color(parent.color());
                parent.set_color(Color::Black);
                sibling.right().set_color(Color::Black);
                self.rotate_left(up);
                node = self.node;
                break;
            } else {
                let mut sibling = unsafe { up.as_ref() }.left;
                if sibling.is_red() {
                    // Red sibling, mirrored.
                    sibling.set_color(Color::Black);
                    parent.set_color(Color::Red);
                    self.rotate_right(up);
                    sibling = unsafe { up.as_ref() }.left;
                }

                if sibling.left().is_black() && sibling.right().is_black() {
                    // Both nephews black, mirrored.
                    sibling.set_color(Color::Red);
                    node = parent;
                    parent = node.parent();
                    continue;
                }

                if sibling.left().is_black() {
                    // Near nephew red, mirrored.
                    sibling.right().set_color(Color::Black);
                    sibling.set_color(Color::Red);
                    self.rotate_left(sibling.unwrap());
                    sibling = unsafe { up.as_ref() }.left;
                }

                // Far nephew red, mirrored.
                sibling.set_color(parent.color());
                parent.set_color(Color::Black);
                sibling.left().set_color(Color::Black);
                self.rotate_right(up);
                node = self.node;
                break;
            }
        }

        node.set_color(Color::Black);
    }
}
