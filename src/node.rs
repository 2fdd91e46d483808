use std::{fmt::Debug, ptr::NonNull};

use crate::{Color, Node, NodePtr};

impl<T> Node<T> {
    /// A detached node. New nodes enter the tree red; the fixup decides
    /// what they end up as.
    pub(crate) fn new(element: T) -> Self {
        Node {
            left: None,
            right: None,
            parent: None,
            color: Color::Red,
            element,
        }
    }

    #[inline(always)]
    pub(crate) fn is_black(&self) -> bool {
        self.color == Color::Black
    }

    #[inline(always)]
    pub(crate) fn is_red(&self) -> bool {
        self.color == Color::Red
    }

    /// Smallest node of the subtree rooted at `node`: all the way left.
    pub(crate) fn leftmost(mut node: NonNull<Node<T>>) -> NonNull<Node<T>> {
        while let Some(left) = unsafe { node.as_ref() }.left {
            node = left;
        }
        node
    }

    /// Largest node of the subtree rooted at `node`: all the way right.
    pub(crate) fn rightmost(mut node: NonNull<Node<T>>) -> NonNull<Node<T>> {
        while let Some(right) = unsafe { node.as_ref() }.right {
            node = right;
        }
        node
    }

    /// In-order successor. With a right subtree, its leftmost node;
    /// otherwise the first ancestor reached from a left child, climbing
    /// past every ancestor we were the right child of. `None` at the
    /// largest element.
    pub(crate) fn next(&self) -> NodePtr<T> {
        if let Some(right) = self.right {
            return Some(Self::leftmost(right));
        }

        let mut current: NodePtr<T> = Some(NonNull::from(self));
        let mut parent = self.parent;
        while let Some(up) = parent {
            if unsafe { up.as_ref() }.right != current {
                break;
            }
            current = parent;
            parent = unsafe { up.as_ref() }.parent;
        }
        parent
    }

    /// In-order predecessor; the mirror of [`Node::next`].
    pub(crate) fn prev(&self) -> NodePtr<T> {
        if let Some(left) = self.left {
            return Some(Self::rightmost(left));
        }

        let mut current: NodePtr<T> = Some(NonNull::from(self));
        let mut parent = self.parent;
        while let Some(up) = parent {
            if unsafe { up.as_ref() }.left != current {
                break;
            }
            current = parent;
            parent = unsafe { up.as_ref() }.parent;
        }
        parent
    }
}

impl<T: Debug> Debug for Node<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{:?}::{:?}", self.color, self.element))
    }
}
