use std::ptr::NonNull;

use crate::Node;

/// Moves `element` into a fresh heap node and leaks it. Pair with
/// [`reclaim`]. Allocation failure aborts, like everywhere else in the
/// crate.
pub(crate) fn alloc<T>(element: T) -> NonNull<Node<T>> {
    NonNull::from(Box::leak(Box::new(Node::new(element))))
}

/// Takes a node back from the tree.
///
/// # Safety
///
/// `node` must come from [`alloc`] and must no longer be reachable from any
/// tree link.
pub(crate) unsafe fn reclaim<T>(node: NonNull<Node<T>>) -> Box<Node<T>> {
    unsafe { Box::from_raw(node.as_ptr()) }
}
