use core::ptr::NonNull;
use std::collections::VecDeque;

use crate::tree::{Node, OrderedTree};

/// Order in which [`OrderedTree::for_each`] visits the entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Traversal {
    /// Node, then left subtree, then right subtree.
    PreOrder,
    /// Left subtree, node, right subtree. Yields keys in sorted order.
    InOrder,
    /// Left subtree, right subtree, then node.
    PostOrder,
    /// Breadth first, left to right within a level.
    LevelOrder,
}

impl<K, V> OrderedTree<K, V> {
    /// Calls `f` on every entry in the given order.
    pub fn for_each<F>(&self, order: Traversal, mut f: F)
    where
        F: FnMut(&K, &V),
    {
        let Some(root) = self.root_link() else {
            return;
        };

        let mut visit = |node: NonNull<Node<K, V>>| {
            let node = unsafe { node.as_ref() };
            f(&node.key, &node.value)
        };

        unsafe {
            match order {
                Traversal::PreOrder => preorder_core(root, &mut visit),
                Traversal::InOrder => inorder_core(root, &mut visit),
                Traversal::PostOrder => postorder_core(root, &mut visit),
                Traversal::LevelOrder => level_order_core(root, &mut visit),
            }
        }
    }
}

// The cores keep an explicit stack, a degenerate tree is as deep as it is long.

unsafe fn preorder_core<K, V, F>(root: NonNull<Node<K, V>>, f: &mut F)
where
    F: FnMut(NonNull<Node<K, V>>),
{
    let mut pending = vec![root];
    while let Some(node) = pending.pop() {
        f(node);
        let node = unsafe { node.as_ref() };
        pending.extend(node.right);
        pending.extend(node.left);
    }
}

unsafe fn inorder_core<K, V, F>(root: NonNull<Node<K, V>>, f: &mut F)
where
    F: FnMut(NonNull<Node<K, V>>),
{
    let mut pending = Vec::new();
    let mut current = Some(root);
    loop {
        // push the left spine, the last pushed node is the next smallest
        while let Some(node) = current {
            pending.push(node);
            current = unsafe { (*node.as_ptr()).left };
        }
        let Some(node) = pending.pop() else {
            break;
        };
        f(node);
        current = unsafe { (*node.as_ptr()).right };
    }
}

unsafe fn postorder_core<K, V, F>(root: NonNull<Node<K, V>>, f: &mut F)
where
    F: FnMut(NonNull<Node<K, V>>),
{
    // node, right, left reversed is left, right, node
    let mut pending = vec![root];
    let mut reversed = Vec::new();
    while let Some(node) = pending.pop() {
        reversed.push(node);
        let node = unsafe { node.as_ref() };
        pending.extend(node.left);
        pending.extend(node.right);
    }
    for node in reversed.into_iter().rev() {
        f(node);
    }
}

unsafe fn level_order_core<K, V, F>(root: NonNull<Node<K, V>>, f: &mut F)
where
    F: FnMut(NonNull<Node<K, V>>),
{
    let mut queue = VecDeque::from([root]);
    while let Some(node) = queue.pop_front() {
        f(node);
        let node = unsafe { node.as_ref() };
        queue.extend(node.left);
        queue.extend(node.right);
    }
}
