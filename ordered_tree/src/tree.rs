use core::fmt;
use core::marker::PhantomData;
use core::mem;
use core::ptr::{self, NonNull};
use std::borrow::Borrow;
use std::cmp::Ordering;

use crate::error::{InvalidArgument, TreeError};
use crate::traversal::Traversal;

pub(crate) type Link<K, V> = Option<NonNull<Node<K, V>>>;

pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    // Not an owner. Only used to find the slot that owns this node.
    parent: Link<K, V>,
    pub(crate) left: Link<K, V>,
    pub(crate) right: Link<K, V>,
}

impl<K, V> Node<K, V> {
    fn alloc(key: K, value: V, parent: Link<K, V>) -> NonNull<Self> {
        NonNull::from(Box::leak(Box::new(Node {
            key,
            value,
            parent,
            left: None,
            right: None,
        })))
    }
}

impl<K, V> fmt::Debug for Node<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn key_of<K, V>(link: &Link<K, V>) -> Option<&K> {
            link.map(|node| unsafe { &(*node.as_ptr()).key })
        }

        // Neighbours are shown by key only, the root has no parent field.
        let mut f = f.debug_struct(if self.parent.is_none() { "Root" } else { "Node" });
        f.field("key", &self.key).field("value", &self.value);
        if let Some(parent) = key_of(&self.parent) {
            f.field("parent", parent);
        }
        f.field("left", &key_of(&self.left))
            .field("right", &key_of(&self.right))
            .finish()
    }
}

/// A binary search tree based map.
///
/// For every node, keys in the left subtree are strictly smaller and keys in
/// the right subtree are greater or equal. Duplicate keys are allowed and
/// lookups return the first equal node met on the way down from the root.
///
/// The tree never rebalances, so inserting already sorted keys gives a tree
/// as deep as it is long.
pub struct OrderedTree<K, V> {
    // INVARIANTS:
    //  * `root` is `None` iff `len == 0`
    //  * every node reachable from `root` is owned by exactly one slot
    //    (`root`, or the `left`/`right` of its parent) and its `parent`
    //    points back to the node owning that slot
    root: Link<K, V>,
    len: usize,
    marker: PhantomData<Box<Node<K, V>>>,
}

// The tree uniquely owns its nodes, the raw pointers are never shared.
unsafe impl<K: Send, V: Send> Send for OrderedTree<K, V> {}
unsafe impl<K: Sync, V: Sync> Sync for OrderedTree<K, V> {}

impl<K, V> Drop for OrderedTree<K, V> {
    fn drop(&mut self) {
        // Frees the remaining nodes if dropping a key or value panicked.
        struct DropGuard<'a, K, V>(&'a mut Vec<NonNull<Node<K, V>>>);

        impl<K, V> Drop for DropGuard<'_, K, V> {
            fn drop(&mut self) {
                while let Some(node) = self.0.pop() {
                    let node = unsafe { Box::from_raw(node.as_ptr()) };
                    self.0.extend(node.left);
                    self.0.extend(node.right);
                }
            }
        }

        // Explicit stack, a degenerate tree is as deep as it is long.
        let mut pending: Vec<NonNull<Node<K, V>>> = self.root.take().into_iter().collect();
        self.len = 0;
        while let Some(node) = pending.pop() {
            let node = unsafe { Box::from_raw(node.as_ptr()) };
            pending.extend(node.left);
            pending.extend(node.right);

            let guard = DropGuard(&mut pending);
            drop(node);
            mem::forget(guard);
        }
    }
}

impl<K, V> Default for OrderedTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for OrderedTree<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct Entries<'a, K, V>(&'a OrderedTree<K, V>);

        impl<K, V> fmt::Debug for Entries<'_, K, V>
        where
            K: fmt::Debug,
            V: fmt::Debug,
        {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let mut f = f.debug_list();
                self.0.for_each(Traversal::InOrder, |k, v| {
                    f.entry(&(k, v));
                });
                f.finish()
            }
        }

        f.debug_struct("OrderedTree")
            .field("len", &self.len)
            .field("root", &self.root.map(|root| unsafe { root.as_ref() }))
            .field("nodes", &Entries(self))
            .finish()
    }
}

impl<K, V> PartialEq for OrderedTree<K, V>
where
    K: PartialEq,
    V: PartialEq,
{
    /// Structural equality: same shape with equal entries at equal positions.
    fn eq(&self, other: &Self) -> bool {
        if self.len != other.len {
            return false;
        }

        let mut pending = vec![(self.root, other.root)];
        while let Some(pair) = pending.pop() {
            match pair {
                (None, None) => {}
                (Some(a), Some(b)) => {
                    let (a, b) = unsafe { (a.as_ref(), b.as_ref()) };
                    if a.key != b.key || a.value != b.value {
                        return false;
                    }
                    pending.push((a.left, b.left));
                    pending.push((a.right, b.right));
                }
                _ => return false,
            }
        }

        true
    }
}

impl<K: Eq, V: Eq> Eq for OrderedTree<K, V> {}

impl<K: Ord, V> FromIterator<(K, V)> for OrderedTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord, V> Extend<(K, V)> for OrderedTree<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.add(key, value);
        }
    }
}

impl<K, V> OrderedTree<K, V> {
    pub fn new() -> Self {
        Self {
            root: None,
            len: 0,
            marker: PhantomData,
        }
    }

    /// Creates a tree holding a single entry at the root.
    pub fn with_entry(key: K, value: V) -> Self {
        Self {
            root: Some(Node::alloc(key, value, None)),
            len: 1,
            marker: PhantomData,
        }
    }

    /// Builds a tree by placing the pairs at the level order positions of a
    /// complete binary tree: pair `i` gets the pairs `2i + 1` and `2i + 2` as
    /// its left and right children.
    ///
    /// Fails if the inputs are empty or of different lengths, or if the
    /// resulting tree does not pass [`check_bst_property`](Self::check_bst_property).
    /// Nothing is kept from a rejected construction.
    ///
    /// The check only compares each node with its direct children, so an
    /// accepted tree can still hide keys from lookups. `[5, 3, 8, 1, 6]` is
    /// accepted but puts 6 in the left subtree of 5, where `contains(&6)`
    /// never looks.
    pub fn from_level_order(keys: Vec<K>, values: Vec<V>) -> Result<Self, TreeError>
    where
        K: Ord,
    {
        if keys.len() != values.len() {
            return Err(InvalidArgument::LengthMismatch {
                keys: keys.len(),
                values: values.len(),
            }
            .into());
        }
        if keys.is_empty() {
            return Err(InvalidArgument::Empty.into());
        }

        let mut tree = Self::new();
        let mut placed: Vec<NonNull<Node<K, V>>> = Vec::with_capacity(keys.len());
        for (i, (key, value)) in keys.into_iter().zip(values).enumerate() {
            let parent = i.checked_sub(1).map(|j| placed[j / 2]);
            let node = Node::alloc(key, value, parent);
            match parent {
                Some(parent) => unsafe {
                    if i % 2 == 1 {
                        (*parent.as_ptr()).left = Some(node);
                    } else {
                        (*parent.as_ptr()).right = Some(node);
                    }
                },
                None => tree.root = Some(node),
            }
            tree.len += 1;
            placed.push(node);
        }

        if !tree.check_bst_property() {
            #[cfg(feature = "tracing")]
            tracing::debug!(len = tree.len, "from_level_order: rejected, not a search tree");
            return Err(InvalidArgument::NotSearchTree.into());
        }

        Ok(tree)
    }

    /// Number of entries, duplicates included.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub(crate) fn root_link(&self) -> Link<K, V> {
        self.root
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_node(key).is_some()
    }

    /// Returns the value of the first node with a key equal to `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_node(key)
            .map(|node| unsafe { &(*node.as_ptr()).value })
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_node(key)
            .map(|node| unsafe { &mut (*node.as_ptr()).value })
    }

    /// Overwrites the value stored under `key`. The shape of the tree does
    /// not change.
    pub fn set<Q>(&mut self, key: &Q, value: V) -> Result<(), TreeError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.get_mut(key) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(TreeError::NotFound),
        }
    }

    fn find_node<Q>(&self, key: &Q) -> Link<K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut maybe_node = self.root;
        while let Some(node) = maybe_node {
            let node_ref = unsafe { node.as_ref() };
            maybe_node = match key.cmp(node_ref.key.borrow()) {
                Ordering::Equal => return Some(node),
                Ordering::Less => node_ref.left,
                Ordering::Greater => node_ref.right,
            };
        }

        None
    }

    /// Adds a new entry. Equal keys are not merged, the new entry goes to the
    /// right of every equal key on its path.
    pub fn add(&mut self, key: K, value: V)
    where
        K: Ord,
    {
        // Move left/right down the tree until we find an empty slot
        let mut parent = None;
        let mut goes_left = false;
        let mut maybe_node = self.root;
        while let Some(node) = maybe_node {
            parent = maybe_node;
            let node = node.as_ptr();
            unsafe {
                goes_left = key < (*node).key;
                maybe_node = if goes_left {
                    (*node).left
                } else {
                    (*node).right
                };
            }
        }

        let new_node = Node::alloc(key, value, parent);
        match parent {
            Some(parent) => {
                let parent = parent.as_ptr();
                unsafe {
                    if goes_left {
                        (*parent).left = Some(new_node);
                    } else {
                        (*parent).right = Some(new_node);
                    }
                }
            }
            None => self.root = Some(new_node),
        }

        self.len += 1;
    }

    /// Removes the first entry found under `key` and returns its value.
    ///
    /// A missing key returns `None` and leaves the tree untouched.
    /// See [`remove_entry`](Self::remove_entry) for which node is freed.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes the first entry found under `key` and returns it.
    ///
    /// When the entry's node has two children the node itself stays in place:
    /// it takes over the key and value of its in-order successor (the leftmost
    /// node of its right subtree), and the successor's node is the one that is
    /// unlinked and freed.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.find_node(key)?;
        Some(unsafe { self.remove_node(node) })
    }

    /// # Safety
    ///
    /// `node` must be reachable from `self.root`.
    unsafe fn remove_node(&mut self, node: NonNull<Node<K, V>>) -> (K, V) {
        //         ┌──── 10 ────┐
        //         │            │
        //     ┌── 5 ──┐    ┌── 15 ──┐
        //     │       │    │        │
        //     3       7    12       20

        let node_ptr = node.as_ptr();
        let unlinked = match unsafe { ((*node_ptr).left, (*node_ptr).right) } {
            (None, None) => {
                // Leaf, e.g. 3 or 12: clear the parent's slot.
                #[cfg(feature = "tracing")]
                tracing::trace!(len = self.len, "remove: leaf");
                unsafe { self.replace_subtree(node, None) };
                node
            }
            (Some(child), None) | (None, Some(child)) => {
                // One child: the child takes the node's slot.
                #[cfg(feature = "tracing")]
                tracing::trace!(len = self.len, "remove: one child");
                unsafe { self.replace_subtree(node, Some(child)) };
                node
            }
            (Some(_), Some(right)) => {
                // Two children, e.g. 10: 12 is the leftmost node of the right
                // subtree and the smallest key not smaller than 10. Moving it
                // into 10's node keeps 5 < 12 <= 15. The successor has no left
                // child so unlinking it is one of the cases above.
                #[cfg(feature = "tracing")]
                tracing::trace!(len = self.len, "remove: two children");
                unsafe {
                    let successor = Self::leftmost(right);
                    let successor_ptr = successor.as_ptr();
                    mem::swap(&mut (*node_ptr).key, &mut (*successor_ptr).key);
                    mem::swap(&mut (*node_ptr).value, &mut (*successor_ptr).value);
                    self.replace_subtree(successor, (*successor_ptr).right);
                    successor
                }
            }
        };

        let Node { key, value, .. } = *unsafe { Box::from_raw(unlinked.as_ptr()) };
        self.len -= 1;
        (key, value)
    }

    /// Puts subtree `new` into the slot that owns `old`.
    ///
    /// # Safety
    ///
    /// `old` must be reachable from `self.root`, `new` must be `None` or a
    /// child of `old`.
    unsafe fn replace_subtree(&mut self, old: NonNull<Node<K, V>>, new: Link<K, V>) {
        unsafe {
            let parent = (*old.as_ptr()).parent;
            match parent {
                Some(parent) => {
                    let parent = parent.as_ptr();
                    match (*parent).left {
                        Some(left) if ptr::eq(left.as_ptr(), old.as_ptr()) => {
                            (*parent).left = new;
                        }
                        _ => (*parent).right = new,
                    }
                }
                // `old` was the root
                None => self.root = new,
            }

            if let Some(new) = new {
                (*new.as_ptr()).parent = parent;
            }
        }
    }

    /// # Safety
    ///
    /// `root` must point to a live node.
    unsafe fn leftmost(root: NonNull<Node<K, V>>) -> NonNull<Node<K, V>> {
        let mut x = root;
        while let Some(left) = unsafe { (*x.as_ptr()).left } {
            x = left;
        }

        x
    }

    /// Checks every node against its children: the left child's key must be
    /// smaller and the right child's key must not be smaller.
    ///
    /// An empty tree passes.
    pub fn check_bst_property(&self) -> bool
    where
        K: Ord,
    {
        let mut pending: Vec<NonNull<Node<K, V>>> = self.root.into_iter().collect();
        while let Some(node) = pending.pop() {
            let node = unsafe { node.as_ref() };
            if let Some(left) = node.left {
                if unsafe { left.as_ref() }.key >= node.key {
                    return false;
                }
                pending.push(left);
            }
            if let Some(right) = node.right {
                if node.key > unsafe { right.as_ref() }.key {
                    return false;
                }
                pending.push(right);
            }
        }

        true
    }
}
