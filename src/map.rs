use std::cmp::{self, Ordering};
use std::mem;

use crate::error::KeyNotFound;
use crate::queue::LinkQueue;
use crate::stack::LinkStack;

/// An ordered key to value map backed by a rotation-balanced binary
/// search tree.
///
/// Every structural change rebalances the nodes along the modified path
/// with single rotations, keyed off subtree heights that are recomputed
/// on demand. Single rotations do not cover the zig-zag cases a full AVL
/// tree handles with double rotations, so certain update orders leave
/// the tree measurably lopsided; see the crate documentation.
pub struct TreeMap<K: Ord, V> {
    root: Link<K, V>,
    len: usize,
}

struct Node<K, V> {
    key: K,
    value: V,
    left: Link<K, V>,
    right: Link<K, V>,
}

type Link<K, V> = Option<Box<Node<K, V>>>;

impl<K: Ord, V> TreeMap<K, V> {
    /// Creates an empty map.
    /// No memory is allocated until the first entry is inserted.
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// Returns true if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns the height of the tree: -1 when empty, 0 for a single
    /// entry, otherwise one more than the taller subtree under the root.
    ///
    /// Heights are not cached on the nodes; every call walks the tree.
    pub fn height(&self) -> isize {
        Self::height_of(self.root.as_deref())
    }

    /// Returns true if the root's balance factor is within {-1, 0, 1}.
    ///
    /// This inspects the root only. It is a cheap health probe, not a
    /// whole-tree validator.
    pub fn is_balanced(&self) -> bool {
        Self::balance_of(self.root.as_deref()).abs() <= 1
    }

    /// Returns a reference to the value stored under the key.
    pub fn get(&self, key: &K) -> Result<&V, KeyNotFound> {
        self.find_node(key).map(|node| &node.value).ok_or(KeyNotFound)
    }

    /// Returns true if the map has an entry for the key.
    pub fn contains(&self, key: &K) -> bool {
        self.find_node(key).is_some()
    }

    /// Inserts a key-value entry into the map.
    ///
    /// If the key is already present its value is overwritten in place
    /// and the previous value is returned; the node itself is not
    /// replaced, so the tree's shape is unchanged.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let (root, previous) = Self::insert_node(self.root.take(), key, value);
        self.root = Some(Self::do_balance(root));
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Removes the entry stored under the key and returns its value.
    ///
    /// A failed removal leaves the tree exactly as it was.
    pub fn remove(&mut self, key: &K) -> Result<V, KeyNotFound> {
        match self.root.take() {
            None => Err(KeyNotFound),
            Some(root) => match Self::remove_node(root, key) {
                Ok((root, removed)) => {
                    self.root = root.map(Self::do_balance);
                    self.len -= 1;
                    Ok(removed)
                }
                Err(root) => {
                    self.root = Some(root);
                    Err(KeyNotFound)
                }
            },
        }
    }

    /// Removes all entries from the map, deallocating all nodes.
    ///
    /// Teardown runs over an explicit stack so that deep or degenerate
    /// trees cannot exhaust the call stack.
    pub fn clear(&mut self) {
        let mut pending = LinkStack::new();
        if let Some(root) = self.root.take() {
            pending.push(root);
        }
        while let Some(mut node) = pending.pop() {
            if let Some(left) = node.left.take() {
                pending.push(left);
            }
            if let Some(right) = node.right.take() {
                pending.push(right);
            }
        }
        self.len = 0;
    }

    /// Returns a streaming in-order iterator over the entries, in
    /// ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.root.as_deref(), self.len)
    }

    /// Returns an iterator over the keys in ascending order.
    ///
    /// The key sequence is buffered into a FIFO queue in one eager
    /// in-order pass and then served one key per step. Each call builds
    /// its own one-shot buffer.
    pub fn keys(&self) -> Keys<'_, K> {
        Keys::new(self.root.as_deref())
    }

    /// Verifies the ordering invariant and the entry count. Panics on
    /// violation.
    ///
    /// Balance is deliberately not asserted here: with single rotations
    /// only, balance is best effort rather than an invariant.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        fn walk<K: Ord, V>(
            link: Option<&Node<K, V>>,
            lower: Option<&K>,
            upper: Option<&K>,
            count: &mut usize,
        ) {
            if let Some(node) = link {
                if let Some(lower) = lower {
                    assert!(node.key > *lower);
                }
                if let Some(upper) = upper {
                    assert!(node.key < *upper);
                }
                *count += 1;
                walk(node.left.as_deref(), lower, Some(&node.key), count);
                walk(node.right.as_deref(), Some(&node.key), upper, count);
            }
        }

        let mut count = 0;
        walk(self.root.as_deref(), None, None, &mut count);
        assert_eq!(count, self.len);
    }

    #[cfg(test)]
    pub(crate) fn root_key(&self) -> Option<&K> {
        self.root.as_deref().map(|node| &node.key)
    }

    #[cfg(test)]
    pub(crate) fn root_balance(&self) -> isize {
        Self::balance_of(self.root.as_deref())
    }

    fn find_node(&self, key: &K) -> Option<&Node<K, V>> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match key.cmp(&node.key) {
                Ordering::Equal => return Some(node),
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
            };
        }
        None
    }

    fn insert_node(link: Link<K, V>, key: K, value: V) -> (Box<Node<K, V>>, Option<V>) {
        match link {
            None => (Node::create(key, value), None),
            Some(mut node) => match key.cmp(&node.key) {
                Ordering::Less => {
                    let (child, previous) = Self::insert_node(node.left.take(), key, value);
                    node.left = Some(Self::do_balance(child));
                    (node, previous)
                }
                Ordering::Greater => {
                    let (child, previous) = Self::insert_node(node.right.take(), key, value);
                    node.right = Some(Self::do_balance(child));
                    (node, previous)
                }
                Ordering::Equal => {
                    let previous = mem::replace(&mut node.value, value);
                    (node, Some(previous))
                }
            },
        }
    }

    // On a miss the untouched node travels back through the error, so a
    // failed removal neither relinks nor rebalances anything.
    fn remove_node(
        mut node: Box<Node<K, V>>,
        key: &K,
    ) -> Result<(Link<K, V>, V), Box<Node<K, V>>> {
        match key.cmp(&node.key) {
            Ordering::Less => match node.left.take() {
                None => Err(node),
                Some(left) => match Self::remove_node(left, key) {
                    Ok((child, removed)) => {
                        node.left = child.map(Self::do_balance);
                        Ok((Some(node), removed))
                    }
                    Err(left) => {
                        node.left = Some(left);
                        Err(node)
                    }
                },
            },
            Ordering::Greater => match node.right.take() {
                None => Err(node),
                Some(right) => match Self::remove_node(right, key) {
                    Ok((child, removed)) => {
                        node.right = child.map(Self::do_balance);
                        Ok((Some(node), removed))
                    }
                    Err(right) => {
                        node.right = Some(right);
                        Err(node)
                    }
                },
            },
            Ordering::Equal => {
                let Node { value, left, right, .. } = *node;
                let replacement = match (left, right) {
                    (None, right) => right,
                    (left, None) => left,
                    (Some(left), Some(right)) => {
                        // Promote the successor: detach the minimum of the
                        // right subtree and splice it in with the removed
                        // node's children.
                        let (rest, mut successor) = Self::detach_min(right);
                        successor.left = Some(left);
                        successor.right = rest.map(Self::do_balance);
                        Some(successor)
                    }
                };
                Ok((replacement, value))
            }
        }
    }

    // Unlinks the minimum node of the subtree and returns it along with
    // what remains, rebalancing each modified child on the way back up.
    // These are the same nodes a removal descending to the minimum key
    // would touch.
    fn detach_min(mut node: Box<Node<K, V>>) -> (Link<K, V>, Box<Node<K, V>>) {
        match node.left.take() {
            None => {
                let rest = node.right.take();
                (rest, node)
            }
            Some(left) => {
                let (rest, min) = Self::detach_min(left);
                node.left = rest.map(Self::do_balance);
                (Some(node), min)
            }
        }
    }

    fn height_of(link: Option<&Node<K, V>>) -> isize {
        match link {
            None => -1,
            Some(node) => {
                1 + cmp::max(
                    Self::height_of(node.left.as_deref()),
                    Self::height_of(node.right.as_deref()),
                )
            }
        }
    }

    fn balance_of(link: Option<&Node<K, V>>) -> isize {
        match link {
            None => 0,
            Some(node) => {
                Self::height_of(node.left.as_deref()) - Self::height_of(node.right.as_deref())
            }
        }
    }

    /// Applies at most one single rotation: right when left-heavy beyond
    /// the threshold, left when right-heavy, otherwise no change.
    ///
    /// A heavy child leaning the opposite way (the zig-zag shape) would
    /// need a double rotation; none is attempted, which is the
    /// documented balance gap of this tree.
    fn do_balance(node: Box<Node<K, V>>) -> Box<Node<K, V>> {
        let balance = Self::balance_of(Some(&*node));
        if balance > 1 {
            Self::rotate_right(node)
        } else if balance < -1 {
            Self::rotate_left(node)
        } else {
            node
        }
    }

    // A balance factor above 1 guarantees the left child exists.
    fn rotate_right(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
        let mut pivot = node.left.take().unwrap();
        node.left = pivot.right.take();
        pivot.right = Some(node);
        pivot
    }

    // A balance factor below -1 guarantees the right child exists.
    fn rotate_left(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
        let mut pivot = node.right.take().unwrap();
        node.right = pivot.left.take();
        pivot.left = Some(node);
        pivot
    }
}

impl<K: Ord, V> Drop for TreeMap<K, V> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K: Ord, V> Default for TreeMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone, V: Clone> Clone for TreeMap<K, V> {
    fn clone(&self) -> Self {
        fn clone_subtree<K: Clone, V: Clone>(link: Option<&Node<K, V>>) -> Link<K, V> {
            link.map(|node| {
                Box::new(Node {
                    key: node.key.clone(),
                    value: node.value.clone(),
                    left: clone_subtree(node.left.as_deref()),
                    right: clone_subtree(node.right.as_deref()),
                })
            })
        }

        Self {
            root: clone_subtree(self.root.as_deref()),
            len: self.len,
        }
    }
}

impl<'a, K: Ord, V> IntoIterator for &'a TreeMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Ord, V> Node<K, V> {
    fn create(key: K, value: V) -> Box<Self> {
        Box::new(Node {
            key,
            value,
            left: None,
            right: None,
        })
    }
}

/// A streaming in-order iterator over the entries of a [`TreeMap`].
///
/// Holds the left spine of the remaining subtrees on an explicit stack,
/// so no recursion is involved regardless of tree shape.
pub struct Iter<'a, K, V> {
    spine: LinkStack<&'a Node<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn new(root: Option<&'a Node<K, V>>, len: usize) -> Self {
        let mut iter = Iter {
            spine: LinkStack::new(),
            remaining: len,
        };
        iter.descend_left(root);
        iter
    }

    fn descend_left(&mut self, mut current: Option<&'a Node<K, V>>) {
        while let Some(node) = current {
            self.spine.push(node);
            current = node.left.as_deref();
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.spine.pop()?;
        self.descend_left(node.right.as_deref());
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}

/// An in-order iterator over the keys of a [`TreeMap`].
///
/// The key sequence is buffered eagerly into a FIFO queue at
/// construction and then drained lazily; the buffer is one-shot and the
/// sequence is finite.
pub struct Keys<'a, K> {
    buffer: LinkQueue<&'a K>,
}

impl<'a, K> Keys<'a, K> {
    fn new<V>(root: Option<&'a Node<K, V>>) -> Self {
        let mut buffer = LinkQueue::new();
        let mut spine = LinkStack::new();
        let mut current = root;
        while current.is_some() || !spine.is_empty() {
            while let Some(node) = current {
                spine.push(node);
                current = node.left.as_deref();
            }
            if let Some(node) = spine.pop() {
                buffer.push(&node.key);
                current = node.right.as_deref();
            }
        }
        Keys { buffer }
    }
}

impl<'a, K> Iterator for Keys<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.buffer.pop()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.buffer.len(), Some(self.buffer.len()))
    }
}

impl<'a, K> ExactSizeIterator for Keys<'a, K> {}
