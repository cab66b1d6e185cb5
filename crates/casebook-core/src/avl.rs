//! Height-balanced ordered index over case ids.
//!
//! Every node is exclusively owned by its parent (`Option<Box<_>>`), so the
//! tree only exposes key-based operations. Insert and delete are recursive;
//! recursion depth is bounded by the tree height, which stays O(log n).
//!
//! Rebalancing uses the four classic cases at the first unbalanced ancestor:
//!
//! ```text
//! left-left   -> rotate_right(node)
//! right-right -> rotate_left(node)
//! left-right  -> rotate_left(node.left),  then rotate_right(node)
//! right-left  -> rotate_right(node.right), then rotate_left(node)
//! ```
//!
//! Insert picks the case from the inserted key's position relative to the
//! heavy child; delete picks it from the heavy child's balance factor.

use std::cmp::Ordering;

use crate::case::CaseId;

type Link = Option<Box<AvlNode>>;

#[derive(Debug, Clone)]
struct AvlNode {
    key: CaseId,
    height: i32,
    left: Link,
    right: Link,
}

impl AvlNode {
    fn leaf(key: CaseId) -> Box<Self> {
        Box::new(Self {
            key,
            height: 1,
            left: None,
            right: None,
        })
    }

    fn update_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }

    fn balance_factor(&self) -> i32 {
        height(&self.left) - height(&self.right)
    }
}

fn height(link: &Link) -> i32 {
    link.as_ref().map_or(0, |node| node.height)
}

fn balance_factor(link: &Link) -> i32 {
    link.as_ref().map_or(0, |node| node.balance_factor())
}

fn rotate_right(mut node: Box<AvlNode>) -> Box<AvlNode> {
    let Some(mut pivot) = node.left.take() else {
        return node;
    };
    node.left = pivot.right.take();
    node.update_height();
    pivot.right = Some(node);
    pivot.update_height();
    pivot
}

fn rotate_left(mut node: Box<AvlNode>) -> Box<AvlNode> {
    let Some(mut pivot) = node.right.take() else {
        return node;
    };
    node.right = pivot.left.take();
    node.update_height();
    pivot.left = Some(node);
    pivot.update_height();
    pivot
}

fn insert_node(link: Link, key: CaseId) -> (Box<AvlNode>, bool) {
    let Some(mut node) = link else {
        return (AvlNode::leaf(key), true);
    };

    let inserted = match key.cmp(&node.key) {
        Ordering::Less => {
            let (child, inserted) = insert_node(node.left.take(), key);
            node.left = Some(child);
            inserted
        }
        Ordering::Greater => {
            let (child, inserted) = insert_node(node.right.take(), key);
            node.right = Some(child);
            inserted
        }
        Ordering::Equal => return (node, false),
    };

    if !inserted {
        return (node, false);
    }
    (rebalance_after_insert(node, key), true)
}

fn rebalance_after_insert(mut node: Box<AvlNode>, key: CaseId) -> Box<AvlNode> {
    node.update_height();
    let balance = node.balance_factor();

    if balance > 1
        && let Some(left_key) = node.left.as_ref().map(|left| left.key)
    {
        if key < left_key {
            return rotate_right(node);
        }
        if key > left_key {
            node.left = node.left.take().map(rotate_left);
            return rotate_right(node);
        }
    }

    if balance < -1
        && let Some(right_key) = node.right.as_ref().map(|right| right.key)
    {
        if key > right_key {
            return rotate_left(node);
        }
        if key < right_key {
            node.right = node.right.take().map(rotate_right);
            return rotate_left(node);
        }
    }

    node
}

fn delete_node(link: Link, key: CaseId) -> (Link, bool) {
    let Some(mut node) = link else {
        return (None, false);
    };

    let removed = match key.cmp(&node.key) {
        Ordering::Less => {
            let (child, removed) = delete_node(node.left.take(), key);
            node.left = child;
            removed
        }
        Ordering::Greater => {
            let (child, removed) = delete_node(node.right.take(), key);
            node.right = child;
            removed
        }
        Ordering::Equal => match (node.left.take(), node.right.take()) {
            (None, None) => return (None, true),
            (Some(child), None) | (None, Some(child)) => return (Some(child), true),
            (Some(left), Some(right)) => {
                let successor = min_key(&right);
                node.key = successor;
                node.left = Some(left);
                node.right = delete_node(Some(right), successor).0;
                true
            }
        },
    };

    if !removed {
        return (Some(node), false);
    }
    (Some(rebalance_after_delete(node)), true)
}

fn rebalance_after_delete(mut node: Box<AvlNode>) -> Box<AvlNode> {
    node.update_height();
    let balance = node.balance_factor();

    if balance > 1 {
        if balance_factor(&node.left) < 0 {
            node.left = node.left.take().map(rotate_left);
        }
        return rotate_right(node);
    }

    if balance < -1 {
        if balance_factor(&node.right) > 0 {
            node.right = node.right.take().map(rotate_right);
        }
        return rotate_left(node);
    }

    node
}

fn min_key(node: &AvlNode) -> CaseId {
    let mut current = node;
    while let Some(left) = current.left.as_deref() {
        current = left;
    }
    current.key
}

/// Ordered index of case ids.
#[derive(Debug, Clone, Default)]
pub struct AvlIndex {
    root: Link,
    len: usize,
}

impl AvlIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `key`. Inserting a key that is already present is a no-op.
    ///
    /// Returns whether the key was newly added.
    pub fn insert(&mut self, key: CaseId) -> bool {
        let (root, inserted) = insert_node(self.root.take(), key);
        self.root = Some(root);
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Remove `key` if present. Returns whether a node was removed.
    pub fn delete(&mut self, key: CaseId) -> bool {
        let (root, removed) = delete_node(self.root.take(), key);
        self.root = root;
        if removed {
            self.len -= 1;
        }
        removed
    }

    pub fn contains(&self, key: CaseId) -> bool {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match key.cmp(&node.key) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return true,
            };
        }
        false
    }

    /// Ascending keys, collected fresh on every call.
    pub fn in_order(&self) -> Vec<CaseId> {
        self.iter().collect()
    }

    /// Ascending in-order iterator. Each call starts a new traversal.
    pub fn iter(&self) -> InOrder<'_> {
        InOrder::new(self.root.as_deref())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the tree; zero when empty.
    pub fn height(&self) -> i32 {
        height(&self.root)
    }

    pub fn root_key(&self) -> Option<CaseId> {
        self.root.as_ref().map(|node| node.key)
    }

    /// Check search order, stored heights and the balance bound on every node.
    pub fn is_well_formed(&self) -> bool {
        checked_height(&self.root, None, None).is_some()
    }
}

fn checked_height(link: &Link, lower: Option<CaseId>, upper: Option<CaseId>) -> Option<i32> {
    let Some(node) = link else {
        return Some(0);
    };
    if lower.is_some_and(|lo| node.key <= lo) || upper.is_some_and(|hi| node.key >= hi) {
        return None;
    }

    let left = checked_height(&node.left, lower, Some(node.key))?;
    let right = checked_height(&node.right, Some(node.key), upper)?;
    if (left - right).abs() > 1 || node.height != 1 + left.max(right) {
        return None;
    }
    Some(node.height)
}

/// Explicit-stack in-order traversal.
pub struct InOrder<'a> {
    stack: Vec<&'a AvlNode>,
}

impl<'a> InOrder<'a> {
    fn new(root: Option<&'a AvlNode>) -> Self {
        let mut iter = Self { stack: Vec::new() };
        iter.descend_left(root);
        iter
    }

    fn descend_left(&mut self, mut node: Option<&'a AvlNode>) {
        while let Some(current) = node {
            self.stack.push(current);
            node = current.left.as_deref();
        }
    }
}

impl Iterator for InOrder<'_> {
    type Item = CaseId;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.descend_left(node.right.as_deref());
        Some(node.key)
    }
}

impl<'a> IntoIterator for &'a AvlIndex {
    type Item = CaseId;
    type IntoIter = InOrder<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
