//! AVL tree: a height-balanced ordered map.
//!
//! `|height(left) - height(right)| <= 1` at every node. Insertion and deletion each walk from the
//! touched leaf back to the root, recomputing height and rotating at the first (insert) or every
//! (delete) out-of-balance ancestor encountered, per distilled spec.md §4.3.

use super::arena::{Arena, InsertResult, NodeId};
use std::cmp::Ordering;

struct AvlExtra {
    height: i32,
}

/// An ordered key-value map balanced as an AVL tree.
pub struct AvlTree<K, V> {
    arena: Arena<K, V, AvlExtra>,
}

impl<K: Ord, V> AvlTree<K, V> {
    /// Creates an empty tree.
    pub fn new() -> Self {
        AvlTree {
            arena: Arena::new(),
        }
    }

    /// Is this tree empty?
    pub fn is_empty(&self) -> bool {
        self.arena.len == 0
    }

    /// Returns the number of key-value pairs stored.
    pub fn len(&self) -> usize {
        self.arena.len
    }

    /// Returns the height of the tree (-1 if empty).
    pub fn height(&self) -> i32 {
        self.height_of(self.arena.root)
    }

    fn height_of(&self, id: Option<NodeId>) -> i32 {
        match id {
            None => -1,
            Some(id) => self.arena.node(id).extra.height,
        }
    }

    fn update_height(&mut self, id: NodeId) {
        let h = 1 + self
            .height_of(self.arena.left(id))
            .max(self.height_of(self.arena.right(id)));
        self.arena.node_mut(id).extra.height = h;
    }

    fn balance_factor(&self, id: NodeId) -> i32 {
        self.height_of(self.arena.left(id)) - self.height_of(self.arena.right(id))
    }

    fn find_node(&self, key: &K) -> Option<NodeId> {
        let mut cur = self.arena.root;
        while let Some(id) = cur {
            match key.cmp(&self.arena.node(id).key) {
                Ordering::Equal => return Some(id),
                Ordering::Less => cur = self.arena.left(id),
                Ordering::Greater => cur = self.arena.right(id),
            }
        }
        None
    }

    /// Returns a reference to the value associated with `key`.
    pub fn search(&self, key: &K) -> Option<&V> {
        self.find_node(key).map(|id| &self.arena.node(id).val)
    }

    /// Does this tree contain `key`?
    pub fn contains(&self, key: &K) -> bool {
        self.find_node(key).is_some()
    }

    /// Inserts `key`/`value`. Replaces and returns the old value if `key` was already present
    /// (the tree shape is unchanged in that case).
    pub fn insert(&mut self, key: K, val: V) -> Option<V> {
        let result = self.arena.insert_bst(key, val, AvlExtra { height: 0 });
        match result {
            InsertResult::Replaced(old) => Some(old),
            InsertResult::Inserted(new_id) => {
                self.rebalance(self.arena.parent(new_id));
                debug_assert!(self.check());
                None
            }
        }
    }

    /// Removes `key`, returning its value, or `None` if absent.
    pub fn delete(&mut self, key: &K) -> Option<V> {
        let id = self.find_node(key)?;
        let outcome = self.arena.delete_bst(id);
        self.rebalance(outcome.x_parent);
        debug_assert!(self.check());
        Some(outcome.val)
    }

    // Walks from `start` to the root, recomputing height and rotating at every out-of-balance
    // ancestor. Used after both insert and delete (delete may need rotations all the way to the
    // root; insert needs at most one subtree's worth, but re-checking costs nothing extra).
    fn rebalance(&mut self, start: Option<NodeId>) {
        let mut cur = start;
        while let Some(id) = cur {
            self.update_height(id);
            let bf = self.balance_factor(id);
            let next = if bf > 1 {
                let mut left = self.arena.left(id).unwrap();
                if self.balance_factor(left) < 0 {
                    self.arena.rotate_left(left);
                    left = self.arena.left(id).unwrap();
                }
                self.update_height(left);
                let y = self.arena.rotate_right(id);
                self.update_height(id);
                self.update_height(y);
                y
            } else if bf < -1 {
                let mut right = self.arena.right(id).unwrap();
                if self.balance_factor(right) > 0 {
                    self.arena.rotate_right(right);
                    right = self.arena.right(id).unwrap();
                }
                self.update_height(right);
                let y = self.arena.rotate_left(id);
                self.update_height(id);
                self.update_height(y);
                y
            } else {
                id
            };
            cur = self.arena.parent(next);
        }
    }

    /// Returns the key-value pair with the smallest key.
    pub fn min(&self) -> Option<(&K, &V)> {
        let id = self.arena.subtree_min(self.arena.root?);
        let n = self.arena.node(id);
        Some((&n.key, &n.val))
    }

    /// Returns the key-value pair with the largest key.
    pub fn max(&self) -> Option<(&K, &V)> {
        let id = self.arena.subtree_max(self.arena.root?);
        let n = self.arena.node(id);
        Some((&n.key, &n.val))
    }

    /// Returns the key-value pair immediately before `key` in sorted order.
    pub fn predecessor(&self, key: &K) -> Option<(&K, &V)> {
        let id = self.find_node(key)?;
        let p = self.arena.predecessor(id)?;
        let n = self.arena.node(p);
        Some((&n.key, &n.val))
    }

    /// Returns the key-value pair immediately after `key` in sorted order.
    pub fn successor(&self, key: &K) -> Option<(&K, &V)> {
        let id = self.find_node(key)?;
        let s = self.arena.successor(id)?;
        let n = self.arena.node(s);
        Some((&n.key, &n.val))
    }

    /// Returns the key-value pair with 0-indexed in-order rank `i`.
    pub fn select_by_rank(&self, i: usize) -> Option<(&K, &V)> {
        let id = self.arena.select_by_rank(self.arena.root?, i)?;
        let n = self.arena.node(id);
        Some((&n.key, &n.val))
    }

    /// Returns every key-value pair with key in `[lo, hi]`, in ascending order.
    pub fn range_query(&self, lo: &K, hi: &K) -> Vec<(&K, &V)> {
        let mut out = Vec::new();
        let mut cur = self.ceiling_node(lo);
        while let Some(id) = cur {
            let n = self.arena.node(id);
            if &n.key > hi {
                break;
            }
            out.push((&n.key, &n.val));
            cur = self.arena.successor(id);
        }
        out
    }

    // Smallest node with key >= lo.
    fn ceiling_node(&self, lo: &K) -> Option<NodeId> {
        let mut cur = self.arena.root;
        let mut best = None;
        while let Some(id) = cur {
            match lo.cmp(&self.arena.node(id).key) {
                Ordering::Greater => cur = self.arena.right(id),
                _ => {
                    best = Some(id);
                    cur = self.arena.left(id);
                }
            }
        }
        best
    }

    /// Returns an in-order iterator (ascending key order).
    pub fn iter_in_order(&self) -> InOrderIter<'_, K, V> {
        InOrderIter {
            arena: &self.arena,
            cur: self.arena.root.map(|r| self.arena.subtree_min(r)),
        }
    }

    /// Returns a pre-order iterator.
    pub fn iter_pre_order(&self) -> PreOrderIter<'_, K, V> {
        PreOrderIter {
            arena: &self.arena,
            cur: self.arena.root,
            bound: self.arena.root,
        }
    }

    /// Returns a post-order iterator.
    pub fn iter_post_order(&self) -> PostOrderIter<'_, K, V> {
        PostOrderIter {
            arena: &self.arena,
            cur: self.arena.root.map(|r| self.arena.postorder_first(r)),
            bound: self.arena.root,
        }
    }

    /// Debug invariant: BST ordering, size consistency, and AVL height-balance, at every node.
    pub fn check(&self) -> bool {
        self.check_node(self.arena.root)
    }

    fn check_node(&self, id: Option<NodeId>) -> bool {
        let Some(id) = id else { return true };
        let n = self.arena.node(id);
        if let Some(l) = n.left {
            if self.arena.node(l).key >= n.key {
                return false;
            }
        }
        if let Some(r) = n.right {
            if self.arena.node(r).key <= n.key {
                return false;
            }
        }
        let expected_size = 1 + self.arena.size_of(n.left) + self.arena.size_of(n.right);
        if n.size != expected_size {
            return false;
        }
        if (self.height_of(n.left) - self.height_of(n.right)).abs() > 1 {
            return false;
        }
        self.check_node(n.left) && self.check_node(n.right)
    }
}

impl<K: Ord, V> Default for AvlTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct InOrderIter<'a, K, V> {
    arena: &'a Arena<K, V, AvlExtra>,
    cur: Option<NodeId>,
}

impl<'a, K, V> Iterator for InOrderIter<'a, K, V> {
    type Item = (&'a K, &'a V);
    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cur?;
        self.cur = self.arena.successor(id);
        let n = self.arena.node(id);
        Some((&n.key, &n.val))
    }
}

pub struct PreOrderIter<'a, K, V> {
    arena: &'a Arena<K, V, AvlExtra>,
    cur: Option<NodeId>,
    bound: Option<NodeId>,
}

impl<'a, K, V> Iterator for PreOrderIter<'a, K, V> {
    type Item = (&'a K, &'a V);
    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cur?;
        self.cur = self.arena.preorder_next(id, self.bound.unwrap());
        let n = self.arena.node(id);
        Some((&n.key, &n.val))
    }
}

pub struct PostOrderIter<'a, K, V> {
    arena: &'a Arena<K, V, AvlExtra>,
    cur: Option<NodeId>,
    bound: Option<NodeId>,
}

impl<'a, K, V> Iterator for PostOrderIter<'a, K, V> {
    type Item = (&'a K, &'a V);
    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cur?;
        self.cur = self.arena.postorder_next(id, self.bound.unwrap());
        let n = self.arena.node(id);
        Some((&n.key, &n.val))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_statistics_on_one_through_ten() {
        let mut t = AvlTree::new();
        for i in 1..=10 {
            t.insert(i, i.to_string());
        }
        assert!(t.check());
        assert_eq!(t.select_by_rank(4).map(|(k, _)| *k), Some(5));
        assert_eq!(t.max().map(|(k, _)| *k), Some(10));
        assert_eq!(t.successor(&10), None);
        let in_order: Vec<i32> = t.iter_in_order().map(|(k, _)| *k).collect();
        assert_eq!(in_order, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn insert_replaces_existing_value() {
        let mut t = AvlTree::new();
        t.insert(1, "a");
        assert_eq!(t.insert(1, "b"), Some("a"));
        assert_eq!(t.search(&1), Some(&"b"));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn delete_maintains_balance_under_many_removals() {
        let mut t = AvlTree::new();
        for i in 0..200 {
            t.insert(i, i);
        }
        for i in (0..200).step_by(3) {
            assert_eq!(t.delete(&i), Some(i));
            assert!(t.check());
        }
        for i in 0..200 {
            if i % 3 == 0 {
                assert_eq!(t.search(&i), None);
            } else {
                assert_eq!(t.search(&i), Some(&i));
            }
        }
    }

    #[test]
    fn range_query_and_traversals() {
        let mut t = AvlTree::new();
        for i in [5, 3, 8, 1, 4, 7, 9, 2, 6] {
            t.insert(i, i);
        }
        let range: Vec<i32> = t.range_query(&3, &7).iter().map(|(k, _)| **k).collect();
        assert_eq!(range, vec![3, 4, 5, 6, 7]);
        let mut pre: Vec<i32> = t.iter_pre_order().map(|(k, _)| *k).collect();
        pre.sort_unstable();
        assert_eq!(pre, (1..=9).collect::<Vec<_>>());
        let mut post: Vec<i32> = t.iter_post_order().map(|(k, _)| *k).collect();
        post.sort_unstable();
        assert_eq!(post, (1..=9).collect::<Vec<_>>());
    }
}
