//! Red-black tree: a color-balanced ordered map.
//!
//! Root black, no red node has a red child, every root-to-null path carries the same number of
//! black nodes. Insertion splices in a red leaf then walks up recoloring/rotating; deletion runs
//! the classical four-sibling-case fix-up when a black node is removed, per distilled spec.md
//! §4.3.

use super::arena::{Arena, InsertResult, NodeId};
use std::cmp::Ordering;

const RED: bool = true;
const BLACK: bool = false;

struct RbExtra {
    color: bool,
}

/// An ordered key-value map balanced as a red-black tree.
pub struct RedBlackTree<K, V> {
    arena: Arena<K, V, RbExtra>,
}

impl<K: Ord, V> RedBlackTree<K, V> {
    /// Creates an empty tree.
    pub fn new() -> Self {
        RedBlackTree {
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

    fn color_of(&self, id: Option<NodeId>) -> bool {
        match id {
            None => BLACK,
            Some(id) => self.arena.node(id).extra.color,
        }
    }

    fn set_color(&mut self, id: NodeId, color: bool) {
        self.arena.node_mut(id).extra.color = color;
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

    /// Inserts `key`/`value`. Replaces and returns the old value if `key` was already present.
    pub fn insert(&mut self, key: K, val: V) -> Option<V> {
        match self.arena.insert_bst(key, val, RbExtra { color: RED }) {
            InsertResult::Replaced(old) => Some(old),
            InsertResult::Inserted(z) => {
                self.insert_fixup(z);
                debug_assert!(self.check());
                None
            }
        }
    }

    fn insert_fixup(&mut self, mut z: NodeId) {
        while self.color_of(self.arena.parent(z)) == RED {
            let p = self.arena.parent(z).unwrap();
            let gp = self.arena.parent(p).unwrap();
            if Some(p) == self.arena.left(gp) {
                let uncle = self.arena.right(gp);
                if self.color_of(uncle) == RED {
                    self.set_color(p, BLACK);
                    self.set_color(uncle.unwrap(), BLACK);
                    self.set_color(gp, RED);
                    z = gp;
                } else {
                    if Some(z) == self.arena.right(p) {
                        z = p;
                        self.arena.rotate_left(z);
                    }
                    let p2 = self.arena.parent(z).unwrap();
                    let gp2 = self.arena.parent(p2).unwrap();
                    self.set_color(p2, BLACK);
                    self.set_color(gp2, RED);
                    self.arena.rotate_right(gp2);
                }
            } else {
                let uncle = self.arena.left(gp);
                if self.color_of(uncle) == RED {
                    self.set_color(p, BLACK);
                    self.set_color(uncle.unwrap(), BLACK);
                    self.set_color(gp, RED);
                    z = gp;
                } else {
                    if Some(z) == self.arena.left(p) {
                        z = p;
                        self.arena.rotate_right(z);
                    }
                    let p2 = self.arena.parent(z).unwrap();
                    let gp2 = self.arena.parent(p2).unwrap();
                    self.set_color(p2, BLACK);
                    self.set_color(gp2, RED);
                    self.arena.rotate_left(gp2);
                }
            }
        }
        if let Some(r) = self.arena.root {
            self.set_color(r, BLACK);
        }
    }

    /// Removes `key`, returning its value, or `None` if absent.
    pub fn delete(&mut self, key: &K) -> Option<V> {
        let id = self.find_node(key)?;
        let outcome = self.arena.delete_bst(id);
        if let Some(y) = outcome.splice_node {
            self.set_color(y, outcome.removed_extra.color);
        }
        if outcome.removed_extra.color == BLACK {
            self.delete_fixup(outcome.x, outcome.x_parent);
        }
        debug_assert!(self.check());
        Some(outcome.val)
    }

    fn delete_fixup(&mut self, mut x: Option<NodeId>, mut x_parent: Option<NodeId>) {
        while x != self.arena.root && self.color_of(x) == BLACK {
            let xp = x_parent.unwrap();
            if x == self.arena.left(xp) {
                let mut w = self.arena.right(xp).unwrap();
                if self.color_of(Some(w)) == RED {
                    self.set_color(w, BLACK);
                    self.set_color(xp, RED);
                    self.arena.rotate_left(xp);
                    w = self.arena.right(xp).unwrap();
                }
                let wl = self.arena.left(w);
                let wr = self.arena.right(w);
                if self.color_of(wl) == BLACK && self.color_of(wr) == BLACK {
                    self.set_color(w, RED);
                    x = Some(xp);
                    x_parent = self.arena.parent(xp);
                } else {
                    if self.color_of(wr) == BLACK {
                        if let Some(wl) = wl {
                            self.set_color(wl, BLACK);
                        }
                        self.set_color(w, RED);
                        self.arena.rotate_right(w);
                        w = self.arena.right(xp).unwrap();
                    }
                    let xp_color = self.color_of(Some(xp));
                    self.set_color(w, xp_color);
                    self.set_color(xp, BLACK);
                    if let Some(wr2) = self.arena.right(w) {
                        self.set_color(wr2, BLACK);
                    }
                    self.arena.rotate_left(xp);
                    x = self.arena.root;
                    x_parent = None;
                }
            } else {
                let mut w = self.arena.left(xp).unwrap();
                if self.color_of(Some(w)) == RED {
                    self.set_color(w, BLACK);
                    self.set_color(xp, RED);
                    self.arena.rotate_right(xp);
                    w = self.arena.left(xp).unwrap();
                }
                let wl = self.arena.left(w);
                let wr = self.arena.right(w);
                if self.color_of(wl) == BLACK && self.color_of(wr) == BLACK {
                    self.set_color(w, RED);
                    x = Some(xp);
                    x_parent = self.arena.parent(xp);
                } else {
                    if self.color_of(wl) == BLACK {
                        if let Some(wr) = wr {
                            self.set_color(wr, BLACK);
                        }
                        self.set_color(w, RED);
                        self.arena.rotate_left(w);
                        w = self.arena.left(xp).unwrap();
                    }
                    let xp_color = self.color_of(Some(xp));
                    self.set_color(w, xp_color);
                    self.set_color(xp, BLACK);
                    if let Some(wl2) = self.arena.left(w) {
                        self.set_color(wl2, BLACK);
                    }
                    self.arena.rotate_right(xp);
                    x = self.arena.root;
                    x_parent = None;
                }
            }
        }
        if let Some(x) = x {
            self.set_color(x, BLACK);
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

    /// Debug invariant: BST ordering, size consistency, root-black, no-red-red, and equal
    /// black-height on every root-to-null path.
    pub fn check(&self) -> bool {
        if self.color_of(self.arena.root) == RED {
            return false;
        }
        self.check_node(self.arena.root).is_some()
    }

    fn check_node(&self, id: Option<NodeId>) -> Option<i32> {
        let Some(id) = id else { return Some(0) };
        let n = self.arena.node(id);
        if let Some(l) = n.left {
            if self.arena.node(l).key >= n.key {
                return None;
            }
        }
        if let Some(r) = n.right {
            if self.arena.node(r).key <= n.key {
                return None;
            }
        }
        let expected_size = 1 + self.arena.size_of(n.left) + self.arena.size_of(n.right);
        if n.size != expected_size {
            return None;
        }
        if n.extra.color == RED
            && (self.color_of(n.left) == RED || self.color_of(n.right) == RED)
        {
            return None;
        }
        let lh = self.check_node(n.left)?;
        let rh = self.check_node(n.right)?;
        if lh != rh {
            return None;
        }
        Some(lh + if n.extra.color == BLACK { 1 } else { 0 })
    }
}

impl<K: Ord, V> Default for RedBlackTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct InOrderIter<'a, K, V> {
    arena: &'a Arena<K, V, RbExtra>,
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
    arena: &'a Arena<K, V, RbExtra>,
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
    arena: &'a Arena<K, V, RbExtra>,
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
    fn insert_sequence_maintains_black_height() {
        let mut t = RedBlackTree::new();
        for i in [1, 9, 2, 8, 3, 7, 4, 6, 5] {
            t.insert(i, i);
            assert!(t.check());
        }
        let in_order: Vec<i32> = t.iter_in_order().map(|(k, _)| *k).collect();
        assert_eq!(in_order, (1..=9).collect::<Vec<_>>());
    }

    #[test]
    fn delete_sequence_maintains_invariants() {
        let mut t = RedBlackTree::new();
        for i in [1, 9, 2, 8, 3, 7, 4, 6, 5] {
            t.insert(i, i);
        }
        for i in [1, 9, 2] {
            assert_eq!(t.delete(&i), Some(i));
            assert!(t.check());
        }
        let in_order: Vec<i32> = t.iter_in_order().map(|(k, _)| *k).collect();
        assert_eq!(in_order, vec![3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn replace_existing_key_keeps_shape() {
        let mut t = RedBlackTree::new();
        t.insert(1, "a");
        t.insert(2, "b");
        assert_eq!(t.insert(1, "z"), Some("a"));
        assert_eq!(t.len(), 2);
        assert!(t.check());
    }

    #[test]
    fn large_random_like_sequence_stays_balanced() {
        let mut t = RedBlackTree::new();
        let mut keys: Vec<i32> = (0..300).collect();
        // deterministic shuffle
        keys.sort_by_key(|k| k.wrapping_mul(2654435761_i32).wrapping_add(12345));
        for &k in &keys {
            t.insert(k, k);
        }
        assert!(t.check());
        for (idx, &k) in keys.iter().enumerate() {
            if idx % 2 == 0 {
                t.delete(&k);
            }
        }
        assert!(t.check());
    }
}
