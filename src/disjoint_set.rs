//! Disjoint-set union-find with path compression and union-by-rank.
//!
//! Backed by a [`RobinHoodMap`] from key to `(parent_key, rank)`, per distilled spec.md §4.4.
//! Costs are the classical inverse-Ackermann amortized bound. Used by Kruskal's MST algorithm in
//! `crate::graph` to test whether adding a candidate edge would close a cycle.

use crate::hash::RobinHoodMap;
use std::hash::Hash;

struct Node<K> {
    parent: K,
    rank: usize,
}

/// A disjoint-set (union-find) structure over keys of type `K`.
pub struct DisjointSet<K> {
    nodes: RobinHoodMap<K, Node<K>>,
}

impl<K> DisjointSet<K> {
    /// Creates an empty disjoint-set structure.
    pub fn new() -> Self {
        DisjointSet {
            nodes: RobinHoodMap::new(),
        }
    }

    /// Returns the number of elements that have been `make`d.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Is this structure empty?
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<K> Default for DisjointSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone> DisjointSet<K> {
    /// Inserts `key` as a new singleton set, if not already present. No-op if already present.
    pub fn make(&mut self, key: K) {
        if !self.nodes.contains_key(&key) {
            let node = Node {
                parent: key.clone(),
                rank: 0,
            };
            self.nodes.put(key, node);
        }
    }

    /// Finds the representative of the set containing `key`, path-compressing along the way.
    ///
    /// Returns `None` if `key` was never `make`-d.
    pub fn find(&mut self, key: &K) -> Option<K> {
        if !self.nodes.contains_key(key) {
            return None;
        }
        // Walk to the root, recording the path.
        let mut path = Vec::new();
        let mut cur = key.clone();
        loop {
            let parent = self.nodes.get(&cur).unwrap().parent.clone();
            if parent == cur {
                break;
            }
            path.push(cur);
            cur = parent;
        }
        let root = cur;
        for node_key in path {
            self.nodes.get_mut(&node_key).unwrap().parent = root.clone();
        }
        Some(root)
    }

    /// Merges the sets containing `a` and `b`, linking the smaller-rank root under the
    /// higher-rank root (ties bump the winner's rank by one).
    ///
    /// Returns `false` if either key was never `make`-d, or if they were already in the same set
    /// (no merge performed); returns `true` if a merge happened.
    pub fn union(&mut self, a: &K, b: &K) -> bool {
        let (Some(ra), Some(rb)) = (self.find(a), self.find(b)) else {
            return false;
        };
        if ra == rb {
            return false;
        }
        let rank_a = self.nodes.get(&ra).unwrap().rank;
        let rank_b = self.nodes.get(&rb).unwrap().rank;
        match rank_a.cmp(&rank_b) {
            std::cmp::Ordering::Less => {
                self.nodes.get_mut(&ra).unwrap().parent = rb;
            }
            std::cmp::Ordering::Greater => {
                self.nodes.get_mut(&rb).unwrap().parent = ra;
            }
            std::cmp::Ordering::Equal => {
                self.nodes.get_mut(&rb).unwrap().parent = ra.clone();
                self.nodes.get_mut(&ra).unwrap().rank += 1;
            }
        }
        true
    }

    /// `find(a) == find(b)`. Returns `false` if either key was never `make`-d.
    pub fn same_set(&mut self, a: &K, b: &K) -> bool {
        match (self.find(a), self.find(b)) {
            (Some(ra), Some(rb)) => ra == rb,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singletons_are_not_same_set_until_unioned() {
        let mut ds = DisjointSet::new();
        ds.make(1);
        ds.make(2);
        ds.make(3);
        assert!(!ds.same_set(&1, &2));
        assert!(ds.union(&1, &2));
        assert!(ds.same_set(&1, &2));
        assert!(!ds.same_set(&1, &3));
    }

    #[test]
    fn union_is_idempotent_and_transitive() {
        let mut ds = DisjointSet::new();
        for i in 0..6 {
            ds.make(i);
        }
        ds.union(&0, &1);
        ds.union(&1, &2);
        ds.union(&3, &4);
        assert!(ds.same_set(&0, &2));
        assert!(ds.same_set(&3, &4));
        assert!(!ds.same_set(&0, &3));
        assert!(!ds.union(&0, &2)); // already in the same set
        ds.union(&2, &3);
        assert!(ds.same_set(&0, &4));
        assert!(ds.same_set(&1, &5) == false);
    }

    #[test]
    fn find_on_unknown_key_is_none() {
        let mut ds: DisjointSet<i32> = DisjointSet::new();
        ds.make(1);
        assert_eq!(ds.find(&42), None);
        assert!(!ds.union(&1, &42));
    }
}
