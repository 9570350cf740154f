//! Minimum spanning tree: Prim (lazy decrease-key via [`LocatorHeap`]) and Kruskal (sort edges,
//! drain a [`MinPQ`] skipping any that would close a cycle, tracked with a [`DisjointSet`]).
//!
//! Both treat the graph as undirected, per distilled spec.md §4.6's MST paragraph; on a graph that
//! isn't weakly connected, both return a minimum spanning *forest* (one tree per component) rather
//! than failing.

use super::model::Graph;
use crate::disjoint_set::DisjointSet;
use crate::heap::{AdjustDirection, HeapOrder, LocatorHeap, MinPQ};
use crate::hash::RobinHoodMap;
use crate::VertexHandle;
use std::hash::Hash;
use std::ops::Add;

impl<K: Eq + Hash + Clone, V> Graph<K, V> {
    /// Prim's algorithm, run from every undiscovered vertex in turn so a disconnected graph
    /// yields a minimum spanning forest. `weight` is looked up by the edge connecting two
    /// vertices in either direction; `und_edge` maps an (undirected) crossing pair to the
    /// candidate edge used to cross it.
    pub fn prim_mst<W, F>(&self, weight: F) -> Vec<(VertexHandle, VertexHandle)>
    where
        W: Ord + Copy + Add<Output = W>,
        F: Fn(VertexHandle, VertexHandle) -> W,
    {
        let mut in_tree = vec![false; self.vertices.len()];
        let mut tree_edges = Vec::new();

        for &root in &self.vertex_seq {
            if in_tree[root.0] {
                continue;
            }
            in_tree[root.0] = true;
            // (crossing weight, vertex, the tree vertex it would connect to)
            let mut heap: LocatorHeap<(W, VertexHandle, VertexHandle)> = LocatorHeap::new(HeapOrder::Min);
            let mut locator: RobinHoodMap<VertexHandle, crate::heap::LocatorId> = RobinHoodMap::new();

            self.prim_relax(root, &in_tree, &weight, &mut heap, &mut locator);

            while !heap.is_empty() {
                let (_, v, from) = *heap.top().unwrap().1;
                let loc = locator.delete(&v).unwrap();
                heap.remove(loc);
                if in_tree[v.0] {
                    continue;
                }
                in_tree[v.0] = true;
                tree_edges.push((from, v));
                self.prim_relax(v, &in_tree, &weight, &mut heap, &mut locator);
            }
        }
        tree_edges
    }

    // Pushes/updates a crossing-edge candidate for every not-yet-in-tree neighbor of `v`.
    fn prim_relax<W, F>(
        &self,
        v: VertexHandle,
        in_tree: &[bool],
        weight: &F,
        heap: &mut LocatorHeap<(W, VertexHandle, VertexHandle)>,
        locator: &mut RobinHoodMap<VertexHandle, crate::heap::LocatorId>,
    ) where
        W: Ord + Copy + Add<Output = W>,
        F: Fn(VertexHandle, VertexHandle) -> W,
    {
        for w in self.undirected_neighbors(v) {
            if in_tree[w.0] {
                continue;
            }
            let candidate_weight = weight(v, w);
            let existing_loc = locator.get(&w).copied();
            let should_update = match existing_loc {
                None => true,
                Some(loc) => candidate_weight < heap.get(loc).0,
                // ^ `heap.get` returns `&(W, ..)`; `W: Copy` so comparing a field projects a copy.
            };
            if should_update {
                match existing_loc {
                    Some(loc) => {
                        *heap.payload_mut(loc) = (candidate_weight, w, v);
                        heap.adjust(loc, AdjustDirection::Up);
                    }
                    None => {
                        let loc = heap.insert((candidate_weight, w, v));
                        locator.put(w, loc);
                    }
                }
            }
        }
    }

    /// Kruskal's algorithm: pours every edge into a [`MinPQ`] ordered by weight, then drains it,
    /// keeping an edge only if its endpoints' keys are in different [`DisjointSet`] components.
    pub fn kruskal_mst<W, F>(&self, weight: F) -> Vec<(VertexHandle, VertexHandle)>
    where
        W: Ord + Copy + Default,
        F: Fn(VertexHandle, VertexHandle) -> W,
    {
        let mut dsu: DisjointSet<K> = DisjointSet::new();
        for &v in &self.vertex_seq {
            dsu.make(self.vertex_key(v).clone());
        }

        let mut seen_pair = RobinHoodMap::new();
        let mut pq: MinPQ<(W, usize, VertexHandle, VertexHandle)> = MinPQ::new();
        let mut ordinal = 0usize;
        for &v in &self.vertex_seq {
            for w in self.undirected_neighbors(v) {
                let key = if v.0 <= w.0 { (v, w) } else { (w, v) };
                if seen_pair.contains_key(&key) {
                    continue;
                }
                seen_pair.put(key, ());
                pq.insert((weight(v, w), ordinal, v, w));
                ordinal += 1;
            }
        }

        let mut tree_edges = Vec::new();
        while let Some((_, _, v, w)) = pq.del_min() {
            let kv = self.vertex_key(v).clone();
            let kw = self.vertex_key(w).clone();
            if dsu.find(&kv) != dsu.find(&kw) {
                dsu.union(&kv, &kw);
                tree_edges.push((v, w));
            }
        }
        tree_edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weighted_square() -> (Graph<i32, ()>, Vec<VertexHandle>, RobinHoodMap<(i32, i32), u32>) {
        let mut g: Graph<i32, ()> = Graph::new();
        let v: Vec<_> = (0..4).map(|i| g.add_vertex(i)).collect();
        let mut w: RobinHoodMap<(i32, i32), u32> = RobinHoodMap::new();
        let mut add = |g: &mut Graph<i32, ()>, a: usize, b: usize, weight: u32| {
            g.add_edge(v[a], v[b]);
            w.put((a as i32, b as i32), weight);
            w.put((b as i32, a as i32), weight);
        };
        add(&mut g, 0, 1, 1);
        add(&mut g, 1, 2, 2);
        add(&mut g, 2, 3, 3);
        add(&mut g, 3, 0, 4);
        add(&mut g, 0, 2, 5);
        (g, v, w)
    }

    fn total_weight(g: &Graph<i32, ()>, w: &RobinHoodMap<(i32, i32), u32>, edges: &[(VertexHandle, VertexHandle)]) -> u32 {
        edges
            .iter()
            .map(|&(a, b)| *w.get(&(*g.vertex_key(a), *g.vertex_key(b))).unwrap())
            .sum()
    }

    #[test]
    fn prim_and_kruskal_agree_on_total_weight() {
        let (g, v, w) = weighted_square();
        let _ = &v;
        let weight_fn = |a: VertexHandle, b: VertexHandle| *w.get(&(*g.vertex_key(a), *g.vertex_key(b))).unwrap();
        let prim_edges = g.prim_mst(weight_fn);
        let kruskal_edges = g.kruskal_mst(weight_fn);
        assert_eq!(prim_edges.len(), 3);
        assert_eq!(kruskal_edges.len(), 3);
        assert_eq!(total_weight(&g, &w, &prim_edges), 6);
        assert_eq!(total_weight(&g, &w, &kruskal_edges), 6);
    }

    #[test]
    fn mst_on_disconnected_graph_is_a_forest() {
        let mut g: Graph<i32, ()> = Graph::new();
        let v: Vec<_> = (0..4).map(|i| g.add_vertex(i)).collect();
        g.add_edge(v[0], v[1]);
        g.add_edge(v[2], v[3]);
        let edges = g.kruskal_mst(|_, _| 1u32);
        assert_eq!(edges.len(), 2);
    }
}
