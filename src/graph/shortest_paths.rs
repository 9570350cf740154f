//! Single-source shortest paths: Dijkstra (nonnegative weights), Bellman-Ford (handles negative
//! weights, detects negative cycles), and the linear-time DAG shortest-path relaxation.
//!
//! Edge weights are supplied by the caller as `impl Fn(EdgeHandle) -> W` rather than stored on the
//! graph itself, matching distilled spec.md §4.6's "weight function" framing and letting the same
//! graph be shortest-pathed under different weightings (e.g. an edge attribute vs. a constant).

use super::model::{EdgeHandle, Graph};
use crate::heap::{AdjustDirection, HeapOrder, LocatorHeap};
use crate::hash::RobinHoodMap;
use crate::VertexHandle;
use std::hash::Hash;
use std::ops::Add;

/// The result of a shortest-path computation: distance and last-edge-used, keyed by vertex.
/// A vertex absent from `dist` was unreached.
pub struct ShortestPaths<K, W> {
    pub dist: RobinHoodMap<VertexHandle, W>,
    pub edge_to: RobinHoodMap<VertexHandle, EdgeHandle>,
    _key: std::marker::PhantomData<K>,
}

impl<K, W: Copy> ShortestPaths<K, W> {
    fn new() -> Self {
        ShortestPaths {
            dist: RobinHoodMap::new(),
            edge_to: RobinHoodMap::new(),
            _key: std::marker::PhantomData,
        }
    }

    /// Returns the distance to `v`, if reached.
    pub fn dist_to(&self, v: VertexHandle) -> Option<W> {
        self.dist.get(&v).copied()
    }
}

impl<K: Eq + Hash + Clone, V> Graph<K, V> {
    /// Dijkstra's algorithm from `src`, using a [`LocatorHeap`] to decrease-key in O(log n) on
    /// every relaxed edge. `weight` must return nonnegative weights; a negative weight can make
    /// this return distances that are not actually shortest.
    pub fn dijkstra<W, F>(&self, src: VertexHandle, weight: F) -> ShortestPaths<K, W>
    where
        W: Ord + Copy + Add<Output = W> + Zero,
        F: Fn(EdgeHandle) -> W,
    {
        let mut result = ShortestPaths::new();
        let mut heap: LocatorHeap<(W, VertexHandle)> = LocatorHeap::new(HeapOrder::Min);
        let mut locator: RobinHoodMap<VertexHandle, crate::heap::LocatorId> = RobinHoodMap::new();

        result.dist.put(src, W::zero());
        let id = heap.insert((W::zero(), src));
        locator.put(src, id);

        while !heap.is_empty() {
            let (d, v) = *heap.top().unwrap().1;
            heap.remove(locator.delete(&v).unwrap());
            if Some(d) != result.dist.get(&v).copied() {
                continue;
            }
            for &e in self.out_edges(v) {
                let (_, w) = self.edge_endpoints(e);
                let candidate = d + weight(e);
                let improves = match result.dist.get(&w) {
                    None => true,
                    Some(&best) => candidate < best,
                };
                if improves {
                    result.dist.put(w, candidate);
                    result.edge_to.put(w, e);
                    match locator.get(&w).copied() {
                        Some(loc) => {
                            *heap.payload_mut(loc) = (candidate, w);
                            heap.adjust(loc, AdjustDirection::Up);
                        }
                        None => {
                            let loc = heap.insert((candidate, w));
                            locator.put(w, loc);
                        }
                    }
                }
            }
        }
        result
    }

    /// Bellman-Ford from `src`: `|V| - 1` relaxation rounds over every edge, then one more round
    /// to detect a negative-weight cycle reachable from `src`.
    pub fn bellman_ford<W, F>(&self, src: VertexHandle, weight: F) -> Result<ShortestPaths<K, W>, crate::error::Algs4Error>
    where
        W: Ord + Copy + Add<Output = W> + Zero,
        F: Fn(EdgeHandle) -> W,
    {
        let mut result = ShortestPaths::new();
        result.dist.put(src, W::zero());

        for _ in 0..self.vertex_seq.len().saturating_sub(1) {
            let mut any_relaxed = false;
            for &e in &self.edge_seq {
                let (u, v) = self.edge_endpoints(e);
                if let Some(&du) = result.dist.get(&u) {
                    let candidate = du + weight(e);
                    let improves = match result.dist.get(&v) {
                        None => true,
                        Some(&dv) => candidate < dv,
                    };
                    if improves {
                        result.dist.put(v, candidate);
                        result.edge_to.put(v, e);
                        any_relaxed = true;
                    }
                }
            }
            if !any_relaxed {
                break;
            }
        }

        for &e in &self.edge_seq {
            let (u, v) = self.edge_endpoints(e);
            if let Some(&du) = result.dist.get(&u) {
                let candidate = du + weight(e);
                let on_cycle = match result.dist.get(&v) {
                    None => false,
                    Some(&dv) => candidate < dv,
                };
                if on_cycle {
                    return Err(crate::error::Algs4Error::NegativeCycle);
                }
            }
        }
        Ok(result)
    }

    /// Linear-time shortest path for a DAG: relax every edge in one pass over a topological order.
    /// Returns `Err(Algs4Error::Cycle)` if the graph contains a cycle.
    pub fn dag_shortest_path<W, F>(&self, src: VertexHandle, weight: F) -> Result<ShortestPaths<K, W>, crate::error::Algs4Error>
    where
        W: Ord + Copy + Add<Output = W> + Zero,
        F: Fn(EdgeHandle) -> W,
    {
        let order = self.topological_sort()?;
        let mut result = ShortestPaths::new();
        result.dist.put(src, W::zero());
        for v in order {
            if let Some(&dv) = result.dist.get(&v) {
                for &e in self.out_edges(v) {
                    let (_, w) = self.edge_endpoints(e);
                    let candidate = dv + weight(e);
                    let improves = match result.dist.get(&w) {
                        None => true,
                        Some(&best) => candidate < best,
                    };
                    if improves {
                        result.dist.put(w, candidate);
                        result.edge_to.put(w, e);
                    }
                }
            }
        }
        Ok(result)
    }

    /// Reconstructs the path (as a list of edges, source to `dst`) that `sp` used to reach `dst`,
    /// or `None` if `dst` was unreached.
    pub fn shortest_path_edges<W: Copy>(&self, sp: &ShortestPaths<K, W>, dst: VertexHandle) -> Option<Vec<EdgeHandle>> {
        sp.dist.get(&dst)?;
        let mut edges = Vec::new();
        let mut cur = dst;
        while let Some(&e) = sp.edge_to.get(&cur) {
            edges.push(e);
            cur = self.edge_endpoints(e).0;
        }
        edges.reverse();
        Some(edges)
    }
}

/// An additive identity, needed by the shortest-path routines to seed the source's distance at
/// zero without requiring callers to hand one in explicitly.
pub trait Zero {
    fn zero() -> Self;
}

macro_rules! impl_zero {
    ($($t:ty),*) => {
        $(impl Zero for $t {
            fn zero() -> Self { 0 as $t }
        })*
    };
}
impl_zero!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    fn weighted_sample() -> (Graph<&'static str, ()>, RobinHoodMap<&'static str, VertexHandle>, RobinHoodMap<EdgeHandle, u32>) {
        let mut g: Graph<&str, ()> = Graph::new();
        let mut h: RobinHoodMap<&str, VertexHandle> = RobinHoodMap::new();
        for k in ["s", "a", "b", "t"] {
            h.put(k, g.add_vertex(k));
        }
        let mut w: RobinHoodMap<EdgeHandle, u32> = RobinHoodMap::new();
        let mut add = |g: &mut Graph<&str, ()>, from: &str, to: &str, weight: u32| {
            let e = g.add_edge(*h.get(&from).unwrap(), *h.get(&to).unwrap()).unwrap();
            w.put(e, weight);
        };
        add(&mut g, "s", "a", 1);
        add(&mut g, "s", "b", 4);
        add(&mut g, "a", "b", 2);
        add(&mut g, "a", "t", 6);
        add(&mut g, "b", "t", 1);
        (g, h, w)
    }

    #[test]
    fn dijkstra_finds_shortest_distances() {
        let (g, h, w) = weighted_sample();
        let sp = g.dijkstra(*h.get(&"s").unwrap(), |e| *w.get(&e).unwrap());
        assert_eq!(sp.dist_to(*h.get(&"a").unwrap()), Some(1));
        assert_eq!(sp.dist_to(*h.get(&"b").unwrap()), Some(3));
        assert_eq!(sp.dist_to(*h.get(&"t").unwrap()), Some(4));
    }

    #[test]
    fn dag_shortest_path_matches_dijkstra_on_an_acyclic_graph() {
        let (g, h, w) = weighted_sample();
        let sp = g.dag_shortest_path(*h.get(&"s").unwrap(), |e| *w.get(&e).unwrap()).unwrap();
        assert_eq!(sp.dist_to(*h.get(&"t").unwrap()), Some(4));
    }

    #[test]
    fn bellman_ford_handles_negative_weights() {
        let mut g: Graph<i32, ()> = Graph::new();
        let v: Vec<_> = (0..4).map(|i| g.add_vertex(i)).collect();
        let mut w: RobinHoodMap<EdgeHandle, i32> = RobinHoodMap::new();
        w.put(g.add_edge(v[0], v[1]).unwrap(), 4);
        w.put(g.add_edge(v[0], v[2]).unwrap(), 5);
        w.put(g.add_edge(v[1], v[3]).unwrap(), -3);
        w.put(g.add_edge(v[2], v[3]).unwrap(), 2);
        let sp = g.bellman_ford(v[0], |e| *w.get(&e).unwrap()).unwrap();
        assert_eq!(sp.dist_to(v[3]), Some(1));
    }

    #[test]
    fn bellman_ford_detects_a_negative_cycle() {
        let mut g: Graph<i32, ()> = Graph::new();
        let v: Vec<_> = (0..3).map(|i| g.add_vertex(i)).collect();
        let mut w: RobinHoodMap<EdgeHandle, i32> = RobinHoodMap::new();
        w.put(g.add_edge(v[0], v[1]).unwrap(), 1);
        w.put(g.add_edge(v[1], v[2]).unwrap(), -5);
        w.put(g.add_edge(v[2], v[0]).unwrap(), 1);
        assert!(g.bellman_ford(v[0], |e| *w.get(&e).unwrap()).is_err());
    }
}
