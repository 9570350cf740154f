//! Connectivity: weakly-connected components, strongly-connected components (Tarjan and
//! Kosaraju), biconnectivity (articulation points and bridges), and the bipartite test.
//!
//! Per distilled spec.md §9's open-question resolution, `is_bipartite` and `bipartite_set` are
//! merged into the single two-coloring routine below rather than kept as two separate calls that
//! would otherwise redundantly re-walk the graph.

use super::model::Graph;
use crate::hash::RobinHoodMap;
use crate::queue::ResizingQueue;
use crate::stack::VecStack;
use crate::VertexHandle;
use std::hash::Hash;

/// The result of [`Graph::bcc`]: the biconnected components (each as its own subgraph sharing
/// attribute storage with the source), the articulation points, and the bridges, all computed in
/// one DFS per distilled spec.md §4.6's biconnectivity paragraph.
pub struct Biconnectivity<K, V> {
    pub components: Vec<Graph<K, V>>,
    pub articulation_points: Vec<VertexHandle>,
    pub bridges: Vec<(VertexHandle, VertexHandle)>,
}

impl<K: Eq + Hash + Clone, V: Clone> Graph<K, V> {
    // Vertex adjacency with direction ignored, used by every algorithm in this file that is
    // classically defined over undirected graphs (cc, bcc, bipartite). Duplicates (e.g. a mutual
    // pair of directed edges) are harmless for a visited-set walk.
    pub(crate) fn undirected_neighbors(&self, v: VertexHandle) -> Vec<VertexHandle> {
        let mut out: Vec<VertexHandle> = self.out_neighbors(v).to_vec();
        out.extend_from_slice(self.in_neighbors(v));
        out
    }

    fn induced_subgraph(&self, members: &[VertexHandle]) -> Graph<K, V> {
        let mut sub = Graph::new();
        let mut mapped: RobinHoodMap<VertexHandle, VertexHandle> = RobinHoodMap::new();
        for &v in members {
            let tv = sub.add_vertex(self.vertex_key(v).clone());
            self.copy_attrs_vertex(v, &mut sub, tv);
            mapped.put(v, tv);
        }
        for &v in members {
            for &e in self.out_edges(v) {
                let (_, dst) = self.edge_endpoints(e);
                if let Some(&tdst) = mapped.get(&dst) {
                    let tv = *mapped.get(&v).unwrap();
                    sub.add_edge(tv, tdst);
                }
            }
        }
        sub
    }

    /// Weakly-connected components: each edge direction is ignored for the purpose of grouping
    /// vertices, but the directed edges between members of the same component are preserved in
    /// the returned subgraph.
    pub fn cc(&self) -> Vec<Graph<K, V>> {
        let mut visited = vec![false; self.vertices.len()];
        let mut components = Vec::new();
        for &start in &self.vertex_seq {
            if visited[start.0] {
                continue;
            }
            let mut members = Vec::new();
            let mut frontier: ResizingQueue<VertexHandle> = ResizingQueue::new();
            visited[start.0] = true;
            frontier.enqueue(start);
            while let Some(v) = frontier.dequeue() {
                members.push(v);
                for w in self.undirected_neighbors(v) {
                    if !visited[w.0] {
                        visited[w.0] = true;
                        frontier.enqueue(w);
                    }
                }
            }
            components.push(self.induced_subgraph(&members));
        }
        components
    }

    /// Strongly-connected components via Tarjan's single-pass algorithm: an iterative DFS
    /// maintaining discovery index and low-link per vertex, with an explicit stack of vertices
    /// still awaiting component assignment.
    pub fn tscc(&self) -> Vec<Graph<K, V>> {
        let n = self.vertices.len();
        let mut index: Vec<Option<usize>> = vec![None; n];
        let mut lowlink: Vec<usize> = vec![0; n];
        let mut on_sct_stack = vec![false; n];
        let mut sct_stack: Vec<VertexHandle> = Vec::new();
        let mut next_index = 0usize;
        let mut components: Vec<Graph<K, V>> = Vec::new();

        // Each DFS cursor frame is (vertex, index-into-out-neighbors-to-try-next).
        let mut cursor_stack: VecStack<(VertexHandle, usize)> = VecStack::new();

        for &root in &self.vertex_seq {
            if index[root.0].is_some() {
                continue;
            }
            cursor_stack.push((root, 0));
            index[root.0] = Some(next_index);
            lowlink[root.0] = next_index;
            next_index += 1;
            sct_stack.push(root);
            on_sct_stack[root.0] = true;

            while let Some((v, mut i)) = cursor_stack.pop() {
                let neighbors = self.out_neighbors(v);
                let mut descended = false;
                while i < neighbors.len() {
                    let w = neighbors[i];
                    i += 1;
                    if index[w.0].is_none() {
                        index[w.0] = Some(next_index);
                        lowlink[w.0] = next_index;
                        next_index += 1;
                        sct_stack.push(w);
                        on_sct_stack[w.0] = true;
                        cursor_stack.push((v, i));
                        cursor_stack.push((w, 0));
                        descended = true;
                        break;
                    } else if on_sct_stack[w.0] {
                        lowlink[v.0] = lowlink[v.0].min(index[w.0].unwrap());
                    }
                }
                if descended {
                    continue;
                }
                // Finished exploring `v`: propagate its low-link up to its parent (the frame now
                // on top of `cursor_stack`, if any), and pop a component if `v` is a root.
                if let Some(&(parent, _)) = cursor_stack.peek() {
                    lowlink[parent.0] = lowlink[parent.0].min(lowlink[v.0]);
                }
                if lowlink[v.0] == index[v.0].unwrap() {
                    let mut members = Vec::new();
                    loop {
                        let w = sct_stack.pop().expect("scc root must be on its own stack");
                        on_sct_stack[w.0] = false;
                        members.push(w);
                        if w == v {
                            break;
                        }
                    }
                    components.push(self.induced_subgraph(&members));
                }
            }
        }
        components
    }

    /// Returns a new graph with every edge reversed, sharing (not copying) vertex/edge attribute
    /// storage with this graph. Grounded on `r2_graph_transpose`, which rebuilds the edge list with
    /// endpoints swapped and re-attaches each vertex's/edge's existing attribute table to the
    /// result rather than duplicating it.
    pub fn transpose(&self) -> Graph<K, V> {
        let mut rev = Graph::new();
        let mut mapped: RobinHoodMap<VertexHandle, VertexHandle> = RobinHoodMap::new();
        for &v in &self.vertex_seq {
            let tv = rev.add_vertex(self.vertex_key(v).clone());
            self.copy_attrs_vertex(v, &mut rev, tv);
            mapped.put(v, tv);
        }
        for &e in &self.edge_seq {
            let (src, dst) = self.edge_endpoints(e);
            let tsrc = *mapped.get(&src).unwrap();
            let tdst = *mapped.get(&dst).unwrap();
            if let Some(te) = rev.add_edge(tdst, tsrc) {
                self.copy_attrs_edge(e, &mut rev, te);
            }
        }
        rev
    }

    /// Strongly-connected components via Kosaraju's two-pass algorithm: a DFS postorder of the
    /// graph, then a DFS of the transposed graph processed in that postorder, each reverse-DFS
    /// tree forming one component.
    pub fn kcc(&self) -> Vec<Graph<K, V>> {
        let mut visited = vec![false; self.vertices.len()];
        let mut postorder = Vec::with_capacity(self.vertex_seq.len());
        let mut cursor_stack: VecStack<(VertexHandle, usize)> = VecStack::new();
        for &root in &self.vertex_seq {
            if visited[root.0] {
                continue;
            }
            visited[root.0] = true;
            cursor_stack.push((root, 0));
            while let Some((v, mut i)) = cursor_stack.pop() {
                let neighbors = self.out_neighbors(v);
                let mut descended = false;
                while i < neighbors.len() {
                    let w = neighbors[i];
                    i += 1;
                    if !visited[w.0] {
                        visited[w.0] = true;
                        cursor_stack.push((v, i));
                        cursor_stack.push((w, 0));
                        descended = true;
                        break;
                    }
                }
                if !descended {
                    postorder.push(v);
                }
            }
        }

        // `transpose()` builds its own vertex arena, so its handles don't line up numerically with
        // `self`'s; cross between the two graphs by vertex key, the same way `r2_graph_transpose`'s
        // caller re-fetches each vertex from the transposed graph via `r2_graph_get_vertex`.
        let transposed = self.transpose();
        let mut self_to_t: RobinHoodMap<VertexHandle, VertexHandle> = RobinHoodMap::new();
        let mut t_to_self: RobinHoodMap<VertexHandle, VertexHandle> = RobinHoodMap::new();
        for &v in &self.vertex_seq {
            let tv = transposed.get_vertex(self.vertex_key(v)).unwrap();
            self_to_t.put(v, tv);
            t_to_self.put(tv, v);
        }

        let mut visited_rev = vec![false; self.vertices.len()];
        let mut components = Vec::new();
        for &start in postorder.iter().rev() {
            if visited_rev[start.0] {
                continue;
            }
            let mut members = Vec::new();
            let mut frontier: ResizingQueue<VertexHandle> = ResizingQueue::new();
            visited_rev[start.0] = true;
            frontier.enqueue(start);
            while let Some(v) = frontier.dequeue() {
                members.push(v);
                let vt = *self_to_t.get(&v).unwrap();
                for &wt in transposed.out_neighbors(vt) {
                    let w = *t_to_self.get(&wt).unwrap();
                    if !visited_rev[w.0] {
                        visited_rev[w.0] = true;
                        frontier.enqueue(w);
                    }
                }
            }
            components.push(self.induced_subgraph(&members));
        }
        components
    }

    /// Biconnected components, articulation points, and bridges, computed with one undirected DFS
    /// tracking discovery order and low-link, per the classical Hopcroft-Tarjan algorithm.
    pub fn bcc(&self) -> Biconnectivity<K, V> {
        let n = self.vertices.len();
        let mut disc: Vec<Option<usize>> = vec![None; n];
        let mut low: Vec<usize> = vec![0; n];
        // The DFS-tree parent, set once and never mutated (distinct from `skipped_parent_edge`,
        // which tracks whether we've already stepped over the one neighbor-list occurrence of the
        // edge back to that parent).
        let mut true_parent: Vec<Option<VertexHandle>> = vec![None; n];
        let mut skipped_parent_edge = vec![false; n];
        let mut child_count_of_root: Vec<usize> = vec![0; n];
        let mut is_articulation = vec![false; n];
        let mut bridges = Vec::new();
        let mut edge_stack: Vec<(VertexHandle, VertexHandle)> = Vec::new();
        let mut components = Vec::new();
        let mut next_disc = 0usize;

        let mut cursor_stack: VecStack<(VertexHandle, usize)> = VecStack::new();

        for &root in &self.vertex_seq {
            if disc[root.0].is_some() {
                continue;
            }
            disc[root.0] = Some(next_disc);
            low[root.0] = next_disc;
            next_disc += 1;
            cursor_stack.push((root, 0));

            while let Some((v, mut i)) = cursor_stack.pop() {
                let neighbors = self.undirected_neighbors(v);
                let mut descended = false;
                while i < neighbors.len() {
                    let w = neighbors[i];
                    i += 1;
                    if Some(w) == true_parent[v.0] && !skipped_parent_edge[v.0] {
                        // Skip exactly one occurrence of the parent edge, so a genuine parallel
                        // edge back to the parent is still followed.
                        skipped_parent_edge[v.0] = true;
                        continue;
                    }
                    if disc[w.0].is_none() {
                        true_parent[w.0] = Some(v);
                        if v == root {
                            child_count_of_root[root.0] += 1;
                        }
                        disc[w.0] = Some(next_disc);
                        low[w.0] = next_disc;
                        next_disc += 1;
                        edge_stack.push((v, w));
                        cursor_stack.push((v, i));
                        cursor_stack.push((w, 0));
                        descended = true;
                        break;
                    } else if disc[w.0].unwrap() < disc[v.0].unwrap() {
                        low[v.0] = low[v.0].min(disc[w.0].unwrap());
                        edge_stack.push((v, w));
                    }
                }
                if descended {
                    continue;
                }
                if let Some(p) = true_parent[v.0] {
                    low[p.0] = low[p.0].min(low[v.0]);
                    let p_is_root = p == root && true_parent[p.0].is_none();
                    if (p_is_root && child_count_of_root[root.0] > 1) || (!p_is_root && low[v.0] >= disc[p.0].unwrap()) {
                        is_articulation[p.0] = true;
                    }
                    if low[v.0] > disc[p.0].unwrap() {
                        bridges.push((p, v));
                    }
                    if low[v.0] >= disc[p.0].unwrap() {
                        let mut members_set = Vec::new();
                        while let Some(&top) = edge_stack.last() {
                            if top == (p, v) {
                                edge_stack.pop();
                                members_set.push(top.0);
                                members_set.push(top.1);
                                break;
                            }
                            edge_stack.pop();
                            members_set.push(top.0);
                            members_set.push(top.1);
                        }
                        members_set.sort_by_key(|h| h.0);
                        members_set.dedup();
                        components.push(self.induced_subgraph(&members_set));
                    }
                }
            }
        }

        let mut articulation_points: Vec<VertexHandle> = self
            .vertex_seq
            .iter()
            .copied()
            .filter(|v| is_articulation[v.0])
            .collect();
        articulation_points.sort_by_key(|h| h.0);
        Biconnectivity {
            components,
            articulation_points,
            bridges,
        }
    }

    /// Two-colors the graph (treating edges as undirected). Returns the coloring if the graph is
    /// bipartite, `None` otherwise.
    pub fn bipartite_coloring(&self) -> Option<RobinHoodMap<VertexHandle, bool>> {
        let mut color: RobinHoodMap<VertexHandle, bool> = RobinHoodMap::new();
        for &start in &self.vertex_seq {
            if color.contains_key(&start) {
                continue;
            }
            color.put(start, false);
            let mut frontier: ResizingQueue<VertexHandle> = ResizingQueue::new();
            frontier.enqueue(start);
            while let Some(v) = frontier.dequeue() {
                let v_color = *color.get(&v).unwrap();
                for w in self.undirected_neighbors(v) {
                    match color.get(&w).copied() {
                        None => {
                            color.put(w, !v_color);
                            frontier.enqueue(w);
                        }
                        Some(c) if c == v_color => return None,
                        Some(_) => {}
                    }
                }
            }
        }
        Some(color)
    }

    /// Is this graph bipartite (treating edges as undirected)?
    pub fn is_bipartite(&self) -> bool {
        self.bipartite_coloring().is_some()
    }

    /// Returns every vertex of the given color class, or `None` if the graph isn't bipartite.
    pub fn bipartite_set(&self, class: bool) -> Option<Vec<VertexHandle>> {
        let coloring = self.bipartite_coloring()?;
        Some(
            self.vertex_seq
                .iter()
                .copied()
                .filter(|v| *coloring.get(v).unwrap() == class)
                .collect(),
        )
    }

    /// Transitive closure: a new graph over the same vertex keys, with an edge `u -> v` wherever
    /// `v` is reachable from `u` in the original graph (one BFS per vertex).
    pub fn transitive_closure(&self) -> Graph<K, V> {
        let mut closure = Graph::new();
        let mut mapped: RobinHoodMap<VertexHandle, VertexHandle> = RobinHoodMap::new();
        for &v in &self.vertex_seq {
            let tv = closure.add_vertex(self.vertex_key(v).clone());
            self.copy_attrs_vertex(v, &mut closure, tv);
            mapped.put(v, tv);
        }
        for &v in &self.vertex_seq {
            let tv = *mapped.get(&v).unwrap();
            for w in self.bfs(v) {
                if w != v {
                    let tw = *mapped.get(&w).unwrap();
                    closure.add_edge(tv, tw);
                }
            }
        }
        closure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weakly_connected_components_split_disjoint_parts() {
        let mut g: Graph<i32, ()> = Graph::new();
        let v: Vec<_> = (0..6).map(|i| g.add_vertex(i)).collect();
        g.add_edge(v[0], v[1]);
        g.add_edge(v[1], v[2]);
        g.add_edge(v[3], v[4]);
        let comps = g.cc();
        let mut sizes: Vec<usize> = comps.iter().map(|c| c.vertex_count()).collect();
        sizes.sort();
        assert_eq!(sizes, vec![1, 2, 3]);
    }

    // The literal scenario from distilled spec.md §8: a -> b, b -> c, c -> d, d -> c, d -> h,
    // h -> h, c -> g, g -> f, f -> g, e -> a, e -> f, b -> e, g -> h, which must produce exactly
    // the strongly-connected components {h}, {g, f}, {c, d}, {a, b, e}.
    fn tarjan_fixture() -> (Graph<&'static str, ()>, RobinHoodMap<&'static str, VertexHandle>) {
        let mut g: Graph<&str, ()> = Graph::new();
        let mut h: RobinHoodMap<&str, VertexHandle> = RobinHoodMap::new();
        for k in ["a", "b", "c", "d", "e", "f", "g", "h"] {
            h.put(k, g.add_vertex(k));
        }
        let edges = [
            ("a", "b"),
            ("b", "c"),
            ("c", "d"),
            ("d", "c"),
            ("d", "h"),
            ("h", "h"),
            ("c", "g"),
            ("g", "f"),
            ("f", "g"),
            ("e", "a"),
            ("e", "f"),
            ("b", "e"),
            ("g", "h"),
        ];
        for (s, d) in edges {
            g.add_edge(*h.get(&s).unwrap(), *h.get(&d).unwrap());
        }
        (g, h)
    }

    fn scc_key_sets<K: Eq + Hash + Clone + Ord + std::fmt::Debug, V>(comps: &[Graph<K, V>]) -> Vec<Vec<K>> {
        let mut out: Vec<Vec<K>> = comps
            .iter()
            .map(|c| {
                let mut keys: Vec<K> = c.vertices().iter().map(|&v| c.vertex_key(v).clone()).collect();
                keys.sort();
                keys
            })
            .collect();
        out.sort();
        out
    }

    #[test]
    fn tarjan_scc_matches_the_textbook_fixture() {
        let (g, _) = tarjan_fixture();
        let comps = g.tscc();
        let mut expected = vec![
            vec!["h"],
            vec!["f", "g"],
            vec!["c", "d"],
            vec!["a", "b", "e"],
        ];
        expected.sort();
        assert_eq!(scc_key_sets(&comps), expected);
    }

    #[test]
    fn kosaraju_scc_matches_the_textbook_fixture() {
        let (g, _) = tarjan_fixture();
        let comps = g.kcc();
        let mut expected = vec![
            vec!["h"],
            vec!["f", "g"],
            vec!["c", "d"],
            vec!["a", "b", "e"],
        ];
        expected.sort();
        assert_eq!(scc_key_sets(&comps), expected);
    }

    #[test]
    fn bcc_finds_articulation_point_and_bridge_in_a_barbell() {
        // Two triangles joined by a single bridging vertex pair: 0-1-2-0, 2-3, 3-4-5-3.
        let mut g: Graph<i32, ()> = Graph::new();
        let v: Vec<_> = (0..6).map(|i| g.add_vertex(i)).collect();
        g.add_edge(v[0], v[1]);
        g.add_edge(v[1], v[2]);
        g.add_edge(v[2], v[0]);
        g.add_edge(v[2], v[3]);
        g.add_edge(v[3], v[4]);
        g.add_edge(v[4], v[5]);
        g.add_edge(v[5], v[3]);
        let result = g.bcc();
        assert_eq!(result.bridges.len(), 1);
        assert!(result.articulation_points.contains(&v[2]) || result.articulation_points.contains(&v[3]));
        assert_eq!(result.components.len(), 3);
    }

    #[test]
    fn transpose_reverses_every_edge() {
        let mut g: Graph<i32, ()> = Graph::new();
        let v: Vec<_> = (0..3).map(|i| g.add_vertex(i)).collect();
        g.add_edge(v[0], v[1]);
        g.add_edge(v[1], v[2]);
        let t = g.transpose();
        assert_eq!(t.vertex_count(), 3);
        assert_eq!(t.edge_count(), 2);
        let find = |k: i32| t.vertices().iter().copied().find(|&h| *t.vertex_key(h) == k).unwrap();
        assert!(t.get_edge(find(1), &0).is_some());
        assert!(t.get_edge(find(2), &1).is_some());
        assert!(t.get_edge(find(0), &1).is_none());
    }

    #[test]
    fn transpose_of_transpose_is_isomorphic_to_the_original() {
        let mut g: Graph<i32, i32> = Graph::new();
        let v: Vec<_> = (0..4).map(|i| g.add_vertex(i)).collect();
        g.add_edge(v[0], v[1]);
        g.add_edge(v[1], v[2]);
        g.add_edge(v[2], v[3]);
        g.add_edge(v[3], v[0]);
        g.put_vertex_attr(v[0], "color", 7);
        g.put_attr("note", 99);

        let back = g.transpose().transpose();
        assert_eq!(back.vertex_count(), g.vertex_count());
        assert_eq!(back.edge_count(), g.edge_count());
        for &src in g.vertices() {
            let key = *g.vertex_key(src);
            let mapped_src = back.vertices().iter().copied().find(|&h| *back.vertex_key(h) == key).unwrap();
            for &dst_key in &[0, 1, 2, 3] {
                let original_has = g.get_edge(src, &dst_key).is_some();
                let back_has = back.get_edge(mapped_src, &dst_key).is_some();
                assert_eq!(original_has, back_has);
            }
        }
        assert_eq!(back.get_attr("note"), g.get_attr("note"));
        let mapped_v0 = back.vertices().iter().copied().find(|&h| *back.vertex_key(h) == 0).unwrap();
        assert_eq!(back.get_vertex_attr(mapped_v0, "color"), g.get_vertex_attr(v[0], "color"));
    }

    #[test]
    fn bipartite_set_returns_each_color_class() {
        let mut square: Graph<i32, ()> = Graph::new();
        let v: Vec<_> = (0..4).map(|i| square.add_vertex(i)).collect();
        square.add_edge(v[0], v[1]);
        square.add_edge(v[1], v[2]);
        square.add_edge(v[2], v[3]);
        square.add_edge(v[3], v[0]);
        let mut class_false: Vec<i32> = square
            .bipartite_set(false)
            .unwrap()
            .iter()
            .map(|&h| *square.vertex_key(h))
            .collect();
        class_false.sort();
        let mut class_true: Vec<i32> = square
            .bipartite_set(true)
            .unwrap()
            .iter()
            .map(|&h| *square.vertex_key(h))
            .collect();
        class_true.sort();
        assert_eq!(class_false, vec![0, 2]);
        assert_eq!(class_true, vec![1, 3]);

        let mut triangle: Graph<i32, ()> = Graph::new();
        let t: Vec<_> = (0..3).map(|i| triangle.add_vertex(i)).collect();
        triangle.add_edge(t[0], t[1]);
        triangle.add_edge(t[1], t[2]);
        triangle.add_edge(t[2], t[0]);
        assert!(triangle.bipartite_set(false).is_none());
    }

    #[test]
    fn transitive_closure_adds_edge_for_every_reachable_pair() {
        let mut g: Graph<i32, ()> = Graph::new();
        let v: Vec<_> = (0..3).map(|i| g.add_vertex(i)).collect();
        g.add_edge(v[0], v[1]);
        g.add_edge(v[1], v[2]);
        let closure = g.transitive_closure();
        let t: Vec<_> = closure.vertices().to_vec();
        let find = |k: i32| t.iter().copied().find(|&h| *closure.vertex_key(h) == k).unwrap();
        assert!(closure.get_edge(find(0), &1).is_some());
        assert!(closure.get_edge(find(0), &2).is_some());
        assert!(closure.get_edge(find(1), &2).is_some());
        assert!(closure.get_edge(find(2), &0).is_none());
    }

    #[test]
    fn bipartite_square_is_bipartite_triangle_is_not() {
        let mut square: Graph<i32, ()> = Graph::new();
        let v: Vec<_> = (0..4).map(|i| square.add_vertex(i)).collect();
        square.add_edge(v[0], v[1]);
        square.add_edge(v[1], v[2]);
        square.add_edge(v[2], v[3]);
        square.add_edge(v[3], v[0]);
        assert!(square.is_bipartite());

        let mut triangle: Graph<i32, ()> = Graph::new();
        let t: Vec<_> = (0..3).map(|i| triangle.add_vertex(i)).collect();
        triangle.add_edge(t[0], t[1]);
        triangle.add_edge(t[1], t[2]);
        triangle.add_edge(t[2], t[0]);
        assert!(!triangle.is_bipartite());
    }
}
