//! A directed property graph: vertices and edges keyed/attributed generically, with the classical
//! suite of graph algorithms (traversal, connectivity, shortest paths, spanning trees) built on
//! top of it.
//!
//! The data model (`model`) owns the arena and the bookkeeping needed for O(1) coherent edge
//! removal; the algorithm families (`traverse`, `connectivity`, `shortest_paths`, `mst`) are each
//! their own `impl<K, V> Graph<K, V>` block in a separate file, the same way `crate::tree`'s
//! families each get their own module, rather than one file holding the whole suite.

mod connectivity;
mod model;
mod mst;
mod shortest_paths;
mod traverse;

pub use connectivity::Biconnectivity;
pub use model::{EdgeHandle, Graph, VertexHandle};
pub use shortest_paths::{ShortestPaths, Zero};
