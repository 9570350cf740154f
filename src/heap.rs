//! Binary heaps: the simple array-backed `MaxPQ`/`MinPQ` priority queues, `heap_sort`, and
//! [`LocatorHeap`], a priority queue whose entries carry a stable handle permitting O(log n)
//! `adjust`/`remove` of arbitrary elements (used by the graph engine's Dijkstra and Prim).

pub mod locator;
pub mod maxpq;
pub mod minpq;
pub mod sort;

pub use locator::*;
pub use maxpq::*;
pub use minpq::*;
pub use sort::*;
