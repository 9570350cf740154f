//! Balanced ordered key-value maps: AVL, red-black, weak-AVL, and B-tree.
//!
//! The three binary-shaped families share the node/rotation/traversal substrate in `arena`
//! (private to this module); the B-tree is structurally a different shape (multiway pages) and
//! stands alone. All four expose the same order-statistics contract (`select_by_rank`,
//! `range_query`, predecessor/successor, pre/in/post-order traversal) per distilled spec.md §4.3.

mod arena;

pub mod avl;
pub mod btree;
pub mod redblack;
pub mod weak_avl;

pub use avl::AvlTree;
pub use btree::BTree;
pub use redblack::RedBlackTree;
pub use weak_avl::WavlTree;
