//! First-in-first-out (FIFO) queue of generic items.

pub mod linkedqueue;
pub mod resizingqueue;

pub use linkedqueue::*;
pub use resizingqueue::*;

#[cfg(test)]
mod tests;
