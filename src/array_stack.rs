//! A fixed-capacity (non-resizing) stack.
//!
//! Grounded on `original_source/src/r2_arrstack.c`, a fixed-length array stack distinct from the
//! resizing `VecStack`: pushing past the configured capacity is reported as a
//! [`Algs4Error::Capacity`] rather than growing the backing store.

use crate::error::Algs4Error;

/// The `ArrayStack` struct represents a last-in-first-out (LIFO) stack of generic items backed by
/// a fixed-capacity array.  Unlike [`crate::VecStack`], it never reallocates: `push` past capacity
/// fails instead of growing.
pub struct ArrayStack<T> {
    data: Vec<T>,
    capacity: usize,
}

impl<T> ArrayStack<T> {
    /// Initializes an empty stack with the given fixed capacity.
    pub fn new(capacity: usize) -> Self {
        ArrayStack {
            data: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Is this stack empty?
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Is this stack at capacity?
    pub fn is_full(&self) -> bool {
        self.data.len() == self.capacity
    }

    /// Returns the number of items in this stack.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns the fixed capacity of this stack.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Adds the item to this stack.
    ///
    /// Fails with [`Algs4Error::Capacity`] if the stack is already at capacity, leaving the stack
    /// unchanged.
    pub fn push(&mut self, item: T) -> Result<(), Algs4Error> {
        if self.is_full() {
            return Err(Algs4Error::Capacity(format!(
                "array stack overflow: capacity {} exceeded",
                self.capacity
            )));
        }
        self.data.push(item);
        Ok(())
    }

    /// Removes and returns the item most recently added to this stack, or `None` if the stack is
    /// empty.
    pub fn pop(&mut self) -> Option<T> {
        self.data.pop()
    }

    /// Returns (but does not remove) the item most recently added to this stack.
    pub fn peek(&self) -> Option<&T> {
        self.data.last()
    }

    /// Returns an iterator that iterates over the items in this stack in LIFO order.
    pub fn iter(&self) -> std::iter::Rev<std::slice::Iter<'_, T>> {
        self.data.iter().rev()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_basics() {
        let mut st = ArrayStack::new(3);
        st.push(1).unwrap();
        st.push(2).unwrap();
        assert_eq!(st.peek(), Some(&2));
        assert_eq!(st.pop(), Some(2));
        assert_eq!(st.len(), 1);
    }

    #[test]
    fn push_past_capacity_fails_without_mutating() {
        let mut st = ArrayStack::new(2);
        st.push(1).unwrap();
        st.push(2).unwrap();
        assert!(st.is_full());
        assert!(st.push(3).is_err());
        assert_eq!(st.len(), 2);
        assert_eq!(st.iter().collect::<Vec<_>>(), vec![&2, &1]);
    }
}
