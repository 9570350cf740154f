//! Error types of this library.

use std::{error, fmt, io};

/// Error type used throughout this library.
///
/// The taxonomy is deliberately narrow (see the crate's error-handling design): not-found and
/// precondition failures are `Option::None` or `bool`, not an `Err` variant here.  What remains is
/// capacity/allocation failure, structural refusal (a cyclic graph handed to an algorithm that
/// requires acyclicity), and plain invalid arguments.
#[derive(Debug)]
pub enum Algs4Error {
    /// A caller-supplied argument was out of range or otherwise malformed (e.g. an out-of-range
    /// rank, an unknown vertex key, a zero B-tree minimum degree).
    InvalidArgument(String),
    /// Wraps an I/O failure, e.g. while reading a graph from a fixture file.
    IoError(io::Error),
    /// A container could not grow to satisfy the request (e.g. a `RobinHoodMap` capacity that
    /// would overflow `usize` on rehash, or an `ArrayStack` push past its fixed capacity).
    Capacity(String),
    /// Topological sort, or DAG shortest path, was asked to run on a graph that has a cycle.
    Cycle,
    /// Bellman-Ford detected a negative-weight cycle reachable from the source.
    NegativeCycle,
}

impl fmt::Display for Algs4Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algs4Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Algs4Error::IoError(e) => write!(f, "I/O error: {}", e),
            Algs4Error::Capacity(msg) => write!(f, "Capacity error: {}", msg),
            Algs4Error::Cycle => write!(f, "graph has a cycle"),
            Algs4Error::NegativeCycle => write!(f, "graph has a negative-weight cycle"),
        }
    }
}

impl error::Error for Algs4Error {}

/// Convert `io::Error` to `Algs4Error`
impl From<io::Error> for Algs4Error {
    fn from(err: io::Error) -> Self {
        Algs4Error::IoError(err)
    }
}

/// Error type used to indicate an invalid argument
#[derive(Debug)]
pub struct InvalidArgument(pub String);

impl fmt::Display for InvalidArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid argument: {}", self.0)
    }
}

impl error::Error for InvalidArgument {}

/// Convert `InvalidArgument` to `Algs4Error`
impl From<InvalidArgument> for Algs4Error {
    fn from(err: InvalidArgument) -> Self {
        Algs4Error::InvalidArgument(err.0)
    }
}
