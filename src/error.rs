//! Error types for graph loading and for the column-generation engine.

use std::io;

use crate::lp::LpStatus;

/// Raised while reading a graph file.
///
/// Malformed edge lines are not errors (they are skipped with a warning); only
/// conditions that leave no usable graph are reported here.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file is missing or unreadable.
    #[error("could not read graph file: {0}")]
    Io(#[from] io::Error),

    /// No well-formed `p edge N M` line was found.
    #[error("no `p edge N M` problem line found")]
    MissingProblemLine,

    /// The problem line declares more vertices than the dense adjacency
    /// representation supports.
    #[error("graph declares {declared} vertices, more than the supported {max}")]
    TooManyVertices { declared: usize, max: usize },

    /// The packed adjacency matrix ends before the upper triangle is complete.
    #[error("packed adjacency matrix truncated: expected {expected} bytes, found {found}")]
    TruncatedBitMatrix { expected: usize, found: usize },
}

/// Raised by the restricted master problem and the driver.
#[derive(Debug, thiserror::Error)]
pub enum SolveError {
    /// The initial columns leave a vertex without a cover.
    #[error("initial columns do not cover vertex {0}")]
    UncoveredVertex(usize),

    /// A column names a vertex that is not in the graph.
    #[error("vertex {vertex} out of range for a graph with {num_vertices} vertices")]
    VertexOutOfRange { vertex: usize, num_vertices: usize },

    /// A column contains two adjacent vertices.
    #[error("column {0:?} is not a stable set")]
    NotStable(Vec<usize>),

    /// The LP relaxation stayed non-optimal after a clean rebuild.
    #[error("LP relaxation not solved to optimality (status: {0})")]
    LpNotOptimal(LpStatus),

    /// The LP backend failed outright.
    #[error("LP backend error: {0}")]
    Backend(String),
}
