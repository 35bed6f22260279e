//! Immutable adjacency structure of the graph being colored.
//!
//! Vertices are the integers `0..n`. Each vertex stores its neighborhood as a
//! [`BitSet`], so membership tests are O(1) and neighborhood reductions in the
//! pricing searches are word-parallel intersections and differences.

use bit_set::BitSet;
use petgraph::{dot::Dot, graph::UnGraph};

/// A simple, loopless, undirected graph with bitset adjacency rows.
#[derive(Debug, Clone)]
pub struct ColGraph {
    adjacency: Vec<BitSet>,
}

impl ColGraph {
    /// Construct a graph with `n` isolated vertices.
    pub fn new(n: usize) -> Self {
        Self {
            adjacency: (0..n).map(|_| BitSet::with_capacity(n)).collect(),
        }
    }

    /// Construct a graph on `n` vertices from 0-based edges. Self-loops and
    /// endpoints outside `0..n` are ignored; duplicate edges collapse.
    pub fn from_edges(n: usize, edges: impl IntoIterator<Item = (usize, usize)>) -> Self {
        let mut graph = Self::new(n);
        for (u, v) in edges {
            graph.add_edge(u, v);
        }
        graph
    }

    /// Insert the undirected edge `{u, v}`. Returns `false` if the edge was
    /// rejected (self-loop or out of range) or already present.
    pub(crate) fn add_edge(&mut self, u: usize, v: usize) -> bool {
        if u == v || u >= self.len() || v >= self.len() {
            return false;
        }
        let fresh = self.adjacency[u].insert(v);
        self.adjacency[v].insert(u);
        fresh
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Number of (undirected) edges.
    pub fn num_edges(&self) -> usize {
        self.adjacency.iter().map(|row| row.len()).sum::<usize>() / 2
    }

    /// Edge density `2m / (n (n - 1))`; zero for graphs with fewer than two
    /// vertices.
    pub fn density(&self) -> f64 {
        let n = self.len();
        if n < 2 {
            return 0.0;
        }
        (2 * self.num_edges()) as f64 / (n * (n - 1)) as f64
    }

    /// The neighborhood of `v`.
    pub fn neighbors(&self, v: usize) -> &BitSet {
        &self.adjacency[v]
    }

    pub fn degree(&self, v: usize) -> usize {
        self.adjacency[v].len()
    }

    pub fn are_adjacent(&self, u: usize, v: usize) -> bool {
        self.adjacency[u].contains(v)
    }

    /// Return `true` iff no two of `vertices` are adjacent.
    pub fn is_stable(&self, vertices: &[usize]) -> bool {
        vertices.iter().enumerate().all(|(i, &u)| {
            vertices[i + 1..]
                .iter()
                .all(|&v| u != v && !self.are_adjacent(u, v))
        })
    }

    /// Return `true` iff `v` has no neighbor in `set`.
    pub fn is_compatible(&self, v: usize, set: &BitSet) -> bool {
        self.adjacency[v].is_disjoint(set)
    }

    /// Iterate over all edges `(u, v)` with `u < v`.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(u, row)| row.iter().filter(move |&v| v > u).map(move |v| (u, v)))
    }

    /// Convert to a `petgraph` undirected graph whose node weights are the
    /// vertex ids.
    pub fn to_petgraph(&self) -> UnGraph<usize, ()> {
        let mut g = UnGraph::with_capacity(self.len(), self.num_edges());
        let nodes: Vec<_> = (0..self.len()).map(|v| g.add_node(v)).collect();
        for (u, v) in self.edges() {
            g.add_edge(nodes[u], nodes[v], ());
        }
        g
    }

    /// Return a pretty-printable (Graphviz) representation of this graph.
    pub fn info(&self) -> String {
        let g = self.to_petgraph();
        let dot = Dot::new(&g);
        format!("{dot:?}")
    }
}
