// Graph model and adjacency bitsets
pub mod graph;

// Data IO
pub mod loader;

// Errors
pub mod error;

// Stable-set columns and dual prices
pub mod column;

// Greedy warm-start coloring
pub mod coloring;

// Greedy pricing heuristics and local improvement
pub mod heuristics;

// The hard bit: exact maximum-weight stable set search
pub mod mwss;

// Heuristics, local search, and exact search combined
pub mod pricing;

// LP backend
pub mod lp;

// Restricted master problem
pub mod master;

// The column-generation driver
pub mod colgen;
