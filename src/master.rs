//! The restricted master problem: minimize the number of stable-set columns
//! used, fractionally, subject to every vertex being covered at least once.
//!
//! The column pool is append-only. The numeric work is delegated to an
//! [`LpSolver`]; the master keeps its own copy of the pool so the solver can
//! be rebuilt from scratch if it ever misbehaves.

use bit_set::BitSet;

use crate::{
    column::Column,
    error::SolveError,
    lp::{HighsSolver, LpSolution, LpSolver},
};

pub struct RestrictedMaster<S: LpSolver = HighsSolver> {
    num_vertices: usize,
    columns: Vec<Column>,
    solver: S,
}

impl<S: LpSolver> RestrictedMaster<S> {
    /// Create one cover row per vertex and register `initial` columns, which
    /// must jointly cover every vertex.
    pub fn new(num_vertices: usize, initial: Vec<Column>) -> Result<Self, SolveError> {
        let mut covered = BitSet::with_capacity(num_vertices);
        for column in &initial {
            check_range(column, num_vertices)?;
            covered.extend(column.vertices().iter().copied());
        }
        if let Some(v) = (0..num_vertices).find(|&v| !covered.contains(v)) {
            return Err(SolveError::UncoveredVertex(v));
        }

        let mut master = Self {
            num_vertices,
            columns: Vec::with_capacity(initial.len()),
            solver: S::new(num_vertices),
        };
        for column in initial {
            master.add_column(column)?;
        }
        Ok(master)
    }

    /// Append a column at its [`Column::cost`]. Adding a column equal to an
    /// existing one is allowed but wasteful.
    pub fn add_column(&mut self, column: Column) -> Result<(), SolveError> {
        check_range(&column, self.num_vertices)?;
        self.solver.add_column(column.cost(), column.vertices())?;
        self.columns.push(column);
        Ok(())
    }

    /// Solve the LP relaxation of the current pool. A non-optimal status is
    /// returned as-is; the caller decides whether to trust the duals.
    pub fn solve_relaxation(&mut self) -> Result<LpSolution, SolveError> {
        self.solver.solve()
    }

    /// Replace the solver with a fresh one holding the same rows and columns.
    pub fn rebuild(&mut self) -> Result<(), SolveError> {
        let mut solver = S::new(self.num_vertices);
        for column in &self.columns {
            solver.add_column(column.cost(), column.vertices())?;
        }
        self.solver = solver;
        Ok(())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }
}

fn check_range(column: &Column, num_vertices: usize) -> Result<(), SolveError> {
    match column.vertices().iter().find(|&&v| v >= num_vertices) {
        Some(&vertex) => Err(SolveError::VertexOutOfRange {
            vertex,
            num_vertices,
        }),
        None => Ok(()),
    }
}
