//! Column generation for the fractional chromatic number.
//!
//! The driver warm-starts the restricted master problem with a greedy
//! coloring, then alternates LP solves and pricing calls. Each round either
//! adds one stable set with dual weight above `1 + epsilon` or stops. The
//! final LP objective is a lower bound on the chromatic number, and it is the
//! fractional chromatic number whenever pricing is exact (see
//! [`ExactMode::Optimal`](crate::mwss::ExactMode)) and no limit was hit.
//!
//! Everything runs on one thread, strictly in sequence: limits are checked
//! between steps and never interrupt an LP solve or a search.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::{
    coloring,
    column::{Column, DualPrices},
    error::SolveError,
    graph::ColGraph,
    lp::{HighsSolver, LpSolution, LpSolver},
    master::RestrictedMaster,
    pricing::{PricingConfig, PricingOracle, PricingSource},
};

/// Resource limits and pricing tunables for one run.
#[derive(Debug, Clone, Default)]
pub struct ColumnGenerationConfig {
    /// Maximum number of columns to add by pricing.
    pub max_iterations: Option<usize>,
    /// Wall-clock budget, checked after every LP solve.
    pub time_limit: Option<Duration>,
    pub pricing: PricingConfig,
}

/// Why the driver stopped.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Termination {
    /// Pricing found no column within its budget.
    PricingOptimal,
    IterationLimit,
    TimeLimit,
}

/// Outcome of a column-generation run.
#[derive(Debug, Clone)]
pub struct ColumnGenerationResult {
    /// LP objective over the final column pool.
    pub objective: f64,
    /// The full column pool, initial coloring first.
    pub columns: Vec<Column>,
    /// Final LP value of each column, aligned with `columns`. Input for an
    /// external rounding or branch-and-price step.
    pub column_values: Vec<f64>,
    pub initial_columns: usize,
    /// Number of columns added by pricing.
    pub iterations: usize,
    /// Objective after every solve; non-increasing.
    pub objective_history: Vec<f64>,
    /// Which pricing stage produced each added column.
    pub sources: Vec<PricingSource>,
    pub termination: Termination,
    pub elapsed: Duration,
}

impl ColumnGenerationResult {
    fn empty(elapsed: Duration) -> Self {
        Self {
            objective: 0.0,
            columns: Vec::new(),
            column_values: Vec::new(),
            initial_columns: 0,
            iterations: 0,
            objective_history: Vec::new(),
            sources: Vec::new(),
            termination: Termination::PricingOptimal,
            elapsed,
        }
    }

    /// Columns in the final pool that came from pricing.
    pub fn generated_columns(&self) -> &[Column] {
        &self.columns[self.initial_columns..]
    }
}

/// Column-generation driver over a fixed graph.
pub struct ColumnGeneration<'a> {
    graph: &'a ColGraph,
    config: ColumnGenerationConfig,
}

impl<'a> ColumnGeneration<'a> {
    pub fn new(graph: &'a ColGraph, config: ColumnGenerationConfig) -> Self {
        Self { graph, config }
    }

    /// Run with the HiGHS backend.
    pub fn run(&self) -> Result<ColumnGenerationResult, SolveError> {
        self.run_with::<HighsSolver>()
    }

    /// Run with any [`LpSolver`] backend.
    pub fn run_with<S: LpSolver>(&self) -> Result<ColumnGenerationResult, SolveError> {
        let start = Instant::now();
        if self.graph.is_empty() {
            return Ok(ColumnGenerationResult::empty(start.elapsed()));
        }

        let initial = coloring::first_fit(self.graph);
        for column in &initial {
            check_stable(self.graph, column)?;
        }
        let initial_columns = initial.len();
        info!(colors = initial_columns, "initial greedy coloring");

        let mut master = RestrictedMaster::<S>::new(self.graph.len(), initial)?;
        let oracle = PricingOracle::new(self.graph, self.config.pricing.clone());

        let mut objective_history = Vec::new();
        let mut sources = Vec::new();
        let mut iterations = 0;

        let (solution, termination) = loop {
            let solution = solve_master(&mut master)?;
            objective_history.push(solution.objective);

            if self.config.max_iterations.is_some_and(|max| iterations >= max) {
                break (solution, Termination::IterationLimit);
            }
            if self.config.time_limit.is_some_and(|limit| start.elapsed() >= limit) {
                break (solution, Termination::TimeLimit);
            }

            let duals = DualPrices::clamped(&solution.duals, oracle.config().epsilon);
            let Some(priced) = oracle.price(&duals) else {
                break (solution, Termination::PricingOptimal);
            };
            check_stable(self.graph, &priced.column)?;

            info!(
                iteration = iterations,
                objective = solution.objective,
                source = %priced.source,
                weight = priced.weight,
                size = priced.column.len(),
                "adding column"
            );
            sources.push(priced.source);
            master.add_column(priced.column)?;
            iterations += 1;
        };

        info!(
            objective = solution.objective,
            columns = master.columns().len(),
            iterations,
            ?termination,
            "column generation finished"
        );

        Ok(ColumnGenerationResult {
            objective: solution.objective,
            column_values: solution.primal,
            columns: master.into_columns(),
            initial_columns,
            iterations,
            objective_history,
            sources,
            termination,
            elapsed: start.elapsed(),
        })
    }
}

fn check_stable(graph: &ColGraph, column: &Column) -> Result<(), SolveError> {
    if graph.is_stable(column.vertices()) {
        Ok(())
    } else {
        Err(SolveError::NotStable(column.vertices().to_vec()))
    }
}

/// Solve the master, retrying once on a freshly rebuilt solver if the first
/// attempt is not optimal. Duals from a non-optimal solve are never returned.
fn solve_master<S: LpSolver>(master: &mut RestrictedMaster<S>) -> Result<LpSolution, SolveError> {
    match master.solve_relaxation() {
        Ok(solution) if solution.is_optimal() => return Ok(solution),
        Ok(solution) => warn!(status = %solution.status, "LP not optimal, rebuilding master"),
        Err(e) => warn!(error = %e, "LP solve failed, rebuilding master"),
    }

    master.rebuild()?;
    let solution = master.solve_relaxation()?;
    if solution.is_optimal() {
        debug!("clean rebuild solved to optimality");
        Ok(solution)
    } else {
        Err(SolveError::LpNotOptimal(solution.status))
    }
}
