//! The linear-programming capability behind the restricted master problem.
//!
//! The master only needs a solver that holds one `>= 1` cover row per vertex,
//! accepts new unit-cost columns between solves, and reports an objective,
//! row duals, and column values. [`LpSolver`] captures exactly that; the
//! shipped implementation is [`HighsSolver`].

use std::fmt::Display;

use highs::{ColProblem, HighsModelStatus, Model, Row, Sense, SolvedModel};

use crate::error::SolveError;

/// Solver status after a solve, reduced to what the driver acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LpStatus {
    Optimal,
    Infeasible,
    Unbounded,
    Other(String),
}

impl Display for LpStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LpStatus::Optimal => write!(f, "optimal"),
            LpStatus::Infeasible => write!(f, "infeasible"),
            LpStatus::Unbounded => write!(f, "unbounded"),
            LpStatus::Other(s) => write!(f, "{s}"),
        }
    }
}

impl From<HighsModelStatus> for LpStatus {
    fn from(status: HighsModelStatus) -> Self {
        match status {
            HighsModelStatus::Optimal => LpStatus::Optimal,
            HighsModelStatus::Infeasible => LpStatus::Infeasible,
            HighsModelStatus::Unbounded => LpStatus::Unbounded,
            other => LpStatus::Other(format!("{other:?}")),
        }
    }
}

/// Result of one LP solve.
#[derive(Debug, Clone)]
pub struct LpSolution {
    pub status: LpStatus,
    pub objective: f64,
    /// One raw dual per cover row, in vertex order.
    pub duals: Vec<f64>,
    /// One value per column, in insertion order.
    pub primal: Vec<f64>,
}

impl LpSolution {
    pub fn is_optimal(&self) -> bool {
        self.status == LpStatus::Optimal
    }
}

/// Incremental solver for `min sum(x) s.t. A x >= 1, x >= 0`.
///
/// Implementations must solve the pure linear relaxation and must keep every
/// cover row in the model (no presolve reductions), since duals are read for
/// all of them.
pub trait LpSolver: Sized {
    /// A model with `num_rows` cover rows and no columns.
    fn new(num_rows: usize) -> Self;

    /// Append a column with objective coefficient `cost` and coefficient 1 in
    /// each of `rows`.
    fn add_column(&mut self, cost: f64, rows: &[usize]) -> Result<(), SolveError>;

    fn solve(&mut self) -> Result<LpSolution, SolveError>;
}

enum HighsState {
    Building(Model),
    Solved(SolvedModel),
}

/// [`LpSolver`] backed by HiGHS. Columns added after a solve go into the live
/// model, so the next solve warm-starts from the previous basis.
pub struct HighsSolver {
    rows: Vec<Row>,
    state: Option<HighsState>,
}

impl HighsSolver {
    fn take_model(&mut self) -> Result<Model, SolveError> {
        match self.state.take() {
            Some(HighsState::Building(model)) => Ok(model),
            Some(HighsState::Solved(solved)) => Ok(Model::from(solved)),
            None => Err(SolveError::Backend(
                "model lost after a failed solve".to_string(),
            )),
        }
    }
}

impl LpSolver for HighsSolver {
    fn new(num_rows: usize) -> Self {
        let mut problem = ColProblem::default();
        let rows = (0..num_rows).map(|_| problem.add_row(1.0..)).collect();

        let mut model = problem.optimise(Sense::Minimise);
        model.make_quiet();
        model.set_option("presolve", "off");

        Self {
            rows,
            state: Some(HighsState::Building(model)),
        }
    }

    fn add_column(&mut self, cost: f64, rows: &[usize]) -> Result<(), SolveError> {
        let mut model = self.take_model()?;
        let factors: Vec<(Row, f64)> = rows.iter().map(|&r| (self.rows[r], 1.0)).collect();
        model.add_col(cost, 0.0.., factors);
        self.state = Some(HighsState::Building(model));
        Ok(())
    }

    fn solve(&mut self) -> Result<LpSolution, SolveError> {
        let model = self.take_model()?;
        let solved = model
            .try_solve()
            .map_err(|status| SolveError::Backend(format!("HiGHS returned {status:?}")))?;

        let status = LpStatus::from(solved.status());
        let solution = solved.get_solution();
        let primal = solution.columns().to_vec();
        let duals = solution.dual_rows().to_vec();
        self.state = Some(HighsState::Solved(solved));

        Ok(LpSolution {
            status,
            objective: primal.iter().sum(),
            duals,
            primal,
        })
    }
}
