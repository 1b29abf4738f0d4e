use good_lp::solvers::microlp::microlp;
use good_lp::{constraint, variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable};
use screener_core::ScreenerError;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use crate::model::{ConstraintSense, LinearProgram, VariableDomain};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    TimedOut,
    Other(String),
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "Optimal"),
            SolveStatus::Infeasible => write!(f, "Infeasible"),
            SolveStatus::Unbounded => write!(f, "Unbounded"),
            SolveStatus::TimedOut => write!(f, "Timed out"),
            SolveStatus::Other(reason) => write!(f, "Not solved ({reason})"),
        }
    }
}

/// Status of a solve plus, when optimal, one value per program variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    pub values: Option<Vec<f64>>,
}

impl SolveOutcome {
    pub fn optimal(values: Vec<f64>) -> Self {
        Self {
            status: SolveStatus::Optimal,
            values: Some(values),
        }
    }

    pub fn without_solution(status: SolveStatus) -> Self {
        Self { status, values: None }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolveStatus::Optimal
    }
}

/// An external LP/MIP engine. A non-optimal status is an `Ok` outcome; `Err`
/// is reserved for failures to run the solver at all.
pub trait LpSolver: Send + Sync {
    fn solve(&self, program: &LinearProgram) -> Result<SolveOutcome, ScreenerError>;
}

/// `good_lp` with the pure-Rust microlp backend (simplex + branch and bound).
#[derive(Debug, Clone, Copy, Default)]
pub struct GoodLpSolver;

impl LpSolver for GoodLpSolver {
    fn solve(&self, program: &LinearProgram) -> Result<SolveOutcome, ScreenerError> {
        if program.objective.len() != program.variables.len()
            || program.constraints.iter().any(|c| c.coefficients.len() != program.variables.len())
        {
            return Err(ScreenerError::Solver(format!(
                "program {} has coefficient vectors that do not match its {} variables",
                program.name,
                program.variables.len()
            )));
        }

        // A program without variables is decided by its constant constraints
        if program.variables.is_empty() {
            let feasible = program.constraints.iter().all(|c| c.is_satisfied(&[], 0.0));
            return Ok(if feasible {
                SolveOutcome::optimal(Vec::new())
            } else {
                SolveOutcome::without_solution(SolveStatus::Infeasible)
            });
        }

        let mut vars = ProblemVariables::new();
        let handles: Vec<Variable> = program
            .variables
            .iter()
            .map(|v| {
                let definition = match v.domain {
                    VariableDomain::Continuous { lower, upper } => variable().min(lower).max(upper),
                    VariableDomain::Binary => variable().binary(),
                };
                vars.add(definition.name(v.name.clone()))
            })
            .collect();

        let linear = |coefficients: &[f64]| -> Expression {
            handles.iter().zip(coefficients).map(|(&x, &a)| a * x).sum()
        };

        let mut model = vars.maximise(linear(&program.objective)).using(microlp);
        for c in &program.constraints {
            let lhs = linear(&c.coefficients);
            model = model.with(match c.sense {
                ConstraintSense::LessOrEqual => constraint::leq(lhs, c.rhs),
                ConstraintSense::GreaterOrEqual => constraint::geq(lhs, c.rhs),
                ConstraintSense::Equal => constraint::eq(lhs, c.rhs),
            });
        }

        match model.solve() {
            Ok(solution) => Ok(SolveOutcome::optimal(
                handles.iter().map(|&x| solution.value(x)).collect(),
            )),
            Err(ResolutionError::Infeasible) => Ok(SolveOutcome::without_solution(SolveStatus::Infeasible)),
            Err(ResolutionError::Unbounded) => Ok(SolveOutcome::without_solution(SolveStatus::Unbounded)),
            Err(other) => Ok(SolveOutcome::without_solution(SolveStatus::Other(other.to_string()))),
        }
    }
}

/// Run `solver` on the blocking pool. When `time_limit` expires the outcome
/// is `TimedOut`; the solver thread is left to finish on its own.
pub async fn solve_bounded<S>(
    solver: &S,
    program: LinearProgram,
    time_limit: Option<Duration>,
) -> Result<SolveOutcome, ScreenerError>
where
    S: LpSolver + Clone + 'static,
{
    let solver = solver.clone();
    let name = program.name.clone();
    let task = tokio::task::spawn_blocking(move || solver.solve(&program));

    let joined = match time_limit {
        Some(limit) => match tokio::time::timeout(limit, task).await {
            Ok(joined) => joined,
            Err(_) => {
                tracing::warn!("Solver gave up on {} after {:.1}s", name, limit.as_secs_f64());
                return Ok(SolveOutcome::without_solution(SolveStatus::TimedOut));
            }
        },
        None => task.await,
    };

    joined.map_err(|e| ScreenerError::Solver(format!("solver task for {name} failed: {e}")))?
}

/// Drive `future` on a fresh runtime and shut it down without waiting for
/// blocking tasks, so a solver abandoned by `solve_bounded` cannot hold the
/// process open.
pub fn block_on_detached<F: Future>(future: F) -> Result<F::Output, ScreenerError> {
    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    let output = runtime.block_on(future);
    runtime.shutdown_background();
    Ok(output)
}
