use screener_core::{ensure_unique_tickers, FilterPolicy, OptimizationRow, ScreenerError, TableSummary, TickerRecord};
use std::time::Duration;

use crate::model::LinearProgram;
use crate::report::OptimizationReport;
use crate::solver::{solve_bounded, LpSolver, SolveOutcome, SolveStatus};

/// A portfolio formulation over the filtered indicator table.
pub trait PortfolioModel {
    fn name(&self) -> &'static str;

    /// One decision variable per row, in row order.
    fn formulate(&self, rows: &[OptimizationRow]) -> LinearProgram;

    /// Weight of a ticker given its solved value, `None` if it is not held.
    fn holding_weight(&self, value: f64) -> Option<f64>;
}

/// Filter the table, formulate `model`, solve it and build the report.
///
/// A non-optimal solve is a normal outcome reported through the status; only
/// bad input (duplicate tickers) or a crashed solver produce an error.
pub async fn optimize<M, S>(
    model: &M,
    records: &[TickerRecord],
    filter: &FilterPolicy,
    solver: &S,
    time_limit: Option<Duration>,
) -> Result<OptimizationReport, ScreenerError>
where
    M: PortfolioModel,
    S: LpSolver + Clone + 'static,
{
    let rows = filter.apply(records);
    ensure_unique_tickers(&rows)?;

    match TableSummary::describe(&rows) {
        Some(summary) => tracing::info!(
            "{} of {} tickers left after cleaning:\n{}",
            rows.len(),
            records.len(),
            summary
        ),
        None => tracing::warn!("No ticker left after cleaning {} records", records.len()),
    }

    let program = model.formulate(&rows);
    let outcome = if rows.is_empty() {
        SolveOutcome::without_solution(SolveStatus::Infeasible)
    } else {
        tracing::info!(
            "Solving {} with {} variables and {} constraints",
            program.name,
            program.variables.len(),
            program.constraints.len()
        );
        solve_bounded(solver, program, time_limit).await?
    };
    tracing::info!("Solution status: {}", outcome.status);

    Ok(OptimizationReport::build(model, &rows, outcome))
}
