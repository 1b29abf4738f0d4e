use screener_core::OptimizationRow;
use serde::{Deserialize, Serialize};

use crate::model::{ConstraintSense, LinearProgram, VariableDomain};
use crate::portfolio::PortfolioModel;

/// Equal-inclusion stock picking: each ticker is either in or out.
///
/// The aggregate bounds are sums over the selected tickers, not weighted
/// averages, so they are looser than the allocation model's and must stay
/// separate from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinarySelection {
    pub max_holdings: usize,
    pub min_roe: f64,
    pub max_price_earnings: f64,
    pub min_dividend_yield: f64,
}

impl Default for BinarySelection {
    fn default() -> Self {
        Self {
            max_holdings: 20,
            min_roe: 6.0,
            max_price_earnings: 40.0,
            min_dividend_yield: 3.0,
        }
    }
}

impl PortfolioModel for BinarySelection {
    fn name(&self) -> &'static str {
        "binary_selection"
    }

    fn formulate(&self, rows: &[OptimizationRow]) -> LinearProgram {
        let mut lp = LinearProgram::new(self.name());
        for row in rows {
            lp.add_variable(format!("select_{}", row.ticker), VariableDomain::Binary, row.trailing_return);
        }

        lp.add_constraint(
            "max_holdings",
            vec![1.0; rows.len()],
            ConstraintSense::LessOrEqual,
            self.max_holdings as f64,
        );
        lp.add_constraint(
            "min_roe",
            rows.iter().map(|r| r.roe).collect(),
            ConstraintSense::GreaterOrEqual,
            self.min_roe,
        );
        lp.add_constraint(
            "max_price_earnings",
            rows.iter().map(|r| r.price_earnings).collect(),
            ConstraintSense::LessOrEqual,
            self.max_price_earnings,
        );
        lp.add_constraint(
            "min_dividend_yield",
            rows.iter().map(|r| r.dividend_yield).collect(),
            ConstraintSense::GreaterOrEqual,
            self.min_dividend_yield,
        );
        lp
    }

    fn holding_weight(&self, value: f64) -> Option<f64> {
        (value.round() >= 1.0).then_some(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::optimize;
    use crate::solver::{GoodLpSolver, SolveStatus};
    use crate::OptimizationReport;
    use approx::assert_relative_eq;
    use screener_core::{FilterPolicy, TickerRecord};

    fn record(ticker: &str, roe: f64, pe: f64, dy: f64, ret: f64) -> TickerRecord {
        TickerRecord {
            ticker: ticker.to_string(),
            roe: Some(roe),
            price_earnings: Some(pe),
            dividend_yield: Some(dy),
            trailing_return: Some(ret),
        }
    }

    async fn solve(records: &[TickerRecord]) -> OptimizationReport {
        optimize(
            &BinarySelection::default(),
            records,
            &FilterPolicy::default(),
            &GoodLpSolver,
            None,
        )
        .await
        .unwrap()
    }

    #[test]
    fn test_formulation_thresholds() {
        let rows = FilterPolicy::default().apply(&[record("VALE3", 18.0, 6.0, 9.0, -10.0)]);
        let lp = BinarySelection::default().formulate(&rows);

        assert_eq!(lp.variables[0].name, "select_VALE3");
        assert_eq!(lp.variables[0].domain, VariableDomain::Binary);
        let cap = lp.constraint("max_holdings").unwrap();
        assert_eq!((cap.sense, cap.rhs), (ConstraintSense::LessOrEqual, 20.0));
        assert_eq!(lp.constraint("min_roe").unwrap().rhs, 6.0);
        assert_eq!(lp.constraint("max_price_earnings").unwrap().rhs, 40.0);
        assert_eq!(lp.constraint("min_dividend_yield").unwrap().rhs, 3.0);
    }

    #[test]
    fn test_holding_weight_rounds() {
        let model = BinarySelection::default();
        assert_eq!(model.holding_weight(0.9999999), Some(1.0));
        assert_eq!(model.holding_weight(1e-7), None);
        assert_eq!(model.holding_weight(0.0), None);
    }

    #[tokio::test]
    async fn test_price_earnings_budget_binds() {
        let records = vec![
            record("ITUB4", 10.0, 15.0, 2.0, 40.0),
            record("BBDC4", 5.0, 20.0, 1.0, 35.0),
            record("SANB11", 8.0, 10.0, 4.0, 20.0),
            record("BPAC11", 3.0, 5.0, 0.5, 10.0),
            record("WEGE3", 12.0, 30.0, 6.0, 50.0),
        ];
        let report = solve(&records).await;
        assert_eq!(report.status, SolveStatus::Optimal);

        let held: Vec<&str> = report.holdings.iter().map(|h| h.ticker.as_str()).collect();
        assert_eq!(held, vec!["ITUB4", "BBDC4", "BPAC11"]);

        let totals = report.totals.unwrap();
        assert_relative_eq!(totals.trailing_return, 85.0, epsilon = 1e-6);
        assert_relative_eq!(totals.price_earnings, 40.0, epsilon = 1e-6);
        assert_relative_eq!(totals.roe, 18.0, epsilon = 1e-6);
        assert_relative_eq!(totals.dividend_yield, 3.5, epsilon = 1e-6);
    }

    #[tokio::test]
    async fn test_cardinality_cap() {
        let records: Vec<TickerRecord> = (0..25)
            .map(|i| record(&format!("TCK{i:02}"), 1.0, 1.0, 1.0, i as f64))
            .collect();
        let report = solve(&records).await;
        assert_eq!(report.status, SolveStatus::Optimal);
        assert_eq!(report.holdings.len(), 20);
        // The five lowest returns are left out
        assert!(report.holdings.iter().all(|h| h.trailing_return >= 5.0));
        assert_relative_eq!(report.totals.unwrap().trailing_return, (5..25).sum::<i32>() as f64, epsilon = 1e-6);
    }

    #[tokio::test]
    async fn test_two_ticker_example_selects_both() {
        let records = vec![
            record("AAAA3", 10.0, 8.0, 20.0, 15.0),
            record("BBBB3", 5.0, 15.0, 10.0, 8.0),
        ];
        let report = solve(&records).await;
        assert_eq!(report.status, SolveStatus::Optimal);
        assert_eq!(report.holdings.len(), 2);
        assert_relative_eq!(report.totals.unwrap().trailing_return, 23.0, epsilon = 1e-6);
    }

    #[tokio::test]
    async fn test_nan_cell_does_not_reach_solver() {
        let records = vec![
            TickerRecord {
                dividend_yield: Some(f64::NAN),
                ..record("AAAA3", 10.0, 8.0, 0.0, 15.0)
            },
            record("BBBB3", 10.0, 8.0, 5.0, 15.0),
        ];
        let report = solve(&records).await;
        assert_eq!(report.status, SolveStatus::Optimal);
        assert_eq!(report.candidates, 1);
        let held: Vec<&str> = report.holdings.iter().map(|h| h.ticker.as_str()).collect();
        assert_eq!(held, vec!["BBBB3"]);
    }

    #[tokio::test]
    async fn test_infeasible_dividend_floor() {
        let records = vec![record("CSAN3", 9.0, 7.0, 0.5, 12.0), record("RAIL3", 8.0, 9.0, 0.0, 5.0)];
        let report = solve(&records).await;
        assert_eq!(report.status, SolveStatus::Infeasible);
        assert!(report.holdings.is_empty());
    }
}
