use screener_core::OptimizationRow;
use serde::{Deserialize, Serialize};

use crate::model::{ConstraintSense, LinearProgram, VariableDomain};
use crate::portfolio::PortfolioModel;

/// Weights below this are solver noise, not holdings.
pub const WEIGHT_EPSILON: f64 = 1e-9;

/// Fully invested, long-only allocation with a per-ticker cap.
///
/// maximise   Σ w·ret
/// subject to Σ w = 1, Σ w·ROE ≥ min_roe, Σ w·P/L ≤ max_price_earnings,
///            Σ w·DY ≥ min_dividend_yield, 0 ≤ w ≤ max_weight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContinuousAllocation {
    pub max_weight: f64,
    pub min_roe: f64,
    pub max_price_earnings: f64,
    pub min_dividend_yield: f64,
}

impl Default for ContinuousAllocation {
    fn default() -> Self {
        Self {
            max_weight: 0.2,
            min_roe: 6.0,
            max_price_earnings: 12.0,
            min_dividend_yield: 18.0,
        }
    }
}

impl PortfolioModel for ContinuousAllocation {
    fn name(&self) -> &'static str {
        "continuous_allocation"
    }

    fn formulate(&self, rows: &[OptimizationRow]) -> LinearProgram {
        let mut lp = LinearProgram::new(self.name());
        let domain = VariableDomain::Continuous {
            lower: 0.0,
            upper: self.max_weight,
        };
        for row in rows {
            lp.add_variable(format!("weight_{}", row.ticker), domain, row.trailing_return);
        }

        lp.add_constraint("fully_invested", vec![1.0; rows.len()], ConstraintSense::Equal, 1.0);
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
        (value > WEIGHT_EPSILON).then_some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::optimize;
    use crate::solver::{GoodLpSolver, SolveStatus};
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

    fn universe() -> Vec<TickerRecord> {
        vec![
            record("BBAS3", 10.0, 8.0, 20.0, 30.0),
            record("BBSE3", 12.0, 10.0, 22.0, 25.0),
            record("CMIG4", 8.0, 9.0, 19.0, 20.0),
            record("PETR4", 15.0, 11.0, 25.0, 15.0),
            record("TAEE11", 7.0, 6.0, 18.0, 10.0),
            record("EMBR3", 5.0, 20.0, 5.0, 50.0),
        ]
    }

    async fn solve(records: &[TickerRecord]) -> crate::OptimizationReport {
        optimize(
            &ContinuousAllocation::default(),
            records,
            &FilterPolicy::default(),
            &GoodLpSolver,
            None,
        )
        .await
        .unwrap()
    }

    #[test]
    fn test_formulation() {
        let rows = FilterPolicy::default().apply(&universe());
        let lp = ContinuousAllocation::default().formulate(&rows);

        assert_eq!(lp.variables.len(), 6);
        assert_eq!(lp.variables[0].name, "weight_BBAS3");
        assert_eq!(lp.variables[0].domain, VariableDomain::Continuous { lower: 0.0, upper: 0.2 });
        assert_eq!(lp.objective[5], 50.0);

        let budget = lp.constraint("fully_invested").unwrap();
        assert_eq!((budget.sense, budget.rhs), (ConstraintSense::Equal, 1.0));
        let roe = lp.constraint("min_roe").unwrap();
        assert_eq!((roe.sense, roe.rhs), (ConstraintSense::GreaterOrEqual, 6.0));
        let pe = lp.constraint("max_price_earnings").unwrap();
        assert_eq!((pe.sense, pe.rhs), (ConstraintSense::LessOrEqual, 12.0));
        assert_eq!(pe.coefficients[5], 20.0);
        let dy = lp.constraint("min_dividend_yield").unwrap();
        assert_eq!((dy.sense, dy.rhs), (ConstraintSense::GreaterOrEqual, 18.0));
    }

    #[tokio::test]
    async fn test_top_returns_fill_their_cap() {
        let report = solve(&universe()).await;
        assert_eq!(report.status, SolveStatus::Optimal);

        let held: Vec<&str> = report.holdings.iter().map(|h| h.ticker.as_str()).collect();
        assert_eq!(held, vec!["BBAS3", "BBSE3", "CMIG4", "PETR4", "EMBR3"]);
        for h in &report.holdings {
            assert_relative_eq!(h.weight, 0.2, epsilon = 1e-6);
        }

        let totals = report.totals.unwrap();
        assert_relative_eq!(totals.trailing_return, 28.0, epsilon = 1e-6);
        assert_relative_eq!(totals.price_earnings, 11.6, epsilon = 1e-6);
        assert_relative_eq!(totals.dividend_yield, 18.2, epsilon = 1e-6);
        assert_relative_eq!(totals.roe, 10.0, epsilon = 1e-6);
    }

    #[tokio::test]
    async fn test_optimal_solution_respects_constraints() {
        // A pricier EMBR3 breaks the P/L ceiling at full cap
        let mut records = universe();
        records[5] = record("EMBR3", 5.0, 30.0, 5.0, 50.0);
        let rows = FilterPolicy::default().apply(&records);
        let lp = ContinuousAllocation::default().formulate(&rows);

        let report = solve(&records).await;
        assert_eq!(report.status, SolveStatus::Optimal);

        let values: Vec<f64> = rows
            .iter()
            .map(|r| {
                report
                    .holdings
                    .iter()
                    .find(|h| h.ticker == r.ticker)
                    .map(|h| h.weight)
                    .unwrap_or(0.0)
            })
            .collect();
        assert!(lp.violations(&values, 1e-6).is_empty(), "{:?}", lp.violations(&values, 1e-6));
        assert_relative_eq!(values.iter().sum::<f64>(), 1.0, epsilon = 1e-6);
        assert!(values.iter().all(|w| (-1e-9..=0.2 + 1e-9).contains(w)));

        let totals = report.totals.unwrap();
        assert!(totals.price_earnings <= 12.0 + 1e-6);
        assert!(totals.trailing_return < 28.0);
        assert!(values[5] < 0.2);
    }

    #[tokio::test]
    async fn test_two_tickers_cannot_be_fully_invested() {
        // Two tickers capped at 20% reach at most 40% of the budget
        let records = vec![
            record("AAAA3", 10.0, 8.0, 20.0, 15.0),
            record("BBBB3", 5.0, 15.0, 10.0, 8.0),
        ];
        let report = solve(&records).await;
        assert_eq!(report.status, SolveStatus::Infeasible);
        assert!(report.holdings.is_empty());
        assert!(report.totals.is_none());
    }

    #[tokio::test]
    async fn test_nothing_survives_filter() {
        let records = vec![record("MGLU3", -5.0, 10.0, 0.0, 20.0)];
        let report = solve(&records).await;
        assert_eq!(report.status, SolveStatus::Infeasible);
        assert!(!report.is_optimal());
    }
}
