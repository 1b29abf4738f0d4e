use serde::Serialize;
use statrs::statistics::Statistics;
use std::fmt;

use crate::OptimizationRow;

/// Descriptive statistics for one indicator column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1); `NaN` with fewer than two values.
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl ColumnSummary {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        Some(Self {
            count: values.len(),
            mean: values.mean(),
            std: values.std_dev(),
            min: Statistics::min(values),
            max: Statistics::max(values),
        })
    }
}

/// Summary of the cleaned optimization table, logged before solving.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSummary {
    pub roe: ColumnSummary,
    pub price_earnings: ColumnSummary,
    pub dividend_yield: ColumnSummary,
    pub trailing_return: ColumnSummary,
}

impl TableSummary {
    pub fn describe(rows: &[OptimizationRow]) -> Option<Self> {
        let column = |f: fn(&OptimizationRow) -> f64| {
            let values: Vec<f64> = rows.iter().map(f).collect();
            ColumnSummary::from_values(&values)
        };

        Some(Self {
            roe: column(|r| r.roe)?,
            price_earnings: column(|r| r.price_earnings)?,
            dividend_yield: column(|r| r.dividend_yield)?,
            trailing_return: column(|r| r.trailing_return)?,
        })
    }
}

impl fmt::Display for TableSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<16} {:>6} {:>10} {:>10} {:>10} {:>10}",
            "", "count", "mean", "std", "min", "max"
        )?;
        for (name, c) in [
            ("ROE", &self.roe),
            ("P/L", &self.price_earnings),
            ("Dividend_Yield", &self.dividend_yield),
            ("Rendimento_12m", &self.trailing_return),
        ] {
            writeln!(
                f,
                "{:<16} {:>6} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
                name, c.count, c.mean, c.std, c.min, c.max
            )?;
        }
        Ok(())
    }
}
