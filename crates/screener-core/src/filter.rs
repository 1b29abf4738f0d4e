use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::{OptimizationRow, ScreenerError, TickerRecord};

/// Row filter applied before any model is formulated.
///
/// Both optimizer variants must see exactly the same rows, so they share this
/// policy instead of filtering on their own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterPolicy {
    pub min_roe: f64,
    pub min_price_earnings: f64,
    pub max_trailing_return: f64,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            min_roe: 0.0,
            min_price_earnings: 0.0,
            max_trailing_return: 100.0,
        }
    }
}

impl FilterPolicy {
    pub fn accepts(&self, row: &OptimizationRow) -> bool {
        row.roe >= self.min_roe
            && row.price_earnings >= self.min_price_earnings
            && row.trailing_return <= self.max_trailing_return
    }

    /// Drop records with any missing indicator, then apply the bounds.
    pub fn apply(&self, records: &[TickerRecord]) -> Vec<OptimizationRow> {
        let rows: Vec<OptimizationRow> = records
            .iter()
            .filter_map(|record| {
                let row = OptimizationRow::from_record(record);
                if row.is_none() {
                    debug!("Dropping {}: incomplete indicators", record.ticker);
                }
                row
            })
            .filter(|row| {
                let keep = self.accepts(row);
                if !keep {
                    debug!(
                        "Dropping {}: ROE={} P/L={} return={}",
                        row.ticker, row.roe, row.price_earnings, row.trailing_return
                    );
                }
                keep
            })
            .collect();

        debug!("Filter kept {} of {} records", rows.len(), records.len());
        rows
    }
}

/// Reject tables where a ticker appears more than once; decision variables are
/// indexed by ticker.
pub fn ensure_unique_tickers(rows: &[OptimizationRow]) -> Result<(), ScreenerError> {
    let mut seen = HashSet::with_capacity(rows.len());
    for row in rows {
        if !seen.insert(row.ticker.as_str()) {
            return Err(ScreenerError::InvalidData(format!(
                "duplicate ticker {} in optimization table",
                row.ticker
            )));
        }
    }
    Ok(())
}
