use screener_core::types::column;
use screener_core::{OptimizationRow, ScreenerError};
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::portfolio::PortfolioModel;
use crate::solver::{SolveOutcome, SolveStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holding {
    pub ticker: String,
    /// Allocation weight, or 1.0 for a selected ticker.
    pub weight: f64,
    pub roe: f64,
    pub price_earnings: f64,
    pub dividend_yield: f64,
    pub trailing_return: f64,
}

/// Σ weight · indicator over the holdings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PortfolioTotals {
    pub roe: f64,
    pub price_earnings: f64,
    pub dividend_yield: f64,
    pub trailing_return: f64,
}

impl PortfolioTotals {
    pub fn from_holdings(holdings: &[Holding]) -> Self {
        let total = |f: fn(&Holding) -> f64| -> f64 { holdings.iter().map(|h| h.weight * f(h)).sum() };
        Self {
            roe: total(|h| h.roe),
            price_earnings: total(|h| h.price_earnings),
            dividend_yield: total(|h| h.dividend_yield),
            trailing_return: total(|h| h.trailing_return),
        }
    }
}

/// Outcome of one optimizer run. Holdings and totals are only filled when the
/// solve was optimal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationReport {
    pub model: String,
    pub status: SolveStatus,
    pub candidates: usize,
    pub holdings: Vec<Holding>,
    pub totals: Option<PortfolioTotals>,
}

impl OptimizationReport {
    pub fn build<M: PortfolioModel + ?Sized>(model: &M, rows: &[OptimizationRow], outcome: SolveOutcome) -> Self {
        let holdings: Vec<Holding> = match (&outcome.status, &outcome.values) {
            (SolveStatus::Optimal, Some(values)) => rows
                .iter()
                .zip(values)
                .filter_map(|(row, &value)| {
                    model.holding_weight(value).map(|weight| Holding {
                        ticker: row.ticker.clone(),
                        weight,
                        roe: row.roe,
                        price_earnings: row.price_earnings,
                        dividend_yield: row.dividend_yield,
                        trailing_return: row.trailing_return,
                    })
                })
                .collect(),
            _ => Vec::new(),
        };
        let totals = outcome.is_optimal().then(|| PortfolioTotals::from_holdings(&holdings));

        Self {
            model: model.name().to_string(),
            status: outcome.status,
            candidates: rows.len(),
            holdings,
            totals,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolveStatus::Optimal
    }

    /// Write the holdings as a `;`-delimited table.
    pub fn write_holdings<W: Write>(&self, writer: W) -> Result<(), ScreenerError> {
        let mut wtr = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);
        wtr.write_record([
            column::TICKER,
            column::WEIGHT,
            column::ROE,
            column::PRICE_EARNINGS,
            column::DIVIDEND_YIELD,
            column::TRAILING_RETURN,
        ])?;
        for h in &self.holdings {
            wtr.write_record([
                h.ticker.clone(),
                h.weight.to_string(),
                h.roe.to_string(),
                h.price_earnings.to_string(),
                h.dividend_yield.to_string(),
                h.trailing_return.to_string(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn save_holdings(&self, path: &Path) -> Result<(), ScreenerError> {
        self.write_holdings(File::create(path)?)
    }
}

impl fmt::Display for OptimizationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model: {} ({} candidates)", self.model, self.candidates)?;
        writeln!(f, "Solution status: {}", self.status)?;

        let Some(totals) = &self.totals else {
            return writeln!(f, "The solution is not optimal. Check the constraints and the data.");
        };

        writeln!(
            f,
            "\n{:<8} {:>8} {:>8} {:>8} {:>8} {:>8}",
            "Ticker", "Weight", "ROE", "P/L", "DY", "Ret12m"
        )?;
        for h in &self.holdings {
            writeln!(
                f,
                "{:<8} {:>8.4} {:>8.2} {:>8.2} {:>8.2} {:>8.2}",
                h.ticker, h.weight, h.roe, h.price_earnings, h.dividend_yield, h.trailing_return
            )?;
        }

        writeln!(f, "\nPortfolio totals:")?;
        writeln!(f, "ROE: {:.2}%", totals.roe)?;
        writeln!(f, "P/L: {:.2}", totals.price_earnings)?;
        writeln!(f, "Dividend yield: {:.2}%", totals.dividend_yield)?;
        writeln!(f, "Return: {:.2}%", totals.trailing_return)
    }
}
