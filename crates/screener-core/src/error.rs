use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScreenerError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Solver error: {0}")]
    Solver(String),

    #[error(
        "Collection for {ticker} failed after {attempts} attempts in {:.0}s: {last_error}",
        .budget.as_secs_f64()
    )]
    RetryBudgetExhausted {
        ticker: String,
        budget: Duration,
        attempts: u32,
        last_error: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ScreenerError {
    /// Whether another fetch attempt may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ScreenerError::Http(_) | ScreenerError::Status { .. } | ScreenerError::Parse(_)
        )
    }
}
