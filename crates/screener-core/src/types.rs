use serde::{Deserialize, Serialize};

/// The four indicators scraped from a detail page. A field is `None` when its
/// label was missing or its value could not be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Indicators {
    pub roe: Option<f64>,
    pub price_earnings: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub trailing_return: Option<f64>,
}

impl Indicators {
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Column names of the fields that are still `None`.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.roe.is_none() {
            missing.push(column::ROE);
        }
        if self.price_earnings.is_none() {
            missing.push(column::PRICE_EARNINGS);
        }
        if self.dividend_yield.is_none() {
            missing.push(column::DIVIDEND_YIELD);
        }
        if self.trailing_return.is_none() {
            missing.push(column::TRAILING_RETURN);
        }
        missing
    }
}

/// Column headers of the indicator table shared by both pipelines.
pub mod column {
    pub const TICKER: &str = "Ticker";
    pub const ROE: &str = "ROE";
    pub const PRICE_EARNINGS: &str = "P/L";
    pub const DIVIDEND_YIELD: &str = "Dividend_Yield";
    pub const TRAILING_RETURN: &str = "Rendimento_12m";
    pub const WEIGHT: &str = "Weight";
}

/// One row of the collected indicator table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerRecord {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "ROE", deserialize_with = "csv::invalid_option")]
    pub roe: Option<f64>,
    #[serde(rename = "P/L", deserialize_with = "csv::invalid_option")]
    pub price_earnings: Option<f64>,
    #[serde(rename = "Dividend_Yield", deserialize_with = "csv::invalid_option")]
    pub dividend_yield: Option<f64>,
    #[serde(rename = "Rendimento_12m", deserialize_with = "csv::invalid_option")]
    pub trailing_return: Option<f64>,
}

impl TickerRecord {
    pub fn new(ticker: impl Into<String>, indicators: Indicators) -> Self {
        Self {
            ticker: ticker.into(),
            roe: indicators.roe,
            price_earnings: indicators.price_earnings,
            dividend_yield: indicators.dividend_yield,
            trailing_return: indicators.trailing_return,
        }
    }

    pub fn indicators(&self) -> Indicators {
        Indicators {
            roe: self.roe,
            price_earnings: self.price_earnings,
            dividend_yield: self.dividend_yield,
            trailing_return: self.trailing_return,
        }
    }
}

/// A ticker that could not be collected within its retry budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionFailure {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Error")]
    pub reason: String,
}

/// Result of a collection batch. Every input ticker lands in exactly one of
/// the two lists, both in input order.
#[derive(Debug, Clone, Default)]
pub struct CollectionOutcome {
    pub records: Vec<TickerRecord>,
    pub failures: Vec<CollectionFailure>,
}

impl CollectionOutcome {
    pub fn total(&self) -> usize {
        self.records.len() + self.failures.len()
    }

    pub fn incomplete(&self) -> impl Iterator<Item = &TickerRecord> {
        self.records.iter().filter(|r| !r.indicators().is_complete())
    }
}

/// A record that survived filtering: every indicator is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRow {
    pub ticker: String,
    pub roe: f64,
    pub price_earnings: f64,
    pub dividend_yield: f64,
    pub trailing_return: f64,
}

impl OptimizationRow {
    /// Build a row from a record, or `None` if any indicator is missing.
    /// `NaN` and infinite cells count as missing.
    pub fn from_record(record: &TickerRecord) -> Option<Self> {
        let finite = |v: Option<f64>| v.filter(|x| x.is_finite());
        Some(Self {
            ticker: record.ticker.clone(),
            roe: finite(record.roe)?,
            price_earnings: finite(record.price_earnings)?,
            dividend_yield: finite(record.dividend_yield)?,
            trailing_return: finite(record.trailing_return)?,
        })
    }
}

impl From<OptimizationRow> for TickerRecord {
    fn from(row: OptimizationRow) -> Self {
        Self {
            ticker: row.ticker,
            roe: Some(row.roe),
            price_earnings: Some(row.price_earnings),
            dividend_yield: Some(row.dividend_yield),
            trailing_return: Some(row.trailing_return),
        }
    }
}
