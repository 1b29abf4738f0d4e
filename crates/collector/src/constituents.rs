//! Reader for the B3 index-composition export (`IBXXDia_*.csv`).
//!
//! The file is `;`-delimited and Latin-1 encoded: a title row and a column
//! header row, then one constituent per row, then trailer rows ("Quantidade
//! Teórica Total", "Redutor"). Data rows end at the first row whose first cell
//! is not a ticker.

use screener_core::ScreenerError;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstituentsFormat {
    pub delimiter: u8,
    /// Rows skipped before the first constituent.
    pub header_rows: usize,
    /// Optional hard cap on the number of constituents read.
    pub max_rows: Option<usize>,
}

impl Default for ConstituentsFormat {
    fn default() -> Self {
        Self {
            delimiter: b';',
            header_rows: 2,
            max_rows: None,
        }
    }
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// B3 tickers: four letters followed by digits, e.g. `PETR4`, `BPAC11`.
fn looks_like_ticker(cell: &str) -> bool {
    (4..=7).contains(&cell.len())
        && cell.chars().next().is_some_and(|c| c.is_ascii_uppercase())
        && cell.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

pub fn read_constituents<R: Read>(reader: R, format: &ConstituentsFormat) -> Result<Vec<String>, ScreenerError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(format.delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for (index, result) in rdr.byte_records().enumerate() {
        let record = result?;
        if index < format.header_rows {
            continue;
        }
        if format.max_rows.is_some_and(|max| tickers.len() >= max) {
            break;
        }

        let cell = decode_latin1(record.get(0).unwrap_or_default());
        let ticker = cell.trim();
        if !looks_like_ticker(ticker) {
            tracing::debug!("Constituents end at row {}: {:?}", index, ticker);
            break;
        }
        if !seen.insert(ticker.to_string()) {
            tracing::warn!("Duplicate constituent {} at row {} ignored", ticker, index);
            continue;
        }
        tickers.push(ticker.to_string());
    }

    Ok(tickers)
}

pub fn load_constituents(path: &Path, format: &ConstituentsFormat) -> Result<Vec<String>, ScreenerError> {
    read_constituents(File::open(path)?, format)
}
