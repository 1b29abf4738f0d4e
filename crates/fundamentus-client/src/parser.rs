use scraper::{ElementRef, Html, Selector};
use screener_core::{Indicators, ScreenerError};

/// Minimum number of `<table>` elements a detail page must contain; the
/// indicators live in the third one.
pub const MIN_TABLES: usize = 3;
const INDICATOR_TABLE: usize = 2;

fn selector(css: &str) -> Result<Selector, ScreenerError> {
    Selector::parse(css).map_err(|e| ScreenerError::Parse(format!("invalid selector {css}: {e:?}")))
}

/// Convert a Brazilian-formatted number ("1.234,56", "12,5%") to `f64`.
///
/// A lone `.` with no `,` in the string is read as a decimal point. Anything
/// that does not parse to a finite number yields `None`.
pub fn normalize_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().replace('%', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    let dots = cleaned.matches('.').count();
    let canonical = if cleaned.contains(',') || dots > 1 {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned.to_string()
    };

    canonical
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Text of a cell: the `span.txt` child when present, otherwise the whole cell.
fn cell_text(cell: &ElementRef, span: &Selector) -> String {
    let text: String = match cell.select(span).next() {
        Some(inner) => inner.text().collect(),
        None => cell.text().collect(),
    };
    text.trim().to_string()
}

/// Extract the four indicators from a Fundamentus detail page.
///
/// Fails only when the page has fewer than [`MIN_TABLES`] tables; missing
/// labels or unparseable values leave the field as `None`.
pub fn parse_indicators(html: &str) -> Result<Indicators, ScreenerError> {
    let doc = Html::parse_document(html);
    let sel_table = selector("table")?;
    let sel_row = selector("tr")?;
    let sel_cell = selector("td")?;
    let sel_txt = selector("span.txt")?;

    let tables: Vec<ElementRef> = doc.select(&sel_table).collect();
    if tables.len() < MIN_TABLES {
        return Err(ScreenerError::Parse(format!(
            "expected at least {} tables, found {}",
            MIN_TABLES,
            tables.len()
        )));
    }

    let mut indicators = Indicators::default();
    for row in tables[INDICATOR_TABLE].select(&sel_row) {
        let cells: Vec<ElementRef> = row.select(&sel_cell).collect();
        for pair in cells.chunks_exact(2) {
            let label = cell_text(&pair[0], &sel_txt).to_lowercase();
            let value = cell_text(&pair[1], &sel_txt);

            if label == "roe" {
                indicators.roe = normalize_number(&value);
            } else if label == "p/l" {
                indicators.price_earnings = normalize_number(&value);
            } else if label.contains("div. yield") {
                indicators.dividend_yield = normalize_number(&value);
            } else if label.contains("12 meses") {
                indicators.trailing_return = normalize_number(&value);
            }
        }
    }

    Ok(indicators)
}
