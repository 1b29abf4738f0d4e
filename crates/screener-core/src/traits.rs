use async_trait::async_trait;
use crate::{Indicators, ScreenerError};

/// A source of fundamental indicators for one ticker.
///
/// One call is one attempt: implementations must not retry internally, the
/// collector owns the retry budget.
#[async_trait]
pub trait IndicatorSource: Send + Sync {
    async fn fetch_indicators(&self, ticker: &str) -> Result<Indicators, ScreenerError>;
}
