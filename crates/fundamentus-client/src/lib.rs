pub mod parser;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use screener_core::{IndicatorSource, Indicators, ScreenerError};
use std::time::Duration;

pub use parser::{normalize_number, parse_indicators};

pub const DEFAULT_URL_TEMPLATE: &str = "https://www.fundamentus.com.br/detalhes.php?papel={ticker}";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";
const TICKER_PLACEHOLDER: &str = "{ticker}";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Detail-page URL with a `{ticker}` placeholder.
    pub url_template: String,
    pub user_agent: String,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Scrapes indicator tables from Fundamentus detail pages.
#[derive(Clone)]
pub struct FundamentusClient {
    client: Client,
    url_template: String,
}

impl FundamentusClient {
    pub fn new(config: ClientConfig) -> Result<Self, ScreenerError> {
        if !config.url_template.contains(TICKER_PLACEHOLDER) {
            return Err(ScreenerError::Config(format!(
                "URL template {} has no {} placeholder",
                config.url_template, TICKER_PLACEHOLDER
            )));
        }

        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| ScreenerError::Config(format!("invalid user agent: {e}")))?;
        headers.insert(USER_AGENT, agent);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ScreenerError::Config(e.to_string()))?;

        Ok(Self {
            client,
            url_template: config.url_template,
        })
    }

    pub fn detail_url(&self, ticker: &str) -> String {
        self.url_template.replace(TICKER_PLACEHOLDER, ticker)
    }

    /// Fetch the raw detail page for a ticker. Transport failures and non-2xx
    /// statuses are errors.
    pub async fn fetch_page(&self, ticker: &str) -> Result<String, ScreenerError> {
        let url = self.detail_url(ticker);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ScreenerError::Http(format!("{ticker}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScreenerError::Status {
                status: status.as_u16(),
                url,
            });
        }

        response
            .text()
            .await
            .map_err(|e| ScreenerError::Http(format!("{ticker}: {e}")))
    }
}

#[async_trait]
impl IndicatorSource for FundamentusClient {
    async fn fetch_indicators(&self, ticker: &str) -> Result<Indicators, ScreenerError> {
        let html = self.fetch_page(ticker).await.map_err(|e| {
            tracing::error!("Failed to fetch detail page for {}: {}", ticker, e);
            e
        })?;

        let indicators = parse_indicators(&html).map_err(|e| {
            tracing::warn!("Unexpected page layout for {}: {}", ticker, e);
            e
        })?;

        for field in indicators.missing_fields() {
            tracing::warn!("Field '{}' not found for {}", field, ticker);
        }
        if !indicators.is_complete() {
            tracing::info!("Incomplete indicators for {}: {:?}", ticker, indicators);
        }

        Ok(indicators)
    }
}
