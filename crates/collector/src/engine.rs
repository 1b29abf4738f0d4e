use screener_core::{
    CollectionFailure, CollectionOutcome, IndicatorSource, Indicators, ScreenerError, TickerRecord,
};
use tokio::time::{sleep, Instant};

use crate::config::RetryPolicy;

/// Sequential collector: one ticker at a time, each retried on a wall-clock
/// budget, with a fixed pause between tickers.
pub struct Collector<S> {
    source: S,
    policy: RetryPolicy,
}

impl<S: IndicatorSource> Collector<S> {
    pub fn new(source: S, policy: RetryPolicy) -> Self {
        Self { source, policy }
    }

    /// Fetch one ticker, retrying transient failures every `retry_interval`
    /// until it succeeds or `total_budget` has elapsed.
    pub async fn collect_with_retry(&self, ticker: &str) -> Result<Indicators, ScreenerError> {
        let started = Instant::now();
        let mut attempts = 0u32;

        let last_error = loop {
            attempts += 1;
            let err = match self.source.fetch_indicators(ticker).await {
                Ok(indicators) => {
                    if attempts > 1 {
                        tracing::info!("{} succeeded on attempt {}", ticker, attempts);
                    }
                    return Ok(indicators);
                }
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) => e,
            };

            if started.elapsed() >= self.policy.total_budget {
                break err;
            }
            tracing::info!(
                "Attempt {} for {} failed ({}). Retrying in {}s...",
                attempts,
                ticker,
                err,
                self.policy.retry_interval.as_secs_f64()
            );
            sleep(self.policy.retry_interval).await;

            if started.elapsed() >= self.policy.total_budget {
                break err;
            }
        };

        let exhausted = ScreenerError::RetryBudgetExhausted {
            ticker: ticker.to_string(),
            budget: self.policy.total_budget,
            attempts,
            last_error: last_error.to_string(),
        };
        tracing::error!("{}", exhausted);
        Err(exhausted)
    }

    /// Collect every ticker in order. Each ticker ends up either in
    /// `records` or in `failures`; one ticker's failure never stops the batch.
    pub async fn collect_all(&self, tickers: &[String]) -> CollectionOutcome {
        let total = tickers.len();
        let mut outcome = CollectionOutcome::default();

        for (i, ticker) in tickers.iter().enumerate() {
            tracing::info!("[{}/{}] Collecting {}...", i + 1, total, ticker);

            match self.collect_with_retry(ticker).await {
                Ok(indicators) => {
                    tracing::info!("[{}/{}] {} collected", i + 1, total, ticker);
                    outcome.records.push(TickerRecord::new(ticker.as_str(), indicators));
                }
                Err(e) => {
                    tracing::error!("[{}/{}] {} failed: {}", i + 1, total, ticker, e);
                    outcome.failures.push(CollectionFailure {
                        ticker: ticker.clone(),
                        reason: e.to_string(),
                    });
                }
            }

            if i + 1 < total && !self.policy.pacing.is_zero() {
                sleep(self.policy.pacing).await;
            }
        }

        tracing::info!(
            "Collection finished: {} collected ({} incomplete), {} failed",
            outcome.records.len(),
            outcome.incomplete().count(),
            outcome.failures.len()
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    const NEVER: u32 = u32::MAX;

    /// Fails each ticker a scripted number of times before answering.
    struct ScriptedSource {
        failures_before_success: HashMap<String, u32>,
        fatal: Vec<String>,
        calls: Mutex<HashMap<String, u32>>,
    }

    impl ScriptedSource {
        fn new(script: &[(&str, u32)]) -> Self {
            Self {
                failures_before_success: script.iter().map(|(t, n)| (t.to_string(), *n)).collect(),
                fatal: Vec::new(),
                calls: Mutex::new(HashMap::new()),
            }
        }

        fn calls(&self, ticker: &str) -> u32 {
            self.calls.lock().unwrap().get(ticker).copied().unwrap_or(0)
        }
    }

    fn complete() -> Indicators {
        Indicators {
            roe: Some(15.0),
            price_earnings: Some(7.0),
            dividend_yield: Some(6.0),
            trailing_return: Some(12.0),
        }
    }

    #[async_trait]
    impl IndicatorSource for ScriptedSource {
        async fn fetch_indicators(&self, ticker: &str) -> Result<Indicators, ScreenerError> {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                let n = calls.entry(ticker.to_string()).or_insert(0);
                *n += 1;
                *n
            };
            if self.fatal.iter().any(|t| t == ticker) {
                return Err(ScreenerError::Config("bad url".into()));
            }
            let fail_count = self.failures_before_success.get(ticker).copied().unwrap_or(0);
            if call <= fail_count {
                return Err(ScreenerError::Status {
                    status: 503,
                    url: format!("http://test/{ticker}"),
                });
            }
            if ticker == "PART3" {
                return Ok(Indicators {
                    dividend_yield: None,
                    ..complete()
                });
            }
            Ok(complete())
        }
    }

    fn policy() -> RetryPolicy {
        RetryPolicy {
            total_budget: Duration::from_secs(300),
            retry_interval: Duration::from_secs(5),
            pacing: Duration::from_secs(1),
        }
    }

    // Paused time still rounds timer deadlines up to the millisecond
    fn assert_near(actual: Duration, expected: Duration) {
        assert!(actual >= expected, "{actual:?} < {expected:?}");
        assert!(actual < expected + Duration::from_millis(50), "{actual:?} >> {expected:?}");
    }

    fn tickers(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_attempt_k_stops_retrying() {
        let collector = Collector::new(ScriptedSource::new(&[("WEGE3", 2)]), policy());
        let started = Instant::now();

        let indicators = collector.collect_with_retry("WEGE3").await.unwrap();

        assert_eq!(indicators, complete());
        assert_eq!(collector.source.calls("WEGE3"), 3);
        assert_near(started.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_exhaustion() {
        let collector = Collector::new(ScriptedSource::new(&[("OIBR3", NEVER)]), policy());
        let started = Instant::now();

        let err = collector.collect_with_retry("OIBR3").await.unwrap_err();
        let elapsed = started.elapsed();

        match err {
            ScreenerError::RetryBudgetExhausted { ticker, attempts, .. } => {
                assert_eq!(ticker, "OIBR3");
                assert_eq!(attempts, 60);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(elapsed >= policy().total_budget);
        assert!(elapsed <= policy().total_budget + policy().retry_interval);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_transient_error_is_not_retried() {
        let mut source = ScriptedSource::new(&[]);
        source.fatal.push("BAD3".into());
        let collector = Collector::new(source, policy());

        let err = collector.collect_with_retry("BAD3").await.unwrap_err();
        assert!(matches!(err, ScreenerError::Config(_)));
        assert_eq!(collector.source.calls("BAD3"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_partition_is_exhaustive_and_disjoint() {
        let source = ScriptedSource::new(&[("ITSA4", 0), ("OIBR3", NEVER), ("GGBR4", 3), ("PART3", 0)]);
        let collector = Collector::new(source, policy());
        let input = tickers(&["ITSA4", "OIBR3", "GGBR4", "PART3"]);

        let outcome = collector.collect_all(&input).await;

        let collected: Vec<&str> = outcome.records.iter().map(|r| r.ticker.as_str()).collect();
        let failed: Vec<&str> = outcome.failures.iter().map(|f| f.ticker.as_str()).collect();
        assert_eq!(collected, vec!["ITSA4", "GGBR4", "PART3"]);
        assert_eq!(failed, vec!["OIBR3"]);
        assert_eq!(outcome.total(), input.len());
        for t in &input {
            assert!(collected.contains(&t.as_str()) ^ failed.contains(&t.as_str()));
        }
        assert!(outcome.failures[0].reason.contains("OIBR3"));

        // Incomplete pages are kept, with the missing field as None
        let partial: Vec<&str> = outcome.incomplete().map(|r| r.ticker.as_str()).collect();
        assert_eq!(partial, vec!["PART3"]);
        assert_eq!(outcome.records[2].dividend_yield, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacing_between_tickers() {
        let collector = Collector::new(ScriptedSource::new(&[]), policy());
        let started = Instant::now();

        let outcome = collector.collect_all(&tickers(&["ABEV3", "B3SA3", "RENT3"])).await;

        assert_eq!(outcome.records.len(), 3);
        assert_near(started.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacing_applies_after_failure() {
        let mut source = ScriptedSource::new(&[]);
        source.fatal.push("BAD3".into());
        let collector = Collector::new(source, policy());
        let started = Instant::now();

        let outcome = collector.collect_all(&tickers(&["ABEV3", "BAD3", "RENT3"])).await;

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(collector.source.calls("BAD3"), 1);
        assert_near(started.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let collector = Collector::new(ScriptedSource::new(&[]), policy());
        let outcome = collector.collect_all(&[]).await;
        assert_eq!(outcome.total(), 0);
    }
}
