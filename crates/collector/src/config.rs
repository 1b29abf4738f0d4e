use anyhow::{bail, Context, Result};
use fundamentus_client::{ClientConfig, DEFAULT_URL_TEMPLATE, DEFAULT_USER_AGENT};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constituents::ConstituentsFormat;

/// Timing rules for one collection batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Wall-clock budget for all attempts on a single ticker.
    pub total_budget: Duration,
    /// Pause between two attempts on the same ticker.
    pub retry_interval: Duration,
    /// Pause between two tickers, applied whatever the outcome.
    pub pacing: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            total_budget: Duration::from_secs(300),
            retry_interval: Duration::from_secs(5),
            pacing: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub constituents_path: PathBuf,
    pub constituents_format: ConstituentsFormat,
    pub output_path: PathBuf,
    pub errors_path: PathBuf,
    pub client: ClientConfig,
    pub retry: RetryPolicy,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            constituents_path: PathBuf::from("IBXXDia_12-11-24.csv"),
            constituents_format: ConstituentsFormat::default(),
            output_path: PathBuf::from("dados_fundamentus.csv"),
            errors_path: PathBuf::from("erros_coleta_fundamentus.csv"),
            client: ClientConfig::default(),
            retry: RetryPolicy::default(),
        }
    }
}

fn secs_var(key: &str, default: Duration) -> Result<Duration> {
    match env::var(key) {
        Ok(v) => {
            let secs: u64 = v.trim().parse().with_context(|| format!("{key} must be whole seconds, got '{v}'"))?;
            Ok(Duration::from_secs(secs))
        }
        Err(_) => Ok(default),
    }
}

impl CollectorConfig {
    /// Read `FUNDAMENTUS_*` variables, falling back to the defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let defaults_format = defaults.constituents_format;

        let config = Self {
            constituents_path: env::var("FUNDAMENTUS_CONSTITUENTS")
                .map(PathBuf::from)
                .unwrap_or(defaults.constituents_path),
            constituents_format: ConstituentsFormat {
                header_rows: env::var("FUNDAMENTUS_HEADER_ROWS")
                    .unwrap_or_else(|_| defaults_format.header_rows.to_string())
                    .parse()
                    .context("FUNDAMENTUS_HEADER_ROWS")?,
                max_rows: match env::var("FUNDAMENTUS_MAX_ROWS") {
                    Ok(v) => Some(v.parse().context("FUNDAMENTUS_MAX_ROWS")?),
                    Err(_) => defaults_format.max_rows,
                },
                ..defaults_format
            },
            output_path: env::var("FUNDAMENTUS_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_path),
            errors_path: env::var("FUNDAMENTUS_ERRORS")
                .map(PathBuf::from)
                .unwrap_or(defaults.errors_path),
            client: ClientConfig {
                url_template: env::var("FUNDAMENTUS_URL_TEMPLATE")
                    .unwrap_or_else(|_| DEFAULT_URL_TEMPLATE.to_string()),
                user_agent: env::var("FUNDAMENTUS_USER_AGENT")
                    .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
                request_timeout: secs_var("FUNDAMENTUS_REQUEST_TIMEOUT", defaults.client.request_timeout)?,
            },
            retry: RetryPolicy {
                total_budget: secs_var("FUNDAMENTUS_RETRY_BUDGET", defaults.retry.total_budget)?,
                retry_interval: secs_var("FUNDAMENTUS_RETRY_INTERVAL", defaults.retry.retry_interval)?,
                pacing: secs_var("FUNDAMENTUS_PACING", defaults.retry.pacing)?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides (`--input`, `--output`, `--errors`,
    /// `--max-rows`, `--budget`, `--interval`, `--pacing`).
    pub fn apply_args(&mut self, args: &[String]) -> Result<()> {
        let value = |flag: &str| -> Option<&String> {
            args.iter()
                .position(|a| a == flag)
                .and_then(|i| args.get(i + 1))
        };
        let secs = |flag: &str| -> Result<Option<Duration>> {
            value(flag)
                .map(|v| {
                    v.parse::<u64>()
                        .map(Duration::from_secs)
                        .with_context(|| format!("{flag} expects whole seconds, got '{v}'"))
                })
                .transpose()
        };

        if let Some(v) = value("--input") {
            self.constituents_path = PathBuf::from(v);
        }
        if let Some(v) = value("--output") {
            self.output_path = PathBuf::from(v);
        }
        if let Some(v) = value("--errors") {
            self.errors_path = PathBuf::from(v);
        }
        if let Some(v) = value("--max-rows") {
            self.constituents_format.max_rows = Some(v.parse().with_context(|| format!("--max-rows '{v}'"))?);
        }
        if let Some(d) = secs("--budget")? {
            self.retry.total_budget = d;
        }
        if let Some(d) = secs("--interval")? {
            self.retry.retry_interval = d;
        }
        if let Some(d) = secs("--pacing")? {
            self.retry.pacing = d;
        }

        self.validate()
    }

    fn validate(&self) -> Result<()> {
        if self.retry.total_budget.is_zero() {
            bail!("retry budget must be positive");
        }
        if self.retry.retry_interval.is_zero() {
            bail!("retry interval must be positive");
        }
        Ok(())
    }
}
