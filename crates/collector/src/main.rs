//! collector: scrape ROE, P/L, dividend yield and 12-month return from
//! Fundamentus for every constituent of an index composition file.
//!
//! Usage:
//!   cargo run -p collector -- --input IBXXDia_12-11-24.csv
//!   cargo run -p collector -- --input ibov.csv --max-rows 100 --output dados.csv
//!   cargo run -p collector -- --budget 120 --interval 5 --pacing 1

use anyhow::Context;
use collector::constituents::load_constituents;
use collector::{Collector, CollectorConfig};
use fundamentus_client::FundamentusClient;
use screener_core::table;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "collector=info,fundamentus_client=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let mut config = CollectorConfig::from_env()?;
    config.apply_args(&args)?;

    let tickers = load_constituents(&config.constituents_path, &config.constituents_format)
        .with_context(|| format!("reading constituents from {}", config.constituents_path.display()))?;
    tracing::info!(
        "collector: {} tickers from {}, budget={}s interval={}s pacing={}s",
        tickers.len(),
        config.constituents_path.display(),
        config.retry.total_budget.as_secs(),
        config.retry.retry_interval.as_secs(),
        config.retry.pacing.as_secs()
    );

    let client = FundamentusClient::new(config.client.clone())?;
    let collector = Collector::new(client, config.retry);
    let outcome = collector.collect_all(&tickers).await;

    table::save_records(&config.output_path, &outcome.records)
        .with_context(|| format!("writing {}", config.output_path.display()))?;
    tracing::info!("Indicators exported to {}", config.output_path.display());

    if outcome.failures.is_empty() {
        println!("All tickers were collected successfully.");
    } else {
        table::save_failures(&config.errors_path, &outcome.failures)
            .with_context(|| format!("writing {}", config.errors_path.display()))?;
        tracing::info!("Failures recorded in {}", config.errors_path.display());
        println!(
            "{} of {} tickers could not be collected. See '{}' for details.",
            outcome.failures.len(),
            outcome.total(),
            config.errors_path.display()
        );
    }
    println!("Indicators saved to '{}'.", config.output_path.display());

    Ok(())
}
