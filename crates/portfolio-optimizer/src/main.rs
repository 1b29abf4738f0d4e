//! portfolio-optimizer: filter the collected indicator table and solve one of
//! the two portfolio models over it.
//!
//! Usage:
//!   cargo run -p portfolio-optimizer
//!   cargo run -p portfolio-optimizer -- --variant binary --timeout 30
//!   cargo run -p portfolio-optimizer -- --input dados.csv --json

use anyhow::Context;
use portfolio_optimizer::{
    block_on_detached, optimize, BinarySelection, ContinuousAllocation, GoodLpSolver, OptimizerConfig, Variant,
};
use screener_core::{table, FilterPolicy};

fn main() -> anyhow::Result<()> {
    // A timed-out solve leaves its blocking thread behind; the runtime must
    // not wait for it on the way out.
    block_on_detached(run())?
}

async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portfolio_optimizer=info,screener_core=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let mut config = OptimizerConfig::from_env()?;
    config.apply_args(&args)?;

    let records = table::load_records(&config.input_path)
        .with_context(|| format!("reading indicators from {}", config.input_path.display()))?;
    tracing::info!(
        "portfolio-optimizer: {} records from {}, variant={}, timeout={:?}",
        records.len(),
        config.input_path.display(),
        config.variant,
        config.solver_timeout
    );

    let filter = FilterPolicy::default();
    let report = match config.variant {
        Variant::Continuous => {
            optimize(&ContinuousAllocation::default(), &records, &filter, &GoodLpSolver, config.solver_timeout).await?
        }
        Variant::Binary => {
            optimize(&BinarySelection::default(), &records, &filter, &GoodLpSolver, config.solver_timeout).await?
        }
    };

    if config.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }

    if report.is_optimal() {
        report
            .save_holdings(&config.output_path)
            .with_context(|| format!("writing {}", config.output_path.display()))?;
        println!("Selected holdings exported to '{}'.", config.output_path.display());
    }

    Ok(())
}
