use anyhow::{bail, Context, Result};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Which portfolio formulation to solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// Capped weights summing to one.
    #[default]
    Continuous,
    /// Equal inclusion, at most N tickers.
    Binary,
}

impl FromStr for Variant {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "continuous" | "weights" => Ok(Variant::Continuous),
            "binary" | "selection" => Ok(Variant::Binary),
            other => bail!("unknown variant '{other}', expected 'continuous' or 'binary'"),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Continuous => write!(f, "continuous"),
            Variant::Binary => write!(f, "binary"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub variant: Variant,
    /// `None` lets the solver run to completion.
    pub solver_timeout: Option<Duration>,
    pub json: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("dados_fundamentus.csv"),
            output_path: PathBuf::from("acoes_selecionadas_portfolio.csv"),
            variant: Variant::default(),
            solver_timeout: Some(Duration::from_secs(60)),
            json: false,
        }
    }
}

/// Whole seconds, with 0 meaning no limit.
fn parse_timeout(raw: &str) -> Result<Option<Duration>> {
    let secs: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("solver timeout must be whole seconds, got '{raw}'"))?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}

impl OptimizerConfig {
    /// Read `OPTIMIZER_*` variables, falling back to the defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            input_path: env::var("OPTIMIZER_INPUT")
                .map(PathBuf::from)
                .unwrap_or(defaults.input_path),
            output_path: env::var("OPTIMIZER_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_path),
            variant: match env::var("OPTIMIZER_VARIANT") {
                Ok(v) => v.parse()?,
                Err(_) => defaults.variant,
            },
            solver_timeout: match env::var("OPTIMIZER_TIMEOUT") {
                Ok(v) => parse_timeout(&v)?,
                Err(_) => defaults.solver_timeout,
            },
            json: env::var("OPTIMIZER_JSON")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.json),
        })
    }

    /// Apply command-line overrides (`--input`, `--output`, `--variant`,
    /// `--timeout`, `--json`).
    pub fn apply_args(&mut self, args: &[String]) -> Result<()> {
        let value = |flag: &str| -> Option<&String> {
            args.iter()
                .position(|a| a == flag)
                .and_then(|i| args.get(i + 1))
        };

        if let Some(v) = value("--input") {
            self.input_path = PathBuf::from(v);
        }
        if let Some(v) = value("--output") {
            self.output_path = PathBuf::from(v);
        }
        if let Some(v) = value("--variant") {
            self.variant = v.parse()?;
        }
        if let Some(v) = value("--timeout") {
            self.solver_timeout = parse_timeout(v)?;
        }
        if args.iter().any(|a| a == "--json") {
            self.json = true;
        }
        Ok(())
    }
}
