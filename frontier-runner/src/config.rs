//! Serializable optimizer configuration.
//!
//! Loaded from TOML, filled from `Default`, then range-checked by
//! `validate()`. Range limits are host policy; the core only requires at
//! least one portfolio and one asset.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use frontier_core::{DegeneratePolicy, RunParams, DEFAULT_RISK_FREE_RATE};

pub const RISK_FREE_RATE_RANGE: (f64, f64) = (0.0, 0.10);
pub const NUM_PORTFOLIOS_RANGE: (usize, usize) = (1_000, 50_000);

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("{field} = {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{field} must be >= 1")]
    Zero { field: &'static str },
}

/// Configuration for one optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Annual risk-free rate as a fraction (0.02 = 2%).
    pub risk_free_rate: f64,
    /// Number of random portfolios to sample.
    pub num_portfolios: usize,
    /// Master seed for the per-index weight streams.
    pub seed: u64,
    /// Skip or fail on zero/non-finite risk samples.
    pub degenerate_policy: DegeneratePolicy,
    /// 0 = rayon global pool, 1 = sequential, >1 = dedicated pool of that size.
    pub threads: usize,
    /// Samples evaluated between cancellation and progress checkpoints.
    pub batch_size: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            num_portfolios: 10_000,
            seed: 42,
            degenerate_policy: DegeneratePolicy::Skip,
            threads: 0,
            batch_size: 1_000,
        }
    }
}

impl OptimizerConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check host-level ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (lo, hi) = RISK_FREE_RATE_RANGE;
        if !(lo..=hi).contains(&self.risk_free_rate) {
            return Err(ConfigError::OutOfRange {
                field: "risk_free_rate",
                value: self.risk_free_rate,
                min: lo,
                max: hi,
            });
        }
        let (lo, hi) = NUM_PORTFOLIOS_RANGE;
        if !(lo..=hi).contains(&self.num_portfolios) {
            return Err(ConfigError::OutOfRange {
                field: "num_portfolios",
                value: self.num_portfolios as f64,
                min: lo as f64,
                max: hi as f64,
            });
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Zero { field: "batch_size" });
        }
        Ok(())
    }

    pub fn to_run_params(&self) -> RunParams {
        RunParams {
            risk_free_rate: self.risk_free_rate,
            num_portfolios: self.num_portfolios,
            seed: self.seed,
            degenerate_policy: self.degenerate_policy,
        }
    }
}
