//! Typed failures surfaced by the estimation and search pipeline.
//!
//! Every variant is a local, recoverable condition. Nothing in this crate
//! catches its own errors; they propagate to the host, which decides whether
//! to abort the run or report to the user.

use thiserror::Error;

/// Errors from estimation, sampling, evaluation, and selection.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrontierError {
    /// Fewer than two price rows: no return can be formed.
    #[error("insufficient data: {rows} price rows < minimum 2")]
    InsufficientData { rows: usize },

    /// A count, rate, or price that the pipeline cannot work with.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Portfolio standard deviation is zero or not finite, so a Sharpe
    /// ratio would be infinite or undefined.
    #[error("degenerate risk for sample {index}: portfolio standard deviation is {risk}")]
    DegenerateRisk { index: usize, risk: f64 },

    #[error("no portfolio samples to select from")]
    EmptySampleSet,

    /// Weight vector, return vector, and covariance disagree on asset count.
    #[error("shape mismatch: {what} has length {actual}, expected {expected}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl FrontierError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// True for the per-sample condition a run may choose to skip.
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Self::DegenerateRisk { .. })
    }
}
