//! PerformanceEvaluator: return, risk, and Sharpe for one weight vector.
//!
//! Pure scoring against read-only estimates. Cost is O(M²) per sample from
//! the covariance quadratic form.

use crate::domain::{PortfolioSample, WeightVector};
use crate::error::FrontierError;
use crate::estimator::{CovarianceMatrix, MarketEstimates};

/// Risk-free rate used when none is configured (2% annual).
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;

/// Expected portfolio return, `w · μ`.
pub fn portfolio_return(weights: &[f64], expected_returns: &[f64]) -> f64 {
    weights.iter().zip(expected_returns).map(|(w, mu)| w * mu).sum()
}

/// Portfolio variance, `wᵗ Σ w`.
pub fn portfolio_variance(weights: &[f64], covariance: &CovarianceMatrix) -> f64 {
    weights
        .iter()
        .enumerate()
        .map(|(i, wi)| {
            let row_dot: f64 = covariance.row(i).iter().zip(weights).map(|(c, wj)| c * wj).sum();
            wi * row_dot
        })
        .sum()
}

/// Scores weight vectors against one set of market estimates.
#[derive(Debug, Clone, Copy)]
pub struct PerformanceEvaluator<'a> {
    estimates: &'a MarketEstimates,
    risk_free_rate: f64,
}

impl<'a> PerformanceEvaluator<'a> {
    pub fn new(estimates: &'a MarketEstimates, risk_free_rate: f64) -> Result<Self, FrontierError> {
        if !risk_free_rate.is_finite() {
            return Err(FrontierError::invalid(
                "risk_free_rate",
                format!("{risk_free_rate} is not finite"),
            ));
        }
        if estimates.expected_returns.len() != estimates.num_assets() {
            return Err(FrontierError::ShapeMismatch {
                what: "expected return vector",
                expected: estimates.num_assets(),
                actual: estimates.expected_returns.len(),
            });
        }
        if estimates.covariance.dim() != estimates.num_assets() {
            return Err(FrontierError::ShapeMismatch {
                what: "covariance matrix",
                expected: estimates.num_assets(),
                actual: estimates.covariance.dim(),
            });
        }
        Ok(Self {
            estimates,
            risk_free_rate,
        })
    }

    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    pub fn estimates(&self) -> &'a MarketEstimates {
        self.estimates
    }

    /// Score `weights` as sample `index`.
    ///
    /// Fails with `DegenerateRisk` when the standard deviation is zero or not
    /// finite, instead of producing an infinite or NaN Sharpe ratio.
    pub fn evaluate(
        &self,
        index: usize,
        weights: WeightVector,
    ) -> Result<PortfolioSample, FrontierError> {
        let m = self.estimates.num_assets();
        if weights.len() != m {
            return Err(FrontierError::ShapeMismatch {
                what: "weight vector",
                expected: m,
                actual: weights.len(),
            });
        }

        let w = weights.as_slice();
        let expected_return = portfolio_return(w, &self.estimates.expected_returns);
        let risk = portfolio_variance(w, &self.estimates.covariance).sqrt();

        if !risk.is_finite() || risk <= 0.0 {
            return Err(FrontierError::DegenerateRisk { index, risk });
        }

        Ok(PortfolioSample::new(
            index,
            weights,
            expected_return,
            risk,
            self.risk_free_rate,
        ))
    }
}
