//! Weight vectors, scored samples, and the result of a search run.

use serde::{Deserialize, Serialize};

use crate::error::FrontierError;

/// Absolute tolerance on `sum(weights) == 1`.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Long-only, fully-invested portfolio weights (a point on the simplex).
///
/// Every entry is non-negative and the entries sum to one within
/// [`WEIGHT_SUM_TOLERANCE`]. Short positions are not representable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct WeightVector(Vec<f64>);

impl WeightVector {
    /// Validate an explicit weight list.
    pub fn new(weights: Vec<f64>) -> Result<Self, FrontierError> {
        if weights.is_empty() {
            return Err(FrontierError::invalid("weights", "weight vector is empty"));
        }
        if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(FrontierError::invalid(
                "weights",
                format!("{w} is not a non-negative weight"),
            ));
        }
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(FrontierError::invalid(
                "weights",
                format!("weights sum to {sum}, expected 1"),
            ));
        }
        Ok(Self(weights))
    }

    /// Scale strictly positive draws so they sum to one.
    pub(crate) fn normalized(mut draws: Vec<f64>) -> Self {
        let total: f64 = draws.iter().sum();
        for w in &mut draws {
            *w /= total;
        }
        Self(draws)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl TryFrom<Vec<f64>> for WeightVector {
    type Error = FrontierError;

    fn try_from(weights: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(weights)
    }
}

impl From<WeightVector> for Vec<f64> {
    fn from(weights: WeightVector) -> Self {
        weights.0
    }
}

/// One scored candidate portfolio.
///
/// `index` is the sample's position in the deterministic random stream; it
/// is also the tie-break key during selection. Both Sharpe ratios are
/// derived from return and risk at construction, so a sample cannot be
/// edited into an inconsistent state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSample {
    index: usize,
    weights: WeightVector,
    expected_return: f64,
    risk: f64,
    sharpe_raw: f64,
    sharpe_adjusted: f64,
}

impl PortfolioSample {
    /// `risk` must be positive and finite; the evaluator checks this.
    pub(crate) fn new(
        index: usize,
        weights: WeightVector,
        expected_return: f64,
        risk: f64,
        risk_free_rate: f64,
    ) -> Self {
        Self {
            index,
            weights,
            expected_return,
            risk,
            sharpe_raw: expected_return / risk,
            sharpe_adjusted: (expected_return - risk_free_rate) / risk,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn weights(&self) -> &WeightVector {
        &self.weights
    }

    /// Annualized expected return, `w · μ`.
    pub fn expected_return(&self) -> f64 {
        self.expected_return
    }

    /// Annualized standard deviation, `sqrt(wᵗ Σ w)`.
    pub fn risk(&self) -> f64 {
        self.risk
    }

    /// `return / risk`. Used for selection.
    pub fn sharpe_raw(&self) -> f64 {
        self.sharpe_raw
    }

    /// `(return - risk_free_rate) / risk`. Used for reporting.
    pub fn sharpe_adjusted(&self) -> f64 {
        self.sharpe_adjusted
    }

    /// Sharpe ratio against a different risk-free rate.
    pub fn sharpe_at(&self, risk_free_rate: f64) -> f64 {
        (self.expected_return - risk_free_rate) / self.risk
    }
}

/// The chosen optimum plus every sample the run kept, in index order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    optimal: PortfolioSample,
    samples: Vec<PortfolioSample>,
    skipped: usize,
}

impl OptimizationResult {
    pub(crate) fn new(optimal: PortfolioSample, samples: Vec<PortfolioSample>, skipped: usize) -> Self {
        Self {
            optimal,
            samples,
            skipped,
        }
    }

    pub fn optimal(&self) -> &PortfolioSample {
        &self.optimal
    }

    pub fn samples(&self) -> &[PortfolioSample] {
        &self.samples
    }

    /// Degenerate samples excluded under the skip policy.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn into_samples(self) -> Vec<PortfolioSample> {
        self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_draws_sum_to_one() {
        let w = WeightVector::normalized(vec![0.2, 0.5, 0.3, 0.9]);
        let sum: f64 = w.as_slice().iter().sum();
        assert!((sum - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
        assert!(w.as_slice().iter().all(|x| *x >= 0.0));
    }

    #[test]
    fn single_draw_normalizes_to_exactly_one() {
        let w = WeightVector::normalized(vec![0.123_456]);
        assert_eq!(w.as_slice(), &[1.0]);
    }

    #[test]
    fn new_rejects_negative_weight() {
        assert!(WeightVector::new(vec![1.5, -0.5]).is_err());
    }

    #[test]
    fn new_rejects_sum_off_one() {
        assert!(WeightVector::new(vec![0.5, 0.4]).is_err());
        assert!(WeightVector::new(vec![0.5, 0.5]).is_ok());
    }

    #[test]
    fn new_rejects_empty() {
        assert!(WeightVector::new(vec![]).is_err());
    }

    #[test]
    fn deserialization_validates() {
        let ok: Result<WeightVector, _> = serde_json::from_str("[0.25, 0.75]");
        assert!(ok.is_ok());
        let bad: Result<WeightVector, _> = serde_json::from_str("[0.25, 0.25]");
        assert!(bad.is_err());
    }

    #[test]
    fn sample_derives_both_sharpe_ratios() {
        let s = PortfolioSample::new(4, WeightVector::new(vec![1.0]).unwrap(), 0.12, 0.2, 0.02);
        assert_eq!(s.index(), 4);
        assert!((s.sharpe_raw() - 0.6).abs() < 1e-12);
        assert!((s.sharpe_adjusted() - 0.5).abs() < 1e-12);
        assert_eq!(s.sharpe_at(0.02), s.sharpe_adjusted());
        assert!((s.sharpe_at(0.0) - s.sharpe_raw()).abs() < 1e-12);
    }
}
