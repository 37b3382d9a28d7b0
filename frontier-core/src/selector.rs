//! OptimalSelector: pick the best sample from a scored collection.
//!
//! Ranking is by `sharpe_raw` (return / risk, risk-free rate excluded) with
//! the lower sample index winning exact ties. `better_of` is associative and
//! commutative, so partial results from any partition of the index range
//! reduce to the same optimum.

use std::cmp::Ordering;

use crate::domain::PortfolioSample;
use crate::error::FrontierError;

/// The preferred of two samples: higher `sharpe_raw`, then lower index.
pub fn better_of<'a>(a: &'a PortfolioSample, b: &'a PortfolioSample) -> &'a PortfolioSample {
    match a.sharpe_raw().partial_cmp(&b.sharpe_raw()) {
        Some(Ordering::Greater) => a,
        Some(Ordering::Less) => b,
        _ => {
            if a.index() <= b.index() {
                a
            } else {
                b
            }
        }
    }
}

/// Sample with the maximum `sharpe_raw`; first (lowest index) among ties.
pub fn select_optimal(samples: &[PortfolioSample]) -> Result<&PortfolioSample, FrontierError> {
    samples
        .iter()
        .reduce(better_of)
        .ok_or(FrontierError::EmptySampleSet)
}

/// Sample with the lowest risk; lowest index among ties.
pub fn select_min_risk(samples: &[PortfolioSample]) -> Result<&PortfolioSample, FrontierError> {
    samples
        .iter()
        .reduce(|a, b| match a.risk().partial_cmp(&b.risk()) {
            Some(Ordering::Less) => a,
            Some(Ordering::Greater) => b,
            _ if a.index() <= b.index() => a,
            _ => b,
        })
        .ok_or(FrontierError::EmptySampleSet)
}

/// Upper envelope of the sample cloud, ordered by increasing risk.
///
/// A sample is on the envelope when its return strictly exceeds the return
/// of every sample with lower (or equal, earlier-index) risk. This is the
/// sampled approximation of the efficient frontier.
pub fn frontier_envelope(samples: &[PortfolioSample]) -> Vec<&PortfolioSample> {
    let mut by_risk: Vec<&PortfolioSample> = samples.iter().collect();
    by_risk.sort_by(|a, b| a.risk().total_cmp(&b.risk()).then(a.index().cmp(&b.index())));

    let mut envelope = Vec::new();
    let mut best_return = f64::NEG_INFINITY;
    for s in by_risk {
        if s.expected_return() > best_return {
            best_return = s.expected_return();
            envelope.push(s);
        }
    }
    envelope
}
