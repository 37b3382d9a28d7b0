//! One optimization run: panel in, optimum plus sample cloud out.
//!
//! `optimize` is the sequential composition of estimation, sampling,
//! evaluation, and selection. Each sample is a pure function of its index,
//! so parallel drivers evaluate index ranges independently and feed the
//! outcomes, in index order, through the same [`SampleCollector`].

use serde::{Deserialize, Serialize};

use crate::domain::{OptimizationResult, PortfolioSample, PricePanel};
use crate::error::FrontierError;
use crate::estimator::{estimate, MarketEstimates};
use crate::evaluator::{PerformanceEvaluator, DEFAULT_RISK_FREE_RATE};
use crate::sampler::PortfolioSampler;
use crate::selector::{better_of, select_optimal};

/// What to do with a sample whose risk is zero or not finite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneratePolicy {
    /// Exclude the sample and count it.
    #[default]
    Skip,
    /// Abort the run with the lowest-index degenerate sample's error.
    Fail,
}

/// Parameters of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunParams {
    pub risk_free_rate: f64,
    pub num_portfolios: usize,
    pub seed: u64,
    pub degenerate_policy: DegeneratePolicy,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            num_portfolios: 10_000,
            seed: 42,
            degenerate_policy: DegeneratePolicy::Skip,
        }
    }
}

/// Evaluate sample `index`: draw its weights, then score them.
pub fn sample_at(
    sampler: &PortfolioSampler,
    evaluator: &PerformanceEvaluator<'_>,
    index: usize,
) -> Result<PortfolioSample, FrontierError> {
    evaluator.evaluate(index, sampler.weights_at(index))
}

/// Accumulates per-sample outcomes under a degenerate-sample policy.
///
/// Outcomes must be pushed in ascending index order; that is what makes the
/// `Fail` policy report the lowest-index degenerate sample and keeps the
/// collection ordered for renderers.
#[derive(Debug)]
pub struct SampleCollector {
    policy: DegeneratePolicy,
    samples: Vec<PortfolioSample>,
    skipped: usize,
    /// Position in `samples` of the running optimum.
    best: Option<usize>,
}

impl SampleCollector {
    pub fn new(policy: DegeneratePolicy, capacity: usize) -> Self {
        Self {
            policy,
            samples: Vec::with_capacity(capacity),
            skipped: 0,
            best: None,
        }
    }

    pub fn push(
        &mut self,
        outcome: Result<PortfolioSample, FrontierError>,
    ) -> Result<(), FrontierError> {
        match outcome {
            Ok(sample) => {
                let current = self.best.map(|b| &self.samples[b]);
                let keep = current.is_some_and(|c| std::ptr::eq(better_of(c, &sample), c));
                if !keep {
                    self.best = Some(self.samples.len());
                }
                self.samples.push(sample);
                Ok(())
            }
            Err(e) if e.is_degenerate() && self.policy == DegeneratePolicy::Skip => {
                self.skipped += 1;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Current best sample, if any.
    pub fn best(&self) -> Option<&PortfolioSample> {
        self.best.map(|b| &self.samples[b])
    }

    /// Select the optimum and seal the collection.
    pub fn finish(self) -> Result<OptimizationResult, FrontierError> {
        let optimal = select_optimal(&self.samples)?.clone();
        Ok(OptimizationResult::new(optimal, self.samples, self.skipped))
    }
}

/// Run the search against precomputed estimates.
pub fn optimize_estimates(
    estimates: &MarketEstimates,
    params: &RunParams,
) -> Result<OptimizationResult, FrontierError> {
    let sampler = PortfolioSampler::new(estimates.num_assets(), params.num_portfolios, params.seed)?;
    let evaluator = PerformanceEvaluator::new(estimates, params.risk_free_rate)?;

    let mut collector = SampleCollector::new(params.degenerate_policy, params.num_portfolios);
    for index in 0..sampler.num_samples() {
        collector.push(sample_at(&sampler, &evaluator, index))?;
    }
    collector.finish()
}

/// Estimate, sample, evaluate, and select in one pass.
pub fn optimize(
    panel: &PricePanel,
    params: &RunParams,
) -> Result<OptimizationResult, FrontierError> {
    let estimates = estimate(panel)?;
    optimize_estimates(&estimates, params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> PricePanel {
        PricePanel::new(
            vec!["A".into(), "B".into(), "C".into()],
            vec![
                vec![100.0, 50.0, 20.0],
                vec![101.0, 49.0, 20.4],
                vec![103.0, 49.5, 20.1],
                vec![102.0, 50.5, 20.6],
                vec![104.5, 50.0, 20.9],
            ],
        )
        .unwrap()
    }

    fn params(n: usize) -> RunParams {
        RunParams {
            num_portfolios: n,
            ..RunParams::default()
        }
    }

    #[test]
    fn keeps_every_sample_in_index_order() {
        let result = optimize(&panel(), &params(200)).unwrap();
        assert_eq!(result.samples().len(), 200);
        assert_eq!(result.skipped(), 0);
        assert!(result.samples().iter().enumerate().all(|(i, s)| s.index() == i));
    }

    #[test]
    fn optimum_is_in_the_collection() {
        let result = optimize(&panel(), &params(300)).unwrap();
        let opt = result.optimal();
        assert_eq!(&result.samples()[opt.index()], opt);
        assert!(result
            .samples()
            .iter()
            .all(|s| s.sharpe_raw() <= opt.sharpe_raw()));
    }

    #[test]
    fn one_portfolio_is_both_set_and_optimum() {
        let result = optimize(&panel(), &params(1)).unwrap();
        assert_eq!(result.samples().len(), 1);
        assert_eq!(result.optimal(), &result.samples()[0]);
    }

    #[test]
    fn zero_portfolios_is_invalid() {
        let err = optimize(&panel(), &params(0)).unwrap_err();
        assert!(matches!(err, FrontierError::InvalidParameter { name: "num_samples", .. }));
    }

    #[test]
    fn repeated_runs_are_identical() {
        let a = optimize(&panel(), &params(500)).unwrap();
        let b = optimize(&panel(), &params(500)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn flat_single_asset_skips_everything_then_fails_selection() {
        let flat = PricePanel::new(vec!["CASH".into()], vec![vec![1.0], vec![1.0], vec![1.0]])
            .unwrap();
        let err = optimize(&flat, &params(10)).unwrap_err();
        assert_eq!(err, FrontierError::EmptySampleSet);
    }

    #[test]
    fn fail_policy_reports_first_degenerate_index() {
        let flat = PricePanel::new(vec!["CASH".into()], vec![vec![1.0], vec![1.0], vec![1.0]])
            .unwrap();
        let p = RunParams {
            degenerate_policy: DegeneratePolicy::Fail,
            ..params(10)
        };
        assert_eq!(
            optimize(&flat, &p).unwrap_err(),
            FrontierError::DegenerateRisk { index: 0, risk: 0.0 }
        );
    }

    #[test]
    fn collector_counts_skips_and_propagates_other_errors() {
        let mut c = SampleCollector::new(DegeneratePolicy::Skip, 4);
        c.push(Err(FrontierError::DegenerateRisk { index: 0, risk: 0.0 }))
            .unwrap();
        assert_eq!(c.skipped(), 1);
        assert!(c.is_empty());
        assert!(c.best().is_none());

        let err = c.push(Err(FrontierError::EmptySampleSet)).unwrap_err();
        assert_eq!(err, FrontierError::EmptySampleSet);
    }

    #[test]
    fn running_best_agrees_with_final_selection() {
        let est = estimate(&panel()).unwrap();
        let sampler = PortfolioSampler::new(3, 400, 7).unwrap();
        let eval = PerformanceEvaluator::new(&est, 0.02).unwrap();
        let mut c = SampleCollector::new(DegeneratePolicy::Skip, 400);
        for i in 0..400 {
            c.push(sample_at(&sampler, &eval, i)).unwrap();
            let expected = select_optimal(&c.samples).unwrap();
            assert_eq!(c.best().unwrap().index(), expected.index());
        }
        let best_index = c.best().unwrap().index();
        assert_eq!(c.finish().unwrap().optimal().index(), best_index);
    }
}
