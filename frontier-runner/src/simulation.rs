//! Simulation driver: batched, parallel, cancellable evaluation of the
//! sample index range.
//!
//! The index range `0..K` is cut into batches of `batch_size`. Each batch is
//! evaluated with rayon (or sequentially when `threads == 1`) and its
//! outcomes are folded, in index order, into a [`SampleCollector`]. Between
//! batches the driver checks the cancel flag and reports progress.
//!
//! Because every sample depends only on its index and the read-only
//! estimates, the result is bit-identical to `frontier_core::optimize` for
//! any thread count or batch size.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use frontier_core::optimize::sample_at;
use frontier_core::{
    estimate, FrontierError, MarketEstimates, OptimizationResult, PerformanceEvaluator,
    PortfolioSample, PortfolioSampler, PricePanel, RunFingerprint, RunParams, SampleCollector,
};

use crate::config::OptimizerConfig;

/// Which stage of the pipeline failed.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("estimation failed: {0}")]
    Estimation(#[source] FrontierError),
    #[error("sampling setup failed: {0}")]
    Sampling(#[source] FrontierError),
    #[error("evaluation failed: {0}")]
    Evaluation(#[source] FrontierError),
    #[error("selection failed: {0}")]
    Selection(#[source] FrontierError),
    #[error("cancelled after {completed} of {total} samples")]
    Cancelled { completed: usize, total: usize },
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl SimulationError {
    /// The underlying core failure, if this error wraps one.
    pub fn frontier_error(&self) -> Option<&FrontierError> {
        match self {
            Self::Estimation(e) | Self::Sampling(e) | Self::Evaluation(e) | Self::Selection(e) => {
                Some(e)
            }
            Self::Cancelled { .. } | Self::ThreadPool(_) => None,
        }
    }
}

/// Progress snapshot sent after each batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationProgress {
    pub completed: usize,
    pub total: usize,
    pub kept: usize,
    pub skipped: usize,
    pub best_sharpe_raw: Option<f64>,
    pub elapsed_secs: f64,
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    /// Parameters the samples were scored with.
    pub params: RunParams,
    pub estimates: MarketEstimates,
    pub result: OptimizationResult,
    pub fingerprint: RunFingerprint,
    pub elapsed_secs: f64,
}

/// Run the full pipeline on `panel` with `config`.
///
/// `config` is used as given; callers that want host range limits call
/// `OptimizerConfig::validate()` first. A zero `batch_size` is treated as one.
///
/// # Arguments
/// - `progress_cb`: optional callback invoked after every batch.
/// - `cancel`: optional flag checked between batches.
pub fn run_simulation(
    panel: &PricePanel,
    config: &OptimizerConfig,
    progress_cb: Option<&dyn Fn(&SimulationProgress)>,
    cancel: Option<&AtomicBool>,
) -> Result<SimulationOutcome, SimulationError> {
    let start_time = Instant::now();
    let params = config.to_run_params();
    let fingerprint = RunFingerprint::compute(panel, &params);

    let estimates = estimate(panel).map_err(SimulationError::Estimation)?;
    debug!(
        assets = estimates.num_assets(),
        observations = estimates.returns.num_rows(),
        "estimated expected returns and covariance"
    );

    let sampler = PortfolioSampler::new(estimates.num_assets(), params.num_portfolios, params.seed)
        .map_err(SimulationError::Sampling)?;
    let evaluator = PerformanceEvaluator::new(&estimates, params.risk_free_rate)
        .map_err(SimulationError::Evaluation)?;

    // Build a dedicated pool if threads > 1
    let thread_pool = if config.threads > 1 {
        Some(
            rayon::ThreadPoolBuilder::new()
                .num_threads(config.threads)
                .build()?,
        )
    } else {
        None
    };

    let total = sampler.num_samples();
    let batch_size = config.batch_size.max(1);
    let mut collector = SampleCollector::new(params.degenerate_policy, total);
    let mut completed = 0usize;

    while completed < total {
        if cancel.is_some_and(|f| f.load(Ordering::Relaxed)) {
            warn!(completed, total, "simulation cancelled");
            return Err(SimulationError::Cancelled { completed, total });
        }

        let end = (completed + batch_size).min(total);
        let outcomes: Vec<Result<PortfolioSample, FrontierError>> = match (&thread_pool, config.threads) {
            (Some(tp), _) => tp.install(|| {
                (completed..end)
                    .into_par_iter()
                    .map(|i| sample_at(&sampler, &evaluator, i))
                    .collect()
            }),
            (None, 1) => (completed..end)
                .map(|i| sample_at(&sampler, &evaluator, i))
                .collect(),
            (None, _) => (completed..end)
                .into_par_iter()
                .map(|i| sample_at(&sampler, &evaluator, i))
                .collect(),
        };

        for outcome in outcomes {
            collector.push(outcome).map_err(SimulationError::Evaluation)?;
        }
        completed = end;

        debug!(completed, total, skipped = collector.skipped(), "batch complete");
        if let Some(cb) = progress_cb {
            cb(&SimulationProgress {
                completed,
                total,
                kept: collector.len(),
                skipped: collector.skipped(),
                best_sharpe_raw: collector.best().map(|s| s.sharpe_raw()),
                elapsed_secs: start_time.elapsed().as_secs_f64(),
            });
        }
    }

    if collector.skipped() > 0 {
        warn!(
            skipped = collector.skipped(),
            total, "excluded samples with zero or non-finite risk"
        );
    }

    let result = collector.finish().map_err(SimulationError::Selection)?;
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    info!(
        run_id = fingerprint.short_id(),
        samples = result.samples().len(),
        optimal_index = result.optimal().index(),
        sharpe_raw = result.optimal().sharpe_raw(),
        elapsed_secs,
        "simulation complete"
    );

    Ok(SimulationOutcome {
        params,
        estimates,
        result,
        fingerprint,
        elapsed_secs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

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

    fn config(threads: usize, batch_size: usize) -> OptimizerConfig {
        OptimizerConfig {
            num_portfolios: 1_000,
            threads,
            batch_size,
            ..OptimizerConfig::default()
        }
    }

    #[test]
    fn matches_sequential_core() {
        let cfg = config(1, 100);
        let outcome = run_simulation(&panel(), &cfg, None, None).unwrap();
        let reference = frontier_core::optimize(&panel(), &cfg.to_run_params()).unwrap();
        assert_eq!(outcome.result, reference);
    }

    #[test]
    fn progress_fires_once_per_batch() {
        let calls = Cell::new(0usize);
        let last_completed = Cell::new(0usize);
        let cb = |p: &SimulationProgress| {
            calls.set(calls.get() + 1);
            assert!(p.completed > last_completed.get());
            last_completed.set(p.completed);
        };
        run_simulation(&panel(), &config(1, 300), Some(&cb), None).unwrap();
        assert_eq!(calls.get(), 4); // 300 + 300 + 300 + 100
        assert_eq!(last_completed.get(), 1_000);
    }

    #[test]
    fn pre_set_cancel_flag_stops_before_first_batch() {
        let cancel = AtomicBool::new(true);
        let err = run_simulation(&panel(), &config(1, 100), None, Some(&cancel)).unwrap_err();
        assert!(matches!(err, SimulationError::Cancelled { completed: 0, total: 1_000 }));
    }

    #[test]
    fn cancel_from_progress_callback_stops_between_batches() {
        let cancel = AtomicBool::new(false);
        let cb = |p: &SimulationProgress| {
            if p.completed >= 200 {
                cancel.store(true, Ordering::Relaxed);
            }
        };
        let err = run_simulation(&panel(), &config(1, 100), Some(&cb), Some(&cancel)).unwrap_err();
        assert!(matches!(err, SimulationError::Cancelled { completed: 200, .. }));
    }

    #[test]
    fn estimation_failure_is_labelled() {
        let short = PricePanel::new(vec!["A".into()], vec![vec![1.0]]).unwrap();
        let err = run_simulation(&short, &config(1, 100), None, None).unwrap_err();
        assert!(matches!(err, SimulationError::Estimation(FrontierError::InsufficientData { rows: 1 })));
        assert!(err.frontier_error().is_some());
    }

    #[test]
    fn all_degenerate_is_a_selection_failure() {
        let flat = PricePanel::new(vec!["CASH".into()], vec![vec![1.0], vec![1.0], vec![1.0]])
            .unwrap();
        let err = run_simulation(&flat, &config(1, 100), None, None).unwrap_err();
        assert!(matches!(err, SimulationError::Selection(FrontierError::EmptySampleSet)));
    }

    #[test]
    fn fail_policy_is_an_evaluation_failure() {
        let flat = PricePanel::new(vec!["CASH".into()], vec![vec![1.0], vec![1.0], vec![1.0]])
            .unwrap();
        let cfg = OptimizerConfig {
            degenerate_policy: frontier_core::DegeneratePolicy::Fail,
            ..config(2, 100)
        };
        let err = run_simulation(&flat, &cfg, None, None).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Evaluation(FrontierError::DegenerateRisk { index: 0, .. })
        ));
    }
}
