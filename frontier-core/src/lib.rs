//! Frontier Core: estimation and Monte Carlo search over long-only portfolios.
//!
//! This crate contains the algorithmic part of the optimizer:
//! - Domain types (price panel, weight vectors, scored samples, results)
//! - Return estimation (annualized mean vector and sample covariance)
//! - Deterministic per-index weight sampling on the simplex
//! - Portfolio scoring (return, risk, raw and risk-free-adjusted Sharpe)
//! - Selection of the maximum raw-Sharpe sample, plus the sampled frontier
//! - Run fingerprinting
//!
//! No I/O happens here. Loading, configuration, parallel driving, and
//! reporting live in `frontier-runner`.

pub mod domain;
pub mod error;
pub mod estimator;
pub mod evaluator;
pub mod fingerprint;
pub mod optimize;
pub mod rng;
pub mod sampler;
pub mod selector;

pub use domain::{OptimizationResult, PortfolioSample, PricePanel, WeightVector};
pub use error::FrontierError;
pub use estimator::{estimate, CovarianceMatrix, MarketEstimates, ReturnMatrix};
pub use evaluator::{PerformanceEvaluator, DEFAULT_RISK_FREE_RATE};
pub use fingerprint::RunFingerprint;
pub use optimize::{optimize, optimize_estimates, DegeneratePolicy, RunParams, SampleCollector};
pub use sampler::PortfolioSampler;
pub use selector::{frontier_envelope, select_min_risk, select_optimal};
