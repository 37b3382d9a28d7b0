//! Frontier Runner: host-side orchestration around `frontier-core`.
//!
//! This crate provides:
//! - TOML configuration with host range validation
//! - CSV price loading with date sorting and cell-level rejection
//! - The batched, parallel, cancellable simulation driver
//! - Report building and artifact export (JSON, CSV, Markdown)

pub mod config;
pub mod data_loader;
pub mod export;
pub mod report;
pub mod simulation;

pub use config::{ConfigError, OptimizerConfig, NUM_PORTFOLIOS_RANGE, RISK_FREE_RATE_RANGE};
pub use data_loader::{load_prices, read_prices, LoadError, LoadedPrices};
pub use export::{
    export_frontier_csv, export_json, generate_markdown, import_json, load_report, save_artifacts,
};
pub use report::{DataPreview, OptimizationReport, SampleSummary, WeightRow, PREVIEW_ROWS};
pub use simulation::{run_simulation, SimulationError, SimulationOutcome, SimulationProgress};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn runner_types_are_send_sync() {
        assert_send::<OptimizerConfig>();
        assert_sync::<OptimizerConfig>();
        assert_send::<LoadedPrices>();
        assert_sync::<LoadedPrices>();
        assert_send::<SimulationOutcome>();
        assert_sync::<SimulationOutcome>();
        assert_send::<SimulationProgress>();
        assert_sync::<SimulationProgress>();
        assert_send::<OptimizationReport>();
        assert_sync::<OptimizationReport>();
        assert_send::<SimulationError>();
        assert_sync::<SimulationError>();
    }
}
