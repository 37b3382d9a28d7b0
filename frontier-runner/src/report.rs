//! Result reporting: the user-facing summary of a finished run.
//!
//! An `OptimizationReport` carries the optimal allocation as an
//! `(asset, weight)` table, its return, risk and risk-free-adjusted Sharpe,
//! the minimum-risk sample, the indices of the sampled frontier, and the run
//! fingerprint. `DataPreview` holds the first rows of prices and returns.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use frontier_core::{
    frontier_envelope, select_min_risk, FrontierError, PortfolioSample, RunFingerprint,
};

use crate::data_loader::LoadedPrices;
use crate::simulation::SimulationOutcome;

/// Current report schema version. Bump on breaking changes.
pub const SCHEMA_VERSION: u32 = 1;

/// Rows shown by the data preview.
pub const PREVIEW_ROWS: usize = 5;

/// One line of the allocation table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightRow {
    pub asset: String,
    /// Fraction in [0, 1].
    pub weight: f64,
}

/// Reported figures for one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSummary {
    pub index: usize,
    pub expected_return: f64,
    pub risk: f64,
    pub sharpe_raw: f64,
    pub sharpe_adjusted: f64,
}

impl SampleSummary {
    /// Summarize `s` with its adjusted Sharpe taken at `risk_free_rate`.
    pub fn at_rate(s: &PortfolioSample, risk_free_rate: f64) -> Self {
        Self {
            index: s.index(),
            expected_return: s.expected_return(),
            risk: s.risk(),
            sharpe_raw: s.sharpe_raw(),
            sharpe_adjusted: s.sharpe_at(risk_free_rate),
        }
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub schema_version: u32,
    pub fingerprint: RunFingerprint,
    pub risk_free_rate: f64,
    /// Requested sample count.
    pub num_portfolios: usize,
    /// Samples kept after the degenerate policy.
    pub evaluated: usize,
    pub skipped: usize,
    pub optimal: SampleSummary,
    pub weights: Vec<WeightRow>,
    pub min_risk: SampleSummary,
    /// Sample indices on the upper envelope, ascending by risk.
    pub frontier_indices: Vec<usize>,
    pub elapsed_secs: f64,
}

impl OptimizationReport {
    /// Summarize `outcome` using the parameters it was run with.
    pub fn build(outcome: &SimulationOutcome) -> Result<Self, FrontierError> {
        let params = &outcome.params;
        let result = &outcome.result;
        let optimal = result.optimal();
        let min_risk = select_min_risk(result.samples())?;

        let weights = outcome
            .estimates
            .assets
            .iter()
            .zip(optimal.weights().as_slice())
            .map(|(asset, w)| WeightRow {
                asset: asset.clone(),
                weight: *w,
            })
            .collect();

        Ok(Self {
            schema_version: SCHEMA_VERSION,
            fingerprint: outcome.fingerprint.clone(),
            risk_free_rate: params.risk_free_rate,
            num_portfolios: params.num_portfolios,
            evaluated: result.samples().len(),
            skipped: result.skipped(),
            optimal: SampleSummary::at_rate(optimal, params.risk_free_rate),
            weights,
            min_risk: SampleSummary::at_rate(min_risk, params.risk_free_rate),
            frontier_indices: frontier_envelope(result.samples())
                .iter()
                .map(|s| s.index())
                .collect(),
            elapsed_secs: outcome.elapsed_secs,
        })
    }

    /// Plain-text rendering for the terminal.
    pub fn render_text(&self) -> String {
        let mut out = String::with_capacity(512);
        out.push_str("Optimal Portfolio Weights:\n");
        let width = self.weights.iter().map(|r| r.asset.len()).max().unwrap_or(0);
        for row in &self.weights {
            out.push_str(&format!("  {:<width$}  {:>7}\n", row.asset, pct(row.weight)));
        }
        out.push('\n');
        out.push_str(&format!(
            "Expected Annual Return: {}\n",
            pct(self.optimal.expected_return)
        ));
        out.push_str(&format!("Annual Volatility: {}\n", pct(self.optimal.risk)));
        out.push_str(&format!(
            "Sharpe Ratio (Adjusted for Risk-Free Rate): {:.2}\n",
            self.optimal.sharpe_adjusted
        ));
        out.push('\n');
        out.push_str(&format!(
            "Minimum-risk sample #{}: return {}, risk {}\n",
            self.min_risk.index,
            pct(self.min_risk.expected_return),
            pct(self.min_risk.risk)
        ));
        out.push_str(&format!(
            "Samples: {} kept, {} skipped of {} ({} on frontier)\n",
            self.evaluated,
            self.skipped,
            self.num_portfolios,
            self.frontier_indices.len()
        ));
        out.push_str(&format!(
            "Risk-free rate: {} | seed {} | run {}\n",
            pct(self.risk_free_rate),
            self.fingerprint.seed,
            self.fingerprint.short_id()
        ));
        out
    }
}

/// First rows of the price panel and of the derived simple returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPreview {
    pub assets: Vec<String>,
    pub prices: Vec<(NaiveDate, Vec<f64>)>,
    /// Return row `t` is dated at price row `t + 1`.
    pub returns: Vec<(NaiveDate, Vec<f64>)>,
}

impl DataPreview {
    pub fn new(loaded: &LoadedPrices, outcome: &SimulationOutcome, rows: usize) -> Self {
        let prices = loaded
            .head(rows)
            .into_iter()
            .map(|(d, p)| (d, p.to_vec()))
            .collect();
        let returns = loaded
            .dates
            .iter()
            .skip(1)
            .zip(outcome.estimates.returns.rows())
            .take(rows)
            .map(|(d, r)| (*d, r.clone()))
            .collect();
        Self {
            assets: loaded.panel.assets().to_vec(),
            prices,
            returns,
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str("Prices (head):\n");
        render_table(&mut out, &self.assets, &self.prices, |v| format!("{v:.2}"));
        out.push_str("\nReturns (head):\n");
        render_table(&mut out, &self.assets, &self.returns, |v| format!("{v:.6}"));
        out
    }
}

fn render_table(
    out: &mut String,
    assets: &[String],
    rows: &[(NaiveDate, Vec<f64>)],
    fmt: impl Fn(f64) -> String,
) {
    out.push_str(&format!("  {:<10}", "Date"));
    for a in assets {
        out.push_str(&format!(" {a:>12}"));
    }
    out.push('\n');
    for (date, values) in rows {
        out.push_str(&format!("  {}", date.format("%Y-%m-%d")));
        for v in values {
            out.push_str(&format!(" {:>12}", fmt(*v)));
        }
        out.push('\n');
    }
}

/// `0.1234` -> `"12.34%"`.
pub fn pct(v: f64) -> String {
    format!("{:.2}%", v * 100.0)
}
