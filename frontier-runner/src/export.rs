//! Artifact export: JSON, CSV, and Markdown.
//!
//! - **JSON**: the full `OptimizationReport`, schema-versioned
//! - **CSV**: one row per kept sample, for an external risk/return scatter
//! - **Markdown**: human-readable run summary
//!
//! Unknown schema versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::info;

use frontier_core::PortfolioSample;

use crate::report::{pct, OptimizationReport, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_json(report: &OptimizationReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize OptimizationReport to JSON")
}

/// Deserialize a report, rejecting newer schema versions.
pub fn import_json(json: &str) -> Result<OptimizationReport> {
    let report: OptimizationReport =
        serde_json::from_str(json).context("failed to deserialize OptimizationReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the sample cloud as CSV.
///
/// Columns: index, risk, return, sharpe_raw, sharpe_adjusted, is_optimal,
/// then `w_<asset>` for each asset in column order.
pub fn export_frontier_csv(
    assets: &[String],
    samples: &[PortfolioSample],
    optimal_index: usize,
) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header: Vec<String> = [
        "index",
        "risk",
        "return",
        "sharpe_raw",
        "sharpe_adjusted",
        "is_optimal",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    header.extend(assets.iter().map(|a| format!("w_{a}")));
    wtr.write_record(&header)?;

    for s in samples {
        if s.weights().len() != assets.len() {
            bail!(
                "sample {} has {} weights for {} assets",
                s.index(),
                s.weights().len(),
                assets.len()
            );
        }
        let mut record = vec![
            s.index().to_string(),
            format!("{:.8}", s.risk()),
            format!("{:.8}", s.expected_return()),
            format!("{:.6}", s.sharpe_raw()),
            format!("{:.6}", s.sharpe_adjusted()),
            (s.index() == optimal_index).to_string(),
        ];
        record.extend(s.weights().as_slice().iter().map(|w| format!("{w:.6}")));
        wtr.write_record(&record)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Markdown report ────────────────────────────────────────────────

pub fn generate_markdown(report: &OptimizationReport) -> String {
    let mut md = String::with_capacity(1024);

    md.push_str("# Portfolio Optimization Report\n\n");

    md.push_str("## Optimal Allocation\n\n");
    md.push_str("| Asset | Weight |\n");
    md.push_str("| --- | ---: |\n");
    for row in &report.weights {
        md.push_str(&format!("| {} | {} |\n", row.asset, pct(row.weight)));
    }
    md.push('\n');

    let opt = &report.optimal;
    md.push_str("## Performance\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Expected Annual Return | {} |\n", pct(opt.expected_return)));
    md.push_str(&format!("| Annual Volatility | {} |\n", pct(opt.risk)));
    md.push_str(&format!(
        "| Sharpe Ratio (Adjusted for Risk-Free Rate) | {:.2} |\n",
        opt.sharpe_adjusted
    ));
    md.push_str(&format!("| Sharpe (unadjusted) | {:.2} |\n", opt.sharpe_raw));
    md.push_str(&format!(
        "| Minimum-risk Sample | #{} ({} return, {} risk) |\n",
        report.min_risk.index,
        pct(report.min_risk.expected_return),
        pct(report.min_risk.risk)
    ));
    md.push('\n');

    md.push_str("## Run\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Run ID | {} |\n", report.fingerprint.run_id));
    md.push_str(&format!("| Dataset Hash | {} |\n", report.fingerprint.dataset_hash));
    md.push_str(&format!(
        "| Panel | {} assets x {} rows |\n",
        report.fingerprint.num_assets, report.fingerprint.num_rows
    ));
    md.push_str(&format!("| Risk-free Rate | {} |\n", pct(report.risk_free_rate)));
    md.push_str(&format!("| Seed | {} |\n", report.fingerprint.seed));
    md.push_str(&format!(
        "| Samples | {} kept / {} skipped / {} requested |\n",
        report.evaluated, report.skipped, report.num_portfolios
    ));
    md.push_str(&format!("| Frontier Points | {} |\n", report.frontier_indices.len()));
    md.push_str(&format!("| Elapsed | {:.2}s |\n", report.elapsed_secs));
    md.push('\n');

    if report.skipped > 0 {
        md.push_str(&format!(
            "> {} samples had zero or non-finite risk and were excluded.\n",
            report.skipped
        ));
    }

    md
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for one run.
///
/// Creates `{run_id_prefix}_{timestamp}/` under `output_dir` containing
/// `report.json`, `frontier.csv`, and `report.md`. Returns the directory.
pub fn save_artifacts(
    report: &OptimizationReport,
    assets: &[String],
    samples: &[PortfolioSample],
    output_dir: &Path,
) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}",
        report.fingerprint.short_id(),
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let json = export_json(report)?;
    write_file(&run_dir.join("report.json"), &json)?;

    let csv = export_frontier_csv(assets, samples, report.optimal.index)?;
    write_file(&run_dir.join("frontier.csv"), &csv)?;

    write_file(&run_dir.join("report.md"), &generate_markdown(report))?;

    info!(dir = %run_dir.display(), samples = samples.len(), "artifacts written");
    Ok(run_dir)
}

/// Load a report from an artifact directory's report.json.
pub fn load_report(dir: &Path) -> Result<OptimizationReport> {
    let path = dir.join("report.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}
