//! Integration tests for the file pipeline: CSV on disk -> panel -> run ->
//! report -> artifacts on disk.

use std::io::Write;
use std::path::Path;

use frontier_runner::{
    load_prices, load_report, run_simulation, save_artifacts, DataPreview, LoadError,
    OptimizationReport, OptimizerConfig, PREVIEW_ROWS,
};

const PRICES: &str = "\
Date,SPY,TLT,GLD
2024-01-08,470.0,96.0,189.0
2024-01-02,472.7,97.3,190.6
2024-01-03,468.8,97.7,189.9
2024-01-04,467.3,96.4,189.2
2024-01-05,467.9,95.8,189.4
2024-01-09,469.3,96.3,189.1
2024-01-10,472.5,96.0,188.4
2024-01-11,472.9,97.2,189.6
";

fn write_csv(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(text.as_bytes()).unwrap();
    path
}

fn config() -> OptimizerConfig {
    OptimizerConfig {
        num_portfolios: 2_000,
        batch_size: 500,
        ..OptimizerConfig::default()
    }
}

#[test]
fn loads_sorts_and_runs_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), "prices.csv", PRICES);

    let loaded = load_prices(&path).unwrap();
    assert_eq!(loaded.panel.assets(), &["SPY", "TLT", "GLD"]);
    assert_eq!(loaded.panel.num_rows(), 8);
    // The out-of-order 2024-01-08 row lands between the 5th and the 9th.
    assert_eq!(loaded.dates[4].to_string(), "2024-01-08");
    assert_eq!(loaded.panel.rows()[4], vec![470.0, 96.0, 189.0]);

    let cfg = config();
    cfg.validate().unwrap();
    let outcome = run_simulation(&loaded.panel, &cfg, None, None).unwrap();
    assert_eq!(outcome.estimates.returns.num_rows(), 7);
    assert_eq!(outcome.result.samples().len() + outcome.result.skipped(), 2_000);
}

#[test]
fn artifacts_round_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), "prices.csv", PRICES);
    let loaded = load_prices(&path).unwrap();
    let cfg = config();
    let outcome = run_simulation(&loaded.panel, &cfg, None, None).unwrap();
    let report = OptimizationReport::build(&outcome).unwrap();

    let out = dir.path().join("results");
    let run_dir = save_artifacts(
        &report,
        loaded.panel.assets(),
        outcome.result.samples(),
        &out,
    )
    .unwrap();

    assert!(run_dir.starts_with(&out));
    assert!(run_dir
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with(outcome.fingerprint.short_id()));
    for name in ["report.json", "frontier.csv", "report.md"] {
        assert!(run_dir.join(name).is_file(), "missing {name}");
    }

    let reloaded = load_report(&run_dir).unwrap();
    assert_eq!(reloaded.fingerprint, report.fingerprint);
    assert_eq!(reloaded.optimal.index, report.optimal.index);
    assert_eq!(reloaded.weights.len(), 3);

    let csv = std::fs::read_to_string(run_dir.join("frontier.csv")).unwrap();
    assert_eq!(csv.lines().count(), outcome.result.samples().len() + 1);
    assert_eq!(csv.lines().filter(|l| l.contains(",true,")).count(), 1);

    let md = std::fs::read_to_string(run_dir.join("report.md")).unwrap();
    assert!(md.contains("| SPY |"));
    assert!(md.contains(&report.fingerprint.run_id));
}

#[test]
fn newer_schema_is_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), "prices.csv", PRICES);
    let loaded = load_prices(&path).unwrap();
    let cfg = config();
    let outcome = run_simulation(&loaded.panel, &cfg, None, None).unwrap();
    let mut report = OptimizationReport::build(&outcome).unwrap();
    report.schema_version = 99;

    let run_dir = save_artifacts(&report, loaded.panel.assets(), &[], dir.path()).unwrap();
    let err = load_report(&run_dir).unwrap_err();
    assert!(err.to_string().contains("unsupported schema version 99"));
}

#[test]
fn preview_shows_first_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), "prices.csv", PRICES);
    let loaded = load_prices(&path).unwrap();
    let outcome = run_simulation(&loaded.panel, &config(), None, None).unwrap();

    let preview = DataPreview::new(&loaded, &outcome, PREVIEW_ROWS);
    assert_eq!(preview.prices.len(), PREVIEW_ROWS);
    assert_eq!(preview.returns.len(), PREVIEW_ROWS);
    assert_eq!(preview.prices[0].0.to_string(), "2024-01-02");
    assert_eq!(preview.returns[0].0.to_string(), "2024-01-03");
}

#[test]
fn missing_file_is_an_open_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_prices(&dir.path().join("nope.csv")).unwrap_err();
    assert!(matches!(err, LoadError::Open { .. }));
}

#[test]
fn single_row_file_fails_at_estimation() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), "one.csv", "Date,A,B\n2024-01-02,1,2\n");
    let loaded = load_prices(&path).unwrap();
    let err = run_simulation(&loaded.panel, &config(), None, None).unwrap_err();
    assert!(err.to_string().starts_with("estimation failed"));
}
