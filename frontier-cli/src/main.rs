//! Frontier CLI: Monte Carlo mean-variance portfolio search.
//!
//! Commands:
//! - `optimize`: load a CSV price panel, run the search, print the report,
//!   optionally export artifacts
//! - `config`: print the default configuration as TOML

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use frontier_runner::{
    load_prices, run_simulation, save_artifacts, DataPreview, OptimizationReport,
    OptimizerConfig, SimulationProgress, PREVIEW_ROWS,
};

#[derive(Parser)]
#[command(
    name = "frontier",
    about = "Frontier: Monte Carlo mean-variance portfolio optimizer"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search random long-only portfolios for the best risk-adjusted return.
    Optimize {
        /// CSV of prices: a date column, then one column per asset.
        #[arg(long)]
        prices: PathBuf,

        /// TOML config file. Flags below override its values.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Annual risk-free rate in percent (0-10).
        #[arg(long)]
        risk_free_pct: Option<f64>,

        /// Number of random portfolios (1000-50000).
        #[arg(long)]
        num_portfolios: Option<usize>,

        /// Master seed for the weight streams.
        #[arg(long)]
        seed: Option<u64>,

        /// Worker threads: 0 = all cores, 1 = sequential.
        #[arg(long)]
        threads: Option<usize>,

        /// Write report.json, frontier.csv and report.md under this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Print the first rows of prices and returns.
        #[arg(long, default_value_t = false)]
        preview: bool,
    },
    /// Print the default configuration as TOML.
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Optimize {
            prices,
            config,
            risk_free_pct,
            num_portfolios,
            seed,
            threads,
            output_dir,
            preview,
        } => {
            let mut cfg = match config {
                Some(path) => OptimizerConfig::from_file(&path)?,
                None => OptimizerConfig::default(),
            };
            if let Some(pct) = risk_free_pct {
                cfg.risk_free_rate = pct / 100.0;
            }
            if let Some(n) = num_portfolios {
                cfg.num_portfolios = n;
            }
            if let Some(s) = seed {
                cfg.seed = s;
            }
            if let Some(t) = threads {
                cfg.threads = t;
            }
            run_optimize(&prices, &cfg, output_dir, preview)
        }
        Commands::Config => {
            print!("{}", OptimizerConfig::default().to_toml()?);
            Ok(())
        }
    }
}

fn run_optimize(
    prices: &std::path::Path,
    cfg: &OptimizerConfig,
    output_dir: Option<PathBuf>,
    preview: bool,
) -> Result<()> {
    cfg.validate().context("invalid configuration")?;

    let loaded = load_prices(prices)
        .with_context(|| format!("failed to load prices from {}", prices.display()))?;

    let progress = |p: &SimulationProgress| {
        info!(
            completed = p.completed,
            total = p.total,
            best_sharpe_raw = p.best_sharpe_raw.unwrap_or(f64::NAN),
            "progress"
        );
    };
    let outcome = run_simulation(&loaded.panel, cfg, Some(&progress), None)?;
    let report = OptimizationReport::build(&outcome)?;

    if preview {
        println!("{}", DataPreview::new(&loaded, &outcome, PREVIEW_ROWS).render_text());
    }
    print!("{}", report.render_text());

    if let Some(dir) = output_dir {
        let run_dir = save_artifacts(
            &report,
            loaded.panel.assets(),
            outcome.result.samples(),
            &dir,
        )?;
        println!("Artifacts saved to: {}", run_dir.display());
    }

    Ok(())
}
