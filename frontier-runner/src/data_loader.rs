//! Price panel loading from CSV.
//!
//! Expected layout: a header row, then one row per period. The first column
//! is a date, every other column is one asset's price. Header names become
//! asset identifiers and column order is preserved as the canonical order.
//!
//! Rows may arrive in any order; they are sorted ascending by date. Empty
//! cells, non-numeric cells, non-positive prices, and repeated dates are
//! rejected with the offending line and column, not silently dropped.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;
use tracing::{debug, info};

use frontier_core::{FrontierError, PricePanel};

/// Date formats accepted in the first column, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Errors from the price loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open price file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("price file has no header row")]
    MissingHeader,
    #[error("price file needs a date column and at least one asset column")]
    NoAssetColumns,
    #[error("duplicate asset column '{0}'")]
    DuplicateAsset(String),
    #[error("line {line}: unparseable date '{value}'")]
    BadDate { line: u64, value: String },
    #[error("line {line}, column '{asset}': missing price")]
    MissingPrice { line: u64, asset: String },
    #[error("line {line}, column '{asset}': '{value}' is not a positive price")]
    BadPrice {
        line: u64,
        asset: String,
        value: String,
    },
    #[error("date {0} appears more than once")]
    DuplicateDate(NaiveDate),
    #[error("invalid price panel: {0}")]
    Panel(#[from] FrontierError),
}

/// A loaded panel plus the dates of its rows.
#[derive(Debug, Clone)]
pub struct LoadedPrices {
    /// Ascending, unique.
    pub dates: Vec<NaiveDate>,
    pub panel: PricePanel,
}

impl LoadedPrices {
    /// First `n` rows as `(date, prices)` pairs.
    pub fn head(&self, n: usize) -> Vec<(NaiveDate, &[f64])> {
        self.dates
            .iter()
            .zip(self.panel.rows())
            .take(n)
            .map(|(d, row)| (*d, row.as_slice()))
            .collect()
    }
}

/// Load a price panel from a CSV file.
pub fn load_prices(path: &Path) -> Result<LoadedPrices, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let loaded = read_prices(file)?;
    info!(
        path = %path.display(),
        rows = loaded.panel.num_rows(),
        assets = loaded.panel.num_assets(),
        "loaded price panel"
    );
    Ok(loaded)
}

/// Parse a price panel from any CSV reader.
pub fn read_prices<R: Read>(reader: R) -> Result<LoadedPrices, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Err(LoadError::MissingHeader);
    }
    if headers.len() < 2 {
        return Err(LoadError::NoAssetColumns);
    }

    let assets: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();
    let mut seen = HashSet::new();
    for asset in &assets {
        if !seen.insert(asset.as_str()) {
            return Err(LoadError::DuplicateAsset(asset.clone()));
        }
    }

    let mut dated_rows: Vec<(NaiveDate, Vec<f64>)> = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let raw_date = record.get(0).unwrap_or("");
        let date = parse_date(raw_date).ok_or_else(|| LoadError::BadDate {
            line,
            value: raw_date.to_string(),
        })?;

        let mut prices = Vec::with_capacity(assets.len());
        for (col, asset) in assets.iter().enumerate() {
            let cell = record.get(col + 1).unwrap_or("");
            if cell.is_empty() {
                return Err(LoadError::MissingPrice {
                    line,
                    asset: asset.clone(),
                });
            }
            match cell.parse::<f64>() {
                Ok(p) if p.is_finite() && p > 0.0 => prices.push(p),
                _ => {
                    return Err(LoadError::BadPrice {
                        line,
                        asset: asset.clone(),
                        value: cell.to_string(),
                    })
                }
            }
        }
        dated_rows.push((date, prices));
    }

    dated_rows.sort_by_key(|(d, _)| *d);
    if let Some(w) = dated_rows.windows(2).find(|w| w[0].0 == w[1].0) {
        return Err(LoadError::DuplicateDate(w[0].0));
    }
    debug!(rows = dated_rows.len(), "sorted price rows by date");

    let (dates, rows): (Vec<NaiveDate>, Vec<Vec<f64>>) = dated_rows.into_iter().unzip();
    let panel = PricePanel::new(assets, rows)?;
    Ok(LoadedPrices { dates, panel })
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}
