//! PricePanel: date-ordered rows of positive prices over a fixed asset list.

use serde::{Deserialize, Serialize};

use super::AssetId;
use crate::error::FrontierError;

/// Historical prices, one row per period in ascending date order.
///
/// Column order is the canonical asset ordering for every downstream vector
/// and matrix. Construction rejects ragged rows and non-positive or
/// non-finite prices; the row-count requirement (at least two) is enforced
/// by estimation, not here, so a loader can hand over a short panel and get
/// the typed `InsufficientData` failure back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePanel {
    assets: Vec<AssetId>,
    rows: Vec<Vec<f64>>,
}

impl PricePanel {
    pub fn new(assets: Vec<AssetId>, rows: Vec<Vec<f64>>) -> Result<Self, FrontierError> {
        if assets.is_empty() {
            return Err(FrontierError::invalid("assets", "panel needs at least one asset column"));
        }
        for (t, row) in rows.iter().enumerate() {
            if row.len() != assets.len() {
                return Err(FrontierError::ShapeMismatch {
                    what: "price row",
                    expected: assets.len(),
                    actual: row.len(),
                });
            }
            if let Some(a) = row.iter().position(|p| !p.is_finite() || *p <= 0.0) {
                return Err(FrontierError::invalid(
                    "price",
                    format!("row {t}, asset '{}': {} is not a positive price", assets[a], row[a]),
                ));
            }
        }
        Ok(Self { assets, rows })
    }

    pub fn assets(&self) -> &[AssetId] {
        &self.assets
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn num_assets(&self) -> usize {
        self.assets.len()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Prices of one asset across all rows, in date order.
    pub fn column(&self, asset: usize) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(move |row| row[asset])
    }
}
