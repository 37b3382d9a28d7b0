//! Run fingerprinting: deterministic identification of a search run.
//!
//! - `dataset_hash`: BLAKE3 over the canonical panel bytes (asset names in
//!   column order, then every price as little-endian bits, row by row).
//!   Row dates are not part of the panel and so not part of the identity:
//!   the same prices under shifted dates hash the same.
//! - `params_hash`: BLAKE3 over the run parameters.
//! - `run_id`: BLAKE3 over both. Identical inputs give identical ids, so a
//!   saved report can be matched against a rerun.

use serde::{Deserialize, Serialize};

use crate::domain::PricePanel;
use crate::optimize::{DegeneratePolicy, RunParams};

/// Complete identity of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFingerprint {
    pub run_id: String,
    pub dataset_hash: String,
    pub params_hash: String,
    pub seed: u64,
    pub num_assets: usize,
    pub num_rows: usize,
}

impl RunFingerprint {
    pub fn compute(panel: &PricePanel, params: &RunParams) -> Self {
        let dataset_hash = dataset_hash(panel);
        let params_hash = params_hash(params);

        let mut hasher = blake3::Hasher::new();
        hasher.update(dataset_hash.as_bytes());
        hasher.update(params_hash.as_bytes());
        let run_id = hasher.finalize().to_hex().to_string();

        Self {
            run_id,
            dataset_hash,
            params_hash,
            seed: params.seed,
            num_assets: panel.num_assets(),
            num_rows: panel.num_rows(),
        }
    }

    /// First 12 hex characters of the run id, for log lines and file names.
    pub fn short_id(&self) -> &str {
        &self.run_id[..12.min(self.run_id.len())]
    }
}

/// Hash of the asset names and price values. Row order matters, dates do not.
pub fn dataset_hash(panel: &PricePanel) -> String {
    let mut hasher = blake3::Hasher::new();
    for asset in panel.assets() {
        // Length prefix keeps ["AB","C"] distinct from ["A","BC"].
        hasher.update(&(asset.len() as u64).to_le_bytes());
        hasher.update(asset.as_bytes());
    }
    for row in panel.rows() {
        for price in row {
            hasher.update(&price.to_bits().to_le_bytes());
        }
    }
    hasher.finalize().to_hex().to_string()
}

pub fn params_hash(params: &RunParams) -> String {
    let policy: u8 = match params.degenerate_policy {
        DegeneratePolicy::Skip => 0,
        DegeneratePolicy::Fail => 1,
    };
    let mut hasher = blake3::Hasher::new();
    hasher.update(&params.risk_free_rate.to_bits().to_le_bytes());
    hasher.update(&(params.num_portfolios as u64).to_le_bytes());
    hasher.update(&params.seed.to_le_bytes());
    hasher.update(&[policy]);
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel(last: f64) -> PricePanel {
        PricePanel::new(
            vec!["A".into(), "B".into()],
            vec![vec![100.0, 100.0], vec![102.0, 99.0], vec![101.0, last]],
        )
        .unwrap()
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let p = RunParams::default();
        assert_eq!(
            RunFingerprint::compute(&panel(100.0), &p),
            RunFingerprint::compute(&panel(100.0), &p)
        );
    }

    #[test]
    fn price_change_changes_dataset_hash() {
        assert_ne!(dataset_hash(&panel(100.0)), dataset_hash(&panel(100.5)));
    }

    #[test]
    fn asset_names_are_length_prefixed() {
        let a = PricePanel::new(vec!["AB".into(), "C".into()], vec![vec![1.0, 2.0]]).unwrap();
        let b = PricePanel::new(vec!["A".into(), "BC".into()], vec![vec![1.0, 2.0]]).unwrap();
        assert_ne!(dataset_hash(&a), dataset_hash(&b));
    }

    #[test]
    fn seed_changes_run_id_but_not_dataset_hash() {
        let p1 = RunParams::default();
        let p2 = RunParams { seed: 7, ..p1 };
        let f1 = RunFingerprint::compute(&panel(100.0), &p1);
        let f2 = RunFingerprint::compute(&panel(100.0), &p2);
        assert_eq!(f1.dataset_hash, f2.dataset_hash);
        assert_ne!(f1.run_id, f2.run_id);
    }

    #[test]
    fn short_id_is_a_prefix() {
        let f = RunFingerprint::compute(&panel(100.0), &RunParams::default());
        assert_eq!(f.short_id().len(), 12);
        assert!(f.run_id.starts_with(f.short_id()));
    }
}
