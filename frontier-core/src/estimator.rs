//! Return estimation: price panel to annualized mean vector and covariance.
//!
//! Every function here is pure: panel in, statistics out. Per-period simple
//! returns are annualized by a fixed factor of 252 trading periods.

use serde::{Deserialize, Serialize};

use crate::domain::{AssetId, PricePanel};
use crate::error::FrontierError;

/// Trading periods per year used to annualize per-period statistics.
pub const TRADING_PERIODS_PER_YEAR: f64 = 252.0;

/// Per-period simple returns, one row fewer than the panel it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnMatrix {
    num_assets: usize,
    rows: Vec<Vec<f64>>,
}

impl ReturnMatrix {
    /// Wrap precomputed return rows, checking each has `num_assets` entries.
    pub fn from_rows(num_assets: usize, rows: Vec<Vec<f64>>) -> Result<Self, FrontierError> {
        if let Some(row) = rows.iter().find(|r| r.len() != num_assets) {
            return Err(FrontierError::ShapeMismatch {
                what: "return row",
                expected: num_assets,
                actual: row.len(),
            });
        }
        Ok(Self { num_assets, rows })
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_assets(&self) -> usize {
        self.num_assets
    }

    /// Arithmetic mean of each asset's per-period returns.
    pub fn column_means(&self) -> Vec<f64> {
        let n = self.rows.len() as f64;
        let mut sums = vec![0.0; self.num_assets];
        for row in &self.rows {
            for (s, r) in sums.iter_mut().zip(row) {
                *s += r;
            }
        }
        sums.into_iter().map(|s| s / n).collect()
    }
}

/// Square, symmetric, asset-indexed covariance matrix (row-major storage).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CovarianceMatrix {
    dim: usize,
    values: Vec<f64>,
}

impl CovarianceMatrix {
    /// Build from nested rows, checking squareness and symmetry.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, FrontierError> {
        let dim = rows.len();
        if dim == 0 {
            return Err(FrontierError::invalid("covariance", "matrix is empty"));
        }
        let mut values = Vec::with_capacity(dim * dim);
        for row in rows {
            if row.len() != dim {
                return Err(FrontierError::ShapeMismatch {
                    what: "covariance row",
                    expected: dim,
                    actual: row.len(),
                });
            }
            values.extend(row);
        }
        let matrix = Self { dim, values };
        for i in 0..dim {
            if matrix.get(i, i) < 0.0 {
                return Err(FrontierError::invalid(
                    "covariance",
                    format!("negative variance on diagonal {i}"),
                ));
            }
            for j in (i + 1)..dim {
                if matrix.get(i, j) != matrix.get(j, i) {
                    return Err(FrontierError::invalid(
                        "covariance",
                        format!("entries ({i},{j}) and ({j},{i}) differ"),
                    ));
                }
            }
        }
        Ok(matrix)
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.dim + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.dim..(i + 1) * self.dim]
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.dim).map(|i| self.row(i).to_vec()).collect()
    }
}

/// Everything a sample evaluation needs, computed once per panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketEstimates {
    pub assets: Vec<AssetId>,
    pub returns: ReturnMatrix,
    /// Annualized expected return per asset, `mean(returns[:, a]) * 252`.
    pub expected_returns: Vec<f64>,
    /// Annualized sample covariance, `cov(returns) * 252`.
    pub covariance: CovarianceMatrix,
}

impl MarketEstimates {
    pub fn num_assets(&self) -> usize {
        self.assets.len()
    }

    /// Annualized standard deviation of each asset on its own.
    pub fn volatilities(&self) -> Vec<f64> {
        (0..self.covariance.dim())
            .map(|i| self.covariance.get(i, i).sqrt())
            .collect()
    }
}

/// `returns[t][a] = price[t+1][a] / price[t][a] - 1`.
pub fn simple_returns(panel: &PricePanel) -> Result<ReturnMatrix, FrontierError> {
    if panel.num_rows() < 2 {
        return Err(FrontierError::InsufficientData {
            rows: panel.num_rows(),
        });
    }
    let rows = panel
        .rows()
        .windows(2)
        .map(|pair| {
            pair[1]
                .iter()
                .zip(&pair[0])
                .map(|(curr, prev)| curr / prev - 1.0)
                .collect()
        })
        .collect();
    Ok(ReturnMatrix {
        num_assets: panel.num_assets(),
        rows,
    })
}

/// Sample covariance (n - 1 denominator), scaled by `annualization`.
///
/// With a single return observation there is no dispersion to measure and
/// the result is the zero matrix; every portfolio then evaluates as
/// degenerate rather than carrying NaN forward.
pub fn sample_covariance(returns: &ReturnMatrix, annualization: f64) -> CovarianceMatrix {
    let m = returns.num_assets();
    let n = returns.num_rows();
    let mut values = vec![0.0; m * m];
    if n < 2 {
        return CovarianceMatrix { dim: m, values };
    }

    let means = returns.column_means();
    let denom = (n - 1) as f64;
    for i in 0..m {
        for j in i..m {
            let mut acc = 0.0;
            for row in returns.rows() {
                acc += (row[i] - means[i]) * (row[j] - means[j]);
            }
            let cov = acc / denom * annualization;
            values[i * m + j] = cov;
            values[j * m + i] = cov;
        }
    }
    CovarianceMatrix { dim: m, values }
}

/// Estimate annualized expected returns and covariance from a price panel.
pub fn estimate(panel: &PricePanel) -> Result<MarketEstimates, FrontierError> {
    let returns = simple_returns(panel)?;
    let expected_returns = returns
        .column_means()
        .into_iter()
        .map(|m| m * TRADING_PERIODS_PER_YEAR)
        .collect();
    let covariance = sample_covariance(&returns, TRADING_PERIODS_PER_YEAR);

    Ok(MarketEstimates {
        assets: panel.assets().to_vec(),
        returns,
        expected_returns,
        covariance,
    })
}
