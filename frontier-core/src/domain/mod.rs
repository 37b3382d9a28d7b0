//! Domain types: the price panel coming in, weights and scored samples going out.

pub mod panel;
pub mod portfolio;

pub use panel::PricePanel;
pub use portfolio::{OptimizationResult, PortfolioSample, WeightVector, WEIGHT_SUM_TOLERANCE};

/// Asset identifier type alias
pub type AssetId = String;
