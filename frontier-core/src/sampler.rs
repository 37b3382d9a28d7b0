//! PortfolioSampler: reproducible random points on the weight simplex.
//!
//! Sample `i` draws `M` independent values from uniform(0, 1) using the RNG
//! derived for index `i`, then divides each by their sum. The sequence is a
//! pure function of `(seed, M, K)`.

use rand::distributions::Open01;
use rand::Rng;

use crate::domain::WeightVector;
use crate::error::FrontierError;
use crate::rng::{SeedHierarchy, WEIGHTS_STREAM};

#[derive(Debug, Clone)]
pub struct PortfolioSampler {
    num_assets: usize,
    num_samples: usize,
    seeds: SeedHierarchy,
}

impl PortfolioSampler {
    pub fn new(num_assets: usize, num_samples: usize, seed: u64) -> Result<Self, FrontierError> {
        if num_assets < 1 {
            return Err(FrontierError::invalid("num_assets", "must be >= 1"));
        }
        if num_samples < 1 {
            return Err(FrontierError::invalid("num_samples", "must be >= 1"));
        }
        Ok(Self {
            num_assets,
            num_samples,
            seeds: SeedHierarchy::new(seed),
        })
    }

    pub fn num_assets(&self) -> usize {
        self.num_assets
    }

    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    pub fn seed(&self) -> u64 {
        self.seeds.master_seed()
    }

    /// Weights for sample `index`.
    ///
    /// Defined for any index; `iter()` bounds the sequence to `num_samples`.
    /// Draws come from the open interval so the normalizing sum is strictly
    /// positive, and a single asset always receives exactly `1.0`.
    pub fn weights_at(&self, index: usize) -> WeightVector {
        let mut rng = self.seeds.rng_for(WEIGHTS_STREAM, index as u64);
        let draws: Vec<f64> = (0..self.num_assets).map(|_| rng.sample(Open01)).collect();
        WeightVector::normalized(draws)
    }

    /// The full sequence of `num_samples` weight vectors. Restartable: each
    /// call yields the same sequence.
    pub fn iter(&self) -> impl Iterator<Item = WeightVector> + '_ {
        (0..self.num_samples).map(move |i| self.weights_at(i))
    }
}
