//! Deterministic per-index random streams.
//!
//! A master seed is expanded into one sub-seed per `(stream, index)` pair via
//! BLAKE3. Because derivation is hash-based rather than draw-order based, the
//! RNG for sample `i` is the same whether samples are generated in order, in
//! reverse, or split across any number of threads.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Stream label for portfolio weight draws.
pub const WEIGHTS_STREAM: &str = "weights";

/// Master seed plus the hash-based derivation of per-index RNGs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedHierarchy {
    master_seed: u64,
}

impl SeedHierarchy {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Derive the sub-seed for `(stream, index)`.
    pub fn sub_seed(&self, stream: &str, index: u64) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(stream.as_bytes());
        hasher.update(&index.to_le_bytes());
        let hash = hasher.finalize();
        let mut word = [0u8; 8];
        word.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(word)
    }

    /// Seeded StdRng for `(stream, index)`.
    pub fn rng_for(&self, stream: &str, index: u64) -> StdRng {
        StdRng::seed_from_u64(self.sub_seed(stream, index))
    }
}
