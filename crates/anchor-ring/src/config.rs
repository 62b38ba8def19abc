//! Ring construction parameters.

use serde::{Deserialize, Serialize};

/// Parameters for building an [`AnchorRing`](crate::AnchorRing).
///
/// There is no default seed. Rings that must agree on routing need the same
/// seed, so it is always chosen explicitly; use [`random_seed`] at the call
/// site when a fresh one is wanted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingConfig {
    /// Total bucket count. Defaults to 10% above the initial resource count.
    #[serde(default)]
    pub capacity: Option<usize>,
    /// Seed for the key hash.
    pub seed: u32,
}

impl RingConfig {
    /// Config with the default capacity and the given seed.
    pub fn with_seed(seed: u32) -> Self {
        Self {
            capacity: None,
            seed,
        }
    }

    /// Effective capacity for `resources` initial resources.
    pub fn capacity_for(&self, resources: usize) -> usize {
        self.capacity.unwrap_or_else(|| default_capacity(resources))
    }
}

/// Default capacity: `ceil(1.1 * resources)`.
pub fn default_capacity(resources: usize) -> usize {
    (resources * 11).div_ceil(10)
}

/// Draw a fresh seed from the thread-local RNG.
pub fn random_seed() -> u32 {
    rand::random()
}
