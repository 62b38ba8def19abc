//! Key hashing into the engine's integer domain.

use xxhash_rust::xxh64::xxh64;

/// Seeded hash from arbitrary key bytes to a uniformly distributed `u64`.
///
/// Implementations must be deterministic for a fixed `(key, seed)`: two
/// rings that share a seed and a membership history only agree on routing
/// if their hashers do.
pub trait KeyHasher {
    /// Hash `key` under `seed`.
    fn hash_key(&self, key: &[u8], seed: u32) -> u64;
}

/// XXH64 keyed by the ring seed. The default hasher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Xxh64Hasher;

impl KeyHasher for Xxh64Hasher {
    #[inline]
    fn hash_key(&self, key: &[u8], seed: u32) -> u64 {
        xxh64(key, u64::from(seed))
    }
}
