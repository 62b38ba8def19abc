//! Shared test harness for anchor integration tests.
//!
//! Provides seeded key sets, resource name generators, routing snapshots,
//! and a bijection check that only uses the public [`AnchorRing`] API.

use std::collections::HashSet;

use anchor_ring::AnchorRing;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seed used by tests that do not care about the exact value.
pub const SEED: u32 = 1984;

/// `n` distinct keys of the form `key_<u32>`, reproducible from `seed`.
pub fn keys(n: usize, seed: u64) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut seen = HashSet::with_capacity(n);
    let mut out = Vec::with_capacity(n);
    while out.len() < n {
        let x: u32 = rng.random();
        if seen.insert(x) {
            out.push(format!("key_{x}"));
        }
    }
    out
}

/// Resource names `resource_0 .. resource_{n-1}`.
pub fn names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("resource_{i}")).collect()
}

/// `(resource, bucket)` for every key, in key order.
pub fn routes(ring: &AnchorRing<String>, keys: &[String]) -> Vec<(String, u32)> {
    keys.iter()
        .map(|k| {
            let (name, bucket) = ring.get_resource(k);
            (name.clone(), bucket)
        })
        .collect()
}

/// Assert that names and buckets are mutual inverses over the live set.
pub fn assert_bijection(ring: &AnchorRing<String>) {
    let listed = ring.list_resources();
    assert_eq!(listed.len(), ring.size(), "listed resources != size");

    let mut buckets = HashSet::new();
    for name in listed {
        let bucket = ring
            .bucket_of(name)
            .unwrap_or_else(|| panic!("{name} listed but unbound"));
        assert!(buckets.insert(bucket), "bucket {bucket} bound twice");
        assert_eq!(ring.resource_at(bucket), Some(name));
        assert!(ring.engine().is_live(bucket), "{name} bound to removed bucket {bucket}");
    }
    assert!(ring.engine().check_invariants(), "engine invariants broken");
}

/// Remove `count` random live resources (never the last one).
pub fn remove_random(ring: &mut AnchorRing<String>, count: usize, seed: u64) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut removed = Vec::with_capacity(count);
    for _ in 0..count {
        if ring.size() == 1 {
            break;
        }
        let live: Vec<String> = ring.list_resources().into_iter().cloned().collect();
        let victim = live[rng.random_range(0..live.len())].clone();
        ring.remove_resource(Some(&victim)).unwrap();
        removed.push(victim);
    }
    removed
}
