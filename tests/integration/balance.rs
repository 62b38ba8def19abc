//! Integration test: keys spread evenly over the working set.
//!
//! Statistical, not exact: the busiest bucket must stay within a small
//! factor of the average.

use anchor_integration_tests::{SEED, keys, names, remove_random};
use anchor_ring::AnchorRing;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Per-bucket key counts for `n` random 64-bit keys.
fn histogram(ring: &AnchorRing<String>, n: usize, seed: u64) -> Vec<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut hist = vec![0usize; ring.capacity()];
    for _ in 0..n {
        let key: u64 = rng.random();
        let (_, bucket) = ring.get_resource(key.to_le_bytes());
        hist[bucket as usize] += 1;
    }
    hist
}

fn max_over_avg(hist: &[usize], working: usize) -> f64 {
    let total: usize = hist.iter().sum();
    let high = hist.iter().copied().max().unwrap_or(0);
    high as f64 / (total as f64 / working as f64)
}

/// Capacity 100, 90 live buckets built directly, one million keys.
#[test]
#[ntest::timeout(120000)]
fn test_balance_direct_working_set() {
    let ring = AnchorRing::new(names(90), Some(100), SEED).unwrap();
    let hist = histogram(&ring, 1_000_000, 1);

    for (bucket, &count) in hist.iter().enumerate() {
        assert_eq!(count > 0, ring.engine().is_live(bucket as u32), "bucket {bucket}");
    }
    let ratio = max_over_avg(&hist, ring.size());
    assert!(ratio < 1.5, "max/avg = {ratio:.3}");
}

/// Same shape, but reached by removing ten random resources from a full ring.
#[test]
#[ntest::timeout(120000)]
fn test_balance_after_random_removals() {
    let mut ring = AnchorRing::new(names(100), Some(100), SEED).unwrap();
    remove_random(&mut ring, 10, 2);
    assert_eq!(ring.size(), 90);

    let hist = histogram(&ring, 1_000_000, 3);
    let ratio = max_over_avg(&hist, ring.size());
    assert!(ratio < 1.5, "max/avg = {ratio:.3}");
}

/// Heavy removal: a tenth of the buckets live, probes chase long chains.
#[test]
#[ntest::timeout(120000)]
fn test_balance_sparse_working_set() {
    let mut ring = AnchorRing::new(names(500), Some(500), SEED).unwrap();
    remove_random(&mut ring, 450, 4);
    assert_eq!(ring.size(), 50);

    let hist = histogram(&ring, 200_000, 5);
    let ratio = max_over_avg(&hist, ring.size());
    assert!(ratio < 1.5, "max/avg = {ratio:.3}");
}

/// String keys balance like integer keys.
#[test]
#[ntest::timeout(60000)]
fn test_balance_string_keys() {
    let ring = AnchorRing::new(names(20), Some(25), SEED).unwrap();
    let mut hist = vec![0usize; ring.capacity()];
    for key in keys(100_000, 6) {
        hist[ring.get_resource(&key).1 as usize] += 1;
    }
    let ratio = max_over_avg(&hist, ring.size());
    assert!(ratio < 1.5, "max/avg = {ratio:.3}");
}
