//! Integration test: size stays within `1..=capacity` and the name/bucket
//! bijection survives arbitrary membership churn.

use anchor_integration_tests::{SEED, assert_bijection, names};
use anchor_ring::{AnchorRing, ErrorKind, RingError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn test_add_fails_exactly_when_full() {
    let mut ring = AnchorRing::new(names(3), Some(6), SEED).unwrap();
    for i in 0..3 {
        assert!(!ring.is_full());
        ring.add_resource(format!("extra_{i}")).unwrap();
    }
    assert!(ring.is_full());
    assert_eq!(
        ring.add_resource("one_too_many".to_string()),
        Err(RingError::Exhausted { capacity: 6 })
    );
    assert_eq!(ring.size(), 6);
}

#[test]
fn test_remove_fails_exactly_at_one() {
    let mut ring = AnchorRing::new(names(4), None, SEED).unwrap();
    while ring.size() > 1 {
        ring.remove_resource(None).unwrap();
    }
    let err = ring.remove_resource(None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    let last = ring.list_resources()[0].clone();
    assert_eq!(ring.remove_resource(Some(&last)), Err(RingError::LastResource));
    assert_eq!(ring.size(), 1);
}

#[test]
fn test_construction_errors() {
    assert_eq!(
        AnchorRing::<String>::new(Vec::new(), Some(4), SEED).unwrap_err(),
        RingError::EmptyResources
    );
    assert_eq!(
        AnchorRing::new(names(5), Some(4), SEED).unwrap_err().kind(),
        ErrorKind::InvalidArgument
    );
    let ring = AnchorRing::new(names(5), Some(5), SEED).unwrap();
    assert!(ring.is_full());
}

/// Failed operations leave routing and membership untouched.
#[test]
fn test_failures_do_not_mutate() {
    let mut ring = AnchorRing::new(names(5), Some(5), SEED).unwrap();
    let before = ring.list_resources().into_iter().cloned().collect::<Vec<_>>();

    assert!(ring.add_resource("resource_0".to_string()).is_err());
    assert!(ring.add_resource("fresh".to_string()).is_err());
    assert!(ring.remove_resource(Some(&"ghost".to_string())).is_err());

    let after = ring.list_resources().into_iter().cloned().collect::<Vec<_>>();
    assert_eq!(before, after);
    assert_bijection(&ring);
}

#[test]
fn test_random_churn_keeps_bijection() {
    let mut ring = AnchorRing::new(names(10), Some(32), SEED).unwrap();
    let mut rng = StdRng::seed_from_u64(21);
    let mut next = 10;

    for _ in 0..2_000 {
        match rng.random_range(0..3) {
            0 => {
                let was_full = ring.is_full();
                let result = ring.add_resource(format!("resource_{next}"));
                assert_eq!(result.is_err(), was_full);
                if result.is_ok() {
                    next += 1;
                }
            }
            1 => {
                let was_one = ring.size() == 1;
                assert_eq!(ring.remove_resource(None).is_err(), was_one);
            }
            _ => {
                let live: Vec<String> = ring.list_resources().into_iter().cloned().collect();
                let victim = &live[rng.random_range(0..live.len())];
                let was_one = ring.size() == 1;
                assert_eq!(ring.remove_resource(Some(victim)).is_err(), was_one);
            }
        }
        assert!(ring.size() >= 1 && ring.size() <= ring.capacity());
        assert_bijection(&ring);
    }
}
