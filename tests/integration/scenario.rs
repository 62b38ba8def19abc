//! Integration test: seven workers in ten buckets, one added, one removed.

use std::collections::HashSet;

use anchor_integration_tests::{SEED, assert_bijection, keys, routes};
use anchor_ring::{AnchorRing, ErrorKind};

fn workers() -> Vec<String> {
    ["a", "b", "c", "d", "e", "f", "g"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[test]
fn test_seven_workers_add_then_remove() {
    let mut ring = AnchorRing::new(workers(), Some(10), SEED).unwrap();
    assert_eq!(ring.size(), 7);
    assert_eq!(ring.capacity(), 10);

    let keys = keys(5_000, 11);
    let initial = routes(&ring, &keys);
    let originals: HashSet<String> = workers().into_iter().collect();
    for (name, bucket) in &initial {
        assert!(originals.contains(name));
        assert!(*bucket < 7);
    }

    // Add H: it takes bucket 7 and only ever gains keys.
    assert_eq!(ring.add_resource("H".to_string()).unwrap(), 7);
    let with_h = routes(&ring, &keys);
    let mut to_h = 0;
    for (old, new) in initial.iter().zip(with_h.iter()) {
        if old != new {
            assert_eq!(new, &("H".to_string(), 7));
            to_h += 1;
        } else {
            assert!(originals.contains(&new.0));
        }
        assert_ne!(new.0, "h");
        assert!(!new.0.is_empty());
    }
    assert!(to_h > 0, "H received no keys");

    // Remove c: its keys spread over the others, nothing else moves.
    assert_eq!(
        ring.remove_resource(Some(&"c".to_string())).unwrap(),
        ("c".to_string(), 2)
    );
    let without_c = routes(&ring, &keys);
    let mut from_c = HashSet::new();
    for (old, new) in with_h.iter().zip(without_c.iter()) {
        if old.0 == "c" {
            assert_ne!(new.0, "c");
            assert!(ring.contains(&new.0));
            from_c.insert(new.0.clone());
        } else {
            assert_eq!(old, new);
        }
    }
    assert!(from_c.len() > 1, "c's keys all went to {from_c:?}");

    let listed: HashSet<&str> = ring.list_resources().into_iter().map(|s| s.as_str()).collect();
    let expected: HashSet<&str> = ["a", "b", "d", "e", "f", "g", "H"].into_iter().collect();
    assert_eq!(listed, expected);
    assert_bijection(&ring);
}

#[test]
fn test_seven_workers_error_paths() {
    let mut ring = AnchorRing::new(workers(), Some(10), SEED).unwrap();

    let err = ring.add_resource("a".to_string()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateKey);

    let err = ring.remove_resource(Some(&"zz".to_string())).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    for name in ["H", "I", "J"] {
        ring.add_resource(name.to_string()).unwrap();
    }
    let err = ring.add_resource("K".to_string()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResourceExhausted);
    assert_eq!(ring.size(), 10);
    assert_bijection(&ring);
}
