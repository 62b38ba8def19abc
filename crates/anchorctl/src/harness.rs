//! Statistical and timing checks for [`AnchorRing`].
//!
//! Every check derives its randomness from one master seed, so a report can
//! be reproduced exactly by rerunning with the same arguments.

use std::collections::HashSet;
use std::time::Instant;

use anchor_ring::AnchorRing;
use anyhow::{Result, ensure};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

/// Independent sub-seeds derived from a master seed.
#[derive(Debug, Clone, Copy)]
pub struct Seeds {
    pub keys: u64,
    pub ring: u32,
    pub removals: u64,
    pub moves: u64,
}

impl Seeds {
    pub fn derive(master: u32) -> Self {
        let mut rng = StdRng::seed_from_u64(u64::from(master));
        Self {
            keys: rng.random(),
            ring: rng.random(),
            removals: rng.random(),
            moves: rng.random(),
        }
    }
}

/// A capacity split into working and removed resource names.
#[derive(Debug, Clone)]
pub struct ResourceSplit {
    pub capacity: usize,
    pub all: Vec<String>,
    pub working: Vec<String>,
    pub removed: Vec<String>,
}

impl ResourceSplit {
    /// Name `capacity` resources and randomly remove all but
    /// `ceil(capacity / factor)` of them.
    pub fn new(capacity: usize, factor: f64, seed: u64) -> Result<Self> {
        ensure!(capacity > 0, "capacity must be positive");
        ensure!(factor >= 1.0, "factor must be at least 1, got {factor}");

        let working_size = ((capacity as f64 / factor).ceil() as usize).clamp(1, capacity);
        let all: Vec<String> = (0..capacity).map(|x| format!("resource_{x}")).collect();

        let mut rng = StdRng::seed_from_u64(seed);
        let picked: HashSet<usize> = index::sample(&mut rng, capacity, capacity - working_size)
            .into_iter()
            .collect();

        let (removed, working) = all
            .iter()
            .cloned()
            .enumerate()
            .partition::<Vec<_>, _>(|(i, _)| picked.contains(i));

        Ok(Self {
            capacity,
            all,
            working: working.into_iter().map(|(_, name)| name).collect(),
            removed: removed.into_iter().map(|(_, name)| name).collect(),
        })
    }

    /// Build a ring in this split's working state.
    ///
    /// With `random_removes`, starts from every resource and removes the
    /// removed set one by one; otherwise builds from the working set directly.
    pub fn build_ring(&self, seed: u32, random_removes: bool) -> Result<AnchorRing<String>> {
        if random_removes {
            let mut ring = AnchorRing::new(self.all.clone(), Some(self.capacity), seed)?;
            for name in &self.removed {
                ring.remove_resource(Some(name))?;
            }
            Ok(ring)
        } else {
            Ok(AnchorRing::new(
                self.working.clone(),
                Some(self.capacity),
                seed,
            )?)
        }
    }
}

/// `n` distinct keys of the form `key_<u32>`.
pub fn sample_keys(n: usize, seed: u64) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut seen = HashSet::with_capacity(n);
    let mut keys = Vec::with_capacity(n);
    while keys.len() < n {
        let x: u32 = rng.random();
        if seen.insert(x) {
            keys.push(format!("key_{x}"));
        }
    }
    keys
}

/// Shared parameters of the balance, consistency and rate checks.
#[derive(Debug, Clone, Copy)]
pub struct RunParams {
    pub capacity: usize,
    pub factor: f64,
    pub keys: usize,
    pub seed: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BalanceReport {
    pub capacity: usize,
    pub working: usize,
    pub total: usize,
    /// Keys that landed on a resource outside the working set.
    pub misrouted: usize,
    pub high: usize,
    pub low: usize,
    pub avg: f64,
    /// How far the busiest bucket exceeds the average, in percent.
    pub load_pct: f64,
}

/// Hash `keys` random keys and measure how evenly they spread.
pub fn balance(params: RunParams, random_removes: bool) -> Result<BalanceReport> {
    let seeds = Seeds::derive(params.seed);
    let split = ResourceSplit::new(params.capacity, params.factor, seeds.removals)?;
    let ring = split.build_ring(seeds.ring, random_removes)?;
    let working: HashSet<&String> = split.working.iter().collect();

    let mut hist = vec![0usize; params.capacity];
    let mut misrouted = 0;
    for key in sample_keys(params.keys, seeds.keys) {
        let (name, bucket) = ring.get_resource(&key);
        if !working.contains(name) {
            warn!(%key, resource = %name, bucket, "key routed outside the working set");
            misrouted += 1;
        }
        hist[bucket as usize] += 1;
    }

    let total: usize = hist.iter().sum();
    let high = hist.iter().copied().max().unwrap_or(0);
    let low = hist.iter().copied().filter(|&c| c > 0).min().unwrap_or(0);
    let avg = total as f64 / split.working.len() as f64;

    Ok(BalanceReport {
        capacity: params.capacity,
        working: split.working.len(),
        total,
        misrouted,
        high,
        low,
        avg,
        load_pct: 100.0 * high as f64 / avg - 100.0,
    })
}

/// A key whose movement broke minimal disruption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub step: usize,
    pub added: bool,
    pub resource: String,
    pub key: String,
    pub before: String,
    pub after: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsistencyReport {
    pub adds: usize,
    pub removes: usize,
    pub violations: Vec<Violation>,
}

/// Apply `moves` random adds and removes to a ring and check that each one
/// moves only keys to the added resource or away from the removed one.
///
/// A twin ring trails one step behind to provide the "before" routing.
pub fn consistency(params: RunParams, moves: usize) -> Result<ConsistencyReport> {
    let seeds = Seeds::derive(params.seed);
    let split = ResourceSplit::new(params.capacity, params.factor, seeds.removals)?;
    let mut current = split.build_ring(seeds.ring, false)?;
    let mut previous = current.clone();
    let mut working = split.working.clone();
    let mut removed = split.removed.clone();
    let keys = sample_keys(params.keys, seeds.keys);
    let mut rng = StdRng::seed_from_u64(seeds.moves);

    let mut report = ConsistencyReport {
        adds: 0,
        removes: 0,
        violations: Vec::new(),
    };

    for step in 0..moves {
        let add = rng.random_bool(0.5);
        let resource = if add {
            if removed.is_empty() {
                continue;
            }
            let name = removed.swap_remove(rng.random_range(0..removed.len()));
            current.add_resource(name.clone())?;
            working.push(name.clone());
            report.adds += 1;
            name
        } else {
            if working.len() == 1 {
                continue;
            }
            let name = working.swap_remove(rng.random_range(0..working.len()));
            current.remove_resource(Some(&name))?;
            removed.push(name.clone());
            report.removes += 1;
            name
        };

        for key in &keys {
            let (after, _) = current.get_resource(key);
            let (before, _) = previous.get_resource(key);
            let moved_ok = if add {
                after == &resource
            } else {
                before == &resource
            };
            if after != before && !moved_ok {
                report.violations.push(Violation {
                    step,
                    added: add,
                    resource: resource.clone(),
                    key: key.clone(),
                    before: before.clone(),
                    after: after.clone(),
                });
            }
        }

        if add {
            previous.add_resource(resource)?;
        } else {
            previous.remove_resource(Some(&resource))?;
        }
        debug!(step, add, size = current.size(), "applied move");
    }

    Ok(report)
}

#[derive(Debug, Clone, PartialEq)]
pub struct RateReport {
    pub keys: usize,
    pub repeat: usize,
    /// Elapsed milliseconds of each timed run.
    pub runs_ms: Vec<f64>,
    pub best_keys_per_sec: f64,
}

/// Time `repeat` passes of lookups over `keys` keys, five times.
pub fn rate(params: RunParams, repeat: usize) -> Result<RateReport> {
    ensure!(repeat > 0, "repeat must be positive");

    let seeds = Seeds::derive(params.seed);
    let split = ResourceSplit::new(params.capacity, params.factor, seeds.removals)?;
    let ring = split.build_ring(seeds.ring, true)?;
    let keys = sample_keys(params.keys, seeds.keys);

    let mut runs_ms = Vec::with_capacity(5);
    let mut best = 0.0f64;
    for _ in 0..5 {
        let start = Instant::now();
        for _ in 0..repeat {
            for key in &keys {
                std::hint::black_box(ring.get_resource(key));
            }
        }
        let secs = start.elapsed().as_secs_f64();
        runs_ms.push(secs * 1_000.0);
        if secs > 0.0 {
            best = best.max((params.keys * repeat) as f64 / secs);
        }
    }

    Ok(RateReport {
        keys: params.keys,
        repeat,
        runs_ms,
        best_keys_per_sec: best,
    })
}

/// Routing of a sentence's characters at one point of the demo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleStep {
    pub label: String,
    pub routes: Vec<String>,
    pub resources: Vec<String>,
    pub size: usize,
    pub capacity: usize,
}

pub const EXAMPLE_TEXT: &str = "anchor hash is the greatest thing since instant coffee";

/// Seven workers in ten buckets: route each character of
/// [`EXAMPLE_TEXT`], then add `H`, then remove `C`.
pub fn example(seed: u32) -> Result<Vec<ExampleStep>> {
    let workers: Vec<String> = ["a", "b", "C", "d", "e", "f", "g"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let mut ring = AnchorRing::new(workers, Some(10), seed)?;

    let snapshot = |label: &str, ring: &AnchorRing<String>| ExampleStep {
        label: label.to_string(),
        routes: EXAMPLE_TEXT
            .chars()
            .map(|c| ring.get_resource(c.to_string()).0.clone())
            .collect(),
        resources: ring.list_resources().into_iter().cloned().collect(),
        size: ring.size(),
        capacity: ring.capacity(),
    };

    let mut steps = vec![snapshot("initial", &ring)];
    ring.add_resource("H".to_string())?;
    steps.push(snapshot("add H", &ring));
    ring.remove_resource(Some(&"C".to_string()))?;
    steps.push(snapshot("remove C", &ring));
    Ok(steps)
}
