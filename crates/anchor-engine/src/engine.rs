//! AnchorHash bucket engine.
//!
//! All state lives in fixed-size integer arrays indexed by bucket id or by
//! working-set position. Nothing is rehashed or rebalanced on membership
//! changes: adding or removing a bucket touches a constant number of slots.

use tracing::debug;
use xxhash_rust::xxh64::xxh64;

use crate::error::EngineError;

/// Fixed-capacity consistent hash from `u64` keys to live bucket ids.
///
/// Buckets are `u32` ids in `0..capacity`. Each bucket is either live or
/// removed. A removed bucket remembers the working-set size at the moment it
/// was removed (its anchor value) and the bucket that took over its
/// working-set position (its successor). Lookups that land on a removed
/// bucket follow those records to a live bucket, which is what confines
/// remapping to the keys of the bucket that actually changed.
///
/// Removed buckets are reused last-in first-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorHash {
    /// `0` for a live bucket, otherwise the working size at removal.
    anchor: Box<[u32]>,
    /// Bucket at each working-set position; the first `size` are live.
    working: Box<[u32]>,
    /// Inverse of `working`.
    location: Box<[u32]>,
    /// For a removed bucket, the bucket that moved into its position.
    successor: Box<[u32]>,
    /// Removed buckets, most recently removed on top.
    removed: Vec<u32>,
    /// Number of live buckets.
    size: u32,
}

impl AnchorHash {
    /// Create an engine with `capacity` buckets of which the first `working`
    /// are live.
    ///
    /// The remaining `capacity - working` buckets are removed highest
    /// position first, so the next [`add_bucket`](Self::add_bucket) returns
    /// bucket `working`.
    pub fn new(capacity: usize, working: usize) -> Result<Self, EngineError> {
        if working == 0 || working > capacity || capacity > u32::MAX as usize {
            return Err(EngineError::InvalidWorkingSize { working, capacity });
        }

        let ids: Box<[u32]> = (0..capacity as u32).collect();
        let mut engine = Self {
            anchor: vec![0; capacity].into_boxed_slice(),
            working: ids.clone(),
            location: ids.clone(),
            successor: ids,
            removed: Vec::with_capacity(capacity),
            size: capacity as u32,
        };

        for _ in working..capacity {
            let last = engine.working[engine.size as usize - 1];
            engine.retire(last);
        }

        debug!(capacity, working, "created anchor engine");
        Ok(engine)
    }

    /// Resolve `key` to a live bucket.
    ///
    /// `key` is expected to be uniformly distributed already. The result
    /// depends only on `key` and the sequence of membership changes.
    pub fn get_bucket(&self, key: u64) -> u32 {
        let removed = self.removed.len();
        let mut key = key;
        let mut b = (key % self.anchor.len() as u64) as usize;
        let mut hops = 0usize;

        while self.anchor[b] != 0 {
            debug_assert!(hops < removed, "probe visited more than {removed} removed buckets");
            hops += 1;

            key = reseed(key, b as u32);
            let epoch = self.anchor[b];
            let mut h = (key % u64::from(epoch)) as usize;

            // Walk towards buckets removed later (smaller anchor) until one
            // removed after `b`, or a live one, is found.
            let mut chain = 0usize;
            while self.anchor[h] >= epoch {
                debug_assert!(
                    chain < removed,
                    "successor chain longer than {removed} removed buckets"
                );
                chain += 1;
                h = self.successor[h] as usize;
            }
            b = h;
        }

        b as u32
    }

    /// Bring back the most recently removed bucket and return its id.
    pub fn add_bucket(&mut self) -> Result<u32, EngineError> {
        let Some(b) = self.removed.pop() else {
            return Err(EngineError::Exhausted {
                capacity: self.capacity(),
            });
        };

        let n = self.size as usize;
        let bi = b as usize;

        self.anchor[bi] = 0;
        // working[n] still holds the bucket that filled b's slot on removal.
        let displaced = self.working[n];
        self.location[displaced as usize] = n as u32;
        self.working[self.location[bi] as usize] = b;
        self.successor[bi] = b;
        self.size += 1;

        debug!(bucket = b, working_size = self.size, "added bucket");
        Ok(b)
    }

    /// Remove a specific live bucket.
    pub fn remove_bucket(&mut self, b: u32) -> Result<(), EngineError> {
        if b as usize >= self.anchor.len() {
            return Err(EngineError::BucketOutOfRange {
                bucket: b,
                capacity: self.capacity(),
            });
        }
        if self.anchor[b as usize] != 0 {
            return Err(EngineError::BucketNotLive(b));
        }
        if self.size <= 1 {
            return Err(EngineError::LastBucket);
        }

        self.retire(b);
        debug!(bucket = b, working_size = self.size, "removed bucket");
        Ok(())
    }

    /// Remove the bucket in the last working-set position and return it.
    pub fn pop_bucket(&mut self) -> Result<u32, EngineError> {
        if self.size <= 1 {
            return Err(EngineError::LastBucket);
        }

        let b = self.working[self.size as usize - 1];
        self.retire(b);
        debug!(bucket = b, working_size = self.size, "popped bucket");
        Ok(b)
    }

    /// Total number of buckets, live or removed.
    pub fn capacity(&self) -> usize {
        self.anchor.len()
    }

    /// Number of live buckets.
    pub fn working_size(&self) -> usize {
        self.size as usize
    }

    /// Number of removed buckets waiting for reuse.
    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }

    /// Whether `b` is a live bucket. Out-of-range ids are not live.
    pub fn is_live(&self, b: u32) -> bool {
        self.anchor.get(b as usize).is_some_and(|&a| a == 0)
    }

    /// Live buckets in working-set order.
    pub fn live_buckets(&self) -> impl Iterator<Item = u32> + '_ {
        self.working[..self.size as usize].iter().copied()
    }

    /// Verify the array invariants. Intended for tests and debug checks.
    ///
    /// Checks that the first `size` working positions hold exactly the live
    /// buckets, that `location` inverts `working` over them, that every live
    /// bucket is its own successor, and that the removed stack holds the
    /// remaining buckets with anchors `capacity - 1` down to `size`.
    pub fn check_invariants(&self) -> bool {
        let capacity = self.anchor.len();
        let n = self.size as usize;
        if n == 0 || n > capacity || self.removed.len() != capacity - n {
            return false;
        }

        for (i, &b) in self.working[..n].iter().enumerate() {
            let bi = b as usize;
            if self.anchor[bi] != 0
                || self.location[bi] as usize != i
                || self.successor[bi] != b
            {
                return false;
            }
        }

        let live = self.anchor.iter().filter(|&&a| a == 0).count();
        if live != n {
            return false;
        }

        self.removed
            .iter()
            .enumerate()
            .all(|(i, &b)| self.anchor[b as usize] as usize == capacity - 1 - i)
    }

    /// Mark `b` removed, moving the last live bucket into its position.
    fn retire(&mut self, b: u32) {
        self.size -= 1;
        let n = self.size as usize;
        let bi = b as usize;

        self.anchor[bi] = self.size;
        let last = self.working[n];
        let pos = self.location[bi];
        self.working[pos as usize] = last;
        self.location[last as usize] = pos;
        self.successor[bi] = last;
        self.removed.push(b);
    }
}

/// Derive the next probe key from the current key and the removed bucket.
fn reseed(key: u64, bucket: u32) -> u64 {
    let mut input = [0u8; 12];
    input[..8].copy_from_slice(&key.to_le_bytes());
    input[8..].copy_from_slice(&bucket.to_le_bytes());
    xxh64(&input, key)
}
