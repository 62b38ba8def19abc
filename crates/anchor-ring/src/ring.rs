//! Resource ring: binds named resources to AnchorHash buckets.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use anchor_engine::AnchorHash;
use tracing::debug;

use crate::config::{RingConfig, default_capacity};
use crate::error::RingError;
use crate::hasher::{KeyHasher, Xxh64Hasher};

/// Consistent hash from keys to a dynamic set of named resources.
///
/// Each live resource owns exactly one live bucket of the underlying
/// [`AnchorHash`]. Keys are hashed with the ring's seed and resolved to a
/// bucket, then to the resource bound to it. Removing a resource only remaps
/// the keys that resolved to it; adding one only takes keys for itself.
///
/// Two rings with the same seed, capacity, hasher and membership history
/// route every key identically.
///
/// Not internally synchronized: wrap it in a lock if lookups and membership
/// changes can overlap.
#[derive(Debug, Clone)]
pub struct AnchorRing<R, H = Xxh64Hasher> {
    engine: AnchorHash,
    /// Resource bound to each bucket, `None` while the bucket is removed.
    slots: Vec<Option<R>>,
    /// Inverse of `slots` over live buckets.
    buckets: HashMap<R, u32>,
    seed: u32,
    hasher: H,
}

impl<R> AnchorRing<R>
where
    R: Clone + Eq + Hash + Debug,
{
    /// Build a ring over `resources` hashed with XXH64.
    ///
    /// `capacity` defaults to `ceil(1.1 * resources.len())`. The resources
    /// take buckets `0..resources.len()` in order.
    pub fn new(resources: Vec<R>, capacity: Option<usize>, seed: u32) -> Result<Self, RingError> {
        Self::with_hasher(resources, capacity, seed, Xxh64Hasher)
    }

    /// Build a ring from a [`RingConfig`].
    pub fn with_config(resources: Vec<R>, config: &RingConfig) -> Result<Self, RingError> {
        Self::new(resources, config.capacity, config.seed)
    }
}

impl<R, H> AnchorRing<R, H>
where
    R: Clone + Eq + Hash + Debug,
    H: KeyHasher,
{
    /// Build a ring with a custom key hasher.
    pub fn with_hasher(
        resources: Vec<R>,
        capacity: Option<usize>,
        seed: u32,
        hasher: H,
    ) -> Result<Self, RingError> {
        if resources.is_empty() {
            return Err(RingError::EmptyResources);
        }

        let working = resources.len();
        let capacity = capacity.unwrap_or_else(|| default_capacity(working));
        if capacity < working {
            return Err(RingError::CapacityTooSmall {
                resources: working,
                capacity,
            });
        }

        let mut buckets = HashMap::with_capacity(capacity);
        for (bucket, name) in resources.iter().enumerate() {
            if buckets.insert(name.clone(), bucket as u32).is_some() {
                return Err(RingError::DuplicateResource(format!("{name:?}")));
            }
        }

        let engine = AnchorHash::new(capacity, working)?;

        let mut slots: Vec<Option<R>> = Vec::with_capacity(capacity);
        slots.extend(resources.into_iter().map(Some));
        slots.resize_with(capacity, || None);

        debug!(resources = working, capacity, seed, "created anchor ring");

        Ok(Self {
            engine,
            slots,
            buckets,
            seed,
            hasher,
        })
    }

    /// Resolve `key` to its resource and bucket.
    pub fn get_resource(&self, key: impl AsRef<[u8]>) -> (&R, u32) {
        let hash = self.hasher.hash_key(key.as_ref(), self.seed);
        let bucket = self.engine.get_bucket(hash);
        let name = self.slots[bucket as usize]
            .as_ref()
            .expect("live bucket is always bound");
        (name, bucket)
    }

    /// Add a resource and return the bucket it now owns.
    ///
    /// The bucket is the most recently freed one.
    pub fn add_resource(&mut self, name: R) -> Result<u32, RingError> {
        if self.is_full() {
            return Err(RingError::Exhausted {
                capacity: self.capacity(),
            });
        }
        if self.buckets.contains_key(&name) {
            return Err(RingError::DuplicateResource(format!("{name:?}")));
        }

        let bucket = self.engine.add_bucket()?;
        debug!(resource = ?name, bucket, size = self.size(), "added resource");
        self.slots[bucket as usize] = Some(name.clone());
        self.buckets.insert(name, bucket);
        Ok(bucket)
    }

    /// Remove a resource and return it with the bucket it owned.
    ///
    /// With `None`, removes whichever resource holds the last working-set
    /// position.
    pub fn remove_resource(&mut self, name: Option<&R>) -> Result<(R, u32), RingError> {
        if self.size() <= 1 {
            return Err(RingError::LastResource);
        }

        let bucket = match name {
            Some(name) => {
                let bucket = *self
                    .buckets
                    .get(name)
                    .ok_or_else(|| RingError::ResourceNotFound(format!("{name:?}")))?;
                self.engine.remove_bucket(bucket)?;
                bucket
            }
            None => self.engine.pop_bucket()?,
        };

        let name = self.slots[bucket as usize]
            .take()
            .expect("live bucket is always bound");
        self.buckets.remove(&name);

        debug!(resource = ?name, bucket, size = self.size(), "removed resource");
        Ok((name, bucket))
    }

    /// Live resources in working-set order.
    pub fn list_resources(&self) -> Vec<&R> {
        self.engine
            .live_buckets()
            .filter_map(|b| self.slots[b as usize].as_ref())
            .collect()
    }

    /// Number of live resources.
    pub fn size(&self) -> usize {
        self.engine.working_size()
    }

    /// Fixed bucket capacity.
    pub fn capacity(&self) -> usize {
        self.engine.capacity()
    }

    /// Whether every bucket holds a resource.
    pub fn is_full(&self) -> bool {
        self.size() == self.capacity()
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn contains(&self, name: &R) -> bool {
        self.buckets.contains_key(name)
    }

    /// Bucket owned by `name`, if it is live.
    pub fn bucket_of(&self, name: &R) -> Option<u32> {
        self.buckets.get(name).copied()
    }

    /// Resource bound to `bucket`, if any.
    pub fn resource_at(&self, bucket: u32) -> Option<&R> {
        self.slots.get(bucket as usize).and_then(Option::as_ref)
    }

    /// The underlying bucket engine.
    pub fn engine(&self) -> &AnchorHash {
        &self.engine
    }
}
