//! Consistent hashing of keys onto named resources.
//!
//! [`AnchorRing`] binds opaque resource names (shards, servers, workers) to
//! the buckets of an [`AnchorHash`] engine and routes keys to them:
//!
//! ```
//! use anchor_ring::AnchorRing;
//!
//! let mut ring = AnchorRing::new(vec!["a", "b", "c"], Some(4), 1984).unwrap();
//! let (owner, _bucket) = ring.get_resource("user:42");
//! assert!(["a", "b", "c"].contains(owner));
//!
//! ring.add_resource("d").unwrap();
//! ring.remove_resource(Some(&"b")).unwrap();
//! assert_eq!(ring.size(), 3);
//! ```
//!
//! Keys are hashed with a [`KeyHasher`] (XXH64 by default) under the ring's
//! seed. The seed is always explicit; [`random_seed`] draws a fresh one.

mod config;
mod error;
mod hasher;
mod ring;

pub use anchor_engine::{AnchorHash, EngineError, ErrorKind};
pub use config::{RingConfig, default_capacity, random_seed};
pub use error::RingError;
pub use hasher::{KeyHasher, Xxh64Hasher};
pub use ring::AnchorRing;
