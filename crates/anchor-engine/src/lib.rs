//! AnchorHash: a fixed-capacity consistent hash over integer buckets.
//!
//! This crate provides:
//! - [`AnchorHash`] — maps uniformly distributed `u64` keys to live bucket
//!   ids in `0..capacity`, with constant-work bucket addition and removal.
//! - [`EngineError`] / [`ErrorKind`] — failures and their broad classes.
//!
//! Removing a bucket remaps only the keys that resolved to it; adding a
//! bucket only takes keys away from existing buckets. Buckets know nothing
//! about the resources they stand for; see the `anchor-ring` crate for the
//! name binding layer.
//!
//! The engine is not internally synchronized. Concurrent lookups are fine
//! behind a shared reference, but membership changes need exclusive access.

mod engine;
mod error;

pub use engine::AnchorHash;
pub use error::{EngineError, ErrorKind};
