//! Error types for the bucket engine.

use std::fmt;

/// Broad failure classes shared by the engine and the resource ring.
///
/// Every failure is synchronous and leaves the structure in its pre-call
/// state, so callers can retry with corrected arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed parameters, or an operation that would empty the working set.
    InvalidArgument,
    /// Every bucket is already live.
    ResourceExhausted,
    /// A name is already bound to a bucket.
    DuplicateKey,
    /// A name is not bound to any bucket.
    NotFound,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument => write!(f, "invalid argument"),
            Self::ResourceExhausted => write!(f, "resource exhausted"),
            Self::DuplicateKey => write!(f, "duplicate key"),
            Self::NotFound => write!(f, "not found"),
        }
    }
}

/// Errors produced by [`AnchorHash`](crate::AnchorHash).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The initial working size is zero or larger than the capacity.
    #[error("invalid working size {working} for capacity {capacity}")]
    InvalidWorkingSize {
        /// Requested initial working size.
        working: usize,
        /// Requested capacity.
        capacity: usize,
    },

    /// The bucket id is not below the capacity.
    #[error("bucket {bucket} out of range for capacity {capacity}")]
    BucketOutOfRange {
        /// Offending bucket id.
        bucket: u32,
        /// Engine capacity.
        capacity: usize,
    },

    /// The bucket is already removed.
    #[error("bucket {0} is not live")]
    BucketNotLive(u32),

    /// Removing the bucket would leave the working set empty.
    #[error("cannot remove the last live bucket")]
    LastBucket,

    /// No removed bucket is available for reuse.
    #[error("all {capacity} buckets are live")]
    Exhausted {
        /// Engine capacity.
        capacity: usize,
    },
}

impl EngineError {
    /// Map this error to its failure class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidWorkingSize { .. }
            | Self::BucketOutOfRange { .. }
            | Self::BucketNotLive(_)
            | Self::LastBucket => ErrorKind::InvalidArgument,
            Self::Exhausted { .. } => ErrorKind::ResourceExhausted,
        }
    }
}
