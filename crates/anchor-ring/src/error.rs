//! Error types for the resource ring.

use anchor_engine::{EngineError, ErrorKind};

/// Errors produced by [`AnchorRing`](crate::AnchorRing) operations.
///
/// Resource names are carried in their `Debug` rendering so the error type
/// does not depend on the ring's name type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RingError {
    /// The initial resource list was empty.
    #[error("at least one resource is required")]
    EmptyResources,

    /// The explicit capacity cannot hold the initial resources.
    #[error("capacity {capacity} is smaller than {resources} initial resources")]
    CapacityTooSmall {
        /// Number of initial resources.
        resources: usize,
        /// Requested capacity.
        capacity: usize,
    },

    /// The resource name is already bound to a bucket.
    #[error("resource {0} already exists")]
    DuplicateResource(String),

    /// The resource name is not bound to any bucket.
    #[error("resource {0} does not exist")]
    ResourceNotFound(String),

    /// Only one resource remains.
    #[error("cannot remove the last resource")]
    LastResource,

    /// Every bucket already holds a resource.
    #[error("no room for more resources: capacity {capacity} reached")]
    Exhausted {
        /// Ring capacity.
        capacity: usize,
    },

    /// The bucket engine rejected the operation.
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

impl RingError {
    /// Map this error to its failure class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyResources | Self::CapacityTooSmall { .. } | Self::LastResource => {
                ErrorKind::InvalidArgument
            }
            Self::DuplicateResource(_) => ErrorKind::DuplicateKey,
            Self::ResourceNotFound(_) => ErrorKind::NotFound,
            Self::Exhausted { .. } => ErrorKind::ResourceExhausted,
            Self::Engine(e) => e.kind(),
        }
    }
}
