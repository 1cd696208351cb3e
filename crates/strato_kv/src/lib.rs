//! StratoStore Object-Store Boundary
//!
//! The only layer that talks to a backend. Provides:
//! - ObjectStore: the flat put/get/delete contract
//! - MemoryStore: in-process backend for tests and local runs
//! - LocalStore: durable RocksDB backend
//! - TimedStore: per-call deadline wrapper

mod store;
mod memory;
mod local;
mod timeout;

pub use store::ObjectStore;
pub use memory::MemoryStore;
pub use local::LocalStore;
pub use timeout::TimedStore;

use thiserror::Error;

/// Object store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backend failed in a way that may succeed on retry.
    #[error("transient store failure: {0}")]
    Transient(String),

    /// The backend rejected the operation outright.
    #[error("permanent store failure: {0}")]
    Permanent(String),

    /// The per-call deadline elapsed before the backend answered.
    #[error("store call timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl StoreError {
    /// May a caller retry this failure with backoff?
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Transient(_) | StoreError::Timeout(_))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
