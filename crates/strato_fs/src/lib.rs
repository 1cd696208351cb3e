//! StratoStore Hierarchical Core
//!
//! Builds directories, listings, and file semantics on top of a flat
//! object store:
//! - TreePath: validated segment paths and their canonical store keys
//! - Node: the persisted File/Directory record and its wire codec
//! - DirectoryIndex: child-list maintenance on directory nodes
//! - KeyLocks: per-key serialization for read-modify-write sequences
//! - FileSystem: the path-addressed facade

mod tree_path;
mod node;
mod key_locks;
mod dir_index;
mod filesystem;

pub use tree_path::TreePath;
pub use node::Node;
pub use key_locks::KeyLocks;
pub use dir_index::DirectoryIndex;
pub use filesystem::FileSystem;

use strato_kv::StoreError;
use thiserror::Error;

/// Hierarchical-core errors
#[derive(Error, Debug)]
pub enum FsError {
    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// A child-index mutation found no directory node at the expected
    /// parent path. The index is inconsistent; the call is not retried.
    #[error("parent directory missing: {0}")]
    ParentMissing(String),

    #[error("corrupt node payload at {key}: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// A mutation half-applied and the compensating cleanup also failed.
    #[error("store left inconsistent at {key}: {reason}")]
    Inconsistent { key: String, reason: String },

    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, FsError>;
