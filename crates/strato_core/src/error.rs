//! Aggregate error type for embedding layers

use strato_fs::FsError;
use strato_kv::StoreError;
use thiserror::Error;

/// Top-level error for callers that wire the stack together.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("filesystem error: {0}")]
    Fs(#[from] FsError),

    #[error("store backend error: {0}")]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Is retrying or correcting the call worthwhile, or does this
    /// signal a damaged store?
    pub fn is_recoverable(&self) -> bool {
        match self {
            CoreError::Store(e) | CoreError::Fs(FsError::Store(e)) => e.is_retryable(),
            CoreError::Fs(FsError::Corrupt { .. })
            | CoreError::Fs(FsError::Inconsistent { .. })
            | CoreError::Fs(FsError::ParentMissing(_)) => false,
            CoreError::Fs(_) => true,
            CoreError::Config(_) => false,
            CoreError::Io(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverability_classification() {
        let not_found = CoreError::Fs(FsError::NotFound("/home/x".to_string()));
        assert!(not_found.is_recoverable());

        let corrupt = CoreError::Fs(FsError::Corrupt {
            key: "k".to_string(),
            reason: "bad json".to_string(),
        });
        assert!(!corrupt.is_recoverable());

        let transient = CoreError::Store(StoreError::Transient("503".to_string()));
        assert!(transient.is_recoverable());

        let permanent = CoreError::Store(StoreError::Permanent("denied".to_string()));
        assert!(!permanent.is_recoverable());
    }
}
