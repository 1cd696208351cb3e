//! StratoStore Core Wiring
//!
//! This crate contains:
//! - Storage configuration
//! - The aggregate error type
//! - Backend construction and global initialization

pub mod config;
pub mod error;

pub use config::{BackendKind, StorageConfig};
pub use error::CoreError;

use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::time::Duration;
use strato_fs::FileSystem;
use strato_kv::{LocalStore, MemoryStore, ObjectStore, TimedStore};

/// Global filesystem handle (for embedding layers that want a single
/// shared instance)
static FILE_SYSTEM: OnceCell<FileSystem> = OnceCell::new();

/// Build a filesystem over the backend named by `config`.
///
/// Every store call runs under the configured deadline.
pub fn build(config: &StorageConfig) -> Result<FileSystem, CoreError> {
    if config.operation_timeout_ms == 0 {
        return Err(CoreError::Config(
            "operation_timeout_ms must be positive".to_string(),
        ));
    }

    let backend: Arc<dyn ObjectStore> = match config.backend {
        BackendKind::Memory => Arc::new(MemoryStore::new()),
        BackendKind::Local => {
            let dir = config.resolve_data_dir();
            std::fs::create_dir_all(&dir)?;
            Arc::new(LocalStore::open(&dir.join("objects"))?)
        }
    };

    let store = Arc::new(TimedStore::new(
        backend,
        Duration::from_millis(config.operation_timeout_ms),
    ));

    tracing::info!(backend = ?config.backend, timeout_ms = config.operation_timeout_ms, "storage initialized");
    Ok(FileSystem::new(store))
}

/// Initialize logging and the global filesystem instance.
pub fn init(config: StorageConfig) -> anyhow::Result<&'static FileSystem> {
    strato_log::init()?;

    let fs = build(&config)?;
    FILE_SYSTEM
        .set(fs)
        .map_err(|_| anyhow::anyhow!("filesystem already initialized"))?;
    Ok(FILE_SYSTEM.get().unwrap())
}

/// Get the global filesystem instance, if initialized.
pub fn filesystem() -> Option<&'static FileSystem> {
    FILE_SYSTEM.get()
}
