//! RocksDB-backed durable object store

use crate::{ObjectStore, Result, StoreError};
use async_trait::async_trait;
use rocksdb::{Options, DB};
use std::path::Path;

/// Durable local backend.
///
/// Stands in for a remote bucket when running without network
/// credentials; the flat key semantics are identical.
pub struct LocalStore {
    db: DB,
}

impl LocalStore {
    /// Open or create the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts.set_max_open_files(256);
        opts.set_write_buffer_size(64 * 1024 * 1024); // 64MB
        opts.set_max_write_buffer_number(3);

        let db = DB::open(&opts, path).map_err(classify)?;
        tracing::info!(path = %path.display(), "opened local object store");
        Ok(Self { db })
    }

    /// Check whether a key exists without copying the value out.
    pub fn exists(&self, key: &str) -> Result<bool> {
        Ok(self
            .db
            .get_pinned(key.as_bytes())
            .map_err(classify)?
            .is_some())
    }

}

/// RocksDB reports back-pressure conditions distinctly from data-level
/// failures; only the former are worth retrying.
fn classify(e: rocksdb::Error) -> StoreError {
    match e.kind() {
        rocksdb::ErrorKind::Busy | rocksdb::ErrorKind::TryAgain | rocksdb::ErrorKind::TimedOut => {
            StoreError::Transient(e.into_string())
        }
        _ => StoreError::Permanent(e.into_string()),
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.db.put(key.as_bytes(), value).map_err(classify)
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.db.get(key.as_bytes()).map_err(classify)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.db.delete(key.as_bytes()).map_err(classify)
    }
}
