//! The flat key-value contract every backend implements

use crate::Result;
use async_trait::async_trait;

/// A flat key-value object store.
///
/// Keys are opaque strings, values are whole objects; there is no
/// byte-range access. `get` reports an absent key as `Ok(None)` rather
/// than an error, and `delete` of an absent key succeeds unless the
/// backend itself reports a failure.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Unconditionally write `value` at `key`.
    async fn put(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Read the object at `key`, or `None` if the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Remove the object at `key`. Removing an absent key is a no-op.
    async fn delete(&self, key: &str) -> Result<()>;
}
