//! Per-call deadline wrapper

use crate::{ObjectStore, Result, StoreError};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Applies a deadline to every call on the wrapped store.
///
/// An elapsed deadline surfaces as [`StoreError::Timeout`], which is
/// retryable. Callers that want outright cancellation drop the future;
/// no partial call survives a drop because each call is a single
/// backend round-trip.
pub struct TimedStore {
    inner: Arc<dyn ObjectStore>,
    deadline: Duration,
}

impl TimedStore {
    pub fn new(inner: Arc<dyn ObjectStore>, deadline: Duration) -> Self {
        Self { inner, deadline }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    async fn bounded<T>(&self, fut: impl Future<Output = Result<T>> + Send) -> Result<T> {
        match tokio::time::timeout(self.deadline, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(deadline = ?self.deadline, "store call exceeded deadline");
                Err(StoreError::Timeout(self.deadline))
            }
        }
    }
}

#[async_trait]
impl ObjectStore for TimedStore {
    async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.bounded(self.inner.put(key, value)).await
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.bounded(self.inner.get(key)).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.bounded(self.inner.delete(key)).await
    }
}
