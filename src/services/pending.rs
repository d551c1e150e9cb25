use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};

/// Keys of mutating operations currently in flight, one per (account, target).
#[derive(Clone, Default)]
pub struct PendingOperations {
    inner: Arc<Mutex<HashSet<String>>>,
}

/// Releases its key when dropped.
pub struct PendingGuard {
    key: String,
    inner: Arc<Mutex<HashSet<String>>>,
}

impl PendingOperations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `key`, failing with `OperationInProgress` while another holder
    /// has it.
    pub async fn begin(&self, key: impl Into<String>) -> Result<PendingGuard> {
        let key = key.into();
        let mut inflight = self.inner.lock().await;
        if !inflight.insert(key.clone()) {
            tracing::debug!("Rejecting concurrent operation {}", key);
            return Err(AppError::OperationInProgress);
        }
        Ok(PendingGuard {
            key,
            inner: self.inner.clone(),
        })
    }

    #[cfg(test)]
    pub async fn is_pending(&self, key: &str) -> bool {
        self.inner.lock().await.contains(key)
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        let key = std::mem::take(&mut self.key);
        match self.inner.try_lock() {
            Ok(mut inflight) => {
                inflight.remove(&key);
            }
            Err(_) => {
                // Contended: release from a task instead of blocking in drop.
                if let Ok(handle) = tokio::runtime::Handle::try_current() {
                    let inner = self.inner.clone();
                    handle.spawn(async move {
                        inner.lock().await.remove(&key);
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_claim_fails_until_released() {
        let pending = PendingOperations::new();
        let guard = pending.begin("ADDR:game:1").await.unwrap();
        assert!(matches!(
            pending.begin("ADDR:game:1").await,
            Err(AppError::OperationInProgress)
        ));
        // Other targets are independent.
        let other = pending.begin("ADDR:game:2").await.unwrap();

        drop(guard);
        assert!(!pending.is_pending("ADDR:game:1").await);
        assert!(pending.begin("ADDR:game:1").await.is_ok());
        drop(other);
    }
}
