use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::errors::CoreError;

use super::traits::DurableStorage;

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, String>,
    /// Byte budget over all keys and values, like a browser origin quota.
    quota: Option<usize>,
    disabled: bool,
}

impl Inner {
    fn used_bytes_excluding(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

/// In-memory `DurableStorage`.
///
/// Clones share the same map, so two stores opened over clones of one
/// `MemoryStorage` behave like two tabs on the same device. A quota and a
/// "disabled" switch make the browser's failure modes reproducible.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that rejects writes once keys plus values exceed `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        let storage = Self::new();
        if let Ok(mut inner) = storage.inner.lock() {
            inner.quota = Some(bytes);
        }
        storage
    }

    /// Turn every operation into `StorageUnavailable` (or back).
    pub fn set_disabled(&self, disabled: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.disabled = disabled;
        }
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().map(|i| i.entries.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read a value bypassing the disabled switch (for inspection in tests and tools).
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<String> {
        self.inner
            .lock()
            .ok()
            .and_then(|i| i.entries.get(key).cloned())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, CoreError> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| CoreError::StorageUnavailable("memory storage lock poisoned".into()))?;
        if inner.disabled {
            return Err(CoreError::StorageUnavailable(
                "storage is disabled".into(),
            ));
        }
        Ok(inner)
    }
}

impl DurableStorage for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.lock()?.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut inner = self.lock()?;
        if let Some(quota) = inner.quota {
            let available = quota.saturating_sub(inner.used_bytes_excluding(key));
            let needed = key.len() + value.len();
            if needed > available {
                return Err(CoreError::StorageQuotaExceeded {
                    key: key.to_string(),
                    needed,
                    available,
                });
            }
        }
        inner.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        self.lock()?.entries.remove(key);
        Ok(())
    }
}
