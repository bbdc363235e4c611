use crate::errors::CoreError;

/// A string key-value store that survives restarts of the session.
///
/// Stands in for the browser's local storage: the embedding application
/// picks the backend (in-memory, a directory on disk, a `localStorage`
/// bridge on WASM), the stores only ever see this trait.
///
/// Every method may fail; callers in this crate treat durable storage as
/// best-effort and log failures instead of propagating them.
pub trait DurableStorage: Send + Sync {
    /// Backend name for log lines.
    fn name(&self) -> &str;

    /// Read the value under `key`. A missing key is `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>, CoreError>;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), CoreError>;

    /// Delete `key`. Deleting a missing key succeeds.
    fn remove(&self, key: &str) -> Result<(), CoreError>;
}
