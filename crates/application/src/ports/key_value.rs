//! Key-value persistence port.

use async_trait::async_trait;

/// Port for the persistent key-value store backing session state.
///
/// Mirrors the contract of browser local storage: string keys, string
/// values, best-effort writes. Adapters that can fail (file-backed stores)
/// log and swallow I/O errors rather than surfacing them, so callers never
/// distinguish "absent" from "unreadable".
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str);

    /// Removes `key` if present.
    async fn remove(&self, key: &str);

    /// Lists all stored keys.
    async fn keys(&self) -> Vec<String>;
}
