//! File-backed key-value store.
//!
//! The desktop analog of browser local storage: a single JSON map on
//! disk, loaded on open and rewritten on every mutation. Matching local
//! storage semantics, I/O failures are logged and swallowed; readers see
//! absence rather than errors.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use auron_application::ports::KeyValueStore;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::warn;

/// Key-value store persisted as a JSON file.
pub struct FileKeyValueStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileKeyValueStore {
    /// Opens a store at `path`, loading existing entries.
    ///
    /// A missing or unreadable file yields an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::load(&path).await;
        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    async fn load(path: &Path) -> HashMap<String, String> {
        let raw = match fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(error) => {
                if error.kind() != std::io::ErrorKind::NotFound {
                    warn!(%error, path = %path.display(), "could not read store file");
                }
                return HashMap::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(error) => {
                warn!(%error, path = %path.display(), "store file unreadable, starting empty");
                HashMap::new()
            }
        }
    }

    async fn persist(&self, snapshot: &HashMap<String, String>) {
        let raw = match serde_json::to_string_pretty(snapshot) {
            Ok(raw) => raw,
            Err(error) => {
                warn!(%error, "could not serialize store");
                return;
            }
        };

        if let Some(parent) = self.path.parent() {
            if let Err(error) = fs::create_dir_all(parent).await {
                warn!(%error, "could not create store directory");
                return;
            }
        }

        if let Err(error) = fs::write(&self.path, raw).await {
            warn!(%error, path = %self.path.display(), "could not write store file");
        }
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) {
        let snapshot = {
            let mut entries = self.entries.write().await;
            entries.insert(key.to_string(), value.to_string());
            entries.clone()
        };
        self.persist(&snapshot).await;
    }

    async fn remove(&self, key: &str) {
        let snapshot = {
            let mut entries = self.entries.write().await;
            entries.remove(key);
            entries.clone()
        };
        self.persist(&snapshot).await;
    }

    async fn keys(&self) -> Vec<String> {
        self.entries.read().await.keys().cloned().collect()
    }
}
