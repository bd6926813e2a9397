//! End-to-end encrypted conversation index.
//!
//! The index lives at `conversations/{user_hash}/index.enc` behind the
//! BFF's CDN proxy. The backend stores and serves it but never sees its
//! plaintext; sealing and opening happen client-side through the cipher
//! port. A missing, undersized, or unreadable index degrades to a fresh
//! empty one rather than blocking the conversation list.

use std::sync::Arc;

use auron_domain::{
    derive_title, ApiConfig, ConversationEntry, ConversationIndex, NONCE_LEN, TAG_LEN,
};
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{ApplicationError, ApplicationResult};
use crate::fetch::AuthenticatedClient;
use crate::ports::{ConversationCipher, HttpRequest};

/// Smallest well-formed encrypted index: nonce plus GCM tag.
const MIN_ENCRYPTED_LEN: usize = NONCE_LEN + TAG_LEN;

/// Header naming the CDN path on proxy writes.
const CDN_PATH_HEADER: &str = "X-CDN-Path";

/// Manages the user's encrypted conversation index.
pub struct ConversationIndexService {
    http: Arc<AuthenticatedClient>,
    cipher: Arc<dyn ConversationCipher>,
    config: ApiConfig,
    index_path: String,
    index: RwLock<Option<ConversationIndex>>,
}

impl ConversationIndexService {
    /// Creates an index service for the user identified by `user_hash`
    /// (the storage-path hash, not the raw user id).
    #[must_use]
    pub fn new(
        http: Arc<AuthenticatedClient>,
        cipher: Arc<dyn ConversationCipher>,
        config: ApiConfig,
        user_hash: &str,
    ) -> Self {
        Self {
            http,
            cipher,
            config,
            index_path: format!("conversations/{user_hash}/index.enc"),
            index: RwLock::new(None),
        }
    }

    /// CDN path of this user's index.
    #[must_use]
    pub fn index_path(&self) -> &str {
        &self.index_path
    }

    /// Loads the index from CDN storage.
    ///
    /// Never fails: a missing index (first run), an undersized blob, or
    /// any load/decrypt error yields a fresh empty index.
    pub async fn load(&self) -> ConversationIndex {
        let index = self.fetch_index().await;
        *self.index.write().await = Some(index.clone());
        index
    }

    /// Persists the loaded index to CDN storage.
    ///
    /// # Errors
    ///
    /// Fails if no index has been loaded, or on seal/transport/backend
    /// failure.
    pub async fn save(&self) -> ApplicationResult<()> {
        let snapshot = self
            .index
            .read()
            .await
            .clone()
            .ok_or_else(|| ApplicationError::Internal("conversation index not loaded".to_string()))?;

        let plaintext = serde_json::to_value(&snapshot)?;
        let sealed = self.cipher.seal(&plaintext)?;

        let url = self.config.bff_url("cdn-proxy")?;
        let request = HttpRequest::put(url.as_str())
            .header(CDN_PATH_HEADER, &self.index_path)
            .bytes(sealed, "application/octet-stream");

        let response = self.http.execute(request).await?;
        if !response.is_success() {
            return Err(ApplicationError::Api {
                endpoint: "cdn-proxy",
                status: response.status,
            });
        }

        debug!("conversation index saved");
        Ok(())
    }

    /// Adds or replaces a conversation entry and persists the index.
    ///
    /// # Errors
    ///
    /// Fails if the index cannot be persisted.
    pub async fn record(&self, entry: ConversationEntry) -> ApplicationResult<()> {
        self.ensure_loaded().await;
        if let Some(index) = self.index.write().await.as_mut() {
            index.insert(entry);
        }
        self.save().await
    }

    /// Records a newly created conversation, deriving its title from the
    /// first user message.
    ///
    /// # Errors
    ///
    /// Fails if the index cannot be persisted.
    pub async fn record_new(
        &self,
        id: &str,
        first_message: &str,
        storage_key: &str,
    ) -> ApplicationResult<ConversationEntry> {
        let now = Utc::now();
        let entry = ConversationEntry {
            id: id.to_string(),
            title: derive_title(first_message, now.date_naive()),
            created_at: now,
            updated_at: now,
            message_count: 1,
            storage_key: storage_key.to_string(),
        };
        self.record(entry.clone()).await?;
        Ok(entry)
    }

    /// Applies an update to an existing entry, stamps it, and persists.
    ///
    /// Returns the updated entry, or `None` if the id is unknown (in
    /// which case nothing is written).
    ///
    /// # Errors
    ///
    /// Fails if the index cannot be persisted.
    pub async fn update<F>(&self, id: &str, f: F) -> ApplicationResult<Option<ConversationEntry>>
    where
        F: FnOnce(&mut ConversationEntry) + Send,
    {
        self.ensure_loaded().await;

        let updated = {
            let mut guard = self.index.write().await;
            guard
                .as_mut()
                .and_then(|index| index.update(id, Utc::now(), f).cloned())
        };

        let Some(updated) = updated else {
            warn!(id, "conversation not found in index");
            return Ok(None);
        };

        self.save().await?;
        Ok(Some(updated))
    }

    /// Removes a conversation and persists the index if it was present.
    ///
    /// # Errors
    ///
    /// Fails if the index cannot be persisted.
    pub async fn remove(&self, id: &str) -> ApplicationResult<()> {
        self.ensure_loaded().await;

        let removed = self
            .index
            .write()
            .await
            .as_mut()
            .and_then(|index| index.remove(id));

        if removed.is_some() {
            self.save().await?;
        }
        Ok(())
    }

    /// Conversations sorted most-recently-updated first.
    pub async fn list(&self, limit: usize) -> Vec<ConversationEntry> {
        self.index
            .read()
            .await
            .as_ref()
            .map(|index| index.recent(limit).into_iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns true if the loaded index holds the conversation.
    pub async fn contains(&self, id: &str) -> bool {
        self.index
            .read()
            .await
            .as_ref()
            .is_some_and(|index| index.contains(id))
    }

    async fn ensure_loaded(&self) {
        if self.index.read().await.is_none() {
            self.load().await;
        }
    }

    async fn fetch_index(&self) -> ConversationIndex {
        let url = match self.config.bff_url("cdn-proxy") {
            Ok(mut url) => {
                url.query_pairs_mut().append_pair("path", &self.index_path);
                url
            }
            Err(error) => {
                warn!(%error, "could not build index URL");
                return ConversationIndex::empty();
            }
        };

        let response = match self.http.get(url.as_str()).await {
            Ok(response) => response,
            Err(error) => {
                warn!(%error, "could not load conversation index");
                return ConversationIndex::empty();
            }
        };

        if response.status == 404 {
            debug!("no conversation index yet, starting empty");
            return ConversationIndex::empty();
        }

        if !response.is_success() {
            warn!(status = response.status, "failed to load conversation index");
            return ConversationIndex::empty();
        }

        if response.body.len() < MIN_ENCRYPTED_LEN {
            debug!("index blob too small, starting empty");
            return ConversationIndex::empty();
        }

        match self
            .cipher
            .open(&response.body)
            .map_err(ApplicationError::from)
            .and_then(|value| serde_json::from_value(value).map_err(ApplicationError::from))
        {
            Ok(index) => index,
            Err(error) => {
                warn!(%error, "conversation index unreadable, starting empty");
                ConversationIndex::empty()
            }
        }
    }
}
