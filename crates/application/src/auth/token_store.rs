//! Persistent session-state cache.
//!
//! Thin wrapper over the key-value port holding the cached access token
//! and the cached user record. The token carries no local expiry: validity
//! is discovered via a 401 response or a provider refresh, so the store
//! never inspects what it holds.

use std::sync::Arc;

use auron_domain::{AccessToken, UserRecord};
use tracing::warn;

use crate::ports::KeyValueStore;

/// Storage key of the cached access token.
pub const ACCESS_TOKEN_KEY: &str = "auron_access_token";

/// Storage key of the cached ID token.
pub const ID_TOKEN_KEY: &str = "auron_id_token";

/// Storage key of the cached user record (profile JSON).
pub const USER_KEY: &str = "auron_user";

/// Returns true for keys owned by the identity provider SDK state
/// (sessions, PKCE verifiers, discovery caches).
fn is_provider_key(key: &str) -> bool {
    key.starts_with("logto") || key.contains("oidc")
}

/// Cached token and user records over a key-value store.
#[derive(Clone)]
pub struct TokenStore {
    store: Arc<dyn KeyValueStore>,
}

impl TokenStore {
    /// Creates a token store over the given key-value backend.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Returns the cached access token, if one is held.
    pub async fn access_token(&self) -> Option<AccessToken> {
        self.store
            .get(ACCESS_TOKEN_KEY)
            .await
            .filter(|raw| !raw.is_empty())
            .map(AccessToken::new)
    }

    /// Caches an access token, replacing any previous one.
    pub async fn set_access_token(&self, token: &AccessToken) {
        self.store.set(ACCESS_TOKEN_KEY, token.as_str()).await;
    }

    /// Discards the cached access token.
    pub async fn clear_access_token(&self) {
        self.store.remove(ACCESS_TOKEN_KEY).await;
    }

    /// Returns the cached raw ID token, if one is held.
    pub async fn id_token(&self) -> Option<String> {
        self.store.get(ID_TOKEN_KEY).await
    }

    /// Caches the raw ID token.
    pub async fn set_id_token(&self, token: &str) {
        self.store.set(ID_TOKEN_KEY, token).await;
    }

    /// Returns the cached user record, if one is held and readable.
    pub async fn user(&self) -> Option<UserRecord> {
        let raw = self.store.get(USER_KEY).await?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(error) => {
                warn!(%error, "cached user record is unreadable, ignoring");
                None
            }
        }
    }

    /// Caches a user record.
    pub async fn set_user(&self, user: &UserRecord) {
        if let Ok(raw) = serde_json::to_string(user) {
            self.store.set(USER_KEY, &raw).await;
        }
    }

    /// Discards the cached user record.
    pub async fn clear_user(&self) {
        self.store.remove(USER_KEY).await;
    }

    /// Clears all session state: the token/user records and every
    /// provider-namespaced key (stale sessions, PKCE state).
    pub async fn clear_session(&self) {
        self.store.remove(ACCESS_TOKEN_KEY).await;
        self.store.remove(ID_TOKEN_KEY).await;
        self.store.remove(USER_KEY).await;

        for key in self.store.keys().await {
            if is_provider_key(&key) {
                self.store.remove(&key).await;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use tokio::sync::RwLock;

    use super::*;

    #[derive(Default)]
    struct MemoryStore {
        entries: RwLock<HashMap<String, String>>,
    }

    #[async_trait]
    impl KeyValueStore for MemoryStore {
        async fn get(&self, key: &str) -> Option<String> {
            self.entries.read().await.get(key).cloned()
        }

        async fn set(&self, key: &str, value: &str) {
            self.entries
                .write()
                .await
                .insert(key.to_string(), value.to_string());
        }

        async fn remove(&self, key: &str) {
            self.entries.write().await.remove(key);
        }

        async fn keys(&self) -> Vec<String> {
            self.entries.read().await.keys().cloned().collect()
        }
    }

    fn store() -> (TokenStore, Arc<MemoryStore>) {
        let backend = Arc::new(MemoryStore::default());
        (TokenStore::new(backend.clone()), backend)
    }

    #[tokio::test]
    async fn caches_and_clears_access_token() {
        let (tokens, _) = store();
        assert!(tokens.access_token().await.is_none());

        tokens.set_access_token(&AccessToken::new("tok1")).await;
        assert_eq!(tokens.access_token().await.unwrap().as_str(), "tok1");

        tokens.clear_access_token().await;
        assert!(tokens.access_token().await.is_none());
    }

    #[tokio::test]
    async fn empty_stored_token_reads_as_absent() {
        let (tokens, backend) = store();
        backend.set(ACCESS_TOKEN_KEY, "").await;
        assert!(tokens.access_token().await.is_none());
    }

    #[tokio::test]
    async fn id_token_roundtrips() {
        let (tokens, _) = store();
        assert!(tokens.id_token().await.is_none());

        tokens.set_id_token("header.payload.sig").await;
        assert_eq!(tokens.id_token().await.as_deref(), Some("header.payload.sig"));
    }

    #[tokio::test]
    async fn user_record_is_independently_removable() {
        let (tokens, _) = store();
        tokens.set_access_token(&AccessToken::new("tok1")).await;
        tokens
            .set_user(&UserRecord {
                id: "u1".to_string(),
                name: "Ada".to_string(),
                email: String::new(),
                picture: String::new(),
            })
            .await;

        tokens.clear_user().await;
        assert!(tokens.user().await.is_none());
        assert!(tokens.access_token().await.is_some());
    }

    #[tokio::test]
    async fn user_record_roundtrips_as_json() {
        let (tokens, backend) = store();
        let user = UserRecord {
            id: "u1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            picture: String::new(),
        };

        tokens.set_user(&user).await;
        assert_eq!(tokens.user().await.unwrap(), user);

        backend.set(USER_KEY, "{not json").await;
        assert!(tokens.user().await.is_none());
    }

    #[tokio::test]
    async fn clear_session_sweeps_provider_keys() {
        let (tokens, backend) = store();
        tokens.set_access_token(&AccessToken::new("tok1")).await;
        tokens.set_id_token("id1").await;
        backend.set("logto:app123:refreshToken", "r1").await;
        backend.set("oidc.discovery", "cached").await;
        backend.set("unrelated", "keep").await;

        tokens.clear_session().await;

        let keys = backend.keys().await;
        assert_eq!(keys, vec!["unrelated".to_string()]);
    }
}
