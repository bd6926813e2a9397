//! Cache-first access-token resolution with single-flight refresh.

use std::sync::{Arc, Mutex, PoisonError};

use auron_domain::AccessToken;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::auth::TokenStore;
use crate::ports::IdentityProvider;

type RefreshSlot = Mutex<Option<broadcast::Sender<Option<AccessToken>>>>;

/// Resolves usable bearer tokens: cache-first, falling back to the
/// identity provider, with request coalescing for concurrent refreshes.
///
/// Token resolution never raises; callers receive `None` and decide how
/// to react. Retries happen only via the fetch layer's 401 handling.
pub struct AccessTokenResolver {
    provider: Arc<dyn IdentityProvider>,
    store: TokenStore,
    resource: String,
    in_flight: RefreshSlot,
}

impl AccessTokenResolver {
    /// Creates a resolver for the given API resource indicator.
    #[must_use]
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        store: TokenStore,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            store,
            resource: resource.into(),
            in_flight: Mutex::new(None),
        }
    }

    /// The token store this resolver reads and writes.
    #[must_use]
    pub const fn store(&self) -> &TokenStore {
        &self.store
    }

    /// Returns a usable access token, or `None` if none can be obtained.
    ///
    /// Cache hits cost no network call. On a miss the provider is asked
    /// once; the result is persisted on success only.
    pub async fn token(&self) -> Option<AccessToken> {
        if let Some(token) = self.store.access_token().await {
            return Some(token);
        }
        self.request_token().await
    }

    /// Forces a token refresh, coalescing concurrent callers.
    ///
    /// At most one provider call is in flight at any time; callers
    /// arriving while a refresh runs await the same outcome. The cached
    /// token is cleared before the provider is asked, so a crash
    /// mid-refresh cannot leave a stale token masking the real expiry.
    pub async fn force_refresh(&self) -> Option<AccessToken> {
        let waiter = {
            let mut slot = lock_slot(&self.in_flight);
            match slot.as_ref() {
                Some(sender) => Some(sender.subscribe()),
                None => {
                    let (sender, _) = broadcast::channel(1);
                    *slot = Some(sender);
                    None
                }
            }
        };

        if let Some(mut receiver) = waiter {
            debug!("refresh already in flight, awaiting its outcome");
            return receiver.recv().await.ok().flatten();
        }

        let mut guard = RefreshGuard {
            slot: &self.in_flight,
            outcome: None,
        };

        self.store.clear_access_token().await;
        let outcome = self.request_token().await;
        guard.outcome = Some(outcome.clone());

        if let Some(token) = &outcome {
            debug!(token = %token.preview(), "token refreshed");
        }
        outcome
    }

    async fn request_token(&self) -> Option<AccessToken> {
        match self.provider.access_token(&self.resource).await {
            Ok(token) if !token.is_empty() => {
                self.store.set_access_token(&token).await;
                Some(token)
            }
            Ok(_) => {
                warn!("identity provider returned an empty access token");
                None
            }
            Err(error) => {
                warn!(%error, "could not obtain access token");
                None
            }
        }
    }
}

fn lock_slot(
    slot: &RefreshSlot,
) -> std::sync::MutexGuard<'_, Option<broadcast::Sender<Option<AccessToken>>>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Returns the slot to idle when the leading refresh finishes, including
/// when its future is dropped mid-flight.
struct RefreshGuard<'a> {
    slot: &'a RefreshSlot,
    outcome: Option<Option<AccessToken>>,
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        let sender = lock_slot(self.slot).take();
        if let Some(sender) = sender {
            if let Some(outcome) = self.outcome.take() {
                let _ = sender.send(outcome);
            }
            // A sender dropped without sending closes the channel; waiters
            // observe that as a failed refresh.
        }
    }
}
