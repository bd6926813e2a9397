//! Sign-in/sign-out orchestration.

use std::sync::Arc;

use auron_domain::{AuthError, FirstScreen, IdentityConfig, UserRecord};
use tracing::{error, warn};

use crate::auth::TokenStore;
use crate::ports::{IdentityProvider, Navigator};

/// Orchestrates the identity provider for the hosting shell: current-user
/// lookup, sign-in/sign-up entry points, the callback leg, and a sign-out
/// that always leaves local state clean.
pub struct AuthSession {
    provider: Arc<dyn IdentityProvider>,
    store: TokenStore,
    navigator: Arc<dyn Navigator>,
    config: IdentityConfig,
}

impl AuthSession {
    /// Creates a session facade over the given provider and store.
    #[must_use]
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        store: TokenStore,
        navigator: Arc<dyn Navigator>,
        config: IdentityConfig,
    ) -> Self {
        Self {
            provider,
            store,
            navigator,
            config,
        }
    }

    /// Returns true if a provider session exists.
    pub async fn is_authenticated(&self) -> bool {
        self.provider.is_authenticated().await
    }

    /// Returns the signed-in user, refreshing the cached record.
    ///
    /// Yields `None` when unauthenticated or when the claims cannot be
    /// read; never raises.
    pub async fn current_user(&self) -> Option<UserRecord> {
        if !self.provider.is_authenticated().await {
            return None;
        }

        match self.provider.id_token_claims().await {
            Ok(claims) => {
                let user = UserRecord::from_claims(&claims);
                self.store.set_user(&user).await;
                Some(user)
            }
            Err(err) => {
                error!(%err, "failed to read identity claims");
                None
            }
        }
    }

    /// Starts the hosted sign-in flow.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider could not start the flow.
    pub async fn sign_in(&self) -> Result<(), AuthError> {
        self.provider
            .sign_in(&self.config.redirect_uri, FirstScreen::SignIn)
            .await
    }

    /// Starts the hosted flow on the registration screen.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider could not start the flow.
    pub async fn sign_up(&self) -> Result<(), AuthError> {
        self.provider
            .sign_in(&self.config.redirect_uri, FirstScreen::Register)
            .await
    }

    /// Completes the sign-in flow from the callback page URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the callback parameters are missing or the
    /// code exchange fails.
    pub async fn handle_callback(&self, current_url: &str) -> Result<(), AuthError> {
        self.provider.handle_sign_in_callback(current_url).await
    }

    /// Gate for authenticated views: returns the user, or triggers
    /// sign-in and yields `None`.
    pub async fn require_auth(&self) -> Option<UserRecord> {
        if !self.provider.is_authenticated().await {
            if let Err(err) = self.sign_in().await {
                error!(%err, "sign-in could not be started");
            }
            return None;
        }

        match self.current_user().await {
            Some(user) => Some(user),
            None => {
                if let Err(err) = self.sign_in().await {
                    error!(%err, "sign-in could not be started");
                }
                None
            }
        }
    }

    /// Signs out. Never fails.
    ///
    /// Local state is cleared before the provider round-trip so the client
    /// ends up signed out even when the provider is unreachable; in that
    /// case the shell is sent to the post-sign-out page directly.
    pub async fn sign_out(&self) {
        self.store.clear_session().await;

        if let Err(err) = self
            .provider
            .sign_out(&self.config.post_sign_out_uri)
            .await
        {
            warn!(%err, "provider sign-out failed, navigating directly");
            self.navigator.navigate(&self.config.post_sign_out_uri);
        }
    }
}
