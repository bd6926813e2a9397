//! Identity provider port.

use async_trait::async_trait;
use auron_domain::{AccessToken, AuthError, FirstScreen, IdTokenClaims};
use url::Url;

/// Port for the hosted OAuth2/OIDC identity provider.
///
/// The provider is treated as opaque; the core only consumes this
/// contract and never assumes anything about its internals.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns true if a provider session exists.
    async fn is_authenticated(&self) -> bool;

    /// Starts the hosted sign-in flow; the user agent is redirected away.
    ///
    /// # Errors
    ///
    /// Returns an error if the flow could not be started.
    async fn sign_in(&self, redirect_uri: &Url, first_screen: FirstScreen)
        -> Result<(), AuthError>;

    /// Ends the provider session; the user agent is redirected to
    /// `post_sign_out_uri`.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider session could not be ended.
    async fn sign_out(&self, post_sign_out_uri: &Url) -> Result<(), AuthError>;

    /// Obtains an access token for the given API resource indicator,
    /// refreshing the provider session if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if no token could be obtained.
    async fn access_token(&self, resource: &str) -> Result<AccessToken, AuthError>;

    /// Returns the claims of the current ID token.
    ///
    /// # Errors
    ///
    /// Returns an error if no session exists or the token is unreadable.
    async fn id_token_claims(&self) -> Result<IdTokenClaims, AuthError>;

    /// Completes the sign-in flow from the callback page URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the callback parameters are missing or the
    /// code exchange fails.
    async fn handle_sign_in_callback(&self, current_url: &str) -> Result<(), AuthError>;
}
