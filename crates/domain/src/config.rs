//! Client configuration.
//!
//! Static configuration consumed by the auth and API layers: identity
//! provider coordinates and backend base URLs. Values are loaded by the
//! embedding application; nothing here is read from global state.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DomainError, DomainResult};

/// Identity provider (OIDC) configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Provider endpoint, e.g. `https://auth.example.com/`.
    pub endpoint: Url,
    /// Application (client) identifier registered with the provider.
    pub app_id: String,
    /// API resource indicators access tokens may be requested for.
    pub resources: Vec<String>,
    /// OAuth scopes requested at sign-in.
    pub scopes: Vec<String>,
    /// Redirect URI for the sign-in callback page.
    pub redirect_uri: Url,
    /// Where the provider sends the browser after sign-out.
    pub post_sign_out_uri: Url,
}

impl IdentityConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is not http(s) or the app id is
    /// empty.
    pub fn validate(&self) -> DomainResult<()> {
        if !matches!(self.endpoint.scheme(), "http" | "https") {
            return Err(DomainError::InvalidUrl(format!(
                "identity endpoint must be http(s): {}",
                self.endpoint
            )));
        }
        if self.app_id.trim().is_empty() {
            return Err(DomainError::InvalidConfig(
                "identity app_id must be non-empty".to_string(),
            ));
        }
        Ok(())
    }

    /// The resource indicator access tokens are resolved for.
    ///
    /// The first configured resource is the backend API; additional
    /// resources are available to callers that need them.
    #[must_use]
    pub fn default_resource(&self) -> Option<&str> {
        self.resources.first().map(String::as_str)
    }
}

/// Backend API configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the dialogue backend.
    pub dialogue_base: Url,
    /// Base URL of the BFF fronting CDN storage.
    pub bff_base: Url,
}

impl ApiConfig {
    /// Joins a path onto the dialogue base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be joined.
    pub fn dialogue_url(&self, path: &str) -> DomainResult<Url> {
        self.dialogue_base
            .join(path)
            .map_err(|e| DomainError::InvalidUrl(format!("{e}: {path}")))
    }

    /// Joins a path onto the BFF base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be joined.
    pub fn bff_url(&self, path: &str) -> DomainResult<Url> {
        self.bff_base
            .join(path)
            .map_err(|e| DomainError::InvalidUrl(format!("{e}: {path}")))
    }
}

/// Complete client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Identity provider settings.
    pub identity: IdentityConfig,
    /// Backend API settings.
    pub api: ApiConfig,
}

impl ClientConfig {
    /// Validates all sections.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure encountered.
    pub fn validate(&self) -> DomainResult<()> {
        self.identity.validate()
    }
}
