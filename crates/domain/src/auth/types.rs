//! Token, claim, and user types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque bearer token presented in the `Authorization` header.
///
/// The client tracks no local expiry for it: validity is discovered via a
/// 401 response or a provider-initiated refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a raw token string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the raw token string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the `Authorization` header value for this token.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.0)
    }

    /// Returns true if the token is an empty string.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get a preview of the token (first 8 chars + ...), safe for logs.
    #[must_use]
    pub fn preview(&self) -> String {
        if self.0.len() > 12 {
            format!("{}...", &self.0[..8])
        } else {
            self.0.clone()
        }
    }
}

/// ID-token claims returned by the identity provider.
///
/// Unknown claims are ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdTokenClaims {
    /// Subject identifier (stable user id).
    pub sub: String,
    /// Display name, if set.
    #[serde(default)]
    pub name: Option<String>,
    /// Username, if set.
    #[serde(default)]
    pub username: Option<String>,
    /// Email address, if set.
    #[serde(default)]
    pub email: Option<String>,
    /// Avatar URL, if set.
    #[serde(default)]
    pub picture: Option<String>,
}

/// Cached user profile derived from ID-token claims.
///
/// Same lifecycle as the cached access token but independently removable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Stable user id (the `sub` claim).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address, empty if the provider supplied none.
    pub email: String,
    /// Avatar URL, empty if the provider supplied none.
    pub picture: String,
}

impl UserRecord {
    /// Builds a user record from provider claims.
    ///
    /// Falls back through name, then username, then a generic label, so a
    /// record is always displayable.
    #[must_use]
    pub fn from_claims(claims: &IdTokenClaims) -> Self {
        let name = claims
            .name
            .clone()
            .or_else(|| claims.username.clone())
            .unwrap_or_else(|| "User".to_string());

        Self {
            id: claims.sub.clone(),
            name,
            email: claims.email.clone().unwrap_or_default(),
            picture: claims.picture.clone().unwrap_or_default(),
        }
    }
}

/// First screen shown by the hosted sign-in page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirstScreen {
    /// Regular sign-in screen.
    #[default]
    SignIn,
    /// Registration screen, used by the sign-up entry point.
    Register,
}

impl FirstScreen {
    /// Value of the `first_screen` authorization parameter, if any.
    #[must_use]
    pub const fn as_param(self) -> Option<&'static str> {
        match self {
            Self::SignIn => None,
            Self::Register => Some("register"),
        }
    }
}

/// Authentication errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No token could be obtained; the caller is unauthenticated.
    #[error("not authenticated")]
    Unauthenticated,

    /// A refresh was attempted and failed; the session is expired.
    #[error("session expired")]
    SessionExpired,

    /// The identity provider reported a failure.
    #[error("identity provider error: {0}")]
    Provider(String),
}
