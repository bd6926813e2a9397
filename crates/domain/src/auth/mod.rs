//! Authentication types for the Auron dialogue client.
//!
//! This module provides:
//! - The opaque bearer token handed to API calls
//! - Identity-provider claims and the cached user record derived from them
//! - The authentication error taxonomy

mod types;

pub use types::{AccessToken, AuthError, FirstScreen, IdTokenClaims, UserRecord};
