//! Authentication core.
//!
//! This module provides:
//! - Persistent token/user caching over the key-value port
//! - Cache-first token resolution with a single-flight forced refresh
//! - Sign-in/sign-out orchestration against the identity provider
//! - Proactive token invalidation on tab re-focus

mod keep_alive;
mod resolver;
mod session;
mod token_store;

pub use keep_alive::{SessionKeepAlive, Visibility};
pub use resolver::AccessTokenResolver;
pub use session::AuthSession;
pub use token_store::{TokenStore, ACCESS_TOKEN_KEY, ID_TOKEN_KEY, USER_KEY};
