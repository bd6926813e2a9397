//! Auron Application - client orchestration layer
//!
//! This crate contains the authenticated-request and token-lifecycle core
//! of the Auron dialogue client, written against injected ports so every
//! flow is testable with in-memory fakes:
//!
//! - [`TokenStore`]: cached token/user records over a key-value port
//! - [`AccessTokenResolver`]: cache-first token resolution with a
//!   single-flight forced refresh
//! - [`AuthenticatedClient`]: bearer injection with one-shot 401 recovery
//! - [`SessionKeepAlive`]: visibility-driven token invalidation
//! - [`AuthSession`]: sign-in/sign-out orchestration
//! - [`DialogueApi`] and [`ConversationIndexService`]: the typed backend
//!   client and the end-to-end encrypted conversation index

pub mod api;
pub mod auth;
pub mod conversations;
pub mod error;
pub mod fetch;
pub mod ports;

pub use api::DialogueApi;
pub use auth::{AccessTokenResolver, AuthSession, SessionKeepAlive, TokenStore, Visibility};
pub use conversations::ConversationIndexService;
pub use error::{ApplicationError, ApplicationResult};
pub use fetch::AuthenticatedClient;
