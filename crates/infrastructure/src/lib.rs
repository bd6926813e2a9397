//! Auron Infrastructure - adapters
//!
//! Concrete implementations of the application-layer ports: a reqwest
//! HTTP transport, a Logto OIDC identity-provider adapter, the AES-256-GCM
//! conversation cipher, and key-value stores (file-backed and in-memory).

pub mod adapters;
pub mod crypto;
pub mod identity;
pub mod persistence;

pub use adapters::ReqwestTransport;
pub use crypto::{user_storage_hash, ConversationKey, EnvelopeCipher, USER_KEY_SALT};
pub use identity::LogtoProvider;
pub use persistence::{FileKeyValueStore, MemoryKeyValueStore};
