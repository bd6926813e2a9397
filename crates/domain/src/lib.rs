//! Auron Domain - Core client types
//!
//! This crate defines the domain model for the Auron dialogue client:
//! tokens, identity claims, configuration, and the encrypted conversation
//! envelope/index formats. All types here are pure Rust with no I/O
//! dependencies.

pub mod auth;
pub mod config;
pub mod conversation;
pub mod error;

pub use auth::{AccessToken, AuthError, FirstScreen, IdTokenClaims, UserRecord};
pub use config::{ApiConfig, ClientConfig, IdentityConfig};
pub use conversation::{
    derive_title, ChatMetadata, ChatReply, ChatRequest, ConversationEntry, ConversationEnvelope,
    ConversationIndex, SaveSessionReceipt, SignedConversationUrl, KEY_LEN, NONCE_LEN, TAG_LEN,
};
pub use error::{CryptoError, DomainError, DomainResult};
