//! Conversation encryption.

mod envelope;

pub use envelope::{user_storage_hash, ConversationKey, EnvelopeCipher, USER_KEY_SALT};
