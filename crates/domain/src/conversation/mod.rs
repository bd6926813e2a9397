//! Conversation data model.
//!
//! Covers the three shapes the client moves around:
//! - the encrypted envelope stored on the CDN,
//! - the client-owned conversation index,
//! - the chat request/response payloads exchanged with the backend.

mod chat;
mod envelope;
mod index;

pub use chat::{ChatMetadata, ChatReply, ChatRequest, SaveSessionReceipt, SignedConversationUrl};
pub use envelope::{ConversationEnvelope, KEY_LEN, NONCE_LEN, TAG_LEN};
pub use index::{derive_title, ConversationEntry, ConversationIndex, INDEX_FORMAT_VERSION};
