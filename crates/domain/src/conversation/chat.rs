//! Chat wire payloads.

use serde::{Deserialize, Serialize};

/// Request body for the chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// User message text.
    pub message: String,
    /// Request metadata.
    pub metadata: ChatMetadata,
}

/// Chat request metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMetadata {
    /// Current session id, or `None` to start a new session.
    pub session_id: Option<String>,
}

impl ChatRequest {
    /// Builds a chat request, continuing `session_id` when given.
    #[must_use]
    pub fn new(message: impl Into<String>, session_id: Option<String>) -> Self {
        Self {
            message: message.into(),
            metadata: ChatMetadata { session_id },
        }
    }
}

/// Response from the chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Assistant message text.
    pub message: String,
    /// Session the message belongs to; echoed for existing sessions,
    /// freshly issued for new ones.
    pub session_id: String,
}

/// Result of persisting a session on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveSessionReceipt {
    /// Number of patterns the backend extracted from the transcript.
    #[serde(default)]
    pub patterns_extracted: u32,
}

/// Signed CDN URL for a conversation blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedConversationUrl {
    /// The URL, valid for a limited time; carries its own auth token.
    pub signed_url: String,
}
