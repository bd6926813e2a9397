//! Client-owned conversation index.
//!
//! The index is stored end-to-end encrypted on CDN storage; the backend
//! never sees its plaintext. It maps conversation ids to display metadata
//! so the conversation list renders without fetching every blob.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Current index format version.
pub const INDEX_FORMAT_VERSION: u32 = 1;

/// Maximum derived title length in characters.
const TITLE_MAX_CHARS: usize = 50;

/// Words taken from the first message when deriving a title.
const TITLE_MAX_WORDS: usize = 6;

/// Metadata for a single conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    /// Conversation (session) identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp; ordering key for the conversation list.
    pub updated_at: DateTime<Utc>,
    /// Number of messages in the conversation.
    pub message_count: u32,
    /// CDN storage key of the conversation blob.
    pub storage_key: String,
}

/// Encrypted conversation index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationIndex {
    /// Format version, bumped on incompatible layout changes.
    pub version: u32,
    /// Conversations keyed by id.
    pub conversations: BTreeMap<String, ConversationEntry>,
}

impl Default for ConversationIndex {
    fn default() -> Self {
        Self {
            version: INDEX_FORMAT_VERSION,
            conversations: BTreeMap::new(),
        }
    }
}

impl ConversationIndex {
    /// Creates an empty index at the current format version.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of conversations in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    /// Returns true if the index holds no conversations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// Looks up a conversation by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ConversationEntry> {
        self.conversations.get(id)
    }

    /// Returns true if the conversation is present.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.conversations.contains_key(id)
    }

    /// Inserts or replaces a conversation entry.
    pub fn insert(&mut self, entry: ConversationEntry) {
        self.conversations.insert(entry.id.clone(), entry);
    }

    /// Applies an in-place update and stamps `updated_at`.
    ///
    /// Returns the updated entry, or `None` if the id is unknown.
    pub fn update<F>(&mut self, id: &str, now: DateTime<Utc>, f: F) -> Option<&ConversationEntry>
    where
        F: FnOnce(&mut ConversationEntry),
    {
        let entry = self.conversations.get_mut(id)?;
        f(entry);
        entry.updated_at = now;
        Some(entry)
    }

    /// Removes a conversation, returning its entry if present.
    pub fn remove(&mut self, id: &str) -> Option<ConversationEntry> {
        self.conversations.remove(id)
    }

    /// Conversations sorted most-recently-updated first, capped at `limit`.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<&ConversationEntry> {
        let mut entries: Vec<&ConversationEntry> = self.conversations.values().collect();
        entries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        entries.truncate(limit);
        entries
    }
}

/// Derives a conversation title from the first user message.
///
/// Takes the first few words, caps the length, and falls back to a dated
/// label for empty or very short messages.
#[must_use]
pub fn derive_title(first_message: &str, today: NaiveDate) -> String {
    let fallback = format!("Chat {}", today.format("%Y-%m-%d"));

    let cleaned = first_message.split_whitespace().collect::<Vec<_>>();
    if cleaned.is_empty() {
        return fallback;
    }

    let mut title = cleaned
        .into_iter()
        .take(TITLE_MAX_WORDS)
        .collect::<Vec<_>>()
        .join(" ");

    if title.chars().count() > TITLE_MAX_CHARS {
        title = title.chars().take(TITLE_MAX_CHARS - 3).collect::<String>() + "...";
    }

    if title.chars().count() < 3 {
        return fallback;
    }

    title
}
