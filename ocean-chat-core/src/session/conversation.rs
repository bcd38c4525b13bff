//! Conversation and message data structures

use crate::utils::truncate_chars;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Title shown until the first user message arrives
pub const DEFAULT_TITLE: &str = "New chat";
/// Sidebar preview shown for a conversation with no messages
pub const DEFAULT_PREVIEW: &str = "Start a conversation…";
/// Id of the conversation created when no history can be loaded
pub const FALLBACK_CONVERSATION_ID: &str = "local-1";

pub const TITLE_MAX_CHARS: usize = 30;
pub const PREVIEW_MAX_CHARS: usize = 50;

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    fn id_prefix(self) -> &'static str {
        match self {
            Role::User => "u",
            Role::Assistant => "a",
        }
    }
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique within its conversation
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub role: Role,
    /// Message text, kept verbatim
    #[serde(default)]
    pub content: String,
    /// Creation time, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Message {
    /// Create a message with a freshly generated id
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: format!("{}-{}", role.id_prefix(), Uuid::new_v4()),
            role,
            content: content.into(),
            timestamp: Some(Utc::now()),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// A titled, ordered sequence of messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_preview")]
    pub preview: String,
    /// Chronological order
    #[serde(default)]
    pub messages: Vec<Message>,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_preview() -> String {
    DEFAULT_PREVIEW.to_string()
}

impl Conversation {
    /// Create an empty conversation with the default title and preview
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: default_title(),
            preview: default_preview(),
            messages: Vec::new(),
        }
    }

    /// Create an empty conversation with a fresh local id
    pub fn local() -> Self {
        Self::new(format!("local-{}", Uuid::new_v4()))
    }

    /// The conversation used when no history is available
    pub fn fallback() -> Self {
        Self::new(FALLBACK_CONVERSATION_ID)
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Sidebar row for this conversation
    pub fn summary(&self) -> ConversationSummary {
        ConversationSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            preview: self.preview.clone(),
        }
    }

    /// Append a user message ahead of the backend's answer.
    ///
    /// The title is taken from the first message only.
    pub(crate) fn push_optimistic(&mut self, message: &Message) {
        if self.messages.is_empty() {
            self.title = truncate_chars(&message.content, TITLE_MAX_CHARS);
        }
        self.preview = truncate_chars(&message.content, PREVIEW_MAX_CHARS);
        self.messages.push(message.clone());
    }

    /// Merge a confirmed exchange into the sequence.
    ///
    /// Both messages are appended and the sequence is deduplicated, so the
    /// optimistic copy of `user` (or a repeated merge) collapses into the
    /// first occurrence.
    pub(crate) fn merge_exchange(&mut self, user: &Message, reply: &Message) {
        let mut messages = std::mem::take(&mut self.messages);
        messages.push(user.clone());
        messages.push(reply.clone());
        self.messages = dedupe_by_id(messages);
        self.preview = truncate_chars(&reply.content, PREVIEW_MAX_CHARS);
    }
}

/// Sidebar row: id, title and preview of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationSummary {
    pub id: String,
    pub title: String,
    pub preview: String,
}

/// Drop every message whose id was already seen, keeping the first one
pub fn dedupe_by_id(messages: Vec<Message>) -> Vec<Message> {
    let mut seen = HashSet::new();
    messages
        .into_iter()
        .filter(|m| seen.insert(m.id.clone()))
        .collect()
}

/// Server-assigned ids may arrive as JSON numbers
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Str(String),
        Int(i64),
        Uint(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Str(s) => s,
        Id::Int(n) => n.to_string(),
        Id::Uint(n) => n.to_string(),
    })
}
