//! Conversation state for the chat UI
//!
//! Conversations live in memory only. The store is an owned value that
//! the UI loop (or a one-shot command) mutates through its methods; the
//! message exchange protocol in [`crate::exchange`] drives the
//! optimistic-send / reconcile cycle against it.

pub mod conversation;
pub mod store;

pub use conversation::{
    dedupe_by_id, Conversation, ConversationSummary, Message, Role, DEFAULT_PREVIEW,
    DEFAULT_TITLE, FALLBACK_CONVERSATION_ID, PREVIEW_MAX_CHARS, TITLE_MAX_CHARS,
};
pub use store::SessionStore;
