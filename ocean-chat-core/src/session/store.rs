//! Session store: the conversation list and the active pointer

use super::conversation::{Conversation, ConversationSummary};
use crate::backend::ChatBackend;
use crate::{Error, Result};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// In-memory state of one chat session.
///
/// Conversations are kept in recency order (newest local ones first).
/// `loading` is the single-in-flight flag for sends and `error` holds the
/// message of the last failed send.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    conversations: Vec<Conversation>,
    active_id: Option<String>,
    loading: bool,
    error: Option<String>,
}

impl SessionStore {
    /// Create a store with no conversations and nothing selected
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding only the `local-1` conversation, selected
    pub fn local_fallback() -> Self {
        let fallback = Conversation::fallback();
        Self {
            active_id: Some(fallback.id.clone()),
            conversations: vec![fallback],
            ..Self::default()
        }
    }

    /// Build a store from previously fetched conversations.
    ///
    /// The first conversation becomes active. An empty list yields the
    /// local fallback. Later conversations reusing an earlier id are dropped.
    pub fn from_history(conversations: Vec<Conversation>) -> Self {
        let mut seen = HashSet::new();
        let conversations: Vec<Conversation> = conversations
            .into_iter()
            .filter(|c| seen.insert(c.id.clone()))
            .collect();

        match conversations.first() {
            Some(first) => Self {
                active_id: Some(first.id.clone()),
                conversations,
                ..Self::default()
            },
            None => Self::local_fallback(),
        }
    }

    /// Load history from the backend, degrading silently to the local
    /// fallback on any failure or an empty result.
    pub async fn initialize(backend: &dyn ChatBackend) -> Self {
        let history = match backend.fetch_history().await {
            Ok(value) => decode_history(value),
            Err(e) => Err(e),
        };

        match history {
            Ok(conversations) if !conversations.is_empty() => {
                info!("Loaded {} conversations from history", conversations.len());
                Self::from_history(conversations)
            }
            Ok(_) => {
                debug!("History is empty, starting a local conversation");
                Self::local_fallback()
            }
            Err(e) => {
                warn!("Failed to load chat history, using a local conversation: {}", e);
                Self::local_fallback()
            }
        }
    }

    /// Create an empty conversation at the front and select it
    pub fn create_conversation(&mut self) -> &Conversation {
        let conversation = Conversation::local();
        debug!("Created conversation {}", conversation.id);
        self.active_id = Some(conversation.id.clone());
        self.conversations.insert(0, conversation);
        &self.conversations[0]
    }

    /// Select the conversation with `id`; returns false if it does not exist
    pub fn select(&mut self, id: &str) -> bool {
        if self.get(id).is_some() {
            self.active_id = Some(id.to_string());
            true
        } else {
            false
        }
    }

    /// The currently selected conversation
    pub fn active(&self) -> Option<&Conversation> {
        self.active_id.as_deref().and_then(|id| self.get(id))
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    /// Look up a conversation by id
    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    /// All conversations in recency order
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    /// Sidebar rows in recency order
    pub fn summaries(&self) -> Vec<ConversationSummary> {
        self.conversations.iter().map(Conversation::summary).collect()
    }

    /// Whether a send is outstanding
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message of the last failed send
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.id == id)
    }

    pub(crate) fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub(crate) fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }
}

/// Decode a history payload into conversations; anything but an array of
/// conversation objects is rejected.
pub fn decode_history(value: Value) -> Result<Vec<Conversation>> {
    if !value.is_array() {
        return Err(Error::Serialization(
            "chat history payload is not an array".to_string(),
        ));
    }
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct HistoryOnly(std::result::Result<Value, u16>);

    #[async_trait]
    impl ChatBackend for HistoryOnly {
        async fn fetch_history(&self) -> Result<Value> {
            match &self.0 {
                Ok(value) => Ok(value.clone()),
                Err(status) => Err(Error::Api {
                    status: *status,
                    message: "unavailable".to_string(),
                    url: "http://localhost:8000/api/chat/history".to_string(),
                    data: Value::Null,
                }),
            }
        }

        async fn send_message(&self, _text: &str) -> Result<Value> {
            Err(Error::Internal("not used".to_string()))
        }
    }

    fn assert_fallback(store: &SessionStore) {
        assert_eq!(store.conversations().len(), 1);
        let active = store.active().unwrap();
        assert_eq!(active.id, "local-1");
        assert_eq!(active.title, "New chat");
        assert_eq!(active.preview, "Start a conversation…");
        assert!(active.messages.is_empty());
        assert!(store.error().is_none());
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_initialize_with_empty_history_falls_back() {
        let store = SessionStore::initialize(&HistoryOnly(Ok(json!([])))).await;
        assert_fallback(&store);
    }

    #[tokio::test]
    async fn test_initialize_with_failure_falls_back() {
        let store = SessionStore::initialize(&HistoryOnly(Err(503))).await;
        assert_fallback(&store);
    }

    #[tokio::test]
    async fn test_initialize_with_malformed_payload_falls_back() {
        let store = SessionStore::initialize(&HistoryOnly(Ok(json!({ "items": [] })))).await;
        assert_fallback(&store);

        let store = SessionStore::initialize(&HistoryOnly(Ok(json!([{ "title": "no id" }])))).await;
        assert_fallback(&store);
    }

    #[tokio::test]
    async fn test_initialize_selects_first_history_entry() {
        let history = json!([
            { "id": "c1", "title": "Trip", "preview": "hi", "messages": [] },
            { "id": "c2", "title": "Work", "preview": "ok", "messages": [
                { "id": "m1", "role": "user", "content": "ok" }
            ] }
        ]);
        let store = SessionStore::initialize(&HistoryOnly(Ok(history))).await;

        assert_eq!(store.active_id(), Some("c1"));
        assert_eq!(store.active().unwrap().title, "Trip");
        assert_eq!(store.conversations().len(), 2);
        assert_eq!(store.get("c2").unwrap().messages.len(), 1);
    }

    #[test]
    fn test_from_history_drops_repeated_ids() {
        let store = SessionStore::from_history(vec![
            Conversation::new("c1"),
            Conversation::new("c1"),
            Conversation::new("c2"),
        ]);
        assert_eq!(store.conversations().len(), 2);
    }

    #[test]
    fn test_create_conversation_goes_first_and_is_active() {
        let mut store = SessionStore::local_fallback();
        let id = store.create_conversation().id.clone();

        assert_eq!(store.active_id(), Some(id.as_str()));
        assert_eq!(store.conversations()[0].id, id);
        assert_eq!(store.conversations()[1].id, "local-1");

        let summaries = store.summaries();
        assert_eq!(summaries[0].title, "New chat");
        assert_eq!(summaries[0].preview, "Start a conversation…");
    }

    #[test]
    fn test_select_unknown_conversation_is_rejected() {
        let mut store = SessionStore::local_fallback();
        store.create_conversation();

        assert!(store.select("local-1"));
        assert_eq!(store.active_id(), Some("local-1"));
        assert!(!store.select("missing"));
        assert_eq!(store.active_id(), Some("local-1"));
    }

    #[test]
    fn test_empty_store_has_no_active_conversation() {
        let store = SessionStore::new();
        assert!(store.active().is_none());
        assert!(store.summaries().is_empty());
    }
}
