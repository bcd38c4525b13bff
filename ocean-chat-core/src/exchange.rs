//! Message exchange protocol
//!
//! A send runs in three steps:
//!
//! 1. [`SessionStore::begin_send`] appends the user message optimistically
//!    and marks the store busy.
//! 2. The caller issues exactly one [`ChatBackend::send_message`] call and
//!    turns its outcome into a [`Resolution`] with [`PendingSend::resolve`].
//! 3. [`SessionStore::apply`] reconciles the resolution against the
//!    conversation captured in step 1 and clears the busy flag.
//!
//! [`send`] runs all three for callers that can hold the store across the
//! await. The terminal UI runs step 2 on a task instead.

use crate::backend::ChatBackend;
use crate::session::{Message, SessionStore};
use crate::Result;
use serde_json::Value;
use tracing::{debug, warn};

/// Reply used when the backend answers without any known reply field
pub const FALLBACK_REPLY: &str = "I'm here to help!";

/// Response fields that may carry the reply, highest priority first
pub const REPLY_FIELDS: [&str; 3] = ["reply", "response", "message"];

const SEND_FAILED: &str = "Failed to send message";

/// Pick the reply text out of a send response.
///
/// The first of [`REPLY_FIELDS`] holding a non-empty string wins; any other
/// shape (missing fields, non-object payloads) yields [`FALLBACK_REPLY`].
pub fn extract_reply(payload: &Value) -> String {
    REPLY_FIELDS
        .iter()
        .filter_map(|field| payload.get(field).and_then(Value::as_str))
        .find(|text| !text.is_empty())
        .unwrap_or(FALLBACK_REPLY)
        .to_string()
}

/// A send whose optimistic half has been applied
#[derive(Debug, Clone)]
pub struct PendingSend {
    conversation_id: String,
    user_message: Message,
}

impl PendingSend {
    /// Conversation the send was issued from
    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Text to hand to the backend
    pub fn text(&self) -> &str {
        &self.user_message.content
    }

    /// Turn the backend outcome into something [`SessionStore::apply`] can merge
    pub fn resolve(&self, outcome: Result<Value>) -> Resolution {
        match outcome {
            Ok(payload) => Resolution::Reply(Message::assistant(extract_reply(&payload))),
            Err(e) => {
                let message = e.to_string();
                if message.is_empty() {
                    Resolution::Failed(SEND_FAILED.to_string())
                } else {
                    Resolution::Failed(message)
                }
            }
        }
    }
}

/// Outcome of a send, ready to be merged into the store
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The assistant answered
    Reply(Message),
    /// The call failed; carries the user-facing error text
    Failed(String),
}

impl SessionStore {
    /// Apply the optimistic half of a send.
    ///
    /// Returns `None` without touching anything when no conversation is
    /// active or another send is still outstanding. `text` is expected to
    /// be trimmed and non-empty already.
    pub fn begin_send(&mut self, text: &str) -> Option<PendingSend> {
        if self.is_loading() {
            debug!("Ignoring send while another one is in flight");
            return None;
        }
        let conversation_id = self.active_id()?.to_string();
        let user_message = Message::user(text);

        let conversation = self.get_mut(&conversation_id)?;
        conversation.push_optimistic(&user_message);

        self.set_loading(true);
        self.set_error(None);
        debug!(
            "Appended user message {} to {}",
            user_message.id, conversation_id
        );

        Some(PendingSend {
            conversation_id,
            user_message,
        })
    }

    /// Reconcile a resolved send and clear the busy flag.
    ///
    /// Works on the conversation captured by `pending`, whatever is active
    /// now. A failure leaves the optimistic user message in place.
    pub fn apply(&mut self, pending: &PendingSend, resolution: &Resolution) {
        match resolution {
            Resolution::Reply(reply) => match self.get_mut(&pending.conversation_id) {
                Some(conversation) => {
                    conversation.merge_exchange(&pending.user_message, reply);
                }
                None => warn!(
                    "Conversation {} disappeared before its reply arrived",
                    pending.conversation_id
                ),
            },
            Resolution::Failed(message) => {
                self.set_error(Some(message.clone()));
            }
        }
        self.set_loading(false);
    }
}

/// Run a complete send against `backend`.
///
/// Returns `None` when the send was not started (see
/// [`SessionStore::begin_send`]).
pub async fn send(
    store: &mut SessionStore,
    backend: &dyn ChatBackend,
    text: &str,
) -> Option<Resolution> {
    let pending = store.begin_send(text)?;
    let outcome = backend.send_message(pending.text()).await;
    if let Err(e) = &outcome {
        warn!("Send to conversation {} failed: {}", pending.conversation_id(), e);
    }
    let resolution = pending.resolve(outcome);
    store.apply(&pending, &resolution);
    Some(resolution)
}
