//! Backend trait for the chat REST service

use async_trait::async_trait;
use serde_json::Value;

/// The two remote operations the chat UI depends on.
///
/// Payloads are handed back as raw JSON; the session layer decides how
/// to read them (history is decoded into conversations, send replies go
/// through an ordered field lookup).
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// `GET /api/chat/history`
    async fn fetch_history(&self) -> crate::Result<Value>;

    /// `POST /api/chat/send` with `{"message": text}`
    async fn send_message(&self, text: &str) -> crate::Result<Value>;
}
