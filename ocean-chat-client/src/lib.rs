//! REST client for the ocean-chat backend
//!
//! Two endpoints are spoken: `GET /api/chat/history` and
//! `POST /api/chat/send`. Everything goes through [`ApiClient::request`],
//! which normalizes failures into [`ClientError`].

pub mod client;
pub mod error;
pub mod url;

pub use client::{ApiClient, HISTORY_PATH, SEND_PATH};
pub use error::{ClientError, ClientResult};
pub use url::{build_url, resolve_base_url};
