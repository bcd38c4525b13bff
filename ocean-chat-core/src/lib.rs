//! Core types and state handling for ocean-chat
//!
//! This crate owns the conversation model, the session store, the
//! message exchange protocol and the backend trait that the REST client
//! implements, plus the shared config, error and logging plumbing.

pub mod backend;
pub mod config;
pub mod error;
pub mod exchange;
pub mod logging;
pub mod session;
pub mod utils;

pub use backend::ChatBackend;
pub use error::{Error, Result};
pub use session::{Conversation, Message, Role, SessionStore};
