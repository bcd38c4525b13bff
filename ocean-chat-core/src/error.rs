//! Error types for ocean-chat

use thiserror::Error;

/// The main error type for ocean-chat operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The request never produced a response (connection, timeout, TLS)
    #[error("{0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    ///
    /// Displays as the bare message so it can be shown to the user as-is.
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        url: String,
        data: serde_json::Value,
    },

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for ocean-chat operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
