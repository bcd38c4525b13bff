//! Error type for backend requests

use serde_json::Value;
use thiserror::Error;

/// Why a backend request failed
#[derive(Error, Debug)]
pub enum ClientError {
    /// No response was received
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A success response claimed JSON but did not parse
    #[error("Invalid JSON response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Non-2xx status
    #[error("{message}")]
    Status {
        status: u16,
        /// Parsed JSON body, or the raw text as a JSON string
        data: Value,
        url: String,
        message: String,
    },
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Build a status failure, picking the message the same way the UI
    /// shows it: the body's `message` field, else the raw text body, else a
    /// generic status line.
    pub fn from_status(status: u16, data: Value, url: impl Into<String>) -> Self {
        let url = url.into();
        let message = data
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .or_else(|| data.as_str().filter(|text| !text.is_empty()))
            .map(ToString::to_string)
            .unwrap_or_else(|| format!("Request failed with status {} at {}", status, url));

        ClientError::Status {
            status,
            data,
            url,
            message,
        }
    }
}

impl From<ClientError> for ocean_chat_core::Error {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Transport(e) => ocean_chat_core::Error::Transport(e.to_string()),
            ClientError::Decode { .. } => ocean_chat_core::Error::Serialization(e.to_string()),
            ClientError::Status {
                status,
                data,
                url,
                message,
            } => ocean_chat_core::Error::Api {
                status,
                message,
                url,
                data,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const URL: &str = "http://localhost:8000/api/chat/send";

    #[test]
    fn test_message_from_json_body() {
        let err = ClientError::from_status(500, json!({ "message": "boom" }), URL);
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_message_from_text_body() {
        let err = ClientError::from_status(502, json!("Bad Gateway"), URL);
        assert_eq!(err.to_string(), "Bad Gateway");
    }

    #[test]
    fn test_generated_message() {
        let err = ClientError::from_status(404, json!({ "detail": "nope" }), URL);
        assert_eq!(
            err.to_string(),
            "Request failed with status 404 at http://localhost:8000/api/chat/send"
        );

        let err = ClientError::from_status(500, json!(""), URL);
        assert!(err.to_string().starts_with("Request failed with status 500"));
    }

    #[test]
    fn test_converts_into_core_api_error() {
        let err: ocean_chat_core::Error =
            ClientError::from_status(500, json!({ "message": "boom" }), URL).into();
        match err {
            ocean_chat_core::Error::Api {
                status, message, url, data,
            } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
                assert_eq!(url, URL);
                assert_eq!(data["message"], "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
