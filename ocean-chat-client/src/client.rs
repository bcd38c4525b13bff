//! HTTP client for the chat endpoints

use crate::error::{ClientError, ClientResult};
use crate::url::{build_url, resolve_base_url};
use async_trait::async_trait;
use ocean_chat_core::config::ApiConfig;
use ocean_chat_core::ChatBackend;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const HISTORY_PATH: &str = "/api/chat/history";
pub const SEND_PATH: &str = "/api/chat/send";

/// Thin JSON client for the chat backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    proxy_target: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let base_url = resolve_base_url(&config.base_url);
        let proxy_target = resolve_base_url(&config.proxy_target);
        if base_url.is_empty() || base_url.starts_with('/') {
            info!("Proxying /api -> {}", proxy_target);
        }

        Ok(Self {
            client,
            base_url,
            proxy_target,
        })
    }

    /// Normalized base URL (empty for same-origin)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn proxy_target(&self) -> &str {
        &self.proxy_target
    }

    /// Absolute URL a request for `path` goes to.
    ///
    /// Same-origin (relative) URLs are sent to the proxy target.
    pub fn resolve(&self, path: &str) -> String {
        let url = build_url(&self.base_url, path);
        if url.starts_with('/') {
            format!("{}{}", self.proxy_target, url)
        } else {
            url
        }
    }

    /// Issue a JSON request and normalize the response.
    ///
    /// Bodies are parsed as JSON only when the response says so; other
    /// bodies come back as a JSON string of the raw text.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> ClientResult<Value> {
        let target = self.resolve(path);
        debug!("{} {}", method, target);

        let mut builder = self
            .client
            .request(method, &target)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));
        let text = response.text().await?;

        let data = if is_json {
            match serde_json::from_str::<Value>(&text) {
                Ok(value) => value,
                Err(source) if status.is_success() => {
                    return Err(ClientError::Decode {
                        url: target,
                        source,
                    });
                }
                Err(_) => Value::Object(Map::new()),
            }
        } else {
            Value::String(text)
        };

        if !status.is_success() {
            warn!("{} returned {}", target, status);
            return Err(ClientError::from_status(status.as_u16(), data, target));
        }

        Ok(data)
    }

    /// Fetch chat history from the backend
    pub async fn get_chat_history(&self) -> ClientResult<Value> {
        self.request(Method::GET, HISTORY_PATH, None).await
    }

    /// Send a message to the backend and return its raw response
    pub async fn send_chat_message(&self, message: &str) -> ClientResult<Value> {
        let body = serde_json::json!({ "message": message });
        self.request(Method::POST, SEND_PATH, Some(&body)).await
    }
}

#[async_trait]
impl ChatBackend for ApiClient {
    async fn fetch_history(&self) -> ocean_chat_core::Result<Value> {
        Ok(self.get_chat_history().await?)
    }

    async fn send_message(&self, text: &str) -> ocean_chat_core::Result<Value> {
        Ok(self.send_chat_message(text).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> ApiClient {
        ApiClient::new(&ApiConfig {
            base_url: base_url.to_string(),
            ..ApiConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_same_origin_goes_to_proxy_target() {
        let api = client("");
        assert_eq!(api.base_url(), "");
        assert_eq!(api.resolve(SEND_PATH), "http://localhost:8000/api/chat/send");
    }

    #[test]
    fn test_relative_base_is_proxied_too() {
        let api = client("/backend/");
        assert_eq!(
            api.resolve(HISTORY_PATH),
            "http://localhost:8000/backend/api/chat/history"
        );
    }

    #[test]
    fn test_explicit_base_url() {
        let api = client("https://chat.example.com/");
        assert_eq!(api.base_url(), "https://chat.example.com");
        assert_eq!(
            api.resolve(HISTORY_PATH),
            "https://chat.example.com/api/chat/history"
        );
        assert_eq!(
            api.resolve("https://elsewhere.example.com/ping"),
            "https://elsewhere.example.com/ping"
        );
    }
}
