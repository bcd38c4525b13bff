//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root configuration for ocean-chat
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Backend API configuration
    #[serde(default)]
    pub api: ApiConfig,
    /// Terminal UI configuration
    #[serde(default)]
    pub ui: UiConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL prepended to API paths. Empty means same-origin: requests
    /// go to `proxy_target`.
    #[serde(default)]
    pub base_url: String,
    /// Development backend that same-origin `/api` requests are sent to
    #[serde(default = "default_proxy_target")]
    pub proxy_target: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_proxy_target() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            proxy_target: default_proxy_target(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Terminal UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Name shown in the chat header
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,
    /// Line shown under the assistant name
    #[serde(default = "default_subtitle")]
    pub subtitle: String,
}

fn default_assistant_name() -> String {
    "Assistant".to_string()
}

fn default_subtitle() -> String {
    "Ocean Professional • RAG + MCP".to_string()
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            assistant_name: default_assistant_name(),
            subtitle: default_subtitle(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Directory for log files
    #[serde(default = "default_log_dir")]
    pub dir: String,
    /// Also log to stdout (the TUI always turns this off)
    #[serde(default)]
    pub stdout: bool,
    /// Module-specific overrides
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_dir() -> String {
    "~/.ocean-chat/logs".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            dir: default_log_dir(),
            stdout: false,
            overrides: HashMap::new(),
        }
    }
}
