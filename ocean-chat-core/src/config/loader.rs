//! Configuration loading and management

use super::schema::Config;
use super::validate::validate_config;
use crate::Error;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Env var that overrides `api.base_url` directly
pub const BASE_URL_ENV: &str = "OCEAN_CHAT_API_BASE_URL";

const PATH_OVERRIDE_PREFIX: &str = "OCEAN_CHAT__";

/// Configuration loader
pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    /// Create a new config loader with the default config directory
    pub fn new() -> Self {
        let config_dir = dirs::home_dir()
            .map(|h| h.join(".ocean-chat"))
            .unwrap_or_else(|| PathBuf::from(".ocean-chat"));

        Self { config_dir }
    }

    /// Create a new config loader with a custom config directory
    pub fn with_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            config_dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Load configuration from file and environment
    pub fn load(&self) -> crate::Result<Config> {
        let mut merged = serde_json::to_value(Config::default())?;
        if let Some(file_value) = self.read_file()? {
            overlay(&mut merged, file_value);
        }
        for (path, value) in env_overrides(std::env::vars()) {
            assign(&mut merged, &path, value);
        }

        let config: Config = serde_json::from_value(merged)
            .map_err(|e| Error::Config(format!("invalid settings: {}", e)))?;
        validate_config(&config)?;
        Ok(config)
    }

    fn read_file(&self) -> crate::Result<Option<Value>> {
        let path = self.config_path();
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)?;
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to file
    pub fn save(&self, config: &Config) -> crate::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        let content = serde_json::to_string_pretty(config)?;
        std::fs::write(self.config_path(), content)?;
        Ok(())
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Path of the JSON config file
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.json")
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Deep-merge `top` into `base`; objects merge key by key, anything else replaces
fn overlay(base: &mut Value, top: Value) {
    let Value::Object(top_map) = top else {
        *base = top;
        return;
    };
    match base {
        Value::Object(base_map) => {
            for (key, value) in top_map {
                match base_map.get_mut(&key) {
                    Some(slot) => overlay(slot, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        other => *other = Value::Object(top_map),
    }
}

/// Write `value` at `path`, turning non-objects on the way into objects
fn assign(root: &mut Value, path: &[String], value: Value) {
    let Some((head, rest)) = path.split_first() else {
        *root = value;
        return;
    };
    if !root.is_object() {
        *root = Value::Object(Map::new());
    }
    if let Value::Object(map) = root {
        let slot = map.entry(head.clone()).or_insert(Value::Null);
        assign(slot, rest, value);
    }
}

/// Env values are JSON when they parse as JSON, plain strings otherwise
fn env_scalar(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| match raw.to_ascii_lowercase().as_str() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    })
}

/// Config paths set from the environment, in the order they apply.
///
/// The base URL alias comes first so an `OCEAN_CHAT__API__BASE_URL`
/// path override wins over it.
fn env_overrides<I>(vars: I) -> Vec<(Vec<String>, Value)>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut aliased = Vec::new();
    let mut by_path = Vec::new();
    for (key, raw) in vars {
        if key == BASE_URL_ENV {
            aliased.push((
                vec!["api".to_string(), "base_url".to_string()],
                Value::String(raw),
            ));
        } else if let Some(suffix) = key.strip_prefix(PATH_OVERRIDE_PREFIX) {
            let path: Vec<String> = suffix
                .split("__")
                .filter(|s| !s.is_empty())
                .map(str::to_ascii_lowercase)
                .collect();
            if !path.is_empty() {
                by_path.push((path, env_scalar(&raw)));
            }
        }
    }
    aliased.extend(by_path);
    aliased
}
