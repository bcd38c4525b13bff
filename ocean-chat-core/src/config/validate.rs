//! Configuration validation rules.

use super::schema::Config;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

fn is_http_url(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Validate configuration and return aggregated validation errors.
pub fn validate_config(config: &Config) -> crate::Result<()> {
    let mut errors = Vec::new();

    let base_url = config.api.base_url.trim();
    if !base_url.is_empty() && !is_http_url(base_url) && !base_url.starts_with('/') {
        errors.push("api.base_url must be empty, an http(s) URL or an absolute path".to_string());
    }
    if !is_http_url(config.api.proxy_target.trim()) {
        errors.push("api.proxy_target must be an http(s) URL".to_string());
    }
    if config.api.timeout_secs == 0 {
        errors.push("api.timeout_secs must be > 0".to_string());
    }

    if !LOG_LEVELS.contains(&config.logging.level.to_ascii_lowercase().as_str()) {
        errors.push(format!(
            "logging.level must be one of {}",
            LOG_LEVELS.join(", ")
        ));
    }
    let format = config.logging.format.to_ascii_lowercase();
    if format != "text" && format != "json" {
        errors.push("logging.format must be text or json".to_string());
    }
    if config.logging.dir.trim().is_empty() {
        errors.push("logging.dir must not be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(crate::Error::Validation(errors.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_base_url_forms() {
        let mut config = Config::default();
        for ok in ["", "http://api.example.com", "HTTPS://api.example.com/", "/backend"] {
            config.api.base_url = ok.to_string();
            assert!(validate_config(&config).is_ok(), "{ok} should be accepted");
        }

        config.api.base_url = "api.example.com".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("api.base_url"));
    }

    #[test]
    fn test_errors_are_aggregated() {
        let mut config = Config::default();
        config.api.proxy_target = "localhost:8000".to_string();
        config.api.timeout_secs = 0;
        config.logging.level = "loud".to_string();

        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.contains("api.proxy_target"));
        assert!(message.contains("api.timeout_secs"));
        assert!(message.contains("logging.level"));
    }
}
