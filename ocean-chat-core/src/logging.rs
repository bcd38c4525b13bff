//! Logging setup shared by every ocean-chat entry point

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

use crate::config::schema::LoggingConfig;
use crate::utils::{ensure_dir, expand_tilde};

/// Prefix of the daily log files (`ocean-chat.log.YYYY-MM-DD`)
pub const LOG_FILE_PREFIX: &str = "ocean-chat.log";

const LOG_RETENTION_DAYS: u64 = 7;

/// Initialize the logging system.
///
/// Logs always go to a daily rolling file. Stdout only gets a copy when
/// `config.stdout` is set, since the terminal UI owns the screen.
pub fn init_logging(config: &LoggingConfig) -> WorkerGuard {
    let filter = build_filter(config);

    let format_str = std::env::var("LOG_FORMAT").unwrap_or_else(|_| config.format.clone());
    let is_json = format_str.eq_ignore_ascii_case("json");

    let log_dir = ensure_dir(expand_tilde(&config.dir));
    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = if is_json {
        fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    let stdout_layer = match (config.stdout, is_json) {
        (false, _) => None,
        (true, true) => Some(fmt::layer().json().with_target(true).boxed()),
        (true, false) => Some(fmt::layer().with_target(true).boxed()),
    };

    Registry::default()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    if let Err(e) = cleanup_old_logs(&log_dir, LOG_RETENTION_DAYS) {
        eprintln!("Failed to clean up old logs: {}", e);
    }

    guard
}

/// `RUST_LOG` wins over the configured level; module overrides are added on top
fn build_filter(config: &LoggingConfig) -> EnvFilter {
    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    for (module, level) in &config.overrides {
        match format!("{}={}", module, level).parse() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(_) => eprintln!("Invalid log directive: {}={}", module, level),
        }
    }
    filter
}

/// Remove log files older than `days` days
fn cleanup_old_logs(dir: &Path, days: u64) -> std::io::Result<()> {
    if !dir.exists() {
        return Ok(());
    }

    let now = std::time::SystemTime::now();
    let threshold = std::time::Duration::from_secs(days * 24 * 3600);

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let is_log = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX));
        if !is_log {
            continue;
        }

        let age = entry
            .metadata()
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| now.duration_since(modified).ok());
        if matches!(age, Some(age) if age > threshold) {
            if let Err(e) = std::fs::remove_file(&path) {
                eprintln!("Failed to remove old log file {:?}: {}", path, e);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cleanup_keeps_fresh_and_foreign_files() {
        let temp_dir = TempDir::new().unwrap();
        let fresh = temp_dir.path().join("ocean-chat.log.2026-10-19");
        let foreign = temp_dir.path().join("notes.txt");
        std::fs::write(&fresh, "log").unwrap();
        std::fs::write(&foreign, "notes").unwrap();

        cleanup_old_logs(temp_dir.path(), 7).unwrap();

        assert!(fresh.exists());
        assert!(foreign.exists());
    }

    #[test]
    fn test_cleanup_of_missing_dir_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        assert!(cleanup_old_logs(&temp_dir.path().join("missing"), 7).is_ok());
    }
}
