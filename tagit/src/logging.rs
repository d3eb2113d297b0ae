//! Logging setup.
//!
//! Installs a global `tracing` subscriber: a stderr layer with local
//! timestamps, plus an optional non-blocking file layer. The filter comes
//! from `RUST_LOG` when set, otherwise from the `[logging] level` setting.

use std::path::Path;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingSettings;

/// Errors installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter '{filter}': {reason}")]
    Filter { filter: String, reason: String },

    #[error("invalid log file path {0}")]
    InvalidPath(String),

    #[error("failed to create log directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("logging already initialized: {0}")]
    Init(String),
}

/// Keeps the file writer flushing. Drop it only at exit.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Build the filter: `RUST_LOG` wins, then `level_override`, then the
/// configured level.
pub fn build_filter(
    settings: &LoggingSettings,
    level_override: Option<&str>,
) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let directive = level_override.unwrap_or(&settings.level);
    EnvFilter::try_new(directive).map_err(|e| LoggingError::Filter {
        filter: directive.to_string(),
        reason: e.to_string(),
    })
}

/// Install the global subscriber.
pub fn init_logging(
    settings: &LoggingSettings,
    level_override: Option<&str>,
) -> Result<LoggingGuard, LoggingError> {
    let filter = build_filter(settings, level_override)?;

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(LocalTime::rfc_3339())
        .with_target(false);

    let (file_layer, guard) = match &settings.file {
        Some(path) => {
            let (writer, guard) = file_writer(path)?;
            let layer = fmt::layer()
                .with_writer(writer)
                .with_timer(LocalTime::rfc_3339())
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    Ok(LoggingGuard { _file: guard })
}

fn file_writer(
    path: &Path,
) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard), LoggingError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| LoggingError::InvalidPath(path.display().to_string()))?;
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_from_settings() {
        // RUST_LOG may be set in the test environment; only assert when it
        // is not.
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let settings = LoggingSettings::default();
        assert!(build_filter(&settings, None).is_ok());
        assert!(build_filter(&settings, Some("tagit=debug")).is_ok());

        let bad = LoggingSettings {
            level: "tagit=loud".to_string(),
            file: None,
        };
        assert!(matches!(
            build_filter(&bad, None),
            Err(LoggingError::Filter { .. })
        ));
    }

    #[test]
    fn test_file_writer_creates_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("logs").join("tagit.log");
        let (_writer, _guard) = file_writer(&path).unwrap();
        assert!(dir.path().join("logs").is_dir());
    }
}
