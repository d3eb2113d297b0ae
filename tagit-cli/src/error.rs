//! CLI error types.

use std::fmt;

use tagit::config::ConfigError;
use tagit::logging::LoggingError;
use tagit::quiz::QuizError;
use tagit::ScanError;

/// Errors surfaced by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be read, written or edited.
    Config(String),

    /// Logging could not be initialized.
    Logging(LoggingError),

    /// Failed to create the Tokio runtime.
    Runtime(String),

    /// A scan operation failed.
    Scan(ScanError),

    /// A quiz answer was rejected.
    Quiz(QuizError),

    /// No built-in level has this id.
    UnknownLevel(String),

    /// The level has no template for this content key.
    UnknownContent { level: String, key: String },

    /// A command-line argument could not be parsed.
    InvalidArgument(String),

    /// An interactive prompt failed.
    Prompt(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Logging(e) => write!(f, "Failed to initialize logging: {}", e),
            CliError::Runtime(msg) => write!(f, "Failed to create Tokio runtime: {}", msg),
            CliError::Scan(e) => write!(f, "{}", e),
            CliError::Quiz(e) => write!(f, "Quiz error: {}", e),
            CliError::UnknownLevel(id) => write!(
                f,
                "Unknown level '{}'. Use 'tagit levels' to see available levels.",
                id
            ),
            CliError::UnknownContent { level, key } => write!(
                f,
                "Level {} has no content for '{}'. Use 'tagit render {}' to list keys.",
                level, key, level
            ),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::Prompt(msg) => write!(f, "Prompt failed: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Logging(e) => Some(e),
            CliError::Scan(e) => Some(e),
            CliError::Quiz(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<ScanError> for CliError {
    fn from(e: ScanError) -> Self {
        CliError::Scan(e)
    }
}

impl From<QuizError> for CliError {
    fn from(e: QuizError) -> Self {
        CliError::Quiz(e)
    }
}

impl From<dialoguer::Error> for CliError {
    fn from(e: dialoguer::Error) -> Self {
        CliError::Prompt(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = CliError::UnknownLevel("L9".to_string());
        assert!(err.to_string().contains("'L9'"));

        let err = CliError::from(ScanError::StreamNotBound);
        assert_eq!(err.to_string(), ScanError::StreamNotBound.to_string());
    }

    #[test]
    fn test_source() {
        use std::error::Error;
        assert!(CliError::from(ScanError::NotReady).source().is_some());
        assert!(CliError::Runtime("x".to_string()).source().is_none());
    }
}
