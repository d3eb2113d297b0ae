//! Addressable configuration keys.

use std::path::PathBuf;
use std::str::FromStr;

use super::file::{ConfigError, ConfigFile, Theme};

/// A setting addressed as `section.key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ScanResetDelayMs,
    ScanVerifyDelayMs,
    ScanVerifyTimeoutMs,
    ScanRetryPauseMs,
    QuizLockMs,
    AssetsBaseUrl,
    AssetsTimeoutSecs,
    UiTheme,
    LoggingLevel,
    LoggingFile,
}

const ALL_KEYS: [ConfigKey; 10] = [
    ConfigKey::ScanResetDelayMs,
    ConfigKey::ScanVerifyDelayMs,
    ConfigKey::ScanVerifyTimeoutMs,
    ConfigKey::ScanRetryPauseMs,
    ConfigKey::QuizLockMs,
    ConfigKey::AssetsBaseUrl,
    ConfigKey::AssetsTimeoutSecs,
    ConfigKey::UiTheme,
    ConfigKey::LoggingLevel,
    ConfigKey::LoggingFile,
];

impl ConfigKey {
    /// Every key, grouped by section in file order.
    pub fn all() -> &'static [ConfigKey] {
        &ALL_KEYS
    }

    /// INI section name.
    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::ScanResetDelayMs
            | ConfigKey::ScanVerifyDelayMs
            | ConfigKey::ScanVerifyTimeoutMs
            | ConfigKey::ScanRetryPauseMs => "scan",
            ConfigKey::QuizLockMs => "quiz",
            ConfigKey::AssetsBaseUrl | ConfigKey::AssetsTimeoutSecs => "assets",
            ConfigKey::UiTheme => "ui",
            ConfigKey::LoggingLevel | ConfigKey::LoggingFile => "logging",
        }
    }

    /// Key name within the section.
    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::ScanResetDelayMs => "reset_delay_ms",
            ConfigKey::ScanVerifyDelayMs => "verify_delay_ms",
            ConfigKey::ScanVerifyTimeoutMs => "verify_timeout_ms",
            ConfigKey::ScanRetryPauseMs => "retry_pause_ms",
            ConfigKey::QuizLockMs => "lock_ms",
            ConfigKey::AssetsBaseUrl => "base_url",
            ConfigKey::AssetsTimeoutSecs => "timeout_secs",
            ConfigKey::UiTheme => "theme",
            ConfigKey::LoggingLevel => "level",
            ConfigKey::LoggingFile => "file",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as a string; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::ScanResetDelayMs => config.scan.reset_delay_ms.to_string(),
            ConfigKey::ScanVerifyDelayMs => config.scan.verify_delay_ms.to_string(),
            ConfigKey::ScanVerifyTimeoutMs => config.scan.verify_timeout_ms.to_string(),
            ConfigKey::ScanRetryPauseMs => config.scan.retry_pause_ms.to_string(),
            ConfigKey::QuizLockMs => config.quiz.lock_ms.to_string(),
            ConfigKey::AssetsBaseUrl => config.assets.base_url.clone(),
            ConfigKey::AssetsTimeoutSecs => config.assets.timeout_secs.to_string(),
            ConfigKey::UiTheme => config.ui.theme.to_string(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
            ConfigKey::LoggingFile => config
                .logging
                .file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        }
    }

    /// Validate and store `value`.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match self {
            ConfigKey::ScanResetDelayMs => config.scan.reset_delay_ms = self.millis(value)?,
            ConfigKey::ScanVerifyDelayMs => config.scan.verify_delay_ms = self.millis(value)?,
            ConfigKey::ScanVerifyTimeoutMs => {
                config.scan.verify_timeout_ms = self.positive(value)?
            }
            ConfigKey::ScanRetryPauseMs => config.scan.retry_pause_ms = self.millis(value)?,
            ConfigKey::QuizLockMs => config.quiz.lock_ms = self.millis(value)?,
            ConfigKey::AssetsBaseUrl => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(self.invalid(value, "must start with http:// or https://"));
                }
                config.assets.base_url = value.to_string();
            }
            ConfigKey::AssetsTimeoutSecs => config.assets.timeout_secs = self.positive(value)?,
            ConfigKey::UiTheme => {
                config.ui.theme = value
                    .parse::<Theme>()
                    .map_err(|reason| self.invalid(value, &reason))?;
            }
            ConfigKey::LoggingLevel => {
                tracing_subscriber::EnvFilter::try_new(value)
                    .map_err(|e| self.invalid(value, &e.to_string()))?;
                config.logging.level = value.to_string();
            }
            ConfigKey::LoggingFile => {
                config.logging.file = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
        }
        Ok(())
    }

    fn millis(&self, value: &str) -> Result<u64, ConfigError> {
        value
            .parse::<u64>()
            .map_err(|_| self.invalid(value, "expected a whole number of milliseconds"))
    }

    fn positive(&self, value: &str) -> Result<u64, ConfigError> {
        match value.parse::<u64>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(self.invalid(value, "expected a positive whole number")),
        }
    }

    fn invalid(&self, value: &str, reason: &str) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_names() {
        for key in ConfigKey::all() {
            assert_eq!(key.name().parse::<ConfigKey>().unwrap(), *key);
        }
        assert_eq!("UI.Theme".parse::<ConfigKey>().unwrap(), ConfigKey::UiTheme);
        assert!(matches!(
            "ui.colour".parse::<ConfigKey>(),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_get_set() {
        let mut config = ConfigFile::default();
        ConfigKey::UiTheme.set(&mut config, "dark").unwrap();
        assert_eq!(ConfigKey::UiTheme.get(&config), "dark");

        ConfigKey::AssetsBaseUrl
            .set(&mut config, "https://cards.example.org/targets")
            .unwrap();
        assert_eq!(config.assets.base_url, "https://cards.example.org/targets");
    }

    #[test]
    fn test_validation() {
        let mut config = ConfigFile::default();
        assert!(ConfigKey::AssetsBaseUrl.set(&mut config, "ftp://x").is_err());
        assert!(ConfigKey::AssetsTimeoutSecs.set(&mut config, "0").is_err());
        assert!(ConfigKey::ScanResetDelayMs.set(&mut config, "-5").is_err());
        assert!(ConfigKey::UiTheme.set(&mut config, "neon").is_err());
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_logging_file_unset() {
        let mut config = ConfigFile::default();
        ConfigKey::LoggingFile.set(&mut config, "/var/log/tagit.log").unwrap();
        assert_eq!(ConfigKey::LoggingFile.get(&config), "/var/log/tagit.log");
        ConfigKey::LoggingFile.set(&mut config, "").unwrap();
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_sections_are_grouped() {
        let sections: Vec<_> = ConfigKey::all().iter().map(|k| k.section()).collect();
        let mut deduped = sections.clone();
        deduped.dedup();
        assert_eq!(deduped, vec!["scan", "quiz", "assets", "ui", "logging"]);
    }
}
