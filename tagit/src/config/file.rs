//! The configuration file and its typed sections.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::Ini;
use thiserror::Error;
use tracing::debug;

use super::keys::ConfigKey;
use crate::camera::DEFAULT_ASSET_TIMEOUT_SECS;
use crate::quiz::DEFAULT_QUIZ_LOCK;
use crate::session::{
    ScanTimings, DEFAULT_RESET_DELAY, DEFAULT_RETRY_PAUSE, DEFAULT_VERIFY_DELAY,
    DEFAULT_VERIFY_TIMEOUT,
};

/// Where level assets are served from unless configured.
pub const DEFAULT_ASSET_BASE_URL: &str = "http://localhost:8000/targets";

/// Default log filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";

const CONFIG_DIR_NAME: &str = "tagit";
const CONFIG_FILE_NAME: &str = "config.ini";

/// Errors reading, writing or editing the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),

    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Colour theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => f.write_str("light"),
            Theme::Dark => f.write_str("dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("expected 'dark' or 'light', got '{}'", other)),
        }
    }
}

/// `[scan]` timing settings, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSettings {
    pub reset_delay_ms: u64,
    pub verify_delay_ms: u64,
    pub verify_timeout_ms: u64,
    pub retry_pause_ms: u64,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            reset_delay_ms: DEFAULT_RESET_DELAY.as_millis() as u64,
            verify_delay_ms: DEFAULT_VERIFY_DELAY.as_millis() as u64,
            verify_timeout_ms: DEFAULT_VERIFY_TIMEOUT.as_millis() as u64,
            retry_pause_ms: DEFAULT_RETRY_PAUSE.as_millis() as u64,
        }
    }
}

impl ScanSettings {
    /// Controller timings for these settings.
    pub fn timings(&self) -> ScanTimings {
        ScanTimings::default()
            .with_reset_delay(Duration::from_millis(self.reset_delay_ms))
            .with_verification(
                Duration::from_millis(self.verify_delay_ms),
                Duration::from_millis(self.verify_timeout_ms),
            )
            .with_retry_pause(Duration::from_millis(self.retry_pause_ms))
    }
}

/// `[quiz]` settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSettings {
    pub lock_ms: u64,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            lock_ms: DEFAULT_QUIZ_LOCK.as_millis() as u64,
        }
    }
}

impl QuizSettings {
    pub fn lock(&self) -> Duration {
        Duration::from_millis(self.lock_ms)
    }
}

/// `[assets]` settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSettings {
    /// Base URL level asset paths are resolved against.
    pub base_url: String,
    /// Reachability probe timeout.
    pub timeout_secs: u64,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ASSET_BASE_URL.to_string(),
            timeout_secs: DEFAULT_ASSET_TIMEOUT_SECS,
        }
    }
}

/// `[ui]` settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiSettings {
    pub theme: Theme,
}

/// `[logging]` settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Filter directive, e.g. `info` or `tagit=debug`.
    pub level: String,
    /// Log file; stderr only when unset.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

/// The whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub scan: ScanSettings,
    pub quiz: QuizSettings,
    pub assets: AssetSettings,
    pub ui: UiSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Load from the default location. A missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    /// Load from the default location, dropping values that fail validation.
    pub fn load_lenient() -> Result<(Self, Vec<ConfigError>), ConfigError> {
        Self::load_lenient_from(&config_file_path())
    }

    /// Load from `path`, dropping values that fail validation.
    ///
    /// Rejected values fall back to their defaults and are returned next to
    /// the config. An unreadable file is still an error.
    pub fn load_lenient_from(path: &Path) -> Result<(Self, Vec<ConfigError>), ConfigError> {
        if !path.exists() {
            return Ok((Self::default(), Vec::new()));
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self::from_ini_lenient(&ini))
    }

    /// Parse from INI text.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Read {
            path: PathBuf::from("<string>"),
            message: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for key in ConfigKey::all() {
            if let Some(value) = Self::raw_value(ini, key) {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    fn from_ini_lenient(ini: &Ini) -> (Self, Vec<ConfigError>) {
        let mut config = Self::default();
        let mut rejected = Vec::new();
        for key in ConfigKey::all() {
            if let Some(value) = Self::raw_value(ini, key) {
                if let Err(e) = key.set(&mut config, value) {
                    debug!(key = %key.name(), error = %e, "Dropping invalid config value");
                    rejected.push(e);
                }
            }
        }
        (config, rejected)
    }

    fn raw_value<'a>(ini: &'a Ini, key: &ConfigKey) -> Option<&'a str> {
        ini.section(Some(key.section()))
            .and_then(|props| props.get(key.key_name()))
    }

    /// Save to `path`, creating parent directories if needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        self.to_ini().write_to_file(path).map_err(write_err)?;

        debug!(path = %path.display(), "Config saved");
        Ok(())
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            let value = key.get(self);
            if !value.is_empty() {
                ini.with_section(Some(key.section()))
                    .set(key.key_name(), value);
            }
        }
        ini
    }
}

/// Directory holding `config.ini`.
pub fn config_directory() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Full path of `config.ini`.
pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&dir.path().join("config.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.ui.theme = Theme::Dark;
        config.scan.reset_delay_ms = 1500;
        config.logging.file = Some(PathBuf::from("/tmp/tagit.log"));
        config.save_to(&path).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.scan.timings().reset_delay, Duration::from_millis(1500));
    }

    #[test]
    fn test_parse_partial_file() {
        let config = ConfigFile::from_ini_str("[ui]\ntheme = dark\n\n[quiz]\nlock_ms = 500\n").unwrap();
        assert_eq!(config.ui.theme, Theme::Dark);
        assert_eq!(config.quiz.lock(), Duration::from_millis(500));
        assert_eq!(config.assets, AssetSettings::default());
    }

    #[test]
    fn test_invalid_value_is_rejected() {
        let err = ConfigFile::from_ini_str("[scan]\nreset_delay_ms = soon\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "scan.reset_delay_ms"));
    }

    #[test]
    fn test_lenient_load_drops_invalid_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[scan]\nreset_delay_ms = soon\n\n[ui]\ntheme = dark\n").unwrap();

        assert!(ConfigFile::load_from(&path).is_err());

        let (config, rejected) = ConfigFile::load_lenient_from(&path).unwrap();
        assert_eq!(config.ui.theme, Theme::Dark);
        assert_eq!(config.scan, ScanSettings::default());
        assert_eq!(rejected.len(), 1);
        assert!(matches!(rejected[0], ConfigError::InvalidValue { ref key, .. } if key == "scan.reset_delay_ms"));
    }

    #[test]
    fn test_theme_parse_and_display() {
        assert_eq!("Dark".parse::<Theme>(), Ok(Theme::Dark));
        assert!("blue".parse::<Theme>().is_err());
        assert_eq!(Theme::Dark.to_string(), "dark");
    }

    #[test]
    fn test_config_path_file_name() {
        let path = config_file_path();
        assert!(path.ends_with("tagit/config.ini"));
    }
}
