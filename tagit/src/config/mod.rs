//! Persistent configuration.
//!
//! Settings live in an INI file, `config.ini`, under the platform config
//! directory (`~/.config/tagit/` on Linux). Every setting is addressed by a
//! [`ConfigKey`] of the form `section.key`, which the CLI uses for
//! `config get|set|list`.
//!
//! ```ini
//! [scan]
//! reset_delay_ms = 2000
//!
//! [assets]
//! base_url = https://cards.example.org/targets
//!
//! [ui]
//! theme = dark
//! ```

mod file;
mod keys;

pub use file::{
    config_directory, config_file_path, AssetSettings, ConfigError, ConfigFile,
    LoggingSettings, QuizSettings, ScanSettings, Theme, UiSettings, DEFAULT_ASSET_BASE_URL,
    DEFAULT_LOG_LEVEL,
};
pub use keys::ConfigKey;
