//! Configuration management CLI commands.
//!
//! Provides `config get`, `config set`, `config list`, and `config path` commands
//! for viewing and modifying configuration settings from the command line.

use std::path::Path;

use clap::Subcommand;
use tagit::config::{config_file_path, ConfigError, ConfigFile, ConfigKey};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key in format section.key (e.g., ui.theme)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key in format section.key (e.g., ui.theme)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all configuration settings
    List,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand against the default config file.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    let path = config_file_path();
    let output = run_at(command, &path)?;
    print!("{}", output);
    Ok(())
}

/// Run a config subcommand against `path`, returning what to print.
pub fn run_at(command: ConfigCommands, path: &Path) -> Result<String, CliError> {
    match command {
        ConfigCommands::Get { key } => run_get(&key, path),
        ConfigCommands::Set { key, value } => run_set(&key, &value, path),
        ConfigCommands::List => run_list(path),
        ConfigCommands::Path => Ok(format!("{}\n", path.display())),
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'tagit config list' to see available keys.",
            key
        ))
    })
}

/// Load the file, keeping every valid value so a broken file can be repaired.
fn load(path: &Path, out: &mut String, skip: Option<ConfigKey>) -> Result<ConfigFile, CliError> {
    let (config, rejected) = ConfigFile::load_lenient_from(path)?;
    for error in rejected {
        if let (Some(key), ConfigError::InvalidValue { key: bad, .. }) = (skip, &error) {
            if key.name() == *bad {
                continue;
            }
        }
        out.push_str(&format!("warning: {}, using the default\n", error));
    }
    Ok(config)
}

/// Get a configuration value.
fn run_get(key: &str, path: &Path) -> Result<String, CliError> {
    let config_key = parse_key(key)?;
    let mut out = String::new();
    let config = load(path, &mut out, None)?;
    let value = config_key.get(&config);

    if value.is_empty() {
        out.push_str("(not set)\n");
    } else {
        out.push_str(&format!("{}\n", value));
    }
    Ok(out)
}

/// Set a configuration value.
fn run_set(key: &str, value: &str, path: &Path) -> Result<String, CliError> {
    let config_key = parse_key(key)?;
    let mut out = String::new();
    let mut config = load(path, &mut out, Some(config_key))?;
    config_key.set(&mut config, value)?;
    config.save_to(path)?;

    out.push_str(&format!("Set {} = {}\n", config_key.name(), value));
    Ok(out)
}

/// List all configuration settings.
fn run_list(path: &Path) -> Result<String, CliError> {
    let mut out = String::new();
    let config = load(path, &mut out, None)?;

    out.push_str("Configuration Settings\n======================\n");
    let mut current_section = "";

    for key in ConfigKey::all() {
        let section = key.section();

        if section != current_section {
            out.push_str(&format!("\n[{}]\n", section));
            current_section = section;
        }

        let value = key.get(&config);
        if value.is_empty() {
            out.push_str(&format!("  {} = (not set)\n", key.key_name()));
        } else {
            out.push_str(&format!("  {} = {}\n", key.key_name(), value));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_then_get() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");

        let out = run_at(
            ConfigCommands::Set {
                key: "ui.theme".to_string(),
                value: "dark".to_string(),
            },
            &path,
        )
        .unwrap();
        assert_eq!(out, "Set ui.theme = dark\n");

        let out = run_at(
            ConfigCommands::Get {
                key: "ui.theme".to_string(),
            },
            &path,
        )
        .unwrap();
        assert_eq!(out, "dark\n");
    }

    #[test]
    fn test_get_unset_and_unknown() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");

        let out = run_at(
            ConfigCommands::Get {
                key: "logging.file".to_string(),
            },
            &path,
        )
        .unwrap();
        assert_eq!(out, "(not set)\n");

        let err = run_at(
            ConfigCommands::Get {
                key: "ui.font".to_string(),
            },
            &path,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Unknown configuration key"));
    }

    #[test]
    fn test_invalid_value_is_not_saved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");

        let result = run_at(
            ConfigCommands::Set {
                key: "scan.reset_delay_ms".to_string(),
                value: "later".to_string(),
            },
            &path,
        );
        assert!(matches!(result, Err(CliError::Config(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_set_repairs_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[scan]\nreset_delay_ms = soon\n\n[quiz]\nlock_ms = 500\n").unwrap();

        let out = run_at(
            ConfigCommands::Set {
                key: "scan.reset_delay_ms".to_string(),
                value: "2000".to_string(),
            },
            &path,
        )
        .unwrap();
        assert_eq!(out, "Set scan.reset_delay_ms = 2000\n");

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.scan.reset_delay_ms, 2000);
        assert_eq!(config.quiz.lock_ms, 500);
    }

    #[test]
    fn test_get_warns_about_invalid_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[scan]\nreset_delay_ms = soon\n\n[ui]\ntheme = dark\n").unwrap();

        let out = run_at(
            ConfigCommands::Get {
                key: "ui.theme".to_string(),
            },
            &path,
        )
        .unwrap();
        assert!(out.starts_with("warning: invalid value 'soon' for scan.reset_delay_ms"));
        assert!(out.ends_with("dark\n"));
    }

    #[test]
    fn test_list_groups_sections() {
        let dir = TempDir::new().unwrap();
        let out = run_at(ConfigCommands::List, &dir.path().join("config.ini")).unwrap();
        assert!(out.contains("[scan]\n  reset_delay_ms = 2000\n"));
        assert!(out.contains("[ui]\n  theme = light\n"));
        assert!(out.contains("  file = (not set)\n"));
    }
}
