//! Common types and utilities shared across CLI commands.

use std::str::FromStr;

use clap::ValueEnum;
use tagit::level::{find_level, Level};
use tagit::sim::BindMode;

use crate::error::CliError;

/// Stream binding behaviour of the simulated engine.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum BindArg {
    /// The camera stream binds on every start
    Always,
    /// The camera stream never binds (exercises the retry and failure path)
    Never,
    /// The camera stream binds only after the automatic retry
    Retry,
}

impl From<BindArg> for BindMode {
    fn from(arg: BindArg) -> Self {
        match arg {
            BindArg::Always => BindMode::Always,
            BindArg::Never => BindMode::Never,
            BindArg::Retry => BindMode::FromStart(2),
        }
    }
}

/// Look up a built-in level by id.
pub fn resolve_level(id: &str) -> Result<Level, CliError> {
    find_level(id).ok_or_else(|| CliError::UnknownLevel(id.to_string()))
}

/// Create the runtime for async commands.
pub fn build_runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(e.to_string()))
}

/// Parse a comma-separated list, ignoring blanks.
pub fn parse_list<T>(input: &str) -> Result<Vec<T>, CliError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<T>()
                .map_err(|e| CliError::InvalidArgument(format!("'{}': {}", s, e)))
        })
        .collect()
}
