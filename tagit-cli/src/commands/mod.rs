//! CLI subcommands.

pub mod common;
pub mod config;
pub mod levels;
pub mod probe;
pub mod quiz;
pub mod render;
pub mod simulate;
