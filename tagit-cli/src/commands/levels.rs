//! `tagit levels`: list the built-in levels.

use console::style;
use tagit::level::builtin_levels;

use crate::error::CliError;

pub fn run() -> Result<(), CliError> {
    for level in builtin_levels() {
        println!(
            "{}  {} - {}",
            style(level.id()).bold(),
            level.title(),
            level.subtitle()
        );
        println!("    asset:   {}", level.asset_path());
        let keys: Vec<_> = level
            .slots()
            .iter()
            .map(|slot| format!("{}={}", slot.index, slot.content_key))
            .collect();
        println!("    markers: {}", keys.join(" "));
    }
    Ok(())
}
