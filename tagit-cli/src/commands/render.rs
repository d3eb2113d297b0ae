//! `tagit render`: show what a card displays.

use console::style;
use tagit::level::ContentKey;

use super::common::resolve_level;
use crate::error::CliError;

/// Print the content for `key`, or list the level's keys when `key` is
/// omitted.
pub fn run(level_id: &str, key: Option<&str>, source: bool) -> Result<(), CliError> {
    let level = resolve_level(level_id)?;

    let Some(key) = key else {
        println!("{} {}", style(level.id()).bold(), level.title());
        for slot in level.slots() {
            println!(
                "  {:>2}  {:<8} {}",
                slot.index,
                slot.content_key.tag_label(),
                level.hint(&slot.content_key)
            );
        }
        return Ok(());
    };

    let key = ContentKey::new(key);
    let content = level.render(&key).ok_or_else(|| CliError::UnknownContent {
        level: level.id().to_string(),
        key: key.to_string(),
    })?;

    println!("{} {}", style("hint:").dim(), level.hint(&key));
    if source {
        println!("{}", content.source);
    } else {
        println!("{}", content.html);
    }
    Ok(())
}
