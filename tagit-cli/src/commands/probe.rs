//! `tagit probe`: check that a level's marker asset is reachable.

use console::style;
use tagit::camera::{asset_url, AssetProbe, ReqwestAssetProbe};
use tagit::config::ConfigFile;
use tracing::info;

use super::common::{build_runtime, resolve_level};
use crate::error::CliError;

pub fn run(
    level_id: &str,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    config: &ConfigFile,
) -> Result<(), CliError> {
    let level = resolve_level(level_id)?;
    let base = base_url.unwrap_or_else(|| config.assets.base_url.clone());
    let url = asset_url(&base, level.asset_path());
    let probe = ReqwestAssetProbe::with_timeout(timeout_secs.unwrap_or(config.assets.timeout_secs))?;

    info!(level = level.id(), url = %url, "Probing level asset");
    let runtime = build_runtime()?;
    match runtime.block_on(probe.check(&url)) {
        Ok(()) => {
            println!("{} {}", style("reachable").green().bold(), url);
            Ok(())
        }
        Err(e) => {
            println!("{} {}", style("unreachable").red().bold(), url);
            Err(e.into())
        }
    }
}
