//! `tagit simulate`: run a scan session against simulated collaborators.
//!
//! A script of steps drives the simulated engine and the controller; the
//! console presenter prints everything the app would show.
//!
//! ```text
//! tagit simulate L1 --script "load,start,found:1,lost:1,wait:2500,stop"
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use console::style;
use tagit::camera::{asset_url, PlatformCameraError};
use tagit::config::ConfigFile;
use tagit::session::{ControllerParts, ScanController, StopReason};
use tagit::sim::{SimAssetProbe, SimCamera, SimEngine};
use tracing::debug;

use super::common::{build_runtime, parse_list, resolve_level, BindArg};
use crate::error::CliError;
use crate::terminal::ConsolePresenter;

/// Script used when none is given.
pub const DEFAULT_SCRIPT: &str = "load,start,found:0,found:1,lost:1,wait:2500,stop";

/// Time given to the controller to settle after each step.
const STEP_SETTLE: Duration = Duration::from_millis(50);

#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// Level id (see `tagit levels`)
    pub level: String,

    /// Comma-separated steps: load, start, stop, found:N, lost:N, fail:REASON, wait:MS
    #[arg(long, default_value = DEFAULT_SCRIPT)]
    pub script: String,

    /// Camera stream binding behaviour
    #[arg(long, value_enum, default_value_t = BindArg::Always)]
    pub bind: BindArg,

    /// HTTP status the simulated asset host answers with
    #[arg(long, default_value_t = 200)]
    pub asset_status: u16,

    /// Simulate a device without camera support
    #[arg(long)]
    pub no_camera: bool,

    /// Simulate the user refusing camera permission
    #[arg(long, conflicts_with = "no_camera")]
    pub deny_camera: bool,

    /// Also print the escaped source view
    #[arg(long)]
    pub source: bool,
}

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Load,
    Start,
    Stop,
    Found(u32),
    Lost(u32),
    Fail(String),
    Wait(Duration),
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (s, None),
        };
        let slot = |arg: Option<&str>| -> Result<u32, String> {
            arg.ok_or_else(|| format!("{} needs a slot, e.g. {}:0", name, name))?
                .parse()
                .map_err(|_| format!("invalid slot in '{}'", s))
        };

        match (name.to_lowercase().as_str(), arg) {
            ("load", None) => Ok(Step::Load),
            ("start", None) => Ok(Step::Start),
            ("stop", None) => Ok(Step::Stop),
            ("found", arg) => Ok(Step::Found(slot(arg)?)),
            ("lost", arg) => Ok(Step::Lost(slot(arg)?)),
            ("fail", arg) => Ok(Step::Fail(arg.unwrap_or("engine failure").to_string())),
            ("wait", Some(ms)) => ms
                .parse()
                .map(|ms| Step::Wait(Duration::from_millis(ms)))
                .map_err(|_| format!("invalid duration in '{}'", s)),
            _ => Err(format!("unknown step '{}'", s)),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Load => write!(f, "load"),
            Step::Start => write!(f, "start"),
            Step::Stop => write!(f, "stop"),
            Step::Found(i) => write!(f, "found:{}", i),
            Step::Lost(i) => write!(f, "lost:{}", i),
            Step::Fail(reason) => write!(f, "fail:{}", reason),
            Step::Wait(d) => write!(f, "wait:{}", d.as_millis()),
        }
    }
}

pub fn run(args: SimulateArgs, config: &ConfigFile) -> Result<(), CliError> {
    let level = Arc::new(resolve_level(&args.level)?);
    let steps: Vec<Step> = parse_list(&args.script)?;

    let camera = if args.no_camera {
        SimCamera::unsupported()
    } else if args.deny_camera {
        SimCamera::failing(PlatformCameraError::NotAllowed)
    } else {
        SimCamera::available()
    };
    let presenter = Arc::new(ConsolePresenter::new(config.ui.theme, args.source));
    let url = asset_url(&config.assets.base_url, level.asset_path());

    let runtime = build_runtime()?;
    runtime.block_on(async move {
        let (engine, parts) = SimEngine::new(args.bind.into());
        let handle = ScanController::spawn(ControllerParts {
            level,
            engine: parts,
            camera: Arc::new(camera),
            assets: Arc::new(SimAssetProbe::status(args.asset_status)),
            asset_url: url,
            presenter,
            timings: config.scan.timings(),
        });

        for step in steps {
            println!("{} {}", style("»").bold(), style(&step).bold());
            match step {
                Step::Load => engine.loaded(),
                Step::Start => {
                    if let Err(e) = handle.start().await {
                        println!("  {:>8}  {}", style("start").red().bold(), e);
                    }
                }
                Step::Stop => handle.stop(StopReason::User).await,
                Step::Found(i) => engine.found(i),
                Step::Lost(i) => engine.lost(i),
                Step::Fail(reason) => engine.fail(&reason),
                Step::Wait(d) => tokio::time::sleep(d).await,
            }
            tokio::time::sleep(STEP_SETTLE).await;
        }

        let snapshot = handle.snapshot();
        debug!(?snapshot, "Simulation finished");
        handle.shutdown().await;

        println!();
        println!(
            "Final state: {} (engine starts: {}, stops: {})",
            style(snapshot.state.display_status()).bold(),
            engine.start_count(),
            engine.stop_count()
        );
        if let Some(err) = snapshot.last_error {
            println!("Last error:  {}", err);
        }
    });

    Ok(())
}
