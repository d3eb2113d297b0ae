//! Tag-it-AR CLI
//!
//! Drives the scan lifecycle library from the terminal: lists and renders
//! the built-in levels, replays scan sessions against simulated hardware,
//! probes real asset hosts, runs the quiz and edits `config.ini`.

mod commands;
mod error;
mod terminal;

use clap::{Parser, Subcommand};
use tagit::config::ConfigFile;
use tagit::logging::init_logging;
use tracing::warn;

use commands::config::ConfigCommands;
use commands::quiz::QuizArgs;
use commands::simulate::SimulateArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "tagit", version = tagit::VERSION, about = "Tag-it-AR scan lifecycle driver")]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the built-in levels
    Levels,

    /// Show what a card displays, or list a level's cards
    Render {
        /// Level id (e.g. L1)
        level: String,

        /// Content key (e.g. b, h1)
        key: Option<String>,

        /// Print the escaped source view instead of the rendered markup
        #[arg(long)]
        source: bool,
    },

    /// Replay a scan session against simulated camera and engine
    Simulate(SimulateArgs),

    /// Check that a level's marker asset is reachable over HTTP
    Probe {
        /// Level id (e.g. L1)
        level: String,

        /// Asset base URL (defaults to assets.base_url)
        #[arg(long)]
        base_url: Option<String>,

        /// Request timeout in seconds (defaults to assets.timeout_secs)
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Take the quiz
    Quiz(QuizArgs),

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("{} {}", console::style("error:").red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    // Config commands must work on a broken file.
    let command = match cli.command {
        Commands::Config { command } => return commands::config::run(command),
        command => command,
    };

    let (config, problems) = match ConfigFile::load_lenient() {
        Ok((config, rejected)) => (config, rejected),
        Err(e) => (ConfigFile::default(), vec![e]),
    };
    let _guard = init_logging(&config.logging, cli.verbose.then_some("debug"))?;
    for e in problems {
        warn!(error = %e, "Ignoring config problem, using defaults");
    }

    match command {
        Commands::Levels => commands::levels::run(),
        Commands::Render { level, key, source } => {
            commands::render::run(&level, key.as_deref(), source)
        }
        Commands::Simulate(args) => commands::simulate::run(args, &config),
        Commands::Probe {
            level,
            base_url,
            timeout,
        } => commands::probe::run(&level, base_url, timeout, &config),
        Commands::Quiz(args) => commands::quiz::run(args, &config),
        Commands::Config { .. } => Ok(()),
    }
}
