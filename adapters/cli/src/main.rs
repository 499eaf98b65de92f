#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays the lanebreaker strategy against the
//! reference engine and prints every submitted turn as a JSON line.

mod scenario;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lanebreaker_system_turn_driver::{Strategy, StrategyConfig};
use lanebreaker_world::query;
use tracing_subscriber::{fmt, EnvFilter};

use crate::scenario::{Scenario, TurnLine};

#[derive(Parser)]
#[command(name = "lanebreaker")]
#[command(about = "Lane-pushing strategy for a two-player tower defence", version)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a number of turns against the reference engine
    Run {
        /// Strategy configuration in TOML
        #[arg(long)]
        config: Option<PathBuf>,

        /// Starting board in JSON
        #[arg(long)]
        board: Option<PathBuf>,

        /// Number of turns to play
        #[arg(long, default_value_t = 1)]
        turns: u32,

        /// Tie-break seed, overriding the configuration
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the default configuration as TOML
    DefaultConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let fallback = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            config,
            board,
            turns,
            seed,
        } => run(config, board, turns, seed),
        Commands::DefaultConfig => {
            let text = toml::to_string_pretty(&StrategyConfig::default())
                .context("default configuration does not serialize")?;
            print!("{text}");
            Ok(())
        }
    }
}

fn run(
    config: Option<PathBuf>,
    board: Option<PathBuf>,
    turns: u32,
    seed: Option<u64>,
) -> Result<()> {
    let (mut config, configured_seed) = match config {
        Some(path) => load_config(&path)?,
        None => (StrategyConfig::default(), false),
    };
    config.seed = match seed {
        Some(seed) => seed,
        None if configured_seed => config.seed,
        None => {
            let drawn = rand::random();
            tracing::info!(seed = drawn, "drew tie-break seed");
            drawn
        }
    };

    let scenario = match board {
        Some(path) => {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("cannot read board {}", path.display()))?;
            Scenario::parse(&text)?
        }
        None => Scenario::default(),
    };

    let catalog = config.catalog.clone();
    let mut world = scenario.build_world(&catalog)?;
    let mut strategy = Strategy::new(config).context("invalid strategy configuration")?;

    for turn in 0..turns {
        strategy.on_action_frame(&scenario.events_for(turn));
        let report = strategy
            .on_turn(&mut world)
            .with_context(|| format!("turn {turn} was not delivered"))?;
        tracing::debug!(?report, "turn report");

        if let Some(submission) = query::submissions(&world).last() {
            let line = serde_json::to_string(&TurnLine::new(submission, &catalog))
                .context("submission does not serialize")?;
            println!("{line}");
        }
    }
    Ok(())
}

/// Loads a configuration file, reporting whether it pins the seed.
fn load_config(path: &Path) -> Result<(StrategyConfig, bool)> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read config {}", path.display()))?;
    let table: toml::Table = text
        .parse()
        .with_context(|| format!("config {} is not valid TOML", path.display()))?;
    let configured_seed = table.contains_key("seed");
    let config = toml::Value::Table(table)
        .try_into::<StrategyConfig>()
        .with_context(|| format!("config {} does not describe a strategy", path.display()))?;
    Ok((config, configured_seed))
}
