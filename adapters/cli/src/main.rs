#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays World of Bits in the terminal.

mod input;
mod render;

use std::{
    fs,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use world_of_bits_core::{CellCoord, CellRect, EvictionPolicy};
use world_of_bits_engine::{Engine, EngineConfig};

use crate::input::{Input, HELP};

/// Collect, place and craft power-of-two tokens on a map-sized grid.
#[derive(Debug, Parser)]
#[command(name = "world-of-bits", version)]
struct Cli {
    /// TOML file holding the session configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the spawn seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Overrides the eviction policy.
    #[arg(long, value_enum)]
    policy: Option<Policy>,
    /// Overrides the interaction radius, in cells.
    #[arg(long)]
    radius: Option<u32>,
    /// Number of cells drawn on each side of the player.
    #[arg(long, default_value_t = 6)]
    view: u32,
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Policy {
    Farming,
    Persistent,
}

impl From<Policy> for EvictionPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Farming => Self::Farming,
            Policy::Persistent => Self::Persistent,
        }
    }
}

/// Entry point for the World of Bits command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&cli.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = configure(&cli)?;
    let mut engine = Engine::new(config).context("invalid session configuration")?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    play(&mut engine, cli.view, stdin.lock(), &mut stdout.lock())
}

fn configure(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(policy) = cli.policy {
        config.eviction_policy = policy.into();
    }
    if let Some(radius) = cli.radius {
        config.neighborhood_size = radius;
    }
    Ok(config)
}

fn load(path: &Path) -> Result<EngineConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration from {}", path.display()))?;
    let config = toml::from_str(&text)
        .with_context(|| format!("failed to parse configuration in {}", path.display()))?;
    info!(path = %path.display(), "configuration loaded");
    Ok(config)
}

fn play(engine: &mut Engine, view: u32, reader: impl BufRead, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{}", world_of_bits_core::WELCOME_BANNER)?;
    draw(engine, view, out)?;

    for line in reader.lines() {
        let line = line.context("failed to read from stdin")?;
        let command = match input::parse(&line) {
            Ok(command) => command,
            Err(error) => {
                writeln!(out, "{error}")?;
                continue;
            }
        };

        match command {
            Input::Move(direction) => {
                let before = engine.player();
                if engine.move_player(direction) == before {
                    writeln!(out, "you cannot move")?;
                }
            }
            Input::Interact { di, dj } => {
                let player = engine.player();
                let target = CellCoord::new(
                    player.i().saturating_add(di),
                    player.j().saturating_add(dj),
                );
                let outcome = engine.interact(target, player);
                writeln!(out, "{}", render::describe(outcome))?;
            }
            Input::Reset => engine.reset(),
            Input::Show => {}
            Input::Help => {
                writeln!(out, "{HELP}")?;
                continue;
            }
            Input::Quit => break,
        }
        draw(engine, view, out)?;
    }

    out.flush()?;
    Ok(())
}

fn draw(engine: &mut Engine, view: u32, out: &mut impl Write) -> Result<()> {
    let around = CellRect::around(engine.player(), view);
    let views = engine.materialize_range(around.min(), around.max());
    let range = engine.window().map_or(around, |window| window.materialize);

    let events = engine.drain_events();
    debug!(events = events.len(), "frame");

    write!(out, "{}", render::render(&views, range, engine.player()))?;
    writeln!(out, "{}", render::status(engine))?;
    Ok(())
}
