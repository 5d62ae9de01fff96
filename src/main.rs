//! Grid Sentinel - Entry Point
//!
//! Loads the map and configuration, takes over the terminal, runs the
//! simulation and prints why it stopped.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use crossterm::{cursor, execute, terminal};
use tracing_subscriber::EnvFilter;

use grid_sentinel::core::error::Result;
use grid_sentinel::core::SimulationConfig;
use grid_sentinel::director::DirectorKind;
use grid_sentinel::entity::Avatar;
use grid_sentinel::map::{Map, MapLoader};
use grid_sentinel::render::TerminalSink;
use grid_sentinel::simulation::Simulation;

/// Room used when no map file is given
const DEFAULT_ROOM: (usize, usize) = (40, 16);

/// Grid Sentinel - steer an avatar among wandering obstacles
#[derive(Parser, Debug)]
#[command(name = "grid-sentinel")]
#[command(about = "Terminal grid simulation with obstacles, sensors and live panels")]
struct Args {
    /// Map file; '#' is a wall, ' ' is empty, 'R' is the avatar start
    map: Option<PathBuf>,

    /// Who steers the avatar: unknown, human or brownian
    #[arg(default_value = "human")]
    director: String,

    /// TOML file overriding the simulation defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of wandering obstacles
    #[arg(long)]
    obstacles: Option<usize>,

    /// Random seed for reproducible obstacles, sensors and identifiers
    #[arg(long)]
    seed: Option<u64>,
}

/// Raw mode and a hidden cursor for as long as it lives
struct TerminalGuard;

impl TerminalGuard {
    fn acquire() -> Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(
            io::stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All)
        )?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout belongs to the canvas
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("grid_sentinel=warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let kind: DirectorKind = args.director.parse()?;
    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_toml_file(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(count) = args.obstacles {
        config.obstacle_count = count;
    }
    config.validate()?;

    let map = match &args.map {
        Some(path) => MapLoader::new(&[Avatar::SYMBOL]).load_from_file(path)?,
        None => Map::room(DEFAULT_ROOM.0, DEFAULT_ROOM.1),
    };
    tracing::info!(width = map.width(), height = map.height(), ?kind, "map loaded");

    let reason = {
        let _guard = TerminalGuard::acquire()?;
        let simulation = Simulation::organize(
            Arc::new(map),
            kind,
            Box::new(TerminalSink::new()),
            &config,
            args.seed,
        )?;
        simulation.run()?
    };

    println!("{}", reason.explanation());
    Ok(())
}
