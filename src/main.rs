//! Kingstrike: capture the enemy king on a tile board before its pieces
//! catch you.

use anyhow::{Context, Result};
use clap::Parser;
use engine::{Config, Engine, MapCatalog, builtin_catalog};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

mod tui;

#[derive(Parser, Debug)]
#[command(name = "kingstrike")]
#[command(about = "Turn-based king capture on a tile board", version)]
struct Cli {
    /// YAML game config (difficulty, move rules)
    #[arg(long)]
    config: Option<PathBuf>,

    /// YAML map catalog to use instead of the built-in maps
    #[arg(long)]
    maps: Option<PathBuf>,

    /// Seed for a reproducible game
    #[arg(long)]
    seed: Option<u64>,

    /// Enemy picks per AI turn
    #[arg(long)]
    simul_moves: Option<usize>,

    /// Colour the cells enemies can reach
    #[arg(long)]
    show_enemy_range: Option<bool>,

    /// Allow player moves onto coordinates that are not board cells
    #[arg(long)]
    lenient: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path).with_context(|| format!("reading config {}", path.display()))?,
            None => Config::default(),
        };
        if let Some(n) = self.simul_moves {
            config.difficulty.simul_moves = n;
        }
        if let Some(show) = self.show_enemy_range {
            config.difficulty.show_enemy_range = show;
        }
        if self.lenient {
            config.lenient_player_moves = true;
        }
        Ok(config)
    }

    fn load_catalog(&self) -> Result<MapCatalog> {
        match &self.maps {
            Some(path) => MapCatalog::load(path).with_context(|| format!("reading maps {}", path.display())),
            None => builtin_catalog()
                .cloned()
                .map_err(|e| anyhow::anyhow!("built-in maps are broken: {e}")),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("kingstrike=debug,engine=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kingstrike=warn,engine=warn"))
    };
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.load_config()?;
    let catalog = cli.load_catalog()?;
    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    info!(maps = catalog.maps.len(), seed = ?cli.seed, ?config, "starting");

    let (hide_tx, hide_rx) = mpsc::unbounded_channel();
    let engine = Engine::new(config, catalog, tui::TerminalFrontend::new(hide_tx), rng);
    tui::run(engine, hide_rx).await
}
