use std::fs::File;
use std::path::PathBuf;
use std::sync::mpsc;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use simplelog::{Config, LevelFilter, WriteLogger};

use gridsnake::terminal::TerminalHost;
use gridsnake::{ChannelListener, FileStore, GameConfig, GameEngine};

#[derive(Parser)]
#[command(name = "gridsnake")]
#[command(version, about = "Snake on a fixed grid, played in the terminal")]
struct Cli {
    /// JSON file with game settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cells per side of the board
    #[arg(long)]
    grid_size: Option<usize>,

    /// Milliseconds between moves
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Where the high score is kept
    #[arg(long)]
    high_score_file: Option<PathBuf>,

    #[arg(long, default_value = "gridsnake.log")]
    log_file: PathBuf,

    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout belongs to the board, so logs go to a file
    let log_file = File::create(&cli.log_file)
        .with_context(|| format!("Failed to create log file {}", cli.log_file.display()))?;
    WriteLogger::init(cli.log_level, Config::default(), log_file)
        .context("Failed to initialise logger")?;

    let mut config = match &cli.config {
        Some(path) => GameConfig::from_json_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => GameConfig::default(),
    };
    if let Some(grid_size) = cli.grid_size {
        config.grid_size = grid_size;
    }
    if let Some(tick_ms) = cli.tick_ms {
        config.tick_ms = tick_ms;
    }
    if let Some(path) = cli.high_score_file {
        config.high_score_path = path;
    }
    info!("Starting gridsnake with {:?}", config);

    let (tx, rx) = mpsc::channel();
    let store = FileStore::new(config.high_score_path.clone());
    let engine = GameEngine::new(config, Box::new(store), Box::new(ChannelListener::new(tx)))
        .context("Invalid game configuration")?;

    let mut host = TerminalHost::new(engine, rx);
    host.play().context("Terminal session failed")?;

    println!("High score: {}", host.engine().state().high_score);
    Ok(())
}
