mod config;
mod engine;
mod game;
mod highscore;
mod input;
mod snake;
mod term;
mod ticker;

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};
use simplelog::WriteLogger;

use config::GameConfig;

pub type TermInt = u16;
pub type Coords = (u16, u16);

pub type GridInt = i16;
pub type Cell = (GridInt, GridInt);

const CONFIG_FILE: &str = "snake.toml";

fn main() -> Result<()> {
    // The logger's own settings come from the config, so report config
    // trouble once logging is up
    let (config, config_err) = match GameConfig::load(Path::new(CONFIG_FILE)) {
        Ok(config) => (config, None),
        Err(e) => (GameConfig::default(), Some(e)),
    };

    init_logging(&config)?;

    if let Some(e) = config_err {
        eprintln!("Warning: {:#}. Using default configuration.", e);
        warn!("{:#}; using default configuration", e);
    }

    info!("Starting snake on a {0}x{0} grid, one step every {1:?}", config.tile_count(), config.tick_interval());

    let mut game = game::SnakeGame::new(&config)?;
    game.run()
}

fn init_logging(config: &GameConfig) -> Result<()> {
    let path = &config.logging.file;
    let file = File::create(path).with_context(|| format!("Error creating log file {}", path))?;

    WriteLogger::init(config.log_level()?, simplelog::Config::default(), file)
        .context("Error setting up logging")
}
