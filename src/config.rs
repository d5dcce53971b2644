use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use log::LevelFilter;
use serde::Deserialize;

use crate::engine::INITIAL_SNAKE_LENGTH;
use crate::GridInt;

const MAX_TILE_COUNT: u16 = 200;

#[derive(Debug, Default, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct GridConfig {
    /// Side of the square playing field, in the same unit as `cell_size`.
    #[serde(default = "default_canvas_size")]
    pub canvas_size: u16,
    #[serde(default = "default_cell_size")]
    pub cell_size: u16,
}

#[derive(Debug, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_high_score_file")]
    pub high_score_file: String,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_file")]
    pub file: String,
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_canvas_size() -> u16 { 400 }
fn default_cell_size() -> u16 { 20 }
fn default_tick_interval_ms() -> u64 { 100 }
fn default_high_score_file() -> String { ".snake_high_score".to_string() }
fn default_log_file() -> String { "snake.log".to_string() }
fn default_log_level() -> String { "info".to_string() }

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig { canvas_size: default_canvas_size(), cell_size: default_cell_size() }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig { tick_interval_ms: default_tick_interval_ms() }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig { high_score_file: default_high_score_file() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig { file: default_log_file(), level: default_log_level() }
    }
}

impl GameConfig {
    /// Reads `path` if it exists, otherwise returns the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(GameConfig::default()),
            Err(e) => return Err(e).with_context(|| format!("Error reading {}", path.display())),
        };

        let config: GameConfig = toml::from_str(&contents)
            .with_context(|| format!("Error parsing {}", path.display()))?;
        config.validate().with_context(|| format!("Invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.grid.cell_size > 0, "grid.cell_size must be positive");

        let tiles = self.grid.canvas_size / self.grid.cell_size;
        ensure!(
            tiles > INITIAL_SNAKE_LENGTH as u16,
            "grid must be at least {} cells wide, got {}",
            INITIAL_SNAKE_LENGTH + 1,
            tiles
        );
        ensure!(tiles <= MAX_TILE_COUNT, "grid may be at most {} cells wide, got {}", MAX_TILE_COUNT, tiles);
        ensure!(self.timing.tick_interval_ms > 0, "timing.tick_interval_ms must be positive");

        self.log_level()?;
        Ok(())
    }

    pub fn tile_count(&self) -> GridInt {
        (self.grid.canvas_size / self.grid.cell_size.max(1)) as GridInt
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.timing.tick_interval_ms)
    }

    pub fn log_level(&self) -> Result<LevelFilter> {
        self.logging
            .level
            .parse()
            .with_context(|| format!("Unknown log level '{}'", self.logging.level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();

        assert_eq!(config.tile_count(), 20);
        assert_eq!(config.tick_interval(), Duration::from_millis(100));
        assert_eq!(config.log_level().unwrap(), LevelFilter::Info);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = GameConfig::load(&dir.path().join("snake.toml")).unwrap();
        assert_eq!(config.tile_count(), 20);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snake.toml");
        fs::write(&path, "[grid]\ncell_size = 25\n\n[logging]\nlevel = \"debug\"\n").unwrap();

        let config = GameConfig::load(&path).unwrap();
        assert_eq!(config.tile_count(), 16);
        assert_eq!(config.grid.canvas_size, 400);
        assert_eq!(config.timing.tick_interval_ms, 100);
        assert_eq!(config.log_level().unwrap(), LevelFilter::Debug);
    }

    #[test]
    fn test_rejects_tiny_grid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snake.toml");
        fs::write(&path, "[grid]\ncanvas_size = 60\ncell_size = 20\n").unwrap();

        assert!(GameConfig::load(&path).is_err());
    }

    #[test]
    fn test_rejects_zero_cell_size() {
        let mut config = GameConfig::default();
        config.grid.cell_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_level() {
        let mut config = GameConfig::default();
        config.logging.level = "chatty".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snake.toml");
        fs::write(&path, "[grid\ncell_size = ").unwrap();

        let err = GameConfig::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Error parsing"));
    }
}
