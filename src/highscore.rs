use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::warn;

/// Single-number high score kept in a plain text file.
pub struct HighScoreStore {
    path: PathBuf,
}

impl HighScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        HighScoreStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable files count as no high score yet.
    pub fn load(&self) -> u32 {
        match fs::read_to_string(&self.path) {
            Ok(contents) => contents.trim().parse().unwrap_or_else(|e| {
                warn!("Ignoring malformed high score in {}: {}", self.path.display(), e);
                0
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => 0,
            Err(e) => {
                warn!("Could not read high score from {}: {}", self.path.display(), e);
                0
            }
        }
    }

    pub fn save(&self, score: u32) -> Result<()> {
        fs::write(&self.path, score.to_string())
            .with_context(|| format!("Error writing high score to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_zero() {
        let dir = tempdir().unwrap();
        let store = HighScoreStore::new(dir.path().join("none"));
        assert_eq!(store.load(), 0);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let store = HighScoreStore::new(dir.path().join("high"));

        store.save(130).unwrap();
        assert_eq!(store.load(), 130);

        store.save(140).unwrap();
        assert_eq!(HighScoreStore::new(store.path()).load(), 140);
    }

    #[test]
    fn test_tolerates_whitespace() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("high");
        fs::write(&path, "  70\n").unwrap();

        assert_eq!(HighScoreStore::new(&path).load(), 70);
    }

    #[test]
    fn test_malformed_file_is_zero() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("high");
        fs::write(&path, "lots").unwrap();

        assert_eq!(HighScoreStore::new(&path).load(), 0);
    }

    #[test]
    fn test_save_into_missing_dir_fails() {
        let dir = tempdir().unwrap();
        let store = HighScoreStore::new(dir.path().join("nope").join("high"));

        let err = store.save(10).unwrap_err();
        assert!(err.to_string().contains("Error writing high score"));
    }
}
