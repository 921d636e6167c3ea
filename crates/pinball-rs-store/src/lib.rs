// crates/pinball-rs-store/src/lib.rs
//! JSON file persistence for pinball-rs.
//!
//! Implements the core's `SettingsStore` and `HighScoreStore` seams on
//! plain JSON files, so an operator can edit settings with a text editor
//! and the high-score table survives restarts. A missing file is not an
//! error: settings fall back to their defaults and the high-score table
//! starts empty.

use log::{debug, info};
use pinball_rs::{HighScoreEntry, HighScoreStore, OperatorSettings, PinballError, SettingsStore};
use std::fs;
use std::path::PathBuf;

fn storage_error(e: impl std::fmt::Display) -> PinballError {
    PinballError::Storage(e.to_string())
}

/// Operator settings on a JSON file.
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&mut self) -> Result<OperatorSettings, PinballError> {
        if !self.path.exists() {
            info!(
                "[STORE] {} missing, using default settings",
                self.path.display()
            );
            return Ok(OperatorSettings::default());
        }
        let text = fs::read_to_string(&self.path).map_err(storage_error)?;
        let settings = serde_json::from_str(&text).map_err(storage_error)?;
        debug!("[STORE] Settings loaded from {}", self.path.display());
        Ok(settings)
    }

    fn save(&mut self, settings: &OperatorSettings) -> Result<(), PinballError> {
        let text = serde_json::to_string_pretty(settings).map_err(storage_error)?;
        fs::write(&self.path, text).map_err(storage_error)?;
        debug!("[STORE] Settings saved to {}", self.path.display());
        Ok(())
    }
}

/// The high-score table on a JSON file, ordered highest first on disk.
pub struct JsonHighScoreStore {
    path: PathBuf,
}

impl JsonHighScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HighScoreStore for JsonHighScoreStore {
    fn load(&mut self) -> Result<Vec<HighScoreEntry>, PinballError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.path).map_err(storage_error)?;
        let entries = serde_json::from_str(&text).map_err(storage_error)?;
        Ok(entries)
    }

    fn save(&mut self, entries: &[HighScoreEntry]) -> Result<(), PinballError> {
        let text = serde_json::to_string_pretty(entries).map_err(storage_error)?;
        fs::write(&self.path, text).map_err(storage_error)?;
        info!(
            "[STORE] {} high-score entries saved to {}",
            entries.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("pinball_rs_store_test");
        let _ = fs::create_dir_all(&dir);
        dir.join(name)
    }

    #[test]
    fn test_missing_settings_file_yields_defaults() {
        let mut store = JsonSettingsStore::new(test_path("does_not_exist.json"));
        let settings = store.load().unwrap();
        assert_eq!(settings, OperatorSettings::default());
    }

    #[test]
    fn test_settings_round_trip() {
        let path = test_path("settings.json");
        let _ = fs::remove_file(&path);
        let mut store = JsonSettingsStore::new(&path);
        let settings = OperatorSettings {
            balls_per_game: 5,
            max_players: 2,
            tilt_warnings: 1,
            ball_save_seconds: 4.5,
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load().unwrap(), settings);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_partial_settings_file_fills_defaults() {
        let path = test_path("partial_settings.json");
        fs::write(&path, r#"{ "balls_per_game": 5 }"#).unwrap();
        let mut store = JsonSettingsStore::new(&path);
        let settings = store.load().unwrap();
        assert_eq!(settings.balls_per_game, 5);
        assert_eq!(settings.max_players, 4);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_empty_high_score_storage() {
        let mut store = JsonHighScoreStore::new(test_path("no_scores.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_high_score_round_trip() {
        let path = test_path("scores.json");
        let _ = fs::remove_file(&path);
        let mut store = JsonHighScoreStore::new(&path);
        let entries = vec![
            HighScoreEntry {
                name: "Player 1".into(),
                score: 5000,
                date: "2026-08-02".into(),
            },
            HighScoreEntry {
                name: "Player 2".into(),
                score: 1200,
                date: "2026-08-02".into(),
            },
        ];
        store.save(&entries).unwrap();
        assert_eq!(store.load().unwrap(), entries);
        let _ = fs::remove_file(&path);
    }
}
