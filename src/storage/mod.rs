//! Local file storage.
//!
//! Everything lives under one data directory:
//! - `players.jsonl` holds one record per player, keyed by name
//! - `matches.jsonl` is an append-only log of balanced matches
//! - `profiles/` holds raw profile files for the file-backed source

pub mod jsonl;
mod matches;
mod players;

pub use matches::{LaneRecord, MatchLog, MatchRecord};
pub use players::{format_age, PlayerRecord, PlayerStore};

use std::path::PathBuf;
use thiserror::Error;

use crate::models::ParseError;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Stored record for {name} is invalid: {source}")]
    InvalidRecord { name: String, source: ParseError },
}

/// Files kept under the data directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Players,
    Matches,
}

impl Dataset {
    pub fn filename(&self) -> &'static str {
        match self {
            Dataset::Players => "players.jsonl",
            Dataset::Matches => "matches.jsonl",
        }
    }
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn path_for(&self, dataset: Dataset) -> PathBuf {
        self.data_dir.join(dataset.filename())
    }

    pub fn players_path(&self) -> PathBuf {
        self.path_for(Dataset::Players)
    }

    pub fn matches_path(&self) -> PathBuf {
        self.path_for(Dataset::Matches)
    }

    pub fn profiles_dir(&self) -> PathBuf {
        self.data_dir.join("profiles")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_paths() {
        let config = StorageConfig::new(PathBuf::from("/data"));

        assert_eq!(config.players_path(), PathBuf::from("/data/players.jsonl"));
        assert_eq!(config.matches_path(), PathBuf::from("/data/matches.jsonl"));
        assert_eq!(config.profiles_dir(), PathBuf::from("/data/profiles"));
    }

    #[test]
    fn test_storage_config_default() {
        let config = StorageConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
    }

    #[test]
    fn test_invalid_record_message() {
        let err = StorageError::InvalidRecord {
            name: "ghost#NA1".to_string(),
            source: ParseError::ScoreOutOfRange(40.0),
        };
        assert!(err.to_string().contains("ghost#NA1"));
    }
}
