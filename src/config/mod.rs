//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::calculate::{RankAggregator, GAME_WEIGHT, SEASON_WEIGHT};
use crate::models::{
    ParseError, RoleSettings, Season, DEFAULT_MAX_CHANCE, DEFAULT_PREFERENCE_THRESHOLD,
};
use crate::storage::StorageConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Rank aggregation and role preference settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Season treated as current by the recency weights, e.g. `"S2025 S1"`.
    #[serde(default = "default_current_season")]
    pub current_season: String,

    #[serde(default = "default_season_weight")]
    pub season_weight: f64,

    #[serde(default = "default_game_weight")]
    pub game_weight: f64,

    /// Share of recent games a role needs to count as preferred.
    #[serde(default = "default_preference_threshold")]
    pub preference_threshold: f64,

    /// Ceiling for any single role chance, in percent.
    #[serde(default = "default_max_chance")]
    pub max_chance: u32,

    #[serde(default = "default_max_recent_matches")]
    pub max_recent_matches: usize,

    #[serde(default = "default_max_mastery")]
    pub max_mastery: usize,
}

fn default_current_season() -> String {
    "S2025 S1".to_string()
}

fn default_season_weight() -> f64 {
    SEASON_WEIGHT
}

fn default_game_weight() -> f64 {
    GAME_WEIGHT
}

fn default_preference_threshold() -> f64 {
    DEFAULT_PREFERENCE_THRESHOLD
}

fn default_max_chance() -> u32 {
    DEFAULT_MAX_CHANCE
}

fn default_max_recent_matches() -> usize {
    40
}

fn default_max_mastery() -> usize {
    4
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            current_season: default_current_season(),
            season_weight: default_season_weight(),
            game_weight: default_game_weight(),
            preference_threshold: default_preference_threshold(),
            max_chance: default_max_chance(),
            max_recent_matches: default_max_recent_matches(),
            max_mastery: default_max_mastery(),
        }
    }
}

impl ScoringConfig {
    pub fn season(&self) -> Result<Season, ParseError> {
        self.current_season.parse()
    }

    pub fn aggregator(&self) -> Result<RankAggregator, ParseError> {
        Ok(RankAggregator::with_weights(
            self.season()?,
            self.season_weight,
            self.game_weight,
        ))
    }

    pub fn role_settings(&self) -> RoleSettings {
        RoleSettings {
            preference_threshold: self.preference_threshold,
            max_chance: self.max_chance,
        }
    }
}

/// Player store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Days a stored player stays fresh before it is acquired again.
    #[serde(default = "default_validity_days")]
    pub validity_days: u32,
}

fn default_validity_days() -> u32 {
    7
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            validity_days: default_validity_days(),
        }
    }
}

impl StoreConfig {
    pub fn validity(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.validity_days))
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub storage: StoreConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            scoring: ScoringConfig::default(),
            storage: StoreConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            debug!("No config at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    pub fn storage_config(&self) -> StorageConfig {
        StorageConfig::new(self.data_dir.clone())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scoring = &self.scoring;

        if scoring.season_weight < 0.0 || scoring.game_weight < 0.0 {
            return Err(ConfigError::ValidationError(
                "Rank weights must not be negative".to_string(),
            ));
        }

        if ((scoring.season_weight + scoring.game_weight) - 1.0).abs() > 1e-9 {
            return Err(ConfigError::ValidationError(format!(
                "Rank weights must sum to 1, got {} + {}",
                scoring.season_weight, scoring.game_weight
            )));
        }

        if let Err(e) = scoring.season() {
            return Err(ConfigError::ValidationError(format!(
                "Bad current_season: {}",
                e
            )));
        }

        if !(scoring.preference_threshold > 0.0 && scoring.preference_threshold < 1.0) {
            return Err(ConfigError::ValidationError(
                "preference_threshold must be between 0 and 1".to_string(),
            ));
        }

        if !(20..=100).contains(&scoring.max_chance) {
            return Err(ConfigError::ValidationError(
                "max_chance must be between 20 and 100".to_string(),
            ));
        }

        if scoring.max_recent_matches == 0 {
            return Err(ConfigError::ValidationError(
                "max_recent_matches must be greater than 0".to_string(),
            ));
        }

        if self.storage.validity_days == 0 {
            return Err(ConfigError::ValidationError(
                "validity_days must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.scoring.current_season, "S2025 S1");
        assert_eq!(config.scoring.max_chance, 90);
        assert_eq!(config.storage.validity_days, 7);
    }

    #[test]
    fn test_config_validation_ok() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_weights() {
        let mut config = AppConfig::default();
        config.scoring.season_weight = 0.7;
        assert!(config.validate().is_err());

        config.scoring.season_weight = 1.2;
        config.scoring.game_weight = -0.2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_season() {
        let mut config = AppConfig::default();
        config.scoring.current_season = "2025".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_ranges() {
        let mut config = AppConfig::default();
        config.scoring.preference_threshold = 1.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.scoring.max_chance = 10;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.storage.validity_days = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.scoring.max_recent_matches = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("lane-balancer.toml");
        std::fs::write(
            &path,
            "data_dir = \"/tmp/lanes\"\n\n[scoring]\ncurrent_season = \"S2024 S3\"\nmax_chance = 80\n",
        )
        .unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/lanes"));
        assert_eq!(config.scoring.season().unwrap(), Season::new(2024, 3));
        assert_eq!(config.scoring.max_chance, 80);
        assert_eq!(config.scoring.season_weight, 0.65);
        assert_eq!(config.storage.validity_days, 7);
    }

    #[test]
    fn test_missing_file_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig::load_or_default(&temp_dir.path().join("none.toml")).unwrap();
        assert_eq!(config.scoring, ScoringConfig::default());
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.toml");
        std::fs::write(&path, "[scoring]\nmax_chance = 5\n").unwrap();

        assert!(matches!(
            AppConfig::load_or_default(&path),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();

        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.data_dir, parsed.data_dir);
        assert_eq!(config.scoring, parsed.scoring);
    }
}
