//! Player acquisition pipeline.
//!
//! Resolves a name to a [`Player`]: a fresh stored record wins, otherwise a
//! [`ProfileSource`] supplies the raw profile, which is aggregated into a
//! rank score, turned into a player and saved.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::calculate::{history_from_map, RankEstimate};
use crate::config::ScoringConfig;
use crate::models::{ParseError, Player, RoleHistogram};
use crate::storage::{PlayerStore, StorageError};

/// Errors raised by a profile source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("No profile found for {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed profile: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Not enough ranked data to score {0}")]
    InsufficientData(String),
}

/// Upstream data for one player, as an acquisition layer produces it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProfile {
    /// Season id (`"S2024 S2"`) to tier string or `"Unranked"`.
    #[serde(default)]
    pub seasons: BTreeMap<String, String>,
    /// Tier estimates of recent matches, most recent first.
    #[serde(default)]
    pub recent_matches: Vec<String>,
    #[serde(default)]
    pub champs: RoleHistogram,
    #[serde(default)]
    pub mastery: Vec<String>,
}

/// Where raw profiles come from.
pub trait ProfileSource {
    fn fetch(&self, name: &str) -> Result<RawProfile, SourceError>;
}

/// Reads `<dir>/<name>.json`, with `#` in the name written as `-`.
#[derive(Debug, Clone)]
pub struct FileProfileSource {
    dir: PathBuf,
}

impl FileProfileSource {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name.replace('#', "-")))
    }
}

impl ProfileSource for FileProfileSource {
    fn fetch(&self, name: &str) -> Result<RawProfile, SourceError> {
        let path = self.path_for(name);
        if !path.exists() {
            return Err(SourceError::NotFound(name.to_string()));
        }
        let content = fs::read_to_string(&path)?;
        debug!("Read profile for {} from {:?}", name, path);
        Ok(serde_json::from_str(&content)?)
    }
}

/// Aggregate a raw profile's rank data, honoring the recent match limit.
pub fn score_profile(
    profile: &RawProfile,
    scoring: &ScoringConfig,
) -> Result<RankEstimate, ParseError> {
    let aggregator = scoring.aggregator()?;
    let history = history_from_map(&profile.seasons);
    let limit = profile.recent_matches.len().min(scoring.max_recent_matches);
    aggregator.aggregate(&history, &profile.recent_matches[..limit])
}

/// Build a player from a raw profile. Fails with
/// [`IngestError::InsufficientData`] when there is nothing to score.
pub fn build_player(
    name: &str,
    profile: RawProfile,
    scoring: &ScoringConfig,
) -> Result<Player, IngestError> {
    let rank_score = match score_profile(&profile, scoring)? {
        RankEstimate::Score { value, .. } => value,
        RankEstimate::NoData => return Err(IngestError::InsufficientData(name.to_string())),
    };

    let mut mastery = profile.mastery;
    mastery.truncate(scoring.max_mastery);

    Ok(Player::new(
        name,
        rank_score,
        profile.champs,
        mastery,
        &scoring.role_settings(),
    )?)
}

/// Resolves names to players through the store and a profile source.
pub struct Ingestor<'a> {
    store: &'a PlayerStore,
    source: &'a dyn ProfileSource,
    scoring: &'a ScoringConfig,
}

impl<'a> Ingestor<'a> {
    pub fn new(
        store: &'a PlayerStore,
        source: &'a dyn ProfileSource,
        scoring: &'a ScoringConfig,
    ) -> Self {
        Self {
            store,
            source,
            scoring,
        }
    }

    /// A fresh stored player, or a newly acquired one.
    pub fn resolve(&self, name: &str) -> Result<Player, IngestError> {
        match self.store.load_fresh(name)? {
            Some(player) => Ok(player),
            None => self.acquire(name),
        }
    }

    /// Acquire from the source regardless of what is stored, and save with a
    /// new timestamp.
    pub fn acquire(&self, name: &str) -> Result<Player, IngestError> {
        info!("Acquiring profile for {}", name);
        let profile = self.source.fetch(name)?;
        let player = build_player(name, profile, self.scoring)?;
        self.store.save(&player, true)?;
        info!(
            "Stored {} at {} ({:.2})",
            player.name, player.rank_str, player.rank_score
        );
        Ok(player)
    }
}
