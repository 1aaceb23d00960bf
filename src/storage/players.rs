//! Player records keyed by name, with a freshness window.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::jsonl::{JsonlReader, JsonlWriter};
use super::{StorageConfig, StorageError};
use crate::models::{serialize_lanes, Player, Role, RoleHistogram, RoleMap};

/// Persisted form of a [`Player`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    pub rank_score: f64,
    pub champs: RoleHistogram,
    #[serde(default)]
    pub mastery: Vec<String>,
    pub role_ranks: RoleMap<f64>,
    #[serde(serialize_with = "serialize_lanes")]
    pub role_chances: RoleMap<u32>,
    pub preferred_roles: Vec<Role>,
    pub added_date: DateTime<Utc>,
}

impl PlayerRecord {
    pub fn from_player(player: &Player, added_date: DateTime<Utc>) -> Self {
        Self {
            name: player.name.clone(),
            rank_score: player.rank_score,
            champs: player.champs.clone(),
            mastery: player.mastery.clone(),
            role_ranks: player.role_ranks.clone(),
            role_chances: player.role_chances.clone(),
            preferred_roles: player.preferred_roles.clone(),
            added_date,
        }
    }

    /// Rehydrate the player. Role data is restored as stored and the
    /// headline score re-derived from the first preference.
    pub fn into_player(self, max_chance: u32) -> Result<Player, StorageError> {
        let name = self.name;
        Player::restore(
            &name,
            self.champs,
            self.mastery,
            self.role_ranks,
            self.role_chances,
            self.preferred_roles,
            max_chance,
        )
        .map_err(|source| StorageError::InvalidRecord { name, source })
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.added_date
    }
}

/// Human-readable age: "2 days, 3 hours", "1 minute", "less than 1 minute".
pub fn format_age(age: Duration) -> String {
    let days = age.num_days();
    let hours = age.num_hours() % 24;
    let minutes = age.num_minutes() % 60;

    let plural = |n: i64, unit: &str| format!("{} {}{}", n, unit, if n > 1 { "s" } else { "" });
    let parts: Vec<String> = [(days, "day"), (hours, "hour"), (minutes, "minute")]
        .into_iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, unit)| plural(n, unit))
        .collect();

    if parts.is_empty() {
        "less than 1 minute".to_string()
    } else {
        parts.join(", ")
    }
}

/// Name-keyed player records in a single JSONL file.
pub struct PlayerStore {
    reader: JsonlReader<PlayerRecord>,
    writer: JsonlWriter<PlayerRecord>,
    validity: Duration,
    max_chance: u32,
}

impl PlayerStore {
    /// `validity` is how long a record counts as fresh; `max_chance` is
    /// applied when rehydrating.
    pub fn new(config: &StorageConfig, validity: Duration, max_chance: u32) -> Self {
        let path = config.players_path();
        Self {
            reader: JsonlReader::new(path.clone()),
            writer: JsonlWriter::new(path),
            validity,
            max_chance,
        }
    }

    /// All records, sorted by name.
    pub fn records(&self) -> Result<Vec<PlayerRecord>, StorageError> {
        let mut records = self.reader.read_all()?;
        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }

    pub fn record(&self, name: &str) -> Result<Option<PlayerRecord>, StorageError> {
        Ok(self.reader.read_where(|r| r.name == name)?.pop())
    }

    /// Insert or replace a record, rewriting the file sorted by name.
    pub fn put(&self, record: PlayerRecord) -> Result<(), StorageError> {
        let mut records = self.records()?;
        records.retain(|r| r.name != record.name);
        records.push(record);
        records.sort_by(|a, b| a.name.cmp(&b.name));
        self.writer.write_all(&records)?;
        Ok(())
    }

    /// Save `player`. With `overwrite_time` false an existing record keeps
    /// its `added_date`, so manual edits don't extend the freshness window.
    pub fn save(&self, player: &Player, overwrite_time: bool) -> Result<(), StorageError> {
        let existing = if overwrite_time {
            None
        } else {
            self.record(&player.name)?.map(|r| r.added_date)
        };
        let added_date = existing.unwrap_or_else(Utc::now);

        debug!(player = %player.name, %added_date, "saving player");
        self.put(PlayerRecord::from_player(player, added_date))
    }

    /// Load a player regardless of age.
    pub fn load(&self, name: &str) -> Result<Option<Player>, StorageError> {
        self.record(name)?
            .map(|record| record.into_player(self.max_chance))
            .transpose()
    }

    /// Load a player only if their record is inside the validity window.
    pub fn load_fresh(&self, name: &str) -> Result<Option<Player>, StorageError> {
        self.load_fresh_at(name, Utc::now())
    }

    pub fn load_fresh_at(
        &self,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Player>, StorageError> {
        let Some(record) = self.record(name)? else {
            info!("No data found for {}", name);
            return Ok(None);
        };

        let age = record.age(now);
        if age > self.validity {
            warn!("Data for {} is stale ({} old)", name, format_age(age));
            return Ok(None);
        }

        info!("Data for {} found, {} old", name, format_age(age));
        record.into_player(self.max_chance).map(Some)
    }
}
