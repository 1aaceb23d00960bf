//! Append-only history of balanced matches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::jsonl::{JsonlReader, JsonlWriter};
use super::{StorageConfig, StorageError};
use crate::matchmaking::MatchOutcome;
use crate::models::{LaneDiffs, MatchId, Role};

/// One lane of a saved match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneRecord {
    pub role: Role,
    pub team1: String,
    pub team2: String,
    pub team1_score: f64,
    pub team2_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: MatchId,
    pub created_at: DateTime<Utc>,
    pub lanes: Vec<LaneRecord>,
    pub lane_diffs: LaneDiffs,
    pub match_diff: f64,
    #[serde(default)]
    pub swapped: Vec<Role>,
}

impl MatchRecord {
    pub fn from_outcome(outcome: &MatchOutcome<'_>, created_at: DateTime<Utc>) -> Self {
        let lanes: Vec<LaneRecord> = outcome
            .assignment
            .iter()
            .map(|(role, [blue, red])| LaneRecord {
                role,
                team1: blue.name.clone(),
                team2: red.name.clone(),
                team1_score: blue.rank_for(role),
                team2_score: red.rank_for(role),
            })
            .collect();

        let names: Vec<&str> = lanes
            .iter()
            .flat_map(|lane| [lane.team1.as_str(), lane.team2.as_str()])
            .collect();
        let id = MatchId::for_match(&names, &created_at.to_rfc3339());

        Self {
            id,
            created_at,
            lanes,
            lane_diffs: outcome.lane_diffs,
            match_diff: outcome.match_diff,
            swapped: outcome.swapped.clone(),
        }
    }
}

/// The match history file.
pub struct MatchLog {
    reader: JsonlReader<MatchRecord>,
    writer: JsonlWriter<MatchRecord>,
}

impl MatchLog {
    pub fn new(config: &StorageConfig) -> Self {
        let path = config.matches_path();
        Self {
            reader: JsonlReader::new(path.clone()),
            writer: JsonlWriter::new(path),
        }
    }

    pub fn append(&self, record: &MatchRecord) -> Result<(), StorageError> {
        self.writer.append(record)?;
        info!(id = %record.id, "match saved");
        Ok(())
    }

    /// The `limit` most recent matches, newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<MatchRecord>, StorageError> {
        let mut records = self.reader.read_all()?;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(limit);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchmaking::TeamMaker;
    use crate::models::{Player, RoleHistogram, RoleSettings};
    use chrono::Duration;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::TempDir;

    fn lobby() -> Vec<Player> {
        (0..10)
            .map(|i| {
                Player::new(
                    &format!("p{i}#EUW"),
                    6.0 + i as f64 * 2.5,
                    RoleHistogram::new(),
                    Vec::new(),
                    &RoleSettings::default(),
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_record_from_outcome() {
        let players = lobby();
        let outcome = TeamMaker::new(StdRng::seed_from_u64(9))
            .make_teams(&players)
            .unwrap();
        let now = Utc::now();
        let record = MatchRecord::from_outcome(&outcome, now);

        assert_eq!(record.lanes.len(), 5);
        assert_eq!(record.match_diff, outcome.match_diff);
        for lane in &record.lanes {
            let diff = lane.team2_score - lane.team1_score;
            assert_eq!(diff, outcome.lane_diffs.get(lane.role));
        }
        // Same lobby at the same instant hashes alike
        assert_eq!(record.id, MatchRecord::from_outcome(&outcome, now).id);
    }

    #[test]
    fn test_log_append_and_recent() {
        let temp_dir = TempDir::new().unwrap();
        let log = MatchLog::new(&StorageConfig::new(temp_dir.path().to_path_buf()));
        let players = lobby();
        let outcome = TeamMaker::new(StdRng::seed_from_u64(1))
            .make_teams(&players)
            .unwrap();

        let start = Utc::now();
        for offset in 0..3 {
            let record = MatchRecord::from_outcome(&outcome, start + Duration::minutes(offset));
            log.append(&record).unwrap();
        }

        let recent = log.recent(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].created_at, start + Duration::minutes(2));
        assert!(recent[0].created_at > recent[1].created_at);
        assert_eq!(log.recent(10).unwrap().len(), 3);
    }
}
