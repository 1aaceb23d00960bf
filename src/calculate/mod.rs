//! Rank aggregation.
//!
//! Folds a player's ranked history and recent match tiers into one score:
//! - Season ranks are averaged with recency weights
//! - Recent match tier estimates are averaged flat
//! - The two averages are blended 65/35 in favor of official ranks

use std::collections::BTreeMap;

use tracing::debug;

use crate::models::rank::round_to;
use crate::models::{encode, ParseError, RecencyWeighter, Season};

/// Marker the rank history uses for seasons without a placement.
pub const UNRANKED: &str = "Unranked";

/// Default weight of the season average in the final blend.
pub const SEASON_WEIGHT: f64 = 0.65;

/// Default weight of the recent match average in the final blend.
pub const GAME_WEIGHT: f64 = 0.35;

/// One season of a player's rank history.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonRankEntry {
    pub season: String,
    pub tier: String,
}

impl SeasonRankEntry {
    pub fn new(season: &str, tier: &str) -> Self {
        Self {
            season: season.to_string(),
            tier: tier.to_string(),
        }
    }

    pub fn is_unranked(&self) -> bool {
        self.tier.trim().eq_ignore_ascii_case(UNRANKED)
    }
}

/// Convert a season → tier map into entries.
pub fn history_from_map(map: &BTreeMap<String, String>) -> Vec<SeasonRankEntry> {
    map.iter()
        .map(|(season, tier)| SeasonRankEntry::new(season, tier))
        .collect()
}

/// Outcome of aggregation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RankEstimate {
    /// Blended score with the averages it came from.
    Score {
        value: f64,
        season_avg: Option<f64>,
        game_avg: Option<f64>,
    },
    /// Neither ranked seasons nor recent matches were available.
    NoData,
}

impl RankEstimate {
    pub fn value(&self) -> Option<f64> {
        match self {
            RankEstimate::Score { value, .. } => Some(*value),
            RankEstimate::NoData => None,
        }
    }
}

/// Combines season history and recent matches into a single rank score.
#[derive(Debug, Clone)]
pub struct RankAggregator {
    weighter: RecencyWeighter,
    season_weight: f64,
    game_weight: f64,
}

impl RankAggregator {
    pub fn new(current_season: Season) -> Self {
        Self::with_weights(current_season, SEASON_WEIGHT, GAME_WEIGHT)
    }

    pub fn with_weights(current_season: Season, season_weight: f64, game_weight: f64) -> Self {
        Self {
            weighter: RecencyWeighter::new(current_season),
            season_weight,
            game_weight,
        }
    }

    /// Recency-weighted mean of ranked seasons. `None` when every season is
    /// unranked or the history is empty.
    pub fn season_average(&self, history: &[SeasonRankEntry]) -> Result<Option<f64>, ParseError> {
        let mut total_score = 0.0;
        let mut total_weight = 0.0;

        for entry in history.iter().filter(|e| !e.is_unranked()) {
            let weight = self.weighter.weight_of(&entry.season)?;
            total_score += encode(&entry.tier)? * weight;
            total_weight += weight;
        }

        if total_weight > 0.0 {
            Ok(Some(total_score / total_weight))
        } else {
            Ok(None)
        }
    }

    /// Flat mean of recent match tier estimates. `None` when there are none.
    pub fn game_average<S: AsRef<str>>(&self, samples: &[S]) -> Result<Option<f64>, ParseError> {
        if samples.is_empty() {
            return Ok(None);
        }
        let mut total = 0.0;
        for sample in samples {
            total += encode(sample.as_ref())?;
        }
        Ok(Some(total / samples.len() as f64))
    }

    /// Blend both averages. A missing source contributes nothing; when both
    /// are missing the result is [`RankEstimate::NoData`].
    pub fn aggregate<S: AsRef<str>>(
        &self,
        history: &[SeasonRankEntry],
        samples: &[S],
    ) -> Result<RankEstimate, ParseError> {
        let season_avg = self.season_average(history)?;
        let game_avg = self.game_average(samples)?;

        if season_avg.is_none() && game_avg.is_none() {
            debug!("no ranked seasons or recent matches to aggregate");
            return Ok(RankEstimate::NoData);
        }

        let blended = self.season_weight * season_avg.unwrap_or(0.0)
            + self.game_weight * game_avg.unwrap_or(0.0);
        let value = round_to(blended, 5);
        debug!(?season_avg, ?game_avg, value, "aggregated rank");

        Ok(RankEstimate::Score {
            value,
            season_avg,
            game_avg,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregator() -> RankAggregator {
        RankAggregator::new(Season::new(2025, 1))
    }

    #[test]
    fn test_current_season_only() {
        let history = vec![SeasonRankEntry::new("S2025 S1", "Gold 4")];
        let estimate = aggregator().aggregate::<&str>(&history, &[]).unwrap();

        assert_eq!(estimate.value(), Some(7.8));
    }

    #[test]
    fn test_season_average_weights_recent_seasons() {
        let history = vec![
            SeasonRankEntry::new("S2025 S1", "Gold 4"),
            SeasonRankEntry::new("S2024 S3", "Platinum 4"),
        ];
        // (12 * 1.0 + 16 * 0.8) / 1.8
        let avg = aggregator().season_average(&history).unwrap().unwrap();
        assert!((avg - 24.8 / 1.8).abs() < 1e-9);
    }

    #[test]
    fn test_unranked_seasons_are_skipped() {
        let history = vec![
            SeasonRankEntry::new("S2025 S1", "Unranked"),
            SeasonRankEntry::new("S2024 S3", "Silver 2"),
        ];
        let avg = aggregator().season_average(&history).unwrap();
        assert_eq!(avg, Some(10.0));

        let only_unranked = vec![SeasonRankEntry::new("S2025 S1", "unranked")];
        assert_eq!(aggregator().season_average(&only_unranked).unwrap(), None);
    }

    #[test]
    fn test_game_average() {
        let samples = ["Gold 4", "Gold 2", "Silver 1"];
        let avg = aggregator().game_average(&samples).unwrap().unwrap();
        assert!((avg - (12.0 + 14.0 + 11.0) / 3.0).abs() < 1e-9);
        assert_eq!(aggregator().game_average::<&str>(&[]).unwrap(), None);
    }

    #[test]
    fn test_blend_of_both_sources() {
        let history = vec![SeasonRankEntry::new("S2025 S1", "Platinum 4")];
        let samples = vec!["Gold 4".to_string(), "Gold 4".to_string()];
        let estimate = aggregator().aggregate(&history, &samples).unwrap();

        match estimate {
            RankEstimate::Score {
                value,
                season_avg,
                game_avg,
            } => {
                assert_eq!(value, 14.6);
                assert_eq!(season_avg, Some(16.0));
                assert_eq!(game_avg, Some(12.0));
            }
            RankEstimate::NoData => panic!("expected a score"),
        }
    }

    #[test]
    fn test_no_data() {
        let history = vec![SeasonRankEntry::new("S2024 S1", "Unranked")];
        let estimate = aggregator().aggregate::<&str>(&history, &[]).unwrap();
        assert_eq!(estimate, RankEstimate::NoData);
        assert_eq!(estimate.value(), None);
    }

    #[test]
    fn test_parse_errors_surface() {
        let bad_tier = vec![SeasonRankEntry::new("S2025 S1", "Wood 1")];
        assert!(matches!(
            aggregator().aggregate::<&str>(&bad_tier, &[]),
            Err(ParseError::UnknownTier(_))
        ));

        let bad_season = vec![SeasonRankEntry::new("2025", "Gold 1")];
        assert!(matches!(
            aggregator().aggregate::<&str>(&bad_season, &[]),
            Err(ParseError::InvalidSeason(_))
        ));

        assert!(aggregator().aggregate(&[], &["Gold 7"]).is_err());
    }

    #[test]
    fn test_history_from_map() {
        let mut map = BTreeMap::new();
        map.insert("S2024 S2".to_string(), "Gold 1".to_string());
        map.insert("S2022".to_string(), "Unranked".to_string());
        let history = history_from_map(&map);
        assert_eq!(history.len(), 2);
        assert!(history.iter().any(|e| e.is_unranked()));
    }
}
