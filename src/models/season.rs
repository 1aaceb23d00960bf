//! Ranked seasons and recency weighting.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ParseError;

/// Number of ranked splits in a calendar year.
pub const SPLITS_PER_YEAR: i64 = 3;

/// Weight lost per split of age.
const DECAY_PER_SPLIT: f64 = 0.2;

/// Old seasons keep contributing a little instead of vanishing.
const MIN_WEIGHT: f64 = 0.05;

/// A ranked split, e.g. `S2024 S2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Season {
    pub year: u32,
    pub split: u8,
}

impl Season {
    pub fn new(year: u32, split: u8) -> Self {
        Self { year, split }
    }

    /// Splits elapsed from `self` until `current`. Negative for future seasons.
    pub fn splits_until(&self, current: &Season) -> i64 {
        (current.year as i64 - self.year as i64) * SPLITS_PER_YEAR
            + (current.split as i64 - self.split as i64)
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{} S{}", self.year, self.split)
    }
}

impl FromStr for Season {
    type Err = ParseError;

    /// Accepts `S2024 S2`, a bare four digit year (`S2022`, split 3) and a
    /// legacy short season number (`S9`, `S13`: 2010 + n, split 3).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidSeason(s.to_string());
        let trimmed = s.trim();
        let body = trimmed
            .strip_prefix('S')
            .or_else(|| trimmed.strip_prefix('s'))
            .ok_or_else(invalid)?;

        let (year_str, split) = match body.split_once(char::is_whitespace) {
            Some((year, split)) => {
                let split = split.trim();
                let split = split
                    .strip_prefix('S')
                    .or_else(|| split.strip_prefix('s'))
                    .ok_or_else(invalid)?;
                let split: u8 = split.parse().map_err(|_| invalid())?;
                (year, split)
            }
            None => (body, 3),
        };

        if !(1..=3).contains(&split) || !year_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let year: u32 = match year_str.len() {
            4 => year_str.parse().map_err(|_| invalid())?,
            1 | 2 => 2010 + year_str.parse::<u32>().map_err(|_| invalid())?,
            _ => return Err(invalid()),
        };

        Ok(Season { year, split })
    }
}

/// Converts a season into a decay weight relative to the current season.
#[derive(Debug, Clone)]
pub struct RecencyWeighter {
    current: Season,
}

impl RecencyWeighter {
    pub fn new(current: Season) -> Self {
        Self { current }
    }

    pub fn current(&self) -> Season {
        self.current
    }

    /// 1.0 for the current split, 0.2 less per split of age, never below 0.05.
    /// Seasons after the current one count as current: their negative age is
    /// clamped to zero, so no season ever weighs more than 1.0.
    pub fn weight(&self, season: &Season) -> f64 {
        let age = season.splits_until(&self.current).max(0);
        (1.0 - DECAY_PER_SPLIT * age as f64).max(MIN_WEIGHT)
    }

    /// Parse a season identifier and weigh it.
    pub fn weight_of(&self, season: &str) -> Result<f64, ParseError> {
        Ok(self.weight(&season.parse()?))
    }
}
