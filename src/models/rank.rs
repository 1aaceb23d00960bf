//! Rank tiers and the tier/division <-> score codec.
//!
//! Scores live on a 0-36 scale. Every tier spans four points and divisions
//! run from 4 (lowest) to 1 (highest), so `Gold 4` is 12 and `Gold 1` is 15.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ParseError;

/// Highest encodable score (Challenger).
pub const MAX_SCORE: f64 = 36.0;

/// Named skill band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    Iron,
    Bronze,
    Silver,
    Gold,
    Platinum,
    Emerald,
    Diamond,
    Master,
    Grandmaster,
    Challenger,
}

impl Tier {
    pub const ALL: [Tier; 10] = [
        Tier::Iron,
        Tier::Bronze,
        Tier::Silver,
        Tier::Gold,
        Tier::Platinum,
        Tier::Emerald,
        Tier::Diamond,
        Tier::Master,
        Tier::Grandmaster,
        Tier::Challenger,
    ];

    /// Score of division 4 (or the bare tier) in this band.
    pub fn points(self) -> u32 {
        self as u32 * 4
    }

    pub fn name(self) -> &'static str {
        match self {
            Tier::Iron => "Iron",
            Tier::Bronze => "Bronze",
            Tier::Silver => "Silver",
            Tier::Gold => "Gold",
            Tier::Platinum => "Platinum",
            Tier::Emerald => "Emerald",
            Tier::Diamond => "Diamond",
            Tier::Master => "Master",
            Tier::Grandmaster => "Grandmaster",
            Tier::Challenger => "Challenger",
        }
    }

    /// The two topmost tiers print without a division at their base score.
    pub fn is_apex(self) -> bool {
        matches!(self, Tier::Grandmaster | Tier::Challenger)
    }

    fn from_points(points: u32) -> Option<Tier> {
        Tier::ALL.get((points / 4) as usize).copied()
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Tier {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tier::ALL
            .into_iter()
            .find(|tier| tier.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseError::UnknownTier(s.to_string()))
    }
}

/// Encode a rank string such as `"Gold 2"` or `"Challenger"` into a score.
pub fn encode(rank: &str) -> Result<f64, ParseError> {
    let mut parts = rank.split_whitespace();
    let tier: Tier = parts
        .next()
        .ok_or_else(|| ParseError::MalformedRank(rank.to_string()))?
        .parse()?;

    let offset = match parts.next() {
        Some(division) => {
            let division: u32 = division
                .parse()
                .map_err(|_| ParseError::InvalidDivision(rank.to_string()))?;
            if !(1..=4).contains(&division) {
                return Err(ParseError::InvalidDivision(rank.to_string()));
            }
            4 - division
        }
        None => 0,
    };

    if parts.next().is_some() {
        return Err(ParseError::MalformedRank(rank.to_string()));
    }

    let score = (tier.points() + offset) as f64;
    if score > MAX_SCORE {
        return Err(ParseError::InvalidDivision(rank.to_string()));
    }
    Ok(score)
}

/// Decode a score back into a rank string.
///
/// Fractional scores floor to the division they fall in: 13.9 is still
/// `Gold 3`. Apex tiers at their base score print bare.
pub fn decode(score: f64) -> Result<String, ParseError> {
    if !score.is_finite() || !(0.0..=MAX_SCORE).contains(&score) {
        return Err(ParseError::ScoreOutOfRange(score));
    }

    let whole = score.floor() as u32;
    let base = whole / 4 * 4;
    let tier = Tier::from_points(base).ok_or(ParseError::ScoreOutOfRange(score))?;
    let division = 4 - (whole - base);

    if tier.is_apex() && division == 4 {
        Ok(tier.name().to_string())
    } else {
        Ok(format!("{} {}", tier.name(), division))
    }
}

/// Round to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
