//! The player entity: headline score, per-role scores and role preferences.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use super::rank::{decode, encode};
use super::role_profile::{normalize_preferences, validate_chances, RoleHistogram, RoleProfile};
use super::{ParseError, Role, RoleMap};

/// Knobs for deriving and validating role preferences.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoleSettings {
    pub preference_threshold: f64,
    pub max_chance: u32,
}

impl Default for RoleSettings {
    fn default() -> Self {
        Self {
            preference_threshold: super::DEFAULT_PREFERENCE_THRESHOLD,
            max_chance: super::DEFAULT_MAX_CHANCE,
        }
    }
}

/// One row of a manual role edit: the role, the rank to use there and the
/// chance of drawing it. `Flex` rows carry no chance.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleEdit {
    pub role: Role,
    pub rank: String,
    pub chance: Option<u32>,
}

impl RoleEdit {
    pub fn new(role: Role, rank: &str, chance: u32) -> Self {
        Self {
            role,
            rank: rank.to_string(),
            chance: (!role.is_flex()).then_some(chance),
        }
    }

    pub fn flex(rank: &str) -> Self {
        Self {
            role: Role::Flex,
            rank: rank.to_string(),
            chance: None,
        }
    }
}

impl FromStr for RoleEdit {
    type Err = ParseError;

    /// `adc=Gold 2=70` or `flex=Silver 1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('=');
        let role: Role = parts
            .next()
            .ok_or_else(|| ParseError::MalformedEdit(s.to_string()))?
            .parse()?;
        let rank = parts
            .next()
            .map(str::trim)
            .filter(|rank| !rank.is_empty())
            .ok_or_else(|| ParseError::MalformedEdit(s.to_string()))?;
        let chance = match parts.next() {
            Some(chance) => chance
                .trim()
                .parse::<u32>()
                .map_err(|_| ParseError::MalformedEdit(s.to_string()))?,
            None => 0,
        };
        if parts.next().is_some() {
            return Err(ParseError::MalformedEdit(s.to_string()));
        }
        encode(rank)?;

        Ok(RoleEdit::new(role, rank, chance))
    }
}

/// A player, addressable by `name#tag`.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub name: String,
    /// Score of the first preferred role.
    pub rank_score: f64,
    pub rank_str: String,
    /// Per-role scores. Roles nobody customized share the `Flex` value.
    pub role_ranks: RoleMap<f64>,
    /// Percent chance of drawing each lane; sums to 100.
    pub role_chances: RoleMap<u32>,
    /// Explicit preferences in order, terminated by `Flex` unless all five
    /// lanes are listed.
    pub preferred_roles: Vec<Role>,
    pub champs: RoleHistogram,
    pub mastery: Vec<String>,
}

impl Player {
    /// Build a player from freshly acquired data. Every role starts at
    /// `rank_score`; preferences and chances come from the histogram.
    pub fn new(
        name: &str,
        rank_score: f64,
        champs: RoleHistogram,
        mastery: Vec<String>,
        settings: &RoleSettings,
    ) -> Result<Self, ParseError> {
        let rank_str = decode(rank_score)?;
        let profile = RoleProfile::from_histogram(
            &champs,
            settings.preference_threshold,
            settings.max_chance,
        );

        Ok(Self {
            name: name.to_string(),
            rank_score,
            rank_str,
            role_ranks: RoleMap::filled(rank_score),
            role_chances: profile.role_chances,
            preferred_roles: profile.preferred_roles,
            champs,
            mastery,
        })
    }

    /// Rebuild a player from persisted state. Role data is taken as stored;
    /// the headline score is re-derived from the first preferred role.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        name: &str,
        champs: RoleHistogram,
        mastery: Vec<String>,
        role_ranks: RoleMap<f64>,
        role_chances: RoleMap<u32>,
        preferred_roles: Vec<Role>,
        max_chance: u32,
    ) -> Result<Self, ParseError> {
        let mut player = Self {
            name: name.to_string(),
            rank_score: 0.0,
            rank_str: String::new(),
            role_ranks,
            role_chances,
            preferred_roles: normalize_preferences(preferred_roles),
            champs,
            mastery,
        };
        player.refresh_headline()?;
        player.validate_chances(max_chance);
        Ok(player)
    }

    /// Score used when this player fills `role`.
    pub fn rank_for(&self, role: Role) -> f64 {
        self.role_ranks[role]
    }

    pub fn primary_role(&self) -> Role {
        self.preferred_roles.first().copied().unwrap_or(Role::Flex)
    }

    /// Explicit (non-flex) preferences.
    pub fn explicit_roles(&self) -> impl Iterator<Item = Role> + '_ {
        self.preferred_roles.iter().copied().filter(|r| !r.is_flex())
    }

    pub fn validate_chances(&mut self, max_chance: u32) {
        validate_chances(&self.preferred_roles, &mut self.role_chances, max_chance);
    }

    /// Replace preferences, per-role ranks and chances from an ordered edit
    /// list. Lanes missing from the list inherit the flex rank. A role score
    /// is only re-encoded when its printed rank actually changed, so
    /// fractional scores survive an edit that keeps the same tier.
    ///
    /// Nothing is modified if any rank string fails to parse.
    pub fn update_roles(&mut self, edits: &[RoleEdit], max_chance: u32) -> Result<(), ParseError> {
        let mut requested: RoleMap<Option<(String, f64, u32)>> = RoleMap::default();
        for edit in edits {
            let score = encode(&edit.rank)?;
            if requested[edit.role].is_none() {
                requested[edit.role] = Some((edit.rank.clone(), score, edit.chance.unwrap_or(0)));
            }
        }

        let flex = match requested[Role::Flex].clone() {
            Some((rank, score, _)) => (rank, score),
            None => {
                let score = self.role_ranks[Role::Flex];
                (decode(score)?, score)
            }
        };

        for role in Role::ALL {
            let (rank, score) = match &requested[role] {
                Some((rank, score, _)) => (rank.as_str(), *score),
                None => (flex.0.as_str(), flex.1),
            };
            let unchanged = decode(self.role_ranks[role]).ok() == Some(decode(score)?);
            if !unchanged {
                debug!(player = %self.name, role = %role, rank, "re-encoding role rank");
                self.role_ranks[role] = score;
            }
        }

        self.preferred_roles = normalize_preferences(edits.iter().map(|edit| edit.role));
        self.role_chances = RoleMap::from_fn(|role| {
            requested[role]
                .as_ref()
                .map(|(_, _, chance)| *chance)
                .unwrap_or(0)
        });
        self.validate_chances(max_chance);
        self.refresh_headline()
    }

    fn refresh_headline(&mut self) -> Result<(), ParseError> {
        self.rank_score = self.role_ranks[self.primary_role()];
        self.rank_str = decode(self.rank_score)?;
        Ok(())
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {} ({:.2})", self.name, self.rank_str, self.rank_score)?;
        if !self.mastery.is_empty() {
            writeln!(f, "  Highest mastery champs: {}", self.mastery.join(", "))?;
        }
        let preferred: Vec<&str> = self.preferred_roles.iter().map(|r| r.as_str()).collect();
        writeln!(f, "  Preferred roles: {}", preferred.join(", "))?;
        let chances: Vec<String> = self
            .role_chances
            .lanes()
            .map(|(role, chance)| format!("{} {}%", role, chance))
            .collect();
        writeln!(f, "  Role chances: {}", chances.join(", "))?;
        for role in self.explicit_roles() {
            let rank = decode(self.rank_for(role)).unwrap_or_else(|_| "?".to_string());
            writeln!(f, "  {}: {}", role, rank)?;
        }
        Ok(())
    }
}
