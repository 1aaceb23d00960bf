//! Role preferences and role chances derived from recent play.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{serialize_lanes, Role, RoleMap};

/// Share of recent games a role needs before it counts as preferred.
pub const DEFAULT_PREFERENCE_THRESHOLD: f64 = 0.25;

/// Ceiling for any single role chance.
pub const DEFAULT_MAX_CHANCE: u32 = 90;

/// Champions played per role over the recent lookback window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleHistogram {
    #[serde(serialize_with = "serialize_lanes")]
    champs: RoleMap<BTreeMap<String, u32>>,
}

impl RoleHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `games` played on `champion` in `role`. `Flex` is ignored.
    pub fn record(&mut self, role: Role, champion: &str, games: u32) {
        if role.is_flex() {
            return;
        }
        *self.champs[role].entry(champion.to_string()).or_default() += games;
    }

    pub fn with(mut self, role: Role, champion: &str, games: u32) -> Self {
        self.record(role, champion, games);
        self
    }

    /// Games played in `role`.
    pub fn games(&self, role: Role) -> u32 {
        self.champs[role].values().sum()
    }

    /// Games played across all lanes.
    pub fn total(&self) -> u32 {
        Role::LANES.iter().map(|&role| self.games(role)).sum()
    }

    pub fn champions(&self, role: Role) -> &BTreeMap<String, u32> {
        &self.champs[role]
    }

    /// Most played champions in a role, highest first.
    pub fn top_champions(&self, role: Role, limit: usize) -> Vec<(&str, u32)> {
        let mut champs: Vec<(&str, u32)> = self.champs[role]
            .iter()
            .map(|(name, &count)| (name.as_str(), count))
            .collect();
        champs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        champs.truncate(limit);
        champs
    }
}

/// Preferred roles and role chances derived from a histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleProfile {
    pub preferred_roles: Vec<Role>,
    pub role_chances: RoleMap<u32>,
}

impl RoleProfile {
    /// Roles played in more than `threshold` of games become preferred, most
    /// played first. Chances are the floor-leaning rounded share of games.
    /// The result has already been through [`validate_chances`].
    pub fn from_histogram(histogram: &RoleHistogram, threshold: f64, max_chance: u32) -> Self {
        let total = histogram.total().max(1) as f64;

        let mut role_chances = RoleMap::filled(0u32);
        for role in Role::LANES {
            let games = histogram.games(role);
            if games > 0 {
                let share = 100.0 * games as f64 / total - 0.5;
                role_chances[role] = share.round_ties_even().max(0.0) as u32;
            }
        }

        let mut preferred: Vec<Role> = Role::LANES
            .into_iter()
            .filter(|&role| histogram.games(role) as f64 > total * threshold)
            .collect();
        preferred.sort_by_key(|&role| std::cmp::Reverse(histogram.games(role)));

        let mut profile = Self {
            preferred_roles: normalize_preferences(preferred),
            role_chances,
        };
        validate_chances(&profile.preferred_roles, &mut profile.role_chances, max_chance);
        profile
    }
}

/// Deduplicate roles and make sure the list ends in `Flex` unless every lane
/// is listed explicitly.
pub fn normalize_preferences(roles: impl IntoIterator<Item = Role>) -> Vec<Role> {
    let mut explicit: Vec<Role> = Vec::with_capacity(6);
    for role in roles {
        if !role.is_flex() && !explicit.contains(&role) {
            explicit.push(role);
        }
    }
    if explicit.len() < Role::LANES.len() {
        explicit.push(Role::Flex);
    }
    explicit
}

/// Force `chances` into a distribution over the five lanes that sums to 100.
///
/// `max_chance` is held to `20..=100`, since five lanes capped any lower could
/// not reach 100. Explicit roles, walked in preference order, are clamped to
/// `[1, max_chance]` while keeping 1% in reserve for every explicit slot that
/// could still follow. On reaching `Flex` the remaining budget is split evenly
/// across lanes that were not listed. If every lane is explicit, any leftover
/// is handed out 1% at a time in preference order to roles below the cap.
/// A list without `Flex` that misses lanes is treated as if it ended in one.
pub fn validate_chances(preferred: &[Role], chances: &mut RoleMap<u32>, max_chance: u32) {
    let max_chance = max_chance.clamp(20, 100);
    let explicit: Vec<Role> = preferred.iter().copied().filter(|r| !r.is_flex()).collect();

    chances[Role::Flex] = 0;

    let mut remaining: u32 = 100;
    for (i, &role) in explicit.iter().enumerate() {
        let reserve = 4u32.saturating_sub(i as u32);
        let chance = chances[role]
            .clamp(1, max_chance)
            .min(remaining.saturating_sub(reserve));
        chances[role] = chance;
        remaining -= chance;
    }

    let unlisted: Vec<Role> = Role::LANES
        .into_iter()
        .filter(|role| !explicit.contains(role))
        .collect();

    if !unlisted.is_empty() {
        let count = unlisted.len() as u32;
        let share = remaining / count;
        let extra = remaining % count;
        for (j, &role) in unlisted.iter().enumerate() {
            chances[role] = share + u32::from((j as u32) < extra);
        }
        return;
    }

    while remaining > 0 {
        let mut handed_out = false;
        for &role in &explicit {
            if remaining == 0 {
                break;
            }
            if chances[role] < max_chance {
                chances[role] += 1;
                remaining -= 1;
                handed_out = true;
            }
        }
        if !handed_out {
            break;
        }
    }
}
