//! Filled role assignments and the lane differentials derived from them.

use serde::{Deserialize, Serialize};

use super::{Player, Role};

/// Two players per lane: slot 0 plays for team 0, slot 1 for team 1.
///
/// Only ever built complete, so lane diffs can always be computed.
#[derive(Debug, Clone)]
pub struct Assignment<'p> {
    lanes: [[&'p Player; 2]; 5],
}

impl<'p> Assignment<'p> {
    pub fn new(lanes: [[&'p Player; 2]; 5]) -> Self {
        Self { lanes }
    }

    /// The pair filling `role`. `role` must be a lane.
    pub fn pair(&self, role: Role) -> [&'p Player; 2] {
        debug_assert!(!role.is_flex(), "flex is not a lane");
        self.lanes[role.index()]
    }

    /// Swap which team each occupant of `role` plays for.
    pub fn swap(&mut self, role: Role) {
        debug_assert!(!role.is_flex(), "flex is not a lane");
        self.lanes[role.index()].reverse();
    }

    /// The five players of one side, in lane order.
    pub fn team(&self, side: usize) -> [&'p Player; 5] {
        self.lanes.map(|pair| pair[side])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, [&'p Player; 2])> + '_ {
        Role::LANES.into_iter().map(move |role| (role, self.pair(role)))
    }

    /// Lane where `name` plays, with their side.
    pub fn position_of(&self, name: &str) -> Option<(Role, usize)> {
        self.iter().find_map(|(role, pair)| {
            pair.iter()
                .position(|p| p.name == name)
                .map(|side| (role, side))
        })
    }

    pub fn lane_diffs(&self) -> LaneDiffs {
        let diff = |role: Role| {
            let [blue, red] = self.pair(role);
            red.rank_for(role) - blue.rank_for(role)
        };
        LaneDiffs::new(
            diff(Role::Top),
            diff(Role::Jungle),
            diff(Role::Mid),
            diff(Role::Adc),
            diff(Role::Supp),
        )
    }
}

/// Team 1 minus team 0, per lane. `bot` averages the adc and support diffs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LaneDiffs {
    pub top: f64,
    pub jungle: f64,
    pub mid: f64,
    pub adc: f64,
    pub supp: f64,
    pub bot: f64,
}

impl LaneDiffs {
    pub fn new(top: f64, jungle: f64, mid: f64, adc: f64, supp: f64) -> Self {
        Self {
            top,
            jungle,
            mid,
            adc,
            supp,
            bot: (adc + supp) / 2.0,
        }
    }

    pub fn get(&self, role: Role) -> f64 {
        match role {
            Role::Top => self.top,
            Role::Jungle => self.jungle,
            Role::Mid => self.mid,
            Role::Adc => self.adc,
            Role::Supp => self.supp,
            Role::Flex => self.bot,
        }
    }

    /// Diff shown for a role: adc and support report the shared bot lane.
    pub fn display_diff(&self, role: Role) -> f64 {
        if role.is_bot() {
            self.bot
        } else {
            self.get(role)
        }
    }

    /// Match-level differential. Adc and support only count through `bot`.
    pub fn match_diff(&self) -> f64 {
        self.top + self.jungle + self.mid + self.bot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RoleHistogram, RoleSettings};

    fn player(name: &str, score: f64) -> Player {
        Player::new(
            name,
            score,
            RoleHistogram::new(),
            Vec::new(),
            &RoleSettings::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_lane_diffs_match_diff_excludes_bot_roles() {
        let diffs = LaneDiffs::new(5.0, -3.0, 2.0, 4.0, -2.0);
        assert_eq!(diffs.bot, 1.0);
        assert_eq!(diffs.match_diff(), 5.0);
        assert_eq!(diffs.display_diff(Role::Supp), 1.0);
        assert_eq!(diffs.display_diff(Role::Top), 5.0);
    }

    #[test]
    fn test_assignment_diffs_and_swap() {
        let players: Vec<Player> = (0..10)
            .map(|i| player(&format!("p{i}#NA1"), i as f64 * 2.0))
            .collect();
        let lanes = [0, 1, 2, 3, 4].map(|lane| [&players[lane * 2], &players[lane * 2 + 1]]);
        let mut assignment = Assignment::new(lanes);

        let diffs = assignment.lane_diffs();
        assert_eq!(diffs.top, 2.0);
        assert_eq!(diffs.bot, 2.0);
        assert_eq!(diffs.match_diff(), 8.0);

        assignment.swap(Role::Top);
        assert_eq!(assignment.lane_diffs().top, -2.0);
        assert_eq!(assignment.position_of("p0#NA1"), Some((Role::Top, 1)));
        assert_eq!(assignment.team(0)[0].name, "p1#NA1");
        assert_eq!(assignment.position_of("ghost#NA1"), None);
    }
}
