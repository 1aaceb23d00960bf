//! Matchmaking: split ten players into two teams of five, one per lane.
//!
//! A run has two phases. [`TeamAssignor`] resolves who plays which lane,
//! then the balancer flips lane pairs between teams until the match diff
//! can't get closer to zero. [`TeamMaker`] drives both.

mod assignor;
mod balancer;

pub use assignor::{rank_contenders, TeamAssignor};
pub use balancer::{best_swap, optimize, swap_candidates, swap_value, SwapPlan};

use std::collections::HashSet;
use std::fmt;

use rand::Rng;
use thiserror::Error;
use tracing::info;

use crate::models::{decode, Assignment, LaneDiffs, Player, Role};

/// Players per match.
pub const LOBBY_SIZE: usize = 10;

/// Matchmaking errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("Expected 10 players, got {0}")]
    InvalidPlayerCount(usize),

    #[error("Player listed more than once: {0}")]
    DuplicatePlayer(String),
}

/// Check the lobby has exactly ten distinct players.
pub(crate) fn validate_lobby(players: &[Player]) -> Result<(), MatchError> {
    if players.len() != LOBBY_SIZE {
        return Err(MatchError::InvalidPlayerCount(players.len()));
    }
    let mut seen = HashSet::with_capacity(LOBBY_SIZE);
    for player in players {
        if !seen.insert(player.name.as_str()) {
            return Err(MatchError::DuplicatePlayer(player.name.clone()));
        }
    }
    Ok(())
}

/// Result of one matchmaking run.
#[derive(Debug, Clone)]
pub struct MatchOutcome<'p> {
    pub assignment: Assignment<'p>,
    pub lane_diffs: LaneDiffs,
    pub match_diff: f64,
    /// Match diff straight after role resolution, before any swap.
    pub initial_match_diff: f64,
    /// Lanes whose pairs switched teams.
    pub swapped: Vec<Role>,
    /// Players pushed out of a lane at least once, with the count.
    pub displacements: Vec<(String, u32)>,
}

impl MatchOutcome<'_> {
    /// Names per team in lane order.
    pub fn team_names(&self, side: usize) -> Vec<&str> {
        self.assignment
            .team(side)
            .iter()
            .map(|p| p.name.as_str())
            .collect()
    }
}

impl fmt::Display for MatchOutcome<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<8} {:<28} {:<28} {:>7}", "Role", "Team 1", "Team 2", "Diff")?;
        for (role, [blue, red]) in self.assignment.iter() {
            let describe = |p: &Player| {
                let rank = decode(p.rank_for(role)).unwrap_or_else(|_| "?".to_string());
                format!("{} ({})", p.name, rank)
            };
            writeln!(
                f,
                "{:<8} {:<28} {:<28} {:>+7.2}",
                role.as_str(),
                describe(blue),
                describe(red),
                self.lane_diffs.display_diff(role)
            )?;
        }
        write!(f, "Match diff: {:+.2}", self.match_diff)?;
        if !self.swapped.is_empty() {
            let swapped: Vec<&str> = self.swapped.iter().map(|r| r.as_str()).collect();
            write!(
                f,
                " (was {:+.2}, swapped {})",
                self.initial_match_diff,
                swapped.join(", ")
            )?;
        }
        Ok(())
    }
}

/// Runs role resolution and swap optimization with an injected RNG.
pub struct TeamMaker<R> {
    rng: R,
}

impl<R: Rng> TeamMaker<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Build balanced teams. Each call uses a fresh tie-break cache so player
    /// edits between runs are always seen.
    pub fn make_teams<'p>(&mut self, players: &'p [Player]) -> Result<MatchOutcome<'p>, MatchError> {
        let mut assignor = TeamAssignor::new(players)?;
        let mut assignment = assignor.balance_roles(&mut self.rng);
        let initial_match_diff = assignment.lane_diffs().match_diff();

        let swapped = optimize(&mut assignment);
        let lane_diffs = assignment.lane_diffs();
        let match_diff = lane_diffs.match_diff();

        let displacements = players
            .iter()
            .zip(assignor.displacements())
            .filter(|(_, count)| **count > 0)
            .map(|(p, &count)| (p.name.clone(), count))
            .collect();

        info!(
            initial = initial_match_diff,
            final_diff = match_diff,
            swaps = swapped.len(),
            "teams made"
        );

        Ok(MatchOutcome {
            assignment,
            lane_diffs,
            match_diff,
            initial_match_diff,
            swapped,
            displacements,
        })
    }
}
