//! Core data models: roles, ranks, seasons, players and assignments.

mod assignment;
mod ids;
mod player;
pub mod rank;
mod role;
mod role_profile;
mod season;

pub use assignment::*;
pub use ids::*;
pub use player::*;
pub use rank::{decode, encode, Tier, MAX_SCORE};
pub use role::*;
pub use role_profile::*;
pub use season::*;

use thiserror::Error;

/// Malformed rank, season or role input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Unknown tier: {0}")]
    UnknownTier(String),

    #[error("Invalid division in rank: {0}")]
    InvalidDivision(String),

    #[error("Malformed rank string: {0:?}")]
    MalformedRank(String),

    #[error("Score {0} is outside the 0-36 rank scale")]
    ScoreOutOfRange(f64),

    #[error("Invalid season identifier: {0}")]
    InvalidSeason(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Malformed role edit (expected role=rank[=chance]): {0}")]
    MalformedEdit(String),
}
