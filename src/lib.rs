//! # Lane Balancer
//!
//! Scores League of Legends players from their ranked history and splits a
//! ten player lobby into two teams of five, one player per lane each.
//!
//! ## Architecture
//!
//! - **models**: Roles, rank encoding, seasons, players and assignments
//! - **calculate**: Rank aggregation over seasons and recent matches
//! - **matchmaking**: Role resolution and swap optimization
//! - **storage**: JSONL player store and match history
//! - **ingest**: Profile sources and the player acquisition pipeline
//! - **config**: Configuration loading and validation

pub mod calculate;
pub mod config;
pub mod ingest;
pub mod matchmaking;
pub mod models;
pub mod storage;

pub use models::*;
