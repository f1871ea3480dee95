//! # services
//!
//! The application services of CleanSight: task matching, the claim/start/
//! complete lifecycle, reward computation, the leaderboard/badge aggregator
//! and perk redemption. Everything here talks to storage exclusively through
//! the port traits in `domains`.

pub mod aggregate;
pub mod catalog;
pub mod geo;
pub mod lifecycle;
pub mod matching;
pub mod redemption;
pub mod rewards;
