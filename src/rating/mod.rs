//! RPI computation
//!
//! `schedule` aggregates matches and implements the RPI formula;
//! `generator` turns a division's raw match records into a ranked list.

pub mod generator;
pub mod schedule;

// Re-export commonly used types
pub use generator::{build_rankings, build_schedule, rank_schedule, RankingGenerator};
pub use schedule::{RpiComponents, Schedule, TeamRecord};
