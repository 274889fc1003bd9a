//! RPI Rankings - Ratings Percentage Index for age-group soccer divisions
//!
//! This crate ranks the teams of a division from their match results using
//! RPI, with pluggable match sources, keyed storage and ranking history.

pub mod config;
pub mod error;
pub mod history;
pub mod rating;
pub mod source;
pub mod storage;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{RankingError, Result};
pub use types::*;

// Re-export key components
pub use history::{RankMovement, RankingHistory};
pub use rating::{RankingGenerator, Schedule};
pub use source::{MatchQuery, MatchSource};
pub use storage::{InMemoryRepository, Repository};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
