//! Match sources
//!
//! A match source turns a division/flight query into raw match records. The
//! ranking generator only depends on the `MatchSource` trait; the concrete
//! sources here read from a repository, from a JSON file, or wrap another
//! source with a TTL cache.

pub mod cache;
pub mod file;
pub mod repository;

use crate::error::Result;
use crate::types::MatchEvent;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use cache::CachedMatchSource;
pub use file::JsonFileMatchSource;
pub use repository::RepositoryMatchSource;

/// Which matches a ranking run needs
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchQuery {
    /// Division / age group label, e.g. "G2009"
    pub division: String,
    /// Competition flight, `None` accepts every flight
    pub flight: Option<String>,
}

impl MatchQuery {
    pub fn new(division: impl Into<String>) -> Self {
        Self {
            division: division.into(),
            flight: None,
        }
    }

    pub fn with_flight(mut self, flight: impl Into<String>) -> Self {
        self.flight = Some(flight.into());
        self
    }

    /// Whether a raw match record belongs to this query
    pub fn matches(&self, event: &MatchEvent) -> bool {
        event.division == self.division
            && self
                .flight
                .as_ref()
                .map_or(true, |flight| &event.flight == flight)
    }
}

impl fmt::Display for MatchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.flight {
            Some(flight) => write!(f, "{} {}", flight, self.division),
            None => write!(f, "{}", self.division),
        }
    }
}

/// Trait for anything that can supply match records for a division
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchSource: Send + Sync {
    /// Fetch the raw match records selected by `query`
    async fn fetch_matches(&self, query: &MatchQuery) -> Result<Vec<MatchEvent>>;
}
