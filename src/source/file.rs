//! Match source reading a JSON export of match records

use super::{MatchQuery, MatchSource};
use crate::error::{RankingError, Result};
use crate::types::MatchEvent;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Reads a JSON array of match records from disk on every fetch
#[derive(Debug, Clone)]
pub struct JsonFileMatchSource {
    path: PathBuf,
}

impl JsonFileMatchSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<MatchEvent>> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            RankingError::SourceUnavailable {
                message: format!("failed to read {}: {}", self.path.display(), e),
            }
        })?;

        let events: Vec<MatchEvent> =
            serde_json::from_str(&contents).map_err(|e| RankingError::SourceUnavailable {
                message: format!("failed to parse {}: {}", self.path.display(), e),
            })?;

        info!(
            "Loaded {} match records from {}",
            events.len(),
            self.path.display()
        );
        Ok(events)
    }
}

#[async_trait]
impl MatchSource for JsonFileMatchSource {
    async fn fetch_matches(&self, query: &MatchQuery) -> Result<Vec<MatchEvent>> {
        let matches: Vec<MatchEvent> = self
            .load()
            .await?
            .into_iter()
            .filter(|event| query.matches(event))
            .collect();

        debug!("{} matches selected for {}", matches.len(), query);
        Ok(matches)
    }
}
