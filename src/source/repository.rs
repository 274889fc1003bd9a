//! Match source backed by a match repository

use super::{MatchQuery, MatchSource};
use crate::error::Result;
use crate::storage::Repository;
use crate::types::MatchEvent;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Serves matches previously synced into a repository
pub struct RepositoryMatchSource {
    matches: Arc<dyn Repository<MatchEvent>>,
}

impl RepositoryMatchSource {
    pub fn new(matches: Arc<dyn Repository<MatchEvent>>) -> Self {
        Self { matches }
    }
}

#[async_trait]
impl MatchSource for RepositoryMatchSource {
    async fn fetch_matches(&self, query: &MatchQuery) -> Result<Vec<MatchEvent>> {
        let mut matches = self.matches.find(&|event: &MatchEvent| query.matches(event))?;
        // Repository order is unspecified; keep results reproducible
        matches.sort_by_key(|event| event.match_id);

        debug!("Repository returned {} matches for {}", matches.len(), query);
        Ok(matches)
    }
}
