//! TTL cache in front of another match source
//!
//! The cache is an ordinary value: whoever builds the ranking pipeline owns
//! it and decides its lifetime. Nothing is shared process-wide.

use super::{MatchQuery, MatchSource};
use crate::error::Result;
use crate::types::MatchEvent;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

struct CacheEntry {
    matches: Vec<MatchEvent>,
    fetched_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

/// Remembers successful fetches per query for `ttl`
pub struct CachedMatchSource {
    inner: Arc<dyn MatchSource>,
    ttl: Duration,
    entries: RwLock<HashMap<MatchQuery, CacheEntry>>,
}

impl CachedMatchSource {
    pub fn new(inner: Arc<dyn MatchSource>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Drop every cached result
    pub async fn invalidate(&self) {
        self.entries.write().await.clear();
    }

    /// Number of cached queries, fresh or stale
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl MatchSource for CachedMatchSource {
    async fn fetch_matches(&self, query: &MatchQuery) -> Result<Vec<MatchEvent>> {
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(query) {
                if entry.is_fresh(self.ttl) {
                    debug!("Cache hit for {}", query);
                    return Ok(entry.matches.clone());
                }
            }
        }

        debug!("Cache miss for {}", query);
        // Errors propagate before anything is stored
        let matches = self.inner.fetch_matches(query).await?;

        self.entries.write().await.insert(
            query.clone(),
            CacheEntry {
                matches: matches.clone(),
                fetched_at: Instant::now(),
            },
        );

        Ok(matches)
    }
}
