//! Ranking history
//!
//! Each ranking run can be stored as a snapshot of `RpiEvent`s sharing one
//! timestamp. Snapshots give per-team trends and rank movement between runs.

use crate::error::Result;
use crate::storage::Repository;
use crate::types::{RankingEntry, RpiEvent};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Change in a team's rank relative to the previous snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankMovement {
    pub team_name: String,
    /// `None` when the team was not in the previous snapshot
    pub previous: Option<u32>,
    pub current: u32,
}

impl RankMovement {
    /// Places gained (positive) or lost (negative); `None` for new entries
    pub fn delta(&self) -> Option<i64> {
        self.previous
            .map(|previous| previous as i64 - self.current as i64)
    }
}

/// Writes and reads ranking snapshots
pub struct RankingHistory {
    events: Arc<dyn Repository<RpiEvent>>,
}

impl RankingHistory {
    pub fn new(events: Arc<dyn Repository<RpiEvent>>) -> Self {
        Self { events }
    }

    /// Store one event per ranking entry, all stamped with `timestamp`
    ///
    /// A snapshot is written whole or not at all: if any insert fails, the
    /// events already written for it are removed before the error is returned.
    pub fn record_snapshot(
        &self,
        division: &str,
        entries: &[RankingEntry],
        timestamp: DateTime<Utc>,
    ) -> Result<Vec<RpiEvent>> {
        let events: Vec<RpiEvent> = entries
            .iter()
            .map(|entry| RpiEvent::new(division, timestamp, entry))
            .collect();

        for (written, event) in events.iter().enumerate() {
            if let Err(e) = self.events.create(event.clone()) {
                warn!(
                    "Snapshot for {} failed after {} of {} events, rolling back",
                    division,
                    written,
                    events.len()
                );
                for stored in &events[..written] {
                    self.events.delete(&stored.id)?;
                }
                return Err(e);
            }
        }

        info!(
            "Recorded ranking snapshot of {} teams for {} at {}",
            events.len(),
            division,
            timestamp
        );
        Ok(events)
    }

    /// A team's recorded rankings in a division, oldest first
    pub fn team_history(&self, division: &str, team_name: &str) -> Result<Vec<RpiEvent>> {
        let mut events = self.events.find(&|event: &RpiEvent| {
            event.division == division && event.team_name == team_name
        })?;
        events.sort_by_key(|event| event.timestamp);
        Ok(events)
    }

    /// Events of the most recent snapshot for a division, ordered by rank
    pub fn latest_snapshot(&self, division: &str) -> Result<Vec<RpiEvent>> {
        let events = self
            .events
            .find(&|event: &RpiEvent| event.division == division)?;

        let Some(latest) = events.iter().map(|event| event.timestamp).max() else {
            return Ok(Vec::new());
        };

        let mut snapshot: Vec<RpiEvent> = events
            .into_iter()
            .filter(|event| event.timestamp == latest)
            .collect();
        snapshot.sort_by_key(|event| event.ranking);
        Ok(snapshot)
    }

    /// Compare a fresh ranking with the latest stored snapshot
    ///
    /// Call before `record_snapshot`, otherwise the comparison is with itself.
    pub fn movements(&self, division: &str, entries: &[RankingEntry]) -> Result<Vec<RankMovement>> {
        let previous: HashMap<String, u32> = self
            .latest_snapshot(division)?
            .into_iter()
            .map(|event| (event.team_name, event.ranking))
            .collect();

        Ok(entries
            .iter()
            .map(|entry| RankMovement {
                team_name: entry.team_name.clone(),
                previous: previous.get(&entry.team_name).copied(),
                current: entry.ranking,
            })
            .collect())
    }
}
