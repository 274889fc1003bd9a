//! Generic keyed repository
//!
//! Every stored entity type shares the same CRUD surface and the same
//! synchronisation rule: look the key up, then insert or update.

use crate::error::{RankingError, Result};
use crate::types::{MatchEvent, MatchId, RpiEvent};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;
use uuid::Uuid;

/// A storable record with a unique key
pub trait Entity: Clone + Send + Sync + 'static {
    type Key: Clone + Eq + Hash + Display + Send + Sync + 'static;

    /// Human readable entity name used in errors and logs
    const KIND: &'static str;

    fn key(&self) -> Self::Key;
}

impl Entity for MatchEvent {
    type Key = MatchId;
    const KIND: &'static str = "MatchEvent";

    fn key(&self) -> MatchId {
        self.match_id
    }
}

impl Entity for RpiEvent {
    type Key = Uuid;
    const KIND: &'static str = "RpiEvent";

    fn key(&self) -> Uuid {
        self.id
    }
}

/// What `sync` did with an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncOutcome {
    Created,
    Updated,
}

/// Totals for a `sync_all` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub created: usize,
    pub updated: usize,
}

impl SyncSummary {
    pub fn total(&self) -> usize {
        self.created + self.updated
    }
}

fn not_found<E: Entity>(key: &E::Key) -> anyhow::Error {
    RankingError::NotFound {
        entity: E::KIND.to_string(),
        key: key.to_string(),
    }
    .into()
}

/// Trait for keyed entity storage
pub trait Repository<E: Entity>: Send + Sync {
    /// Every stored entity, in no particular order
    fn get_all(&self) -> Result<Vec<E>>;

    /// Entity by key, `RankingError::NotFound` when absent
    fn get(&self, key: &E::Key) -> Result<E>;

    /// Entities matching a predicate
    fn find(&self, predicate: &dyn Fn(&E) -> bool) -> Result<Vec<E>>;

    fn exists(&self, key: &E::Key) -> Result<bool>;

    /// Insert a new entity, `RankingError::AlreadyExists` if the key is taken
    fn create(&self, entity: E) -> Result<()>;

    /// Replace an existing entity, `RankingError::NotFound` if the key is free
    fn update(&self, entity: E) -> Result<()>;

    /// Remove by key, returns whether anything was removed
    fn delete(&self, key: &E::Key) -> Result<bool>;

    fn count(&self) -> Result<usize>;

    /// Insert or update depending on whether the key is already stored
    fn sync(&self, entity: E) -> Result<SyncOutcome> {
        if self.exists(&entity.key())? {
            self.update(entity)?;
            Ok(SyncOutcome::Updated)
        } else {
            self.create(entity)?;
            Ok(SyncOutcome::Created)
        }
    }

    /// `sync` every entity, stopping at the first failure
    fn sync_all(&self, entities: Vec<E>) -> Result<SyncSummary> {
        let mut summary = SyncSummary::default();
        for entity in entities {
            match self.sync(entity)? {
                SyncOutcome::Created => summary.created += 1,
                SyncOutcome::Updated => summary.updated += 1,
            }
        }

        debug!(
            "Synced {} {} records ({} created, {} updated)",
            summary.total(),
            E::KIND,
            summary.created,
            summary.updated
        );
        Ok(summary)
    }
}

/// In-memory repository implementation
pub struct InMemoryRepository<E: Entity> {
    entries: RwLock<HashMap<E::Key, E>>,
}

impl<E: Entity> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<E: Entity> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository pre-filled with entities; later duplicates win
    pub fn with_entities(entities: impl IntoIterator<Item = E>) -> Self {
        let entries = entities.into_iter().map(|e| (e.key(), e)).collect();
        Self {
            entries: RwLock::new(entries),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<E::Key, E>>> {
        self.entries.read().map_err(|_| {
            RankingError::InternalError {
                message: format!("Failed to acquire {} read lock", E::KIND),
            }
            .into()
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<E::Key, E>>> {
        self.entries.write().map_err(|_| {
            RankingError::InternalError {
                message: format!("Failed to acquire {} write lock", E::KIND),
            }
            .into()
        })
    }
}

impl<E: Entity> Repository<E> for InMemoryRepository<E> {
    fn get_all(&self) -> Result<Vec<E>> {
        Ok(self.read()?.values().cloned().collect())
    }

    fn get(&self, key: &E::Key) -> Result<E> {
        self.read()?
            .get(key)
            .cloned()
            .ok_or_else(|| not_found::<E>(key))
    }

    fn find(&self, predicate: &dyn Fn(&E) -> bool) -> Result<Vec<E>> {
        Ok(self
            .read()?
            .values()
            .filter(|entity| predicate(entity))
            .cloned()
            .collect())
    }

    fn exists(&self, key: &E::Key) -> Result<bool> {
        Ok(self.read()?.contains_key(key))
    }

    fn create(&self, entity: E) -> Result<()> {
        let mut entries = self.write()?;
        let key = entity.key();
        if entries.contains_key(&key) {
            return Err(RankingError::AlreadyExists {
                entity: E::KIND.to_string(),
                key: key.to_string(),
            }
            .into());
        }
        entries.insert(key, entity);
        Ok(())
    }

    fn update(&self, entity: E) -> Result<()> {
        let mut entries = self.write()?;
        let key = entity.key();
        match entries.get_mut(&key) {
            Some(existing) => {
                *existing = entity;
                Ok(())
            }
            None => Err(not_found::<E>(&key)),
        }
    }

    fn delete(&self, key: &E::Key) -> Result<bool> {
        Ok(self.write()?.remove(key).is_some())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }
}
