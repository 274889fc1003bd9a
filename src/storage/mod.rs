//! Entity storage
//!
//! One generic repository abstraction serves match records and ranking
//! history alike.

pub mod repository;

pub use repository::{Entity, InMemoryRepository, Repository, SyncOutcome, SyncSummary};
