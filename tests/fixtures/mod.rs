//! Test fixtures and mock implementations for integration testing

#![allow(dead_code)]

use async_trait::async_trait;
use rpi_rankings::error::{RankingError, Result};
use rpi_rankings::source::{MatchQuery, MatchSource};
use rpi_rankings::types::MatchEvent;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Build a raw match record in the ECNL flight
pub fn match_event(
    match_id: i64,
    division: &str,
    home: &str,
    home_score: u32,
    away: &str,
    away_score: u32,
) -> MatchEvent {
    MatchEvent {
        match_id,
        game_date: "2023-09-09T12:00:00".to_string(),
        home_team_id: None,
        home_team_name: home.to_string(),
        home_team_score: home_score,
        away_team_id: None,
        away_team_name: away.to_string(),
        away_team_score: away_score,
        flight: "ECNL".to_string(),
        division: division.to_string(),
        event_name: Some("ECNL Girls Mid-Atlantic 2023-24".to_string()),
    }
}

/// A small league where every team's record differs
pub fn sample_league(division: &str) -> Vec<MatchEvent> {
    vec![
        match_event(1, division, "Arlington Soccer", 3, "Bethesda SC", 1),
        match_event(2, division, "Bethesda SC", 2, "Cedar Stars", 2),
        match_event(3, division, "Cedar Stars", 0, "Arlington Soccer", 1),
        match_event(4, division, "Dallas Texans", 4, "Cedar Stars", 0),
        match_event(5, division, "Arlington Soccer", 1, "Dallas Texans", 1),
        match_event(6, division, "Bethesda SC", 0, "Dallas Texans", 2),
        match_event(7, division, "Eclipse Select", 1, "Bethesda SC", 0),
    ]
}

/// Match source that counts calls and can be told to fail
#[derive(Debug, Default)]
pub struct CountingMatchSource {
    matches: Vec<MatchEvent>,
    calls: AtomicUsize,
    fail: bool,
}

impl CountingMatchSource {
    pub fn new(matches: Vec<MatchEvent>) -> Self {
        Self {
            matches,
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MatchSource for CountingMatchSource {
    async fn fetch_matches(&self, query: &MatchQuery) -> Result<Vec<MatchEvent>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail {
            return Err(RankingError::SourceUnavailable {
                message: format!("upstream unavailable for {}", query),
            }
            .into());
        }

        Ok(self
            .matches
            .iter()
            .filter(|event| query.matches(event))
            .cloned()
            .collect())
    }
}
