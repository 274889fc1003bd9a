//! RPI ranking generation for a division
//!
//! The generator asks its match source for a division's matches, then runs the
//! synchronous `build_rankings` pass: filter, normalize, aggregate into a fresh
//! `Schedule`, compute RPI per team and rank.

use crate::config::RankingSettings;
use crate::error::{ranking_error, RankingError, Result};
use crate::rating::schedule::Schedule;
use crate::source::{MatchQuery, MatchSource};
use crate::types::{Match, MatchEvent, RankingEntry, TeamScore};
use crate::utils::{current_timestamp, parse_game_date};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Produces rankings for one division at a time
pub struct RankingGenerator {
    source: Arc<dyn MatchSource>,
    settings: RankingSettings,
}

impl RankingGenerator {
    pub fn new(source: Arc<dyn MatchSource>, settings: RankingSettings) -> Self {
        Self { source, settings }
    }

    pub fn settings(&self) -> &RankingSettings {
        &self.settings
    }

    /// Query the source for a division's matches in the configured flight
    pub fn query_for(&self, division: &str) -> MatchQuery {
        let query = MatchQuery::new(division);
        if self.settings.flight.is_empty() {
            query
        } else {
            query.with_flight(self.settings.flight.as_str())
        }
    }

    /// Rank every team that appears in the division's matches
    ///
    /// A source failure aborts the run. No matches yields an empty ranking.
    pub async fn generate_rankings(&self, division: &str) -> Result<Vec<RankingEntry>> {
        let query = self.query_for(division);
        info!("Processing rankings for {}", query);

        let matches = self.source.fetch_matches(&query).await?;
        let rankings = build_rankings(&matches, &self.settings.date_format)?;

        info!("Ranked {} teams for {}", rankings.len(), query);
        Ok(rankings)
    }
}

/// Convert a raw record into a schedule match, or `None` if it cannot be ranked
fn normalize(event: &MatchEvent, date_format: &str) -> Option<Match> {
    if !event.has_both_teams() {
        debug!("Skipping match {} with a missing team name", event.match_id);
        return None;
    }

    if event.is_self_play() {
        warn!("Skipping match {} where a team plays itself: {}", event.match_id, event);
        return None;
    }

    // The date never feeds the formula, so an unparseable one is replaced
    let date = parse_game_date(&event.game_date, date_format).unwrap_or_else(|| {
        warn!(
            "Could not parse game date '{}' of match {}, using current time",
            event.game_date, event.match_id
        );
        current_timestamp()
    });

    let mut home = TeamScore::new(event.home_team_name.as_str(), event.home_team_score);
    home.id = event.home_team_id;
    let mut away = TeamScore::new(event.away_team_name.as_str(), event.away_team_score);
    away.id = event.away_team_id;

    Some(Match::new(date, home, away))
}

/// Build a schedule from raw records, dropping the ones that cannot be ranked
pub fn build_schedule(matches: &[MatchEvent], date_format: &str) -> Schedule {
    let mut schedule = Schedule::new();
    for m in matches.iter().filter_map(|event| normalize(event, date_format)) {
        schedule.add_match(m);
    }

    let skipped = matches.len() - schedule.len();
    if skipped > 0 {
        debug!("{} of {} match records skipped", skipped, matches.len());
    }
    schedule
}

/// A lookup failure for a name taken from the schedule itself is a broken invariant
fn invariant_violation(err: &anyhow::Error) -> RankingError {
    let message = match ranking_error(err) {
        Some(RankingError::TeamNotFound { team }) => {
            format!("discovered team '{}' missing from its own schedule", team)
        }
        _ => err.to_string(),
    };
    RankingError::InvariantViolation { message }
}

/// Rank the teams of a schedule by descending RPI
///
/// Names are visited in lexicographic order and the sort is stable, so equal
/// RPI values keep alphabetical order. Ranks are `1..=N` with no gaps.
pub fn rank_schedule(schedule: &Schedule) -> Result<Vec<RankingEntry>> {
    let mut rankings = Vec::new();

    for team_name in schedule.team_names() {
        let rpi = schedule
            .calculate_rpi(&team_name)
            .map_err(|e| invariant_violation(&e))?;

        rankings.push(RankingEntry {
            team_id: schedule.first_seen_id(&team_name),
            team_name,
            rpi,
            ranking: 0, // assigned after sorting
        });
    }

    rankings.sort_by(|a, b| b.rpi.partial_cmp(&a.rpi).unwrap_or(Ordering::Equal));

    for (position, entry) in rankings.iter_mut().enumerate() {
        entry.ranking = position as u32 + 1;
    }

    Ok(rankings)
}

/// Filter, normalize and rank raw match records
pub fn build_rankings(matches: &[MatchEvent], date_format: &str) -> Result<Vec<RankingEntry>> {
    let schedule = build_schedule(matches, date_format);
    rank_schedule(&schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockMatchSource;
    use crate::utils::DEFAULT_DATE_FORMAT;
    use chrono::Utc;

    fn event(match_id: i64, home: &str, home_score: u32, away: &str, away_score: u32) -> MatchEvent {
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
            division: "G2009".to_string(),
            event_name: None,
        }
    }

    fn generator_with(source: MockMatchSource) -> RankingGenerator {
        RankingGenerator::new(Arc::new(source), RankingSettings::default())
    }

    #[test]
    fn test_two_team_round_robin_ties_break_alphabetically() {
        let matches = vec![event(1, "Beta", 1, "Alpha", 2), event(2, "Alpha", 0, "Beta", 3)];

        let rankings = build_rankings(&matches, DEFAULT_DATE_FORMAT).unwrap();

        assert_eq!(rankings.len(), 2);
        assert_eq!(rankings[0].team_name, "Alpha");
        assert_eq!(rankings[0].ranking, 1);
        assert_eq!(rankings[1].team_name, "Beta");
        assert_eq!(rankings[1].ranking, 2);
        assert!((rankings[0].rpi - 0.125).abs() < 1e-12);
        assert!((rankings[1].rpi - 0.125).abs() < 1e-12);
    }

    #[test]
    fn test_rankings_sorted_descending() {
        let matches = vec![
            event(1, "Alpha", 3, "Beta", 0),
            event(2, "Alpha", 2, "Gamma", 0),
            event(3, "Beta", 1, "Gamma", 0),
            event(4, "Delta", 0, "Alpha", 1),
            event(5, "Delta", 1, "Gamma", 1),
        ];

        let rankings = build_rankings(&matches, DEFAULT_DATE_FORMAT).unwrap();

        assert_eq!(rankings.len(), 4);
        assert_eq!(rankings[0].team_name, "Alpha");
        for pair in rankings.windows(2) {
            assert!(pair[0].rpi >= pair[1].rpi);
        }
        let ranks: Vec<u32> = rankings.iter().map(|r| r.ranking).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_rows_with_missing_or_identical_names_skipped() {
        let matches = vec![
            event(1, "Alpha", 1, "Beta", 0),
            event(2, "", 4, "Gamma", 0),
            event(3, "Delta", 4, "", 0),
            event(4, "Epsilon", 1, "Epsilon", 1),
        ];

        let schedule = build_schedule(&matches, DEFAULT_DATE_FORMAT);
        assert_eq!(schedule.len(), 1);

        let rankings = build_rankings(&matches, DEFAULT_DATE_FORMAT).unwrap();
        let names: Vec<&str> = rankings.iter().map(|r| r.team_name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Beta"]);
    }

    #[test]
    fn test_unparseable_date_falls_back_to_now() {
        let mut raw = event(1, "Alpha", 1, "Beta", 0);
        raw.game_date = "Sat, Sep 9".to_string();

        let before = Utc::now();
        let schedule = build_schedule(&[raw], DEFAULT_DATE_FORMAT);
        assert_eq!(schedule.len(), 1);
        assert!(schedule.matches()[0].date >= before);

        let parsed = build_schedule(&[event(2, "Alpha", 1, "Beta", 0)], DEFAULT_DATE_FORMAT);
        assert_eq!(parsed.matches()[0].date.to_rfc3339(), "2023-09-09T12:00:00+00:00");
    }

    #[test]
    fn test_first_seen_team_id_carried_through() {
        let mut first = event(1, "Alpha", 1, "Beta", 0);
        first.home_team_id = Some(101);
        let mut second = event(2, "Beta", 0, "Alpha", 0);
        second.home_team_id = Some(202);
        second.away_team_id = Some(999);

        let rankings = build_rankings(&[first, second], DEFAULT_DATE_FORMAT).unwrap();
        let alpha = rankings.iter().find(|r| r.team_name == "Alpha").unwrap();
        let beta = rankings.iter().find(|r| r.team_name == "Beta").unwrap();
        assert_eq!(alpha.team_id, Some(101));
        assert_eq!(beta.team_id, Some(202));
    }

    #[test]
    fn test_empty_input_yields_empty_ranking() {
        let rankings = build_rankings(&[], DEFAULT_DATE_FORMAT).unwrap();
        assert!(rankings.is_empty());
    }

    #[test]
    fn test_team_not_found_reported_as_invariant_violation() {
        let err = Schedule::new().calculate_rpi("Ghost").unwrap_err();

        match invariant_violation(&err) {
            RankingError::InvariantViolation { message } => {
                assert_eq!(message, "discovered team 'Ghost' missing from its own schedule");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let other = anyhow::anyhow!("lock poisoned");
        assert_eq!(
            invariant_violation(&other),
            RankingError::InvariantViolation {
                message: "lock poisoned".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_generate_queries_configured_flight() {
        let mut source = MockMatchSource::new();
        source
            .expect_fetch_matches()
            .withf(|query| query.division == "G2009" && query.flight.as_deref() == Some("ECNL"))
            .times(1)
            .returning(|_| Ok(vec![event(1, "Alpha", 2, "Beta", 1)]));

        let rankings = generator_with(source).generate_rankings("G2009").await.unwrap();
        assert_eq!(rankings.len(), 2);
        assert_eq!(rankings[0].team_name, "Alpha");
    }

    #[tokio::test]
    async fn test_generate_without_flight_queries_all_flights() {
        let mut source = MockMatchSource::new();
        source
            .expect_fetch_matches()
            .withf(|query| query.flight.is_none())
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let settings = RankingSettings {
            flight: String::new(),
            ..RankingSettings::default()
        };
        let generator = RankingGenerator::new(Arc::new(source), settings);

        assert!(generator.generate_rankings("B2008").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_source_failure_propagates() {
        let mut source = MockMatchSource::new();
        source.expect_fetch_matches().returning(|_| {
            Err(RankingError::SourceUnavailable {
                message: "connection refused".to_string(),
            }
            .into())
        });

        let err = generator_with(source)
            .generate_rankings("G2009")
            .await
            .unwrap_err();
        assert!(matches!(
            ranking_error(&err),
            Some(RankingError::SourceUnavailable { .. })
        ));
    }
}
