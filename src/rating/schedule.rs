//! Match aggregation and the RPI formula
//!
//! A `Schedule` holds every match considered for one ranking run and answers,
//! for any team, its record, its distinct opponents and its Ratings Percentage
//! Index:
//!
//! `RPI = 0.25 * WP + 0.50 * OWP + 0.25 * OOWP`
//!
//! Opponent strength is measured with the opponent's games against the team
//! being rated removed, and every division by zero collapses to 0.

use crate::error::{RankingError, Result};
use crate::types::{Match, Outcome, TeamId};
use crate::utils::mean_or_zero;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Weight of a team's own winning percentage
pub const WP_WEIGHT: f64 = 0.25;
/// Weight of the opponents' winning percentage
pub const OWP_WEIGHT: f64 = 0.50;
/// Weight of the opponents' opponents' winning percentage
pub const OOWP_WEIGHT: f64 = 0.25;

/// Win/draw/loss tally for a team
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
}

impl TeamRecord {
    pub fn games(&self) -> u32 {
        self.wins + self.draws + self.losses
    }

    fn tally(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Draw => self.draws += 1,
            Outcome::Loss => self.losses += 1,
        }
    }

    /// `(wins + 0.5 * draws) / games`, 0 when no games were played
    pub fn winning_percentage(&self) -> f64 {
        let games = self.games();
        if games == 0 {
            return 0.0;
        }
        (self.wins as f64 + 0.5 * self.draws as f64) / games as f64
    }
}

/// The three RPI terms for one team
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RpiComponents {
    pub wp: f64,
    pub owp: f64,
    pub oowp: f64,
}

impl RpiComponents {
    pub fn rpi(&self) -> f64 {
        WP_WEIGHT * self.wp + OWP_WEIGHT * self.owp + OOWP_WEIGHT * self.oowp
    }
}

/// All matches for one ranking computation
///
/// Append-only; not synchronized, so each computation owns its own instance.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    matches: Vec<Match>,
    /// Team name -> positions in `matches` where it played home or away
    index: HashMap<String, Vec<usize>>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a match. No validation and no deduplication.
    pub fn add_match(&mut self, m: Match) {
        let position = self.matches.len();
        self.index.entry(m.home.name.clone()).or_default().push(position);
        if m.away.name != m.home.name {
            self.index.entry(m.away.name.clone()).or_default().push(position);
        }
        self.matches.push(m);
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn contains_team(&self, team: &str) -> bool {
        self.index.contains_key(team)
    }

    /// Distinct team names, sorted lexicographically
    pub fn team_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.index.keys().cloned().collect();
        names.sort();
        names
    }

    /// Numeric id carried by the earliest added match that names the team
    pub fn first_seen_id(&self, team: &str) -> Option<TeamId> {
        self.games_of(team).find_map(|m| {
            if m.home.name == team {
                m.home.id
            } else {
                m.away.id
            }
        })
    }

    fn games_of<'a>(&'a self, team: &str) -> impl Iterator<Item = &'a Match> + 'a {
        self.index
            .get(team)
            .map(|positions| positions.as_slice())
            .unwrap_or_default()
            .iter()
            .map(move |&position| &self.matches[position])
            .filter(|m| !m.is_self_play())
    }

    /// Record over every match the team played, optionally ignoring games
    /// against one opponent
    pub fn record(&self, team: &str, excluding: Option<&str>) -> TeamRecord {
        let mut record = TeamRecord::default();
        for m in self.games_of(team) {
            if excluding.is_some() && m.opponent_of(team) == excluding {
                continue;
            }
            if let Some(outcome) = m.outcome_for(team) {
                record.tally(outcome);
            }
        }
        record
    }

    /// Distinct opponents, each listed once however often they met
    pub fn opponents(&self, team: &str) -> BTreeSet<&str> {
        let mut opponents = BTreeSet::new();
        for m in self.games_of(team) {
            if let Some(opponent) = m.opponent_of(team) {
                opponents.insert(opponent);
            }
        }
        opponents
    }

    /// WP of `team`, optionally with games against `excluding` removed
    pub fn winning_percentage(&self, team: &str, excluding: Option<&str>) -> f64 {
        self.record(team, excluding).winning_percentage()
    }

    /// Mean over distinct opponents of their WP without games against `team`
    pub fn opponents_winning_percentage(&self, team: &str) -> f64 {
        mean_or_zero(
            self.opponents(team)
                .into_iter()
                .map(|opponent| self.winning_percentage(opponent, Some(team))),
        )
    }

    /// Mean over distinct opponents of their own OWP
    pub fn opponents_opponents_winning_percentage(&self, team: &str) -> f64 {
        mean_or_zero(
            self.opponents(team)
                .into_iter()
                .map(|opponent| self.opponents_winning_percentage(opponent)),
        )
    }

    /// WP, OWP and OOWP for a team known to the schedule
    pub fn rpi_components(&self, team: &str) -> Result<RpiComponents> {
        if !self.contains_team(team) {
            return Err(RankingError::TeamNotFound {
                team: team.to_string(),
            }
            .into());
        }

        Ok(RpiComponents {
            wp: self.winning_percentage(team, None),
            owp: self.opponents_winning_percentage(team),
            oowp: self.opponents_opponents_winning_percentage(team),
        })
    }

    /// Ratings Percentage Index for a team
    ///
    /// Fails with `RankingError::TeamNotFound` when the team never appears in
    /// the schedule.
    pub fn calculate_rpi(&self, team: &str) -> Result<f64> {
        Ok(self.rpi_components(team)?.rpi())
    }
}
