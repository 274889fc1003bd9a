//! Common types used throughout the ranking service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

/// Team names are the identity of a team within a division
pub type TeamName = String;

/// Numeric team identifier assigned by the upstream provider
pub type TeamId = i64;

/// Unique identifier for a match record
pub type MatchId = i64;

/// A match result as delivered by the upstream provider or the match store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEvent {
    #[serde(rename = "matchID")]
    pub match_id: MatchId,
    #[serde(rename = "gameDate", default, deserialize_with = "null_as_default")]
    pub game_date: String,
    #[serde(rename = "homeTeamID", default)]
    pub home_team_id: Option<TeamId>,
    #[serde(rename = "homeTeam", default, deserialize_with = "null_as_default")]
    pub home_team_name: TeamName,
    #[serde(rename = "homeTeamScore", default, deserialize_with = "null_as_default")]
    pub home_team_score: u32,
    #[serde(rename = "awayTeamID", default)]
    pub away_team_id: Option<TeamId>,
    #[serde(rename = "awayTeam", default, deserialize_with = "null_as_default")]
    pub away_team_name: TeamName,
    #[serde(rename = "awayTeamScore", default, deserialize_with = "null_as_default")]
    pub away_team_score: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub flight: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub division: String,
    #[serde(rename = "eventName", default)]
    pub event_name: Option<String>,
}

/// Upstream exports write `null` for unknown values; read those as the zero value
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl MatchEvent {
    /// Both team names are present
    pub fn has_both_teams(&self) -> bool {
        !self.home_team_name.is_empty() && !self.away_team_name.is_empty()
    }

    /// Home and away name the same team
    pub fn is_self_play(&self) -> bool {
        self.home_team_name == self.away_team_name
    }
}

impl fmt::Display for MatchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' vs '{}' at '{}'",
            self.home_team_name, self.away_team_name, self.game_date
        )
    }
}

/// One side of a normalized match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamScore {
    pub name: TeamName,
    pub id: Option<TeamId>,
    pub score: u32,
}

impl TeamScore {
    pub fn new(name: impl Into<TeamName>, score: u32) -> Self {
        Self {
            name: name.into(),
            id: None,
            score,
        }
    }

    pub fn with_id(mut self, id: TeamId) -> Self {
        self.id = Some(id);
        self
    }
}

/// A normalized match as held by a schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub date: DateTime<Utc>,
    pub home: TeamScore,
    pub away: TeamScore,
}

/// Result of a match from one team's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

impl Match {
    pub fn new(date: DateTime<Utc>, home: TeamScore, away: TeamScore) -> Self {
        Self { date, home, away }
    }

    /// Whether the named team took part in this match
    pub fn involves(&self, team: &str) -> bool {
        self.home.name == team || self.away.name == team
    }

    pub fn is_self_play(&self) -> bool {
        self.home.name == self.away.name
    }

    /// The other team in the match, if `team` played in it
    pub fn opponent_of(&self, team: &str) -> Option<&str> {
        if self.home.name == team {
            Some(&self.away.name)
        } else if self.away.name == team {
            Some(&self.home.name)
        } else {
            None
        }
    }

    /// Outcome for the named team, `None` if it did not play
    pub fn outcome_for(&self, team: &str) -> Option<Outcome> {
        let (own, other) = if self.home.name == team {
            (self.home.score, self.away.score)
        } else if self.away.name == team {
            (self.away.score, self.home.score)
        } else {
            return None;
        };

        Some(match own.cmp(&other) {
            std::cmp::Ordering::Greater => Outcome::Win,
            std::cmp::Ordering::Equal => Outcome::Draw,
            std::cmp::Ordering::Less => Outcome::Loss,
        })
    }
}

/// One team's position in a computed ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub team_name: TeamName,
    pub team_id: Option<TeamId>,
    pub rpi: f64,
    /// 1-based position after sorting by RPI
    pub ranking: u32,
}

impl fmt::Display for RankingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}: '{}' ({:.6})", self.ranking, self.team_name, self.rpi)
    }
}

/// A stored ranking data point used for trend tracking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpiEvent {
    pub id: Uuid,
    pub division: String,
    pub team_id: Option<TeamId>,
    pub team_name: TeamName,
    pub timestamp: DateTime<Utc>,
    pub ranking: u32,
    #[serde(rename = "rpi")]
    pub value: f64,
}

impl RpiEvent {
    pub fn new(division: &str, timestamp: DateTime<Utc>, entry: &RankingEntry) -> Self {
        Self {
            id: Uuid::new_v4(),
            division: division.to_string(),
            team_id: entry.team_id,
            team_name: entry.team_name.clone(),
            timestamp,
            ranking: entry.ranking,
            value: entry.rpi,
        }
    }
}

impl fmt::Display for RpiEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Timestamp: {}, TeamName: '{}', Ranking: {}, RPI: {:.6}",
            self.timestamp, self.team_name, self.ranking, self.value
        )
    }
}
