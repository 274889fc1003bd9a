//! Utility functions for the ranking service

use chrono::{DateTime, NaiveDateTime, Utc};

/// Layout of the upstream `gameDate` field
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Parse a raw game date with the given layout, interpreting it as UTC
pub fn parse_game_date(raw: &str, format: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw.trim(), format)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Arithmetic mean that yields 0 for an empty input
pub fn mean_or_zero<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
