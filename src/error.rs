//! Error types for the ranking service
//!
//! Library code returns `anyhow::Result` and raises the typed variants below,
//! so callers can recover the kind of failure with `downcast_ref`.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific ranking scenarios
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RankingError {
    #[error("Team not found in schedule: {team}")]
    TeamNotFound { team: String },

    #[error("{entity} not found: {key}")]
    NotFound { entity: String, key: String },

    #[error("{entity} already exists: {key}")]
    AlreadyExists { entity: String, key: String },

    #[error("Match source unavailable: {message}")]
    SourceUnavailable { message: String },

    #[error("Ranking invariant violated: {message}")]
    InvariantViolation { message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal service error: {message}")]
    InternalError { message: String },
}

impl RankingError {
    /// True for the "record does not exist" family of errors
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RankingError::NotFound { .. } | RankingError::TeamNotFound { .. }
        )
    }
}

/// Find a `RankingError` anywhere in an anyhow error chain
pub fn ranking_error(err: &anyhow::Error) -> Option<&RankingError> {
    err.chain().find_map(|cause| cause.downcast_ref::<RankingError>())
}
