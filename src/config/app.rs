//! Main application configuration
//!
//! This module defines the configuration structures for the rpi-rankings
//! service, including environment variable and TOML file loading plus validation.

use crate::utils::DEFAULT_DATE_FORMAT;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub ranking: RankingSettings,
    pub source: SourceSettings,
}

/// Service-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Settings that shape a ranking run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingSettings {
    /// Competition flight the ranked matches must belong to
    pub flight: String,
    /// chrono layout of the raw `gameDate` field
    pub date_format: String,
}

/// Where match records come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// JSON file holding an array of match records
    pub matches_file: Option<PathBuf>,
    /// How long fetched matches stay cached, 0 disables caching
    pub cache_ttl_seconds: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "rpi-rankings".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            flight: "ECNL".to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            matches_file: None,
            cache_ttl_seconds: 300, // 5 minutes
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            config.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.service.log_level = log_level;
        }

        // Ranking settings
        if let Ok(flight) = env::var("RPI_FLIGHT") {
            config.ranking.flight = flight;
        }
        if let Ok(date_format) = env::var("RPI_DATE_FORMAT") {
            config.ranking.date_format = date_format;
        }

        // Source settings
        if let Ok(path) = env::var("RPI_MATCHES_FILE") {
            config.source.matches_file = Some(PathBuf::from(path));
        }
        if let Ok(ttl) = env::var("RPI_CACHE_TTL_SECONDS") {
            config.source.cache_ttl_seconds = ttl
                .parse()
                .map_err(|_| anyhow!("Invalid RPI_CACHE_TTL_SECONDS value: {}", ttl))?;
        }

        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Get cache TTL as Duration
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.source.cache_ttl_seconds)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }

    // Validate ranking settings
    if config.ranking.date_format.is_empty() {
        return Err(anyhow!("Date format cannot be empty"));
    }

    if let Some(path) = &config.source.matches_file {
        if path.as_os_str().is_empty() {
            return Err(anyhow!("Matches file path cannot be empty"));
        }
    }

    Ok(())
}
