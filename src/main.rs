//! Command line entry point for RPI rankings
//!
//! Loads a division's matches from a JSON export, prints the RPI ranking and
//! optionally tracks rank movement in a history file.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use rpi_rankings::config::AppConfig;
use rpi_rankings::history::{RankMovement, RankingHistory};
use rpi_rankings::source::{CachedMatchSource, JsonFileMatchSource, MatchQuery, MatchSource};
use rpi_rankings::storage::{InMemoryRepository, Repository};
use rpi_rankings::types::{RankingEntry, RpiEvent};
use rpi_rankings::utils::current_timestamp;
use rpi_rankings::RankingGenerator;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

/// RPI Rankings - Ratings Percentage Index for age-group soccer divisions
#[derive(Parser)]
#[command(
    name = "rpi-rankings",
    version,
    about = "Computes RPI rankings for a soccer division",
    long_about = "Reads match results for a division, computes each team's Ratings Percentage \
                 Index (0.25 WP + 0.50 OWP + 0.25 OOWP) and prints the teams ranked by RPI."
)]
struct Args {
    /// Division / age group to rank
    #[arg(short = 'a', long = "age", value_name = "DIVISION", help = "Age group (e.g. G2009)")]
    division: String,

    /// Match export override
    #[arg(short, long, value_name = "FILE", help = "JSON file with match records")]
    matches: Option<PathBuf>,

    /// Flight override
    #[arg(short, long, value_name = "FLIGHT", help = "Competition flight (e.g. ECNL)")]
    flight: Option<String>,

    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Ranking history file
    #[arg(
        long,
        value_name = "FILE",
        help = "JSON file of past snapshots; movement is shown and the new ranking appended"
    )]
    history: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Emit JSON instead of text
    #[arg(long, help = "Print the ranking as JSON")]
    json: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load and merge configuration from environment or file and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(flight) = &args.flight {
        config.ranking.flight = flight.clone();
    }

    if let Some(matches) = &args.matches {
        config.source.matches_file = Some(matches.clone());
    }

    rpi_rankings::config::validate_config(&config)?;
    Ok(config)
}

fn build_source(config: &AppConfig) -> Result<Arc<dyn MatchSource>> {
    let path = config
        .source
        .matches_file
        .clone()
        .ok_or_else(|| anyhow!("No match file configured; pass --matches or set RPI_MATCHES_FILE"))?;

    let source: Arc<dyn MatchSource> = Arc::new(JsonFileMatchSource::new(path));
    if config.source.cache_ttl_seconds == 0 {
        return Ok(source);
    }
    Ok(Arc::new(CachedMatchSource::new(source, config.cache_ttl())))
}

async fn load_history(path: &Path) -> Result<InMemoryRepository<RpiEvent>> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(InMemoryRepository::new());
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to read history file {}", path.display()));
        }
    };
    let events: Vec<RpiEvent> = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid history file {}", path.display()))?;

    Ok(InMemoryRepository::with_entities(events))
}

async fn save_history(path: &Path, events: &InMemoryRepository<RpiEvent>) -> Result<()> {
    let mut all = events.get_all()?;
    all.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| a.ranking.cmp(&b.ranking))
    });

    let contents = serde_json::to_string_pretty(&all)?;
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("Failed to write history file {}", path.display()))
}

fn format_movement(movement: Option<&RankMovement>) -> String {
    match movement.map(|m| m.delta()) {
        Some(Some(delta)) if delta > 0 => format!(" (+{})", delta),
        Some(Some(delta)) if delta < 0 => format!(" ({})", delta),
        Some(Some(_)) => " (=)".to_string(),
        Some(None) => " (new)".to_string(),
        None => String::new(),
    }
}

/// Header line; an unfiltered query shows the division alone
fn ranking_header(query: &MatchQuery) -> String {
    format!("RPI Rankings for {}", query)
}

fn print_rankings(
    query: &MatchQuery,
    rankings: &[RankingEntry],
    movements: &[RankMovement],
    json: bool,
) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rankings)?);
        return Ok(());
    }

    println!("{}", ranking_header(query));
    for (position, entry) in rankings.iter().enumerate() {
        println!("{}{}", entry, format_movement(movements.get(position)));
    }
    Ok(())
}

async fn run(args: Args, config: AppConfig) -> Result<()> {
    let source = build_source(&config)?;
    let generator = RankingGenerator::new(source, config.ranking.clone());

    let rankings = generator.generate_rankings(&args.division).await?;

    let mut movements = Vec::new();
    if let Some(path) = &args.history {
        let events = Arc::new(load_history(path).await?);
        let history = RankingHistory::new(events.clone());

        movements = history.movements(&args.division, &rankings)?;
        history.record_snapshot(&args.division, &rankings, current_timestamp())?;
        save_history(path, &events).await?;
        info!("History written to {}", path.display());
    }

    let query = generator.query_for(&args.division);
    print_rankings(&query, &rankings, &movements, args.json)
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {:#}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("{} v{}", config.service.name, rpi_rankings::VERSION);

    if let Err(e) = run(args, config).await {
        error!("Error generating rankings: {:#}", e);
        std::process::exit(1);
    }
}
