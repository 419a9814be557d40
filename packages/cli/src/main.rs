#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line shell around the Urban Comfort Index engine.
//!
//! Reads raw unit payloads or time series from JSON files (or stdin with
//! `-`), runs one engine operation and prints the result as JSON. The
//! policy comes from the embedded defaults unless `--config` points at a
//! TOML override. Set `RUST_LOG=debug` to see per-batch progress.

mod commands;
mod payload;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use urban_comfort_scoring::Engine;
use urban_comfort_scoring_models::{PriorityTier, RiskLevel};

/// Score, rank and diagnose spatial units for the Urban Comfort Index.
#[derive(Parser)]
#[command(name = "urban_comfort")]
#[command(about = "Score, rank and diagnose spatial units for the Urban Comfort Index")]
struct Cli {
    /// TOML policy overriding the embedded defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Score each unit and print its breakdown.
    Score {
        /// JSON file of raw unit payloads (`-` for stdin).
        input: PathBuf,
    },

    /// Score and rank units into the inspection priority queue.
    Queue {
        /// JSON file of raw unit payloads (`-` for stdin).
        input: PathBuf,

        /// Only print entries in this priority tier.
        #[arg(long, value_parser = payload::parse_enum::<PriorityTier>)]
        tier: Option<PriorityTier>,
    },

    /// Check units for blind spots, riskiest first.
    BlindSpots {
        /// JSON file of raw unit payloads (`-` for stdin).
        input: PathBuf,

        /// Only print records at or above this risk level.
        #[arg(long, value_parser = payload::parse_enum::<RiskLevel>)]
        min_risk: Option<RiskLevel>,
    },

    /// Check the latest observation of a series against its history.
    Anomaly {
        /// JSON file containing one time series (`-` for stdin).
        series: PathBuf,

        /// Unit the series belongs to.
        #[arg(long)]
        unit_id: String,
    },

    /// Forecast a series and report its moving averages and slope.
    Forecast {
        /// JSON file containing one time series (`-` for stdin).
        series: PathBuf,

        /// Number of days to forecast, up to `forecast.max_horizon_days`.
        #[arg(long, default_value = "7")]
        horizon: u32,
    },

    /// Compare a series before and after an intervention date.
    Intervention {
        /// JSON file containing one time series (`-` for stdin).
        series: PathBuf,

        /// Unit the series belongs to.
        #[arg(long)]
        unit_id: String,

        /// Date the intervention took effect (YYYY-MM-DD).
        #[arg(long)]
        date: chrono::NaiveDate,
    },

    /// Print dashboard aggregates for a snapshot of units.
    Summary {
        /// JSON file of raw unit payloads (`-` for stdin).
        input: PathBuf,
    },

    /// Print the effective policy as TOML.
    Config,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let engine = match &cli.config {
        Some(path) => Engine::from_path(path)?,
        None => Engine::default(),
    };

    match cli.command {
        Commands::Score { input } => commands::score(&engine, &input),
        Commands::Queue { input, tier } => commands::queue(&engine, &input, tier),
        Commands::BlindSpots { input, min_risk } => commands::blind_spots(&engine, &input, min_risk),
        Commands::Anomaly { series, unit_id } => commands::anomaly(&engine, &series, &unit_id),
        Commands::Forecast { series, horizon } => commands::forecast(&engine, &series, horizon),
        Commands::Intervention {
            series,
            unit_id,
            date,
        } => commands::intervention(&engine, &series, &unit_id, date),
        Commands::Summary { input } => commands::summary(&engine, &input),
        Commands::Config => commands::config(&engine),
    }
}
