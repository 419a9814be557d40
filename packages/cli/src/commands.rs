//! One function per subcommand. Each reads its input, runs the engine and
//! prints JSON (TOML for `config`) to stdout.

use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;
use urban_comfort_scoring::{Engine, config as engine_config, rank};
use urban_comfort_scoring_models::{PriorityTier, RiskLevel};

use crate::payload::{read_series, read_units};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

fn print_json<T: Serialize + ?Sized>(value: &T) -> CommandResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prints the score breakdown of every unit, in input order.
pub fn score(engine: &Engine, input: &Path) -> CommandResult {
    let units = read_units(input)?;
    print_json(&engine.score_units(&units))
}

/// Prints the priority queue, optionally filtered to one tier.
pub fn queue(engine: &Engine, input: &Path, tier: Option<PriorityTier>) -> CommandResult {
    let units = read_units(input)?;
    let queue = engine.priority_queue(&units);
    match tier {
        Some(tier) => print_json(&rank::entries_in_tier(&queue, tier)),
        None => print_json(&queue),
    }
}

/// Prints blind-spot records at or above `min_risk`.
pub fn blind_spots(engine: &Engine, input: &Path, min_risk: Option<RiskLevel>) -> CommandResult {
    let units = read_units(input)?;
    let mut records = engine.detect_blind_spots(&units);
    if let Some(min_risk) = min_risk {
        // RiskLevel is declared High first.
        records.retain(|record| record.risk_level <= min_risk);
    }
    print_json(&records)
}

/// Prints the anomaly record of the latest observation.
pub fn anomaly(engine: &Engine, series: &Path, unit_id: &str) -> CommandResult {
    let series = read_series(series)?;
    let record = engine
        .detect_latest_anomaly(unit_id, &series)
        .ok_or("series has no observations")?;
    print_json(&record)
}

/// Prints moving averages, slope and forecast.
pub fn forecast(engine: &Engine, series: &Path, horizon: u32) -> CommandResult {
    let series = read_series(series)?;
    print_json(&engine.analyze_trend(&series, horizon))
}

/// Prints the before/after comparison.
pub fn intervention(engine: &Engine, series: &Path, unit_id: &str, date: NaiveDate) -> CommandResult {
    let series = read_series(series)?;
    print_json(&engine.compare_intervention(unit_id, &series, date))
}

/// Prints dashboard aggregates.
pub fn summary(engine: &Engine, input: &Path) -> CommandResult {
    let units = read_units(input)?;
    let queue = engine.priority_queue(&units);
    print_json(&engine.summarize(&queue))
}

/// Prints the effective policy.
pub fn config(engine: &Engine) -> CommandResult {
    print!("{}", engine_config::to_toml_string(engine.config())?);
    Ok(())
}
