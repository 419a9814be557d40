//! Reading JSON input documents.

use std::fmt::Debug;
use std::io::Read as _;
use std::path::Path;
use std::str::FromStr;

use serde_json::Value;
use urban_comfort_scoring_models::TimeSeries;
use urban_comfort_signal::normalize_units;
use urban_comfort_signal_models::{RawSignalPayload, UnitSignals};

/// Reads a file, or stdin when `path` is `-`.
///
/// # Errors
///
/// Returns an I/O error if the input cannot be read.
pub fn read_input(path: &Path) -> std::io::Result<String> {
    if path.as_os_str() == "-" {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        Ok(content)
    } else {
        std::fs::read_to_string(path)
    }
}

/// Splits a units document into raw payloads.
///
/// Accepts a bare array of units, an object with a `units` array, or a
/// single unit object.
#[must_use]
pub fn unit_payloads(document: Value) -> Vec<RawSignalPayload> {
    match document {
        Value::Array(items) => items.into_iter().map(RawSignalPayload::from).collect(),
        Value::Object(mut object) => match object.remove("units") {
            Some(Value::Array(items)) => items.into_iter().map(RawSignalPayload::from).collect(),
            Some(other) => {
                object.insert("units".to_string(), other);
                vec![RawSignalPayload::from(Value::Object(object))]
            }
            None => vec![RawSignalPayload::from(Value::Object(object))],
        },
        other => {
            log::warn!("Ignoring units document that is neither an array nor an object: {other}");
            Vec::new()
        }
    }
}

/// Reads and normalizes a units document.
///
/// # Errors
///
/// Returns an error if the input cannot be read or is not valid JSON.
pub fn read_units(path: &Path) -> Result<Vec<UnitSignals>, Box<dyn std::error::Error>> {
    let document: Value = serde_json::from_str(&read_input(path)?)?;
    let payloads = unit_payloads(document);
    let units = normalize_units(&payloads);
    log::info!("Read {} of {} units from {}", units.len(), payloads.len(), path.display());
    Ok(units)
}

/// Reads a time series document.
///
/// # Errors
///
/// Returns an error if the input cannot be read or does not describe a
/// time series.
pub fn read_series(path: &Path) -> Result<TimeSeries, Box<dyn std::error::Error>> {
    let series: TimeSeries = serde_json::from_str(&read_input(path)?)?;
    Ok(TimeSeries::new(series.metric, series.kind, series.points))
}

/// Parses a command-line value through the type's [`FromStr`].
///
/// # Errors
///
/// Returns a message naming the rejected input.
pub fn parse_enum<T>(value: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: Debug,
{
    value
        .parse()
        .map_err(|e| format!("invalid value '{value}' ({e:?})"))
}
