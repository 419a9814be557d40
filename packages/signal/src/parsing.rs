//! Lenient field lookup and coercion helpers for raw JSON payloads.
//!
//! The data-fetch layer delivers signals in several shapes (camelCase or
//! `snake_case` keys, numbers as strings, booleans as `"yes"`). These
//! helpers absorb that variance so the normalizer can treat every payload
//! the same way.

use std::str::FromStr;

use serde_json::Value;

/// Returns the first non-null value found under any of `keys`.
#[must_use]
pub fn field<'a>(obj: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| obj.get(key))
        .find(|value| !value.is_null())
}

/// Coerces a JSON number or numeric string into a finite `f64`.
#[must_use]
pub fn as_f64(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// Looks up a numeric field under any of `keys`.
#[must_use]
pub fn number_field(obj: &Value, keys: &[&str]) -> Option<f64> {
    field(obj, keys).and_then(as_f64)
}

/// Coerces a JSON bool, number or string (`"true"`, `"yes"`, `"1"`) into a
/// `bool`.
#[must_use]
pub fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|x| x != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Some(true),
            "false" | "no" | "n" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Looks up a string field under any of `keys`, trimmed and non-empty.
#[must_use]
pub fn str_field<'a>(obj: &'a Value, keys: &[&str]) -> Option<&'a str> {
    field(obj, keys)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Looks up a string or numeric field and renders it as a `String`.
///
/// Unit identifiers sometimes arrive as numbers.
#[must_use]
pub fn id_field(obj: &Value, keys: &[&str]) -> Option<String> {
    match field(obj, keys)? {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Outcome of parsing an enum-valued field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumField<T> {
    /// The field was absent or null.
    Missing,
    /// The field held a recognised value.
    Parsed(T),
    /// The field held a value that did not match any variant.
    Unrecognized,
}

impl<T> EnumField<T> {
    /// Returns the parsed value, or `fallback` when missing or unrecognised.
    pub fn or(self, fallback: T) -> T {
        match self {
            Self::Parsed(value) => value,
            Self::Missing | Self::Unrecognized => fallback,
        }
    }
}

/// Parses an enum-valued field under any of `keys` via [`FromStr`].
pub fn enum_field<T: FromStr>(obj: &Value, keys: &[&str]) -> EnumField<T> {
    let Some(value) = field(obj, keys) else {
        return EnumField::Missing;
    };
    value
        .as_str()
        .and_then(|s| T::from_str(s.trim()).ok())
        .map_or(EnumField::Unrecognized, EnumField::Parsed)
}

/// Parses lat/lng from a payload. Returns `None` if either is missing,
/// zero, or outside the valid coordinate range.
#[must_use]
pub fn lat_lng(obj: &Value) -> Option<(f64, f64)> {
    let lat = number_field(obj, &["lat", "latitude"])?;
    let lng = number_field(obj, &["lng", "lon", "longitude"])?;
    if lat == 0.0 || lng == 0.0 {
        return None;
    }
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return None;
    }
    Some((lat, lng))
}
