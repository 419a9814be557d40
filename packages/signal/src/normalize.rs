//! Normalizes raw signal payloads into [`SignalSet`] values.
//!
//! Normalization never fails. Missing optional signals become `None`,
//! missing required signals are filled with neutral defaults and recorded
//! in [`SignalSet::defaulted_signals`], and out-of-range numbers are
//! clamped rather than rejected.
//!
//! Recurrence is carried as a percentage in `[0, 100]`. Payloads that only
//! report a raw recurrence count are converted here, relative to the
//! complaint count, so scoring never has to guess the scale.

use serde_json::Value;
use urban_comfort_signal_models::{
    GeoSignal, HumanSignal, PigeonIntensity, PigeonSignal, PopulationSignal, RawSignalPayload,
    SignalKind, SignalSet, SpatialUnit, StructureCondition, Trend, UnitSignals,
};

use crate::parsing::{
    EnumField, as_bool, enum_field, field, id_field, lat_lng, number_field, str_field,
};

const HUMAN_KEYS: &[&str] = &["human", "humanSignal", "human_signal"];
const GEO_KEYS: &[&str] = &["geo", "geoSignal", "geo_signal"];
const POPULATION_KEYS: &[&str] = &["population", "populationSignal", "population_signal"];
const PIGEON_KEYS: &[&str] = &["pigeon", "pigeonSignal", "pigeon_signal", "ecological"];

const COMPLAINT_KEYS: &[&str] = &["complaintCount", "complaint_count", "complaints"];
const RECURRENCE_RATE_KEYS: &[&str] = &["recurrenceRate", "recurrence_rate"];
const RECURRENCE_COUNT_KEYS: &[&str] = &["recurrenceCount", "recurrence_count", "recurrence"];
const TREND_KEYS: &[&str] = &["trend"];
const VULNERABILITY_KEYS: &[&str] = &[
    "structuralVulnerability",
    "structural_vulnerability",
    "vulnerabilityScore",
    "vulnerability_score",
    "vulnerability",
];
const ALLEY_KEYS: &[&str] = &["alleyStructure", "alley_structure", "alley"];
const VENTILATION_KEYS: &[&str] = &["ventilation"];
const ACCESSIBILITY_KEYS: &[&str] = &["accessibility"];
const DAYTIME_KEYS: &[&str] = &["daytime", "daytimePopulation", "daytime_population"];
const NIGHTTIME_KEYS: &[&str] = &["nighttime", "nighttimePopulation", "nighttime_population"];
const CHANGE_RATE_KEYS: &[&str] = &["changeRatePct", "change_rate_pct", "changeRate", "change_rate"];

const HUMAN_FIELDS: &[&[&str]] = &[
    COMPLAINT_KEYS,
    RECURRENCE_RATE_KEYS,
    RECURRENCE_COUNT_KEYS,
    TREND_KEYS,
];
const GEO_FIELDS: &[&[&str]] = &[
    VULNERABILITY_KEYS,
    ALLEY_KEYS,
    VENTILATION_KEYS,
    ACCESSIBILITY_KEYS,
];
const POPULATION_FIELDS: &[&[&str]] = &[DAYTIME_KEYS, NIGHTTIME_KEYS, CHANGE_RATE_KEYS, TREND_KEYS];

const MAX_VULNERABILITY: f64 = 10.0;
const MAX_RECURRENCE_RATE: f64 = 100.0;

/// Normalizes a raw payload into a [`SignalSet`].
///
/// Signals may sit at the top level of the payload or under a `signals`
/// object. A section only counts as measured when it is an object carrying
/// at least one of its known fields; anything else is treated as missing.
#[must_use]
pub fn normalize(raw: &RawSignalPayload) -> SignalSet {
    let root = signal_root(raw.as_value());
    let mut defaulted_signals = Vec::new();

    let human = measured_section(root, HUMAN_KEYS, HUMAN_FIELDS, "human").map_or_else(
        || {
            defaulted_signals.push(SignalKind::Human);
            HumanSignal::default()
        },
        normalize_human,
    );

    let geo = measured_section(root, GEO_KEYS, GEO_FIELDS, "geo").map_or_else(
        || {
            defaulted_signals.push(SignalKind::Geo);
            GeoSignal::default()
        },
        normalize_geo,
    );

    let population = measured_section(root, POPULATION_KEYS, POPULATION_FIELDS, "population")
        .map(normalize_population);
    let pigeon = field(root, PIGEON_KEYS).and_then(normalize_pigeon);

    if !defaulted_signals.is_empty() {
        log::debug!("Filled missing required signals with neutral defaults: {defaulted_signals:?}");
    }

    SignalSet {
        human,
        geo,
        population,
        pigeon,
        defaulted_signals,
    }
}

/// Normalizes a raw payload that also carries the unit's identity.
///
/// Returns `None` when the payload has no usable unit identifier. The
/// display name falls back to the identifier.
#[must_use]
pub fn normalize_unit(raw: &RawSignalPayload) -> Option<UnitSignals> {
    let value = raw.as_value();
    let unit_id = id_field(value, &["unitId", "unit_id", "id"])?;
    let name = str_field(value, &["name", "unitName", "unit_name"])
        .map_or_else(|| unit_id.clone(), ToString::to_string);
    let coordinates = lat_lng(value);

    Some(UnitSignals {
        unit: SpatialUnit {
            unit_id,
            name,
            lat: coordinates.map(|(lat, _)| lat),
            lng: coordinates.map(|(_, lng)| lng),
        },
        signals: normalize(raw),
    })
}

/// Normalizes a list of payloads, skipping those without a unit identifier.
#[must_use]
pub fn normalize_units(raws: &[RawSignalPayload]) -> Vec<UnitSignals> {
    let units: Vec<UnitSignals> = raws.iter().filter_map(normalize_unit).collect();
    let skipped = raws.len() - units.len();
    if skipped > 0 {
        log::warn!("Skipped {skipped} signal payload(s) without a unit identifier");
    }
    units
}

fn signal_root(value: &Value) -> &Value {
    value
        .get("signals")
        .filter(|signals| signals.is_object())
        .unwrap_or(value)
}

fn measured_section<'a>(
    root: &'a Value,
    keys: &[&str],
    fields: &[&[&str]],
    signal: &str,
) -> Option<&'a Value> {
    let section = field(root, keys)?;
    if !section.is_object() {
        log::warn!("Ignoring {signal} signal that is not an object: {section}");
        return None;
    }
    if !fields.iter().any(|keys| field(section, keys).is_some()) {
        log::debug!("Ignoring {signal} signal without any known fields: {section}");
        return None;
    }
    Some(section)
}

fn normalize_human(section: &Value) -> HumanSignal {
    let complaint_count = number_field(section, COMPLAINT_KEYS).map_or(0, to_count_u32);

    let recurrence_rate = number_field(section, RECURRENCE_RATE_KEYS)
        .map(|rate| clamp_logged(rate, 0.0, MAX_RECURRENCE_RATE, "recurrence rate"))
        .or_else(|| {
            number_field(section, RECURRENCE_COUNT_KEYS)
                .map(|count| recurrence_count_to_rate(count, complaint_count))
        })
        .unwrap_or(0.0);

    HumanSignal {
        complaint_count,
        trend: trend_field(section, "human"),
        recurrence_rate,
    }
}

fn normalize_geo(section: &Value) -> GeoSignal {
    let structural_vulnerability = number_field(section, VULNERABILITY_KEYS).map_or(GeoSignal::NEUTRAL_VULNERABILITY, |v| {
        clamp_logged(v, 0.0, MAX_VULNERABILITY, "structural vulnerability")
    });

    GeoSignal {
        structural_vulnerability,
        alley_structure: condition_field(section, ALLEY_KEYS),
        ventilation: condition_field(section, VENTILATION_KEYS),
        accessibility: condition_field(section, ACCESSIBILITY_KEYS),
    }
}

fn normalize_population(section: &Value) -> PopulationSignal {
    PopulationSignal {
        daytime: number_field(section, DAYTIME_KEYS).map_or(0, to_count_u64),
        nighttime: number_field(section, NIGHTTIME_KEYS).map_or(0, to_count_u64),
        change_rate_pct: number_field(section, CHANGE_RATE_KEYS).unwrap_or(0.0),
        trend: trend_field(section, "population"),
    }
}

fn normalize_pigeon(section: &Value) -> Option<PigeonSignal> {
    if let Some(detected) = as_bool(section) {
        return Some(PigeonSignal {
            detected,
            intensity: if detected {
                PigeonIntensity::Low
            } else {
                PigeonIntensity::Absent
            },
        });
    }

    if !section.is_object() {
        log::warn!("Ignoring pigeon signal of unexpected shape: {section}");
        return None;
    }

    let intensity = match enum_field::<PigeonIntensity>(section, &["intensity", "level"]) {
        EnumField::Parsed(intensity) => Some(intensity),
        EnumField::Missing => None,
        EnumField::Unrecognized => {
            log::warn!("Unrecognized pigeon intensity {section}, treating as none");
            Some(PigeonIntensity::Absent)
        }
    };
    let detected = field(section, &["detected"]).and_then(as_bool);

    let (detected, intensity) = match (detected, intensity) {
        (Some(detected), Some(intensity)) => (detected, intensity),
        // Detected without an intensity counts as the weakest level.
        (Some(true), None) => (true, PigeonIntensity::Low),
        (Some(false) | None, None) => (false, PigeonIntensity::Absent),
        (None, Some(intensity)) => (intensity != PigeonIntensity::Absent, intensity),
    };

    Some(PigeonSignal {
        detected,
        intensity,
    })
}

fn trend_field(section: &Value, signal: &str) -> Trend {
    match enum_field::<Trend>(section, TREND_KEYS) {
        EnumField::Parsed(trend) => trend,
        EnumField::Missing => Trend::Stable,
        EnumField::Unrecognized => {
            log::warn!("Unrecognized {signal} trend in {section}, treating as stable");
            Trend::Stable
        }
    }
}

fn condition_field(section: &Value, keys: &[&str]) -> StructureCondition {
    let parsed = enum_field::<StructureCondition>(section, keys);
    if parsed == EnumField::Unrecognized {
        log::warn!("Unrecognized {} condition in {section}, treating as medium", keys[0]);
    }
    parsed.or(StructureCondition::Medium)
}

fn recurrence_count_to_rate(count: f64, complaint_count: u32) -> f64 {
    if complaint_count == 0 {
        return 0.0;
    }
    let rate = count.max(0.0) / f64::from(complaint_count) * 100.0;
    clamp_logged(rate, 0.0, MAX_RECURRENCE_RATE, "recurrence rate")
}

fn clamp_logged(value: f64, min: f64, max: f64, what: &str) -> f64 {
    let clamped = value.clamp(min, max);
    if (clamped - value).abs() > f64::EPSILON {
        log::warn!("Clamped {what} {value} to [{min}, {max}]");
    }
    clamped
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_count_u32(value: f64) -> u32 {
    value.round().clamp(0.0, f64::from(u32::MAX)) as u32
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn to_count_u64(value: f64) -> u64 {
    value.round().clamp(0.0, u64::MAX as f64) as u64
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn payload(value: Value) -> RawSignalPayload {
        RawSignalPayload(value)
    }

    #[test]
    fn normalizes_complete_payload() {
        let set = normalize(&payload(json!({
            "human": { "complaintCount": 24, "trend": "increasing", "recurrenceRate": 8 },
            "geo": {
                "structuralVulnerability": 8.5,
                "alleyStructure": "poor",
                "ventilation": "poor",
                "accessibility": "poor"
            },
            "population": { "daytime": 12000, "nighttime": 8000, "changeRatePct": 15.2, "trend": "increasing" },
            "pigeon": { "detected": true, "intensity": "medium" }
        })));

        assert!(set.is_complete());
        assert_eq!(set.human.complaint_count, 24);
        assert_eq!(set.human.trend, Trend::Increasing);
        assert!((set.human.recurrence_rate - 8.0).abs() < f64::EPSILON);
        assert!((set.geo.structural_vulnerability - 8.5).abs() < f64::EPSILON);
        assert_eq!(set.geo.alley_structure, StructureCondition::Poor);
        let population = set.population.unwrap();
        assert_eq!(population.daytime, 12_000);
        assert!((population.change_rate_pct - 15.2).abs() < f64::EPSILON);
        assert_eq!(
            set.pigeon,
            Some(PigeonSignal {
                detected: true,
                intensity: PigeonIntensity::Medium
            })
        );
    }

    #[test]
    fn absent_optional_signals_stay_absent() {
        let set = normalize(&payload(json!({
            "human": { "complaintCount": 3 },
            "geo": { "structuralVulnerability": 2 }
        })));
        assert!(set.population.is_none());
        assert!(set.pigeon.is_none());
        assert!(set.is_complete());
    }

    #[test]
    fn missing_required_signals_are_recorded() {
        let set = normalize(&payload(json!({ "population": { "changeRatePct": 1.0 } })));
        assert_eq!(set.defaulted_signals, vec![SignalKind::Human, SignalKind::Geo]);
        assert_eq!(set.human, HumanSignal::default());
        assert_eq!(set.geo, GeoSignal::default());
        assert!(!set.is_complete());
    }

    #[test]
    fn empty_or_malformed_required_sections_count_as_defaulted() {
        let set = normalize(&payload(json!({ "human": "n/a", "geo": {} })));
        assert_eq!(set.defaulted_signals, vec![SignalKind::Human, SignalKind::Geo]);
        assert_eq!(set.human, HumanSignal::default());
        assert_eq!(set.geo, GeoSignal::default());
        assert!(!set.is_complete());

        let unknown_fields = normalize(&payload(json!({
            "human": { "mood": "grumpy" },
            "geo": { "ventilation": "good" }
        })));
        assert_eq!(unknown_fields.defaulted_signals, vec![SignalKind::Human]);
        assert_eq!(unknown_fields.geo.ventilation, StructureCondition::Good);
    }

    #[test]
    fn empty_population_section_stays_absent() {
        let set = normalize(&payload(json!({
            "human": { "complaintCount": 1 },
            "geo": { "structuralVulnerability": 2 },
            "population": {}
        })));
        assert!(set.population.is_none());
        assert!(set.is_complete());

        let scalar = normalize(&payload(json!({
            "human": { "complaintCount": 1 },
            "geo": { "structuralVulnerability": 2 },
            "population": 1200
        })));
        assert!(scalar.population.is_none());
    }

    #[test]
    fn clamps_out_of_range_values() {
        let set = normalize(&payload(json!({
            "human": { "complaintCount": -4, "recurrenceRate": 250 },
            "geo": { "structuralVulnerability": 14.2 }
        })));
        assert_eq!(set.human.complaint_count, 0);
        assert!((set.human.recurrence_rate - 100.0).abs() < f64::EPSILON);
        assert!((set.geo.structural_vulnerability - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn accepts_snake_case_strings_and_nested_signals() {
        let set = normalize(&payload(json!({
            "unitId": "u-1",
            "signals": {
                "human": { "complaint_count": "7", "trend": "Down", "recurrence_rate": "12.5" },
                "geo": { "vulnerability_score": "3.5", "alley_structure": "GOOD" }
            },
            "extra": { "ignored": true }
        })));
        assert_eq!(set.human.complaint_count, 7);
        assert_eq!(set.human.trend, Trend::Decreasing);
        assert!((set.human.recurrence_rate - 12.5).abs() < f64::EPSILON);
        assert!((set.geo.structural_vulnerability - 3.5).abs() < f64::EPSILON);
        assert_eq!(set.geo.alley_structure, StructureCondition::Good);
        assert_eq!(set.geo.ventilation, StructureCondition::Medium);
    }

    #[test]
    fn converts_recurrence_count_to_rate() {
        let set = normalize(&payload(json!({
            "human": { "complaintCount": 20, "recurrenceCount": 5 },
            "geo": {}
        })));
        assert!((set.human.recurrence_rate - 25.0).abs() < 1e-9);

        let no_complaints = normalize(&payload(json!({
            "human": { "complaintCount": 0, "recurrence": 3 },
            "geo": {}
        })));
        assert!(no_complaints.human.recurrence_rate.abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_categories_fall_back_to_neutral() {
        let set = normalize(&payload(json!({
            "human": { "trend": "sideways" },
            "geo": { "ventilation": "unknown" }
        })));
        assert_eq!(set.human.trend, Trend::Stable);
        assert_eq!(set.geo.ventilation, StructureCondition::Medium);
    }

    #[test]
    fn pigeon_shapes() {
        let flag_only = normalize(&payload(json!({ "human": {}, "geo": {}, "pigeon": true })));
        assert_eq!(
            flag_only.pigeon,
            Some(PigeonSignal {
                detected: true,
                intensity: PigeonIntensity::Low
            })
        );

        let intensity_only = normalize(&payload(json!({
            "human": {}, "geo": {}, "pigeon": { "intensity": "high" }
        })));
        assert_eq!(
            intensity_only.pigeon,
            Some(PigeonSignal {
                detected: true,
                intensity: PigeonIntensity::High
            })
        );

        let not_detected = normalize(&payload(json!({
            "human": {}, "geo": {}, "pigeon": { "detected": false }
        })));
        assert_eq!(
            not_detected.pigeon,
            Some(PigeonSignal {
                detected: false,
                intensity: PigeonIntensity::Absent
            })
        );
    }

    #[test]
    fn normalize_unit_extracts_identity() {
        let unit = normalize_unit(&payload(json!({
            "unit_id": "mapo-3",
            "name": "Mapo 3",
            "lat": 37.55,
            "lng": 126.91,
            "human": {}, "geo": {}
        })))
        .unwrap();
        assert_eq!(unit.unit.unit_id, "mapo-3");
        assert_eq!(unit.unit.name, "Mapo 3");
        assert_eq!(unit.unit.coordinates(), Some((37.55, 126.91)));
    }

    #[test]
    fn normalize_unit_without_coordinates_is_valid() {
        let unit = normalize_unit(&payload(json!({ "id": 7, "human": {}, "geo": {} }))).unwrap();
        assert_eq!(unit.unit.unit_id, "7");
        assert_eq!(unit.unit.name, "7");
        assert!(unit.unit.coordinates().is_none());
    }

    #[test]
    fn normalize_units_skips_payloads_without_id() {
        let units = normalize_units(&[
            payload(json!({ "unitId": "a", "human": {}, "geo": {} })),
            payload(json!({ "human": {}, "geo": {} })),
        ]);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].unit.unit_id, "a");
    }
}
