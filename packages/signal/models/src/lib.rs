#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Spatial unit and per-unit signal types.
//!
//! Defines the canonical, normalized shape of every signal that feeds the
//! Urban Comfort Index: the citizen-complaint ("human") signal, the
//! geographic/structural signal, optional population dynamics and the
//! optional low-weight ecological proxy (pigeon activity). Raw payloads in
//! whatever shape the data-fetch layer produced are wrapped in
//! [`RawSignalPayload`] and turned into a [`SignalSet`] by the normalizer.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A neighborhood or other spatial unit the index is computed for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpatialUnit {
    /// Stable identifier (e.g. `"seongsu-1"`).
    pub unit_id: String,
    /// Display label.
    pub name: String,
    /// Latitude, when known.
    pub lat: Option<f64>,
    /// Longitude, when known.
    pub lng: Option<f64>,
}

impl SpatialUnit {
    /// Creates a unit without coordinates.
    #[must_use]
    pub fn new(unit_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            unit_id: unit_id.into(),
            name: name.into(),
            lat: None,
            lng: None,
        }
    }

    /// Returns `(lat, lng)` when both coordinates are present.
    #[must_use]
    pub const fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        }
    }
}

/// Direction of change of a signal over its reporting period.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum Trend {
    /// Getting worse (more complaints, faster population change).
    #[strum(to_string = "increasing", serialize = "rising", serialize = "up")]
    Increasing,
    /// No meaningful change.
    #[default]
    #[strum(to_string = "stable", serialize = "flat", serialize = "steady")]
    Stable,
    /// Improving.
    #[strum(to_string = "decreasing", serialize = "falling", serialize = "down")]
    Decreasing,
}

/// Ordinal condition of a structural feature (alley, ventilation, access).
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum StructureCondition {
    /// Well maintained.
    #[strum(to_string = "good", serialize = "excellent")]
    Good,
    /// Average condition.
    #[default]
    #[strum(
        to_string = "medium",
        serialize = "moderate",
        serialize = "normal",
        serialize = "average"
    )]
    Medium,
    /// Deficient.
    #[strum(to_string = "poor", serialize = "bad")]
    Poor,
}

/// Observed intensity of the ecological proxy.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum PigeonIntensity {
    /// Heavy activity.
    #[strum(to_string = "high")]
    High,
    /// Moderate activity.
    #[strum(to_string = "medium", serialize = "moderate")]
    Medium,
    /// Light activity.
    #[strum(to_string = "low")]
    Low,
    /// No activity observed.
    #[default]
    #[serde(rename = "none")]
    #[strum(to_string = "none", serialize = "absent")]
    Absent,
}

/// Identifies one category of signal.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SignalKind {
    /// Citizen complaints.
    Human,
    /// Geographic/structural vulnerability.
    Geo,
    /// Population dynamics.
    Population,
    /// Ecological proxy.
    Pigeon,
}

/// Citizen-complaint signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanSignal {
    /// Complaints filed during the reporting period.
    pub complaint_count: u32,
    /// Complaint trend.
    pub trend: Trend,
    /// Share of complaints that are repeats of an earlier complaint, as a
    /// percentage in `[0, 100]`.
    pub recurrence_rate: f64,
}

impl Default for HumanSignal {
    fn default() -> Self {
        Self {
            complaint_count: 0,
            trend: Trend::Stable,
            recurrence_rate: 0.0,
        }
    }
}

/// Geographic/structural signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoSignal {
    /// Structural vulnerability in `[0, 10]`.
    pub structural_vulnerability: f64,
    /// Alley layout condition.
    pub alley_structure: StructureCondition,
    /// Ventilation condition.
    pub ventilation: StructureCondition,
    /// Accessibility condition.
    pub accessibility: StructureCondition,
}

impl GeoSignal {
    /// Midpoint of the vulnerability scale, used when no geo signal exists.
    pub const NEUTRAL_VULNERABILITY: f64 = 5.0;

    /// Returns the three structural categories.
    #[must_use]
    pub const fn conditions(&self) -> [StructureCondition; 3] {
        [self.alley_structure, self.ventilation, self.accessibility]
    }
}

impl Default for GeoSignal {
    fn default() -> Self {
        Self {
            structural_vulnerability: Self::NEUTRAL_VULNERABILITY,
            alley_structure: StructureCondition::Medium,
            ventilation: StructureCondition::Medium,
            accessibility: StructureCondition::Medium,
        }
    }
}

/// Population dynamics signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationSignal {
    /// Daytime population.
    pub daytime: u64,
    /// Nighttime (resident) population.
    pub nighttime: u64,
    /// Population change over the reporting period, in percent. Signed.
    pub change_rate_pct: f64,
    /// Population trend.
    pub trend: Trend,
}

/// Ecological proxy signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PigeonSignal {
    /// Whether activity was detected at all.
    pub detected: bool,
    /// Activity intensity.
    pub intensity: PigeonIntensity,
}

impl PigeonSignal {
    /// Returns the effective intensity: [`PigeonIntensity::Absent`] when
    /// nothing was detected, regardless of the reported intensity.
    #[must_use]
    pub const fn effective_intensity(&self) -> PigeonIntensity {
        if self.detected {
            self.intensity
        } else {
            PigeonIntensity::Absent
        }
    }
}

/// The normalized signals for one unit on one reporting date.
///
/// Never mutated after construction; a re-fetch replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalSet {
    /// Citizen-complaint signal.
    pub human: HumanSignal,
    /// Geographic/structural signal.
    pub geo: GeoSignal,
    /// Population dynamics, when measured.
    pub population: Option<PopulationSignal>,
    /// Ecological proxy, when measured.
    pub pigeon: Option<PigeonSignal>,
    /// Required signals that were missing from the raw payload and were
    /// filled with neutral defaults.
    #[serde(default)]
    pub defaulted_signals: Vec<SignalKind>,
}

impl SignalSet {
    /// Creates a signal set from measured human and geo signals.
    #[must_use]
    pub const fn new(human: HumanSignal, geo: GeoSignal) -> Self {
        Self {
            human,
            geo,
            population: None,
            pigeon: None,
            defaulted_signals: Vec::new(),
        }
    }

    /// Adds a population signal.
    #[must_use]
    pub fn with_population(mut self, population: PopulationSignal) -> Self {
        self.population = Some(population);
        self
    }

    /// Adds an ecological proxy signal.
    #[must_use]
    pub fn with_pigeon(mut self, pigeon: PigeonSignal) -> Self {
        self.pigeon = Some(pigeon);
        self
    }

    /// Returns `true` when both required signals came from real data.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.defaulted_signals.is_empty()
    }
}

/// A unit paired with its normalized signals for one reporting date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitSignals {
    /// The unit.
    pub unit: SpatialUnit,
    /// Its signals.
    pub signals: SignalSet,
}

/// A raw, loosely-typed per-unit signal payload as delivered by the
/// data-fetch layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawSignalPayload(pub serde_json::Value);

impl RawSignalPayload {
    /// Returns the underlying JSON value.
    #[must_use]
    pub const fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

impl From<serde_json::Value> for RawSignalPayload {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}
