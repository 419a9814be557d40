#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Result and configuration types for the Urban Comfort Index engine.
//!
//! Everything here is plain, serializable data with no behavior beyond
//! small accessors: score breakdowns, priority queue entries, blind-spot
//! and anomaly records, forecasts and intervention effects, plus the
//! [`config`] structures that carry every tunable weight and threshold.
//! Records serialize with camelCase field names to match the dashboard's
//! REST payloads field-for-field.

pub mod config;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Letter grade of a composite index, from A (best) to E (worst).
///
/// Variants are declared best-first, so `Grade::A < Grade::E`.
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
pub enum Grade {
    /// Comfortable.
    A,
    /// Mostly comfortable.
    B,
    /// Watch.
    C,
    /// Poor.
    D,
    /// Critical.
    E,
}

impl Grade {
    /// Returns all grades, best first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::A, Self::B, Self::C, Self::D, Self::E]
    }
}

/// Coarse inspection priority derived from a grade.
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
pub enum PriorityTier {
    /// Inspect first.
    High,
    /// Inspect when capacity allows.
    Medium,
    /// Routine monitoring.
    Low,
}

impl PriorityTier {
    /// Returns all tiers, most urgent first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::High, Self::Medium, Self::Low]
    }
}

/// Grade and tier for one composite index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    /// Letter grade.
    pub grade: Grade,
    /// Inspection priority.
    pub priority_tier: PriorityTier,
}

/// Per-signal sub-scores and the composite index for one signal set.
///
/// Derived on demand; never stored apart from the signals it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    /// Citizen-complaint sub-score in `[0, 100]`.
    pub human_score: f64,
    /// Geographic/structural sub-score in `[0, 100]`.
    pub geo_score: f64,
    /// Population dynamics sub-score in `[0, 100]`.
    pub population_score: f64,
    /// Signed correction from the ecological proxy (zero or negative).
    pub ecological_adjustment: f64,
    /// Composite Urban Comfort Index in `[0, 100]`.
    pub composite_index: u8,
    /// Letter grade of the composite index.
    pub grade: Grade,
    /// Inspection priority of the composite index.
    pub priority_tier: PriorityTier,
}

/// A score breakdown tagged with the unit it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredUnit {
    /// Unit identifier.
    pub unit_id: String,
    /// Unit display name.
    pub name: String,
    /// The unit's scores.
    pub breakdown: ScoreBreakdown,
}

/// One row of the inspection priority queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityQueueEntry {
    /// Unit identifier.
    pub unit_id: String,
    /// 1-based position, worst unit first.
    pub rank: u32,
    /// Composite index.
    pub composite_index: u8,
    /// Letter grade.
    pub grade: Grade,
    /// Inspection priority.
    pub priority_tier: PriorityTier,
}

/// Blind-spot risk of a unit.
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
pub enum RiskLevel {
    /// Signals disagree in the under-reporting pattern.
    High,
    /// Signals partially disagree.
    Medium,
    /// Signals broadly agree.
    Low,
}

/// Pairwise agreement between signals, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossSignalAgreement {
    /// Agreement between complaint and structural signals.
    pub human_geo: f64,
    /// Agreement between complaint and population signals, when population
    /// was measured.
    pub human_population: Option<f64>,
    /// Mean of the pairwise scores present.
    pub overall: f64,
}

/// Blind-spot classification of one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlindSpotRecord {
    /// Unit identifier.
    pub unit_id: String,
    /// Risk level.
    pub risk_level: RiskLevel,
    /// Templated explanation of the strongest disagreement.
    pub detection_reason: String,
    /// Pairwise agreement scores.
    pub cross_signal_agreement: CrossSignalAgreement,
}

/// Whether an anomaly check had enough history to run.
#[derive(
    Debug,
    Clone,
    Copy,
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
#[strum(serialize_all = "snake_case")]
pub enum AnomalyStatus {
    /// The z-score was computed.
    Evaluated,
    /// Fewer points than the window requires; nothing was computed.
    InsufficientHistory,
}

/// Result of an anomaly check for one unit and date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyRecord {
    /// Unit identifier.
    pub unit_id: String,
    /// Date of the checked observation.
    pub date: NaiveDate,
    /// Bounded severity in `[0, 1]`.
    pub score: f64,
    /// Whether the observation is anomalous.
    pub flag: bool,
    /// Standard score of the observation against the trailing window.
    pub z_score: f64,
    /// Human-readable summary.
    pub explanation: String,
    /// Whether the check ran.
    pub status: AnomalyStatus,
}

/// What a time series measures, which fixes its value domain.
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
#[strum(serialize_all = "snake_case")]
pub enum SeriesKind {
    /// Composite index values in `[0, 100]`; higher is better.
    CompositeIndex,
    /// Non-negative counts (complaints); lower is better.
    #[default]
    Count,
    /// Any real value; direction is not interpreted.
    Unbounded,
}

/// One dated value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    /// Observation date.
    pub date: NaiveDate,
    /// Observed value.
    pub value: f64,
}

/// A time-ordered series of observations for one unit and metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeries {
    /// Metric label used in explanations (e.g. `"complaints"`).
    pub metric: String,
    /// Value domain of the series.
    #[serde(default)]
    pub kind: SeriesKind,
    /// Observations, oldest first.
    pub points: Vec<Observation>,
}

impl TimeSeries {
    /// Creates a series, sorting the points by date.
    #[must_use]
    pub fn new(metric: impl Into<String>, kind: SeriesKind, mut points: Vec<Observation>) -> Self {
        points.sort_by_key(|p| p.date);
        Self {
            metric: metric.into(),
            kind,
            points,
        }
    }

    /// Returns the number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` when the series has no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A forecast value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    /// Forecast date.
    pub date: NaiveDate,
    /// Forecast value.
    pub value: f64,
}

/// A trailing moving-average value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovingAveragePoint {
    /// Date of the last observation in the window.
    pub date: NaiveDate,
    /// Mean of the window.
    pub value: f64,
}

/// Smoothed view and short-horizon forecast of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendAnalysis {
    /// Metric label.
    pub metric: String,
    /// Short moving average (7 observations by default).
    pub short_moving_average: Vec<MovingAveragePoint>,
    /// Long moving average (14 observations by default).
    pub long_moving_average: Vec<MovingAveragePoint>,
    /// Least-squares slope per day, when at least two points exist.
    pub slope_per_day: Option<f64>,
    /// Extrapolated values.
    pub forecast: Vec<ForecastPoint>,
}

/// Direction of an intervention's measured effect.
#[derive(
    Debug,
    Clone,
    Copy,
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
#[strum(serialize_all = "snake_case")]
pub enum InterventionOutcome {
    /// The metric moved in its better direction.
    Improved,
    /// The metric moved in its worse direction.
    Worsened,
    /// The change is within tolerance, or the series has no direction.
    Unchanged,
    /// Too few points on one side of the intervention date.
    InsufficientData,
}

/// Before/after comparison around an intervention date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterventionEffect {
    /// Unit identifier.
    pub unit_id: String,
    /// Metric label.
    pub metric: String,
    /// Date the intervention took effect.
    pub intervention_date: NaiveDate,
    /// Mean before the intervention, when any points exist.
    pub before_mean: Option<f64>,
    /// Mean on or after the intervention, when any points exist.
    pub after_mean: Option<f64>,
    /// Points used before the intervention.
    pub before_points: usize,
    /// Points used after the intervention.
    pub after_points: usize,
    /// `after_mean - before_mean`, when both exist.
    pub absolute_change: Option<f64>,
    /// Percentage change relative to `before_mean`, when it is non-zero.
    pub percent_change: Option<f64>,
    /// Interpreted direction.
    pub outcome: InterventionOutcome,
}

/// Dashboard-level aggregate over a priority queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// Units in the queue.
    pub unit_count: u64,
    /// Mean composite index, when the queue is non-empty.
    pub average_index: Option<f64>,
    /// Units per grade (every grade present).
    pub grade_distribution: BTreeMap<Grade, u64>,
    /// Units per tier (every tier present).
    pub tier_counts: BTreeMap<PriorityTier, u64>,
}
