//! Tunable policy for every engine component.
//!
//! Weights, caps, grade boundaries and thresholds live here as data so a
//! policy change is a configuration edit, not a code change. Every struct
//! deserializes with `#[serde(default)]`, so a TOML override only needs the
//! fields it changes.

use serde::{Deserialize, Serialize};

use crate::{Grade, PriorityTier};

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Composite index scoring.
    pub scoring: ScoringConfig,
    /// Grade boundaries.
    pub grades: GradeTable,
    /// Blind-spot heuristic.
    pub blind_spot: BlindSpotPolicy,
    /// Anomaly detection.
    pub anomaly: AnomalyConfig,
    /// Trend forecasting.
    pub forecast: ForecastConfig,
    /// Intervention tracking.
    pub intervention: InterventionConfig,
}

/// Scoring parameters for the composite index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Composite weights of the three scored signals.
    pub weights: SignalWeights,
    /// Trend baselines shared by the human and population sub-scores.
    pub trend_baseline: TrendBaselines,
    /// Human sub-score parameters.
    pub human: HumanScoring,
    /// Geo sub-score parameters.
    pub geo: GeoScoring,
    /// Population sub-score parameters.
    pub population: PopulationScoring,
    /// Ecological correction parameters.
    pub ecological: EcologicalScoring,
}

/// Composite weights. The ecological term is additive and unweighted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalWeights {
    /// Weight of the human sub-score.
    pub human: f64,
    /// Weight of the geo sub-score.
    pub geo: f64,
    /// Weight of the population sub-score.
    pub population: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            human: 0.4,
            geo: 0.35,
            population: 0.2,
        }
    }
}

/// Baseline score per trend direction. A trend's penalty is
/// `100 - baseline`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendBaselines {
    /// Baseline when the signal is increasing.
    pub increasing: f64,
    /// Baseline when the signal is stable.
    pub stable: f64,
    /// Baseline when the signal is decreasing.
    pub decreasing: f64,
}

impl Default for TrendBaselines {
    fn default() -> Self {
        Self {
            increasing: 30.0,
            stable: 50.0,
            decreasing: 70.0,
        }
    }
}

/// Human sub-score parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HumanScoring {
    /// Penalty points per complaint.
    pub complaint_multiplier: f64,
    /// Maximum complaint penalty.
    pub complaint_cap: f64,
    /// Penalty points per percentage point of recurrence rate.
    pub recurrence_multiplier: f64,
    /// Maximum recurrence penalty.
    pub recurrence_cap: f64,
}

impl Default for HumanScoring {
    fn default() -> Self {
        Self {
            complaint_multiplier: 3.0,
            complaint_cap: 50.0,
            recurrence_multiplier: 0.3,
            recurrence_cap: 30.0,
        }
    }
}

/// Geo sub-score parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoScoring {
    /// Penalty points per unit of structural vulnerability (0-10 scale).
    pub vulnerability_multiplier: f64,
    /// Score of each structural condition. The structural penalty is
    /// `100 - (alley + ventilation + accessibility)`.
    pub condition_scores: ConditionScores,
}

impl Default for GeoScoring {
    fn default() -> Self {
        Self {
            vulnerability_multiplier: 8.0,
            condition_scores: ConditionScores::default(),
        }
    }
}

/// Score per structural condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionScores {
    /// Score of a good condition.
    pub good: f64,
    /// Score of a medium condition.
    pub medium: f64,
    /// Score of a poor condition.
    pub poor: f64,
}

impl Default for ConditionScores {
    fn default() -> Self {
        Self {
            good: 30.0,
            medium: 20.0,
            poor: 10.0,
        }
    }
}

/// Population sub-score parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationScoring {
    /// Sub-score used when no population signal was measured.
    pub absent_score: f64,
    /// Penalty points per percentage point of positive population change.
    pub change_multiplier: f64,
    /// Maximum change penalty.
    pub change_cap: f64,
}

impl Default for PopulationScoring {
    fn default() -> Self {
        Self {
            absent_score: 70.0,
            change_multiplier: 2.0,
            change_cap: 30.0,
        }
    }
}

/// Ecological correction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcologicalScoring {
    /// Adjustment for high intensity (non-positive).
    pub high: f64,
    /// Adjustment for medium intensity (non-positive).
    pub medium: f64,
    /// Adjustment for low intensity (non-positive).
    pub low: f64,
    /// Maximum magnitude of the adjustment as a fraction of the final
    /// composite index.
    pub max_share: f64,
}

impl Default for EcologicalScoring {
    fn default() -> Self {
        Self {
            high: -5.0,
            medium: -3.0,
            low: -1.0,
            max_share: 0.10,
        }
    }
}

/// One grade band: composites at or above `min_score` (and below the
/// previous band's `min_score`) get `grade` and `tier`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeBand {
    /// Inclusive lower bound.
    pub min_score: u8,
    /// Grade of the band.
    pub grade: Grade,
    /// Priority tier of the band.
    pub tier: PriorityTier,
}

/// Ordered grade bands, highest threshold first. The last band must start
/// at zero so every composite is covered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeTable {
    /// The bands.
    pub bands: Vec<GradeBand>,
}

impl Default for GradeTable {
    fn default() -> Self {
        let band = |min_score, grade, tier| GradeBand {
            min_score,
            grade,
            tier,
        };
        Self {
            bands: vec![
                band(80, Grade::A, PriorityTier::Low),
                band(65, Grade::B, PriorityTier::Low),
                band(50, Grade::C, PriorityTier::Medium),
                band(35, Grade::D, PriorityTier::High),
                band(0, Grade::E, PriorityTier::High),
            ],
        }
    }
}

/// Blind-spot heuristic thresholds.
///
/// Signal magnitudes are normalized to `[0, 1]`; agreement scores to
/// `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlindSpotPolicy {
    /// Overall agreement below this can be high risk.
    pub high_risk_below: f64,
    /// Overall agreement below this (and not high) is medium risk.
    pub medium_risk_below: f64,
    /// A magnitude at or below this counts as a "low" signal.
    pub low_signal_max: f64,
    /// A magnitude at or above this counts as a "high" signal.
    pub high_signal_min: f64,
    /// Complaint count that maps to a full-scale human magnitude.
    pub complaint_saturation: f64,
    /// Absolute population change (percent) that maps to a full-scale
    /// population magnitude.
    pub population_change_saturation: f64,
    /// Share of the geo magnitude taken from structural vulnerability; the
    /// rest comes from the structural conditions.
    pub vulnerability_weight: f64,
    /// Whether the ecological proxy can supply the "high" signal.
    pub include_ecological: bool,
}

impl Default for BlindSpotPolicy {
    fn default() -> Self {
        Self {
            high_risk_below: 50.0,
            medium_risk_below: 75.0,
            low_signal_max: 0.3,
            high_signal_min: 0.6,
            complaint_saturation: 20.0,
            population_change_saturation: 20.0,
            vulnerability_weight: 0.7,
            include_ecological: true,
        }
    }
}

/// Anomaly detection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Length of the trailing window in weeks.
    pub window_weeks: u32,
    /// Observations per week in the input series (1 for weekly, 7 for
    /// daily).
    pub points_per_week: u32,
    /// Minimum absolute z-score that flags an anomaly.
    pub z_threshold: f64,
    /// Divisor mapping `|z|` onto the `[0, 1]` severity score.
    pub score_divisor: f64,
}

impl AnomalyConfig {
    /// Number of trailing observations the window covers.
    #[must_use]
    pub const fn window_points(&self) -> usize {
        (self.window_weeks as usize) * (self.points_per_week as usize)
    }
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            window_weeks: 4,
            points_per_week: 1,
            z_threshold: 2.5,
            score_divisor: 4.0,
        }
    }
}

/// Trend forecasting parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Short moving-average window.
    pub short_window: usize,
    /// Long moving-average window.
    pub long_window: usize,
    /// Number of most recent observations the slope is fitted on.
    pub slope_window: usize,
    /// Longest forecast horizon in days; longer requests are truncated.
    pub max_horizon_days: u32,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            short_window: 7,
            long_window: 14,
            slope_window: 14,
            max_horizon_days: 90,
        }
    }
}

/// Intervention tracking parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterventionConfig {
    /// Maximum observations used on each side of the intervention date.
    pub window_points: usize,
    /// Minimum observations required on each side.
    pub min_points_per_side: usize,
    /// Absolute change below which the outcome is `unchanged`.
    pub unchanged_tolerance: f64,
}

impl Default for InterventionConfig {
    fn default() -> Self {
        Self {
            window_points: 28,
            min_points_per_side: 2,
            unchanged_tolerance: 1.0,
        }
    }
}
