//! Loading and validating [`EngineConfig`] from TOML.
//!
//! The default policy ships embedded via [`include_str!`]. Override files
//! are merged field-by-field over the defaults (every config struct is
//! `#[serde(default)]`) and validated before use.

use std::path::Path;

use urban_comfort_scoring_models::config::{
    AnomalyConfig, BlindSpotPolicy, EcologicalScoring, EngineConfig, ForecastConfig, GradeTable,
    InterventionConfig, ScoringConfig,
};

use crate::ConfigError;

/// The embedded default policy.
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../config/default.toml");

/// Returns the embedded default policy.
///
/// # Panics
///
/// Panics if the embedded TOML fails to parse or validate. Since it is a
/// compile-time constant, a failure indicates a development error and is
/// caught by the tests.
#[must_use]
pub fn embedded_default() -> EngineConfig {
    from_toml_str(DEFAULT_CONFIG_TOML)
        .unwrap_or_else(|e| panic!("Failed to load embedded default config: {e}"))
}

/// Parses and validates a TOML policy.
///
/// # Errors
///
/// Returns [`ConfigError::Toml`] if the document does not parse, or
/// [`ConfigError::Invalid`] if a value is out of range.
pub fn from_toml_str(content: &str) -> Result<EngineConfig, ConfigError> {
    let config: EngineConfig = toml::de::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Reads, parses and validates a TOML policy file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read, otherwise the
/// errors of [`from_toml_str`].
pub fn load(path: &Path) -> Result<EngineConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let config = from_toml_str(&content)?;
    log::info!("Loaded engine config from {}", path.display());
    Ok(config)
}

/// Renders a policy as TOML.
///
/// # Errors
///
/// Returns [`ConfigError::Serialize`] if serialization fails.
pub fn to_toml_string(config: &EngineConfig) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(config)?)
}

/// Checks every section of `config` for out-of-range values.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] describing the first problem found.
pub fn validate(config: &EngineConfig) -> Result<(), ConfigError> {
    validate_scoring(&config.scoring)?;
    validate_grades(&config.grades)?;
    validate_blind_spot(&config.blind_spot)?;
    validate_anomaly(&config.anomaly)?;
    validate_forecast(&config.forecast)?;
    validate_intervention(&config.intervention)
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        message: message.into(),
    }
}

fn ensure(condition: bool, message: impl FnOnce() -> String) -> Result<(), ConfigError> {
    if condition {
        Ok(())
    } else {
        Err(invalid(message()))
    }
}

fn ensure_non_negative(name: &str, value: f64) -> Result<(), ConfigError> {
    ensure(value.is_finite() && value >= 0.0, || {
        format!("{name} must be a non-negative number, got {value}")
    })
}

fn validate_scoring(scoring: &ScoringConfig) -> Result<(), ConfigError> {
    let weights = &scoring.weights;
    for (name, value) in [
        ("scoring.weights.human", weights.human),
        ("scoring.weights.geo", weights.geo),
        ("scoring.weights.population", weights.population),
    ] {
        ensure_non_negative(name, value)?;
    }
    let total = weights.human + weights.geo + weights.population;
    ensure(total > 0.0, || "scoring.weights must not all be zero".to_string())?;

    let baseline = &scoring.trend_baseline;
    for (name, value) in [
        ("scoring.trend_baseline.increasing", baseline.increasing),
        ("scoring.trend_baseline.stable", baseline.stable),
        ("scoring.trend_baseline.decreasing", baseline.decreasing),
        ("scoring.human.complaint_multiplier", scoring.human.complaint_multiplier),
        ("scoring.human.complaint_cap", scoring.human.complaint_cap),
        ("scoring.human.recurrence_multiplier", scoring.human.recurrence_multiplier),
        ("scoring.human.recurrence_cap", scoring.human.recurrence_cap),
        ("scoring.geo.vulnerability_multiplier", scoring.geo.vulnerability_multiplier),
        ("scoring.geo.condition_scores.good", scoring.geo.condition_scores.good),
        ("scoring.geo.condition_scores.medium", scoring.geo.condition_scores.medium),
        ("scoring.geo.condition_scores.poor", scoring.geo.condition_scores.poor),
        ("scoring.population.absent_score", scoring.population.absent_score),
        ("scoring.population.change_multiplier", scoring.population.change_multiplier),
        ("scoring.population.change_cap", scoring.population.change_cap),
    ] {
        ensure_non_negative(name, value)?;
    }
    ensure(
        baseline.increasing <= baseline.stable && baseline.stable <= baseline.decreasing,
        || "scoring.trend_baseline must satisfy increasing <= stable <= decreasing".to_string(),
    )?;

    validate_ecological(&scoring.ecological)
}

fn validate_ecological(ecological: &EcologicalScoring) -> Result<(), ConfigError> {
    for (name, value) in [
        ("scoring.ecological.high", ecological.high),
        ("scoring.ecological.medium", ecological.medium),
        ("scoring.ecological.low", ecological.low),
    ] {
        ensure((-10.0..=0.0).contains(&value), || {
            format!("{name} must be in [-10, 0], got {value}")
        })?;
    }
    ensure((0.0..=0.1).contains(&ecological.max_share), || {
        format!(
            "scoring.ecological.max_share must be in [0, 0.1], got {}",
            ecological.max_share
        )
    })
}

fn validate_grades(grades: &GradeTable) -> Result<(), ConfigError> {
    ensure(!grades.bands.is_empty(), || "grades.bands must not be empty".to_string())?;

    for pair in grades.bands.windows(2) {
        let (upper, lower) = (&pair[0], &pair[1]);
        ensure(upper.min_score > lower.min_score, || {
            format!(
                "grades.bands thresholds must strictly decrease ({} then {})",
                upper.min_score, lower.min_score
            )
        })?;
        ensure(upper.grade < lower.grade, || {
            format!(
                "grades.bands grades must worsen as thresholds decrease ({} then {})",
                upper.grade, lower.grade
            )
        })?;
        // PriorityTier is declared High first, so a later band may not
        // have a less urgent tier.
        ensure(upper.tier >= lower.tier, || {
            format!(
                "grades.bands tiers must not become less urgent as thresholds decrease ({} then {})",
                upper.tier, lower.tier
            )
        })?;
    }

    let lowest = grades.bands.last().map_or(0, |band| band.min_score);
    ensure(lowest == 0, || {
        format!("the last grades.bands entry must start at 0, got {lowest}")
    })?;
    let highest = grades.bands.first().map_or(0, |band| band.min_score);
    ensure(highest <= 100, || {
        format!("grades.bands thresholds must be at most 100, got {highest}")
    })
}

fn validate_blind_spot(policy: &BlindSpotPolicy) -> Result<(), ConfigError> {
    ensure(
        0.0 <= policy.high_risk_below
            && policy.high_risk_below <= policy.medium_risk_below
            && policy.medium_risk_below <= 100.0,
        || {
            format!(
                "blind_spot thresholds must satisfy 0 <= high_risk_below ({}) <= medium_risk_below ({}) <= 100",
                policy.high_risk_below, policy.medium_risk_below
            )
        },
    )?;
    ensure(
        (0.0..=1.0).contains(&policy.low_signal_max)
            && (0.0..=1.0).contains(&policy.high_signal_min)
            && policy.low_signal_max < policy.high_signal_min,
        || {
            format!(
                "blind_spot signal bounds must satisfy 0 <= low_signal_max ({}) < high_signal_min ({}) <= 1",
                policy.low_signal_max, policy.high_signal_min
            )
        },
    )?;
    for (name, value) in [
        ("blind_spot.complaint_saturation", policy.complaint_saturation),
        (
            "blind_spot.population_change_saturation",
            policy.population_change_saturation,
        ),
    ] {
        ensure(value.is_finite() && value > 0.0, || {
            format!("{name} must be positive, got {value}")
        })?;
    }
    ensure((0.0..=1.0).contains(&policy.vulnerability_weight), || {
        format!(
            "blind_spot.vulnerability_weight must be in [0, 1], got {}",
            policy.vulnerability_weight
        )
    })
}

fn validate_anomaly(anomaly: &AnomalyConfig) -> Result<(), ConfigError> {
    ensure(anomaly.window_weeks > 0 && anomaly.points_per_week > 0, || {
        "anomaly.window_weeks and anomaly.points_per_week must be positive".to_string()
    })?;
    ensure(anomaly.z_threshold.is_finite() && anomaly.z_threshold > 0.0, || {
        format!("anomaly.z_threshold must be positive, got {}", anomaly.z_threshold)
    })?;
    ensure(anomaly.score_divisor.is_finite() && anomaly.score_divisor > 0.0, || {
        format!("anomaly.score_divisor must be positive, got {}", anomaly.score_divisor)
    })
}

fn validate_forecast(forecast: &ForecastConfig) -> Result<(), ConfigError> {
    ensure(forecast.short_window > 0, || "forecast.short_window must be positive".to_string())?;
    ensure(forecast.short_window <= forecast.long_window, || {
        format!(
            "forecast.short_window ({}) must not exceed forecast.long_window ({})",
            forecast.short_window, forecast.long_window
        )
    })?;
    ensure(forecast.slope_window >= 2, || {
        format!(
            "forecast.slope_window must be at least 2, got {}",
            forecast.slope_window
        )
    })?;
    ensure(forecast.max_horizon_days > 0, || {
        "forecast.max_horizon_days must be positive".to_string()
    })
}

fn validate_intervention(intervention: &InterventionConfig) -> Result<(), ConfigError> {
    ensure(intervention.min_points_per_side > 0, || {
        "intervention.min_points_per_side must be positive".to_string()
    })?;
    ensure(intervention.window_points >= intervention.min_points_per_side, || {
        format!(
            "intervention.window_points ({}) must be at least min_points_per_side ({})",
            intervention.window_points, intervention.min_points_per_side
        )
    })?;
    ensure_non_negative("intervention.unchanged_tolerance", intervention.unchanged_tolerance)
}
