//! Z-score anomaly detection against a trailing window.
//!
//! The window is the `window_weeks * points_per_week` observations strictly
//! before the checked observation. With fewer observations than that, the
//! check is not run and the record says so explicitly. A flat window
//! (zero standard deviation) yields `z = 0`, so a constant history never
//! flags. The severity score `|z| / score_divisor` is a bounded, monotonic
//! proxy; the divisor is a tuning knob, not a calibrated probability.

use urban_comfort_scoring_models::config::AnomalyConfig;
use urban_comfort_scoring_models::{AnomalyRecord, AnomalyStatus, Observation, TimeSeries};

/// Explanation used when the history is too short.
pub const INSUFFICIENT_HISTORY: &str = "insufficient history";

/// Checks `current` against the trailing window of `history`.
#[must_use]
pub fn detect_anomaly(
    unit_id: &str,
    history: &TimeSeries,
    current: &Observation,
    config: &AnomalyConfig,
) -> AnomalyRecord {
    let window_points = config.window_points();
    let mut prior: Vec<&Observation> = history
        .points
        .iter()
        .filter(|point| point.date < current.date)
        .collect();
    prior.sort_by_key(|point| point.date);

    if window_points == 0 || prior.len() < window_points {
        log::debug!(
            "Anomaly check for {unit_id} skipped: {} of {window_points} points",
            prior.len()
        );
        return AnomalyRecord {
            unit_id: unit_id.to_string(),
            date: current.date,
            score: 0.0,
            flag: false,
            z_score: 0.0,
            explanation: INSUFFICIENT_HISTORY.to_string(),
            status: AnomalyStatus::InsufficientHistory,
        };
    }

    let window: Vec<f64> = prior[prior.len() - window_points..]
        .iter()
        .map(|point| point.value)
        .collect();
    let (mean, std_dev) = mean_std(&window);
    let flat = std_dev <= f64::EPSILON * mean.abs().max(1.0);
    let z_score = if flat {
        0.0
    } else {
        (current.value - mean) / std_dev
    };

    let flag = z_score.abs() >= config.z_threshold;
    let score = if config.score_divisor > 0.0 {
        (z_score.abs() / config.score_divisor).clamp(0.0, 1.0)
    } else if flag {
        1.0
    } else {
        0.0
    };

    AnomalyRecord {
        unit_id: unit_id.to_string(),
        date: current.date,
        score,
        flag,
        z_score,
        explanation: explain(
            &history.metric,
            window[0],
            current.value,
            mean,
            z_score,
            flat,
            config.window_weeks,
        ),
        status: AnomalyStatus::Evaluated,
    }
}

/// Checks the latest observation of `series` against the ones before it.
///
/// Returns `None` for an empty series.
#[must_use]
pub fn detect_latest(unit_id: &str, series: &TimeSeries, config: &AnomalyConfig) -> Option<AnomalyRecord> {
    let current = series.points.iter().max_by_key(|point| point.date)?;
    Some(detect_anomaly(unit_id, series, current, config))
}

/// Population mean and standard deviation.
#[allow(clippy::cast_precision_loss)]
fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

fn explain(
    metric: &str,
    base: f64,
    current: f64,
    mean: f64,
    z_score: f64,
    flat: bool,
    window_weeks: u32,
) -> String {
    let weeks = if window_weeks == 1 { "week" } else { "weeks" };
    let change = if base.abs() < f64::EPSILON {
        format!("{metric} at {current:.1} vs. mean {mean:.1}")
    } else {
        let pct = (current - base) / base.abs() * 100.0;
        if pct.round().abs() < f64::EPSILON {
            format!("{metric} unchanged")
        } else if pct > 0.0 {
            format!("{metric} up {:.0}%", pct.abs())
        } else {
            format!("{metric} down {:.0}%", pct.abs())
        }
    };
    let flat_note = if flat { " (flat history)" } else { "" };
    format!("{change} over {window_weeks} {weeks}, z={z_score:.1}{flat_note}")
}
