//! Before/after comparison around an intervention date.

use chrono::NaiveDate;
use urban_comfort_scoring_models::config::InterventionConfig;
use urban_comfort_scoring_models::{
    InterventionEffect, InterventionOutcome, Observation, SeriesKind, TimeSeries,
};

/// Compares the mean of `series` before `intervention_date` with the mean
/// on or after it.
///
/// At most `window_points` observations are used on each side: the last ones
/// before the date and the first ones after it. The direction of improvement
/// depends on the series kind: a rising composite index is better, a
/// falling count is better, and unbounded series have no direction.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compare_intervention(
    unit_id: &str,
    series: &TimeSeries,
    intervention_date: NaiveDate,
    config: &InterventionConfig,
) -> InterventionEffect {
    let mut points: Vec<&Observation> = series.points.iter().collect();
    points.sort_by_key(|point| point.date);
    let split = points.partition_point(|point| point.date < intervention_date);
    let (before, after) = points.split_at(split);

    let before = &before[before.len().saturating_sub(config.window_points)..];
    let after = &after[..after.len().min(config.window_points)];

    let before_mean = mean(before);
    let after_mean = mean(after);
    let absolute_change = before_mean.zip(after_mean).map(|(b, a)| a - b);
    let percent_change = before_mean
        .zip(absolute_change)
        .filter(|(b, _)| b.abs() > f64::EPSILON)
        .map(|(b, change)| change / b.abs() * 100.0);

    let outcome = if before.len() < config.min_points_per_side
        || after.len() < config.min_points_per_side
    {
        InterventionOutcome::InsufficientData
    } else {
        absolute_change.map_or(InterventionOutcome::InsufficientData, |change| {
            interpret(change, series.kind, config.unchanged_tolerance)
        })
    };

    log::debug!(
        "Intervention on {unit_id} ({}) at {intervention_date}: {} before, {} after, {outcome}",
        series.metric,
        before.len(),
        after.len(),
    );

    InterventionEffect {
        unit_id: unit_id.to_string(),
        metric: series.metric.clone(),
        intervention_date,
        before_mean,
        after_mean,
        before_points: before.len(),
        after_points: after.len(),
        absolute_change,
        percent_change,
        outcome,
    }
}

fn interpret(change: f64, kind: SeriesKind, tolerance: f64) -> InterventionOutcome {
    // A zero change is unchanged even with a zero tolerance.
    if change.abs() < tolerance.max(f64::EPSILON) {
        return InterventionOutcome::Unchanged;
    }
    match (kind, change > 0.0) {
        (SeriesKind::CompositeIndex, true) | (SeriesKind::Count, false) => InterventionOutcome::Improved,
        (SeriesKind::CompositeIndex, false) | (SeriesKind::Count, true) => InterventionOutcome::Worsened,
        (SeriesKind::Unbounded, _) => InterventionOutcome::Unchanged,
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(points: &[&Observation]) -> Option<f64> {
    if points.is_empty() {
        return None;
    }
    Some(points.iter().map(|point| point.value).sum::<f64>() / points.len() as f64)
}
