//! Moving averages and short-horizon linear forecasts.
//!
//! The forecast fits a least-squares line to the most recent
//! `slope_window` observations (x is days since the first fitted point)
//! and extrapolates it one day at a time past the last observation. With
//! fewer than two points, or all points on one date, there is no slope and
//! the forecast is empty rather than guessed.

use chrono::{Days, NaiveDate};
use urban_comfort_scoring_models::config::ForecastConfig;
use urban_comfort_scoring_models::{
    ForecastPoint, MovingAveragePoint, Observation, SeriesKind, TimeSeries, TrendAnalysis,
};

/// A fitted line `value = intercept + slope * days_since(origin)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    /// Date at which `x = 0`.
    pub origin: NaiveDate,
    /// Change per day.
    pub slope: f64,
    /// Value at the origin.
    pub intercept: f64,
}

impl LinearFit {
    /// Evaluates the line at `date`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn value_at(&self, date: NaiveDate) -> f64 {
        let x = (date - self.origin).num_days() as f64;
        self.slope.mul_add(x, self.intercept)
    }
}

/// Trailing simple moving average over `window` observations.
///
/// Each output point carries the date of the last observation in its
/// window. Empty when `window` is zero or longer than the series.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn moving_average(series: &TimeSeries, window: usize) -> Vec<MovingAveragePoint> {
    if window == 0 {
        return Vec::new();
    }
    sorted_points(series)
        .windows(window)
        .map(|chunk| MovingAveragePoint {
            date: chunk[chunk.len() - 1].date,
            value: chunk.iter().map(|point| point.value).sum::<f64>() / window as f64,
        })
        .collect()
}

/// Least-squares fit over `points`. `None` with fewer than two points or
/// when every point falls on the same date.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn fit_line(points: &[Observation]) -> Option<LinearFit> {
    if points.len() < 2 {
        return None;
    }
    let origin = points.iter().map(|point| point.date).min()?;
    let n = points.len() as f64;
    let xs: Vec<f64> = points
        .iter()
        .map(|point| (point.date - origin).num_days() as f64)
        .collect();
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = points.iter().map(|point| point.value).sum::<f64>() / n;

    let (covariance, variance) = xs.iter().zip(points).fold((0.0, 0.0), |(cov, var), (x, point)| {
        let dx = x - mean_x;
        (dx.mul_add(point.value - mean_y, cov), dx.mul_add(dx, var))
    });
    if variance <= f64::EPSILON {
        return None;
    }

    let slope = covariance / variance;
    Some(LinearFit {
        origin,
        slope,
        intercept: slope.mul_add(-mean_x, mean_y),
    })
}

/// Forecasts `horizon_days` daily values after the last observation.
///
/// The horizon is truncated to `max_horizon_days`. Values are clamped to the series' domain: `[0, 100]` for composite index
/// series, non-negative for counts.
#[must_use]
pub fn forecast(series: &TimeSeries, horizon_days: u32, config: &ForecastConfig) -> Vec<ForecastPoint> {
    let points = sorted_points(series);
    let recent = &points[points.len().saturating_sub(config.slope_window.max(2))..];
    let (Some(fit), Some(last)) = (fit_line(recent), points.last()) else {
        return Vec::new();
    };

    let horizon_days = if horizon_days > config.max_horizon_days {
        log::warn!(
            "Forecast horizon of {horizon_days} days exceeds the limit, truncating to {}",
            config.max_horizon_days
        );
        config.max_horizon_days
    } else {
        horizon_days
    };

    (1..=u64::from(horizon_days))
        .filter_map(|offset| last.date.checked_add_days(Days::new(offset)))
        .map(|date| ForecastPoint {
            date,
            value: clamp_to_domain(fit.value_at(date), series.kind),
        })
        .collect()
}

/// Moving averages, slope and forecast of a series in one view.
#[must_use]
pub fn analyze_trend(series: &TimeSeries, horizon_days: u32, config: &ForecastConfig) -> TrendAnalysis {
    let points = sorted_points(series);
    let recent = &points[points.len().saturating_sub(config.slope_window.max(2))..];

    TrendAnalysis {
        metric: series.metric.clone(),
        short_moving_average: moving_average(series, config.short_window),
        long_moving_average: moving_average(series, config.long_window),
        slope_per_day: fit_line(recent).map(|fit| fit.slope),
        forecast: forecast(series, horizon_days, config),
    }
}

fn sorted_points(series: &TimeSeries) -> Vec<Observation> {
    let mut points = series.points.clone();
    points.sort_by_key(|point| point.date);
    points
}

fn clamp_to_domain(value: f64, kind: SeriesKind) -> f64 {
    match kind {
        SeriesKind::CompositeIndex => value.clamp(0.0, 100.0),
        SeriesKind::Count => value.max(0.0),
        SeriesKind::Unbounded => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(offset: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap() + Days::new(offset)
    }

    fn daily(kind: SeriesKind, values: &[f64]) -> TimeSeries {
        TimeSeries::new(
            "uci",
            kind,
            values
                .iter()
                .enumerate()
                .map(|(i, value)| Observation {
                    date: day(i as u64),
                    value: *value,
                })
                .collect(),
        )
    }

    #[test]
    fn moving_average_is_trailing() {
        let series = daily(SeriesKind::Count, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        let sma = moving_average(&series, 3);
        assert_eq!(sma.len(), 3);
        assert_eq!(sma[0].date, day(2));
        assert!((sma[0].value - 2.0).abs() < 1e-9);
        assert!((sma[2].value - 4.0).abs() < 1e-9);
        assert!(moving_average(&series, 6).is_empty());
        assert!(moving_average(&series, 0).is_empty());
    }

    #[test]
    fn fits_a_perfect_line() {
        let series = daily(SeriesKind::Unbounded, &[10.0, 12.0, 14.0, 16.0]);
        let fit = fit_line(&series.points).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-9);
        assert!((fit.intercept - 10.0).abs() < 1e-9);
        assert!((fit.value_at(day(10)) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn extrapolates_recent_slope() {
        let series = daily(SeriesKind::Unbounded, &[10.0, 12.0, 14.0, 16.0]);
        let points = forecast(&series, 3, &ForecastConfig::default());
        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        assert_eq!(points[0].date, day(4));
        assert_eq!(points.len(), 3);
        for (value, expected) in values.iter().zip([18.0, 20.0, 22.0]) {
            assert!((value - expected).abs() < 1e-9, "{values:?}");
        }
    }

    #[test]
    fn slope_uses_only_the_recent_window() {
        // Falls for 10 days, then rises for the last 4.
        let mut values: Vec<f64> = (0..10).map(|i| 100.0 - f64::from(i) * 5.0).collect();
        values.extend([60.0, 62.0, 64.0, 66.0]);
        let series = daily(SeriesKind::Unbounded, &values);
        let config = ForecastConfig {
            slope_window: 4,
            ..ForecastConfig::default()
        };
        let analysis = analyze_trend(&series, 1, &config);
        assert!((analysis.slope_per_day.unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn degrades_to_empty_with_too_little_data() {
        let config = ForecastConfig::default();
        assert!(forecast(&daily(SeriesKind::Count, &[]), 7, &config).is_empty());
        assert!(forecast(&daily(SeriesKind::Count, &[5.0]), 7, &config).is_empty());

        let same_day = TimeSeries::new(
            "uci",
            SeriesKind::Count,
            vec![
                Observation {
                    date: day(0),
                    value: 1.0,
                },
                Observation {
                    date: day(0),
                    value: 9.0,
                },
            ],
        );
        assert!(forecast(&same_day, 7, &config).is_empty());
        assert!(forecast(&daily(SeriesKind::Count, &[1.0, 2.0]), 0, &config).is_empty());
    }

    #[test]
    fn horizon_is_truncated_to_the_configured_limit() {
        let series = daily(SeriesKind::Unbounded, &[10.0, 12.0, 14.0, 16.0]);
        let config = ForecastConfig {
            max_horizon_days: 30,
            ..ForecastConfig::default()
        };
        let points = forecast(&series, 4_000_000_000, &config);
        assert_eq!(points.len(), 30);
        assert!((points[29].value - 76.0).abs() < 1e-9);

        let analysis = analyze_trend(&series, u32::MAX, &ForecastConfig::default());
        assert_eq!(analysis.forecast.len(), 90);
        assert_eq!(forecast(&series, 5, &config).len(), 5);
    }

    #[test]
    fn composite_forecasts_stay_in_index_range() {
        let rising = daily(SeriesKind::CompositeIndex, &[80.0, 90.0, 100.0]);
        assert!(forecast(&rising, 5, &ForecastConfig::default())
            .iter()
            .all(|p| (0.0..=100.0).contains(&p.value)));

        let falling = daily(SeriesKind::Count, &[8.0, 4.0, 0.0]);
        let values: Vec<f64> = forecast(&falling, 3, &ForecastConfig::default())
            .iter()
            .map(|p| p.value)
            .collect();
        assert!(values.iter().all(|v| *v >= 0.0), "{values:?}");
    }

    #[test]
    fn analysis_bundles_moving_averages() {
        let values: Vec<f64> = (0..20).map(f64::from).collect();
        let analysis = analyze_trend(&daily(SeriesKind::Unbounded, &values), 7, &ForecastConfig::default());
        assert_eq!(analysis.short_moving_average.len(), 14);
        assert_eq!(analysis.long_moving_average.len(), 7);
        assert_eq!(analysis.forecast.len(), 7);
        assert!((analysis.slope_per_day.unwrap() - 1.0).abs() < 1e-9);
    }
}
