//! A validated configuration bundled with every engine operation.
//!
//! [`Engine`] holds no state beyond its policy; every call is a pure
//! function of its arguments, so one engine can be shared freely across
//! threads.

use std::path::Path;

use chrono::NaiveDate;
use urban_comfort_scoring_models::config::EngineConfig;
use urban_comfort_scoring_models::{
    AnomalyRecord, BlindSpotRecord, Classification, DashboardSummary, ForecastPoint,
    InterventionEffect, Observation, PriorityQueueEntry, ScoreBreakdown, ScoredUnit, TimeSeries,
    TrendAnalysis,
};
use urban_comfort_signal_models::{SignalSet, UnitSignals};

use crate::{
    ConfigError, anomaly, batch, blind_spot, config, forecast, grade, intervention, rank, score,
    summary,
};

/// The Urban Comfort Index engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Creates an engine after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the configuration is out of range.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config::validate(&config)?;
        Ok(Self { config })
    }

    /// Creates an engine from a TOML policy file.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`config::load`].
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self {
            config: config::load(path)?,
        })
    }

    /// The active policy.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Scores one unit's signals.
    #[must_use]
    pub fn score(&self, signals: &SignalSet) -> ScoreBreakdown {
        score::score(signals, &self.config.scoring, &self.config.grades)
    }

    /// Grades a composite index.
    #[must_use]
    pub fn classify(&self, composite_index: u8) -> Classification {
        grade::classify(composite_index, &self.config.grades)
    }

    /// Scores a snapshot of units in parallel.
    #[must_use]
    pub fn score_units(&self, units: &[UnitSignals]) -> Vec<ScoredUnit> {
        batch::score_units(units, &self.config.scoring, &self.config.grades)
    }

    /// Ranks already-scored units.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn rank(&self, units: &[ScoredUnit]) -> Vec<PriorityQueueEntry> {
        rank::rank(units)
    }

    /// Scores and ranks a snapshot of units.
    #[must_use]
    pub fn priority_queue(&self, units: &[UnitSignals]) -> Vec<PriorityQueueEntry> {
        batch::priority_queue(units, &self.config.scoring, &self.config.grades)
    }

    /// Checks one unit for a blind spot.
    #[must_use]
    pub fn detect_blind_spot(&self, unit_id: &str, signals: &SignalSet) -> BlindSpotRecord {
        blind_spot::detect(unit_id, signals, &self.config.blind_spot)
    }

    /// Checks a snapshot of units for blind spots, riskiest first.
    #[must_use]
    pub fn detect_blind_spots(&self, units: &[UnitSignals]) -> Vec<BlindSpotRecord> {
        batch::detect_blind_spots(units, &self.config.blind_spot)
    }

    /// Checks `current` against the trailing window of `history`.
    #[must_use]
    pub fn detect_anomaly(
        &self,
        unit_id: &str,
        history: &TimeSeries,
        current: &Observation,
    ) -> AnomalyRecord {
        anomaly::detect_anomaly(unit_id, history, current, &self.config.anomaly)
    }

    /// Checks the latest observation of `series`.
    #[must_use]
    pub fn detect_latest_anomaly(&self, unit_id: &str, series: &TimeSeries) -> Option<AnomalyRecord> {
        anomaly::detect_latest(unit_id, series, &self.config.anomaly)
    }

    /// Forecasts `horizon_days` daily values.
    #[must_use]
    pub fn forecast(&self, series: &TimeSeries, horizon_days: u32) -> Vec<ForecastPoint> {
        forecast::forecast(series, horizon_days, &self.config.forecast)
    }

    /// Moving averages, slope and forecast of a series.
    #[must_use]
    pub fn analyze_trend(&self, series: &TimeSeries, horizon_days: u32) -> TrendAnalysis {
        forecast::analyze_trend(series, horizon_days, &self.config.forecast)
    }

    /// Compares a series before and after an intervention.
    #[must_use]
    pub fn compare_intervention(
        &self,
        unit_id: &str,
        series: &TimeSeries,
        intervention_date: NaiveDate,
    ) -> InterventionEffect {
        intervention::compare_intervention(
            unit_id,
            series,
            intervention_date,
            &self.config.intervention,
        )
    }

    /// Dashboard aggregates over a priority queue.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn summarize(&self, queue: &[PriorityQueueEntry]) -> DashboardSummary {
        summary::summarize(queue)
    }
}
