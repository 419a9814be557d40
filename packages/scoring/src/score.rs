//! Per-signal sub-scores and the weighted composite index.
//!
//! Each sub-score starts at 100 and loses penalty points; the composite is
//! the weighted sum of the three scored signals plus the ecological
//! correction, rounded and clamped to `[0, 100]`. Every multiplier, cap and
//! weight comes from [`ScoringConfig`].

use urban_comfort_scoring_models::ScoreBreakdown;
use urban_comfort_scoring_models::config::{GradeTable, ScoringConfig, TrendBaselines};
use urban_comfort_signal_models::{
    GeoSignal, HumanSignal, PigeonIntensity, PigeonSignal, PopulationSignal, SignalSet,
    StructureCondition, Trend,
};

use crate::grade::classify;

const MAX_SCORE: f64 = 100.0;

/// Scores a signal set.
#[must_use]
pub fn score(signals: &SignalSet, config: &ScoringConfig, grades: &GradeTable) -> ScoreBreakdown {
    let human_score = human_score(&signals.human, config);
    let geo_score = geo_score(&signals.geo, config);
    let population_score = population_score(signals.population.as_ref(), config);

    let weights = &config.weights;
    let weighted = population_score.mul_add(
        weights.population,
        geo_score.mul_add(weights.geo, human_score * weights.human),
    );
    let ecological_adjustment = ecological_adjustment(signals.pigeon.as_ref(), weighted, config);
    let composite_index = to_index(weighted + ecological_adjustment);
    let classification = classify(composite_index, grades);

    ScoreBreakdown {
        human_score,
        geo_score,
        population_score,
        ecological_adjustment,
        composite_index,
        grade: classification.grade,
        priority_tier: classification.priority_tier,
    }
}

/// Baseline score of a trend direction.
#[must_use]
pub const fn trend_baseline(trend: Trend, baselines: &TrendBaselines) -> f64 {
    match trend {
        Trend::Increasing => baselines.increasing,
        Trend::Stable => baselines.stable,
        Trend::Decreasing => baselines.decreasing,
    }
}

/// Citizen-complaint sub-score.
#[must_use]
pub fn human_score(human: &HumanSignal, config: &ScoringConfig) -> f64 {
    let params = &config.human;
    let complaint_penalty =
        (f64::from(human.complaint_count) * params.complaint_multiplier).min(params.complaint_cap);
    let trend_penalty = MAX_SCORE - trend_baseline(human.trend, &config.trend_baseline);
    let recurrence_penalty =
        (human.recurrence_rate * params.recurrence_multiplier).min(params.recurrence_cap);

    clamp_score(MAX_SCORE - (complaint_penalty + trend_penalty + recurrence_penalty))
}

/// Geographic/structural sub-score.
#[must_use]
pub fn geo_score(geo: &GeoSignal, config: &ScoringConfig) -> f64 {
    let params = &config.geo;
    let vulnerability_penalty = geo.structural_vulnerability * params.vulnerability_multiplier;
    let condition_total: f64 = geo
        .conditions()
        .iter()
        .map(|condition| match condition {
            StructureCondition::Good => params.condition_scores.good,
            StructureCondition::Medium => params.condition_scores.medium,
            StructureCondition::Poor => params.condition_scores.poor,
        })
        .sum();
    let structural_penalty = MAX_SCORE - condition_total;

    clamp_score(MAX_SCORE - (vulnerability_penalty + structural_penalty))
}

/// Population sub-score; the configured neutral score when unmeasured.
#[must_use]
pub fn population_score(population: Option<&PopulationSignal>, config: &ScoringConfig) -> f64 {
    let params = &config.population;
    let Some(population) = population else {
        return params.absent_score;
    };

    let change_penalty = if population.change_rate_pct > 0.0 {
        (population.change_rate_pct * params.change_multiplier).min(params.change_cap)
    } else {
        0.0
    };
    let trend_penalty = MAX_SCORE - trend_baseline(population.trend, &config.trend_baseline);

    clamp_score(MAX_SCORE - (change_penalty + trend_penalty))
}

/// Ecological correction for a weighted composite of `weighted`.
///
/// Zero when the proxy is absent or nothing was detected. The magnitude
/// never exceeds `max_share` of the final composite index, i.e. of the
/// rounded value after the correction is applied.
#[must_use]
pub fn ecological_adjustment(
    pigeon: Option<&PigeonSignal>,
    weighted: f64,
    config: &ScoringConfig,
) -> f64 {
    let params = &config.ecological;
    let raw = match pigeon.map_or(PigeonIntensity::Absent, PigeonSignal::effective_intensity) {
        PigeonIntensity::High => params.high,
        PigeonIntensity::Medium => params.medium,
        PigeonIntensity::Low => params.low,
        PigeonIntensity::Absent => return 0.0,
    };
    let share = params.max_share.max(0.0);
    // |adj| <= share * (weighted - |adj|)
    let cap = weighted.max(0.0) * share / (1.0 + share);
    let adjustment = raw.clamp(-cap, cap);

    // Rounding the composite down can still push the share over the limit.
    let limit = share * f64::from(to_index(weighted + adjustment));
    if adjustment.abs() > limit {
        limit.copysign(adjustment)
    } else {
        adjustment
    }
}

fn clamp_score(value: f64) -> f64 {
    value.clamp(0.0, MAX_SCORE)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_index(value: f64) -> u8 {
    value.round().clamp(0.0, MAX_SCORE) as u8
}
