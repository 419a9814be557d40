//! Blind-spot detection from cross-signal disagreement.
//!
//! This is a heuristic, not a statistical test. Each signal is reduced to a
//! magnitude in `[0, 1]` ("how much of a problem does this signal show"),
//! complaint magnitude is compared pairwise against the structural and
//! population magnitudes, and a [`BlindSpotRule`] turns the magnitudes and
//! agreement scores into a risk level. The defining blind-spot pattern is a
//! quiet complaint signal next to a loud structural, population or
//! ecological one: the problem is evident but nobody is reporting it.

use std::cmp::Ordering;

use urban_comfort_scoring_models::config::BlindSpotPolicy;
use urban_comfort_scoring_models::{BlindSpotRecord, CrossSignalAgreement, RiskLevel};
use urban_comfort_signal_models::{
    GeoSignal, PigeonIntensity, PigeonSignal, SignalSet, StructureCondition,
};

/// Problem magnitude of each signal, in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalMagnitudes {
    /// Complaint magnitude.
    pub human: f64,
    /// Structural magnitude.
    pub geo: f64,
    /// Population-change magnitude, when measured.
    pub population: Option<f64>,
    /// Ecological proxy magnitude, when measured.
    pub ecological: Option<f64>,
}

/// Decides a unit's blind-spot risk from its magnitudes and agreement.
pub trait BlindSpotRule {
    /// Returns the risk level.
    fn risk_level(
        &self,
        magnitudes: &SignalMagnitudes,
        agreement: &CrossSignalAgreement,
    ) -> RiskLevel;
}

/// The threshold rule: high when overall agreement is below
/// `high_risk_below` while complaints are low and another signal is high;
/// medium when agreement is in `[high_risk_below, medium_risk_below)`; low
/// otherwise.
impl BlindSpotRule for BlindSpotPolicy {
    fn risk_level(
        &self,
        magnitudes: &SignalMagnitudes,
        agreement: &CrossSignalAgreement,
    ) -> RiskLevel {
        if agreement.overall < self.high_risk_below
            && magnitudes.human <= self.low_signal_max
            && !high_signals(magnitudes, self).is_empty()
        {
            RiskLevel::High
        } else if agreement.overall >= self.high_risk_below
            && agreement.overall < self.medium_risk_below
        {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Reduces a signal set to per-signal magnitudes.
#[must_use]
pub fn magnitudes(signals: &SignalSet, policy: &BlindSpotPolicy) -> SignalMagnitudes {
    SignalMagnitudes {
        human: saturate(
            f64::from(signals.human.complaint_count),
            policy.complaint_saturation,
        ),
        geo: geo_magnitude(&signals.geo, policy),
        population: signals.population.as_ref().map(|population| {
            saturate(
                population.change_rate_pct.abs(),
                policy.population_change_saturation,
            )
        }),
        ecological: signals.pigeon.as_ref().map(ecological_magnitude),
    }
}

/// Computes pairwise agreement scores from magnitudes, at full precision.
/// Records carry them rounded to one decimal.
#[must_use]
pub fn agreement(magnitudes: &SignalMagnitudes) -> CrossSignalAgreement {
    let human_geo = pair_agreement(magnitudes.human, magnitudes.geo);
    let human_population = magnitudes
        .population
        .map(|population| pair_agreement(magnitudes.human, population));
    let overall = human_population.map_or(human_geo, |hp| f64::midpoint(human_geo, hp));

    CrossSignalAgreement {
        human_geo,
        human_population,
        overall,
    }
}

/// Classifies a unit with the policy's own threshold rule.
#[must_use]
pub fn detect(unit_id: &str, signals: &SignalSet, policy: &BlindSpotPolicy) -> BlindSpotRecord {
    detect_with(unit_id, signals, policy, policy)
}

/// Classifies a unit with a custom rule. `policy` still supplies the
/// magnitude normalization and signal-level thresholds.
#[must_use]
pub fn detect_with(
    unit_id: &str,
    signals: &SignalSet,
    policy: &BlindSpotPolicy,
    rule: &dyn BlindSpotRule,
) -> BlindSpotRecord {
    let magnitudes = magnitudes(signals, policy);
    let agreement = agreement(&magnitudes);
    let risk_level = rule.risk_level(&magnitudes, &agreement);
    let detection_reason = reason(signals, &magnitudes, &agreement, risk_level, policy);

    BlindSpotRecord {
        unit_id: unit_id.to_string(),
        risk_level,
        detection_reason,
        cross_signal_agreement: CrossSignalAgreement {
            human_geo: round_tenth(agreement.human_geo),
            human_population: agreement.human_population.map(round_tenth),
            overall: round_tenth(agreement.overall),
        },
    }
}

/// Sorts records highest risk first, then by ascending overall agreement,
/// then by unit identifier.
pub fn sort_by_risk(records: &mut [BlindSpotRecord]) {
    records.sort_by(|a, b| {
        a.risk_level
            .cmp(&b.risk_level)
            .then_with(|| {
                a.cross_signal_agreement
                    .overall
                    .total_cmp(&b.cross_signal_agreement.overall)
            })
            .then_with(|| a.unit_id.cmp(&b.unit_id))
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OtherSignal {
    Geo,
    Population,
    Ecological,
}

fn high_signals(magnitudes: &SignalMagnitudes, policy: &BlindSpotPolicy) -> Vec<OtherSignal> {
    let is_high = |value: f64| value >= policy.high_signal_min;
    let mut high = Vec::new();
    if is_high(magnitudes.geo) {
        high.push(OtherSignal::Geo);
    }
    if magnitudes.population.is_some_and(is_high) {
        high.push(OtherSignal::Population);
    }
    if policy.include_ecological && magnitudes.ecological.is_some_and(is_high) {
        high.push(OtherSignal::Ecological);
    }
    high
}

fn reason(
    signals: &SignalSet,
    magnitudes: &SignalMagnitudes,
    agreement: &CrossSignalAgreement,
    risk_level: RiskLevel,
    policy: &BlindSpotPolicy,
) -> String {
    let complaints = signals.human.complaint_count;

    if risk_level == RiskLevel::High
        && high_signals(magnitudes, policy) == [OtherSignal::Ecological]
    {
        let intensity = signals
            .pigeon
            .as_ref()
            .map_or(PigeonIntensity::Absent, PigeonSignal::effective_intensity);
        return format!(
            "Possible under-reporting: ecological proxy shows {intensity} activity while \
             complaints stay low ({complaints})"
        );
    }

    if risk_level == RiskLevel::Low && agreement.overall >= policy.medium_risk_below {
        return format!(
            "Signals broadly agree (overall agreement {:.0}/100)",
            agreement.overall
        );
    }

    let population_weaker = match (magnitudes.population, agreement.human_population) {
        (Some(population), Some(human_population))
            if human_population.total_cmp(&agreement.human_geo) == Ordering::Less =>
        {
            Some((population, human_population))
        }
        _ => None,
    };

    let (other_magnitude, pair_agreement, what) = population_weaker.map_or_else(
        || {
            (
                magnitudes.geo,
                agreement.human_geo,
                format!(
                    "structural vulnerability ({:.1}/10)",
                    signals.geo.structural_vulnerability
                ),
            )
        },
        |(population, human_population)| {
            let change = signals
                .population
                .as_ref()
                .map_or(0.0, |p| p.change_rate_pct);
            (
                population,
                human_population,
                format!("population change ({change:+.1}%)"),
            )
        },
    );

    let direction = if magnitudes.human < other_magnitude {
        "lower"
    } else {
        "higher"
    };
    let prefix = if risk_level == RiskLevel::High {
        "Possible under-reporting: "
    } else {
        ""
    };

    format!(
        "{prefix}complaints ({complaints}) are {direction} than {what} suggests \
         (agreement {pair_agreement:.0}/100)"
    )
}

fn geo_magnitude(geo: &GeoSignal, policy: &BlindSpotPolicy) -> f64 {
    let vulnerability = (geo.structural_vulnerability / 10.0).clamp(0.0, 1.0);
    let conditions = geo.conditions();
    let badness: f64 = conditions
        .iter()
        .map(|condition| match condition {
            StructureCondition::Good => 0.0,
            StructureCondition::Medium => 0.5,
            StructureCondition::Poor => 1.0,
        })
        .sum::<f64>()
        / 3.0;
    let weight = policy.vulnerability_weight.clamp(0.0, 1.0);
    vulnerability
        .mul_add(weight, badness * (1.0 - weight))
        .clamp(0.0, 1.0)
}

fn ecological_magnitude(pigeon: &PigeonSignal) -> f64 {
    match pigeon.effective_intensity() {
        PigeonIntensity::High => 1.0,
        PigeonIntensity::Medium => 2.0 / 3.0,
        PigeonIntensity::Low => 1.0 / 3.0,
        PigeonIntensity::Absent => 0.0,
    }
}

fn saturate(value: f64, saturation: f64) -> f64 {
    if saturation > 0.0 {
        (value / saturation).clamp(0.0, 1.0)
    } else if value > 0.0 {
        1.0
    } else {
        0.0
    }
}

fn pair_agreement(a: f64, b: f64) -> f64 {
    (1.0 - (a - b).abs()).clamp(0.0, 1.0) * 100.0
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use urban_comfort_signal_models::{HumanSignal, PopulationSignal, Trend};

    use super::*;

    fn signals(complaints: u32, vulnerability: f64, condition: StructureCondition) -> SignalSet {
        SignalSet::new(
            HumanSignal {
                complaint_count: complaints,
                trend: Trend::Stable,
                recurrence_rate: 0.0,
            },
            GeoSignal {
                structural_vulnerability: vulnerability,
                alley_structure: condition,
                ventilation: condition,
                accessibility: condition,
            },
        )
    }

    fn population(change_rate_pct: f64) -> PopulationSignal {
        PopulationSignal {
            daytime: 1000,
            nighttime: 800,
            change_rate_pct,
            trend: Trend::Stable,
        }
    }

    #[test]
    fn quiet_complaints_with_severe_structure_is_high_risk() {
        let policy = BlindSpotPolicy::default();
        let record = detect("u-1", &signals(1, 9.0, StructureCondition::Poor), &policy);
        assert_eq!(record.risk_level, RiskLevel::High);
        assert!(record.cross_signal_agreement.overall < 50.0);
        assert!(record.cross_signal_agreement.human_population.is_none());
        assert!(
            record.detection_reason.starts_with("Possible under-reporting"),
            "{}",
            record.detection_reason
        );
        assert!(record.detection_reason.contains("structural vulnerability"));
    }

    #[test]
    fn loud_complaints_with_sound_structure_is_not_a_blind_spot() {
        let policy = BlindSpotPolicy::default();
        let record = detect("u-2", &signals(40, 0.5, StructureCondition::Good), &policy);
        assert!(record.cross_signal_agreement.overall < 50.0);
        assert_eq!(record.risk_level, RiskLevel::Low);
        assert!(record.detection_reason.contains("higher than"));
    }

    #[test]
    fn agreeing_signals_are_low_risk() {
        let policy = BlindSpotPolicy::default();
        let record = detect("u-3", &signals(2, 1.0, StructureCondition::Good), &policy);
        assert_eq!(record.risk_level, RiskLevel::Low);
        assert!(record.cross_signal_agreement.overall >= 75.0);
        assert!(record.detection_reason.starts_with("Signals broadly agree"));
    }

    #[test]
    fn partial_disagreement_is_medium_risk() {
        let policy = BlindSpotPolicy::default();
        // human 0.0, geo 0.7*0.5 + 0.3*0.5 = 0.5 -> agreement 50
        let record = detect("u-4", &signals(0, 5.0, StructureCondition::Medium), &policy);
        assert!((record.cross_signal_agreement.overall - 50.0).abs() < 1e-9);
        assert_eq!(record.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn classifies_on_unrounded_agreement() {
        let policy = BlindSpotPolicy::default();
        // human 0, geo 1.0, population 0.0008: overall = (0 + 99.92) / 2 = 49.96
        let set = signals(0, 10.0, StructureCondition::Poor).with_population(population(0.016));
        let m = magnitudes(&set, &policy);
        let a = agreement(&m);
        assert!(a.overall < policy.high_risk_below, "{a:?}");
        assert_eq!(policy.risk_level(&m, &a), RiskLevel::High);

        let record = detect("u-edge", &set, &policy);
        assert_eq!(record.risk_level, RiskLevel::High);
        assert!((record.cross_signal_agreement.overall - 50.0).abs() < 1e-9);
        assert!(
            (record.cross_signal_agreement.human_population.unwrap() - 99.9).abs() < 1e-9
        );
    }

    #[test]
    fn overall_averages_present_pairs() {
        let policy = BlindSpotPolicy::default();
        let set = signals(10, 5.0, StructureCondition::Medium).with_population(population(10.0));
        let m = magnitudes(&set, &policy);
        assert!((m.human - 0.5).abs() < 1e-9);
        assert!((m.population.unwrap() - 0.5).abs() < 1e-9);
        let a = agreement(&m);
        assert!((a.human_geo - 100.0).abs() < 1e-9);
        assert!((a.human_population.unwrap() - 100.0).abs() < 1e-9);
        assert!((a.overall - 100.0).abs() < 1e-9);
    }

    #[test]
    fn population_pair_drives_reason_when_it_disagrees_most() {
        let policy = BlindSpotPolicy::default();
        let set = signals(0, 2.0, StructureCondition::Good).with_population(population(25.0));
        let record = detect("u-5", &set, &policy);
        assert!(
            record.detection_reason.contains("population change (+25.0%)"),
            "{}",
            record.detection_reason
        );
    }

    #[test]
    fn ecological_proxy_can_supply_the_high_signal() {
        let policy = BlindSpotPolicy {
            high_risk_below: 90.0,
            ..BlindSpotPolicy::default()
        };
        let set = signals(0, 2.0, StructureCondition::Good).with_pigeon(PigeonSignal {
            detected: true,
            intensity: PigeonIntensity::High,
        });
        let record = detect("u-6", &set, &policy);
        assert_eq!(record.risk_level, RiskLevel::High);
        assert!(record.detection_reason.contains("ecological proxy shows high"));

        let without_ecology = BlindSpotPolicy {
            include_ecological: false,
            ..policy
        };
        assert_ne!(
            detect("u-6", &set, &without_ecology).risk_level,
            RiskLevel::High
        );
    }

    struct AlwaysHigh;

    impl BlindSpotRule for AlwaysHigh {
        fn risk_level(&self, _: &SignalMagnitudes, _: &CrossSignalAgreement) -> RiskLevel {
            RiskLevel::High
        }
    }

    #[test]
    fn custom_rule_replaces_threshold_rule() {
        let policy = BlindSpotPolicy::default();
        let set = signals(2, 1.0, StructureCondition::Good);
        assert_eq!(detect("u", &set, &policy).risk_level, RiskLevel::Low);
        assert_eq!(
            detect_with("u", &set, &policy, &AlwaysHigh).risk_level,
            RiskLevel::High
        );
    }

    #[test]
    fn sorts_highest_risk_and_weakest_agreement_first() {
        let policy = BlindSpotPolicy::default();
        let mut records = vec![
            detect("low", &signals(2, 1.0, StructureCondition::Good), &policy),
            detect("high-b", &signals(0, 9.0, StructureCondition::Poor), &policy),
            detect("medium", &signals(0, 5.0, StructureCondition::Medium), &policy),
            detect("high-a", &signals(0, 9.0, StructureCondition::Poor), &policy),
        ];
        sort_by_risk(&mut records);
        let ids: Vec<&str> = records.iter().map(|r| r.unit_id.as_str()).collect();
        assert_eq!(ids, vec!["high-a", "high-b", "medium", "low"]);
    }
}
