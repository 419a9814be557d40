//! Parallel fan-out over a snapshot of units.
//!
//! Scoring a unit is a pure function of its own signals, so a snapshot is
//! scored on the rayon pool and fanned back in for ranking. Output order
//! matches input order before any sorting.

use rayon::prelude::*;
use urban_comfort_scoring_models::config::{BlindSpotPolicy, GradeTable, ScoringConfig};
use urban_comfort_scoring_models::{BlindSpotRecord, PriorityQueueEntry, ScoredUnit};
use urban_comfort_signal_models::UnitSignals;

use crate::blind_spot::{detect, sort_by_risk};
use crate::rank::rank;
use crate::score::score;

/// Scores every unit in `units`.
#[must_use]
pub fn score_units(units: &[UnitSignals], config: &ScoringConfig, grades: &GradeTable) -> Vec<ScoredUnit> {
    log::debug!("Scoring {} units", units.len());

    units
        .par_iter()
        .map(|unit| ScoredUnit {
            unit_id: unit.unit.unit_id.clone(),
            name: unit.unit.name.clone(),
            breakdown: score(&unit.signals, config, grades),
        })
        .collect()
}

/// Scores every unit and returns the resulting priority queue.
#[must_use]
pub fn priority_queue(
    units: &[UnitSignals],
    config: &ScoringConfig,
    grades: &GradeTable,
) -> Vec<PriorityQueueEntry> {
    rank(&score_units(units, config, grades))
}

/// Runs blind-spot detection for every unit, riskiest first.
#[must_use]
pub fn detect_blind_spots(units: &[UnitSignals], policy: &BlindSpotPolicy) -> Vec<BlindSpotRecord> {
    let mut records: Vec<BlindSpotRecord> = units
        .par_iter()
        .map(|unit| detect(&unit.unit.unit_id, &unit.signals, policy))
        .collect();
    sort_by_risk(&mut records);

    log::debug!("Checked {} units for blind spots", records.len());

    records
}

#[cfg(test)]
mod tests {
    use urban_comfort_scoring_models::RiskLevel;
    use urban_comfort_signal_models::{
        GeoSignal, HumanSignal, SignalSet, SpatialUnit, StructureCondition, Trend,
    };

    use super::*;

    fn unit(id: &str, complaints: u32, vulnerability: f64) -> UnitSignals {
        UnitSignals {
            unit: SpatialUnit::new(id, id.to_uppercase()),
            signals: SignalSet::new(
                HumanSignal {
                    complaint_count: complaints,
                    trend: Trend::Stable,
                    recurrence_rate: 0.0,
                },
                GeoSignal {
                    structural_vulnerability: vulnerability,
                    alley_structure: StructureCondition::Poor,
                    ventilation: StructureCondition::Poor,
                    accessibility: StructureCondition::Poor,
                },
            ),
        }
    }

    fn snapshot() -> Vec<UnitSignals> {
        (0..40)
            .map(|i| unit(&format!("unit-{i:02}"), i % 17, f64::from(i % 11)))
            .collect()
    }

    #[test]
    fn parallel_scores_match_sequential() {
        let units = snapshot();
        let config = ScoringConfig::default();
        let grades = GradeTable::default();
        let scored = score_units(&units, &config, &grades);

        assert_eq!(scored.len(), units.len());
        for (scored, unit) in scored.iter().zip(&units) {
            assert_eq!(scored.unit_id, unit.unit.unit_id);
            assert_eq!(scored.breakdown, score(&unit.signals, &config, &grades));
        }
    }

    #[test]
    fn queue_is_ranked_worst_first() {
        let queue = priority_queue(&snapshot(), &ScoringConfig::default(), &GradeTable::default());
        assert_eq!(queue.len(), 40);
        assert!(queue.windows(2).all(|w| w[0].composite_index <= w[1].composite_index));
        assert_eq!(queue.last().map(|e| e.rank), Some(40));
    }

    #[test]
    fn quiet_but_fragile_unit_surfaces_first() {
        let units = vec![unit("loud", 20, 9.0), unit("quiet", 0, 10.0), unit("calm", 0, 0.0)];
        let records = detect_blind_spots(&units, &BlindSpotPolicy::default());
        assert_eq!(records[0].unit_id, "quiet");
        assert_eq!(records[0].risk_level, RiskLevel::High);
    }

    #[test]
    fn empty_snapshot() {
        assert!(score_units(&[], &ScoringConfig::default(), &GradeTable::default()).is_empty());
        assert!(detect_blind_spots(&[], &BlindSpotPolicy::default()).is_empty());
    }
}
