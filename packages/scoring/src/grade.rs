//! Table-driven grade and priority-tier classification.

use urban_comfort_scoring_models::config::GradeTable;
use urban_comfort_scoring_models::{Classification, Grade, PriorityTier};

/// Classifies a composite index against `table`.
///
/// The band with the highest `min_score` not above the index wins, so a
/// composite exactly on a boundary takes the band starting there. An index
/// below every band falls into the lowest band; an empty table yields
/// grade E, high priority.
#[must_use]
pub fn classify(composite_index: u8, table: &GradeTable) -> Classification {
    let band = table
        .bands
        .iter()
        .filter(|band| band.min_score <= composite_index)
        .max_by_key(|band| band.min_score)
        .or_else(|| table.bands.iter().min_by_key(|band| band.min_score));

    band.map_or(
        Classification {
            grade: Grade::E,
            priority_tier: PriorityTier::High,
        },
        |band| Classification {
            grade: band.grade,
            priority_tier: band.tier,
        },
    )
}

#[cfg(test)]
mod tests {
    use urban_comfort_scoring_models::config::GradeBand;

    use super::*;

    #[test]
    fn boundaries_are_inclusive_on_the_lower_bound() {
        let table = GradeTable::default();
        for (index, grade) in [
            (100, Grade::A),
            (80, Grade::A),
            (79, Grade::B),
            (65, Grade::B),
            (64, Grade::C),
            (50, Grade::C),
            (49, Grade::D),
            (35, Grade::D),
            (34, Grade::E),
            (0, Grade::E),
        ] {
            assert_eq!(classify(index, &table).grade, grade, "index {index}");
        }
    }

    #[test]
    fn tiers_follow_grades() {
        let table = GradeTable::default();
        assert_eq!(classify(90, &table).priority_tier, PriorityTier::Low);
        assert_eq!(classify(70, &table).priority_tier, PriorityTier::Low);
        assert_eq!(classify(55, &table).priority_tier, PriorityTier::Medium);
        assert_eq!(classify(40, &table).priority_tier, PriorityTier::High);
        assert_eq!(classify(10, &table).priority_tier, PriorityTier::High);
    }

    #[test]
    fn grades_are_monotonic_in_the_index() {
        let table = GradeTable::default();
        let mut previous = classify(0, &table).grade;
        for index in 1..=100 {
            let grade = classify(index, &table).grade;
            assert!(
                grade <= previous,
                "index {index} got {grade}, worse than {previous} below it"
            );
            previous = grade;
        }
    }

    #[test]
    fn retuned_table_moves_boundaries() {
        let table = GradeTable {
            bands: vec![
                GradeBand {
                    min_score: 60,
                    grade: Grade::A,
                    tier: PriorityTier::Low,
                },
                GradeBand {
                    min_score: 0,
                    grade: Grade::E,
                    tier: PriorityTier::High,
                },
            ],
        };
        assert_eq!(classify(60, &table).grade, Grade::A);
        assert_eq!(classify(59, &table).grade, Grade::E);
    }

    #[test]
    fn index_below_every_band_takes_the_lowest_band() {
        let table = GradeTable {
            bands: vec![GradeBand {
                min_score: 20,
                grade: Grade::D,
                tier: PriorityTier::High,
            }],
        };
        assert_eq!(classify(5, &table).grade, Grade::D);
        assert_eq!(
            classify(5, &GradeTable { bands: Vec::new() }).grade,
            Grade::E
        );
    }
}
