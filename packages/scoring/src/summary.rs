//! Dashboard-level aggregates over a priority queue.

use std::collections::BTreeMap;

use urban_comfort_scoring_models::{DashboardSummary, Grade, PriorityQueueEntry, PriorityTier};

/// Summarizes a priority queue: unit count, mean composite index, and unit
/// counts per grade and tier (zero-filled).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summarize(queue: &[PriorityQueueEntry]) -> DashboardSummary {
    let mut grade_distribution: BTreeMap<Grade, u64> =
        Grade::all().iter().map(|grade| (*grade, 0)).collect();
    let mut tier_counts: BTreeMap<PriorityTier, u64> =
        PriorityTier::all().iter().map(|tier| (*tier, 0)).collect();

    let mut total: u64 = 0;
    for entry in queue {
        *grade_distribution.entry(entry.grade).or_default() += 1;
        *tier_counts.entry(entry.priority_tier).or_default() += 1;
        total += u64::from(entry.composite_index);
    }

    let unit_count = queue.len() as u64;
    let average_index = (unit_count > 0).then(|| total as f64 / unit_count as f64);

    DashboardSummary {
        unit_count,
        average_index,
        grade_distribution,
        tier_counts,
    }
}
