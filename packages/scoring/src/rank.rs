//! Priority queue ordering.
//!
//! Units are ordered worst-first by composite index with ties broken by
//! unit identifier, so identical inputs always produce the identical queue
//! regardless of input order. The queue is recomputed from scratch on every
//! call; there is no incremental re-ranking.

use std::cmp::Ordering;

use urban_comfort_scoring_models::{PriorityQueueEntry, PriorityTier, ScoredUnit};

/// Builds the priority queue for a snapshot of scored units.
#[must_use]
pub fn rank(units: &[ScoredUnit]) -> Vec<PriorityQueueEntry> {
    let mut sorted: Vec<&ScoredUnit> = units.iter().collect();
    sorted.sort_by(|a, b| compare(a, b));

    sorted
        .into_iter()
        .enumerate()
        .map(|(position, unit)| PriorityQueueEntry {
            unit_id: unit.unit_id.clone(),
            rank: u32::try_from(position + 1).unwrap_or(u32::MAX),
            composite_index: unit.breakdown.composite_index,
            grade: unit.breakdown.grade,
            priority_tier: unit.breakdown.priority_tier,
        })
        .collect()
}

/// Returns the entries of `queue` in `tier`, keeping queue order.
#[must_use]
pub fn entries_in_tier(queue: &[PriorityQueueEntry], tier: PriorityTier) -> Vec<&PriorityQueueEntry> {
    queue
        .iter()
        .filter(|entry| entry.priority_tier == tier)
        .collect()
}

fn compare(a: &ScoredUnit, b: &ScoredUnit) -> Ordering {
    a.breakdown
        .composite_index
        .cmp(&b.breakdown.composite_index)
        .then_with(|| a.unit_id.cmp(&b.unit_id))
}
