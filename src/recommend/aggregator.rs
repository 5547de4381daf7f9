// src/recommend/aggregator.rs — Frequency grouping of encoded sessions

use std::collections::HashMap;

use super::types::{EncodedEvent, GroupKey};

/// Occurrence count per distinct feature signature.
pub type GroupCounts = HashMap<GroupKey, usize>;

/// Group sessions with identical six-feature signatures and count them.
///
/// Arrival order does not matter; an empty slice yields an empty map.
pub fn aggregate(events: &[EncodedEvent]) -> GroupCounts {
    let mut counts: GroupCounts = HashMap::new();
    for event in events {
        *counts.entry(event.key()).or_default() += 1;
    }
    counts
}

/// Total number of sessions represented by a set of groups.
pub fn total_count(counts: &GroupCounts) -> usize {
    counts.values().sum()
}
