// src/recommend/selector.rs — Top-K ranking of session groups

use super::aggregator::GroupCounts;
use super::types::GroupStat;

/// Rank groups by count (descending) and keep the first `k`.
///
/// Equal counts are ordered by ascending group key so the ranking does not
/// depend on hash iteration order.
pub fn top_k(counts: &GroupCounts, k: usize) -> Vec<GroupStat> {
    let mut groups: Vec<GroupStat> = counts
        .iter()
        .map(|(key, count)| GroupStat {
            key: *key,
            count: *count,
        })
        .collect();

    groups.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    groups.truncate(k);
    groups
}
