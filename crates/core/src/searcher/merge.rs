//! Global ordering of the combined result set.

use std::cmp::Reverse;

use super::{NormalizedTorrent, TimestampedTorrent};

/// Concatenate per-collection results, order them newest first and drop
/// the sort key.
///
/// Results without a timestamp go last. The sort is stable, so equal
/// timestamps keep their collection order.
pub fn merge_and_sort(batches: Vec<Vec<TimestampedTorrent>>) -> Vec<NormalizedTorrent> {
    let mut merged: Vec<TimestampedTorrent> = batches.into_iter().flatten().collect();
    merged.sort_by_key(|t| Reverse(t.timestamp));
    merged.into_iter().map(|t| t.torrent).collect()
}
