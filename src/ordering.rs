//! Ordering and search helpers shared by the ranking and query layers.
//!
//! Everything here is deterministic: float keys are compared with a total
//! order and exact ties fall back to the original position, so repeated
//! runs over the same data produce identical output.

use crate::building::{Building, BuildingCollection, BuildingId};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

/// Stable sort by a float key. Equal keys keep their input order in both
/// directions; NaN keys sort after every real value in ascending order.
pub fn sort_by_key_f64<T>(items: &mut [T], order: Order, key: impl Fn(&T) -> f64) {
    match order {
        Order::Ascending => items.sort_by(|a, b| key(a).total_cmp(&key(b))),
        Order::Descending => items.sort_by(|a, b| key(b).total_cmp(&key(a))),
    }
}

/// Index of the element whose key is closest to `target`, in a slice
/// sorted ascending by that key. O(log n).
///
/// Matches a linear minimum-absolute-difference scan exactly: equidistant
/// neighbors and runs of equal keys resolve to the earliest index.
pub fn nearest_by_value<T>(sorted: &[T], target: f64, key: impl Fn(&T) -> f64) -> Option<usize> {
    if sorted.is_empty() {
        return None;
    }
    let right = sorted.partition_point(|item| key(item) < target);
    let winner = if right == 0 {
        0
    } else if right == sorted.len() {
        sorted.len() - 1
    } else {
        let d_left = (target - key(&sorted[right - 1])).abs();
        let d_right = (key(&sorted[right]) - target).abs();
        if d_left <= d_right {
            right - 1
        } else {
            right
        }
    };
    // A run of equal keys resolves to its first element, the index a
    // linear scan would keep.
    let winner_key = key(&sorted[winner]);
    Some(sorted.partition_point(|item| key(item) < winner_key))
}

/// The `k` items with the largest keys, descending, exact ties keeping
/// the earlier item first.
///
/// Equivalent to a stable descending sort truncated to `k`, but runs in
/// O(n log k) with a bounded heap. `k` of 0 yields nothing; `k` beyond
/// the input yields everything.
pub fn top_k_by<T: Clone>(items: &[T], k: usize, key: impl Fn(&T) -> f64) -> Vec<T> {
    if k == 0 {
        return Vec::new();
    }
    let mut heap: BinaryHeap<Reverse<RankKey>> = BinaryHeap::with_capacity(k + 1);
    for (index, item) in items.iter().enumerate() {
        heap.push(Reverse(RankKey {
            value: key(item),
            index,
        }));
        if heap.len() > k {
            heap.pop();
        }
    }
    let mut winners: Vec<RankKey> = heap.into_iter().map(|Reverse(e)| e).collect();
    winners.sort_by(|a, b| b.value.total_cmp(&a.value).then(a.index.cmp(&b.index)));
    winners.into_iter().map(|e| items[e.index].clone()).collect()
}

/// First building carrying `id`, or None.
///
/// Collections are expected to hold unique ids; duplicates resolve to the
/// earliest entry.
pub fn find_by_id<'a>(
    collection: &'a BuildingCollection,
    id: &BuildingId,
) -> Option<&'a Building> {
    collection.iter().find(|b| &b.id == id)
}

/// Min-heap key for `top_k_by`: the entry with the smallest value (and
/// among equal values, the latest index) is evicted first, so boundary
/// ties keep their earliest occurrences.
#[derive(Debug, Clone, Copy)]
struct RankKey {
    value: f64,
    index: usize,
}

impl PartialEq for RankKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankKey {}

impl PartialOrd for RankKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RankKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value
            .total_cmp(&other.value)
            .then(other.index.cmp(&self.index))
    }
}
