//! Bounded selection of the least-recently-accessed cookies.
//!
//! Cap enforcement needs the k oldest-accessed records out of a stream of
//! N candidates without sorting the whole jar. A max-heap of size k keyed
//! by access time does it in O(N log k): the root is the youngest entry
//! retained so far, and once the heap is over capacity the root is the
//! right element to drop.

use std::collections::BinaryHeap;

use time::OffsetDateTime;

struct Entry<T> {
    last_access: OffsetDateTime,
    data: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.last_access == other.last_access
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.last_access.cmp(&other.last_access)
    }
}

/// Keeps the `k` entries with the smallest access time seen so far.
/// Auxiliary data (bucket keys, indices) rides along with each entry.
pub(crate) struct LeastUsed<T> {
    k: usize,
    heap: BinaryHeap<Entry<T>>,
}

impl<T> LeastUsed<T> {
    pub(crate) fn new(k: usize) -> Self {
        LeastUsed {
            k,
            heap: BinaryHeap::with_capacity(k + 1),
        }
    }

    pub(crate) fn insert(&mut self, last_access: OffsetDateTime, data: T) {
        if self.k == 0 {
            return;
        }
        self.heap.push(Entry { last_access, data });
        if self.heap.len() > self.k {
            self.heap.pop();
        }
    }

    /// The auxiliary data of the selected entries, in unspecified order.
    pub(crate) fn into_data(self) -> Vec<T> {
        self.heap.into_iter().map(|e| e.data).collect()
    }
}
