use super::{SortEntry, SortStrategy};
use crate::config::SortOrder;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Binary heap over pre-extracted keys.
///
/// The heap pops the minimum key for ascending order and the maximum for
/// descending order. Ties pop in input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapSort;

struct HeapItem {
    entry: SortEntry,
    order: SortOrder,
}

impl HeapItem {
    // BinaryHeap is a max-heap, so the entry that should come out first
    // must compare greatest.
    fn rank(&self, other: &Self) -> Ordering {
        self.entry
            .cmp_by(&other.entry, self.order)
            .then_with(|| self.entry.position.cmp(&other.entry.position))
            .reverse()
    }
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.rank(other) == Ordering::Equal
    }
}

impl Eq for HeapItem {}

impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank(other)
    }
}

impl SortStrategy for HeapSort {
    fn name(&self) -> &'static str {
        "heap"
    }

    fn sort_entries(&self, entries: Vec<SortEntry>, order: SortOrder) -> Vec<SortEntry> {
        let len = entries.len();
        let mut heap: BinaryHeap<HeapItem> = entries
            .into_iter()
            .map(|entry| HeapItem { entry, order })
            .collect();

        let mut sorted = Vec::with_capacity(len);
        while let Some(item) = heap.pop() {
            sorted.push(item.entry);
        }
        sorted
    }
}
