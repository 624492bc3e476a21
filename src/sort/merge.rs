use super::{SortEntry, SortStrategy};
use crate::config::SortOrder;
use std::cmp::Ordering;

/// Top-down merge sort. The left head wins ties, which keeps it stable.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeSort;

impl SortStrategy for MergeSort {
    fn name(&self) -> &'static str {
        "merge"
    }

    fn sort_entries(&self, entries: Vec<SortEntry>, order: SortOrder) -> Vec<SortEntry> {
        merge_sort(entries, order)
    }
}

fn merge_sort(mut entries: Vec<SortEntry>, order: SortOrder) -> Vec<SortEntry> {
    if entries.len() <= 1 {
        return entries;
    }

    let right = entries.split_off(entries.len() / 2);
    let left = merge_sort(entries, order);
    let right = merge_sort(right, order);
    merge(left, right, order)
}

fn merge(left: Vec<SortEntry>, right: Vec<SortEntry>, order: SortOrder) -> Vec<SortEntry> {
    let mut result = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();

    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => r.cmp_by(l, order) == Ordering::Less,
            _ => break,
        };
        let next = if take_right { right.next() } else { left.next() };
        result.extend(next);
    }

    result.extend(left);
    result.extend(right);
    result
}
