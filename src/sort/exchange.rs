use super::{SortEntry, SortStrategy};
use crate::config::SortOrder;
use std::cmp::Ordering;

/// Adjacent compare-and-swap passes, stopping after a pass without swaps.
///
/// O(n²); meant for short lists such as a clinic's patient roster. Only
/// strictly out-of-order neighbours are swapped, which keeps it stable.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExchangeSort;

impl SortStrategy for ExchangeSort {
    fn name(&self) -> &'static str {
        "exchange"
    }

    fn sort_entries(&self, mut entries: Vec<SortEntry>, order: SortOrder) -> Vec<SortEntry> {
        let len = entries.len();
        for pass in 0..len {
            let mut swapped = false;
            // After each pass the last `pass + 1` entries are in place
            for j in 0..len - pass - 1 {
                if entries[j].cmp_by(&entries[j + 1], order) == Ordering::Greater {
                    entries.swap(j, j + 1);
                    swapped = true;
                }
            }
            if !swapped {
                break;
            }
        }
        entries
    }
}
