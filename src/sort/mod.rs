//! Sort engine
//!
//! Three interchangeable strategies order records on one field. They share a
//! single [`KeyExtractor`] pass, so all of them see the same keys, and all of
//! them are stable: records with equal keys keep their input order in both
//! directions. Their output is therefore identical for identical input.

mod exchange;
mod heap;
mod merge;

pub use exchange::ExchangeSort;
pub use heap::HeapSort;
pub use merge::MergeSort;

use crate::compare::{KeyExtractor, SortKey};
use crate::config::{SortAlgorithm, SortOrder};
use crate::error::RecordResult;
use crate::record::Record;
use itertools::Itertools;
use std::cmp::Ordering;
use tracing::debug;

/// A record paired with its comparison key and input position
#[derive(Debug, Clone)]
pub struct SortEntry {
    pub key: SortKey,
    pub position: usize,
    pub record: Record,
}

impl SortEntry {
    /// Order two entries by key alone, honouring the direction
    #[inline]
    pub fn cmp_by(&self, other: &SortEntry, order: SortOrder) -> Ordering {
        order.apply(self.key.cmp(&other.key))
    }
}

/// A pluggable sorting algorithm
pub trait SortStrategy {
    fn name(&self) -> &'static str;

    /// Order entries by key. Equal keys must keep their input order.
    fn sort_entries(&self, entries: Vec<SortEntry>, order: SortOrder) -> Vec<SortEntry>;

    /// Sort `records` on `field`, returning a new sequence.
    ///
    /// Fails without a partial result if any value of a date or time field is
    /// malformed.
    fn sort(&self, records: &[Record], field: &str, order: SortOrder) -> RecordResult<Vec<Record>> {
        let entries = extract_entries(records, field)?;
        let sorted = self.sort_entries(entries, order);
        debug!(
            algorithm = self.name(),
            field,
            %order,
            records = sorted.len(),
            "sorted records"
        );
        Ok(sorted.into_iter().map(|entry| entry.record).collect())
    }
}

/// Holds the selected strategy and lets callers swap it between calls
pub struct SortEngine {
    strategy: Box<dyn SortStrategy>,
}

impl SortEngine {
    pub fn new(algorithm: SortAlgorithm) -> Self {
        Self {
            strategy: algorithm.strategy(),
        }
    }

    pub fn set_algorithm(&mut self, algorithm: SortAlgorithm) {
        self.strategy = algorithm.strategy();
    }

    pub fn algorithm_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn sort(&self, records: &[Record], field: &str, order: SortOrder) -> RecordResult<Vec<Record>> {
        self.strategy.sort(records, field, order)
    }
}

impl Default for SortEngine {
    fn default() -> Self {
        Self::new(SortAlgorithm::Merge)
    }
}

impl SortAlgorithm {
    /// Instantiate the strategy for this algorithm
    pub fn strategy(self) -> Box<dyn SortStrategy> {
        match self {
            SortAlgorithm::Exchange => Box::new(ExchangeSort),
            SortAlgorithm::Heap => Box::new(HeapSort),
            SortAlgorithm::Merge => Box::new(MergeSort),
        }
    }
}

/// Sort `records` on `field` with the given algorithm
pub fn sort(
    records: &[Record],
    field: &str,
    order: SortOrder,
    algorithm: SortAlgorithm,
) -> RecordResult<Vec<Record>> {
    algorithm.strategy().sort(records, field, order)
}

/// Find the first record that is out of order, if any.
///
/// Returns the index of the later record of the first disordered pair.
pub fn first_disorder(records: &[Record], field: &str, order: SortOrder) -> RecordResult<Option<usize>> {
    let extractor = KeyExtractor::for_records(field, records);
    let keys = extractor.keys(records)?;
    Ok(keys
        .iter()
        .tuple_windows()
        .position(|(prev, next)| order.apply(prev.cmp(next)) == Ordering::Greater)
        .map(|pos| pos + 1))
}

fn extract_entries(records: &[Record], field: &str) -> RecordResult<Vec<SortEntry>> {
    let extractor = KeyExtractor::for_records(field, records);
    records
        .iter()
        .enumerate()
        .map(|(position, record)| {
            Ok(SortEntry {
                key: extractor.key(record)?,
                position,
                record: record.clone(),
            })
        })
        .collect()
}
