//! Sorting and searching for clinic records
//!
//! Records of one kind (patients, appointments, medical history, ...) are
//! fetched in full from a [`RecordStore`], optionally filtered with a linear
//! search, then ordered on one field by one of three interchangeable sort
//! algorithms. Date fields compare as dates, time fields as times, and other
//! fields as numbers or case-insensitive text.

#![warn(clippy::all)]

pub mod error;
pub mod config;

pub mod record;
pub mod field;
pub mod compare;
pub mod sort;
pub mod search;
pub mod store;
pub mod sample;

// Re-export commonly used types
pub use config::{QueryConfig, QueryConfigBuilder, SortAlgorithm, SortOrder};
pub use error::{RecordError, RecordResult};
pub use record::{Record, Value};
pub use store::{FlatFileStore, MemoryStore, RecordKind, RecordStore};

use tracing::debug;

/// Exit codes
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const STORE_FAILURE: i32 = 2;

/// Fetch, filter, sort and truncate records as `config` describes
pub fn run_query<S: RecordStore + ?Sized>(store: &S, config: &QueryConfig) -> RecordResult<Vec<Record>> {
    config.validate()?;
    let mut records = fetch_filtered(store, config)?;

    if let Some(field) = &config.sort_field {
        records = sort::sort(
            &records,
            field,
            config.sort_order(),
            config.effective_algorithm(),
        )?;
    }

    if let Some(limit) = config.limit {
        records.truncate(limit);
    }
    Ok(records)
}

/// Report the first out-of-order record under `config`'s sort field, if any
pub fn check_query<S: RecordStore + ?Sized>(store: &S, config: &QueryConfig) -> RecordResult<Option<usize>> {
    config.validate()?;
    let field = config
        .sort_field
        .as_deref()
        .ok_or_else(|| RecordError::conflicting_options("checking sortedness needs a sort field"))?;
    let records = fetch_filtered(store, config)?;
    sort::first_disorder(&records, field, config.sort_order())
}

fn fetch_filtered<S: RecordStore + ?Sized>(store: &S, config: &QueryConfig) -> RecordResult<Vec<Record>> {
    let records = store.fetch_all(config.kind)?;
    debug!(kind = %config.kind, records = records.len(), "fetched records");

    Ok(match (&config.search_field, &config.query) {
        (Some(field), Some(query)) if config.exact => search::filter_exact(&records, field, query),
        (Some(field), Some(query)) => search::search(&records, field, query),
        _ => records,
    })
}
