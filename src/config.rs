//! Configuration management for record queries

use crate::error::{RecordError, RecordResult};
use crate::store::RecordKind;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Sort order enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn from_reverse(reverse: bool) -> Self {
        if reverse {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        }
    }

    /// Apply this direction to an ascending comparison result
    #[inline]
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

impl FromStr for SortOrder {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            _ => Err(RecordError::invalid_option(&format!("unknown sort order: {s}"))),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortOrder::Ascending => "ascending",
            SortOrder::Descending => "descending",
        };
        write!(f, "{name}")
    }
}

/// Sort algorithm enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortAlgorithm {
    /// Adjacent exchange passes (bubble sort)
    Exchange,
    /// Binary heap extraction
    Heap,
    /// Recursive divide and merge
    Merge,
}

impl SortAlgorithm {
    /// Algorithm used for a record kind when none is requested
    pub fn default_for(kind: RecordKind) -> Self {
        match kind {
            RecordKind::Patient => SortAlgorithm::Exchange,
            RecordKind::MedicalHistory => SortAlgorithm::Heap,
            _ => SortAlgorithm::Merge,
        }
    }
}

impl FromStr for SortAlgorithm {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exchange" | "bubble" => Ok(SortAlgorithm::Exchange),
            "heap" => Ok(SortAlgorithm::Heap),
            "merge" => Ok(SortAlgorithm::Merge),
            _ => Err(RecordError::unknown_algorithm(s)),
        }
    }
}

impl fmt::Display for SortAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortAlgorithm::Exchange => "exchange",
            SortAlgorithm::Heap => "heap",
            SortAlgorithm::Merge => "merge",
        };
        write!(f, "{name}")
    }
}

/// Main configuration structure for a record query
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// Kind of record to fetch from the store
    pub kind: RecordKind,
    /// Field to sort on; no sorting when unset
    pub sort_field: Option<String>,
    /// Sort descending instead of ascending
    pub reverse: bool,
    /// Sort algorithm; the kind's default when unset
    pub algorithm: Option<SortAlgorithm>,
    /// Field to search in
    pub search_field: Option<String>,
    /// Text to search for
    pub query: Option<String>,
    /// Match the whole value instead of a substring
    pub exact: bool,
    /// Check whether the records are already sorted instead of sorting
    pub check: bool,
    /// Maximum number of records to return
    pub limit: Option<usize>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            kind: RecordKind::Patient,
            sort_field: None,
            reverse: false,
            algorithm: None,
            search_field: None,
            query: None,
            exact: false,
            check: false,
            limit: None,
        }
    }
}

impl QueryConfig {
    /// Create a new configuration for the given kind
    pub fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn with_sort_field(mut self, field: impl Into<String>) -> Self {
        self.sort_field = Some(field.into());
        self
    }

    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    pub fn with_algorithm(mut self, algorithm: Option<SortAlgorithm>) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Search `field` for `query`
    pub fn with_search(mut self, field: impl Into<String>, query: impl Into<String>) -> Self {
        self.search_field = Some(field.into());
        self.query = Some(query.into());
        self
    }

    pub fn with_exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    pub fn with_check(mut self, check: bool) -> Self {
        self.check = check;
        self
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Validate configuration for consistency
    pub fn validate(&self) -> RecordResult<()> {
        match (&self.search_field, &self.query) {
            (Some(_), None) => {
                return Err(RecordError::conflicting_options(
                    "a search field needs a query",
                ))
            }
            (None, Some(_)) => {
                return Err(RecordError::conflicting_options(
                    "a query needs a search field",
                ))
            }
            _ => {}
        }

        if self.exact && self.query.is_none() {
            return Err(RecordError::conflicting_options(
                "exact matching needs a search query",
            ));
        }

        if self.check && self.sort_field.is_none() {
            return Err(RecordError::conflicting_options(
                "checking sortedness needs a sort field",
            ));
        }

        if self.check && self.limit.is_some() {
            return Err(RecordError::conflicting_options(
                "--check is incompatible with --limit",
            ));
        }

        if self.algorithm.is_some() && self.sort_field.is_none() {
            return Err(RecordError::conflicting_options(
                "an algorithm was chosen without a sort field",
            ));
        }

        if let Some(field) = &self.sort_field {
            if field.trim().is_empty() {
                return Err(RecordError::invalid_option("sort field is empty"));
            }
        }

        if self.limit == Some(0) {
            return Err(RecordError::invalid_option("limit must be positive"));
        }

        Ok(())
    }

    /// Get the effective sort order
    pub fn sort_order(&self) -> SortOrder {
        SortOrder::from_reverse(self.reverse)
    }

    /// Get the algorithm to sort with
    pub fn effective_algorithm(&self) -> SortAlgorithm {
        self.algorithm
            .unwrap_or_else(|| SortAlgorithm::default_for(self.kind))
    }
}

/// Builder pattern for creating configurations
pub struct QueryConfigBuilder {
    config: QueryConfig,
}

impl QueryConfigBuilder {
    /// Start building a new configuration
    pub fn new(kind: RecordKind) -> Self {
        Self {
            config: QueryConfig::new(kind),
        }
    }

    pub fn sort_by(mut self, field: impl Into<String>) -> Self {
        self.config.sort_field = Some(field.into());
        self
    }

    pub fn reverse(mut self) -> Self {
        self.config.reverse = true;
        self
    }

    pub fn algorithm(mut self, algorithm: SortAlgorithm) -> Self {
        self.config.algorithm = Some(algorithm);
        self
    }

    pub fn search(mut self, field: impl Into<String>, query: impl Into<String>) -> Self {
        self.config.search_field = Some(field.into());
        self.config.query = Some(query.into());
        self
    }

    pub fn exact(mut self) -> Self {
        self.config.exact = true;
        self
    }

    pub fn check(mut self) -> Self {
        self.config.check = true;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.config.limit = Some(limit);
        self
    }

    /// Build the final configuration
    pub fn build(self) -> RecordResult<QueryConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Preset configurations matching the clinic's usual views
pub mod presets {
    use super::*;

    /// Patients by last name
    pub fn patients_by_name() -> QueryConfig {
        QueryConfig::new(RecordKind::Patient).with_sort_field("last_name")
    }

    /// Patients, oldest first
    pub fn patients_by_age() -> QueryConfig {
        QueryConfig::new(RecordKind::Patient).with_sort_field("date_of_birth")
    }

    /// Medical history, most recent entry first
    pub fn recent_history() -> QueryConfig {
        QueryConfig::new(RecordKind::MedicalHistory)
            .with_sort_field("entry_date")
            .with_reverse(true)
    }

    /// Medical history, most severe first
    pub fn history_by_severity() -> QueryConfig {
        QueryConfig::new(RecordKind::MedicalHistory)
            .with_sort_field("severity")
            .with_reverse(true)
    }

    /// Appointments in calendar order
    pub fn appointment_schedule() -> QueryConfig {
        QueryConfig::new(RecordKind::Appointment).with_sort_field("appointment_date")
    }

    /// Appointments of one patient, by start time
    pub fn appointments_for_patient(patient_id: u64) -> QueryConfig {
        QueryConfig::new(RecordKind::Appointment)
            .with_sort_field("start_time")
            .with_search("patient_id", patient_id.to_string())
            .with_exact(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = QueryConfig::default();
        assert_eq!(config.kind, RecordKind::Patient);
        assert!(!config.reverse);
        assert!(config.sort_field.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = QueryConfigBuilder::new(RecordKind::Appointment)
            .sort_by("start_time")
            .reverse()
            .algorithm(SortAlgorithm::Heap)
            .limit(5)
            .build()
            .expect("Failed to build test config");

        assert_eq!(config.sort_field.as_deref(), Some("start_time"));
        assert_eq!(config.sort_order(), SortOrder::Descending);
        assert_eq!(config.effective_algorithm(), SortAlgorithm::Heap);
        assert_eq!(config.limit, Some(5));
    }

    #[test]
    fn test_algorithm_from_str() {
        assert_eq!(
            "bubble"
                .parse::<SortAlgorithm>()
                .expect("Failed to parse bubble"),
            SortAlgorithm::Exchange
        );
        assert_eq!(
            "HEAP".parse::<SortAlgorithm>().expect("Failed to parse heap"),
            SortAlgorithm::Heap
        );
        assert!(matches!(
            "quick".parse::<SortAlgorithm>(),
            Err(RecordError::UnknownAlgorithm { .. })
        ));
    }

    #[test]
    fn test_default_algorithm_per_kind() {
        assert_eq!(
            QueryConfig::new(RecordKind::Patient).effective_algorithm(),
            SortAlgorithm::Exchange
        );
        assert_eq!(
            QueryConfig::new(RecordKind::MedicalHistory).effective_algorithm(),
            SortAlgorithm::Heap
        );
        assert_eq!(
            QueryConfig::new(RecordKind::Appointment).effective_algorithm(),
            SortAlgorithm::Merge
        );
    }

    #[test]
    fn test_validate_conflicting_options() {
        let config = QueryConfig {
            search_field: Some("name".into()),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = QueryConfig::default().with_check(true);
        assert!(config.validate().is_err());

        let config = QueryConfig::default()
            .with_sort_field("name")
            .with_check(true)
            .with_limit(Some(3));
        assert!(config.validate().is_err());

        let config = QueryConfig::default().with_limit(Some(0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_presets() {
        let config = presets::recent_history();
        assert_eq!(config.kind, RecordKind::MedicalHistory);
        assert!(config.reverse);

        let config = presets::appointments_for_patient(3);
        assert_eq!(config.query.as_deref(), Some("3"));
        assert!(config.exact);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sort_order_apply() {
        assert_eq!(SortOrder::Ascending.apply(Ordering::Less), Ordering::Less);
        assert_eq!(SortOrder::Descending.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(SortOrder::Descending.apply(Ordering::Equal), Ordering::Equal);
        assert_eq!("desc".parse::<SortOrder>().expect("parse order"), SortOrder::Descending);
    }
}
