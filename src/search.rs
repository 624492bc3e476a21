//! Linear record search
//!
//! Both searches are single-pass filters over the text form of one field, so
//! results keep the input order. A missing field reads as the empty string.

use crate::record::Record;
use tracing::debug;

/// Records whose `field` contains `query`, ignoring case.
///
/// An empty query matches every record.
pub fn search(records: &[Record], field: &str, query: &str) -> Vec<Record> {
    let needle = query.to_lowercase();
    let matches: Vec<Record> = records
        .iter()
        .filter(|record| record.value(field).to_text().to_lowercase().contains(&needle))
        .cloned()
        .collect();
    debug!(field, query, scanned = records.len(), matched = matches.len(), "searched records");
    matches
}

/// Records whose `field` equals `value`, ignoring case
pub fn filter_exact(records: &[Record], field: &str, value: &str) -> Vec<Record> {
    let wanted = value.to_lowercase();
    let matches: Vec<Record> = records
        .iter()
        .filter(|record| record.value(field).to_text().to_lowercase() == wanted)
        .cloned()
        .collect();
    debug!(field, value, scanned = records.len(), matched = matches.len(), "filtered records");
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Value;

    fn people() -> Vec<Record> {
        ["Bob", "Al", "Cy"]
            .into_iter()
            .map(|name| Record::builder().field("name", name).build())
            .collect()
    }

    fn names(records: &[Record]) -> Vec<String> {
        records.iter().map(|r| r.value("name").to_text()).collect()
    }

    #[test]
    fn test_case_insensitive_substring() {
        assert_eq!(names(&search(&people(), "name", "b")), vec!["Bob"]);
        assert_eq!(names(&search(&people(), "name", "OB")), vec!["Bob"]);
    }

    #[test]
    fn test_empty_query_matches_everything() {
        assert_eq!(search(&people(), "name", ""), people());
    }

    #[test]
    fn test_missing_field_never_matches_nonempty_query() {
        assert!(search(&people(), "allergies", "pen").is_empty());
        assert_eq!(search(&people(), "allergies", "").len(), 3);
    }

    #[test]
    fn test_results_keep_input_order() {
        let records: Vec<Record> = ["Cyan", "Al", "Cyril"]
            .into_iter()
            .map(|name| Record::builder().field("name", name).build())
            .collect();
        assert_eq!(names(&search(&records, "name", "cy")), vec!["Cyan", "Cyril"]);
    }

    #[test]
    fn test_search_containment_property() {
        let records = people();
        let query = "y";
        let found = search(&records, "name", query);
        for record in &records {
            let contains = record.value("name").to_text().to_lowercase().contains(query);
            assert_eq!(found.contains(record), contains);
        }
    }

    #[test]
    fn test_typed_values_search_by_text_form() {
        let records = vec![
            Record::builder().field("patient_id", 13).build(),
            Record::builder().field("patient_id", 3).build(),
            Record::builder().field("patient_id", Value::Null).build(),
        ];
        assert_eq!(search(&records, "patient_id", "3").len(), 2);
        assert_eq!(filter_exact(&records, "patient_id", "3"), vec![records[1].clone()]);
    }

    #[test]
    fn test_exact_filter_ignores_case() {
        let records = vec![
            Record::builder().field("status", "Scheduled").build(),
            Record::builder().field("status", "Completed").build(),
        ];
        assert_eq!(filter_exact(&records, "status", "scheduled").len(), 1);
        assert!(filter_exact(&records, "status", "sched").is_empty());
    }
}
