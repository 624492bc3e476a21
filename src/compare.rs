//! Field value comparison
//!
//! Comparison happens in two steps. A [`KeyExtractor`] first settles how a
//! field is compared across a whole sequence (dates, times, numbers or folded
//! text), then turns each record into a directly comparable [`SortKey`]. Every
//! sort strategy orders records by these keys, so they can never disagree.

use crate::error::{RecordError, RecordResult};
use crate::field::FieldKind;
use crate::record::{Record, Value, DATE_FORMAT, SHORT_TIME_FORMAT, TIME_FORMAT};
use chrono::{NaiveDate, NaiveTime};
use std::cmp::Ordering;

/// Pre-extracted comparison key for one record
#[derive(Debug, Clone)]
pub enum SortKey {
    /// `None` is a null, below every number including negative infinity and NaN
    Number(Option<f64>),
    Date(NaiveDate),
    Time(NaiveTime),
    Text(String),
}

impl SortKey {
    fn rank(&self) -> u8 {
        match self {
            SortKey::Number(_) => 0,
            SortKey::Date(_) => 1,
            SortKey::Time(_) => 2,
            SortKey::Text(_) => 3,
        }
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => match (a, b) {
                (Some(a), Some(b)) => a.total_cmp(b),
                (a, b) => a.is_some().cmp(&b.is_some()),
            },
            (SortKey::Date(a), SortKey::Date(b)) => a.cmp(b),
            (SortKey::Time(a), SortKey::Time(b)) => a.cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            // A single extractor never mixes variants
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

/// How one field is compared across a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPlan {
    Date,
    Time,
    Numeric,
    Text,
}

/// Resolves the comparison plan for a field and extracts keys under it
#[derive(Debug, Clone)]
pub struct KeyExtractor<'a> {
    field: &'a str,
    plan: KeyPlan,
}

impl<'a> KeyExtractor<'a> {
    /// Settle the plan for `field` over `records`.
    ///
    /// Generic fields compare numerically only when every non-null value in
    /// the sequence parses as a number; one non-numeric value switches the
    /// whole sequence to text.
    pub fn for_records(field: &'a str, records: &[Record]) -> Self {
        let plan = match FieldKind::classify(field) {
            FieldKind::Date => KeyPlan::Date,
            FieldKind::Time => KeyPlan::Time,
            FieldKind::Generic => {
                let mut values = records
                    .iter()
                    .map(|record| record.value(field))
                    .filter(|value| !value.is_null())
                    .peekable();
                if values.peek().is_some() && values.all(|value| parse_number(value).is_some()) {
                    KeyPlan::Numeric
                } else {
                    KeyPlan::Text
                }
            }
        };
        Self { field, plan }
    }

    pub fn field(&self) -> &str {
        self.field
    }

    pub fn plan(&self) -> KeyPlan {
        self.plan
    }

    /// Extract the key of one record. Missing fields yield the minimum key.
    pub fn key(&self, record: &Record) -> RecordResult<SortKey> {
        let value = record.value(self.field);
        match self.plan {
            KeyPlan::Date => parse_date(self.field, value).map(SortKey::Date),
            KeyPlan::Time => parse_time(self.field, value).map(SortKey::Time),
            KeyPlan::Numeric => Ok(SortKey::Number(parse_number(value))),
            KeyPlan::Text => Ok(SortKey::Text(value.to_text().to_lowercase())),
        }
    }

    /// Extract keys for a whole sequence, failing on the first malformed value
    pub fn keys(&self, records: &[Record]) -> RecordResult<Vec<SortKey>> {
        records.iter().map(|record| self.key(record)).collect()
    }
}

/// Compare two records on one field
pub fn compare(a: &Record, b: &Record, field: &str) -> RecordResult<Ordering> {
    let pair = [a.clone(), b.clone()];
    let extractor = KeyExtractor::for_records(field, &pair);
    Ok(extractor.key(a)?.cmp(&extractor.key(b)?))
}

fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(n) => Some(*n as f64),
        Value::Text(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn parse_date(field: &str, value: &Value) -> RecordResult<NaiveDate> {
    match value {
        Value::Null => Ok(NaiveDate::MIN),
        Value::Date(date) => Ok(*date),
        Value::Text(s) => NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map_err(|_| RecordError::parse_error(field, s, "a date (YYYY-MM-DD)")),
        other => Err(RecordError::parse_error(
            field,
            &other.to_text(),
            "a date (YYYY-MM-DD)",
        )),
    }
}

fn parse_time(field: &str, value: &Value) -> RecordResult<NaiveTime> {
    match value {
        Value::Null => Ok(NaiveTime::MIN),
        Value::Time(time) => Ok(*time),
        Value::Text(s) => NaiveTime::parse_from_str(s, TIME_FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(s, SHORT_TIME_FORMAT))
            .map_err(|_| RecordError::parse_error(field, s, "a time (HH:MM or HH:MM:SS)")),
        other => Err(RecordError::parse_error(
            field,
            &other.to_text(),
            "a time (HH:MM or HH:MM:SS)",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(field: &str, value: impl Into<Value>) -> Record {
        Record::builder().field(field, value).build()
    }

    #[test]
    fn test_dates_compare_as_dates() -> RecordResult<()> {
        let a = rec("dob", "1990-05-01");
        let b = rec("dob", "1985-02-10");
        assert_eq!(compare(&a, &b, "dob")?, Ordering::Greater);

        let typed = rec("dob", NaiveDate::from_ymd_opt(1990, 5, 1).expect("valid date"));
        assert_eq!(compare(&a, &typed, "dob")?, Ordering::Equal);
        Ok(())
    }

    #[test]
    fn test_malformed_date_is_an_error() {
        let a = rec("entry_date", "2023-02-10");
        let b = rec("entry_date", "10/02/2023");
        match compare(&a, &b, "entry_date") {
            Err(RecordError::ParseError { field, value, .. }) => {
                assert_eq!(field, "entry_date");
                assert_eq!(value, "10/02/2023");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_times_accept_both_formats() -> RecordResult<()> {
        let a = rec("start_time", "09:00");
        let b = rec("start_time", "09:00:00");
        let c = rec("start_time", "14:30");
        assert_eq!(compare(&a, &b, "start_time")?, Ordering::Equal);
        assert_eq!(compare(&a, &c, "start_time")?, Ordering::Less);
        assert!(compare(&a, &rec("start_time", "9am"), "start_time").is_err());
        Ok(())
    }

    #[test]
    fn test_null_is_minimum_for_every_kind() -> RecordResult<()> {
        let missing = Record::new();
        assert_eq!(compare(&missing, &rec("dob", "0001-01-01"), "dob")?, Ordering::Less);
        assert_eq!(
            compare(&missing, &rec("start_time", "00:00"), "start_time")?,
            Ordering::Equal
        );
        assert_eq!(compare(&missing, &rec("severity", 0), "severity")?, Ordering::Less);
        assert_eq!(compare(&missing, &rec("severity", -3), "severity")?, Ordering::Less);
        assert_eq!(compare(&missing, &rec("name", "a"), "name")?, Ordering::Less);
        assert_eq!(compare(&missing, &Record::new(), "name")?, Ordering::Equal);
        Ok(())
    }

    #[test]
    fn test_null_is_below_negative_infinity() -> RecordResult<()> {
        let missing = Record::new();
        assert_eq!(compare(&missing, &rec("severity", "-inf"), "severity")?, Ordering::Less);
        assert_eq!(compare(&missing, &rec("severity", "-NaN"), "severity")?, Ordering::Less);
        assert_eq!(compare(&rec("severity", "-inf"), &missing, "severity")?, Ordering::Greater);
        Ok(())
    }

    #[test]
    fn test_generic_numbers_compare_numerically() -> RecordResult<()> {
        assert_eq!(
            compare(&rec("amount", "10"), &rec("amount", "9"), "amount")?,
            Ordering::Greater
        );
        assert_eq!(
            compare(&rec("amount", " 2.5 "), &rec("amount", 3), "amount")?,
            Ordering::Less
        );
        Ok(())
    }

    #[test]
    fn test_generic_falls_back_to_text_when_any_value_is_not_numeric() -> RecordResult<()> {
        // "10" vs "9a" is a text comparison, so "10" sorts first
        assert_eq!(
            compare(&rec("code", "10"), &rec("code", "9a"), "code")?,
            Ordering::Less
        );
        let records = vec![rec("code", "10"), rec("code", "9"), rec("code", "9a")];
        assert_eq!(KeyExtractor::for_records("code", &records).plan(), KeyPlan::Text);
        Ok(())
    }

    #[test]
    fn test_text_is_case_insensitive() -> RecordResult<()> {
        assert_eq!(
            compare(&rec("name", "bob"), &rec("name", "Bob"), "name")?,
            Ordering::Equal
        );
        assert_eq!(
            compare(&rec("name", "al"), &rec("name", "Bob"), "name")?,
            Ordering::Less
        );
        Ok(())
    }

    #[test]
    fn test_plan_ignores_nulls() {
        let records = vec![rec("severity", 7), Record::new(), rec("severity", "3")];
        assert_eq!(
            KeyExtractor::for_records("severity", &records).plan(),
            KeyPlan::Numeric
        );
        assert_eq!(
            KeyExtractor::for_records("severity", &[Record::new()]).plan(),
            KeyPlan::Text
        );
    }
}
