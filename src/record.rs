//! Record and value types shared by the sort, search and store layers
//!
//! A [`Record`] is an ordered, immutable mapping from field name to [`Value`].
//! Records carry no schema of their own: any field may be present or absent,
//! and an absent field reads as [`Value::Null`].

use chrono::{NaiveDate, NaiveTime};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::sync::Arc;

/// Canonical text format for dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Canonical text format for times of day
pub const TIME_FORMAT: &str = "%H:%M:%S";
/// Short time format accepted on input
pub const SHORT_TIME_FORMAT: &str = "%H:%M";

static NULL: Value = Value::Null;

/// A single field value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    Text(String),
    Integer(i64),
    Date(NaiveDate),
    Time(NaiveTime),
    #[default]
    Null,
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Text form used by search and by the flat-file store. Null renders empty.
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Value::Time(t) => write!(f, "{}", t.format(TIME_FORMAT)),
            Value::Null => Ok(()),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<NaiveTime> for Value {
    fn from(value: NaiveTime) -> Self {
        Value::Time(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Integer(n) => serializer.serialize_i64(*n),
            Value::Null => serializer.serialize_unit(),
            other => serializer.collect_str(other),
        }
    }
}

/// Immutable snapshot of one row. Cloning shares the underlying fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    fields: Arc<Vec<(String, Value)>>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a record field by field
    pub fn builder() -> RecordBuilder {
        RecordBuilder::default()
    }

    /// Look up a field by exact name
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Look up a field, reading a missing field as null
    pub fn value(&self, field: &str) -> &Value {
        self.get(field).unwrap_or(&NULL)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Field names in record order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Return a copy with `field` set, replacing an existing value in place
    /// or appending a new field at the end.
    pub fn with(&self, field: &str, value: impl Into<Value>) -> Record {
        let mut fields = self.fields.as_ref().clone();
        let value = value.into();
        match fields.iter_mut().find(|(name, _)| name == field) {
            Some(slot) => slot.1 = value,
            None => fields.push((field.to_string(), value)),
        }
        Record {
            fields: Arc::new(fields),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut builder = RecordBuilder::default();
        for (name, value) in iter {
            builder = builder.field(name, value);
        }
        builder.build()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in self.fields.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Builder for [`Record`]. Setting a field twice keeps the last value.
#[derive(Debug, Default)]
pub struct RecordBuilder {
    fields: Vec<(String, Value)>,
}

impl RecordBuilder {
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
        self
    }

    pub fn build(self) -> Record {
        Record {
            fields: Arc::new(self.fields),
        }
    }
}
