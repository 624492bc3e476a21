//! Field classification
//!
//! Every field name maps to exactly one [`FieldKind`], which decides how two
//! values of that field are compared. The mapping depends only on the name.

use std::fmt;

/// How values of a field are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Calendar dates (`YYYY-MM-DD`)
    Date,
    /// Times of day (`HH:MM` or `HH:MM:SS`)
    Time,
    /// Numbers when every value parses as one, case-insensitive text otherwise
    Generic,
}

impl FieldKind {
    /// Classify a field by name
    pub fn classify(field: &str) -> Self {
        match normalize(field).as_str() {
            "date" | "dob" | "date_of_birth" | "birth_date" | "last_visit_date"
            | "registration_date" | "visit_date" | "entry_date" | "appointment_date"
            | "issue_date" | "expiry_date" | "payment_date" => FieldKind::Date,
            "time" | "start_time" | "end_time" => FieldKind::Time,
            _ => FieldKind::Generic,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Date => "date",
            FieldKind::Time => "time",
            FieldKind::Generic => "generic",
        };
        write!(f, "{name}")
    }
}

/// Lower-case and map spaces and hyphens to underscores, so that file headers
/// like `"Visit Date"` classify the same as `visit_date`.
pub fn normalize(field: &str) -> String {
    field
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_fields() {
        for field in ["dob", "date_of_birth", "entry_date", "appointment_date", "last_visit_date"] {
            assert_eq!(FieldKind::classify(field), FieldKind::Date, "{field}");
        }
    }

    #[test]
    fn test_time_fields() {
        assert_eq!(FieldKind::classify("start_time"), FieldKind::Time);
        assert_eq!(FieldKind::classify("end_time"), FieldKind::Time);
    }

    #[test]
    fn test_header_spelling_is_normalized() {
        assert_eq!(FieldKind::classify("Visit Date"), FieldKind::Date);
        assert_eq!(FieldKind::classify("DOB"), FieldKind::Date);
        assert_eq!(FieldKind::classify(" Start-Time "), FieldKind::Time);
    }

    #[test]
    fn test_everything_else_is_generic() {
        for field in ["name", "severity", "diagnosis", "status", "follow_up", "date_note"] {
            assert_eq!(FieldKind::classify(field), FieldKind::Generic, "{field}");
        }
    }
}
