//! Typed partial updates
//!
//! Each patch lists the fields a caller may change for one record kind. A
//! field left as `None` keeps its stored value.

use super::{Key, RecordKind};
use crate::error::RecordError;
use crate::record::Value;
use chrono::{NaiveDate, NaiveTime};
use std::fmt;
use std::str::FromStr;

/// A set of field changes for one record kind
pub trait FieldPatch {
    fn kind(&self) -> RecordKind;

    /// The fields this patch sets, with their new values
    fn changes(&self) -> Vec<(&'static str, Value)>;

    fn is_empty(&self) -> bool {
        self.changes().is_empty()
    }
}

fn set<T: Clone + Into<Value>>(changes: &mut Vec<(&'static str, Value)>, field: &'static str, value: &Option<T>) {
    if let Some(value) = value {
        changes.push((field, value.clone().into()));
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub blood_type: Option<String>,
    pub allergies: Option<String>,
    pub last_visit_date: Option<NaiveDate>,
}

impl FieldPatch for PatientPatch {
    fn kind(&self) -> RecordKind {
        RecordKind::Patient
    }

    fn changes(&self) -> Vec<(&'static str, Value)> {
        let mut changes = Vec::new();
        set(&mut changes, "first_name", &self.first_name);
        set(&mut changes, "last_name", &self.last_name);
        set(&mut changes, "date_of_birth", &self.date_of_birth);
        set(&mut changes, "gender", &self.gender);
        set(&mut changes, "phone", &self.phone);
        set(&mut changes, "email", &self.email);
        set(&mut changes, "address", &self.address);
        set(&mut changes, "blood_type", &self.blood_type);
        set(&mut changes, "allergies", &self.allergies);
        set(&mut changes, "last_visit_date", &self.last_visit_date);
        changes
    }
}

/// Appointment lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 4] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
        AppointmentStatus::NoShow,
    ];
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AppointmentStatus::Scheduled => "Scheduled",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
            AppointmentStatus::NoShow => "No-show",
        };
        f.write_str(name)
    }
}

impl FromStr for AppointmentStatus {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" | "canceled" => Ok(AppointmentStatus::Cancelled),
            "no-show" | "no_show" | "noshow" => Ok(AppointmentStatus::NoShow),
            _ => Err(RecordError::invalid_option(&format!(
                "unknown appointment status: {s}"
            ))),
        }
    }
}

impl From<AppointmentStatus> for Value {
    fn from(status: AppointmentStatus) -> Self {
        Value::Text(status.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentPatch {
    pub doctor_id: Option<Key>,
    pub appointment_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub purpose: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
}

impl AppointmentPatch {
    /// Patch that only moves an appointment to a new status
    pub fn status(status: AppointmentStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

impl FieldPatch for AppointmentPatch {
    fn kind(&self) -> RecordKind {
        RecordKind::Appointment
    }

    fn changes(&self) -> Vec<(&'static str, Value)> {
        let mut changes = Vec::new();
        if let Some(doctor) = self.doctor_id {
            changes.push(("doctor_id", super::key_value(doctor)));
        }
        set(&mut changes, "appointment_date", &self.appointment_date);
        set(&mut changes, "start_time", &self.start_time);
        set(&mut changes, "end_time", &self.end_time);
        set(&mut changes, "purpose", &self.purpose);
        set(&mut changes, "status", &self.status);
        set(&mut changes, "notes", &self.notes);
        changes
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MedicalHistoryPatch {
    pub entry_date: Option<NaiveDate>,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub notes: Option<String>,
    /// 1 to 10
    pub severity: Option<i64>,
    pub follow_up: Option<String>,
}

impl FieldPatch for MedicalHistoryPatch {
    fn kind(&self) -> RecordKind {
        RecordKind::MedicalHistory
    }

    fn changes(&self) -> Vec<(&'static str, Value)> {
        let mut changes = Vec::new();
        set(&mut changes, "entry_date", &self.entry_date);
        set(&mut changes, "diagnosis", &self.diagnosis);
        set(&mut changes, "treatment", &self.treatment);
        set(&mut changes, "notes", &self.notes);
        set(&mut changes, "severity", &self.severity);
        set(&mut changes, "follow_up", &self.follow_up);
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_set_fields_are_changed() {
        let patch = PatientPatch {
            phone: Some("555-0101".into()),
            last_visit_date: NaiveDate::from_ymd_opt(2023, 4, 2),
            ..PatientPatch::default()
        };
        let changes = patch.changes();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0], ("phone", Value::text("555-0101")));
        assert!(!patch.is_empty());
        assert!(PatientPatch::default().is_empty());
    }

    #[test]
    fn test_status_patch() {
        let patch = AppointmentPatch::status(AppointmentStatus::NoShow);
        assert_eq!(patch.kind(), RecordKind::Appointment);
        assert_eq!(patch.changes(), vec![("status", Value::text("No-show"))]);
    }

    #[test]
    fn test_status_round_trip() {
        for status in AppointmentStatus::ALL {
            assert_eq!(status.to_string().parse::<AppointmentStatus>().ok(), Some(status));
        }
        assert!("postponed".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn test_history_patch_keeps_severity_numeric() {
        let patch = MedicalHistoryPatch {
            severity: Some(8),
            ..MedicalHistoryPatch::default()
        };
        assert_eq!(patch.changes(), vec![("severity", Value::Integer(8))]);
    }
}
