//! Record stores
//!
//! A store hands out whole collections of records by kind and accepts
//! single-record writes. Filtering and ordering never happen here; callers
//! fetch everything of a kind and use [`crate::search`] and [`crate::sort`].

mod flat_file;
mod memory;
mod patch;

pub use flat_file::FlatFileStore;
pub use memory::MemoryStore;
pub use patch::{
    AppointmentPatch, AppointmentStatus, FieldPatch, MedicalHistoryPatch, PatientPatch,
};

use crate::error::{RecordError, RecordResult};
use crate::record::{Record, Value};
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// Store-generated record key
pub type Key = u64;

/// The kinds of record the clinic keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    Patient,
    Doctor,
    Appointment,
    Prescription,
    MedicalHistory,
    Payment,
}

impl RecordKind {
    pub const ALL: [RecordKind; 6] = [
        RecordKind::Patient,
        RecordKind::Doctor,
        RecordKind::Appointment,
        RecordKind::Prescription,
        RecordKind::MedicalHistory,
        RecordKind::Payment,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RecordKind::Patient => "patient",
            RecordKind::Doctor => "doctor",
            RecordKind::Appointment => "appointment",
            RecordKind::Prescription => "prescription",
            RecordKind::MedicalHistory => "medical_history",
            RecordKind::Payment => "payment",
        }
    }

    /// Column holding the store-generated key
    pub fn key_field(self) -> &'static str {
        self.columns()[0]
    }

    /// Schema columns, key first
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            RecordKind::Patient => &[
                "patient_id",
                "first_name",
                "last_name",
                "date_of_birth",
                "gender",
                "phone",
                "email",
                "address",
                "blood_type",
                "allergies",
                "last_visit_date",
                "registration_date",
            ],
            RecordKind::Doctor => &[
                "doctor_id",
                "name",
                "specialization",
                "contact",
                "license_number",
            ],
            RecordKind::Appointment => &[
                "appointment_id",
                "patient_id",
                "doctor_id",
                "appointment_date",
                "start_time",
                "end_time",
                "purpose",
                "status",
                "notes",
            ],
            RecordKind::Prescription => &[
                "prescription_id",
                "patient_id",
                "doctor_id",
                "medication",
                "dosage",
                "instructions",
                "issue_date",
                "expiry_date",
            ],
            RecordKind::MedicalHistory => &[
                "history_id",
                "patient_id",
                "doctor_id",
                "entry_date",
                "diagnosis",
                "treatment",
                "notes",
                "severity",
                "follow_up",
            ],
            RecordKind::Payment => &[
                "invoice_id",
                "patient_id",
                "amount",
                "payment_method",
                "status",
                "payment_date",
            ],
        }
    }

    pub fn has_column(self, field: &str) -> bool {
        self.columns().contains(&field)
    }

    /// File backing this kind in a [`FlatFileStore`]
    pub fn file_name(self) -> &'static str {
        match self {
            RecordKind::Patient => "patients.csv",
            RecordKind::Doctor => "doctors.csv",
            RecordKind::Appointment => "appointments.csv",
            RecordKind::Prescription => "prescriptions.csv",
            RecordKind::MedicalHistory => "medical_history.csv",
            RecordKind::Payment => "billing.csv",
        }
    }

    /// Kinds whose records are removed along with a deleted record of this kind
    pub fn dependents(self) -> &'static [RecordKind] {
        match self {
            RecordKind::Patient => &[
                RecordKind::Appointment,
                RecordKind::Prescription,
                RecordKind::MedicalHistory,
                RecordKind::Payment,
            ],
            _ => &[],
        }
    }
}

impl FromStr for RecordKind {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match crate::field::normalize(s).as_str() {
            "patient" | "patients" => Ok(RecordKind::Patient),
            "doctor" | "doctors" => Ok(RecordKind::Doctor),
            "appointment" | "appointments" => Ok(RecordKind::Appointment),
            "prescription" | "prescriptions" => Ok(RecordKind::Prescription),
            "medical_history" | "history" | "medical_records" | "records" => {
                Ok(RecordKind::MedicalHistory)
            }
            "payment" | "payments" | "billing" => Ok(RecordKind::Payment),
            _ => Err(RecordError::unknown_kind(s)),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Persistence collaborator for clinic records
pub trait RecordStore {
    /// All records of a kind, in key order
    fn fetch_all(&self, kind: RecordKind) -> RecordResult<Vec<Record>>;

    fn fetch_by_key(&self, kind: RecordKind, key: Key) -> RecordResult<Option<Record>>;

    /// Store a new record and return its generated key.
    ///
    /// Any key already present in the record is replaced. Fields outside the
    /// kind's schema are rejected.
    fn insert(&mut self, kind: RecordKind, record: Record) -> RecordResult<Key>;

    /// Apply a partial update. Returns false when no record has the key.
    fn update(&mut self, kind: RecordKind, key: Key, patch: &dyn FieldPatch) -> RecordResult<bool>;

    /// Remove a record and its dependents. Returns false when no record has the key.
    fn delete(&mut self, kind: RecordKind, key: Key) -> RecordResult<bool>;
}

/// Set a patient's last visit date
pub fn record_last_visit<S: RecordStore + ?Sized>(
    store: &mut S,
    patient: Key,
    visit_date: NaiveDate,
) -> RecordResult<bool> {
    let patch = PatientPatch {
        last_visit_date: Some(visit_date),
        ..PatientPatch::default()
    };
    store.update(RecordKind::Patient, patient, &patch)
}

/// Read a record's key, accepting integers and numeric text
pub(crate) fn key_of(kind: RecordKind, record: &Record) -> Option<Key> {
    match record.value(kind.key_field()) {
        Value::Integer(n) => Key::try_from(*n).ok(),
        Value::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Keys above `i64::MAX` are kept as text instead of wrapping
pub(crate) fn key_value(key: Key) -> Value {
    i64::try_from(key).map_or_else(|_| Value::Text(key.to_string()), Value::Integer)
}

/// Lay a new record out in schema order with its key in front
pub(crate) fn prepare_insert(kind: RecordKind, key: Key, record: &Record) -> RecordResult<Record> {
    if let Some(field) = record.field_names().find(|field| !kind.has_column(field)) {
        return Err(RecordError::unknown_field(kind.name(), field));
    }

    let key_field = kind.key_field();
    Ok(kind
        .columns()
        .iter()
        .map(|&column| {
            let value = if column == key_field {
                key_value(key)
            } else {
                record.value(column).clone()
            };
            (column, value)
        })
        .collect())
}

/// Apply a patch to a stored record after checking it targets this kind
pub(crate) fn apply_patch(
    kind: RecordKind,
    record: &Record,
    patch: &dyn FieldPatch,
) -> RecordResult<Record> {
    if patch.kind() != kind {
        return Err(RecordError::kind_mismatch(kind.name(), patch.kind().name()));
    }
    Ok(patch
        .changes()
        .into_iter()
        .fold(record.clone(), |record, (field, value)| record.with(field, value)))
}

/// Whether `record` of a dependent kind belongs to `owner`'s record `key`
pub(crate) fn belongs_to(owner: RecordKind, key: Key, record: &Record) -> bool {
    match record.value(owner.key_field()) {
        Value::Integer(n) => Key::try_from(*n).ok() == Some(key),
        Value::Text(s) => s.trim().parse::<Key>().ok() == Some(key),
        _ => false,
    }
}

/// Next key after the largest one in use
pub(crate) fn next_key(kind: RecordKind, records: &[Record]) -> RecordResult<Key> {
    let max = records.iter().filter_map(|record| key_of(kind, record)).max();
    key_after(kind, max)
}

/// Key following `max`, starting at 1 for an empty table
pub(crate) fn key_after(kind: RecordKind, max: Option<Key>) -> RecordResult<Key> {
    match max {
        None => Ok(1),
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| RecordError::keys_exhausted(kind.name())),
    }
}
