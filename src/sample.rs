//! Sample clinic data for demos and tests

use crate::error::RecordResult;
use crate::record::{Record, Value};
use crate::store::{record_last_visit, AppointmentStatus, Key, RecordKind, RecordStore};
use chrono::{NaiveDate, NaiveTime};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::info;

const FIRST_NAMES: &[&str] = &[
    "John", "Jane", "Michael", "Emily", "David", "Sarah", "Robert", "Jennifer", "William", "Lisa",
    "James", "Jessica",
];
const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Miller", "Davis", "Garcia", "Rodriguez",
    "Wilson",
];
const BLOOD_TYPES: &[Option<&str>] = &[
    Some("A+"),
    Some("A-"),
    Some("B+"),
    Some("B-"),
    Some("AB+"),
    Some("AB-"),
    Some("O+"),
    Some("O-"),
    None,
];
const DIAGNOSES: &[&str] = &[
    "Hypertension",
    "Diabetes Type 2",
    "Asthma",
    "Migraine",
    "Arthritis",
    "Bronchitis",
    "Influenza",
    "Allergic Rhinitis",
    "Hyperlipidemia",
    "GERD",
    "Anxiety Disorder",
    "Depression",
];
const TREATMENTS: &[&str] = &[
    "Medication prescribed",
    "Physical therapy recommended",
    "Lifestyle changes advised",
    "Scheduled follow-up",
    "Referred to specialist",
    "Surgery recommended",
    "Dietary changes suggested",
    "Monitoring required",
];
const PURPOSES: &[&str] = &[
    "Routine checkup",
    "Follow-up visit",
    "Vaccination",
    "Test results review",
    "Consultation",
    "Treatment",
];
const STREETS: &[&str] = &["Main", "Oak", "Pine", "Maple"];
const GENDERS: &[&str] = &["Male", "Female", "Other"];

/// Counts of generated records per kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SampleSummary {
    pub patients: usize,
    pub history_entries: usize,
    pub appointments: usize,
}

/// Random but reproducible clinic data
pub struct SampleGenerator {
    rng: StdRng,
}

impl SampleGenerator {
    /// A seeded generator yields the same data on every run
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Insert `patients` patients, each with 1-5 history entries and 1-3
    /// appointments; about 70% get a last-visit date.
    pub fn populate<S: RecordStore + ?Sized>(
        &mut self,
        store: &mut S,
        patients: usize,
    ) -> RecordResult<SampleSummary> {
        let mut summary = SampleSummary::default();

        for _ in 0..patients {
            let patient = store.insert(RecordKind::Patient, self.patient())?;
            summary.patients += 1;

            for _ in 0..self.rng.gen_range(1..=5) {
                store.insert(RecordKind::MedicalHistory, self.history_entry(patient))?;
                summary.history_entries += 1;
            }

            for _ in 0..self.rng.gen_range(1..=3) {
                store.insert(RecordKind::Appointment, self.appointment(patient))?;
                summary.appointments += 1;
            }

            if self.rng.gen_bool(0.7) {
                let visit = self.date(2018..=2023);
                record_last_visit(store, patient, visit)?;
            }
        }

        info!(
            patients = summary.patients,
            history_entries = summary.history_entries,
            appointments = summary.appointments,
            "generated sample data"
        );
        Ok(summary)
    }

    fn pick(&mut self, choices: &[&'static str]) -> &'static str {
        choices.choose(&mut self.rng).copied().unwrap_or_default()
    }

    fn date(&mut self, years: std::ops::RangeInclusive<i32>) -> NaiveDate {
        let year = self.rng.gen_range(years);
        let month = self.rng.gen_range(1..=12);
        let day = self.rng.gen_range(1..=28);
        // Days 1-28 exist in every month
        NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
    }

    fn patient(&mut self) -> Record {
        let first = self.pick(FIRST_NAMES);
        let last = self.pick(LAST_NAMES);
        let blood = BLOOD_TYPES.choose(&mut self.rng).copied().flatten();
        let phone = format!(
            "{}-{}-{}",
            self.rng.gen_range(200..=999),
            self.rng.gen_range(200..=999),
            self.rng.gen_range(1000..=9999)
        );
        let address = format!(
            "{} {} St.",
            self.rng.gen_range(1..=9999),
            self.pick(STREETS)
        );

        Record::builder()
            .field("first_name", first)
            .field("last_name", last)
            .field("date_of_birth", self.date(1940..=2020))
            .field("gender", self.pick(GENDERS))
            .field("phone", phone)
            .field("email", format!("{}.{}@example.com", first.to_lowercase(), last.to_lowercase()))
            .field("address", address)
            .field("blood_type", blood)
            .field("registration_date", self.date(2015..=2023))
            .build()
    }

    fn history_entry(&mut self, patient: Key) -> Record {
        let notes = self
            .rng
            .gen_bool(0.5)
            .then_some("Sample note for testing purposes");
        let severity: Option<i64> = self.rng.gen_bool(0.7).then(|| self.rng.gen_range(1..=10));

        Record::builder()
            .field("patient_id", patient as i64)
            .field("entry_date", self.date(2018..=2023))
            .field("diagnosis", self.pick(DIAGNOSES))
            .field("treatment", self.pick(TREATMENTS))
            .field("notes", notes)
            .field("severity", severity)
            .build()
    }

    fn appointment(&mut self, patient: Key) -> Record {
        let hour = self.rng.gen_range(9..=16);
        let minute = *[0, 15, 30, 45].choose(&mut self.rng).unwrap_or(&0);
        let start = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN);
        let end = start + chrono::Duration::minutes(30);
        let status = *AppointmentStatus::ALL
            .choose(&mut self.rng)
            .unwrap_or(&AppointmentStatus::Scheduled);
        let notes = self.rng.gen_bool(0.3).then_some("Sample appointment note");

        Record::builder()
            .field("patient_id", patient as i64)
            .field("appointment_date", self.date(2023..=2023))
            .field("start_time", start)
            .field("end_time", end)
            .field("purpose", self.pick(PURPOSES))
            .field("status", Value::from(status))
            .field("notes", notes)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SortAlgorithm, SortOrder};
    use crate::sort::{first_disorder, sort};
    use crate::store::MemoryStore;

    #[test]
    fn test_populate_counts_match_store() -> RecordResult<()> {
        let mut store = MemoryStore::new();
        let summary = SampleGenerator::new(Some(7)).populate(&mut store, 12)?;

        assert_eq!(summary.patients, 12);
        assert_eq!(store.count(RecordKind::Patient), 12);
        assert_eq!(store.count(RecordKind::MedicalHistory), summary.history_entries);
        assert_eq!(store.count(RecordKind::Appointment), summary.appointments);
        assert!((12..=60).contains(&summary.history_entries));
        assert!((12..=36).contains(&summary.appointments));
        Ok(())
    }

    #[test]
    fn test_seeded_generation_is_reproducible() -> RecordResult<()> {
        let mut first = MemoryStore::new();
        let mut second = MemoryStore::new();
        SampleGenerator::new(Some(99)).populate(&mut first, 5)?;
        SampleGenerator::new(Some(99)).populate(&mut second, 5)?;
        assert_eq!(
            first.fetch_all(RecordKind::Patient)?,
            second.fetch_all(RecordKind::Patient)?
        );
        Ok(())
    }

    #[test]
    fn test_sample_data_sorts_on_every_field() -> RecordResult<()> {
        let mut store = MemoryStore::new();
        SampleGenerator::new(Some(3)).populate(&mut store, 15)?;

        for kind in [RecordKind::Patient, RecordKind::MedicalHistory, RecordKind::Appointment] {
            let records = store.fetch_all(kind)?;
            for &field in kind.columns() {
                let sorted = sort(&records, field, SortOrder::Descending, SortAlgorithm::default_for(kind))?;
                assert_eq!(first_disorder(&sorted, field, SortOrder::Descending)?, None, "{kind}.{field}");
            }
        }
        Ok(())
    }
}
