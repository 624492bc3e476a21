use super::{
    apply_patch, belongs_to, key_after, prepare_insert, FieldPatch, Key, RecordKind, RecordStore,
};
use crate::error::RecordResult;
use crate::record::Record;
use std::collections::BTreeMap;
use tracing::debug;

/// In-memory store with per-kind tables ordered by key
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: BTreeMap<RecordKind, BTreeMap<Key, Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records of a kind
    pub fn count(&self, kind: RecordKind) -> usize {
        self.tables.get(&kind).map_or(0, BTreeMap::len)
    }
}

impl RecordStore for MemoryStore {
    fn fetch_all(&self, kind: RecordKind) -> RecordResult<Vec<Record>> {
        Ok(self
            .tables
            .get(&kind)
            .map(|table| table.values().cloned().collect())
            .unwrap_or_default())
    }

    fn fetch_by_key(&self, kind: RecordKind, key: Key) -> RecordResult<Option<Record>> {
        Ok(self.tables.get(&kind).and_then(|table| table.get(&key)).cloned())
    }

    fn insert(&mut self, kind: RecordKind, record: Record) -> RecordResult<Key> {
        let table = self.tables.entry(kind).or_default();
        let key = key_after(kind, table.keys().next_back().copied())?;
        let record = prepare_insert(kind, key, &record)?;
        table.insert(key, record);
        debug!(%kind, key, "inserted record");
        Ok(key)
    }

    fn update(&mut self, kind: RecordKind, key: Key, patch: &dyn FieldPatch) -> RecordResult<bool> {
        let Some(slot) = self.tables.get_mut(&kind).and_then(|table| table.get_mut(&key)) else {
            return Ok(false);
        };
        *slot = apply_patch(kind, slot, patch)?;
        debug!(%kind, key, "updated record");
        Ok(true)
    }

    fn delete(&mut self, kind: RecordKind, key: Key) -> RecordResult<bool> {
        let removed = self
            .tables
            .get_mut(&kind)
            .and_then(|table| table.remove(&key))
            .is_some();
        if !removed {
            return Ok(false);
        }

        for dependent in kind.dependents() {
            if let Some(table) = self.tables.get_mut(dependent) {
                let before = table.len();
                table.retain(|_, record| !belongs_to(kind, key, record));
                debug!(%kind, key, %dependent, removed = before - table.len(), "cascaded delete");
            }
        }
        debug!(%kind, key, "deleted record");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecordError;
    use crate::record::Value;
    use crate::store::{record_last_visit, AppointmentPatch, AppointmentStatus, PatientPatch};
    use chrono::NaiveDate;

    fn patient(first: &str) -> Record {
        Record::builder()
            .field("first_name", first)
            .field("last_name", "Smith")
            .build()
    }

    #[test]
    fn test_insert_generates_sequential_keys() -> RecordResult<()> {
        let mut store = MemoryStore::new();
        assert_eq!(store.insert(RecordKind::Patient, patient("Jane"))?, 1);
        assert_eq!(store.insert(RecordKind::Patient, patient("John"))?, 2);
        assert_eq!(store.insert(RecordKind::Doctor, Record::new())?, 1);

        let jane = store
            .fetch_by_key(RecordKind::Patient, 1)?
            .expect("patient 1 exists");
        assert_eq!(jane.value("patient_id"), &Value::Integer(1));
        assert_eq!(jane.value("first_name"), &Value::text("Jane"));
        assert_eq!(store.fetch_all(RecordKind::Patient)?.len(), 2);
        Ok(())
    }

    #[test]
    fn test_update_applies_patch() -> RecordResult<()> {
        let mut store = MemoryStore::new();
        let key = store.insert(RecordKind::Patient, patient("Jane"))?;
        let visit = NaiveDate::from_ymd_opt(2023, 6, 1).expect("valid date");

        assert!(record_last_visit(&mut store, key, visit)?);
        let patch = PatientPatch {
            email: Some("jane.smith@example.com".into()),
            ..PatientPatch::default()
        };
        assert!(store.update(RecordKind::Patient, key, &patch)?);
        assert!(!store.update(RecordKind::Patient, 99, &patch)?);

        let jane = store.fetch_by_key(RecordKind::Patient, key)?.expect("patient exists");
        assert_eq!(jane.value("last_visit_date"), &Value::Date(visit));
        assert_eq!(jane.value("email"), &Value::text("jane.smith@example.com"));
        assert_eq!(jane.value("first_name"), &Value::text("Jane"));
        Ok(())
    }

    #[test]
    fn test_patch_for_wrong_kind_is_rejected() -> RecordResult<()> {
        let mut store = MemoryStore::new();
        let key = store.insert(RecordKind::Patient, patient("Jane"))?;
        let patch = AppointmentPatch::status(AppointmentStatus::Completed);
        assert!(matches!(
            store.update(RecordKind::Patient, key, &patch),
            Err(RecordError::KindMismatch { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_deleting_patient_cascades() -> RecordResult<()> {
        let mut store = MemoryStore::new();
        let jane = store.insert(RecordKind::Patient, patient("Jane"))?;
        let john = store.insert(RecordKind::Patient, patient("John"))?;
        for owner in [jane, john, jane] {
            store.insert(
                RecordKind::Appointment,
                Record::builder().field("patient_id", owner as i64).build(),
            )?;
        }
        store.insert(RecordKind::Doctor, Record::builder().field("name", "Dr. Who").build())?;

        assert!(store.delete(RecordKind::Patient, jane)?);
        assert!(!store.delete(RecordKind::Patient, jane)?);

        let remaining = store.fetch_all(RecordKind::Appointment)?;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].value("patient_id"), &Value::Integer(john as i64));
        assert_eq!(store.count(RecordKind::Doctor), 1);
        Ok(())
    }

    #[test]
    fn test_deleting_appointment_leaves_patient() -> RecordResult<()> {
        let mut store = MemoryStore::new();
        let jane = store.insert(RecordKind::Patient, patient("Jane"))?;
        let visit = store.insert(
            RecordKind::Appointment,
            Record::builder().field("patient_id", jane as i64).build(),
        )?;
        assert!(store.delete(RecordKind::Appointment, visit)?);
        assert_eq!(store.count(RecordKind::Patient), 1);
        assert_eq!(store.count(RecordKind::Appointment), 0);
        Ok(())
    }
}
