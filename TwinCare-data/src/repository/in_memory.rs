use std::sync::{Arc, Mutex};

use crate::models::ehr::EhrRecord;
use crate::models::patient::PatientRecord;
use crate::models::vitals::VitalRecord;
use super::errors::RepositoryError;

#[derive(Debug, Default)]
struct Collections {
    patients: Vec<PatientRecord>,
    ehr_records: Vec<EhrRecord>,
    vital_records: Vec<VitalRecord>,
    next_seq: i64,
}

/// In-memory storage used when no database pool is configured
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    collections: Arc<Mutex<Collections>>,
}

impl InMemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new patient, rejecting duplicate ids
    pub async fn insert_patient(&self, patient: &PatientRecord) -> Result<(), RepositoryError> {
        let mut store = self.collections.lock()?;
        if store.patients.iter().any(|p| p.id == patient.id) {
            return Err(RepositoryError::Conflict(patient.id.clone()));
        }
        store.patients.push(patient.clone());
        Ok(())
    }

    /// Get a patient by id
    pub async fn get_patient(&self, id: &str) -> Result<Option<PatientRecord>, RepositoryError> {
        let store = self.collections.lock()?;
        Ok(store.patients.iter().find(|p| p.id == id).cloned())
    }

    /// All patients, oldest registration first
    pub async fn list_patients(&self) -> Result<Vec<PatientRecord>, RepositoryError> {
        let store = self.collections.lock()?;
        let mut patients = store.patients.clone();
        patients.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(patients)
    }

    /// Append an EHR entry
    pub async fn append_ehr_record(&self, record: &EhrRecord) -> Result<(), RepositoryError> {
        let mut store = self.collections.lock()?;
        store.ehr_records.push(record.clone());
        Ok(())
    }

    /// EHR entries for a patient in insertion order
    pub async fn list_ehr_records(&self, patient_id: &str) -> Result<Vec<EhrRecord>, RepositoryError> {
        let store = self.collections.lock()?;
        Ok(store.ehr_records
            .iter()
            .filter(|r| r.patient_id == patient_id)
            .cloned()
            .collect())
    }

    /// Append a vitals entry, assigning its insertion sequence
    pub async fn append_vital_record(&self, mut record: VitalRecord) -> Result<VitalRecord, RepositoryError> {
        let mut store = self.collections.lock()?;
        store.next_seq += 1;
        record.seq = store.next_seq;
        store.vital_records.push(record.clone());
        Ok(record)
    }

    /// Vitals entries for a patient, most recent first
    pub async fn list_vital_records(
        &self,
        patient_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<VitalRecord>, RepositoryError> {
        let store = self.collections.lock()?;

        let mut records: Vec<VitalRecord> = store.vital_records
            .iter()
            .filter(|r| r.patient_id == patient_id)
            .cloned()
            .collect();

        records.sort_by(|a, b| {
            b.timestamp.cmp(&a.timestamp).then_with(|| b.seq.cmp(&a.seq))
        });

        if let Some(limit) = limit {
            records.truncate(limit);
        }

        Ok(records)
    }
}
