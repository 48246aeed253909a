use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::database::{get_db_pool, DatabasePool};
use crate::models::ehr::{CreateEhrRecordRequest, EhrRecord};
use crate::models::patient::PatientRecord;
use super::errors::RepositoryError;
use super::in_memory::InMemoryStorage;
use super::storage::DatabaseStorage;

/// Repository trait for patients and their EHR entries
#[async_trait]
pub trait PatientRepositoryTrait: Send + Sync {
    /// Store a newly registered patient
    async fn insert(&self, patient: PatientRecord) -> Result<PatientRecord, RepositoryError>;

    /// Get a patient by id
    async fn get_by_id(&self, id: &str) -> Result<Option<PatientRecord>, RepositoryError>;

    /// Get all patients
    async fn get_all(&self) -> Result<Vec<PatientRecord>, RepositoryError>;

    /// Append an EHR entry for a patient
    async fn append_ehr(
        &self,
        patient_id: &str,
        request: CreateEhrRecordRequest,
    ) -> Result<EhrRecord, RepositoryError>;

    /// EHR entries for a patient in insertion order
    async fn list_ehr(&self, patient_id: &str) -> Result<Vec<EhrRecord>, RepositoryError>;
}

/// Repository for patients.
/// Uses the SQLite pool when one is available and in-memory storage otherwise.
#[derive(Debug, Clone, Default)]
pub struct PatientRepository {
    pool: Option<DatabasePool>,
    storage: InMemoryStorage,
}

impl PatientRepository {
    /// Create a repository over the global pool, if it was initialized
    pub fn new() -> Self {
        let pool = match get_db_pool() {
            Ok(pool) => Some(pool),
            Err(e) => {
                debug!("Database not available ({}), patients will be kept in memory", e);
                None
            }
        };

        Self {
            pool,
            storage: InMemoryStorage::new(),
        }
    }

    /// Create a repository over an explicit pool
    pub fn with_pool(pool: DatabasePool) -> Self {
        Self {
            pool: Some(pool),
            storage: InMemoryStorage::new(),
        }
    }

    /// Create a repository that never touches a database
    pub fn in_memory() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PatientRepositoryTrait for PatientRepository {
    async fn insert(&self, patient: PatientRecord) -> Result<PatientRecord, RepositoryError> {
        match &self.pool {
            Some(pool) => DatabaseStorage::insert_patient(pool, &patient).await?,
            None => self.storage.insert_patient(&patient).await?,
        }
        Ok(patient)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<PatientRecord>, RepositoryError> {
        match &self.pool {
            Some(pool) => DatabaseStorage::get_patient(pool, id).await,
            None => self.storage.get_patient(id).await,
        }
    }

    async fn get_all(&self) -> Result<Vec<PatientRecord>, RepositoryError> {
        match &self.pool {
            Some(pool) => DatabaseStorage::list_patients(pool).await,
            None => self.storage.list_patients().await,
        }
    }

    async fn append_ehr(
        &self,
        patient_id: &str,
        request: CreateEhrRecordRequest,
    ) -> Result<EhrRecord, RepositoryError> {
        let record = EhrRecord {
            id: Uuid::new_v4().to_string(),
            patient_id: patient_id.to_string(),
            timestamp: request.timestamp,
            diagnosis: request.diagnosis,
            treatment: request.treatment,
            medications: request.medications,
            notes: request.notes,
        };

        match &self.pool {
            Some(pool) => DatabaseStorage::append_ehr_record(pool, &record).await?,
            None => self.storage.append_ehr_record(&record).await?,
        }

        Ok(record)
    }

    async fn list_ehr(&self, patient_id: &str) -> Result<Vec<EhrRecord>, RepositoryError> {
        match &self.pool {
            Some(pool) => DatabaseStorage::list_ehr_records(pool, patient_id).await,
            None => self.storage.list_ehr_records(patient_id).await,
        }
    }
}

/// Mock patient repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Mock implementation of PatientRepositoryTrait that can be told to fail
    #[derive(Default)]
    pub struct MockPatientRepository {
        patients: Mutex<Vec<PatientRecord>>,
        ehr_records: Mutex<Vec<EhrRecord>>,
        fail: bool,
    }

    impl MockPatientRepository {
        /// Make every call return a database error
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn check(&self) -> Result<(), RepositoryError> {
            if self.fail {
                Err(RepositoryError::Database("mock is configured to fail".to_string().into()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl PatientRepositoryTrait for MockPatientRepository {
        async fn insert(&self, patient: PatientRecord) -> Result<PatientRecord, RepositoryError> {
            self.check()?;
            let mut patients = self.patients.lock()?;
            if patients.iter().any(|p| p.id == patient.id) {
                return Err(RepositoryError::Conflict(patient.id));
            }
            patients.push(patient.clone());
            Ok(patient)
        }

        async fn get_by_id(&self, id: &str) -> Result<Option<PatientRecord>, RepositoryError> {
            self.check()?;
            Ok(self.patients.lock()?.iter().find(|p| p.id == id).cloned())
        }

        async fn get_all(&self) -> Result<Vec<PatientRecord>, RepositoryError> {
            self.check()?;
            Ok(self.patients.lock()?.clone())
        }

        async fn append_ehr(
            &self,
            patient_id: &str,
            request: CreateEhrRecordRequest,
        ) -> Result<EhrRecord, RepositoryError> {
            self.check()?;
            let record = EhrRecord {
                id: Uuid::new_v4().to_string(),
                patient_id: patient_id.to_string(),
                timestamp: request.timestamp,
                diagnosis: request.diagnosis,
                treatment: request.treatment,
                medications: request.medications,
                notes: request.notes,
            };
            self.ehr_records.lock()?.push(record.clone());
            Ok(record)
        }

        async fn list_ehr(&self, patient_id: &str) -> Result<Vec<EhrRecord>, RepositoryError> {
            self.check()?;
            Ok(self.ehr_records
                .lock()?
                .iter()
                .filter(|r| r.patient_id == patient_id)
                .cloned()
                .collect())
        }
    }
}
