use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::database::{get_db_pool, DatabasePool};
use crate::models::vitals::{CreateVitalRecordRequest, VitalRecord};
use super::errors::RepositoryError;
use super::in_memory::InMemoryStorage;
use super::storage::DatabaseStorage;

/// Repository trait for the per-patient vitals log
#[async_trait]
pub trait VitalsRepositoryTrait: Send + Sync {
    /// Timestamp and append one entry to a patient's log
    async fn append(
        &self,
        patient_id: &str,
        request: CreateVitalRecordRequest,
    ) -> Result<VitalRecord, RepositoryError>;

    /// Entries for a patient, most recent first, optionally capped
    async fn list(&self, patient_id: &str, limit: Option<usize>) -> Result<Vec<VitalRecord>, RepositoryError>;
}

/// Build a new, not yet stored, record stamped with the current time
fn stamp(patient_id: &str, request: CreateVitalRecordRequest) -> VitalRecord {
    VitalRecord {
        id: Uuid::new_v4().to_string(),
        seq: 0,
        patient_id: patient_id.to_string(),
        // fixed-width UTC form keeps lexical and chronological order identical
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        heart_rate: request.heart_rate,
        spo2: request.spo2,
        bp_sys: request.bp_sys,
        bp_dia: request.bp_dia,
        heart_risk: request.heart_risk,
        respiratory_risk: request.respiratory_risk,
        stress_level: request.stress_level,
    }
}

/// Repository for vitals entries.
/// Uses the SQLite pool when one is available and in-memory storage otherwise.
#[derive(Debug, Clone, Default)]
pub struct VitalsRepository {
    pool: Option<DatabasePool>,
    storage: InMemoryStorage,
}

impl VitalsRepository {
    /// Create a repository over the global pool, if it was initialized
    pub fn new() -> Self {
        let pool = match get_db_pool() {
            Ok(pool) => Some(pool),
            Err(e) => {
                debug!("Database not available ({}), vitals will be kept in memory", e);
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
impl VitalsRepositoryTrait for VitalsRepository {
    async fn append(
        &self,
        patient_id: &str,
        request: CreateVitalRecordRequest,
    ) -> Result<VitalRecord, RepositoryError> {
        let record = stamp(patient_id, request);

        match &self.pool {
            Some(pool) => DatabaseStorage::append_vital_record(pool, record).await,
            None => self.storage.append_vital_record(record).await,
        }
    }

    async fn list(&self, patient_id: &str, limit: Option<usize>) -> Result<Vec<VitalRecord>, RepositoryError> {
        match &self.pool {
            Some(pool) => DatabaseStorage::list_vital_records(pool, patient_id, limit).await,
            None => self.storage.list_vital_records(patient_id, limit).await,
        }
    }
}

/// Mock vitals repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock implementation of VitalsRepositoryTrait.
    /// Appends are kept in memory; failures can be injected on chosen calls.
    #[derive(Debug, Default)]
    pub struct MockVitalsRepository {
        storage: InMemoryStorage,
        calls: AtomicUsize,
        fail_on: Vec<usize>,
    }

    impl MockVitalsRepository {
        /// Fail the given 1-based append calls with a database error
        pub fn failing_on(calls: Vec<usize>) -> Self {
            Self {
                fail_on: calls,
                ..Self::default()
            }
        }

        /// Number of append calls seen, including failed ones
        pub fn append_calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl VitalsRepositoryTrait for MockVitalsRepository {
        async fn append(
            &self,
            patient_id: &str,
            request: CreateVitalRecordRequest,
        ) -> Result<VitalRecord, RepositoryError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_on.contains(&call) {
                return Err(RepositoryError::Database(
                    format!("mock is configured to fail append #{}", call).into(),
                ));
            }
            self.storage.append_vital_record(stamp(patient_id, request)).await
        }

        async fn list(&self, patient_id: &str, limit: Option<usize>) -> Result<Vec<VitalRecord>, RepositoryError> {
            self.storage.list_vital_records(patient_id, limit).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::mocks::MockVitalsRepository;

    fn request(heart_rate: u16) -> CreateVitalRecordRequest {
        CreateVitalRecordRequest {
            heart_rate,
            spo2: 97,
            bp_sys: 120,
            bp_dia: 80,
            heart_risk: 0.25,
            respiratory_risk: 0.1,
            stress_level: 1,
        }
    }

    async fn assert_newest_first(repo: &dyn VitalsRepositoryTrait) {
        for heart_rate in 60..70 {
            repo.append("patient_1", request(heart_rate)).await.unwrap();
        }
        repo.append("patient_2", request(120)).await.unwrap();

        let listed = repo.list("patient_1", None).await.unwrap();
        assert_eq!(listed.len(), 10);

        let rates: Vec<u16> = listed.iter().map(|r| r.heart_rate).collect();
        let expected: Vec<u16> = (60..70).rev().collect();
        assert_eq!(rates, expected);

        for pair in listed.windows(2) {
            assert!(pair[0].timestamp >= pair[1].timestamp);
            assert!(pair[0].seq > pair[1].seq);
        }

        let capped = repo.list("patient_1", Some(3)).await.unwrap();
        assert_eq!(capped.len(), 3);
        assert_eq!(capped[0].heart_rate, 69);

        assert!(repo.list("nobody", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_in_memory_vitals_newest_first() {
        assert_newest_first(&VitalsRepository::in_memory()).await;
    }

    #[tokio::test]
    async fn test_sqlite_vitals_newest_first() {
        let pool = crate::database::create_in_memory_pool().unwrap();
        assert_newest_first(&VitalsRepository::with_pool(pool)).await;
    }

    #[tokio::test]
    async fn test_sqlite_round_trips_scores() {
        let pool = crate::database::create_in_memory_pool().unwrap();
        let repo = VitalsRepository::with_pool(pool);

        let stored = repo.append("patient_1", request(88)).await.unwrap();
        assert!(stored.seq > 0);

        let listed = repo.list("patient_1", None).await.unwrap();
        assert_eq!(listed, vec![stored]);
    }

    #[tokio::test]
    async fn test_mock_injected_failures() {
        let repo = MockVitalsRepository::failing_on(vec![2]);

        assert!(repo.append("p", request(70)).await.is_ok());
        assert!(repo.append("p", request(71)).await.is_err());
        assert!(repo.append("p", request(72)).await.is_ok());

        assert_eq!(repo.append_calls(), 3);
        assert_eq!(repo.list("p", None).await.unwrap().len(), 2);
    }
}
