use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, error};

use crate::entities::conversions;
use crate::entities::vitals::{RiskScore, VitalReading, VitalRecord};
use twin_care_data::repository::{RepositoryError, VitalsRepositoryTrait};

/// Default number of history entries shown for a patient
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Vitals service errors
#[derive(Debug, Error)]
pub enum VitalsServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Not found error
    #[error("Not found: {0}")]
    NotFound(String),

    /// Repository error
    #[error("Repository error: {0}")]
    RepositoryError(String),
}

/// Persistence side of the monitoring loop: the per-patient vitals log
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VitalsServiceTrait: Send + Sync {
    /// Timestamp a scored reading and append it to the patient's log
    async fn append_vital(
        &self,
        patient_id: &str,
        reading: &VitalReading,
        score: &RiskScore,
    ) -> Result<VitalRecord, VitalsServiceError>;

    /// Log entries, most recent first
    async fn list_vitals(
        &self,
        patient_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<VitalRecord>, VitalsServiceError>;
}

/// Vitals service over a repository from the data layer
pub struct VitalsService<R: VitalsRepositoryTrait> {
    repository: R,
}

impl<R: VitalsRepositoryTrait> VitalsService<R> {
    /// Create a new vitals service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Map repository errors to service errors
    fn map_repo_error(&self, err: RepositoryError) -> VitalsServiceError {
        match err {
            RepositoryError::NotFound(msg) => VitalsServiceError::NotFound(msg),
            RepositoryError::Validation(msg) => VitalsServiceError::ValidationError(msg),
            _ => VitalsServiceError::RepositoryError(err.to_string()),
        }
    }
}

#[async_trait]
impl<R: VitalsRepositoryTrait> VitalsServiceTrait for VitalsService<R> {
    async fn append_vital(
        &self,
        patient_id: &str,
        reading: &VitalReading,
        score: &RiskScore,
    ) -> Result<VitalRecord, VitalsServiceError> {
        if patient_id.trim().is_empty() {
            return Err(VitalsServiceError::ValidationError("Patient id is required".to_string()));
        }

        let request = conversions::convert_to_data_vital_request(reading, score);
        let stored = self.repository.append(patient_id, request)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        debug!("Stored vitals {} for patient {}", stored.id, patient_id);

        conversions::convert_to_domain_vital_record(stored).map_err(|e| {
            error!("Stored vitals entry could not be read back: {}", e);
            VitalsServiceError::RepositoryError(e)
        })
    }

    async fn list_vitals(
        &self,
        patient_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<VitalRecord>, VitalsServiceError> {
        let stored = self.repository.list(patient_id, limit)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        stored.into_iter()
            .map(conversions::convert_to_domain_vital_record)
            .collect::<Result<Vec<_>, _>>()
            .map_err(VitalsServiceError::RepositoryError)
    }
}

/// Create a vitals service over the default repository (global pool if initialized)
pub fn create_default_vitals_service() -> VitalsService<twin_care_data::repository::VitalsRepository> {
    VitalsService::new(twin_care_data::repository::VitalsRepository::new())
}
