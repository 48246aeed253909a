use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tracing::{error, info};
use validator::Validate;

use crate::entities::conversions;
use crate::entities::ehr::{CreateEhrRecordRequest, EhrRecord};
use crate::entities::patient::{patient_id_for, CreatePatientRequest, Patient};
use super::validation_message;
use twin_care_data::repository::{PatientRepositoryTrait, RepositoryError};

/// Patient service errors
#[derive(Debug, Error)]
pub enum PatientServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Not found error
    #[error("Patient not found: {0}")]
    NotFound(String),

    /// A patient with the same id already exists
    #[error("Patient already exists: {0}")]
    Conflict(String),

    /// Repository error
    #[error("Repository error: {0}")]
    RepositoryError(String),
}

/// Trait for patient registry and EHR operations
#[async_trait]
pub trait PatientServiceTrait: Send + Sync {
    /// Validate a registration form
    fn validate_create_request(&self, request: &CreatePatientRequest) -> Result<(), PatientServiceError>;

    /// Register a new patient
    async fn register_patient(&self, request: CreatePatientRequest) -> Result<Patient, PatientServiceError>;

    /// Get a patient by id
    async fn get_patient(&self, id: &str) -> Result<Patient, PatientServiceError>;

    /// All registered patients
    async fn list_patients(&self) -> Result<Vec<Patient>, PatientServiceError>;

    /// Add an EHR record to an existing patient
    async fn add_ehr_record(
        &self,
        patient_id: &str,
        request: CreateEhrRecordRequest,
    ) -> Result<EhrRecord, PatientServiceError>;

    /// EHR records of an existing patient, oldest first
    async fn list_ehr_records(&self, patient_id: &str) -> Result<Vec<EhrRecord>, PatientServiceError>;
}

/// Patient service for domain logic
pub struct PatientService<R: PatientRepositoryTrait> {
    repository: R,
}

impl<R: PatientRepositoryTrait> PatientService<R> {
    /// Create a new patient service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Map repository errors to service errors
    fn map_repo_error(&self, err: RepositoryError) -> PatientServiceError {
        match err {
            RepositoryError::NotFound(msg) => PatientServiceError::NotFound(msg),
            RepositoryError::Validation(msg) => PatientServiceError::ValidationError(msg),
            RepositoryError::Conflict(id) => PatientServiceError::Conflict(id),
            _ => PatientServiceError::RepositoryError(err.to_string()),
        }
    }

    fn corrupt(e: String) -> PatientServiceError {
        error!("Stored record could not be converted: {}", e);
        PatientServiceError::RepositoryError(e)
    }
}

#[async_trait]
impl<R: PatientRepositoryTrait> PatientServiceTrait for PatientService<R> {
    fn validate_create_request(&self, request: &CreatePatientRequest) -> Result<(), PatientServiceError> {
        request.validate()
            .map_err(|errors| PatientServiceError::ValidationError(validation_message(&errors)))?;

        if request.name.trim().is_empty() {
            return Err(PatientServiceError::ValidationError("name: Name is required".to_string()));
        }

        Ok(())
    }

    async fn register_patient(&self, request: CreatePatientRequest) -> Result<Patient, PatientServiceError> {
        self.validate_create_request(&request)?;

        let created_at = Utc::now();
        let name = request.name.trim().to_string();
        let patient = Patient {
            id: patient_id_for(&name, created_at),
            conditions: request.conditions(),
            name,
            age: request.age,
            gender: request.gender,
            contact: request.contact.filter(|c| !c.trim().is_empty()),
            created_at,
        };

        self.repository.insert(conversions::convert_to_data_patient(&patient))
            .await
            .map_err(|e| self.map_repo_error(e))?;

        info!("Registered patient {}", patient.id);
        Ok(patient)
    }

    async fn get_patient(&self, id: &str) -> Result<Patient, PatientServiceError> {
        let record = self.repository.get_by_id(id)
            .await
            .map_err(|e| self.map_repo_error(e))?
            .ok_or_else(|| PatientServiceError::NotFound(id.to_string()))?;

        conversions::convert_to_domain_patient(record).map_err(Self::corrupt)
    }

    async fn list_patients(&self) -> Result<Vec<Patient>, PatientServiceError> {
        let records = self.repository.get_all()
            .await
            .map_err(|e| self.map_repo_error(e))?;

        records.into_iter()
            .map(conversions::convert_to_domain_patient)
            .collect::<Result<Vec<_>, _>>()
            .map_err(Self::corrupt)
    }

    async fn add_ehr_record(
        &self,
        patient_id: &str,
        request: CreateEhrRecordRequest,
    ) -> Result<EhrRecord, PatientServiceError> {
        request.validate()
            .map_err(|errors| PatientServiceError::ValidationError(validation_message(&errors)))?;
        if request.diagnosis.trim().is_empty() {
            return Err(PatientServiceError::ValidationError(
                "diagnosis: Diagnosis is required".to_string(),
            ));
        }

        // only existing patients get records
        self.get_patient(patient_id).await?;

        let stored = self.repository
            .append_ehr(patient_id, conversions::convert_to_data_ehr_request(&request))
            .await
            .map_err(|e| self.map_repo_error(e))?;

        info!("Added EHR record {} for patient {}", stored.id, patient_id);
        conversions::convert_to_domain_ehr_record(stored).map_err(Self::corrupt)
    }

    async fn list_ehr_records(&self, patient_id: &str) -> Result<Vec<EhrRecord>, PatientServiceError> {
        self.get_patient(patient_id).await?;

        let records = self.repository.list_ehr(patient_id)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        records.into_iter()
            .map(conversions::convert_to_domain_ehr_record)
            .collect::<Result<Vec<_>, _>>()
            .map_err(Self::corrupt)
    }
}

/// Create a patient service over the default repository (global pool if initialized)
pub fn create_default_patient_service() -> PatientService<twin_care_data::repository::PatientRepository> {
    PatientService::new(twin_care_data::repository::PatientRepository::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use twin_care_data::repository::{MockPatientRepository, PatientRepository};

    fn registration(name: &str) -> CreatePatientRequest {
        CreatePatientRequest {
            name: name.to_string(),
            age: 58,
            gender: "Male".to_string(),
            contact: Some("  ".to_string()),
            notes: Some("hypertension".to_string()),
        }
    }

    fn ehr(diagnosis: &str, medications: &str) -> CreateEhrRecordRequest {
        CreateEhrRecordRequest {
            diagnosis: diagnosis.to_string(),
            medications: crate::entities::ehr::parse_medications(medications),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_register_and_fetch_patient() {
        let service = PatientService::new(PatientRepository::in_memory());

        let patient = service.register_patient(registration("John Smith")).await.unwrap();
        assert!(patient.id.starts_with("john_smith_"));
        assert_eq!(patient.id.len(), "john_smith_".len() + 14);
        assert_eq!(patient.conditions, vec!["hypertension".to_string()]);
        assert_eq!(patient.contact, None);

        let fetched = service.get_patient(&patient.id).await.unwrap();
        assert_eq!(fetched.name, "John Smith");

        let all = service.list_patients().await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_registration_is_rejected() {
        let service = PatientService::new(PatientRepository::in_memory());

        let err = service.register_patient(registration("   ")).await.unwrap_err();
        assert!(matches!(err, PatientServiceError::ValidationError(_)));

        let err = service
            .register_patient(CreatePatientRequest { gender: "?".to_string(), ..registration("A B") })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Gender"));
    }

    #[tokio::test]
    async fn test_unknown_patient_is_not_found() {
        let service = PatientService::new(PatientRepository::in_memory());

        assert!(matches!(
            service.get_patient("nobody").await,
            Err(PatientServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.add_ehr_record("nobody", ehr("flu", "")).await,
            Err(PatientServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.list_ehr_records("nobody").await,
            Err(PatientServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_ehr_records_in_insertion_order() {
        let pool = twin_care_data::database::create_in_memory_pool().unwrap();
        let service = PatientService::new(PatientRepository::with_pool(pool));
        let patient = service.register_patient(registration("Ann Lee")).await.unwrap();

        service.add_ehr_record(&patient.id, ehr("bronchitis", "amoxicillin, rest")).await.unwrap();
        service.add_ehr_record(&patient.id, ehr("follow-up", "")).await.unwrap();

        let records = service.list_ehr_records(&patient.id).await.unwrap();
        let diagnoses: Vec<&str> = records.iter().map(|r| r.diagnosis.as_str()).collect();
        assert_eq!(diagnoses, vec!["bronchitis", "follow-up"]);
        assert_eq!(records[0].medications, vec!["amoxicillin", "rest"]);
        assert!(records[1].medications.is_empty());

        let err = service.add_ehr_record(&patient.id, ehr(" ", "")).await.unwrap_err();
        assert!(matches!(err, PatientServiceError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_repository_failure_is_mapped() {
        let service = PatientService::new(MockPatientRepository::failing());
        let err = service.list_patients().await.unwrap_err();
        assert!(matches!(err, PatientServiceError::RepositoryError(_)));
    }
}
