use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use twin_care_domain::entities::ehr::deserialize_medications;
use twin_care_domain::entities::{
    CreateEhrRecordRequest as DomainCreateEhrRecordRequest, CreatePatientRequest as DomainCreatePatientRequest,
    EhrRecord as DomainEhrRecord, Patient as DomainPatient,
};

/// Public representation of a registered patient
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Patient {
    /// Identifier derived from the name and the registration time
    #[schema(example = "jane_doe_20240501093000")]
    pub id: String,

    /// Full name
    pub name: String,

    /// Age in years
    pub age: u8,

    /// Male, Female or Other
    pub gender: String,

    /// Contact information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,

    /// Known conditions
    pub conditions: Vec<String>,

    /// When the patient was registered
    pub created_at: DateTime<Utc>,
}

/// Request payload for registering a patient
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePatientRequest {
    /// Full name, required
    pub name: String,

    /// Age in years, 0 to 120
    pub age: u8,

    /// One of Male, Female or Other
    #[schema(example = "Female")]
    pub gender: String,

    /// Optional contact information
    pub contact: Option<String>,

    /// Optional medical notes
    pub notes: Option<String>,
}

/// Public representation of an EHR record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EhrRecord {
    pub id: String,
    pub patient_id: String,
    pub timestamp: DateTime<Utc>,
    pub diagnosis: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment: Option<String>,
    pub medications: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Request payload for adding an EHR record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateEhrRecordRequest {
    /// Required diagnosis
    pub diagnosis: String,

    pub treatment: Option<String>,

    /// A list, or one comma-separated string such as "metformin, lisinopril"
    #[serde(default, deserialize_with = "deserialize_medications")]
    #[schema(value_type = Vec<String>)]
    pub medications: Vec<String>,

    pub notes: Option<String>,

    /// When the record was written. Defaults to the current time.
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<DomainPatient> for Patient {
    fn from(patient: DomainPatient) -> Self {
        Self {
            id: patient.id,
            name: patient.name,
            age: patient.age,
            gender: patient.gender,
            contact: patient.contact,
            conditions: patient.conditions,
            created_at: patient.created_at,
        }
    }
}

impl From<CreatePatientRequest> for DomainCreatePatientRequest {
    fn from(request: CreatePatientRequest) -> Self {
        Self {
            name: request.name,
            age: request.age,
            gender: request.gender,
            contact: request.contact,
            notes: request.notes,
        }
    }
}

impl From<DomainEhrRecord> for EhrRecord {
    fn from(record: DomainEhrRecord) -> Self {
        Self {
            id: record.id,
            patient_id: record.patient_id,
            timestamp: record.timestamp,
            diagnosis: record.diagnosis,
            treatment: record.treatment,
            medications: record.medications,
            notes: record.notes,
        }
    }
}

impl From<CreateEhrRecordRequest> for DomainCreateEhrRecordRequest {
    fn from(request: CreateEhrRecordRequest) -> Self {
        Self {
            diagnosis: request.diagnosis,
            treatment: request.treatment,
            medications: request.medications,
            notes: request.notes,
            timestamp: request.timestamp,
        }
    }
}
