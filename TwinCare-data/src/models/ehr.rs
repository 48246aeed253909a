use serde::{Deserialize, Serialize};

/// Storage model for an electronic health record entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EhrRecord {
    /// Unique identifier for the entry
    pub id: String,

    /// Patient the entry belongs to
    pub patient_id: String,

    /// When the entry was written (RFC 3339)
    pub timestamp: String,

    /// Diagnosis text
    pub diagnosis: String,

    /// Optional treatment description
    pub treatment: Option<String>,

    /// Prescribed medications
    pub medications: Vec<String>,

    /// Optional free-text notes
    pub notes: Option<String>,
}

/// Input data for appending an EHR entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEhrRecordRequest {
    /// When the entry was written (RFC 3339)
    pub timestamp: String,

    /// Diagnosis text
    pub diagnosis: String,

    /// Optional treatment description
    pub treatment: Option<String>,

    /// Prescribed medications
    pub medications: Vec<String>,

    /// Optional free-text notes
    pub notes: Option<String>,
}
