use serde::{Deserialize, Serialize};

/// Storage model for a registered patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Unique identifier, derived from the name at registration
    pub id: String,

    /// Full name
    pub name: String,

    /// Age in years
    pub age: u8,

    /// Gender as entered on the registration form
    pub gender: String,

    /// Optional contact information
    pub contact: Option<String>,

    /// Free-text medical notes / known conditions
    pub conditions: Vec<String>,

    /// When the patient was registered (RFC 3339)
    pub created_at: String,
}
