use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// One clinician-entered record attached to a patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EhrRecord {
    pub id: String,
    pub patient_id: String,
    pub timestamp: DateTime<Utc>,
    pub diagnosis: String,
    pub treatment: Option<String>,
    pub medications: Vec<String>,
    pub notes: Option<String>,
}

/// Form for adding an EHR record
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateEhrRecordRequest {
    /// Required diagnosis text
    #[validate(length(min = 1, max = 500, message = "Diagnosis must be between 1 and 500 characters"))]
    pub diagnosis: String,

    #[validate(length(max = 1000, message = "Treatment cannot exceed 1000 characters"))]
    pub treatment: Option<String>,

    /// Either a list or a single comma-separated string
    #[serde(default, deserialize_with = "deserialize_medications")]
    pub medications: Vec<String>,

    #[validate(length(max = 2000, message = "Notes cannot exceed 2000 characters"))]
    pub notes: Option<String>,

    /// When the record was written; defaults to now
    pub timestamp: Option<DateTime<Utc>>,
}

/// Split a comma-separated medication list, trimming entries and dropping empty ones
pub fn parse_medications(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

/// Accepts a list of names or one comma-separated string
pub fn deserialize_medications<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Medications {
        Text(String),
        List(Vec<String>),
    }

    Ok(match Option::<Medications>::deserialize(deserializer)? {
        Some(Medications::Text(raw)) => parse_medications(&raw),
        Some(Medications::List(items)) => items
            .iter()
            .map(|m| m.trim())
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    })
}
