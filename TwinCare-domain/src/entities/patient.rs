use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Genders accepted on the registration form
pub const GENDERS: [&str; 3] = ["Male", "Female", "Other"];

/// A registered patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    /// Identifier derived from the name and the registration time
    pub id: String,

    /// Full name
    pub name: String,

    /// Age in years
    pub age: u8,

    /// Gender as entered on the registration form
    pub gender: String,

    /// Optional contact information
    pub contact: Option<String>,

    /// Known conditions / medical notes
    pub conditions: Vec<String>,

    /// When the patient was registered
    pub created_at: DateTime<Utc>,
}

/// Registration form for a new patient
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePatientRequest {
    /// Full name, required
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name: String,

    /// Age in years
    #[validate(range(max = 120, message = "Age must be between 0 and 120"))]
    pub age: u8,

    /// One of Male, Female or Other
    #[validate(custom = "validate_gender")]
    pub gender: String,

    /// Optional contact information
    #[validate(length(max = 200, message = "Contact cannot exceed 200 characters"))]
    pub contact: Option<String>,

    /// Optional medical notes, stored as the first known condition
    #[validate(length(max = 2000, message = "Notes cannot exceed 2000 characters"))]
    pub notes: Option<String>,
}

impl CreatePatientRequest {
    /// Conditions list built from the free-text notes
    pub fn conditions(&self) -> Vec<String> {
        match self.notes.as_deref().map(str::trim) {
            Some(notes) if !notes.is_empty() => vec![notes.to_string()],
            _ => Vec::new(),
        }
    }
}

fn validate_gender(gender: &str) -> Result<(), validator::ValidationError> {
    if GENDERS.contains(&gender) {
        Ok(())
    } else {
        let mut err = validator::ValidationError::new("gender");
        err.message = Some("Gender must be one of Male, Female or Other".into());
        Err(err)
    }
}

/// Patient id: the lower-cased name with spaces as underscores, then the UTC time
pub fn patient_id_for(name: &str, registered_at: DateTime<Utc>) -> String {
    format!(
        "{}_{}",
        name.to_lowercase().replace(' ', "_"),
        registered_at.format("%Y%m%d%H%M%S")
    )
}
