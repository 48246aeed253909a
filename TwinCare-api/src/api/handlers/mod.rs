pub mod health;
pub mod monitoring;
pub mod patients;
pub mod vitals;

use axum::extract::rejection::JsonRejection;
use tracing::warn;
use validator::ValidationErrors;

use twin_care_domain::services::validation_message;

use crate::entities::common::ErrorResponse;

// Re-export handlers for easier imports
pub use health::health_check;
pub use monitoring::{run_monitoring, stream_monitoring};
pub use patients::{create_ehr_record, create_patient, get_patient, list_ehr_records, list_patients};
pub use vitals::{get_vitals_history, score_reading};

/// Malformed or incomplete JSON bodies are client errors
pub(crate) fn rejected_body(rejection: JsonRejection) -> ErrorResponse {
    warn!("Rejected request body: {}", rejection.body_text());
    ErrorResponse::bad_request(&rejection.body_text())
}

pub(crate) fn validation_failed(errors: ValidationErrors) -> ErrorResponse {
    let message = validation_message(&errors);
    warn!("Validation failed: {}", message);
    ErrorResponse::validation_error(&message, serde_json::to_value(&errors).ok())
}
