use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use utoipa::ToSchema;

use twin_care_domain::services::{MonitoringError, PatientServiceError, VitalsServiceError};

/// Error response format for the API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error type/code - machine-readable identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a not found error response
    pub fn not_found(resource: &str) -> Self {
        Self {
            error: "not_found".to_string(),
            message: format!("The requested {} could not be found", resource),
            details: None,
        }
    }

    /// Create a validation error response
    pub fn validation_error(message: &str, details: Option<serde_json::Value>) -> Self {
        Self {
            error: "validation_error".to_string(),
            message: message.to_string(),
            details,
        }
    }

    /// Create a bad request error response
    pub fn bad_request(message: &str) -> Self {
        Self {
            error: "bad_request".to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    /// Create a conflict error response
    pub fn conflict(message: &str) -> Self {
        Self {
            error: "conflict".to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    /// Create an internal error response
    pub fn internal_error() -> Self {
        Self {
            error: "internal_error".to_string(),
            message: "An unexpected error occurred".to_string(),
            details: None,
        }
    }

    /// The status code this error is sent with
    pub fn status(&self) -> StatusCode {
        match self.error.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "validation_error" | "bad_request" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<PatientServiceError> for ErrorResponse {
    fn from(err: PatientServiceError) -> Self {
        match err {
            PatientServiceError::NotFound(_) => Self::not_found("patient"),
            PatientServiceError::ValidationError(msg) => {
                warn!("Rejected patient request: {}", msg);
                Self::validation_error(&msg, None)
            }
            PatientServiceError::Conflict(msg) => Self::conflict(&msg),
            PatientServiceError::RepositoryError(msg) => {
                error!("Patient repository failure: {}", msg);
                Self::internal_error()
            }
        }
    }
}

impl From<VitalsServiceError> for ErrorResponse {
    fn from(err: VitalsServiceError) -> Self {
        match err {
            VitalsServiceError::NotFound(_) => Self::not_found("vitals"),
            VitalsServiceError::ValidationError(msg) => Self::validation_error(&msg, None),
            VitalsServiceError::RepositoryError(msg) => {
                error!("Vitals repository failure: {}", msg);
                Self::internal_error()
            }
        }
    }
}

impl From<MonitoringError> for ErrorResponse {
    fn from(err: MonitoringError) -> Self {
        error!("Monitoring session failed: {}", err);
        match &err {
            MonitoringError::Persistence { tick, .. } => Self {
                error: "internal_error".to_string(),
                message: err.to_string(),
                details: Some(serde_json::json!({ "tick": tick })),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_errors_map_to_status_codes() {
        let not_found: ErrorResponse = PatientServiceError::NotFound("x".to_string()).into();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let invalid: ErrorResponse = PatientServiceError::ValidationError("name: required".to_string()).into();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.message, "name: required");

        let conflict: ErrorResponse = PatientServiceError::Conflict("x".to_string()).into();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let broken: ErrorResponse = VitalsServiceError::RepositoryError("disk full".to_string()).into();
        assert_eq!(broken.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(broken.message, "An unexpected error occurred");
    }

    #[test]
    fn test_aborted_session_reports_tick() {
        let err: ErrorResponse = MonitoringError::Persistence {
            tick: 4,
            message: "disk full".to_string(),
        }.into();

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.details, Some(serde_json::json!({ "tick": 4 })));
    }
}
