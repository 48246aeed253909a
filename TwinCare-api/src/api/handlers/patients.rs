use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, instrument};

use crate::api::routes::SharedPatientService;
use crate::entities::common::ErrorResponse;
use crate::entities::patient::{CreateEhrRecordRequest, CreatePatientRequest, EhrRecord, Patient};
use super::rejected_body;

/// List all registered patients
#[utoipa::path(
    get,
    path = "/api/v1/patients",
    responses(
        (status = 200, description = "Registered patients", body = [Patient]),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "patients"
)]
#[instrument(skip(service))]
pub async fn list_patients(
    State(service): State<SharedPatientService>,
) -> Result<Json<Vec<Patient>>, ErrorResponse> {
    let patients = service.list_patients().await?;
    info!("Listing {} patients", patients.len());
    Ok(Json(patients.into_iter().map(Patient::from).collect()))
}

/// Register a new patient
#[utoipa::path(
    post,
    path = "/api/v1/patients",
    request_body = CreatePatientRequest,
    responses(
        (status = 201, description = "Patient registered", body = Patient),
        (status = 400, description = "Invalid registration form", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "patients"
)]
#[instrument(skip(service, payload))]
pub async fn create_patient(
    State(service): State<SharedPatientService>,
    payload: Result<Json<CreatePatientRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let Json(request) = payload.map_err(rejected_body)?;

    let patient = service.register_patient(request.into()).await?;
    info!("Patient registered with ID: {}", patient.id);

    Ok((StatusCode::CREATED, Json(Patient::from(patient))))
}

/// Get a single patient
#[utoipa::path(
    get,
    path = "/api/v1/patients/{id}",
    params(
        ("id" = String, Path, description = "Patient ID")
    ),
    responses(
        (status = 200, description = "Patient found", body = Patient),
        (status = 404, description = "Patient not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "patients"
)]
#[instrument(skip(service))]
pub async fn get_patient(
    State(service): State<SharedPatientService>,
    Path(id): Path<String>,
) -> Result<Json<Patient>, ErrorResponse> {
    let patient = service.get_patient(&id).await?;
    Ok(Json(patient.into()))
}

/// List a patient's EHR records
#[utoipa::path(
    get,
    path = "/api/v1/patients/{id}/ehr",
    params(
        ("id" = String, Path, description = "Patient ID")
    ),
    responses(
        (status = 200, description = "EHR records in the order they were added", body = [EhrRecord]),
        (status = 404, description = "Patient not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "patients"
)]
#[instrument(skip(service))]
pub async fn list_ehr_records(
    State(service): State<SharedPatientService>,
    Path(id): Path<String>,
) -> Result<Json<Vec<EhrRecord>>, ErrorResponse> {
    let records = service.list_ehr_records(&id).await?;
    Ok(Json(records.into_iter().map(EhrRecord::from).collect()))
}

/// Add an EHR record to a patient
#[utoipa::path(
    post,
    path = "/api/v1/patients/{id}/ehr",
    params(
        ("id" = String, Path, description = "Patient ID")
    ),
    request_body = CreateEhrRecordRequest,
    responses(
        (status = 201, description = "EHR record added", body = EhrRecord),
        (status = 400, description = "Invalid EHR form", body = ErrorResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "patients"
)]
#[instrument(skip(service, payload))]
pub async fn create_ehr_record(
    State(service): State<SharedPatientService>,
    Path(id): Path<String>,
    payload: Result<Json<CreateEhrRecordRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ErrorResponse> {
    let Json(request) = payload.map_err(rejected_body)?;

    let record = service.add_ehr_record(&id, request.into()).await?;
    info!("EHR record {} added for patient {}", record.id, id);

    Ok((StatusCode::CREATED, Json(EhrRecord::from(record))))
}
