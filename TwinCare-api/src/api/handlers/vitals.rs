use axum::extract::{rejection::JsonRejection, Json, Path, Query, State};
use tracing::{debug, instrument};
use validator::Validate;

use twin_care_domain::services::vitals::DEFAULT_HISTORY_LIMIT;
use twin_care_domain::services::RiskScorer;

use crate::api::routes::{SharedPatientService, SharedVitalsService};
use crate::entities::common::ErrorResponse;
use crate::entities::vitals::{RiskScore, VitalReading, VitalRecord, VitalsHistoryParams};
use super::{rejected_body, validation_failed};

/// Recent vitals of a patient, newest first
#[utoipa::path(
    get,
    path = "/api/v1/patients/{id}/vitals",
    params(
        ("id" = String, Path, description = "Patient ID"),
        VitalsHistoryParams
    ),
    responses(
        (status = 200, description = "Vitals history, most recent first", body = [VitalRecord]),
        (status = 400, description = "Invalid limit", body = ErrorResponse),
        (status = 404, description = "Patient not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "vitals"
)]
#[instrument(skip(patients, vitals))]
pub async fn get_vitals_history(
    State(patients): State<SharedPatientService>,
    State(vitals): State<SharedVitalsService>,
    Path(id): Path<String>,
    Query(params): Query<VitalsHistoryParams>,
) -> Result<Json<Vec<VitalRecord>>, ErrorResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    if limit == 0 {
        return Err(ErrorResponse::bad_request("limit must be at least 1"));
    }

    patients.get_patient(&id).await?;

    let records = vitals.list_vitals(&id, Some(limit)).await?;
    debug!("Returning {} vitals entries for {}", records.len(), id);

    Ok(Json(records.into_iter().map(VitalRecord::from).collect()))
}

/// Score a single reading without storing it
#[utoipa::path(
    post,
    path = "/api/v1/score",
    request_body = VitalReading,
    responses(
        (status = 200, description = "Risk score for the reading", body = RiskScore),
        (status = 400, description = "Reading out of range", body = ErrorResponse),
    ),
    tag = "vitals"
)]
#[instrument(skip(scorer, payload))]
pub async fn score_reading(
    State(scorer): State<RiskScorer>,
    payload: Result<Json<VitalReading>, JsonRejection>,
) -> Result<Json<RiskScore>, ErrorResponse> {
    let Json(reading) = payload.map_err(rejected_body)?;
    reading.validate().map_err(validation_failed)?;

    let score = scorer.score(&reading.into());
    Ok(Json(score.into()))
}
