use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::api::handlers::health::health_check,

        // Patient endpoints
        crate::api::handlers::patients::list_patients,
        crate::api::handlers::patients::create_patient,
        crate::api::handlers::patients::get_patient,
        crate::api::handlers::patients::list_ehr_records,
        crate::api::handlers::patients::create_ehr_record,

        // Vitals endpoints
        crate::api::handlers::vitals::get_vitals_history,
        crate::api::handlers::vitals::score_reading,

        // Monitoring endpoints
        crate::api::handlers::monitoring::run_monitoring,
        crate::api::handlers::monitoring::stream_monitoring
    ),
    components(
        schemas(
            // Entities
            crate::entities::common::ErrorResponse,
            crate::entities::patient::Patient,
            crate::entities::patient::CreatePatientRequest,
            crate::entities::patient::EhrRecord,
            crate::entities::patient::CreateEhrRecordRequest,
            crate::entities::vitals::VitalReading,
            crate::entities::vitals::RiskScore,
            crate::entities::vitals::VitalRecord,
            crate::entities::vitals::VitalsHistoryParams,
            crate::entities::vitals::MonitoringTick,
            crate::entities::vitals::SessionAverages,
            crate::entities::vitals::MonitoringSessionResponse,

            // Health handlers
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentStatus,
            crate::api::handlers::health::ComponentHealthStatus
        )
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "patients", description = "Patient registration and EHR records"),
        (name = "vitals", description = "Vitals history and single reading scoring"),
        (name = "monitoring", description = "Simulated monitoring sessions")
    ),
    info(
        title = "TwinCare API",
        version = "0.1.0",
        description = "Digital-twin patient monitoring: simulated vitals, model-based risk scores and EHR records",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;
