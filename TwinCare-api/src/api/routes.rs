use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::FromRef,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Extension, Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

use twin_care_domain::config::MonitoringConfig;
use twin_care_domain::ml::ArtifactBundle;
use twin_care_domain::services::{
    create_default_patient_service, create_default_vitals_service, MonitoringService, PatientServiceTrait,
    RiskScorer, VitalGenerator, VitalsServiceTrait,
};

use crate::api::handlers::{health, monitoring, patients, vitals};
use crate::openapi::configure_swagger_routes;

/// Shared handle to the patient service
pub type SharedPatientService = Arc<dyn PatientServiceTrait>;

/// Shared handle to the vitals service
pub type SharedVitalsService = Arc<dyn VitalsServiceTrait>;

/// Services the handlers extract with `State`
#[derive(Clone, FromRef)]
pub struct AppState {
    pub patients: SharedPatientService,
    pub vitals: SharedVitalsService,
    pub monitoring: MonitoringService,
    pub scorer: RiskScorer,
}

impl AppState {
    /// Assemble the state from already built services
    pub fn new(
        patients: SharedPatientService,
        vitals: SharedVitalsService,
        monitoring: MonitoringService,
    ) -> Self {
        let scorer = monitoring.scorer().clone();
        Self { patients, vitals, monitoring, scorer }
    }

    /// Default repositories over the global pool, an entropy-seeded generator
    /// and the given artifacts
    pub fn with_defaults(artifacts: Arc<ArtifactBundle>, config: MonitoringConfig) -> Self {
        let patients: SharedPatientService = Arc::new(create_default_patient_service());
        let vitals: SharedVitalsService = Arc::new(create_default_vitals_service());

        let monitoring = MonitoringService::new(
            Arc::new(VitalGenerator::new()),
            RiskScorer::new(artifacts),
            vitals.clone(),
            config,
        );

        Self::new(patients, vitals, monitoring)
    }
}

/// Create the application router
pub fn create_app(state: AppState, health_service: health::SharedHealthService) -> Router {
    debug!("Creating application router");

    let api_routes = Router::new()
        .route("/patients", get(patients::list_patients).post(patients::create_patient))
        .route("/patients/:id", get(patients::get_patient))
        .route(
            "/patients/:id/ehr",
            get(patients::list_ehr_records).post(patients::create_ehr_record),
        )
        .route("/patients/:id/vitals", get(vitals::get_vitals_history))
        .route("/patients/:id/monitoring", post(monitoring::run_monitoring))
        .route("/patients/:id/monitoring/stream", get(monitoring::stream_monitoring))
        .route("/score", post(vitals::score_reading));

    debug!("API routes configured");

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .layer(Extension(health_service));

    let app = Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .with_state(state);

    debug!("API routes nested");

    let app = add_swagger_ui(app);
    debug!("Swagger UI merged");

    let app = configure_security(app).layer(TraceLayer::new_for_http());

    health::initialize_server_start_time();
    debug!("Health check service initialized");

    app
}

/// Add Swagger UI to the router
pub fn add_swagger_ui(app: Router) -> Router {
    app.merge(configure_swagger_routes())
}

/// CORS and response security headers
pub fn configure_security(app: Router) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600));

    let security_headers = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ));

    app.layer(cors).layer(security_headers)
}
