pub mod monitoring;
pub mod patients;
pub mod scoring;
pub mod simulator;
pub mod vitals;

// Domain services
// The generator, scorer and monitoring loop form the scoring pipeline; the
// patient and vitals services sit between it and the data layer.

use validator::ValidationErrors;

// Re-export service traits and factory functions
pub use monitoring::{DisplaySink, LogDisplay, MonitoringError, MonitoringService, NoopDisplay};
pub use patients::{create_default_patient_service, PatientService, PatientServiceError, PatientServiceTrait};
pub use scoring::{score, RiskScorer};
pub use simulator::{ReadingSource, VitalGenerator};
pub use vitals::{create_default_vitals_service, VitalsService, VitalsServiceError, VitalsServiceTrait};

/// Flatten validator errors into one readable message
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages: Vec<String> = errors
                .iter()
                .map(|err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid {}", field),
                })
                .collect();
            format!("{}: {}", field, messages.join(", "))
        })
        .collect();
    // field_errors is a HashMap; keep messages stable
    fields.sort();
    fields.join("; ")
}
