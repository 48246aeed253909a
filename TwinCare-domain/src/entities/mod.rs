// Domain entities and value objects
pub mod conversions;
pub mod ehr;
pub mod monitoring;
pub mod patient;
pub mod vitals;

// Re-export common types for easier imports
pub use ehr::{CreateEhrRecordRequest, EhrRecord};
pub use monitoring::{MonitoringSession, SessionAverages, SessionTick, StressAverage};
pub use patient::{CreatePatientRequest, Patient};
pub use vitals::{RiskScore, VitalReading, VitalRecord};
