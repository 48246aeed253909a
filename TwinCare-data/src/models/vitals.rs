use serde::{Deserialize, Serialize};

/// Storage model for one persisted monitoring tick: the reading and its scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalRecord {
    /// Unique identifier for the entry
    pub id: String,

    /// Insertion sequence, breaks ties between equal timestamps
    pub seq: i64,

    /// Patient the entry belongs to
    pub patient_id: String,

    /// When the entry was appended (RFC 3339, microsecond precision, UTC)
    pub timestamp: String,

    /// Heart rate in beats per minute
    pub heart_rate: u16,

    /// Oxygen saturation in percent
    pub spo2: u16,

    /// Systolic blood pressure in mmHg
    pub bp_sys: u16,

    /// Diastolic blood pressure in mmHg
    pub bp_dia: u16,

    /// Heart risk probability
    pub heart_risk: f64,

    /// Respiratory risk probability
    pub respiratory_risk: f64,

    /// Stress level class
    pub stress_level: u8,
}

/// Input data for appending a vitals entry; the repository stamps id, sequence and time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateVitalRecordRequest {
    pub heart_rate: u16,
    pub spo2: u16,
    pub bp_sys: u16,
    pub bp_dia: u16,
    pub heart_risk: f64,
    pub respiratory_risk: f64,
    pub stress_level: u8,
}
