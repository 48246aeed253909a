use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of model input features
pub const FEATURE_COUNT: usize = 4;

/// One snapshot of the monitored vitals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VitalReading {
    /// Heart rate in beats per minute
    pub heart_rate: u16,

    /// Oxygen saturation in percent
    pub spo2: u16,

    /// Systolic blood pressure in mmHg
    pub bp_sys: u16,

    /// Diastolic blood pressure in mmHg
    pub bp_dia: u16,
}

impl VitalReading {
    /// Model feature vector, in the order the artifacts were fitted on
    pub fn features(&self) -> [f64; FEATURE_COUNT] {
        [
            f64::from(self.heart_rate),
            f64::from(self.spo2),
            f64::from(self.bp_sys),
            f64::from(self.bp_dia),
        ]
    }
}

/// Model outputs for one reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskScore {
    /// Probability of heart risk, two decimals
    pub heart_risk: f64,

    /// Probability of respiratory distress, two decimals
    pub respiratory_risk: f64,

    /// Stress class: 0 low, 1 medium, 2 high
    pub stress_level: u8,
}

/// A reading and its score as persisted in a patient's vitals log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalRecord {
    pub id: String,
    pub patient_id: String,
    pub timestamp: DateTime<Utc>,
    pub reading: VitalReading,
    pub score: RiskScore,
}
