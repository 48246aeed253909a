use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use twin_care_domain::entities::{
    MonitoringSession, RiskScore as DomainRiskScore, SessionAverages as DomainSessionAverages, SessionTick,
    VitalReading as DomainVitalReading, VitalRecord as DomainVitalRecord,
};

/// One snapshot of the monitored vitals
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate, ToSchema)]
pub struct VitalReading {
    /// Heart rate in beats per minute
    #[validate(range(min = 20, max = 300, message = "Heart rate must be between 20 and 300"))]
    #[schema(example = 82)]
    pub heart_rate: u16,

    /// Oxygen saturation in percent
    #[validate(range(min = 50, max = 100, message = "SpO2 must be between 50 and 100"))]
    #[schema(example = 96)]
    pub spo2: u16,

    /// Systolic blood pressure in mmHg
    #[validate(range(min = 40, max = 300, message = "Systolic must be between 40 and 300"))]
    #[schema(example = 128)]
    pub bp_sys: u16,

    /// Diastolic blood pressure in mmHg
    #[validate(range(min = 20, max = 200, message = "Diastolic must be between 20 and 200"))]
    #[schema(example = 84)]
    pub bp_dia: u16,
}

/// Model outputs for one reading
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct RiskScore {
    /// Probability of heart risk, 0 to 1 with two decimals
    pub heart_risk: f64,

    /// Probability of respiratory distress, 0 to 1 with two decimals
    pub respiratory_risk: f64,

    /// 0 low, 1 medium, 2 high
    pub stress_level: u8,
}

/// A stored entry of a patient's vitals log
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VitalRecord {
    pub id: String,
    pub patient_id: String,
    pub timestamp: DateTime<Utc>,
    pub reading: VitalReading,
    pub score: RiskScore,
}

/// Query parameters for the vitals history
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct VitalsHistoryParams {
    /// Maximum number of entries, newest first (default: 10)
    pub limit: Option<usize>,
}

/// One tick of a monitoring session
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MonitoringTick {
    /// 1-based position within the session
    pub second: u32,
    pub reading: VitalReading,
    pub score: RiskScore,
    /// Whether the tick was written to the vitals log
    pub persisted: bool,
}

/// Session averages
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionAverages {
    pub heart_risk: f64,
    pub respiratory_risk: f64,

    /// Mean stress class, absent when it cannot be averaged
    pub stress_level: Option<f64>,

    /// Stress mean with two decimals, or "Varied / Non-numeric"
    pub stress_level_display: String,

    pub tick_count: usize,
}

/// Result of a completed monitoring session
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MonitoringSessionResponse {
    pub patient_id: String,
    pub started_at: DateTime<Utc>,
    pub ticks: Vec<MonitoringTick>,
    /// Ticks the vitals log rejected
    pub persist_failures: usize,
    pub averages: SessionAverages,
}

impl From<DomainVitalReading> for VitalReading {
    fn from(reading: DomainVitalReading) -> Self {
        Self {
            heart_rate: reading.heart_rate,
            spo2: reading.spo2,
            bp_sys: reading.bp_sys,
            bp_dia: reading.bp_dia,
        }
    }
}

impl From<VitalReading> for DomainVitalReading {
    fn from(reading: VitalReading) -> Self {
        Self {
            heart_rate: reading.heart_rate,
            spo2: reading.spo2,
            bp_sys: reading.bp_sys,
            bp_dia: reading.bp_dia,
        }
    }
}

impl From<DomainRiskScore> for RiskScore {
    fn from(score: DomainRiskScore) -> Self {
        Self {
            heart_risk: score.heart_risk,
            respiratory_risk: score.respiratory_risk,
            stress_level: score.stress_level,
        }
    }
}

impl From<DomainVitalRecord> for VitalRecord {
    fn from(record: DomainVitalRecord) -> Self {
        Self {
            id: record.id,
            patient_id: record.patient_id,
            timestamp: record.timestamp,
            reading: record.reading.into(),
            score: record.score.into(),
        }
    }
}

impl From<&SessionTick> for MonitoringTick {
    fn from(tick: &SessionTick) -> Self {
        Self {
            second: tick.second,
            reading: tick.reading.into(),
            score: tick.score.into(),
            persisted: tick.persisted,
        }
    }
}

impl From<&DomainSessionAverages> for SessionAverages {
    fn from(averages: &DomainSessionAverages) -> Self {
        Self {
            heart_risk: averages.heart_risk,
            respiratory_risk: averages.respiratory_risk,
            stress_level: averages.stress_level.value(),
            stress_level_display: averages.stress_level.to_string(),
            tick_count: averages.tick_count,
        }
    }
}

impl From<MonitoringSession> for MonitoringSessionResponse {
    fn from(session: MonitoringSession) -> Self {
        let averages = SessionAverages::from(&session.averages());
        Self {
            ticks: session.ticks.iter().map(MonitoringTick::from).collect(),
            patient_id: session.patient_id,
            started_at: session.started_at,
            persist_failures: session.persist_failures,
            averages,
        }
    }
}
