use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::vitals::{RiskScore, VitalReading};

/// Stress classes the stress model may emit
pub const STRESS_CLASSES: [u8; 3] = [0, 1, 2];

/// Display value used when the stress levels of a session cannot be averaged
pub const VARIED_STRESS_LABEL: &str = "Varied / Non-numeric";

/// One iteration of a monitoring session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionTick {
    /// 1-based position of the tick within the session
    pub second: u32,

    /// Generated reading
    pub reading: VitalReading,

    /// Score derived from the reading
    pub score: RiskScore,

    /// Whether the persistence sink accepted the pair
    pub persisted: bool,
}

/// Average stress level of a session, or the sentinel when it cannot be computed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressAverage {
    Mean(f64),
    Varied,
}

impl StressAverage {
    /// The numeric mean, if there is one
    pub fn value(&self) -> Option<f64> {
        match self {
            StressAverage::Mean(mean) => Some(*mean),
            StressAverage::Varied => None,
        }
    }
}

impl fmt::Display for StressAverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StressAverage::Mean(mean) => write!(f, "{:.2}", mean),
            StressAverage::Varied => f.write_str(VARIED_STRESS_LABEL),
        }
    }
}

/// Session-level averages reported once all ticks are done
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionAverages {
    pub heart_risk: f64,
    pub respiratory_risk: f64,
    pub stress_level: StressAverage,
    pub tick_count: usize,
}

/// One bounded run of the monitoring loop for a single patient.
///
/// Only the individual ticks are persisted; the session itself lives as long
/// as the caller keeps it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringSession {
    pub patient_id: String,
    pub started_at: DateTime<Utc>,
    pub ticks: Vec<SessionTick>,
    /// Ticks the persistence sink rejected
    pub persist_failures: usize,
}

impl MonitoringSession {
    /// Start an empty session
    pub fn new(patient_id: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            started_at: Utc::now(),
            ticks: Vec::new(),
            persist_failures: 0,
        }
    }

    /// Record a finished tick
    pub fn push(&mut self, tick: SessionTick) {
        if !tick.persisted {
            self.persist_failures += 1;
        }
        self.ticks.push(tick);
    }

    /// Arithmetic means over all ticks.
    ///
    /// An empty session reports zero risks. The stress mean is only computed
    /// when there is at least one tick and every tick carries a known class.
    pub fn averages(&self) -> SessionAverages {
        let count = self.ticks.len();
        if count == 0 {
            return SessionAverages {
                heart_risk: 0.0,
                respiratory_risk: 0.0,
                stress_level: StressAverage::Varied,
                tick_count: 0,
            };
        }

        let n = count as f64;
        let heart_risk = self.ticks.iter().map(|t| t.score.heart_risk).sum::<f64>() / n;
        let respiratory_risk = self.ticks.iter().map(|t| t.score.respiratory_risk).sum::<f64>() / n;

        let all_numeric = self.ticks
            .iter()
            .all(|t| STRESS_CLASSES.contains(&t.score.stress_level));

        let stress_level = if all_numeric {
            let total: f64 = self.ticks.iter().map(|t| f64::from(t.score.stress_level)).sum();
            StressAverage::Mean(total / n)
        } else {
            StressAverage::Varied
        };

        SessionAverages {
            heart_risk,
            respiratory_risk,
            stress_level,
            tick_count: count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(second: u32, heart_risk: f64, respiratory_risk: f64, stress_level: u8) -> SessionTick {
        SessionTick {
            second,
            reading: VitalReading { heart_rate: 80, spo2: 97, bp_sys: 120, bp_dia: 80 },
            score: RiskScore { heart_risk, respiratory_risk, stress_level },
            persisted: true,
        }
    }

    #[test]
    fn test_averages_are_arithmetic_means() {
        let mut session = MonitoringSession::new("patient_1");
        session.push(tick(1, 0.2, 0.0, 0));
        session.push(tick(2, 0.4, 1.0, 1));
        session.push(tick(3, 0.9, 0.5, 2));

        let averages = session.averages();
        assert_eq!(averages.tick_count, 3);
        assert!((averages.heart_risk - 0.5).abs() < 1e-9);
        assert!((averages.respiratory_risk - 0.5).abs() < 1e-9);
        assert_eq!(averages.stress_level, StressAverage::Mean(1.0));
        assert_eq!(averages.stress_level.to_string(), "1.00");
    }

    #[test]
    fn test_empty_session_reports_varied_stress() {
        let session = MonitoringSession::new("patient_1");
        let averages = session.averages();

        assert_eq!(averages.heart_risk, 0.0);
        assert_eq!(averages.respiratory_risk, 0.0);
        assert_eq!(averages.stress_level, StressAverage::Varied);
        assert_eq!(averages.stress_level.to_string(), VARIED_STRESS_LABEL);
        assert!(averages.stress_level.value().is_none());
    }

    #[test]
    fn test_unknown_stress_class_falls_back_to_varied() {
        let mut session = MonitoringSession::new("patient_1");
        session.push(tick(1, 0.1, 0.1, 1));
        session.push(tick(2, 0.1, 0.1, 7));

        assert_eq!(session.averages().stress_level, StressAverage::Varied);
    }

    #[test]
    fn test_push_counts_persist_failures() {
        let mut session = MonitoringSession::new("patient_1");
        session.push(tick(1, 0.1, 0.1, 0));
        session.push(SessionTick { persisted: false, ..tick(2, 0.1, 0.1, 0) });

        assert_eq!(session.persist_failures, 1);
        assert_eq!(session.ticks.len(), 2);
    }
}
