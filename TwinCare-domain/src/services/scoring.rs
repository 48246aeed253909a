use std::sync::Arc;

use crate::entities::vitals::{RiskScore, VitalReading};
use crate::ml::ArtifactBundle;

/// Score one reading against a set of artifacts.
///
/// Pure: the same reading and artifacts always give the same score.
pub fn score(reading: &VitalReading, artifacts: &ArtifactBundle) -> RiskScore {
    let x = artifacts.scaler().transform(&reading.features());

    RiskScore {
        heart_risk: round2(artifacts.heart().probability_of(1, &x)),
        respiratory_risk: round2(artifacts.respiratory().probability_of(1, &x)),
        stress_level: artifacts.stress().predict(&x),
    }
}

/// Probability rounded to two decimals, halves to even, and kept inside [0, 1]
fn round2(p: f64) -> f64 {
    ((p * 100.0).round_ties_even() / 100.0).clamp(0.0, 1.0)
}

/// Scorer bound to the process-wide artifact bundle
#[derive(Debug, Clone)]
pub struct RiskScorer {
    artifacts: Arc<ArtifactBundle>,
}

impl RiskScorer {
    pub fn new(artifacts: Arc<ArtifactBundle>) -> Self {
        Self { artifacts }
    }

    pub fn artifacts(&self) -> &Arc<ArtifactBundle> {
        &self.artifacts
    }

    pub fn score(&self, reading: &VitalReading) -> RiskScore {
        score(reading, &self.artifacts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::monitoring::STRESS_CLASSES;
    use crate::services::simulator::{ReadingSource, VitalGenerator};
    use crate::testing::{fixture_artifacts, shipped_artifacts};

    const WORST: VitalReading = VitalReading { heart_rate: 140, spo2: 85, bp_sys: 180, bp_dia: 120 };
    const MID: VitalReading = VitalReading { heart_rate: 100, spo2: 95, bp_sys: 130, bp_dia: 80 };

    #[test]
    fn test_fixture_scores() {
        let scorer = RiskScorer::new(Arc::new(fixture_artifacts()));

        // the fixture scaler centers this reading at zero
        let centered = VitalReading { heart_rate: 100, spo2: 92, bp_sys: 140, bp_dia: 90 };
        let s = scorer.score(&centered);
        assert_eq!(s.heart_risk, 0.5);
        assert_eq!(s.respiratory_risk, 0.0);
        assert_eq!(s.stress_level, 0);

        let s = scorer.score(&WORST);
        assert_eq!(s.heart_risk, 1.0);
        assert_eq!(s.respiratory_risk, 1.0);
        assert_eq!(s.stress_level, 2);
    }

    #[test]
    fn test_round2_sends_halves_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(0.625), 0.62);
        assert_eq!(round2(0.875), 0.88);
        assert_eq!(round2(0.4449), 0.44);
        assert_eq!(round2(1.2), 1.0);
        assert_eq!(round2(-0.01), 0.0);
    }

    #[test]
    fn test_score_is_pure() {
        let artifacts = shipped_artifacts();
        let generator = VitalGenerator::seeded(1);
        for _ in 0..500 {
            let reading = generator.generate();
            let a = score(&reading, &artifacts);
            let b = score(&reading, &artifacts);
            assert_eq!(a.heart_risk.to_bits(), b.heart_risk.to_bits());
            assert_eq!(a.respiratory_risk.to_bits(), b.respiratory_risk.to_bits());
            assert_eq!(a.stress_level, b.stress_level);
        }
    }

    #[test]
    fn test_scores_stay_in_range() {
        let artifacts = shipped_artifacts();
        let generator = VitalGenerator::new();
        for _ in 0..2_000 {
            let s = score(&generator.generate(), &artifacts);
            assert!((0.0..=1.0).contains(&s.heart_risk));
            assert!((0.0..=1.0).contains(&s.respiratory_risk));
            assert!(STRESS_CLASSES.contains(&s.stress_level));
            assert_eq!(s.heart_risk, (s.heart_risk * 100.0).round_ties_even() / 100.0);
        }
    }

    #[test]
    fn test_worst_case_outranks_mid_range() {
        for artifacts in [shipped_artifacts(), fixture_artifacts()] {
            let worst = score(&WORST, &artifacts);
            let mid = score(&MID, &artifacts);
            assert!(worst.heart_risk > mid.heart_risk, "{:?} vs {:?}", worst, mid);
        }
    }

    #[test]
    fn test_shipped_models_follow_training_labels() {
        let artifacts = shipped_artifacts();

        let low_oxygen = VitalReading { spo2: 88, ..MID };
        assert!(score(&low_oxygen, &artifacts).respiratory_risk > 0.5);
        assert!(score(&MID, &artifacts).respiratory_risk < 0.5);

        let calm = VitalReading { heart_rate: 62, spo2: 99, bp_sys: 105, bp_dia: 65 };
        assert_eq!(score(&calm, &artifacts).stress_level, 0);
        assert_eq!(score(&WORST, &artifacts).stress_level, 2);
    }
}
