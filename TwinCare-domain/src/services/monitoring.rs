use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::config::{MonitoringConfig, SinkFailurePolicy};
use crate::entities::monitoring::{MonitoringSession, SessionAverages, SessionTick};
use super::scoring::RiskScorer;
use super::simulator::ReadingSource;
use super::vitals::VitalsServiceTrait;

/// Monitoring errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MonitoringError {
    /// The persistence sink rejected a tick and the session was configured to abort
    #[error("Session aborted at tick {tick}: {message}")]
    Persistence { tick: u32, message: String },
}

/// Receives every tick as soon as it is scored and stored.
/// Rendering is best effort and cannot fail the session.
pub trait DisplaySink: Send {
    fn show_tick(&mut self, tick: &SessionTick);

    /// Called once after the last tick
    fn show_summary(&mut self, _session: &MonitoringSession, _averages: &SessionAverages) {}
}

/// Writes ticks and the summary to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDisplay;

impl DisplaySink for LogDisplay {
    fn show_tick(&mut self, tick: &SessionTick) {
        info!(
            "Second {}: hr={} spo2={} bp={}/{} heart_risk={}% respiratory_risk={}% stress={}",
            tick.second,
            tick.reading.heart_rate,
            tick.reading.spo2,
            tick.reading.bp_sys,
            tick.reading.bp_dia,
            percent(tick.score.heart_risk),
            percent(tick.score.respiratory_risk),
            tick.score.stress_level
        );
    }

    fn show_summary(&mut self, session: &MonitoringSession, averages: &SessionAverages) {
        info!(
            "Session for {} complete: {} ticks, heart_risk={}%, respiratory_risk={}%, stress={}",
            session.patient_id,
            averages.tick_count,
            percent(averages.heart_risk),
            percent(averages.respiratory_risk),
            averages.stress_level
        );
    }
}

/// Whole percent, truncated
fn percent(p: f64) -> u32 {
    (p * 100.0) as u32
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDisplay;

impl DisplaySink for NoopDisplay {
    fn show_tick(&mut self, _tick: &SessionTick) {}
}

/// Runs bounded monitoring sessions: generate, score, persist, display
#[derive(Clone)]
pub struct MonitoringService {
    source: Arc<dyn ReadingSource>,
    scorer: RiskScorer,
    vitals: Arc<dyn VitalsServiceTrait>,
    config: MonitoringConfig,
}

impl MonitoringService {
    pub fn new(
        source: Arc<dyn ReadingSource>,
        scorer: RiskScorer,
        vitals: Arc<dyn VitalsServiceTrait>,
        config: MonitoringConfig,
    ) -> Self {
        Self { source, scorer, vitals, config }
    }

    pub fn config(&self) -> &MonitoringConfig {
        &self.config
    }

    pub fn scorer(&self) -> &RiskScorer {
        &self.scorer
    }

    /// Run one session for a patient.
    ///
    /// Ticks are paced by the configured interval; there is no pause after
    /// the last one. Each tick is persisted before it is displayed.
    #[instrument(skip(self, display))]
    pub async fn run_session(
        &self,
        patient_id: &str,
        display: &mut dyn DisplaySink,
    ) -> Result<MonitoringSession, MonitoringError> {
        let ticks = self.config.ticks;
        info!("Starting monitoring session: ticks={}, interval={:?}", ticks, self.config.interval);

        let mut session = MonitoringSession::new(patient_id);

        for second in 1..=ticks {
            let reading = self.source.generate();
            let score = self.scorer.score(&reading);

            let persisted = match self.vitals.append_vital(patient_id, &reading, &score).await {
                Ok(_) => true,
                Err(e) => match self.config.on_sink_error {
                    SinkFailurePolicy::Continue => {
                        warn!("Failed to persist tick {}: {}", second, e);
                        false
                    }
                    SinkFailurePolicy::Abort => {
                        error!("Failed to persist tick {}, aborting session: {}", second, e);
                        return Err(MonitoringError::Persistence {
                            tick: second,
                            message: e.to_string(),
                        });
                    }
                },
            };

            let tick = SessionTick { second, reading, score, persisted };
            display.show_tick(&tick);
            session.push(tick);

            if second < ticks && !self.config.interval.is_zero() {
                tokio::time::sleep(self.config.interval).await;
            }
        }

        let averages = session.averages();
        display.show_summary(&session, &averages);

        if session.persist_failures > 0 {
            warn!("Session finished with {} unpersisted ticks", session.persist_failures);
        }
        info!("Monitoring session finished");

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::monitoring::StressAverage;
    use crate::entities::vitals::VitalRecord;
    use crate::services::simulator::VitalGenerator;
    use crate::services::vitals::{MockVitalsServiceTrait, VitalsService, VitalsServiceError};
    use crate::testing::{fixture_artifacts, RecordingDisplay};
    use chrono::Utc;
    use std::time::Duration;
    use twin_care_data::repository::{MockVitalsRepository, VitalsRepository};

    fn service(vitals: Arc<dyn VitalsServiceTrait>, config: MonitoringConfig) -> MonitoringService {
        MonitoringService::new(
            Arc::new(VitalGenerator::seeded(11)),
            RiskScorer::new(Arc::new(fixture_artifacts())),
            vitals,
            config,
        )
    }

    fn abort_config(ticks: u32) -> MonitoringConfig {
        MonitoringConfig {
            on_sink_error: SinkFailurePolicy::Abort,
            ..MonitoringConfig::unpaced(ticks)
        }
    }

    #[tokio::test]
    async fn test_session_persists_every_tick() {
        let vitals = Arc::new(VitalsService::new(VitalsRepository::in_memory()));
        let monitor = service(vitals.clone(), MonitoringConfig::unpaced(30));
        let mut display = RecordingDisplay::default();

        let session = monitor.run_session("patient_1", &mut display).await.unwrap();
        assert_eq!(session.ticks.len(), 30);
        assert_eq!(session.persist_failures, 0);
        assert_eq!(display.ticks.len(), 30);
        assert_eq!(display.summaries, 1);

        let stored = vitals.list_vitals("patient_1", None).await.unwrap();
        assert_eq!(stored.len(), 30);

        // newest first, so the stored log is the session reversed
        let stored_readings: Vec<_> = stored.iter().rev().map(|r| r.reading).collect();
        let session_readings: Vec<_> = session.ticks.iter().map(|t| t.reading).collect();
        assert_eq!(stored_readings, session_readings);

        let expected = stored.iter().map(|r| r.score.heart_risk).sum::<f64>() / 30.0;
        let averages = session.averages();
        assert!((averages.heart_risk - expected).abs() < 1e-9);
        assert!(matches!(averages.stress_level, StressAverage::Mean(_)));
    }

    #[tokio::test]
    async fn test_ticks_are_numbered_from_one() {
        let vitals = Arc::new(VitalsService::new(VitalsRepository::in_memory()));
        let session = service(vitals, MonitoringConfig::unpaced(3))
            .run_session("patient_1", &mut NoopDisplay)
            .await
            .unwrap();

        let seconds: Vec<u32> = session.ticks.iter().map(|t| t.second).collect();
        assert_eq!(seconds, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_continue_policy_survives_sink_failures() {
        let vitals = Arc::new(VitalsService::new(MockVitalsRepository::failing_on(vec![2, 4])));
        let monitor = service(vitals.clone(), MonitoringConfig::unpaced(5));
        let mut display = RecordingDisplay::default();

        let session = monitor.run_session("patient_1", &mut display).await.unwrap();
        assert_eq!(session.ticks.len(), 5);
        assert_eq!(session.persist_failures, 2);
        assert_eq!(display.ticks.len(), 5);
        assert!(!session.ticks[1].persisted);
        assert!(session.ticks[2].persisted);

        assert_eq!(vitals.list_vitals("patient_1", None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_abort_policy_stops_at_first_failure() {
        let vitals = Arc::new(VitalsService::new(MockVitalsRepository::failing_on(vec![3])));
        let monitor = service(vitals.clone(), abort_config(10));
        let mut display = RecordingDisplay::default();

        let err = monitor.run_session("patient_1", &mut display).await.unwrap_err();
        assert!(matches!(err, MonitoringError::Persistence { tick: 3, .. }));
        assert_eq!(display.ticks.len(), 2);
        assert_eq!(display.summaries, 0);
        assert_eq!(vitals.list_vitals("patient_1", None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_each_tick_is_forwarded_with_its_score() {
        let scorer = RiskScorer::new(Arc::new(fixture_artifacts()));
        let expected_scorer = scorer.clone();

        let mut mock = MockVitalsServiceTrait::new();
        mock.expect_append_vital()
            .times(4)
            .withf(move |patient_id, reading, score| {
                patient_id == "patient_9" && expected_scorer.score(reading) == *score
            })
            .returning(|patient_id, reading, score| {
                Ok(VitalRecord {
                    id: "v".to_string(),
                    patient_id: patient_id.to_string(),
                    timestamp: Utc::now(),
                    reading: *reading,
                    score: *score,
                })
            });
        mock.expect_list_vitals().never();

        let monitor = MonitoringService::new(
            Arc::new(VitalGenerator::seeded(3)),
            scorer,
            Arc::new(mock),
            MonitoringConfig::unpaced(4),
        );

        let session = monitor.run_session("patient_9", &mut NoopDisplay).await.unwrap();
        assert_eq!(session.ticks.len(), 4);
    }

    #[tokio::test]
    async fn test_abort_reports_sink_error_message() {
        let mut mock = MockVitalsServiceTrait::new();
        mock.expect_append_vital()
            .times(1)
            .returning(|_, _, _| Err(VitalsServiceError::RepositoryError("disk full".to_string())));

        let err = service(Arc::new(mock), abort_config(30))
            .run_session("patient_1", &mut NoopDisplay)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Session aborted at tick 1: Repository error: disk full");
    }

    #[tokio::test]
    async fn test_no_pause_after_last_tick() {
        let vitals = Arc::new(VitalsService::new(VitalsRepository::in_memory()));
        let config = MonitoringConfig {
            interval: Duration::from_millis(200),
            ..MonitoringConfig::unpaced(1)
        };

        let started = std::time::Instant::now();
        service(vitals, config).run_session("patient_1", &mut NoopDisplay).await.unwrap();
        assert!(started.elapsed() < Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_are_paced_by_interval() {
        let vitals = Arc::new(VitalsService::new(VitalsRepository::in_memory()));
        let interval = Duration::from_millis(1_000);
        let config = MonitoringConfig {
            interval,
            ..MonitoringConfig::unpaced(5)
        };

        let started = tokio::time::Instant::now();
        let session = service(vitals, config)
            .run_session("patient_1", &mut NoopDisplay)
            .await
            .unwrap();

        assert_eq!(session.ticks.len(), 5);
        assert_eq!(started.elapsed(), interval * 4);
    }

    #[test]
    fn test_percent_truncates() {
        assert_eq!(percent(0.995), 99);
        assert_eq!(percent(0.5), 50);
        assert_eq!(percent(1.0), 100);
        assert_eq!(percent(0.0), 0);
    }
}
