// Testing utilities and fixtures for the domain layer
// This module is only available in tests or when the "mock" feature is enabled

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

// Re-export the data layer mocks so callers need a single import
pub use twin_care_data::repository::{MockPatientRepository, MockVitalsRepository};

use crate::config::MonitoringConfig;
use crate::entities::monitoring::{MonitoringSession, SessionAverages, SessionTick};
use crate::health::{ComponentStatus, HealthComponent, HealthServiceTrait, SystemHealth, SystemStatus};
use crate::ml::{ArtifactBundle, Classifier, DecisionTree, LogisticRegression, RandomForest, StandardScaler, TreeNode};
use crate::services::monitoring::{DisplaySink, MonitoringService};
use crate::services::scoring::RiskScorer;
use crate::services::simulator::VitalGenerator;
use crate::services::vitals::VitalsServiceTrait;

fn leaf(value: &[f64]) -> TreeNode {
    TreeNode::Leaf { value: value.to_vec() }
}

fn split(feature: usize, threshold: f64, left: usize, right: usize) -> TreeNode {
    TreeNode::Split { feature, threshold, left, right }
}

/// Small hand-built artifacts with easy to predict outputs.
///
/// The scaler centers {100, 92, 140, 90}. Heart risk is a logistic model on
/// heart rate and systolic pressure, respiratory risk flags SpO2 two points
/// under the mean, and stress rises with heart rate then systolic pressure.
pub fn fixture_artifacts() -> ArtifactBundle {
    let scaler = StandardScaler::new([100.0, 92.0, 140.0, 90.0], [20.0, 4.0, 20.0, 15.0]);

    let heart = Classifier::LogisticRegression(LogisticRegression {
        classes: vec![0, 1],
        coefficients: vec![2.0, 0.0, 2.0, 0.0],
        intercept: 0.0,
    });

    let respiratory = Classifier::RandomForest(RandomForest {
        classes: vec![0, 1],
        trees: vec![DecisionTree {
            nodes: vec![split(1, -0.5, 1, 2), leaf(&[0.0, 1.0]), leaf(&[1.0, 0.0])],
        }],
    });

    let stress = Classifier::RandomForest(RandomForest {
        classes: vec![0, 1, 2],
        trees: vec![DecisionTree {
            nodes: vec![
                split(0, 0.0, 1, 2),
                leaf(&[1.0, 0.0, 0.0]),
                split(2, 0.0, 3, 4),
                leaf(&[0.0, 1.0, 0.0]),
                leaf(&[0.0, 0.0, 1.0]),
            ],
        }],
    });

    match ArtifactBundle::from_parts(scaler, heart, respiratory, stress) {
        Ok(bundle) => bundle,
        Err(e) => panic!("fixture artifacts are invalid: {}", e),
    }
}

/// The artifacts shipped in the workspace `ml/` directory
pub fn shipped_artifacts() -> ArtifactBundle {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("ml");
    match ArtifactBundle::load(&dir) {
        Ok(bundle) => bundle,
        Err(e) => panic!("shipped artifacts failed to load: {}", e),
    }
}

/// Monitoring service with a seeded generator, the fixture artifacts and no pacing
pub fn fixture_monitoring_service(vitals: Arc<dyn VitalsServiceTrait>, ticks: u32) -> MonitoringService {
    MonitoringService::new(
        Arc::new(VitalGenerator::seeded(2024)),
        RiskScorer::new(Arc::new(fixture_artifacts())),
        vitals,
        MonitoringConfig::unpaced(ticks),
    )
}

/// Display sink that keeps everything it is shown
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    pub ticks: Vec<SessionTick>,
    pub summaries: usize,
}

impl DisplaySink for RecordingDisplay {
    fn show_tick(&mut self, tick: &SessionTick) {
        self.ticks.push(tick.clone());
    }

    fn show_summary(&mut self, _session: &MonitoringSession, _averages: &SessionAverages) {
        self.summaries += 1;
    }
}

/// Mock implementation of health services for testing system health
#[derive(Debug)]
pub struct MockHealthService {
    database_status: ComponentStatus,
    models_status: ComponentStatus,
}

impl Default for MockHealthService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHealthService {
    /// Create a new mock health service with all components healthy
    pub fn new() -> Self {
        Self {
            database_status: ComponentStatus::Healthy,
            models_status: ComponentStatus::Healthy,
        }
    }

    /// Configure the mock with a degraded database
    pub fn with_degraded_database(mut self) -> Self {
        self.database_status = ComponentStatus::Degraded;
        self
    }

    /// Configure the mock with an unhealthy database
    pub fn with_unhealthy_database(mut self) -> Self {
        self.database_status = ComponentStatus::Unhealthy;
        self
    }

    /// Configure the mock as if the artifacts were not loaded
    pub fn without_models(mut self) -> Self {
        self.models_status = ComponentStatus::Unhealthy;
        self
    }
}

#[async_trait]
impl HealthServiceTrait for MockHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let mut components = HashMap::new();

        components.insert(
            "database".to_string(),
            HealthComponent {
                status: self.database_status.clone(),
                details: match self.database_status {
                    ComponentStatus::Healthy => None,
                    ComponentStatus::Degraded => Some("Records are kept in memory".to_string()),
                    ComponentStatus::Unhealthy => Some("Database connection failed".to_string()),
                },
            },
        );

        components.insert(
            "models".to_string(),
            HealthComponent {
                status: self.models_status.clone(),
                details: None,
            },
        );

        let status = crate::health::overall_status(components.values());
        SystemHealth { status, components }
    }

    async fn check_database_status(&self) -> Result<bool, String> {
        match self.database_status {
            ComponentStatus::Healthy => Ok(true),
            ComponentStatus::Degraded => Ok(false),
            ComponentStatus::Unhealthy => Err("Database connection failed".to_string()),
        }
    }
}
