//! Domain layer health check functionality
//! Reports on the database behind the repositories and on the model artifacts.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use twin_care_data::database::{self, DatabasePool};

use crate::ml::ArtifactBundle;

/// System health status
#[derive(Debug, Clone, PartialEq)]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Represents a health component with status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    pub status: ComponentStatus,
    pub details: Option<String>,
}

/// Represents the overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    /// Overall system status
    pub status: SystemStatus,
    /// Map of component names to their health status
    pub components: HashMap<String, HealthComponent>,
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync + std::fmt::Debug {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;

    /// Check the status of the database.
    /// Ok(true) when a file database is reachable, Ok(false) when data only
    /// lives in memory, Err when the pool cannot hand out a connection.
    async fn check_database_status(&self) -> Result<bool, String>;
}

/// Check a database pool, or the lack of one
pub async fn check_database_status(pool: Option<&DatabasePool>) -> Result<bool, String> {
    match pool {
        Some(pool) => {
            let info = database::get_connection_info(pool)
                .map_err(|e| format!("Database connection error: {}", e))?;
            Ok(!pool.is_in_memory() && !info.contains("in-memory"))
        }
        None => Ok(false),
    }
}

/// Worst status wins
pub fn overall_status<'a>(components: impl IntoIterator<Item = &'a HealthComponent>) -> SystemStatus {
    let mut status = SystemStatus::Healthy;
    for component in components {
        match component.status {
            ComponentStatus::Unhealthy => return SystemStatus::Unhealthy,
            ComponentStatus::Degraded => status = SystemStatus::Degraded,
            ComponentStatus::Healthy => {}
        }
    }
    status
}

/// Health service over the process-wide resources
#[derive(Debug, Clone, Default)]
pub struct HealthService {
    pool: Option<DatabasePool>,
    artifacts: Option<Arc<ArtifactBundle>>,
}

impl HealthService {
    pub fn new(pool: Option<DatabasePool>, artifacts: Option<Arc<ArtifactBundle>>) -> Self {
        Self { pool, artifacts }
    }

    /// Health service over the global pool, if it was initialized
    pub fn from_global(artifacts: Arc<ArtifactBundle>) -> Self {
        Self::new(database::get_db_pool().ok(), Some(artifacts))
    }
}

#[async_trait]
impl HealthServiceTrait for HealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let db = match self.check_database_status().await {
            Ok(true) => HealthComponent {
                status: ComponentStatus::Healthy,
                details: self.pool.as_ref().and_then(|p| database::get_connection_info(p).ok()),
            },
            Ok(false) => HealthComponent {
                status: ComponentStatus::Degraded,
                details: Some("Records are kept in memory and will not survive a restart".to_string()),
            },
            Err(e) => HealthComponent {
                status: ComponentStatus::Unhealthy,
                details: Some(e),
            },
        };

        let models = match &self.artifacts {
            Some(_) => HealthComponent {
                status: ComponentStatus::Healthy,
                details: None,
            },
            None => HealthComponent {
                status: ComponentStatus::Unhealthy,
                details: Some("Model artifacts are not loaded".to_string()),
            },
        };

        let components: HashMap<String, HealthComponent> = vec![
            ("database".to_string(), db),
            ("models".to_string(), models),
        ].into_iter().collect();

        SystemHealth {
            status: overall_status(components.values()),
            components,
        }
    }

    async fn check_database_status(&self) -> Result<bool, String> {
        check_database_status(self.pool.as_ref()).await
    }
}
