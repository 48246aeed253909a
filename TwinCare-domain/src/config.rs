//! Runtime configuration for the monitoring pipeline
//!
//! Values come from the process environment. Unset variables fall back to the
//! defaults below; set but unparseable values are errors.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

/// Default number of ticks in a monitoring session
pub const DEFAULT_TICKS: u32 = 30;

/// Default pause between ticks, in milliseconds
pub const DEFAULT_INTERVAL_MS: u64 = 1000;

/// Default model artifact directory
pub const DEFAULT_MODEL_DIR: &str = "ml";

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but its value cannot be used
    #[error("Invalid value for {name}: '{value}' ({reason})")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
}

/// What a session does when the persistence sink rejects a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SinkFailurePolicy {
    /// Log the failure, count it and keep going
    #[default]
    Continue,
    /// Stop the session with an error
    Abort,
}

impl FromStr for SinkFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "continue" => Ok(SinkFailurePolicy::Continue),
            "abort" => Ok(SinkFailurePolicy::Abort),
            _ => Err("expected 'continue' or 'abort'".to_string()),
        }
    }
}

/// Monitoring loop settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoringConfig {
    /// Number of ticks per session
    pub ticks: u32,
    /// Pause between consecutive ticks
    pub interval: Duration,
    /// Reaction to persistence failures
    pub on_sink_error: SinkFailurePolicy,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            ticks: DEFAULT_TICKS,
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            on_sink_error: SinkFailurePolicy::default(),
        }
    }
}

impl MonitoringConfig {
    /// Read MONITOR_TICKS, MONITOR_INTERVAL_MS and MONITOR_ON_SINK_ERROR
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::from_lookup(|name| env::var(name).ok())?;
        info!(
            "Monitoring configuration: ticks={}, interval={:?}, on_sink_error={:?}",
            config.ticks, config.interval, config.on_sink_error
        );
        Ok(config)
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let ticks = parse_var(&lookup, "MONITOR_TICKS", defaults.ticks)?;
        if ticks == 0 {
            return Err(ConfigError::InvalidValue {
                name: "MONITOR_TICKS".to_string(),
                value: "0".to_string(),
                reason: "a session needs at least one tick".to_string(),
            });
        }

        let interval_ms = parse_var(&lookup, "MONITOR_INTERVAL_MS", DEFAULT_INTERVAL_MS)?;
        let on_sink_error = parse_var(&lookup, "MONITOR_ON_SINK_ERROR", defaults.on_sink_error)?;

        Ok(Self {
            ticks,
            interval: Duration::from_millis(interval_ms),
            on_sink_error,
        })
    }

    /// A configuration without pacing, for tests and batch scoring
    pub fn unpaced(ticks: u32) -> Self {
        Self {
            ticks,
            interval: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Location of the model artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    pub model_dir: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
        }
    }
}

impl ModelConfig {
    /// Read MODEL_DIR
    pub fn from_env() -> Self {
        match env::var("MODEL_DIR") {
            Ok(dir) if !dir.trim().is_empty() => Self { model_dir: PathBuf::from(dir) },
            _ => Self::default(),
        }
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: ToString,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
            name: name.to_string(),
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
