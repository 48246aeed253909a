use serde::{Deserialize, Serialize};

use crate::entities::vitals::FEATURE_COUNT;

/// Feature names in model input order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = ["heart_rate", "spo2", "bp_sys", "bp_dia"];

/// Per-feature standardization fitted at training time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,

    /// Optional column names; checked against [`FEATURE_NAMES`] when present
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub feature_names: Vec<String>,
}

impl StandardScaler {
    pub fn new(mean: [f64; FEATURE_COUNT], scale: [f64; FEATURE_COUNT]) -> Self {
        Self {
            mean: mean.to_vec(),
            scale: scale.to_vec(),
            feature_names: Vec::new(),
        }
    }

    /// (x - mean) / scale for every feature; a zero scale leaves the centered value as is
    pub fn transform(&self, features: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
        let mut scaled = [0.0; FEATURE_COUNT];
        for (i, out) in scaled.iter_mut().enumerate() {
            let mean = self.mean.get(i).copied().unwrap_or(0.0);
            let scale = match self.scale.get(i).copied() {
                Some(s) if s != 0.0 => s,
                _ => 1.0,
            };
            *out = (features[i] - mean) / scale;
        }
        scaled
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.mean.len() != FEATURE_COUNT || self.scale.len() != FEATURE_COUNT {
            return Err(format!(
                "expected {} means and scales, got {} and {}",
                FEATURE_COUNT,
                self.mean.len(),
                self.scale.len()
            ));
        }

        if self.mean.iter().chain(self.scale.iter()).any(|v| !v.is_finite()) {
            return Err("mean and scale must be finite".to_string());
        }

        if self.scale.iter().any(|s| *s < 0.0) {
            return Err("scale must not be negative".to_string());
        }

        if !self.feature_names.is_empty() && self.feature_names.iter().map(String::as_str).ne(FEATURE_NAMES) {
            return Err(format!(
                "feature order must be {:?}, got {:?}",
                FEATURE_NAMES, self.feature_names
            ));
        }

        Ok(())
    }
}
